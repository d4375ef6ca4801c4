#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for smrv
//!
//! This crate provides the data shared between the registry, the scanner
//! and the verification pipeline.

pub mod candidate;
pub mod package;
pub mod verdict;

// Re-export commonly used types
pub use candidate::{CandidatePolicy, DEFAULT_CANDIDATE_EXTENSIONS, DEFAULT_MANIFEST_TYPES};
pub use package::{ArchiveEntry, PackageVersion};
pub use verdict::{AnalysisStatus, ScanHandle, ScanVerdict};
