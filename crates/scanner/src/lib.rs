#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Malware scanner client for smrv
//!
//! All traffic to the scanner goes through a single [`RequestQueue`] that
//! admits at most `max_requests` calls per `window`. On top of it,
//! [`FileScanner`] uploads one file, polls its analysis until it finishes,
//! persists the raw verdict and reports whether the file is clean.

pub mod queue;
pub mod scan;
pub mod transport;

pub use queue::{Method, RateLimit, ReplyFuture, RequestBody, RequestQueue, ScanRequest};
pub use scan::{parse_verdict, FileScan, FileScanner, ScanSettings};
pub use transport::{ScanTransport, VirusTotalTransport};
