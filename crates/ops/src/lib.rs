#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for smrv
//!
//! This crate wires the registry, the verifier and the scanner queue
//! together and drives them: the long-running approval loop and the one-off
//! verification commands.

mod context;
mod dispatched;
mod driver;
mod types;
mod verify_ops;

pub use context::{OpsContextBuilder, OpsCtx};
pub use dispatched::DispatchedVersions;
pub use driver::{process_version, ApprovalDriver};
pub use types::{VerificationReport, VersionOutcome};
pub use verify_ops::{sample_versions, verify_versions};
