//! Resource catalogs and job-submission requests.
//!
//! The flow mirrors a submission dialog's lifetime: build a catalog from
//! live cluster limits, bound the operator's selections by it, validate
//! into a [`JobRequest`], render and run the submission command.

pub mod catalog;
pub mod request;
pub mod submit;

pub use catalog::{build_catalog, clean_partition_name, defaults, ResourceCatalog};
pub use request::{JobRequest, JobSelections, ValidationError};
pub use submit::{
    launch_interactive, parse_submit_confirmation, submit_batch, SubmitError, SubmitOutcome,
    TerminalLauncher,
};
