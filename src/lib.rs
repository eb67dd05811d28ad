//! mediavault - command-line client for a video download service.
//!
//! Validates video links against the supported platforms, asks the service
//! which resolutions it can produce, requests the download and saves the file.

pub mod backend;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod models;
pub mod platforms;
pub mod state;
pub mod validator;
pub mod view;

pub use backend::{Backend, FileSaver, HttpBackend};
pub use config::ClientConfig;
pub use controller::{FormController, FormatsLoad, ProbeResult};
pub use errors::{translate, ClientError, SubmitError};
pub use models::{
    DownloadOutcome, DownloadReply, DownloadRequest, FormatOption, FormatsReply, MediaFormat, Reply,
    SaveLink, ValidationResult,
};
pub use validator::{extract_identifier, validate_format};
pub use view::{FormView, StatusKind, TerminalView};
