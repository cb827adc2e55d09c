//! # jirabatch core
//!
//! Everything needed to turn a JSON definition file into Jira mutations
//! without knowing how those mutations travel over the wire: record
//! validation, payload mapping, attachment resolution, sequential batch
//! execution against an [`IssueTracker`], and reporting.

pub mod attachment;
pub mod config;
pub mod consts;
pub mod creds;
pub mod error;
pub mod executor;
pub mod followup;
pub mod mapper;
pub mod output;
pub mod record;
pub mod report;
pub mod tracker;
pub mod url;

pub use attachment::{AttachmentRef, AttachmentResolver, CertificateDirResolver};
pub use config::{BatchConfig, ConfigDirs, get_config_dirs};
pub use error::{BatchError, ErrorKind};
pub use executor::{BatchExecutor, OperationOutcome, OperationResult, PlannedRecord, RecordOutcome, RecordState, plan_records};
pub use mapper::{IssueDraft, MappedOperation, MapperOptions, PayloadMapper};
pub use output::{ColorMode, print_error, print_info, print_success, print_warning};
pub use record::{OperationRecord, load_records, validate_record};
pub use report::BatchSummary;
pub use tracker::{IssueTracker, RemoteError};
