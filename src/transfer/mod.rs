//! Transfer orchestration
//!
//! Per job: open a session, reconcile the category directory, skip files
//! already present, otherwise stream the upload with progress reporting.

pub mod driver;
pub mod error;
pub mod guard;
pub mod job;
pub mod progress;
pub mod reconcile;
pub mod transport;
pub mod upload;

pub use driver::{BatchDriver, BatchReport, BatchSummary, JobOutcome, JobRecord, JobState};
pub use error::TransferError;
pub use guard::exists;
pub use job::{build_jobs, ContentCategory, RemoteDirectory, TransferJob};
pub use progress::{ConsoleProgress, ProgressFactory, ProgressObserver, ProgressState};
pub use reconcile::{ensure_directory, Reconciled};
pub use transport::{SshTransport, Transport, TransportSession};
pub use upload::{upload, UPLOAD_CHUNK_SIZE};
