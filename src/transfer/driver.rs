//! Batch driver
//!
//! Runs jobs strictly one after another. Every job opens its own session,
//! and every error is contained at the job boundary.

use std::fmt;

use tracing::{debug, error, info, warn};

use super::error::TransferError;
use super::guard::exists;
use super::job::TransferJob;
use super::progress::ProgressFactory;
use super::reconcile::ensure_directory;
use super::transport::{Transport, TransportSession};
use super::upload::upload;
use crate::sftp::FileTransferChannel;

/// Result of one job
#[derive(Debug)]
pub enum JobOutcome {
    /// File uploaded
    Transferred { bytes: u64 },
    /// Destination already existed
    Skipped,
    /// Any step failed
    Failed(TransferError),
}

impl JobOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, JobOutcome::Failed(_))
    }
}

/// Lifecycle of one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    SessionOpen,
    DirectoryReconciled,
    Uploading,
    Completed,
    Skipped,
    Failed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Pending => "pending",
            JobState::SessionOpen => "session-open",
            JobState::DirectoryReconciled => "directory-reconciled",
            JobState::Uploading => "uploading",
            JobState::Completed => "completed",
            JobState::Skipped => "skipped",
            JobState::Failed => "failed",
        };
        f.write_str(name)
    }
}

struct JobTracker {
    index: usize,
    state: JobState,
}

impl JobTracker {
    fn new(index: usize) -> Self {
        Self {
            index,
            state: JobState::Pending,
        }
    }

    fn enter(&mut self, next: JobState) {
        debug!("job {}: {} -> {}", self.index, self.state, next);
        self.state = next;
    }
}

/// Outcome of one job within a batch
#[derive(Debug)]
pub struct JobRecord {
    pub index: usize,
    pub file_name: String,
    pub outcome: JobOutcome,
}

/// Counts per outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub transferred: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} transferred, {} skipped, {} failed",
            self.transferred, self.skipped, self.failed
        )
    }
}

/// Outcomes of a batch, in job order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<JobRecord>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        self.records
            .iter()
            .fold(BatchSummary::default(), |mut summary, record| {
                match record.outcome {
                    JobOutcome::Transferred { .. } => summary.transferred += 1,
                    JobOutcome::Skipped => summary.skipped += 1,
                    JobOutcome::Failed(_) => summary.failed += 1,
                }
                summary
            })
    }

    pub fn has_failures(&self) -> bool {
        self.records.iter().any(|r| r.outcome.is_failed())
    }
}

/// Drives transfer jobs over a [`Transport`]
pub struct BatchDriver<'a> {
    transport: &'a dyn Transport,
    progress: &'a dyn ProgressFactory,
}

impl<'a> BatchDriver<'a> {
    pub fn new(transport: &'a dyn Transport, progress: &'a dyn ProgressFactory) -> Self {
        Self {
            transport,
            progress,
        }
    }

    /// Run all jobs in order. A failed job never stops the batch.
    pub async fn run(&self, jobs: &[TransferJob]) -> BatchReport {
        let mut report = BatchReport::default();

        for job in jobs {
            let outcome = self.transfer_one(job).await;
            report.records.push(JobRecord {
                index: job.index,
                file_name: job.file_name.clone(),
                outcome,
            });
        }

        info!("Batch finished: {}", report.summary());
        report
    }

    /// Attempt a single job on a fresh session
    pub async fn transfer_one(&self, job: &TransferJob) -> JobOutcome {
        println!("{}", "*".repeat(50));
        println!("[{}] {} ...", job.index, job.file_name);

        let mut tracker = JobTracker::new(job.index);

        match self.attempt(job, &mut tracker).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracker.enter(JobState::Failed);
                println!("Failed to transfer file: {}", e);
                error!(
                    "Transfer of {} failed: {}",
                    job.local_path.display(),
                    e
                );
                JobOutcome::Failed(e)
            }
        }
    }

    async fn attempt(
        &self,
        job: &TransferJob,
        tracker: &mut JobTracker,
    ) -> Result<JobOutcome, TransferError> {
        let session = self.transport.connect().await?;
        tracker.enter(JobState::SessionOpen);
        println!("    Connected to the server");

        let result = self.run_on_session(session.as_ref(), job, tracker).await;

        if let Err(e) = session.disconnect().await {
            warn!("Failed to close session for job {}: {}", job.index, e);
        }

        result
    }

    async fn run_on_session(
        &self,
        session: &dyn TransportSession,
        job: &TransferJob,
        tracker: &mut JobTracker,
    ) -> Result<JobOutcome, TransferError> {
        let channel = session.open_channel().await?;

        let result = self.run_on_channel(channel.as_ref(), job, tracker).await;

        if let Err(e) = channel.close().await {
            warn!("Failed to close channel for job {}: {}", job.index, e);
        }

        result
    }

    async fn run_on_channel(
        &self,
        channel: &dyn FileTransferChannel,
        job: &TransferJob,
        tracker: &mut JobTracker,
    ) -> Result<JobOutcome, TransferError> {
        ensure_directory(channel, &job.remote_directory).await?;
        tracker.enter(JobState::DirectoryReconciled);

        let directory = job.remote_directory.path();

        if exists(channel, &directory, &job.file_name).await? {
            eprintln!("        File already exists...");
            eprintln!("        Continuing ...");
            info!("Skipping {}: already present in {}", job.file_name, directory);
            tracker.enter(JobState::Skipped);
            return Ok(JobOutcome::Skipped);
        }

        tracker.enter(JobState::Uploading);
        let mut observer = self.progress.observer(job);
        let bytes = upload(&job.local_path, channel, &job.remote_path(), &mut *observer).await?;
        tracker.enter(JobState::Completed);

        println!(
            "    Successfully transferred {} to {}",
            job.local_path.display(),
            directory
        );

        Ok(JobOutcome::Transferred { bytes })
    }
}
