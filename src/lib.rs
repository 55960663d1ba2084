//! mediaferry - push local media files to a remote media server over SFTP
//!
//! Each file is transferred on its own SSH session into `<root>/movies` or
//! `<root>/series`. Files already present remotely are skipped, and a failed
//! file never stops the rest of the batch.

pub mod cli;
pub mod config;
pub mod sftp;
pub mod ssh;
pub mod transfer;

#[cfg(test)]
mod testing;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, CliError, KEY_PASSPHRASE_ENV};
use config::{config_file, load_defaults};
use transfer::{build_jobs, BatchDriver, BatchReport, ConsoleProgress, SshTransport};

/// Initialize logging on stderr. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Run one batch. Returns `None` when a pattern matched nothing.
pub async fn run(cli: &Cli) -> Result<Option<BatchReport>, CliError> {
    let file = load_defaults(cli.config.as_deref(), config_file()).await?;
    let settings = cli.resolve(&file, std::env::var(KEY_PASSPHRASE_ENV).ok());

    let files = cli.expand_inputs()?;
    if files.is_empty() {
        eprintln!("No files matched {}", cli.files_to_transfer);
        return Ok(None);
    }

    println!("Moving files...");
    for (index, path) in files.iter().enumerate() {
        println!("   {}: {}", index, path.display());
    }

    let jobs = build_jobs(&files, &settings.remote_root, settings.category);
    tracing::info!(
        "Transferring {} file(s) to {}@{} under {}",
        jobs.len(),
        settings.ssh.username,
        settings.ssh.address(),
        settings.remote_root
    );

    let transport = SshTransport::new(settings.ssh);
    let progress = ConsoleProgress::new();
    let report = BatchDriver::new(&transport, &progress).run(&jobs).await;

    println!("Done: {}", report.summary());
    Ok(Some(report))
}

/// Process exit status for a finished run.
///
/// Failed jobs only change the status with `--fail-on-error`.
pub fn exit_code(cli: &Cli, outcome: &Result<Option<BatchReport>, CliError>) -> u8 {
    match outcome {
        Ok(Some(report)) if cli.fail_on_error && report.has_failures() => 1,
        Ok(_) => 0,
        Err(_) => 1,
    }
}
