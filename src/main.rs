use std::process::ExitCode;

use clap::Parser;
use mediaferry_lib::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    mediaferry_lib::init_logging(cli.verbose);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = runtime.block_on(mediaferry_lib::run(&cli));
    if let Err(e) = &outcome {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
    }

    ExitCode::from(mediaferry_lib::exit_code(&cli, &outcome))
}
