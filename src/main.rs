use clap::Parser;
use nest_snapshot::cli::{report_error, Cli};
use nest_snapshot::config::ClientConfig;
use nest_snapshot::logging::init_tracing;
use nest_snapshot::snapshot::{run, NestClient};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    if let Err(e) = init_tracing(&cli.tracing_config()) {
        report_error(verbosity, "failed to initialize logging", Some(&e.to_string()));
    }

    let config = match cli.run_config() {
        Ok(config) => config,
        Err(e) => {
            report_error(verbosity, &format!("{}: {}", e.kind(), e), None);
            return ExitCode::FAILURE;
        }
    };

    let client = match NestClient::new(ClientConfig::default()) {
        Ok(client) => client,
        Err(e) => {
            report_error(verbosity, "failed to build HTTP client", Some(&e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    match run(&client, &config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(verbosity, &e.to_string(), Some(&e.detail()));
            ExitCode::FAILURE
        }
    }
}
