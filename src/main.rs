use std::process::ExitCode;

use covid_sheets::CovidSheets;
use tracing::{error, info};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "covid_sheets=info".into()),
        )
        .init();

    let job = match CovidSheets::builder().from_env().and_then(|b| b.build()) {
        Ok(job) => job,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!("{}", job);

    match job.run() {
        Ok(report) => {
            println!("Done: {} sheets published", report.sheets.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}
