use std::process::ExitCode;

use tracing::{error, info};

use auth::config::Config;
use auth::server::{controller, serve, SERVICE_NAME};

#[tokio::main]
async fn main() -> ExitCode {
    auth::logging::init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = ?e, "{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(?config, "loaded configuration");

    let controller = controller(&config);
    match serve(config, controller).await {
        Ok(report) => {
            info!(
                drain = report.drain.as_str(),
                elapsed_secs = report.elapsed.as_secs_f64(),
                "{SERVICE_NAME} exited"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "{SERVICE_NAME} failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
