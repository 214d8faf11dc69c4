use std::path::PathBuf;
use std::process::ExitCode;

use gaia_core::routing::GateView;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let app = match gaia_lib::start(explicit) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("gaia: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = app.session().bootstrap().await {
        error!(error = %err, "could not restore session");
    }

    match app.session().enter_gate().await.view {
        GateView::Redirecting(route) => info!(route = %route, "start route resolved"),
        GateView::Waiting => info!("profile still loading"),
        GateView::Failed { message } => {
            error!(%message, "profile gate failed");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
