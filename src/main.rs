//! terrarium entry point.
//!
//! Validates the port first, then loads the optional configuration file and
//! initializes tracing, and finally hands the validated port to the bootstrap,
//! which launches the REST server and waits for it to stop.

use std::process::ExitCode;
use std::sync::Arc;

use terrarium::cli::Args;
use terrarium::config::AppConfig;
use terrarium::http::{RestServer, Shutdown};
use terrarium::{logging, validate, Bootstrap, Error, Readiness, ServiceExit};

#[tokio::main]
async fn main() -> ExitCode {
    // Readiness exists, and is false, before anything else can observe it.
    let readiness = Readiness::new();

    let args = Args::parse_normalized(std::env::args_os());

    match run(args, readiness).await {
        Ok(exit) if exit.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, readiness: Readiness) -> Result<ServiceExit, Error> {
    let port = validate(&args.port);

    let loaded = AppConfig::load_or_default(args.config.as_deref());
    let format = args.log_format.unwrap_or_else(|| {
        loaded
            .as_ref()
            .map(|config| config.logging.format)
            .unwrap_or_default()
    });
    let filter = logging::resolve_filter(args.log_level, std::env::var("RUST_LOG").ok());
    let logging = logging::init_with_fallback(&filter, format);

    // The port is reported ahead of any other startup failure.
    let port = port?;
    let config = Arc::new(loaded?);
    logging?;

    tracing::info!("starting terrarium server");
    tracing::debug!(
        host = %config.http.host,
        shutdown_grace_seconds = config.http.shutdown_grace_seconds,
        config_file = ?args.config,
        "Loaded configuration"
    );

    let server = RestServer::new(config, readiness, Shutdown::new());
    Ok(Bootstrap::new(server).run_validated(port).await)
}

fn report(e: &Error) {
    if !tracing::dispatcher::has_been_set() {
        eprintln!("terrarium: {}", e);
        return;
    }
    match e {
        Error::Port(e) => tracing::error!(port = %e.input(), "{}", e),
        e => tracing::error!(error = %e, "Fatal startup error"),
    }
}
