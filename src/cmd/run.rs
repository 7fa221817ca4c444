//! `multipart-relay run` — start the relay server.
//!
//! Builds and validates the endpoint configuration, optionally detaches
//! into the background, and serves `POST /` until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::RunArgs;
use crate::config::model::Config;
use crate::config::validation;
use crate::daemon::{self, PidFile};
use crate::error::RelayError;
use crate::logging;
use crate::server::{self, AppState};

const DAEMON_STARTUP_GRACE: Duration = Duration::from_millis(500);

pub async fn execute(args: RunArgs) -> Result<(), RelayError> {
    let config = Config::from_urls(args.urls.iter().map(|u| u.trim()), args.timeout)
        .with_max_answer_body(args.max_answer_body);
    validation::validate(&config).map_err(|errors| RelayError::ConfigValidation { errors })?;

    let addr = args.listen_addr()?;

    if args.daemon {
        let pid_path = args.resolved_pid_file().unwrap_or_default();
        let mut child = daemon::detach(&pid_path)?;
        // Bind and pid file errors surface within this window.
        tokio::time::sleep(DAEMON_STARTUP_GRACE).await;
        if let Some(status) = child.try_wait()? {
            return Err(RelayError::DaemonExited(status));
        }
        println!(
            "multipart-relay detached (pid {}, pid file {})",
            child.id(),
            pid_path.display()
        );
        match &args.log_file {
            Some(path) => println!("later errors are logged to {}", path.display()),
            None => println!("no --log-file given; later errors are discarded"),
        }
        return Ok(());
    }

    let log_format = logging::resolve_format(args.pretty, args.json, args.log_file.is_some());
    let _log_guard = logging::init(&args.log_level, log_format, args.log_file.as_deref())?;

    let _pid_file = args
        .resolved_pid_file()
        .map(|path| PidFile::create(&path))
        .transpose()?;

    let endpoint_count = config.total_endpoints();
    let timeout_ms = config.timeout;
    let state = Arc::new(AppState::new(config, args.max_body));
    let router = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        endpoints = endpoint_count,
        timeout_ms,
        "multipart-relay started"
    );

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(server::shutdown_signal())
    .await?;

    tracing::info!("multipart-relay stopped");
    Ok(())
}
