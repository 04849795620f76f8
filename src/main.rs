use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rehost_proxy::config::{load_config, Cli};
use rehost_proxy::lifecycle::{drain_with_deadline, wait_for_termination};
use rehost_proxy::observability::logging;
use rehost_proxy::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match load_config(Cli::parse()) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    tracing::info!(
        listen = %config.listen_address(),
        upstream = %config.upstream.url,
        cookie_domain = %config.cookie_domain,
        strip_prefix = %config.strip_prefix,
        location_old_host = %config.location_old_host,
        location_new_host = %config.location_new_host,
        insecure_tls = config.insecure_tls,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.listen_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        upstream = %config.upstream.url,
        "proxy listening"
    );

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config.clone());
    let mut server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        _ = wait_for_termination() => {}
    }

    shutdown.trigger();
    if drain_with_deadline(&mut server_task, config.shutdown_timeout).await {
        tracing::info!("Shutdown complete");
    }
    Ok(())
}
