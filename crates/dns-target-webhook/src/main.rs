use std::process;

use anyhow::Result;
use tracing::{debug, error};

use dns_target_webhook::{cli, config::Config, tracing::setup_tracing, WebhookServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Starting from rustls 0.22, each application must set its default crypto provider.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("cannot install the default crypto provider");
        process::exit(1);
    }

    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches).unwrap_or_else(|e| {
        // tracing is not ready yet
        eprintln!("{e}");
        process::exit(1);
    });

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;
    debug!("tracing system ready");

    let server = match WebhookServer::new_from_config(config).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = format!("{e:#}").as_str(), "cannot start webhook");
            process::exit(1);
        }
    };

    server.run().await
}
