//! scrapegoat binary: load the config, build one factory per endpoint,
//! mount each exposition handler, run all vector loops until ctrl-c.

use std::collections::HashSet;
use std::path::PathBuf;

use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use scrapegoat::{config, Error, Factory};

#[derive(Parser)]
#[command(name = "scrapegoat")]
#[command(about = "Synthetic Prometheus metrics generator for load-testing metrics pipelines")]
struct Cli {
    /// Path to the YAML config file
    #[arg(short = 'p', long, default_value = "scrapegoat.yaml")]
    config_path: PathBuf,

    /// Address on which to listen for HTTP requests
    #[arg(long, default_value = "0.0.0.0:8080")]
    listen_address: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();
    if let Err(err) = run(Cli::parse()).await {
        error!(error = %err, "startup failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Error> {
    let cfg = config::load_file(&cli.config_path)?;
    let shutdown = CancellationToken::new();

    let mut router = Router::new();
    let mut mounted: HashSet<String> = HashSet::new();
    for (index, factory_cfg) in cfg.factories.iter().enumerate() {
        validate_path(&factory_cfg.exposition_path, &mut mounted)
            .map_err(|err| err.in_factory(index))?;
        let mut factory = Factory::new(factory_cfg).map_err(|err| err.in_factory(index))?;
        router = router.route(&factory_cfg.exposition_path, factory.handler());
        factory.run(&shutdown);
        info!(
            index,
            path = %factory_cfg.exposition_path,
            format = %factory_cfg.exposition_format,
            vectors = factory_cfg.vectors.len(),
            "factory running"
        );
    }

    let listener = TcpListener::bind(&cli.listen_address).await?;
    info!(addr = %cli.listen_address, factories = cfg.factories.len(), "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutting down");
                shutdown.cancel();
            }
        })
        .await?;
    Ok(())
}

fn validate_path(path: &str, mounted: &mut HashSet<String>) -> Result<(), Error> {
    if !path.starts_with('/') {
        return Err(Error::InvalidParameter {
            field: "exposition_path",
            reason: format!("{path:?} must start with '/'"),
        });
    }
    if !mounted.insert(path.to_string()) {
        return Err(Error::InvalidParameter {
            field: "exposition_path",
            reason: format!("{path:?} is mounted twice"),
        });
    }
    Ok(())
}
