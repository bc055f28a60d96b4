use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use odata_endpoint::endpoints::{self, KnownEndpoint};
use odata_endpoint::rewrite::normalize_version_token;
use odata_endpoint::{config, EndpointResolver, HttpTransport};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let json_logs = args.log_json
        || std::env::var("ODATA_LOG_JSON").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    // stdout carries the resolved URIs; logs go to stderr.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "odata_endpoint=info".into()),
        ))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();

    let result = run(args.command).await;

    if let Err(ref e) = result {
        tracing::error!("{:#}", e);
    }
    result
}

async fn run(command: cli::Commands) -> anyhow::Result<()> {
    match command {
        cli::Commands::Resolve { endpoint } => {
            let resolver = build_resolver()?;
            let uri = canonical_uri(&endpoint);
            let resolved = resolver
                .resolve(&uri)
                .await
                .with_context(|| format!("resolving {}", uri))?;
            println!("{}", resolved);
        }
        cli::Commands::Root { endpoint } => {
            let resolver = build_resolver()?;
            let uri = canonical_uri(&endpoint);
            let root = resolver
                .service_root(&uri)
                .await
                .with_context(|| format!("resolving service root for {}", uri))?;
            println!("{}", root);
        }
        cli::Commands::Rewrite { uri } => {
            println!("{}", normalize_version_token(&uri)?);
        }
        cli::Commands::List { json } => {
            let rows = endpoints::catalogue();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    let marker = if row.requires_resolution { "rw" } else { "ro" };
                    println!("{:<20} {}  {}", row.name, marker, row.uri);
                }
            }
        }
        cli::Commands::ResolveAll => {
            let resolver = build_resolver()?;
            let targets = KnownEndpoint::ALL
                .into_iter()
                .filter(|e| e.requires_resolution())
                .map(|e| e.uri());

            let mut failed = 0;
            for (canonical, outcome) in resolver.resolve_all(targets).await {
                match outcome {
                    Ok(resolved) => println!("{} -> {}", canonical, resolved),
                    Err(e) => {
                        failed += 1;
                        tracing::warn!("{}: {}", canonical, e);
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{} endpoint(s) failed to resolve", failed);
            }
        }
    }
    Ok(())
}

fn build_resolver() -> anyhow::Result<EndpointResolver> {
    let cfg = config::load()?;
    let transport =
        HttpTransport::new(&cfg.transport()).context("failed to build HTTP transport")?;
    Ok(EndpointResolver::new(transport))
}

/// Accept either a catalogue name or a URI.
fn canonical_uri(endpoint: &str) -> String {
    KnownEndpoint::from_name(endpoint)
        .map(|e| e.uri().to_string())
        .unwrap_or_else(|| endpoint.to_string())
}
