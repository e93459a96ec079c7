use std::time::Duration;

use clap::Parser;
use sixletters::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(
    name = "sixletters-server",
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,
)]
struct Args {
    /// Address the WebSocket listener binds to.
    #[arg(long, default_value = "0.0.0.0:8754")]
    addr: String,

    /// Prefix for every round code this server hands out.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Address for the admin listener (`snapshots`, `phaseout`).
    #[arg(long)]
    admin_addr: Option<String>,

    /// Address for the load balancer health-check listener.
    #[arg(long)]
    haproxy_agent_addr: Option<String>,

    /// Accept connections from any origin.
    #[arg(long, conflicts_with = "host")]
    debug: bool,

    /// Only accept upgrades whose Host header is exactly this.
    #[arg(long)]
    host: Option<String>,

    /// Seconds a round may sit with nobody connected before it is dropped.
    #[arg(long, default_value_t = 24 * 60 * 60)]
    idle_timeout_secs: u64,
}

impl Args {
    fn origin_policy(&self) -> OriginPolicy {
        match (&self.host, self.debug) {
            (Some(host), _) => OriginPolicy::Host(host.clone()),
            (None, true) => OriginPolicy::Any,
            (None, false) => OriginPolicy::SameHost,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sixletters=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut builder = SixlettersServer::builder()
        .bind(&args.addr)
        .origin_policy(args.origin_policy())
        .hub_config(HubConfig {
            prefix: args.prefix.clone(),
            idle_timeout: Duration::from_secs(args.idle_timeout_secs),
            ..HubConfig::default()
        });
    if let Some(addr) = &args.admin_addr {
        builder = builder.admin_addr(addr);
    }
    if let Some(addr) = &args.haproxy_agent_addr {
        builder = builder.health_addr(addr);
    }

    let server = builder.build().await?;
    tracing::info!(addr = %server.local_addr()?, "sixletters ready");
    server.run().await?;

    tracing::info!("drained, exiting");
    Ok(())
}
