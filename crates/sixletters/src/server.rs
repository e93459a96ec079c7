//! `SixlettersServer` builder and server loop.
//!
//! This is the entry point for running a Sixletters server. It ties
//! together all the layers: transport → protocol → room, plus the admin
//! and health listeners.

use std::net::SocketAddr;

use sixletters_protocol::is_valid_prefix;
use sixletters_room::{HubConfig, HubHandle, spawn_hub};
use sixletters_transport::{
    Incoming, OriginPolicy, Transport, WebSocketTransport,
};
use tokio::net::TcpListener;

use crate::SixlettersError;
use crate::admin::run_admin;
use crate::handler::handle_connection;
use crate::health::run_health;

/// Builder for configuring and starting a Sixletters server.
///
/// # Example
///
/// ```rust,no_run
/// use sixletters::prelude::*;
///
/// # async fn start() -> Result<(), SixlettersError> {
/// let server = SixlettersServer::builder()
///     .bind("0.0.0.0:8754")
///     .admin_addr("127.0.0.1:8755")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SixlettersServerBuilder {
    bind_addr: String,
    admin_addr: Option<String>,
    health_addr: Option<String>,
    origin: OriginPolicy,
    hub_config: HubConfig,
}

impl SixlettersServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8754".to_string(),
            admin_addr: None,
            health_addr: None,
            origin: OriginPolicy::default(),
            hub_config: HubConfig::default(),
        }
    }

    /// Sets the address the WebSocket listener binds to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Enables the admin listener on the given address.
    pub fn admin_addr(mut self, addr: &str) -> Self {
        self.admin_addr = Some(addr.to_string());
        self
    }

    /// Enables the health-check listener on the given address.
    pub fn health_addr(mut self, addr: &str) -> Self {
        self.health_addr = Some(addr.to_string());
        self
    }

    /// Sets which browser origins may connect.
    pub fn origin_policy(mut self, origin: OriginPolicy) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the round registry configuration.
    pub fn hub_config(mut self, config: HubConfig) -> Self {
        self.hub_config = config;
        self
    }

    /// Binds every listener and starts the hub.
    ///
    /// Fails if the code prefix is malformed or any listener can't bind.
    pub async fn build(self) -> Result<SixlettersServer, SixlettersError> {
        if !is_valid_prefix(&self.hub_config.prefix) {
            return Err(SixlettersError::Config(format!(
                "code prefix {:?} must be at most 11 lowercase letters or digits",
                self.hub_config.prefix
            )));
        }

        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_origin_policy(self.origin);

        let admin = match &self.admin_addr {
            Some(addr) => Some(bind_listener(addr, "admin").await?),
            None => None,
        };
        let health = match &self.health_addr {
            Some(addr) => Some(bind_listener(addr, "health").await?),
            None => None,
        };

        let hub = spawn_hub(self.hub_config);

        Ok(SixlettersServer {
            transport,
            admin,
            health,
            hub,
        })
    }
}

impl Default for SixlettersServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn bind_listener(
    addr: &str,
    role: &'static str,
) -> Result<TcpListener, SixlettersError> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr, role, "listening");
    Ok(listener)
}

/// A bound Sixletters server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SixlettersServer {
    transport: WebSocketTransport,
    admin: Option<TcpListener>,
    health: Option<TcpListener>,
    hub: HubHandle,
}

impl SixlettersServer {
    /// Creates a new builder.
    pub fn builder() -> SixlettersServerBuilder {
        SixlettersServerBuilder::new()
    }

    /// Returns the address the WebSocket listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the admin listener's address, if enabled.
    pub fn admin_local_addr(&self) -> Option<SocketAddr> {
        self.admin.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Returns the health listener's address, if enabled.
    pub fn health_local_addr(&self) -> Option<SocketAddr> {
        self.health.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Returns a handle to the round registry.
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming peers and spawns a task for each that runs the
    /// WebSocket upgrade and then the connection handler, so a peer that
    /// stalls mid-handshake only holds up its own task.
    ///
    /// Returns `Ok(())` once the hub reports it is drained: every round
    /// is gone after the server held one, or a phase-out found nothing
    /// left to wait for.
    pub async fn run(mut self) -> Result<(), SixlettersError> {
        tracing::info!("Sixletters server running");

        let mut listeners = Vec::new();
        if let Some(admin) = self.admin.take() {
            listeners.push(tokio::spawn(run_admin(admin, self.hub.clone())));
        }
        if let Some(health) = self.health.take() {
            listeners.push(tokio::spawn(run_health(health, self.hub.clone())));
        }

        let hub = self.hub.clone();
        let drained = hub.drained();
        tokio::pin!(drained);

        loop {
            tokio::select! {
                accepted = self.transport.accept() => match accepted {
                    Ok(incoming) => {
                        let hub = self.hub.clone();
                        tokio::spawn(async move {
                            let peer = incoming.peer_addr();
                            let conn = match incoming.upgrade().await {
                                Ok(conn) => conn,
                                Err(e) => {
                                    tracing::debug!(%peer, error = %e, "upgrade failed");
                                    return;
                                }
                            };
                            if let Err(e) = handle_connection(conn, hub).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
                () = &mut drained => {
                    tracing::info!("every round is gone, shutting down");
                    break;
                }
            }
        }

        for listener in listeners {
            listener.abort();
        }
        Ok(())
    }
}
