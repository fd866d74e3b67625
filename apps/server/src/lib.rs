//! # sgate server
//!
//! HTTP gateway in front of an embeddings provider and a Supabase store: search, facets,
//! analytics, CMS webhooks, blogs and health, behind one hardened middleware stack.
//!
//! ## Example
//! ```no_run
//! use sgate_server::Server;
//!
//! # async fn example() -> anyhow::Result<()> {
//! Server::builder().port(3001).build()?.run().await
//! # }
//! ```

mod router;

use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use sgate::domain::config::ApiConfig;
use sgate::kernel::server::ApiState;
use sgate::kernel::server::middleware::CorsPolicy;
use sgate_embeddings::{Embedder, OpenAiEmbedder};
use sgate_store::{Store, SupabaseStore};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
    embedder: Option<Arc<dyn Embedder>>,
    store: Option<Arc<dyn Store>>,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Uses `embedder` instead of building an OpenAI client from the configuration.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Uses `store` instead of building a Supabase client from the configuration.
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    fn validate_ssl_config(&self) -> Result<()> {
        if let Some(ssl) = &self.cfg.server.ssl {
            if !ssl.cert.exists() {
                anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
            }
            if !ssl.key.exists() {
                anyhow::bail!("SSL key not found at: {}", ssl.key.display());
            }

            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let metadata = ssl.key.metadata()?;
                if metadata.permissions().mode() & 0o077 != 0 {
                    warn!(
                        "SECURITY: SSL Private Key {} has insecure permissions (should be 600)",
                        ssl.key.display()
                    );
                }
            }
        }
        Ok(())
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the TLS files, when TLS is configured
    /// 2. Validates the CORS policy
    /// 3. Builds the embeddings and store clients unless they were injected
    /// 4. Constructs application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * SSL certificate/key files are missing
    /// * The allowed origin is empty, a wildcard or not a valid header value
    /// * Credentials for the OpenAI or Supabase client are missing
    pub fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let cors = CorsPolicy::from_config(&self.cfg.http).context("Invalid CORS policy")?;

        let embedder: Arc<dyn Embedder> = match self.embedder {
            Some(embedder) => embedder,
            None => Arc::new(
                OpenAiEmbedder::new(&self.cfg.services.openai)
                    .context("Failed to initialize embeddings client")?,
            ),
        };
        let store: Arc<dyn Store> = match self.store {
            Some(store) => store,
            None => Arc::new(
                SupabaseStore::new(&self.cfg.services.supabase)
                    .context("Failed to initialize store client")?,
            ),
        };

        if self.cfg.webhooks.secret.as_ref().is_none_or(|s| s.is_empty()) {
            warn!("No webhook secret configured; content webhooks will be rejected");
        }

        info!(
            environment = %self.cfg.environment,
            model = embedder.model(),
            origin = %self.cfg.http.allowed_origin,
            "Initializing server"
        );

        let state = ApiState::builder()
            .config(self.cfg)
            .embedder(embedder)
            .store(store)
            .build()
            .context("Failed to finalize API state")?;

        Ok(Server { state, cors: Arc::new(cors) })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
    cors: Arc<CorsPolicy>,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application: every route behind the middleware stack.
    pub fn router(&self) -> Router {
        router::init(self.state.clone(), Arc::clone(&self.cors))
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address
    /// or if SSL/TLS setup fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);
        let grace = Duration::from_secs(cfg.server.shutdown_grace_secs);

        info!(
            address = %address,
            ssl = cfg.server.ssl.is_some(),
            environment = %cfg.environment,
            "Starting server"
        );

        let app = self.router().into_make_service_with_connect_info::<SocketAddr>();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!(grace_secs = grace.as_secs(), "Shutdown signal received, draining connections");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        if let Some(ssl_config) = &cfg.server.ssl {
            info!("Listening on https://{address}");

            let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
                &ssl_config.cert,
                &ssl_config.key,
            )
            .await
            .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls_config)
                .handle(handle)
                .serve(app)
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Listening on http://{address}");

            axum_server::bind(address)
                .handle(handle)
                .serve(app)
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    /// Returns a reference to the application state.
    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
