use crate::{
    config::{Config, ServerConfig},
    model_service::ModelService,
    model_store::{load_model_state, ModelState},
    routes::api_routes,
};
use axum::Router;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::{
    net::TcpListener,
    signal,
    sync::broadcast::{self, Sender},
    task::JoinHandle,
};

pub struct HttpServer {
    router: Router,
    listener: TcpListener,
}

impl HttpServer {
    pub async fn new<M: ModelService>(
        model_state: ModelState<M>,
        config: &ServerConfig,
    ) -> anyhow::Result<Self> {
        let addr = config.get_address();

        if !model_state.is_ready() {
            tracing::warn!("No model loaded, /predict will answer 500 until restart");
        }

        let router = api_routes::<M>().with_state(model_state);
        let listener = TcpListener::bind(addr.as_str()).await?;

        Ok(Self { router, listener })
    }

    /// Serves on a background task until the returned handle is shut down.
    pub fn spawn(self) -> anyhow::Result<ServerHandle> {
        let addr = self.listener.local_addr()?;
        tracing::info!("Starting prediction service on {}", addr);

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        let listener = self.listener;
        let router = self.router;

        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await.ok();
                })
                .await?;
            tracing::info!("Prediction service stopped");
            Ok(())
        });

        Ok(ServerHandle {
            addr,
            shutdown_tx,
            task,
        })
    }
}

/// Owned by whoever started the server; the only way to stop it.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Sender<()>,
    task: JoinHandle<anyhow::Result<()>>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Where a local client reaches `/predict`. A wildcard bind address is
    /// swapped for loopback, keeping the bound port.
    pub fn predict_url(&self) -> String {
        let mut addr = self.addr;
        if addr.ip().is_unspecified() {
            addr.set_ip(match addr.ip() {
                IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            });
        }
        format!("http://{}/predict", addr)
    }

    pub async fn shutdown(self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(());
        self.task.await?
    }
}

pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let model_state = load_model_state(config.model.get_path())?;
    let server = HttpServer::new(model_state, &config.server).await?;
    let handle = server.spawn()?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown");

    handle.shutdown().await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
