// src/server.rs
//! Accept loop: a bounded number of connections, one session task each, all
//! sharing a single catalog instance. The post-barrier snapshot it returns
//! is guaranteed free of concurrent mutation.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::catalog::{Catalog, CatalogConfig, CatalogSnapshot};
use crate::metrics::Metrics;
use crate::session::{self, CompletionBarrier, SessionPlan};

#[derive(Clone, Copy, Debug)]
pub struct ServerConfig {
    /// Connections accepted before the run ends.
    pub sessions: usize,
    pub plan: SessionPlan,
    pub catalog: CatalogConfig,
}

pub struct Server {
    listener: TcpListener,
    cfg: ServerConfig,
    catalog: Arc<Catalog>,
    metrics: Arc<Metrics>,
}

impl Server {
    /// Binds the listen socket. Bind failure is fatal to startup.
    pub async fn bind(addr: SocketAddr, cfg: ServerConfig) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("bind {addr}"))?;
        Ok(Self {
            listener,
            cfg,
            catalog: Arc::new(Catalog::new(cfg.catalog)),
            metrics: Arc::new(Metrics::new()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.clone()
    }

    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    /// Accepts exactly `sessions` connections, names them `Client_<k>` in
    /// accept order, runs their sessions to termination and returns the
    /// post-barrier snapshot. A session that dies early only loses its own
    /// remaining orders; the barrier still releases once the rest finish.
    pub async fn serve(self) -> Result<CatalogSnapshot> {
        let mut barrier = CompletionBarrier::new(self.cfg.sessions);

        for k in 1..=self.cfg.sessions {
            let (stream, peer) = self.listener.accept().await.context("accept")?;
            stream.set_nodelay(true).ok();

            let requester = format!("Client_{k}");
            info!("{requester}: connected from {peer}");

            let signal = barrier.register();
            tokio::spawn(session::run(
                stream,
                requester,
                self.catalog.clone(),
                self.cfg.plan,
                self.metrics.clone(),
                signal,
            ));
        }

        barrier.await_all().await;
        info!("all sessions closed; {}", self.metrics.summary_text());

        Ok(self.catalog.snapshot())
    }
}
