// src/session.rs
//! One client connection's order loop, and the barrier the server waits on.
//!
//! Every accepted connection runs [`run`] as its own task: a fixed number of
//! order round-trips against the shared catalog with a pacing delay after
//! each response. The first transport error ends the session early; orders
//! already committed stay committed, there is no rollback. Whatever the exit
//! path, the session's [`CompletionSignal`] fires so the server's barrier can
//! release.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::catalog::{Catalog, Outcome, Transacted};
use crate::metrics::Metrics;
use crate::wire;

/// What one session is expected to do.
#[derive(Clone, Copy, Debug)]
pub struct SessionPlan {
    /// Orders the session must complete.
    pub orders: u32,
    /// Delay after each response. Zero disables pacing (tests).
    pub pacing: Duration,
}

/// Processes one order: read the request, run the catalog transaction, write
/// the response. Transport failures propagate to the session loop; there are
/// no retries at this layer.
pub async fn process_order(
    stream: &mut TcpStream,
    requester: &str,
    catalog: &Catalog,
    metrics: &Metrics,
) -> Result<Transacted> {
    let id = wire::read_request(stream).await.context("read order request")?;
    let t = catalog.transact(id, requester);

    metrics.inc_orders();
    match &t.outcome {
        Outcome::Purchased { .. } => metrics.inc_ok(),
        Outcome::OutOfStock { .. } => metrics.inc_failed(),
    }
    if t.log_overflow {
        metrics.inc_log_overflow();
        warn!("{requester}: failed-buyer log full, name not recorded");
    }

    let frame = wire::encode_outcome(&t.outcome);
    stream
        .write_all(&frame)
        .await
        .context("write order response")?;
    Ok(t)
}

/// Drives one session to termination and fires its completion signal.
pub async fn run(
    mut stream: TcpStream,
    requester: String,
    catalog: Arc<Catalog>,
    plan: SessionPlan,
    metrics: Arc<Metrics>,
    signal: CompletionSignal,
) {
    let mut completed = 0u32;
    let mut aborted = false;

    for _ in 0..plan.orders {
        match process_order(&mut stream, &requester, &catalog, &metrics).await {
            Ok(_) => completed += 1,
            Err(e) => {
                warn!(
                    "{requester}: session ended after {completed}/{} orders: {e:#}",
                    plan.orders
                );
                aborted = true;
                break;
            }
        }
        // Pacing sleeps outside any lock.
        if !plan.pacing.is_zero() {
            tokio::time::sleep(plan.pacing).await;
        }
    }

    if aborted {
        metrics.inc_sessions_aborted();
    } else {
        metrics.inc_sessions_completed();
        info!("{requester}: completed {completed} orders");
    }

    drop(stream);
    signal.done();
}

/// Releases the server only after every registered session has signaled.
///
/// [`CompletionBarrier::new`] declares the expected session count; each
/// session takes one [`CompletionSignal`] via [`CompletionBarrier::register`]
/// and fires it on termination. The signal also fires on drop, so a panicking
/// session task cannot wedge the barrier. Calling
/// [`CompletionBarrier::await_all`] before all sessions are registered is a
/// programming error and panics.
pub struct CompletionBarrier {
    expected: usize,
    registered: usize,
    tx: mpsc::Sender<()>,
    rx: mpsc::Receiver<()>,
}

pub struct CompletionSignal {
    tx: Option<mpsc::Sender<()>>,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        let (tx, rx) = mpsc::channel(expected.max(1));
        Self {
            expected,
            registered: 0,
            tx,
            rx,
        }
    }

    /// Hands out one signal per expected session.
    pub fn register(&mut self) -> CompletionSignal {
        assert!(
            self.registered < self.expected,
            "barrier: more sessions registered than declared"
        );
        self.registered += 1;
        CompletionSignal {
            tx: Some(self.tx.clone()),
        }
    }

    /// Blocks until every registered session has signaled.
    pub async fn await_all(mut self) {
        assert_eq!(
            self.registered, self.expected,
            "barrier: await_all before all sessions registered"
        );
        drop(self.tx);
        for _ in 0..self.expected {
            self.rx
                .recv()
                .await
                .expect("barrier: signal dropped without firing");
        }
    }
}

impl CompletionSignal {
    /// Marks the session as terminated.
    pub fn done(mut self) {
        self.fire();
    }

    fn fire(&mut self) {
        if let Some(tx) = self.tx.take() {
            // Channel capacity equals the session count; this cannot fail.
            let _ = tx.try_send(());
        }
    }
}

impl Drop for CompletionSignal {
    fn drop(&mut self) {
        self.fire();
    }
}
