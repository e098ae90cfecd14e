// src/client.rs
//! Simulated shopper swarm, the client role of the simulation.
//!
//! Each shopper connects on its own, sends a fixed number of randomly chosen
//! product ids with pacing between orders, and prints every response tagged
//! with its shopper number. A shopper that cannot connect (or loses its
//! connection mid-run) reports the error and stops; the swarm as a whole
//! still runs to completion and the process exits cleanly.

use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tracing::warn;

use crate::wire;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Server address, host:port.
    pub connect: String,
    /// Concurrent shoppers to spawn.
    pub shoppers: usize,
    /// Orders each shopper places.
    pub orders: u32,
    /// Delay between orders. Zero disables pacing.
    pub pacing: Duration,
    /// Product id range shoppers draw from.
    pub products: usize,
}

/// Runs all shoppers to completion.
pub async fn run(cfg: ClientConfig) -> Result<()> {
    let mut shoppers = Vec::with_capacity(cfg.shoppers);
    for k in 1..=cfg.shoppers {
        let cfg = cfg.clone();
        shoppers.push(tokio::spawn(async move {
            if let Err(e) = shop(&cfg, k).await {
                warn!("Client {k}: {e:#}");
                println!("Client {k}: connection error: {e:#}");
            }
        }));
    }

    for s in shoppers {
        s.await.context("join shopper task")?;
    }
    Ok(())
}

async fn shop(cfg: &ClientConfig, shopper: usize) -> Result<()> {
    let stream = TcpStream::connect(&cfg.connect)
        .await
        .with_context(|| format!("connect {}", cfg.connect))?;
    stream.set_nodelay(true).ok();
    let mut stream = BufReader::new(stream);

    for _ in 0..cfg.orders {
        let product_id = rand::thread_rng().gen_range(0..cfg.products as i32);

        wire::write_request(&mut stream, product_id)
            .await
            .context("send order")?;
        let text = wire::read_response(&mut stream)
            .await
            .context("read order response")?;

        // The response text carries its own newline.
        print!("Client {shopper}: {text}");

        if !cfg.pacing.is_zero() {
            tokio::time::sleep(cfg.pacing).await;
        }
    }

    Ok(())
}
