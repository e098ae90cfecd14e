// src/main.rs
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use eshop::catalog::CatalogConfig;
use eshop::client::{self, ClientConfig};
use eshop::report;
use eshop::server::{Server, ServerConfig};
use eshop::session::SessionPlan;

#[derive(Parser, Debug)]
#[command(name = "eshop", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Serve the catalog: accept sessions, process their orders, print the report.
    Server {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: SocketAddr,
        /// Connections to accept before the run ends.
        #[arg(long, default_value_t = 5)]
        sessions: usize,
        /// Orders each session must complete.
        #[arg(long, default_value_t = 10)]
        orders: u32,
        /// Delay after each response (ms). Set 0 for no pacing.
        #[arg(long, default_value_t = 1000)]
        pacing_ms: u64,
        /// Products in the catalog.
        #[arg(long, default_value_t = 20)]
        products: usize,
        /// Initial stock per product.
        #[arg(long, default_value_t = 2)]
        stock: u32,
    },
    /// Run the shopper swarm against a server.
    Client {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        /// Concurrent shoppers to spawn.
        #[arg(long, default_value_t = 5)]
        shoppers: usize,
        /// Orders each shopper places.
        #[arg(long, default_value_t = 10)]
        orders: u32,
        /// Delay between orders (ms). Set 0 for no pacing.
        #[arg(long, default_value_t = 1000)]
        pacing_ms: u64,
        /// Product id range shoppers draw from.
        #[arg(long, default_value_t = 20)]
        products: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the report and shopper output.
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Server {
            bind,
            sessions,
            orders,
            pacing_ms,
            products,
            stock,
        } => {
            let cfg = ServerConfig {
                sessions,
                plan: SessionPlan {
                    orders,
                    pacing: Duration::from_millis(pacing_ms),
                },
                catalog: CatalogConfig {
                    products,
                    initial_stock: stock,
                    failed_log_capacity: sessions,
                },
            };

            let server = Server::bind(bind, cfg).await?;
            info!("eshop: listening on {}", server.local_addr()?);

            let snapshot = server.serve().await?;
            print!("{}", report::render(&snapshot));
            Ok(())
        }

        Cmd::Client {
            connect,
            shoppers,
            orders,
            pacing_ms,
            products,
        } => {
            client::run(ClientConfig {
                connect,
                shoppers,
                orders,
                pacing: Duration::from_millis(pacing_ms),
                products,
            })
            .await
        }
    }
}
