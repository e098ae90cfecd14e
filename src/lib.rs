//! # eshop - Concurrent Shop Simulation
//!
//! This crate simulates a tiny online shop: a server owns a fixed catalog of
//! products with limited stock and serves purchase requests from multiple
//! concurrent client sessions over TCP. Each session runs a fixed number of
//! sequential orders with pacing between them, and the server prints a final
//! consistency report once every session has finished.
//!
//! ## Architecture
//!
//! - **Catalog**: product records and global totals behind one lock; the
//!   check-stock/decide/mutate step is a single atomic transaction
//! - **Wire protocol**: 4-byte binary order requests, NUL-terminated text
//!   responses with a fixed size bound
//! - **Sessions**: one task per accepted connection, all sharing the same
//!   catalog instance, released through a completion barrier
//! - **Report**: plain-text snapshot rendered strictly after the barrier
//!
//! ## Example
//!
//! ```rust
//! use eshop::catalog::{Catalog, CatalogConfig, Outcome};
//!
//! let catalog = Catalog::new(CatalogConfig {
//!     products: 4,
//!     initial_stock: 1,
//!     failed_log_capacity: 2,
//! });
//!
//! let first = catalog.transact(0, "Client_1");
//! assert!(matches!(first.outcome, Outcome::Purchased { .. }));
//!
//! // Only one unit existed, so the next buyer goes home empty-handed.
//! let second = catalog.transact(0, "Client_2");
//! assert!(matches!(second.outcome, Outcome::OutOfStock { .. }));
//! ```

pub mod catalog;
pub mod client;
pub mod metrics;
pub mod report;
pub mod server;
pub mod session;
pub mod wire;
