// src/catalog.rs
//! Product catalog with atomic order transactions.
//!
//! This module owns the shared mutable state of the shop: the fixed product
//! collection and the global order totals. [`Catalog::transact`] is the only
//! mutation path and runs the whole check-stock/decide/mutate step under one
//! write lock, so two concurrent orders can never both claim the last unit of
//! a product and the totals always agree with the per-product counters.
//!
//! ## Key properties
//!
//! - **Linearizable transactions**: one store-wide lock held for the minimal
//!   critical section
//! - **Exact money**: prices and revenue are integer cents, formatted to two
//!   decimals only at the edges
//! - **Bounded failure log**: failed buyers are recorded up to a fixed
//!   capacity; an append past capacity is reported, never an unchecked write
//! - **Defensive ids**: every requested id is accepted and mapped into range
//!
//! ## Example
//!
//! ```rust
//! use eshop::catalog::{Catalog, CatalogConfig, Outcome};
//!
//! let catalog = Catalog::new(CatalogConfig::default());
//!
//! let t = catalog.transact(0, "Client_1");
//! assert_eq!(
//!     t.outcome,
//!     Outcome::Purchased { description: "Product_0".into(), price_cents: 1_000 }
//! );
//! assert_eq!(catalog.get(0).remaining_stock, 1);
//! ```

use std::sync::RwLock;

/// Money amounts are integer cents end to end.
pub type Cents = u64;

#[derive(Clone, Copy, Debug)]
pub struct CatalogConfig {
    /// Number of products in the catalog.
    pub products: usize,
    /// Units of stock each product starts with.
    pub initial_stock: u32,
    /// Capacity of each product's failed-buyer log. Sized to the maximum
    /// number of concurrent sessions in the default setup.
    pub failed_log_capacity: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products: 20,
            initial_stock: 2,
            failed_log_capacity: 5,
        }
    }
}

/// Result of one order decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Purchased { description: String, price_cents: Cents },
    OutOfStock { description: String },
}

/// One committed transaction.
#[derive(Clone, Debug)]
pub struct Transacted {
    pub outcome: Outcome,
    /// The failed-buyer log was already full when this failure arrived. The
    /// order outcome is unaffected; the caller records the condition.
    pub log_overflow: bool,
}

#[derive(Clone, Debug)]
pub struct ProductSnapshot {
    pub description: String,
    pub price_cents: Cents,
    pub remaining_stock: u32,
    pub request_count: u64,
    pub sold_count: u64,
    pub failed_count: u64,
    pub failed_buyers: Vec<String>,
}

/// Global order totals, maintained under the same lock as the products.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub total_orders: u64,
    pub successful_orders: u64,
    pub failed_orders: u64,
    pub revenue_cents: Cents,
}

/// Consistent view of the whole store, for the report and for tests.
#[derive(Clone, Debug)]
pub struct CatalogSnapshot {
    pub products: Vec<ProductSnapshot>,
    pub totals: Totals,
}

#[derive(Debug)]
struct Product {
    description: String,
    price_cents: Cents,
    remaining_stock: u32,
    request_count: u64,
    sold_count: u64,
    // Counts every failed order; failed_buyers keeps only the first
    // `failed_log_capacity` names, so request/sold/failed stay conserved
    // even after the log fills up.
    failed_count: u64,
    failed_buyers: Vec<String>,
}

#[derive(Debug)]
struct Inner {
    products: Vec<Product>,
    totals: Totals,
}

pub struct Catalog {
    inner: RwLock<Inner>,
    product_count: usize,
    initial_stock: u32,
    failed_log_capacity: usize,
}

impl Catalog {
    pub fn new(cfg: CatalogConfig) -> Self {
        assert!(cfg.products > 0, "catalog needs at least one product");
        assert!(cfg.products <= i32::MAX as usize, "too many products");

        let products = (0..cfg.products)
            .map(|i| Product {
                description: format!("Product_{i}"),
                price_cents: (i as Cents + 1) * 1_000,
                remaining_stock: cfg.initial_stock,
                request_count: 0,
                sold_count: 0,
                failed_count: 0,
                failed_buyers: Vec::new(),
            })
            .collect();

        Self {
            inner: RwLock::new(Inner {
                products,
                totals: Totals::default(),
            }),
            product_count: cfg.products,
            initial_stock: cfg.initial_stock,
            failed_log_capacity: cfg.failed_log_capacity,
        }
    }

    #[inline]
    pub fn product_count(&self) -> usize {
        self.product_count
    }

    /// Maps any requested id into the valid index range.
    ///
    /// Uses `rem_euclid`, so the result is always non-negative: `-1` maps to
    /// the last product. Out-of-range ids are accepted by contract, never
    /// rejected.
    #[inline]
    pub fn normalize(&self, id: i32) -> usize {
        id.rem_euclid(self.product_count as i32) as usize
    }

    /// Consistent snapshot of one product.
    pub fn get(&self, id: i32) -> ProductSnapshot {
        let idx = self.normalize(id);
        let inner = self.inner.read().unwrap();
        snapshot_product(&inner.products[idx])
    }

    /// Runs one order transaction: count the request, then either sell a
    /// unit (updating stock, sold count, revenue and totals) or record the
    /// failure and the buyer's name.
    ///
    /// The whole step holds the write lock, so every snapshot taken by
    /// [`Catalog::get`] or [`Catalog::snapshot`] observes a state where the
    /// conservation laws hold.
    pub fn transact(&self, id: i32, requester: &str) -> Transacted {
        let idx = self.normalize(id);
        let mut guard = self.inner.write().unwrap();
        let inner = &mut *guard;
        let p = &mut inner.products[idx];

        p.request_count += 1;
        inner.totals.total_orders += 1;

        if p.remaining_stock > 0 {
            p.remaining_stock -= 1;
            p.sold_count += 1;
            inner.totals.successful_orders += 1;
            inner.totals.revenue_cents += p.price_cents;
            return Transacted {
                outcome: Outcome::Purchased {
                    description: p.description.clone(),
                    price_cents: p.price_cents,
                },
                log_overflow: false,
            };
        }

        p.failed_count += 1;
        inner.totals.failed_orders += 1;

        let log_overflow = p.failed_buyers.len() >= self.failed_log_capacity;
        if !log_overflow {
            p.failed_buyers.push(requester.to_owned());
        }

        Transacted {
            outcome: Outcome::OutOfStock {
                description: p.description.clone(),
            },
            log_overflow,
        }
    }

    /// Consistent snapshot of every product plus the totals.
    pub fn snapshot(&self) -> CatalogSnapshot {
        let inner = self.inner.read().unwrap();
        CatalogSnapshot {
            products: inner.products.iter().map(snapshot_product).collect(),
            totals: inner.totals,
        }
    }
}

fn snapshot_product(p: &Product) -> ProductSnapshot {
    ProductSnapshot {
        description: p.description.clone(),
        price_cents: p.price_cents,
        remaining_stock: p.remaining_stock,
        request_count: p.request_count,
        sold_count: p.sold_count,
        failed_count: p.failed_count,
        failed_buyers: p.failed_buyers.clone(),
    }
}

impl Catalog {
    /// Panics unless every conservation law holds. Test support; cheap
    /// enough to call after any sequence of transactions.
    pub fn assert_invariants(&self) {
        let inner = self.inner.read().unwrap();

        let mut sum_requests = 0u64;
        let mut sum_sold_value = 0u64;

        for p in &inner.products {
            // 1) stock is conserved per product
            assert_eq!(
                p.sold_count + u64::from(p.remaining_stock),
                u64::from(self.initial_stock),
                "stock conservation broken for {}",
                p.description
            );

            // 2) every request either sold or failed
            assert_eq!(
                p.request_count,
                p.sold_count + p.failed_count,
                "request split broken for {}",
                p.description
            );

            // 3) failure log is bounded and tracks the failure count
            assert!(
                p.failed_buyers.len() <= self.failed_log_capacity,
                "failed-buyer log over capacity for {}",
                p.description
            );
            assert_eq!(
                p.failed_buyers.len() as u64,
                p.failed_count.min(self.failed_log_capacity as u64),
                "failed-buyer log out of step for {}",
                p.description
            );

            sum_requests += p.request_count;
            sum_sold_value += p.sold_count * p.price_cents;
        }

        // 4) the totals agree with the per-product counters
        let t = &inner.totals;
        assert_eq!(
            t.total_orders,
            t.successful_orders + t.failed_orders,
            "order totals out of balance"
        );
        assert_eq!(t.total_orders, sum_requests, "total orders mismatch");
        assert_eq!(t.revenue_cents, sum_sold_value, "revenue mismatch");
    }
}
