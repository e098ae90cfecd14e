// src/metrics.rs
//! Process-level counters, observability only. The authoritative order
//! totals live in the catalog under its lock; these track how the run went
//! (sessions aborted, overflowed failure logs) and feed one summary log line.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Metrics {
    pub orders_served: AtomicU64,
    pub orders_ok: AtomicU64,
    pub orders_failed: AtomicU64,
    pub log_overflow: AtomicU64,
    pub sessions_completed: AtomicU64,
    pub sessions_aborted: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_orders(&self) {
        self.orders_served.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_ok(&self) {
        self.orders_ok.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_failed(&self) {
        self.orders_failed.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_log_overflow(&self) {
        self.log_overflow.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_sessions_completed(&self) {
        self.sessions_completed.fetch_add(1, Ordering::Relaxed);
    }
    #[inline]
    pub fn inc_sessions_aborted(&self) {
        self.sessions_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary_text(&self) -> String {
        // Relaxed loads are fine; this is read after the barrier.
        format!(
            "orders={} ok={} failed={} log_overflow={} sessions_completed={} sessions_aborted={}",
            self.orders_served.load(Ordering::Relaxed),
            self.orders_ok.load(Ordering::Relaxed),
            self.orders_failed.load(Ordering::Relaxed),
            self.log_overflow.load(Ordering::Relaxed),
            self.sessions_completed.load(Ordering::Relaxed),
            self.sessions_aborted.load(Ordering::Relaxed),
        )
    }
}
