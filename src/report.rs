// src/report.rs
//! Final consistency report. Pure read over a post-barrier snapshot; the
//! caller guarantees no writer was active when the snapshot was taken.

use std::fmt::Write;

use crate::catalog::{CatalogSnapshot, Cents};

fn price(cents: Cents) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Renders per-product demand figures followed by the global summary.
pub fn render(snap: &CatalogSnapshot) -> String {
    let mut out = String::new();

    out.push_str("\n--- Eshop Report ---\n");
    for p in &snap.products {
        let _ = writeln!(out, "Product: {}", p.description);
        let _ = writeln!(out, "  Requests: {}", p.request_count);
        let _ = writeln!(out, "  Sold: {}", p.sold_count);
        out.push_str("  Failed Users: ");
        for name in &p.failed_buyers {
            out.push_str(name);
            out.push(' ');
        }
        out.push('\n');
    }

    let t = &snap.totals;
    out.push_str("\nSummary:\n");
    let _ = writeln!(out, "  Total Orders: {}", t.total_orders);
    let _ = writeln!(out, "  Successful Orders: {}", t.successful_orders);
    let _ = writeln!(out, "  Failed Orders: {}", t.failed_orders);
    let _ = writeln!(out, "  Total Revenue: {}", price(t.revenue_cents));

    out
}
