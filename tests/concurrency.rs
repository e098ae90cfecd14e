// tests/concurrency.rs
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use eshop::catalog::{Catalog, CatalogConfig, Outcome};
use eshop::server::{Server, ServerConfig};
use eshop::session::SessionPlan;
use eshop::wire;
use tokio::io::BufReader;
use tokio::net::TcpStream;

#[test]
fn oversubscribed_product_sells_exactly_its_stock() {
    let catalog = Arc::new(Catalog::new(CatalogConfig {
        products: 1,
        initial_stock: 3,
        failed_log_capacity: 8,
    }));

    let mut handles = Vec::new();
    for k in 0..8 {
        let c = catalog.clone();
        handles.push(thread::spawn(move || {
            let name = format!("Client_{}", k + 1);
            matches!(c.transact(0, &name).outcome, Outcome::Purchased { .. })
        }));
    }

    let sold = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&purchased| purchased)
        .count();
    assert_eq!(sold, 3);

    let snap = catalog.snapshot();
    assert_eq!(snap.totals.successful_orders, 3);
    assert_eq!(snap.totals.failed_orders, 5);
    assert_eq!(snap.products[0].remaining_stock, 0);
    assert_eq!(snap.products[0].failed_buyers.len(), 5);
    catalog.assert_invariants();
}

fn test_config(sessions: usize, orders: u32) -> ServerConfig {
    ServerConfig {
        sessions,
        plan: SessionPlan {
            orders,
            pacing: Duration::ZERO,
        },
        catalog: CatalogConfig {
            products: 20,
            initial_stock: 2,
            failed_log_capacity: sessions,
        },
    }
}

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

async fn place_orders(addr: SocketAddr, ids: &[i32]) -> anyhow::Result<Vec<String>> {
    let stream = TcpStream::connect(addr).await?;
    stream.set_nodelay(true).ok();
    let mut stream = BufReader::new(stream);

    let mut responses = Vec::with_capacity(ids.len());
    for &id in ids {
        wire::write_request(&mut stream, id).await?;
        responses.push(wire::read_response(&mut stream).await?);
    }
    Ok(responses)
}

#[tokio::test(flavor = "multi_thread")]
async fn five_sessions_of_ten_orders_total_fifty() {
    let server = Server::bind(loopback(), test_config(5, 10)).await.unwrap();
    let addr = server.local_addr().unwrap();
    let catalog = server.catalog();
    let serve = tokio::spawn(server.serve());

    let mut shoppers = Vec::new();
    for k in 0..5i32 {
        shoppers.push(tokio::spawn(async move {
            let ids: Vec<i32> = (0..10).map(|j| (k * 7 + j * 3) % 20).collect();
            place_orders(addr, &ids).await.unwrap()
        }));
    }
    for s in shoppers {
        let responses = s.await.unwrap();
        assert_eq!(responses.len(), 10);
        for r in &responses {
            assert!(
                r.starts_with("Order successful: ") || r.starts_with("Order failed: "),
                "unexpected response: {r:?}"
            );
        }
    }

    let snap = serve.await.unwrap().unwrap();
    assert_eq!(snap.totals.total_orders, 50);
    assert_eq!(
        snap.totals.total_orders,
        snap.totals.successful_orders + snap.totals.failed_orders
    );
    catalog.assert_invariants();
}

#[tokio::test(flavor = "multi_thread")]
async fn dropped_session_keeps_committed_orders_and_barrier_releases() {
    let server = Server::bind(loopback(), test_config(2, 10)).await.unwrap();
    let addr = server.local_addr().unwrap();
    let catalog = server.catalog();
    let serve = tokio::spawn(server.serve());

    // First session drops its connection after 4 of 10 orders.
    let responses = place_orders(addr, &[0, 1, 2, 3]).await.unwrap();
    assert_eq!(responses.len(), 4);

    // Second session completes normally.
    let full: Vec<i32> = (0..10).collect();
    place_orders(addr, &full).await.unwrap();

    let snap = serve.await.unwrap().unwrap();
    assert_eq!(snap.totals.total_orders, 14);
    assert_eq!(
        snap.totals.total_orders,
        snap.totals.successful_orders + snap.totals.failed_orders
    );
    catalog.assert_invariants();
}

#[tokio::test(flavor = "multi_thread")]
async fn out_of_range_ids_are_served_not_rejected() {
    let server = Server::bind(loopback(), test_config(1, 3)).await.unwrap();
    let addr = server.local_addr().unwrap();
    let catalog = server.catalog();
    let serve = tokio::spawn(server.serve());

    // -1 and 20 both wrap into the catalog; 19 hits the last product directly.
    let responses = place_orders(addr, &[-1, 20, 19]).await.unwrap();
    assert!(responses[0].contains("Product_19"));
    assert!(responses[1].contains("Product_0"));
    assert!(responses[2].contains("Product_19"));

    let snap = serve.await.unwrap().unwrap();
    assert_eq!(snap.products[19].request_count, 2);
    assert_eq!(snap.products[0].request_count, 1);
    catalog.assert_invariants();
}
