// tests/golden_smoke.rs
use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};

#[test]
fn golden_smoke_server_and_client_over_loopback() {
    let exe = env!("CARGO_BIN_EXE_eshop");

    let mut server = Command::new(exe)
        .args(["server", "--bind", "127.0.0.1:0", "--pacing-ms", "0"])
        .env("RUST_LOG", "info")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // The server logs its bound address once the listener is up.
    let mut stderr = BufReader::new(server.stderr.take().unwrap());
    let addr = loop {
        let mut line = String::new();
        assert_ne!(
            stderr.read_line(&mut line).unwrap(),
            0,
            "server exited before listening"
        );
        if let Some(pos) = line.find("listening on ") {
            // Keep only address characters in case the log line carries
            // ANSI styling.
            break line[pos + "listening on ".len()..]
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ':')
                .collect::<String>();
        }
    };

    // Keep draining stderr so the server can never block on a full pipe.
    let drain = std::thread::spawn(move || {
        let mut sink = String::new();
        let _ = stderr.read_to_string(&mut sink);
        sink
    });

    let client = Command::new(exe)
        .args(["client", "--connect", &addr, "--pacing-ms", "0"])
        .output()
        .unwrap();
    assert!(client.status.success());

    let client_stdout = String::from_utf8(client.stdout).unwrap();
    assert!(
        client_stdout.contains("Client 1: Order"),
        "no tagged responses in client output: {client_stdout:?}"
    );

    let out = server.wait_with_output().unwrap();
    let _ = drain.join();
    assert!(out.status.success());

    let report = String::from_utf8(out.stdout).unwrap();
    assert!(report.contains("--- Eshop Report ---"));
    assert!(report.contains("Product: Product_0"));
    assert!(report.contains("Total Orders: 50"));
    assert!(report.contains("Total Revenue: $"));
}

#[test]
fn unknown_role_is_a_usage_error() {
    let exe = env!("CARGO_BIN_EXE_eshop");
    let out = Command::new(exe).arg("shopkeeper").output().unwrap();
    assert!(!out.status.success());
}
