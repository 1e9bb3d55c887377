use std::net::TcpListener;
use std::time::Duration;

use netsentry::core::sink::LogBuffer;
use netsentry::core::{PortScanner, ScanConfig, SCAN_PORTS};
use netsentry::EventSink;

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn test_scan_distinguishes_listening_from_closed() {
    // Keep the listener alive; the backlog accepts the probe connect.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let open_port = listener.local_addr().unwrap().port();
    let closed_port = free_port();

    let config = ScanConfig {
        ports: vec![open_port, closed_port],
        connect_timeout: Duration::from_millis(200),
        probe_delay: Duration::ZERO,
    };
    let sink = LogBuffer::new();

    PortScanner::new(config).scan(&sink).await;

    let lines = sink.lines();
    assert_eq!(lines.len(), 2);
    assert!(
        lines[0].contains(&format!("[!] PORT {open_port} OPEN (RISK)")),
        "expected open marker, got: {}",
        lines[0]
    );
    assert!(
        lines[1].contains(&format!("PORT {closed_port} CLOSED")),
        "expected closed marker, got: {}",
        lines[1]
    );
}

#[tokio::test]
async fn test_default_sweep_emits_one_line_per_port() {
    let config = ScanConfig {
        probe_delay: Duration::ZERO,
        ..ScanConfig::default()
    };
    let sink = LogBuffer::new();

    PortScanner::new(config).scan(&sink).await;

    // Whatever is listening locally, every configured port gets exactly
    // one verdict, in the fixed order.
    let lines = sink.lines();
    assert_eq!(lines.len(), SCAN_PORTS.len());
    for (line, port) in lines.iter().zip(SCAN_PORTS) {
        assert!(
            line.contains(&format!("PORT {port} ")),
            "port {port} out of order: {line}"
        );
    }
}

#[tokio::test]
async fn test_scan_never_panics_on_unreachable_ports() {
    let config = ScanConfig {
        ports: vec![free_port(), free_port(), free_port()],
        connect_timeout: Duration::from_millis(50),
        probe_delay: Duration::ZERO,
    };
    let sink = LogBuffer::new();

    PortScanner::new(config).scan(&sink).await;
    sink.emit("done");

    assert_eq!(sink.lines().len(), 4);
}
