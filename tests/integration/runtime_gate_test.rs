use std::net::TcpListener;
use std::sync::Arc;
use std::time::{Duration, Instant};

use netsentry::core::ScanConfig;
use netsentry::{EventSink, LogBuffer, MonitorRuntime, RuntimeConfig};

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Scan config slow enough to guarantee an observable in-flight window.
fn slow_scan_config() -> ScanConfig {
    ScanConfig {
        ports: vec![free_port(), free_port(), free_port()],
        connect_timeout: Duration::from_millis(100),
        probe_delay: Duration::from_millis(200),
    }
}

fn wait_until_idle(runtime: &MonitorRuntime) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while runtime.is_busy() {
        assert!(Instant::now() < deadline, "operation never finished");
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_overlapping_triggers_are_rejected_not_queued() {
    let sink = Arc::new(LogBuffer::new());
    let config = RuntimeConfig {
        scan: slow_scan_config(),
        ..RuntimeConfig::default()
    };
    let runtime =
        MonitorRuntime::new(config, sink.clone() as Arc<dyn EventSink>).expect("runtime");

    assert!(runtime.trigger_scan());
    assert!(!runtime.trigger_scan(), "second scan must be rejected");
    assert!(!runtime.trigger_audit(), "audit shares the same gate");
    assert!(!runtime.trigger_repair(), "repair shares the same gate");

    wait_until_idle(&runtime);

    // Only one scan's worth of output made it to the log.
    let lines = sink.lines();
    let starts = lines
        .iter()
        .filter(|l| l.contains("INITIATING NETWORK SCAN..."))
        .count();
    let completions = lines.iter().filter(|l| l.contains("SCAN COMPLETE.")).count();
    let port_lines = lines.iter().filter(|l| l.contains("PORT ")).count();
    assert_eq!(starts, 1);
    assert_eq!(completions, 1);
    assert_eq!(port_lines, 3);

    // The gate frees once the scan is done.
    assert!(runtime.trigger_audit());
    wait_until_idle(&runtime);
    assert!(sink.lines().iter().any(|l| l.contains("AUDIT COMPLETE.")));

    runtime.shutdown();
}

#[test]
fn test_startup_banner_and_sample_flow() {
    let sink = Arc::new(LogBuffer::new());
    let config = RuntimeConfig {
        tick_interval: Duration::from_millis(100),
        ..RuntimeConfig::default()
    };
    let runtime =
        MonitorRuntime::new(config, sink.clone() as Arc<dyn EventSink>).expect("runtime");

    let mut sample_rx = runtime.sample_rx();

    // Give the tick task time to initialize and produce samples.
    std::thread::sleep(Duration::from_secs(2));

    let lines = sink.lines();
    assert!(lines.iter().any(|l| l.contains("SYSTEM INITIALIZED...")));
    assert!(
        lines
            .iter()
            .any(|l| l.contains("SENSORS ONLINE.") || l.contains("[ERROR] CPU SENSORS CORRUPTED.")),
        "initialization must report sensor state"
    );

    let sample = sample_rx.borrow_and_update().clone();
    assert!((0.0..=100.0).contains(&sample.cpu_percent));
    assert!((0.0..=100.0).contains(&sample.ram_percent));

    runtime.shutdown();
}
