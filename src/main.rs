use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use colored::*;

// Use modules from the library
use netsentry::core::sink::{EventSink, LogBuffer};
use netsentry::core::{
    repair_counters, MonitorRuntime, PortScanner, ProcessAuditor, RuntimeConfig,
    SystemProcessTable, ThreatBand,
};

fn main() -> Result<()> {
    netsentry::init_logging();

    let matches = Command::new("netsentry")
        .version("0.1.0")
        .about("Telemetry and anomaly-detection core for a desktop host dashboard")
        .subcommand(
            Command::new("watch")
                .about("Run the live monitoring loop (type scan / audit / repair / quit)")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Tick interval in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("450"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print samples as JSON lines (for scripting)")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("scan").about("One-shot localhost port sweep"))
        .subcommand(Command::new("audit").about("One-shot process audit"))
        .subcommand(Command::new("repair").about("Rebuild OS performance counters (elevated)"))
        .get_matches();

    match matches.subcommand() {
        Some(("scan", _)) => run_scan(),
        Some(("audit", _)) => run_audit(),
        Some(("repair", _)) => {
            repair_counters(&PrintSink);
            Ok(())
        }
        Some(("watch", sub)) => {
            let interval = sub.get_one::<u64>("interval").copied().unwrap_or(450);
            run_watch(interval, sub.get_flag("json"))
        }
        _ => run_watch(450, false),
    }
}

/// Sink that renders lines straight to the terminal.
struct PrintSink;

impl EventSink for PrintSink {
    fn emit(&self, line: &str) {
        let stamp = format!("[{}]", chrono::Local::now().format("%H:%M:%S"));
        let rendered = if line.contains("(RISK)")
            || line.contains("[SUSPICIOUS]")
            || line.starts_with("[ERROR]")
        {
            line.red().to_string()
        } else if line.contains("[HEAVY]") || line.starts_with("[ADMIN]") {
            line.yellow().to_string()
        } else if line.starts_with("[SUCCESS]") {
            line.green().to_string()
        } else {
            line.to_string()
        };
        println!("{} {}", stamp.as_str().dimmed(), rendered);
    }
}

fn run_scan() -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let sink = PrintSink;

    sink.emit("INITIATING NETWORK SCAN...");
    runtime.block_on(PortScanner::default().scan(&sink));
    sink.emit("SCAN COMPLETE.");
    Ok(())
}

fn run_audit() -> Result<()> {
    let sink = PrintSink;

    sink.emit("INITIATING PROCESS AUDIT...");
    let auditor = ProcessAuditor::default();
    let mut table = SystemProcessTable::new();
    auditor.audit(&mut table, &sink);
    sink.emit("AUDIT COMPLETE.");
    Ok(())
}

fn run_watch(interval_ms: u64, json: bool) -> Result<()> {
    let sink = Arc::new(LogBuffer::new());
    let config = RuntimeConfig {
        tick_interval: Duration::from_millis(interval_ms),
        ..Default::default()
    };
    let runtime = Arc::new(MonitorRuntime::new(config, sink.clone() as Arc<dyn EventSink>)?);

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("Failed to install Ctrl-C handler")?;
    }

    spawn_command_reader(Arc::clone(&runtime), Arc::clone(&running));

    let sample_rx = runtime.sample_rx();
    let mut last_logged: u64 = 0;

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(interval_ms));

        // Print log lines that arrived since the last pass.
        let total = sink.total_emitted();
        if total > last_logged {
            let lines = sink.lines();
            let fresh = (total - last_logged) as usize;
            for line in lines.iter().skip(lines.len().saturating_sub(fresh)) {
                println!("{line}");
            }
            last_logged = total;
        }

        let sample = sample_rx.borrow().clone();
        if json {
            println!("{}", serde_json::to_string(&sample)?);
        } else {
            let status = format!(
                "CPU {:5.1}%  RAM {:5.1}%  THREADS {}  UPTIME {}",
                sample.cpu_percent,
                sample.ram_percent,
                sample.thread_count,
                format_uptime(sample.uptime)
            );
            let status = match ThreatBand::for_cpu(sample.cpu_percent) {
                ThreatBand::Low => status.as_str().cyan(),
                ThreatBand::Medium => status.as_str().yellow(),
                ThreatBand::High => status.as_str().red(),
            };
            println!("{status}");
        }
    }

    runtime.shutdown();
    Ok(())
}

/// Read interactive commands from stdin, mirroring the dashboard buttons.
fn spawn_command_reader(runtime: Arc<MonitorRuntime>, running: Arc<AtomicBool>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let accepted = match line.trim() {
                "scan" => runtime.trigger_scan(),
                "audit" => runtime.trigger_audit(),
                "repair" => runtime.trigger_repair(),
                "quit" | "exit" => {
                    running.store(false, Ordering::SeqCst);
                    break;
                }
                "" => continue,
                other => {
                    println!("unknown command: {other} (scan | audit | repair | quit)");
                    continue;
                }
            };
            if !accepted {
                println!("{}", "OPERATION ALREADY IN PROGRESS.".yellow());
            }
        }
    });
}

fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}h{:02}m{:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}
