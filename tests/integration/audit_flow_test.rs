use netsentry::core::sink::LogBuffer;
use netsentry::core::{ProcessAuditor, ProcessTable, SystemProcessTable};

#[test]
fn test_live_snapshot_is_populated() {
    let mut table = SystemProcessTable::new();
    let snapshot = table.snapshot();

    assert!(!snapshot.is_empty(), "process table should never be empty");
    assert!(snapshot.iter().all(|p| !p.name.is_empty()));
}

#[test]
fn test_live_audit_emits_top_list_and_exactly_one_verdict() {
    let auditor = ProcessAuditor::default();
    let mut table = SystemProcessTable::new();
    let sink = LogBuffer::new();

    auditor.audit(&mut table, &sink);

    let lines = sink.lines();
    let top_lines = lines
        .iter()
        .filter(|l| l.contains("[HEAVY]") || l.contains("[NORMAL]"))
        .count();
    assert!(top_lines >= 1, "expected at least one top-memory line");
    assert!(top_lines <= 5);

    // Exactly one of: ghost header or the all-clear line.
    let headers = lines
        .iter()
        .filter(|l| l.contains("--- DETECTED GHOST PROCESSES (NON-SYSTEM) ---"))
        .count();
    let all_clear = lines
        .iter()
        .filter(|l| l.contains("NO SUSPICIOUS GHOST PROCESSES DETECTED."))
        .count();
    assert_eq!(headers + all_clear, 1);
}

#[test]
fn test_audit_is_repeatable() {
    // Processes come and go between snapshots; the audit must tolerate it.
    let auditor = ProcessAuditor::default();
    let mut table = SystemProcessTable::new();

    for _ in 0..3 {
        let sink = LogBuffer::new();
        auditor.audit(&mut table, &sink);
        assert!(!sink.is_empty());
    }
}
