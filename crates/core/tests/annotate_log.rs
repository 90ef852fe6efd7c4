use std::fs;

use symtrace_core::annotate::{annotate_file, annotate_log, AnnotateStats, UNKNOWN_FUNCTION};
use symtrace_core::ranges::FunctionIndex;
use symtrace_core::AnnotateError;
use tempfile::tempdir;

fn index() -> FunctionIndex {
    FunctionIndex::from_lines([
        "00000000800090b0 <userret>:",
        "    800090b0:\t18059073\tcsrw\tsatp,a1",
        "00000000800090c0 <next_fn>:",
    ])
}

fn block(start: u64, end: u64) -> String {
    format!("[2026-01-18T09:33:55Z INFO  rv_emu::cpu] Block execution: {start:#x} to {end:#x}")
}

fn annotate(log: &str) -> (String, AnnotateStats) {
    let mut out = Vec::new();
    let stats = annotate_log(&index(), log.lines().map(Ok::<_, AnnotateError>), &mut out).unwrap();
    (String::from_utf8(out).unwrap(), stats)
}

#[test]
fn start_of_function_resolves_to_it() {
    let (out, _) = annotate(&block(0x8000_90b0, 0x8000_90b8));
    assert_eq!(
        out,
        "[2026-01-18T09:33:55Z INFO  rv_emu::cpu] Block execution: 0x800090b0 to 0x800090b8 userret\n"
    );
}

#[test]
fn last_byte_before_next_function_stays_in_previous() {
    let log = format!("{}\n{}\n", block(0x8000_90bf, 0x8000_90c4), block(0x8000_90c0, 0x8000_90c4));
    let (out, _) = annotate(&log);
    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].ends_with(" userret"));
    assert!(lines[1].ends_with(" next_fn"));
}

#[test]
fn address_below_lowest_function_is_unknown() {
    let (out, stats) = annotate(&block(0x8000_0000, 0x8000_0010));
    assert!(out.trim_end().ends_with(&format!(" {UNKNOWN_FUNCTION}")));
    assert_eq!(stats.lines_unresolved, 1);
}

#[test]
fn other_components_produce_no_output() {
    let log = "[2026-01-18T09:33:55Z INFO  rv_emu::bus] Block execution: 0x800090b0 to 0x800090b8";
    let (out, stats) = annotate(log);
    assert!(out.is_empty());
    assert_eq!(stats.lines_read, 1);
    assert_eq!(stats.lines_matched, 0);
}

#[test]
fn output_order_follows_input_order() {
    let starts = [0x8000_90c8, 0x8000_90b0, 0x10, 0x8000_90c0, 0x8000_90b4];
    let log: String = starts.iter().map(|&s| block(s, s + 4) + "\nnoise\n").collect();
    let (out, stats) = annotate(&log);

    let expected: Vec<String> = starts.iter().map(|&s| block(s, s + 4)).collect();
    let echoed: Vec<&str> = out.lines().map(|l| l.rsplit_once(' ').unwrap().0).collect();
    assert_eq!(echoed, expected);
    assert_eq!(stats.lines_read, 10);
    assert_eq!(stats.lines_matched, 5);
}

#[test]
fn annotating_twice_is_byte_identical() {
    let log = format!("{}\n{}\n", block(0x8000_90b0, 0x8000_90b8), block(0x1, 0x2));
    assert_eq!(annotate(&log), annotate(&log));
}

#[test]
fn matched_line_is_echoed_unmodified() {
    let line = "[2026-01-18T09:33:55Z   INFO\trv_emu::cpu]  Block execution:  0x800090B0  to  0x800090b8 ";
    let (out, _) = annotate(line);
    assert_eq!(out, format!("{line} userret\n"));
}

#[test]
fn annotate_file_handles_crlf_and_invalid_utf8() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.log");
    let mut bytes = b"\xff boot banner\r\n".to_vec();
    bytes.extend_from_slice(block(0x8000_90c0, 0x8000_90c8).as_bytes());
    bytes.extend_from_slice(b"\r\n");
    fs::write(&path, bytes).unwrap();

    let mut out = Vec::new();
    let stats = annotate_file(&index(), &path, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), format!("{} next_fn\n", block(0x8000_90c0, 0x8000_90c8)));
    assert_eq!(stats, AnnotateStats { lines_read: 2, lines_matched: 1, lines_unresolved: 0 });
}

#[test]
fn annotate_file_missing_log_is_open_error() {
    let dir = tempdir().unwrap();
    let mut out = Vec::new();
    let err = annotate_file(&index(), &dir.path().join("missing.log"), &mut out).unwrap_err();
    assert!(matches!(err, AnnotateError::Open { .. }));
}

#[test]
fn oversized_start_is_echoed_as_unknown() {
    let line = "[2026-01-18T09:33:55Z INFO  rv_emu::cpu] Block execution: \
                0x10000000000000000 to 0x10000000000000008";
    let (out, stats) = annotate(line);
    assert_eq!(out, format!("{line} {UNKNOWN_FUNCTION}\n"));
    assert_eq!(stats, AnnotateStats { lines_read: 1, lines_matched: 1, lines_unresolved: 1 });
}

#[test]
fn oversized_end_is_echoed_and_resolved_by_start() {
    let line = "[2026-01-18T09:33:55Z INFO  rv_emu::cpu] Block execution: \
                0x800090b0 to 0x10000000000000000";
    let (out, stats) = annotate(line);
    assert_eq!(out, format!("{line} userret\n"));
    assert_eq!(stats.lines_unresolved, 0);
}

#[test]
fn annotate_file_splits_on_lone_carriage_return() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run.log");
    let first = block(0x8000_90b0, 0x8000_90b8);
    let second = block(0x8000_90c0, 0x8000_90c8);
    fs::write(&path, format!("{first}\r{second}\r")).unwrap();

    let mut out = Vec::new();
    let stats = annotate_file(&index(), &path, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), format!("{first} userret\n{second} next_fn\n"));
    assert_eq!(stats.lines_matched, 2);
}
