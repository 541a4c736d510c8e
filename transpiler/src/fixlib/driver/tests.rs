use std::ffi::OsStr;
use std::fs;

use base::prelude::{Address, Label, Operand};

use super::super::output::OutputFormat;
use super::super::types::{IoAction, IoFailed, TranspileFailure};
use super::{resolve_source, transpile_file, transpile_source, OutputOptions};

fn plain() -> OutputOptions {
    OutputOptions {
        format: OutputFormat::Plain,
    }
}

#[test]
fn test_directive_scenario() {
    let resolved = resolve_source("ca: 08 00 .word 0x0008 ; ????\n").expect("should resolve");
    let instructions: Vec<_> = resolved.listing.instructions().collect();
    assert_eq!(instructions.len(), 1);
    let inst = instructions[0];
    assert!(inst.is_directive());
    assert_eq!(inst.encoding().to_string(), "0800");
    assert_eq!(inst.opcode(), ".word");
    assert_eq!(inst.operands(), &[Operand::Hex("0x0008".to_string())]);
}

#[test]
fn test_relative_branch_scenario() {
    let resolved = resolve_source(concat!(
        "2ba: 30 f4 brcc .+12 ; 0x2c8\n",
        "2c8: 08 95 ret\n",
    ))
    .expect("should resolve");
    let brcc = resolved
        .listing
        .get(&Address::from("2ba"))
        .expect("2ba is in the listing");
    assert_eq!(brcc.opcode(), "brcc");
    assert_eq!(brcc.relative_offset(), Some(12));
    let label = resolved
        .labels
        .get(&Address::from("2c8"))
        .expect("2c8 should be labelled");
    assert_eq!(brcc.operands(), &[Operand::Label(label)]);
}

#[test]
fn test_two_calls_scenario() {
    let body = concat!(
        "0: 0e 94 80 00 call 0x100 ; 0x100\n",
        "4: 0e 94 00 01 call 0x200 ; 0x200\n",
        "100: 08 95 ret\n",
        "200: 08 95 ret\n",
    );
    let resolved = resolve_source(body).expect("should resolve");
    assert_eq!(resolved.labels.get(&Address::from("100")), Some(Label::new(1)));
    assert_eq!(resolved.labels.get(&Address::from("200")), Some(Label::new(2)));

    let text = transpile_source(body, OutputOptions::default()).expect("should transpile");
    assert_eq!(text.matches("assembler.expect(avr,").count(), 3);
    assert!(text.contains("// code at 0x100\n"));
    assert!(text.contains("// code at 0x200\n"));
}

#[test]
fn test_calls_from_inside_a_call_target_give_two_blocks() {
    // The code at 100 calls itself, so the callers' block is itself a
    // call-target block and no separate leading block is needed.
    let body = concat!(
        "100: 0e 94 80 00 call 0x100 ; 0x100\n",
        "104: 0e 94 00 01 call 0x200 ; 0x200\n",
        "200: 08 95 ret\n",
    );
    let resolved = resolve_source(body).expect("should resolve");
    assert_eq!(resolved.labels.get(&Address::from("100")), Some(Label::new(1)));
    assert_eq!(resolved.labels.get(&Address::from("200")), Some(Label::new(2)));

    let text = transpile_source(body, OutputOptions::default()).expect("should transpile");
    assert_eq!(text.matches("assembler.expect(avr,").count(), 2);
    assert_eq!(text.matches("    \"\")\n").count(), 2);
    assert!(text.starts_with("// code at 0x100\n"));
    assert!(text.contains("\n\n// code at 0x200\n"));
}

#[test]
fn test_label_appears_once_and_matches_references() {
    let text = transpile_source(
        concat!(
            "10: 01 f0 breq .+0 ; 0x12\n",
            "12: 11 f4 brne .+4 ; 0x18\n",
            "14: 00 c0 rjmp .+0 ; 0x16\n",
            "16: fd cf rjmp .-6 ; 0x12\n",
            "18: 08 95 ret\n",
        ),
        plain(),
    )
    .expect("should transpile");
    assert_eq!(text.matches("L1: ").count(), 1);
    assert_eq!(
        text,
        concat!(
            "f001 breq L1\n",
            "f411 L1: brne L2\n",
            "c000 rjmp L3\n",
            "cffd L3: rjmp L1\n",
            "9508 L2: ret\n",
        )
    );
}

#[test]
fn test_duplicate_address_produces_no_output() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    let input = dir.path().join("dup.lst");
    let output = dir.path().join("dup.out");
    fs::write(&input, "10: 08 95 ret\n10: 08 95 ret\n").expect("should write test input");
    match transpile_file(input.as_os_str(), Some(&output), OutputOptions::default()) {
        Err(TranspileFailure::DuplicateAddress { line, .. }) => {
            assert_eq!(line, 2);
        }
        other => panic!("expected a duplicate address error, got {other:?}"),
    }
    assert!(!output.exists(), "no output file should have been written");
}

#[test]
fn test_transpile_file_writes_output() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    let input = dir.path().join("prog.lst");
    let output = dir.path().join("prog.txt");
    fs::write(&input, "9a:\t08 95       \tret\n").expect("should write test input");
    transpile_file(input.as_os_str(), Some(&output), plain()).expect("should transpile");
    assert_eq!(
        fs::read_to_string(&output).expect("output should be readable"),
        "9508 ret\n"
    );
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().expect("should be able to create a temporary directory");
    let input = dir.path().join("does-not-exist.lst");
    match transpile_file(OsStr::new(&input), None, plain()) {
        Err(TranspileFailure::Io(IoFailed { action, .. })) => {
            assert_eq!(action, IoAction::Read);
        }
        other => panic!("expected an I/O error, got {other:?}"),
    }
}
