use std::process::Command;

fn bitgrid(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bitgrid"))
        .args(args)
        .output()
        .expect("Failed to execute bitgrid")
}

#[test]
fn test_parse_prints_instructions() {
    let output = bitgrid(&["parse", "^ (#10/01) >A mh"]);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["^ (#10/01)", ">A", "mh"]);
}

#[test]
fn test_parse_rejects_unknown_token() {
    let output = bitgrid(&["parse", "mv qq"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("qq"), "stderr should name the bad token");
}

#[test]
fn test_run_flips_rows() {
    let output = bitgrid(&["run", "mv", "--input", "#10/01"]);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#01/10"), "stdout was: {}", stdout);
}

#[test]
fn test_run_show_state_lists_stored_boards() {
    let output = bitgrid(&["run", ">A ~ >B", "--input", "#1", "--show-state"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(">A #1"), "stdout was: {}", stdout);
    assert!(stdout.contains(">B #0"), "stdout was: {}", stdout);
}

#[test]
fn test_run_undefined_board_fails() {
    let output = bitgrid(&["run", "& (Missing)", "--input", "#1"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing"), "stderr was: {}", stderr);
}

#[test]
fn test_compile_prints_tape() {
    let output = bitgrid(&["compile", "~", "--height", "1", "--width", "1"]);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "a_v0 = in_0_0\na_v1 = ~ a_v0\na_out_0_0 = a_v1\n");
}

#[test]
fn test_equiv_reports_equivalent() {
    let output = bitgrid(&[
        "equiv", "mh", "md mv md", "--height", "2", "--width", "2",
    ]);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("equivalent"), "stdout was: {}", stdout);
    assert!(stdout.contains("16"), "stdout was: {}", stdout);
}

#[test]
fn test_equiv_reports_witness() {
    let output = bitgrid(&["equiv", "~", "", "--height", "1", "--width", "1"]);
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not equivalent"), "stdout was: {}", stdout);
    assert!(stdout.contains("witness:"), "stdout was: {}", stdout);
}

#[test]
fn test_equiv_interpreted_agrees() {
    let output = bitgrid(&[
        "equiv",
        "~",
        "^ (#11/11)",
        "--height",
        "2",
        "--width",
        "2",
        "--interpreted",
    ]);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("equivalent"), "stdout was: {}", stdout);
}
