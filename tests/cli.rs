//! CLI integration tests for zawk
//!
//! These tests run the zawk binary and verify command-line behavior.

use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::NamedTempFile;

fn run_zawk(args: &[&str], input: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zawk"));
    cmd.args(args);
    cmd.env_remove("ZAWK_LOG");

    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().unwrap();

    if let Some(input_str) = input
        && let Some(mut stdin) = child.stdin.take()
    {
        stdin.write_all(input_str.as_bytes()).unwrap();
    }

    child.wait_with_output().unwrap()
}

/// Run zawk expecting success, returning stdout
fn scan_ok(args: &[&str], input: Option<&str>) -> String {
    let output = run_zawk(args, input);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn program_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_cli_help() {
    let output = scan_ok(&["--help"], None);
    assert!(output.contains("Usage:"));
    assert!(output.contains("zawk"));
}

#[test]
fn test_cli_version() {
    let output = scan_ok(&["--version"], None);
    assert!(output.starts_with("zawk "));
}

#[test]
fn test_cli_token_listing() {
    let output = scan_ok(&["x = 1"], None);
    assert_eq!(
        output,
        "1\tvar\tvariable\tx\n\
         1\ttoken\t=\t=\n\
         1\tnumber\tnumber\t1\n\
         1\tnewline\tnewline\t\\n\n\
         1\teof\tend of input\t\n"
    );
}

#[test]
fn test_cli_classes() {
    let output = scan_ok(&[r#"BEGIN { print length("ab") }"#], None);
    let classes: Vec<&str> = output
        .lines()
        .map(|line| line.split('\t').nth(1).unwrap())
        .collect();
    assert_eq!(
        classes,
        [
            "keyword", "token", "keyword", "builtin", "token", "string", "token", "token",
            "newline", "eof"
        ]
    );
}

#[test]
fn test_cli_program_file() {
    let file = program_file("/a/ { n++ }\nEND { print n }\n");
    let output = scan_ok(&["-f", file.path().to_str().unwrap()], None);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines[0], "1\tregex\tregex\ta");
    assert!(lines.iter().any(|l| l.starts_with("2\tkeyword\tEND")));
}

#[test]
fn test_cli_multiple_program_files() {
    let first = program_file("function f(x) { return x }");
    let second = program_file("BEGIN { f(1) }");
    let output = scan_ok(
        &[
            "-f",
            first.path().to_str().unwrap(),
            "-f",
            second.path().to_str().unwrap(),
        ],
        None,
    );
    // Files are read back to back; one newline is supplied at the very end
    let newlines: Vec<&str> = output
        .lines()
        .filter(|l| l.contains("\tnewline\t"))
        .collect();
    assert_eq!(newlines, ["1\tnewline\tnewline\t\\n"]);
    assert!(output.contains("\ttoken\t}\t}\n1\tkeyword\tBEGIN\tBEGIN\n"));
    assert!(output.contains("\tuserfunc\tfunction name\tf\n"));
}

#[test]
fn test_cli_program_from_stdin() {
    let output = scan_ok(&["-f", "-"], Some("NR > 1\n"));
    assert!(output.starts_with("1\tvar\tvariable\tNR\n1\ttoken\t>\t>\n"));
}

#[test]
fn test_cli_echo_source() {
    let output = run_zawk(&["-p", "a\nb"], None);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("|>  1 a\n"));
    assert!(stderr.contains("|>  2 b\n"));
}

#[test]
fn test_cli_lexical_error() {
    let output = run_zawk(&["a\nb @ c"], None);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("(command line): 2: Unexpected token '@'"));
}

#[test]
fn test_cli_unterminated_string() {
    let output = run_zawk(&["print \"abc"], None);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unterminated string"));
}

#[test]
fn test_cli_warning_printed() {
    let output = run_zawk(&[r#"x = "\q""#], None);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("(command line): 1: warning: '\\q' treated as plain 'q'"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("\tstring\tstring\tq\n"));
}

#[test]
fn test_cli_missing_program_file() {
    let output = run_zawk(&["-f", "/nonexistent/prog.awk"], None);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("zawk: can't open /nonexistent/prog.awk"));
}

#[test]
fn test_cli_no_program() {
    let output = run_zawk(&[], None);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no program"));
}

#[test]
fn test_cli_unknown_option() {
    let output = run_zawk(&["-z", "x"], None);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown option: -z"));
}
