//! End-to-end CLI scenarios (spec.md §8 S1-S6), driven the way
//! `faxc-drv`'s `cli_tests.rs` drives the compiler binary: spawn the real
//! `sbasic` executable against a fixture file and assert on stdout.

use assert_cmd::Command;
use std::io::Write;
use tempfile::NamedTempFile;

fn run_source(source: &str) -> assert_cmd::assert::Assert {
    let mut file = NamedTempFile::with_suffix(".bas").expect("create fixture file");
    file.write_all(source.as_bytes()).expect("write fixture");

    let mut cmd = Command::cargo_bin("sbasic").expect("locate sbasic binary");
    cmd.arg(file.path());
    cmd.assert()
}

#[test]
fn cli_help_output() {
    let mut cmd = Command::cargo_bin("sbasic").unwrap();
    cmd.arg("--help");
    cmd.assert().success().stdout(predicates::str::contains("sbasic").or(predicates::str::contains("Usage")));
}

// Every numeric PRINT item carries a leading sign-position space and a
// trailing field-terminator space (spec.md §4.4.6); only the trailing one
// is invisible at end-of-line, which is why spec.md's own S1/S5 renderings
// don't show it but S2's semicolon-joined run of numbers does (it shows
// up as the double space between consecutive numbers).
#[test]
fn s1_fizzbuzz() {
    let source = "FOR i=1 TO 15\nIF i MOD 15=0 THEN\nPRINT \"FizzBuzz\"\nELSEIF i MOD 3=0 THEN\nPRINT \"Fizz\"\nELSEIF i MOD 5=0 THEN\nPRINT \"Buzz\"\nELSE\nPRINT i\nEND IF\nNEXT\n";
    let expected = " 1 \n 2 \nFizz\n 4 \nBuzz\nFizz\n 7 \n 8 \nFizz\nBuzz\n 11 \nFizz\n 13 \n 14 \nFizzBuzz\n";
    run_source(source).success().stdout(predicates::str::diff(expected));
}

#[test]
fn s2_negative_step_for_loop() {
    let source = "FOR i=10 TO 1 STEP -2\nPRINT i;\nNEXT\n";
    run_source(source).success().stdout(predicates::str::diff(" 10  8  6  4  2 "));
}

#[test]
fn s3_select_case_range_match() {
    let source = "SELECT CASE 85\nCASE 90 TO 100\nPRINT \"A\"\nCASE 80 TO 89\nPRINT \"B\"\nCASE ELSE\nPRINT \"C\"\nEND SELECT\n";
    run_source(source).success().stdout(predicates::str::diff("B\n"));
}

#[test]
fn s4_data_read_print_with_comma_zones() {
    let source = "DATA 1,\"two\",3.5\nREAD a%, b$, c#\nPRINT a%, b$, c#\n";
    run_source(source).success().stdout(predicates::str::diff(" 1            two            3.5 \n"));
}

#[test]
fn s5_function_call() {
    let source = "FUNCTION F(n)\nF = n * n\nEND FUNCTION\nPRINT F(7)\n";
    run_source(source).success().stdout(predicates::str::diff(" 49 \n"));
}

#[test]
fn s6_sums_piped_stdin_lines_via_channel_zero() {
    let mut file = NamedTempFile::with_suffix(".bas").expect("create fixture file");
    file.write_all(
        b"DO WHILE NOT EOF(0)\nLINE INPUT #0, L$\ntotal = total + VAL(L$)\nLOOP\nPRINT total\n",
    )
    .expect("write fixture");

    let mut cmd = Command::cargo_bin("sbasic").expect("locate sbasic binary");
    cmd.arg(file.path()).write_stdin("10\n20\n30\n");
    cmd.assert().success().stdout(predicates::str::diff(" 60 \n"));
}

#[test]
fn syntax_errors_are_reported_and_exit_nonzero() {
    let source = "PRINT (((\n";
    run_source(source).failure();
}

#[test]
fn unknown_file_is_a_clean_error_not_a_panic() {
    let mut cmd = Command::cargo_bin("sbasic").unwrap();
    cmd.arg("/nonexistent/path/does-not-exist.bas");
    cmd.assert().failure().stderr(predicates::str::contains("error:"));
}
