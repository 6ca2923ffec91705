use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// End-to-end command tests: spawn the binary the way a user would and
/// assert on its streams and exit status.

fn sample_config() -> String {
    "\
# Linux/x86 6.6.8 Kernel Configuration
CONFIG_X86_64=y
CONFIG_GCC_VERSION=120300
CONFIG_CLANG_VERSION=0
CONFIG_BUG=y
CONFIG_STACKPROTECTOR=y
CONFIG_STACKPROTECTOR_STRONG=y
CONFIG_RANDOMIZE_BASE=y
CONFIG_PAGE_TABLE_ISOLATION=y
CONFIG_ARCH_MMAP_RND_BITS=32
CONFIG_ARCH_MMAP_RND_BITS_MAX=32
# CONFIG_COMPAT_BRK is not set
# CONFIG_DEVKMEM is not set
"
    .to_string()
}

fn write_file(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn audit_cmd() -> Command {
    let mut cmd = Command::cargo_bin("kconfig-audit").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn check(config: &Path) -> Command {
    let mut cmd = audit_cmd();
    cmd.arg("check").arg("--config").arg(config);
    cmd
}

#[test]
fn test_check_audits_a_config_and_exits_zero() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config", &sample_config());

    check(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] Detected microarchitecture: X86_64"))
        .stdout(predicate::str::contains("[+] Detected kernel version: 6.6"))
        .stdout(predicate::str::contains("[+] Detected compiler: GCC 120300"))
        .stdout(predicate::str::contains("option name"))
        .stdout(predicate::str::contains("CONFIG_STACKPROTECTOR_STRONG"))
        .stdout(predicate::str::contains("[+] Config check is finished:"));
}

#[test]
fn test_check_reads_gzipped_configs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(sample_config().as_bytes()).unwrap();
    fs::write(&path, encoder.finish().unwrap()).unwrap();

    check(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] Config check is finished:"));
}

#[test]
fn test_json_mode_prints_nothing_but_the_report() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config", &sample_config());

    let output = check(&config).args(["--mode", "json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let records = report.as_array().unwrap();
    assert!(!records.is_empty());
    assert!(records.iter().any(|record| record["option_name"] == "CONFIG_BUG"));
    assert!(records.iter().all(|record| record["verdict"].is_string()));
}

#[test]
fn test_cmdline_rows_join_only_when_a_cmdline_file_is_given() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config", &sample_config());
    let cmdline = write_file(&dir, "cmdline", "quiet pti=on mitigations=auto\n");

    check(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("mitigations").not());

    check(&config)
        .arg("--cmdline")
        .arg(&cmdline)
        .assert()
        .success()
        .stdout(predicate::str::contains("[+] Kernel cmdline file to check:"))
        .stdout(predicate::str::contains("mitigations"));
}

#[test]
fn test_show_fail_suppresses_passing_rows() {
    let dir = TempDir::new().unwrap();
    let config = write_file(
        &dir,
        "config",
        "# Linux/x86 6.6.8 Kernel Configuration\n\
         CONFIG_X86_64=y\n\
         CONFIG_STACKPROTECTOR_STRONG=y\n\
         CONFIG_DEVKMEM=y\n",
    );

    check(&config)
        .args(["--mode", "show_fail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CONFIG_DEVKMEM"))
        .stdout(predicate::str::contains("CONFIG_STACKPROTECTOR_STRONG").not())
        .stdout(predicate::str::contains("(suppressed in output)"));
}

#[test]
fn test_verbose_mode_lists_options_no_check_covers() {
    let dir = TempDir::new().unwrap();
    let mut text = sample_config();
    text.push_str("CONFIG_MYDRIVER=m\n");
    let config = write_file(&dir, "config", &text);

    check(&config)
        .args(["--mode", "verbose"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[?] No check found for option CONFIG_MYDRIVER (m)"));
}

#[test]
fn test_print_lists_the_checklist_without_results() {
    audit_cmd()
        .args(["print", "X86_64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("option name"))
        .stdout(predicate::str::contains("CONFIG_RANDOMIZE_BASE"))
        .stdout(predicate::str::contains("check result").not());
}

#[test]
fn test_print_rejects_filter_modes() {
    for mode in ["show_ok", "show_fail"] {
        audit_cmd()
            .args(["print", "X86_64", "--mode", mode])
            .assert()
            .failure()
            .stderr(predicate::str::contains("[!] ERROR:"));
    }
}

#[test]
fn test_generate_emits_a_mergeable_fragment() {
    audit_cmd()
        .args(["generate", "ARM64"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("CONFIG_ARM64=y\n"))
        .stdout(predicate::str::contains("# CONFIG_DEVKMEM is not set"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    audit_cmd()
        .args(["check", "--config", "/definitely/not/here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[!] ERROR: I/O error"));
}

#[test]
fn test_duplicate_options_abort_the_audit() {
    let dir = TempDir::new().unwrap();
    let mut text = sample_config();
    text.push_str("CONFIG_BUG=y\n");
    let config = write_file(&dir, "config", &text);

    check(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_BUG exists multiple times"));
}

#[test]
fn test_multi_line_cmdline_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = write_file(&dir, "config", &sample_config());
    let cmdline = write_file(&dir, "cmdline", "quiet\nsplash\n");

    check(&config)
        .arg("--cmdline")
        .arg(&cmdline)
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than one line"));
}
