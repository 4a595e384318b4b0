use std::env;
use std::process::Command;

const PREFIX: &str = "BUDGET_SYNC_BUILD";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let git_hash = run("git", &["rev-parse", "--short", "HEAD"]).unwrap_or_else(unknown);
    let git_status = run_raw("git", &["status", "--porcelain"])
        .map(|out| if out.trim().is_empty() { "clean" } else { "dirty" }.to_string())
        .unwrap_or_else(unknown);
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown-target".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown-profile".to_string());
    let rustc = run("rustc", &["--version"]).unwrap_or_else(unknown);

    for (key, value) in [
        ("HASH", git_hash),
        ("STATUS", git_status),
        ("TIMESTAMP", timestamp),
        ("TARGET", target),
        ("PROFILE", profile),
        ("RUSTC", rustc),
    ] {
        println!("cargo:rustc-env={PREFIX}_{key}={value}");
    }
}

fn unknown() -> String {
    "unknown".to_string()
}

/// Trimmed stdout of a successful command, `None` when empty or failed.
fn run(program: &str, args: &[&str]) -> Option<String> {
    run_raw(program, args)
        .map(|out| out.trim().to_string())
        .filter(|out| !out.is_empty())
}

fn run_raw(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok()
}
