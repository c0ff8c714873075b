//! Stamps the binary with where and when it was built.
//!
//! `GIT_HASH` is the short commit, suffixed `-dirty` when the work tree has
//! uncommitted changes, and "unknown" outside a checkout. `BUILD_TIMESTAMP`
//! is UTC. Both appear in the startup banner and in `/health`.

use std::process::Command;

/// Trimmed stdout of a successful command
fn stdout_of(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn describe_revision() -> String {
    let Some(hash) = stdout_of("git", &["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };
    match stdout_of("git", &["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{hash}-dirty"),
        _ => hash,
    }
}

fn main() {
    let stamps = [
        ("GIT_HASH", describe_revision()),
        (
            "BUILD_TIMESTAMP",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        ),
        (
            "BUILD_PROFILE",
            std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string()),
        ),
    ];

    for (key, value) in stamps {
        println!("cargo:rustc-env={key}={value}");
    }
}
