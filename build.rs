//! Build script for ghdigest - embeds version information for `--version`.
//!
//! `BUILD_INFO_HUMAN` is `{CARGO_PKG_VERSION} ({git}) {rustc --version}`
//! where `{git}` is `git describe --tags --always --dirty` when the crate
//! is built from a checkout with tags, otherwise a pseudo-version
//! `v{CARGO_PKG_VERSION}-{timestamp}-{commit}`. Parts that cannot be
//! determined are left out.

use std::{env, process::Command};

use chrono::Utc;

fn main() {
    ["src", "queries", "build.rs", "Cargo.toml", "Cargo.lock"]
        .iter()
        .for_each(|path| println!("cargo:rerun-if-changed={path}"));

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={}", build_info());
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn pseudo_version(version: &str) -> Option<String> {
    let commit = run("git", &["rev-parse", "--short=12", "HEAD"])?;
    let timestamp = run("git", &["log", "-1", "--format=%ct"])
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
        .format("%Y%m%d%H%M%S")
        .to_string();
    Some(format!("v{version}-{timestamp}-{commit}"))
}

fn git_version(version: &str) -> Option<String> {
    match run("git", &["describe", "--tags", "--always", "--dirty"]) {
        // A bare hash means there are no tags to describe from.
        Some(desc) if desc.contains('v') || desc.contains("-g") => Some(desc),
        _ => pseudo_version(version),
    }
}

fn build_info() -> String {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();

    [
        Some(version.clone()),
        git_version(&version).map(|v| format!("({v})")),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .filter(|s| !s.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}
