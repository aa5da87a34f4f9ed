use std::process::Command;

const REVISION_VAR: &str = "INBOX_BUILD_REVISION";

/// `git describe` of the tree being built, if there is one.
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    let revision = String::from_utf8(output.stdout).ok()?;
    let revision = revision.trim();
    (!revision.is_empty()).then(|| revision.to_owned())
}

fn main() {
    // Packaged builds without a checkout can pass the revision in.
    let revision = std::env::var(REVISION_VAR)
        .ok()
        .filter(|revision| !revision.trim().is_empty())
        .or_else(git_revision);

    let version = match revision {
        Some(revision) => format!("{}+{}", env!("CARGO_PKG_VERSION"), revision.trim()),
        None => env!("CARGO_PKG_VERSION").to_owned(),
    };
    println!("cargo:rustc-env=BUILD_VERSION={version}");
    println!("cargo:rerun-if-env-changed={REVISION_VAR}");
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=src/");
}
