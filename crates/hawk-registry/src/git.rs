//! Git subprocess plumbing for package installs and updates.
//!
//! Everything goes through the `git` binary; clones are shallow and
//! quiet, and every subprocess enforces an explicit timeout.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};

/// Default timeout for git subprocesses.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(120);

/// Shallow-clone `url` into `dest` (which must not exist yet).
pub fn shallow_clone(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    let mut cmd = Command::new("git");
    cmd.args(["clone", "--depth", "1", "--quiet", url])
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = wait_with_timeout(cmd, timeout)
        .with_context(|| format!("failed to run git clone for {url}"))?;
    if !status.success() {
        // Clean up a partial clone so a retry starts fresh.
        let _ = std::fs::remove_dir_all(dest);
        bail!("git clone failed for {url}");
    }
    Ok(())
}

/// Resolve HEAD of a checkout to a full commit hash.
pub fn head_commit(repo: &Path) -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(repo)
        .output()
        .context("failed to run git rev-parse")?;
    if !output.status.success() {
        bail!(
            "git rev-parse HEAD failed in {}: {}",
            repo.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn wait_with_timeout(mut cmd: Command, timeout: Duration) -> Result<std::process::ExitStatus> {
    let mut child = cmd.spawn().context("failed to spawn git")?;
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().context("failed to poll git")? {
            return Ok(status);
        }
        if start.elapsed() >= timeout {
            let _ = child.kill();
            let _ = child.wait();
            bail!("git timed out after {}s", timeout.as_secs());
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}
