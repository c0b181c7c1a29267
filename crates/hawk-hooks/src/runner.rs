//! Per-event runner generation.
//!
//! For every event declared by at least one enabled hook, the generator
//! emits an executable `<event>.sh` under the runners directory. Host
//! tools invoke the runner with the event payload on stdin; the runner
//! chains hook invocations and exits 0 on success, 2 to request a block
//! (message on stderr), other non-zero for non-blocking errors — those
//! semantics belong to the hook scripts; the runner propagates them.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, warn};

use crate::event::HookEvent;
use crate::meta;

/// Escape a string for safe shell usage by wrapping in single quotes.
///
/// Internal single quotes are escaped as '\'' (end quote, escaped quote,
/// start quote).
pub fn shell_escape(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Options for runner generation.
#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    /// `export KEY=value` lines prepended before the first hook call.
    /// Keys failing `[A-Za-z_][A-Za-z0-9_]*` are dropped with a warning.
    pub env: Vec<(String, String)>,
}

/// Outcome of a generation pass.
#[derive(Debug, Default)]
pub struct GeneratedRunners {
    /// Runners written this pass, in event order.
    pub written: Vec<(HookEvent, PathBuf)>,
    /// Stale `*.sh` files removed because no hook declares their event
    /// any more.
    pub removed: Vec<PathBuf>,
}

/// Group hook names by declared event, preserving hook order within each
/// event. Inert hooks (no events) contribute nothing.
pub fn group_by_event(
    hook_names: &[String],
    hooks_dir: &Path,
) -> BTreeMap<HookEvent, Vec<String>> {
    let mut buckets: BTreeMap<HookEvent, Vec<String>> = BTreeMap::new();
    for name in hook_names {
        let path = hooks_dir.join(name);
        let parsed = meta::parse(&path);
        for event in parsed.events {
            buckets.entry(event).or_default().push(name.clone());
        }
    }
    buckets
}

/// Generate one runner per declared event under `runners_dir` and delete
/// any `*.sh` not in the newly produced set.
///
/// Each runner is written to a temp file alongside the target and renamed
/// into place, so a failed write leaves the prior runner intact.
pub fn generate_runners(
    hook_names: &[String],
    hooks_dir: &Path,
    runners_dir: &Path,
    options: &RunnerOptions,
) -> Result<GeneratedRunners> {
    std::fs::create_dir_all(runners_dir)
        .with_context(|| format!("failed to create {}", runners_dir.display()))?;

    let buckets = group_by_event(hook_names, hooks_dir);
    let mut result = GeneratedRunners::default();

    for (event, names) in &buckets {
        let script = render_runner(names, hooks_dir, options);
        let target = runners_dir.join(event.runner_file_name());
        write_executable(&target, &script)?;
        result.written.push((*event, target));
    }

    // Stale cleanup: any runner for an event no hook declares any more.
    let keep: Vec<String> = buckets.keys().map(|e| e.runner_file_name()).collect();
    for entry in std::fs::read_dir(runners_dir)
        .with_context(|| format!("failed to read {}", runners_dir.display()))?
    {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        if file_name.ends_with(".sh") && !keep.contains(&file_name) {
            let path = entry.path();
            std::fs::remove_file(&path)
                .with_context(|| format!("failed to remove stale runner {}", path.display()))?;
            result.removed.push(path);
        }
    }

    Ok(result)
}

fn env_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap())
}

fn render_runner(hook_names: &[String], hooks_dir: &Path, options: &RunnerOptions) -> String {
    let mut script = String::from("#!/usr/bin/env bash\nset -euo pipefail\nINPUT=$(cat)\n");

    for (key, value) in &options.env {
        if !env_name_regex().is_match(key) {
            warn!(key, "dropping env var with invalid name");
            continue;
        }
        script.push_str(&format!("export {key}={}\n", shell_escape(value)));
    }

    for name in hook_names {
        let path = hooks_dir.join(name);
        match render_call(&path) {
            Some(call) => {
                script.push_str(&call);
                script.push('\n');
            }
            None => warn!(hook = name.as_str(), "no call template for hook extension"),
        }
    }

    script.push_str("exit 0\n");
    script
}

/// Render one guarded hook invocation, chosen by extension.
///
/// A missing file at runtime must never fail the runner (config may name
/// a hook that was since removed), hence the `[[ -f … ]]` guard.
fn render_call(path: &Path) -> Option<String> {
    let quoted = shell_escape(&path.to_string_lossy());
    let body = if is_context_file(path) {
        // Context injectors write to stdout; they don't receive stdin.
        format!("  cat {quoted}")
    } else {
        let (command, run_arg) = interpreter_for(path)?;
        let interp = resolve_interpreter(command);
        let run_arg = run_arg.map(|a| format!(" {a}")).unwrap_or_default();
        format!("  printf '%s' \"$INPUT\" | {interp}{run_arg} {quoted} || exit $?")
    };
    Some(format!("if [[ -f {quoted} ]]; then\n{body}\nfi"))
}

/// Markdown, plain text and `.stdout.*` hooks inject context via `cat`.
fn is_context_file(path: &Path) -> bool {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if file_name.contains(".stdout.") {
        return true;
    }
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("txt")
    )
}

fn interpreter_for(path: &Path) -> Option<(&'static str, Option<&'static str>)> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => Some(("python3", None)),
        Some("sh") => Some(("bash", None)),
        Some("js") => Some(("node", None)),
        Some("ts") => Some(("bun", Some("run"))),
        _ => None,
    }
}

/// Absolute interpreter path when resolvable, bare command otherwise.
fn resolve_interpreter(command: &str) -> String {
    match which::which(command) {
        Ok(path) => shell_escape(&path.to_string_lossy()),
        Err(_) => {
            debug!(command, "interpreter not found on PATH, using bare name");
            command.to_string()
        }
    }
}

fn write_executable(target: &Path, content: &str) -> Result<()> {
    let dir = target
        .parent()
        .with_context(|| format!("runner path has no parent: {}", target.display()))?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".runner-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .with_context(|| format!("failed to stage runner in {}", dir.display()))?;
    tmp.write_all(content.as_bytes())
        .context("failed to write runner contents")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o700))
            .context("failed to set runner permissions")?;
    }

    tmp.persist(target)
        .with_context(|| format!("failed to install runner {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
