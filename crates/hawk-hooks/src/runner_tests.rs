use std::path::Path;

use tempfile::tempdir;

use super::*;

fn setup_hooks(hooks: &[(&str, &str)]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let hooks_dir = dir.path().join("hooks");
    std::fs::create_dir_all(&hooks_dir).unwrap();
    for (name, content) in hooks {
        std::fs::write(hooks_dir.join(name), content).unwrap();
    }
    (dir, hooks_dir)
}

fn read_runner(runners_dir: &Path, event: HookEvent) -> String {
    std::fs::read_to_string(runners_dir.join(event.runner_file_name())).unwrap()
}

#[test]
fn test_shell_escape() {
    assert_eq!(shell_escape("plain"), "'plain'");
    assert_eq!(shell_escape("it's"), "'it'\\''s'");
    assert_eq!(shell_escape("$(whoami)"), "'$(whoami)'");
}

#[test]
fn test_single_hook_multi_event() {
    // S1: one hook declaring two events yields two runners, both
    // executable, both containing a guarded invocation.
    let (root, hooks_dir) = setup_hooks(&[(
        "notify.py",
        "# hawk-hook: events=stop,notification\nprint('hi')\n",
    )]);
    let runners_dir = root.path().join("runners");

    let result = generate_runners(
        &["notify.py".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();

    let events: Vec<HookEvent> = result.written.iter().map(|(e, _)| *e).collect();
    assert!(events.contains(&HookEvent::Stop));
    assert!(events.contains(&HookEvent::Notification));
    assert_eq!(events.len(), 2);

    for event in [HookEvent::Stop, HookEvent::Notification] {
        let path = runners_dir.join(event.runner_file_name());
        assert!(path.is_file());
        let script = read_runner(&runners_dir, event);
        assert!(script.starts_with("#!/usr/bin/env bash\nset -euo pipefail\nINPUT=$(cat)\n"));
        assert!(script.contains("if [[ -f "));
        assert!(script.contains("notify.py"));
        assert!(script.contains("printf '%s' \"$INPUT\" | "));
        assert!(script.contains("|| exit $?"));
        assert!(script.trim_end().ends_with("exit 0"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700, "runner should be 0700");
        }
    }
}

#[test]
fn test_stale_runner_removed() {
    let (root, hooks_dir) = setup_hooks(&[("a.sh", "# hawk-hook: events=stop\n")]);
    let runners_dir = root.path().join("runners");
    std::fs::create_dir_all(&runners_dir).unwrap();
    std::fs::write(runners_dir.join("notification.sh"), "#!/bin/bash\n").unwrap();
    std::fs::write(runners_dir.join("keep.txt"), "not a runner").unwrap();

    let result = generate_runners(
        &["a.sh".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();

    assert!(!runners_dir.join("notification.sh").exists());
    assert!(runners_dir.join("stop.sh").exists());
    assert!(runners_dir.join("keep.txt").exists());
    assert_eq!(result.removed.len(), 1);
}

#[test]
fn test_empty_hook_set_cleans_everything() {
    let (root, hooks_dir) = setup_hooks(&[]);
    let runners_dir = root.path().join("runners");
    std::fs::create_dir_all(&runners_dir).unwrap();
    std::fs::write(runners_dir.join("stop.sh"), "#!/bin/bash\n").unwrap();

    let result =
        generate_runners(&[], &hooks_dir, &runners_dir, &RunnerOptions::default()).unwrap();
    assert!(result.written.is_empty());
    assert_eq!(result.removed.len(), 1);
    assert!(!runners_dir.join("stop.sh").exists());
}

#[test]
fn test_inert_hook_in_no_runner() {
    // S6: truncated frontmatter parses to empty metadata and the hook is
    // omitted from all runners.
    let (root, hooks_dir) = setup_hooks(&[
        ("broken.md", "---\nhawk-hook:\n  events:"),
        ("ok.sh", "# hawk-hook: events=stop\n"),
    ]);
    let runners_dir = root.path().join("runners");

    let result = generate_runners(
        &["broken.md".to_string(), "ok.sh".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();

    assert_eq!(result.written.len(), 1);
    let script = read_runner(&runners_dir, HookEvent::Stop);
    assert!(!script.contains("broken.md"));
}

#[test]
fn test_context_hook_uses_cat_without_stdin() {
    let (root, hooks_dir) = setup_hooks(&[(
        "ctx.stdout.md",
        "---\nhawk-hook:\n  events: [stop]\n---\nExtra context.\n",
    )]);
    let runners_dir = root.path().join("runners");

    generate_runners(
        &["ctx.stdout.md".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();

    let script = read_runner(&runners_dir, HookEvent::Stop);
    assert!(script.contains("cat '"));
    let cat_line = script.lines().find(|l| l.contains("cat ")).unwrap();
    assert!(!cat_line.contains("$INPUT"));
    assert!(!cat_line.contains("exit $?"));
}

#[test]
fn test_ts_hook_runs_via_bun_run() {
    let (root, hooks_dir) = setup_hooks(&[("t.ts", "# hawk-hook: events=stop\n")]);
    let runners_dir = root.path().join("runners");

    generate_runners(
        &["t.ts".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();

    let script = read_runner(&runners_dir, HookEvent::Stop);
    assert!(script.contains("bun"));
    assert!(script.contains(" run "));
}

#[test]
fn test_hooks_fire_in_declared_order() {
    let (root, hooks_dir) = setup_hooks(&[
        ("first.sh", "# hawk-hook: events=stop\n"),
        ("second.sh", "# hawk-hook: events=stop\n"),
    ]);
    let runners_dir = root.path().join("runners");

    generate_runners(
        &["first.sh".to_string(), "second.sh".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();

    let script = read_runner(&runners_dir, HookEvent::Stop);
    let first_pos = script.find("first.sh").unwrap();
    let second_pos = script.find("second.sh").unwrap();
    assert!(first_pos < second_pos);
}

#[test]
fn test_env_injection_block() {
    let (root, hooks_dir) = setup_hooks(&[("h.sh", "# hawk-hook: events=stop\n")]);
    let runners_dir = root.path().join("runners");

    let options = RunnerOptions {
        env: vec![
            ("NTFY_TOPIC".to_string(), "alerts".to_string()),
            ("BAD-NAME".to_string(), "dropped".to_string()),
            ("_OK".to_string(), "it's fine".to_string()),
        ],
    };
    generate_runners(&["h.sh".to_string()], &hooks_dir, &runners_dir, &options).unwrap();

    let script = read_runner(&runners_dir, HookEvent::Stop);
    assert!(script.contains("export NTFY_TOPIC='alerts'\n"));
    assert!(script.contains("export _OK='it'\\''s fine'\n"));
    assert!(!script.contains("BAD-NAME"));

    // Exports come before the first hook call.
    let export_pos = script.find("export NTFY_TOPIC").unwrap();
    let call_pos = script.find("if [[ -f").unwrap();
    assert!(export_pos < call_pos);
}

#[test]
fn test_regeneration_replaces_existing_runner() {
    let (root, hooks_dir) = setup_hooks(&[("h.sh", "# hawk-hook: events=stop\n")]);
    let runners_dir = root.path().join("runners");

    generate_runners(
        &["h.sh".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();
    let before = read_runner(&runners_dir, HookEvent::Stop);

    std::fs::write(
        hooks_dir.join("extra.sh"),
        "# hawk-hook: events=stop\n",
    )
    .unwrap();
    generate_runners(
        &["h.sh".to_string(), "extra.sh".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();
    let after = read_runner(&runners_dir, HookEvent::Stop);

    assert_ne!(before, after);
    assert!(after.contains("extra.sh"));
}

#[test]
fn test_group_by_event_shared_hook() {
    let (_root, hooks_dir) = setup_hooks(&[
        ("multi.py", "# hawk-hook: events=stop,notification\n"),
        ("only.sh", "# hawk-hook: events=stop\n"),
    ]);

    let buckets = group_by_event(
        &["multi.py".to_string(), "only.sh".to_string()],
        &hooks_dir,
    );
    assert_eq!(
        buckets.get(&HookEvent::Stop).unwrap(),
        &vec!["multi.py".to_string(), "only.sh".to_string()]
    );
    assert_eq!(
        buckets.get(&HookEvent::Notification).unwrap(),
        &vec!["multi.py".to_string()]
    );
}

#[test]
fn test_missing_hook_file_is_skipped() {
    let (root, hooks_dir) = setup_hooks(&[("real.sh", "# hawk-hook: events=stop\n")]);
    let runners_dir = root.path().join("runners");

    let result = generate_runners(
        &["ghost.sh".to_string(), "real.sh".to_string()],
        &hooks_dir,
        &runners_dir,
        &RunnerOptions::default(),
    )
    .unwrap();

    assert_eq!(result.written.len(), 1);
    let script = read_runner(&runners_dir, HookEvent::Stop);
    assert!(!script.contains("ghost.sh"));
}
