use hawk_config::TypeLists;
use hawk_core::ComponentType;

use super::*;
use crate::adapter::SyncScope;
use crate::testutil::{fixture, state};

#[test]
fn test_prompt_projected_as_toml() {
    let fx = fixture();
    fx.add_file(
        ComponentType::Prompt,
        "review",
        "# Review the diff\n\nLook at the change and comment.\n",
    );

    let adapter = GeminiAdapter::new(&fx.home);
    let scope = SyncScope::Global;
    let ctx = fx.ctx(&scope);
    let lists = TypeLists {
        prompts: vec!["review".to_string()],
        ..Default::default()
    };
    let result = adapter.sync(&ctx, &state(lists));
    assert!(result.is_success(), "errors: {:?}", result.errors);

    let path = fx.home.join(".gemini").join("commands").join("review.toml");
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# managed by hawk\n"));

    // The projection must be parseable TOML with the body intact.
    let parsed: toml::Value = toml::from_str(&content).unwrap();
    assert_eq!(
        parsed["description"].as_str().unwrap(),
        "Review the diff"
    );
    assert!(parsed["prompt"].as_str().unwrap().contains("comment."));
}

#[test]
fn test_hostile_prompt_body_escaped() {
    // Bodies containing TOML string delimiters must survive round-trip.
    let fx = fixture();
    let hostile = "Line with \"\"\" and '''\nBackslash \\ and \"quotes\"\n";
    fx.add_file(ComponentType::Prompt, "tricky", hostile);

    let adapter = GeminiAdapter::new(&fx.home);
    let scope = SyncScope::Global;
    let ctx = fx.ctx(&scope);
    let lists = TypeLists {
        prompts: vec!["tricky".to_string()],
        ..Default::default()
    };
    let result = adapter.sync(&ctx, &state(lists));
    assert!(result.is_success());

    let path = fx.home.join(".gemini").join("commands").join("tricky.toml");
    let parsed: toml::Value = toml::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(parsed["prompt"].as_str().unwrap(), hostile);
}

#[test]
fn test_user_command_file_not_overwritten() {
    let fx = fixture();
    fx.add_file(ComponentType::Prompt, "mine", "# Mine\n");
    let commands = fx.home.join(".gemini").join("commands");
    std::fs::create_dir_all(&commands).unwrap();
    std::fs::write(commands.join("mine.toml"), "prompt = \"user wrote this\"\n").unwrap();

    let adapter = GeminiAdapter::new(&fx.home);
    let scope = SyncScope::Global;
    let ctx = fx.ctx(&scope);
    let lists = TypeLists {
        prompts: vec!["mine".to_string()],
        ..Default::default()
    };
    let result = adapter.sync(&ctx, &state(lists));
    assert!(!result.is_success());
    assert_eq!(
        std::fs::read_to_string(commands.join("mine.toml")).unwrap(),
        "prompt = \"user wrote this\"\n"
    );
}

#[test]
fn test_stale_managed_command_removed_user_kept() {
    let fx = fixture();
    fx.add_file(ComponentType::Prompt, "keep", "# Keep\n");
    fx.add_file(ComponentType::Prompt, "drop", "# Drop\n");

    let adapter = GeminiAdapter::new(&fx.home);
    let scope = SyncScope::Global;
    let ctx = fx.ctx(&scope);
    let both = TypeLists {
        prompts: vec!["keep".to_string(), "drop".to_string()],
        ..Default::default()
    };
    adapter.sync(&ctx, &state(both));

    let commands = fx.home.join(".gemini").join("commands");
    std::fs::write(commands.join("user.toml"), "prompt = \"user\"\n").unwrap();

    let only_keep = TypeLists {
        prompts: vec!["keep".to_string()],
        ..Default::default()
    };
    let result = adapter.sync(&ctx, &state(only_keep));
    assert!(result.is_success());
    assert!(commands.join("keep.toml").exists());
    assert!(!commands.join("drop.toml").exists());
    assert!(commands.join("user.toml").exists());
    assert!(result.unlinked.iter().any(|a| a.name == "drop"));
}

#[test]
fn test_unsupported_components_skipped() {
    let fx = fixture();
    fx.add_dir(ComponentType::Skill, "deploy", &[("SKILL.md", "# d\n")]);
    fx.add_hook("h.sh", "# hawk-hook: events=stop,notification\n");

    let adapter = GeminiAdapter::new(&fx.home);
    let scope = SyncScope::Global;
    let ctx = fx.ctx(&scope);
    let lists = TypeLists {
        skills: vec!["deploy".to_string()],
        hooks: vec!["h.sh".to_string()],
        ..Default::default()
    };
    let result = adapter.sync(&ctx, &state(lists));

    // Skips only — the run is successful.
    assert!(result.is_success());
    assert_eq!(result.skipped.len(), 3); // 1 skill + 2 hook events
    assert!(result.linked.is_empty());
}

#[test]
fn test_mcp_into_settings_json() {
    let fx = fixture();
    fx.add_file(
        ComponentType::Mcp,
        "dodo",
        "command: npx\nargs: [-y, dodo-mcp]\n",
    );

    let adapter = GeminiAdapter::new(&fx.home);
    let scope = SyncScope::Global;
    let ctx = fx.ctx(&scope);
    let lists = TypeLists {
        mcp: vec!["dodo".to_string()],
        ..Default::default()
    };
    let result = adapter.sync(&ctx, &state(lists));
    assert!(result.is_success());

    let settings: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(fx.home.join(".gemini").join("settings.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(settings["mcpServers"]["dodo"]["command"], "npx");
}
