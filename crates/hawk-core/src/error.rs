#[derive(thiserror::Error, Debug)]
pub enum HawkError {
    #[error("Invalid component name '{0}': must match [A-Za-z0-9_][A-Za-z0-9._-]* with no path separators")]
    InvalidName(String),

    #[error("Unknown component type '{0}' (expected: skill, hook, prompt, agent, mcp)")]
    UnknownComponentType(String),

    #[error("{kind} '{name}' already exists (use --replace to overwrite)")]
    AlreadyExists { kind: String, name: String },

    #[error("{kind} '{name}' not found in registry")]
    ComponentNotFound { kind: String, name: String },

    #[error("Package '{0}' not found")]
    PackageNotFound(String),

    #[error("Package '{name}' source type would change from {existing} to {new}; remove and re-import it explicitly")]
    SourceTypeConflict {
        name: String,
        existing: String,
        new: String,
    },

    #[error("Package '{name}' source path does not exist: {path} (remove the package or restore the path)")]
    SourcePathMissing { name: String, path: String },

    #[error("Unknown host tool '{0}'")]
    UnknownTool(String),

    #[error("Profile '{0}' is not defined")]
    ProfileNotFound(String),

    #[error("Profile '{profile}' references profile '{nested}'; profile overlays are single-level")]
    ProfileCycle { profile: String, nested: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_name() {
        let err = HawkError::InvalidName("../etc".into());
        assert!(err.to_string().contains("'../etc'"));
    }

    #[test]
    fn test_display_component_not_found() {
        let err = HawkError::ComponentNotFound {
            kind: "hook".into(),
            name: "notify.py".into(),
        };
        assert_eq!(err.to_string(), "hook 'notify.py' not found in registry");
    }

    #[test]
    fn test_display_source_type_conflict() {
        let err = HawkError::SourceTypeConflict {
            name: "ex".into(),
            existing: "git".into(),
            new: "local".into(),
        };
        assert!(err.to_string().contains("from git to local"));
    }

    #[test]
    fn test_display_profile_cycle() {
        let err = HawkError::ProfileCycle {
            profile: "focus".into(),
            nested: "deep".into(),
        };
        assert!(err.to_string().contains("single-level"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HawkError>();
    }
}
