use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` in a user-supplied config path (for example the value
/// of `OEMBED_REGISTRY_PATH`) to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    let home = || home_dir().unwrap_or_else(|| PathBuf::from("~"));
    if trimmed == "~" {
        return home();
    }
    match trimmed.strip_prefix("~/").or_else(|| trimmed.strip_prefix("~\\")) {
        Some(rest) => home().join(rest),
        None => PathBuf::from(trimmed),
    }
}

/// Read a trimmed, non-empty environment variable.
pub fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_unchanged() {
        assert_eq!(expand_tilde(" /etc/oembed/providers.json "), PathBuf::from("/etc/oembed/providers.json"));
    }

    #[test]
    fn tilde_prefix_is_expanded() {
        let expanded = expand_tilde("~/providers.json");
        assert!(expanded.ends_with("providers.json"));
        assert!(!expanded.starts_with("~") || home_dir().is_none());
    }

    #[test]
    fn blank_env_values_are_ignored() {
        temp_env::with_var("OEMBED_UTIL_TEST_VAR", Some("   "), || {
            assert_eq!(non_empty_env("OEMBED_UTIL_TEST_VAR"), None);
        });
        temp_env::with_var("OEMBED_UTIL_TEST_VAR", Some(" 7 "), || {
            assert_eq!(non_empty_env("OEMBED_UTIL_TEST_VAR").as_deref(), Some("7"));
        });
    }
}
