//! Utility helpers: home-relative paths and string manipulation.

use std::path::PathBuf;

/// Get the Tasklink data directory (e.g. `~/.tasklink/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".tasklink")
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(home) = dirs_next::home_dir() {
        if path == "~" {
            return home;
        }
        if let Some(rest) = path.strip_prefix("~/") {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Truncate a string to `max_len` characters, adding "..." if truncated.
/// Unicode-safe.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate_string("hello world, this is a long string", 15);
        assert_eq!(result, "hello world,...");
    }

    #[test]
    fn test_truncate_unicode() {
        let result = truncate_string("✅✅✅✅✅✅✅✅", 5);
        assert_eq!(result, "✅✅...");
    }

    #[test]
    fn test_data_path_ends_with_tasklink() {
        assert!(get_data_path().ends_with(".tasklink"));
    }

    #[test]
    fn test_data_path_and_tilde_share_home() {
        let expanded = expand_tilde("~/.tasklink");
        assert_eq!(expanded, get_data_path());
        if let Some(home) = dirs_next::home_dir() {
            assert_eq!(expand_tilde("~"), home);
        }
    }

    #[test]
    fn test_expand_tilde_leaves_other_paths() {
        assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
        assert_eq!(expand_tilde("session.db"), PathBuf::from("session.db"));
        assert_eq!(expand_tilde("~user/x"), PathBuf::from("~user/x"));
    }
}
