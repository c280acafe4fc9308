//! Utilities module for Note Drafter
//!
//! Shared helper functions and utilities including:
//! - Path utilities
//! - Text utilities

use std::path::{Path, PathBuf};

/// Path utilities
pub mod path {
    use super::*;

    /// Expand tilde to home directory
    pub fn expand_tilde(path: &Path) -> PathBuf {
        if let Ok(stripped) = path.strip_prefix("~") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        path.to_path_buf()
    }
}

/// Text utilities
pub mod text {
    use std::collections::HashSet;

    /// Count characters in text (not bytes; articles are mostly Japanese)
    pub fn char_count(text: &str) -> usize {
        text.chars().count()
    }

    /// Truncate string with ellipsis, on a char boundary
    pub fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            s.to_string()
        } else if max_chars <= 3 {
            "...".to_string()
        } else {
            let head: String = s.chars().take(max_chars - 3).collect();
            format!("{}...", head)
        }
    }

    /// Split a comma-separated value list, trimming entries and dropping empties
    pub fn split_comma_list(values: &str) -> Vec<String> {
        values
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    }

    /// Remove duplicates, keeping the first occurrence of each entry in order
    pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect()
    }
}
