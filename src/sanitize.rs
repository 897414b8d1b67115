use once_cell::sync::Lazy;
use regex::Regex;

/// Upper bound on a sanitized name, in bytes. Keeps paths well under
/// filesystem limits even with a folder segment and uid suffix attached.
const MAX_NAME_LEN: usize = 100;

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

/// Filesystem-safe form of a folder or dashboard title.
///
/// Every character outside `[A-Za-z0-9._-]` becomes an underscore and the
/// result is capped at 100 characters. The function is deterministic and
/// idempotent: `safe_name(safe_name(x)) == safe_name(x)`.
pub fn safe_name(title: &str) -> String {
    let mut name = UNSAFE_CHARS.replace_all(title, "_").into_owned();
    if name.len() > MAX_NAME_LEN {
        // Only ASCII remains after replacement, so this cannot split a char.
        name.truncate(MAX_NAME_LEN);
    }
    if name.is_empty() {
        name.push('_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_path_separators_and_spaces() {
        assert_eq!(safe_name("Prod / Team #1"), "Prod___Team__1");
        assert_eq!(safe_name("CPU: usage (5m)"), "CPU__usage__5m_");
    }

    #[test]
    fn keeps_allowed_characters() {
        assert_eq!(safe_name("node-exporter_v1.2"), "node-exporter_v1.2");
    }

    #[test]
    fn replaces_non_ascii() {
        assert_eq!(safe_name("缓存命中率"), "_____");
        assert_eq!(safe_name("Última hora"), "_ltima_hora");
    }

    #[test]
    fn caps_length_at_100() {
        let long = "a".repeat(250);
        assert_eq!(safe_name(&long).len(), 100);
    }

    #[test]
    fn empty_title_becomes_underscore() {
        assert_eq!(safe_name(""), "_");
    }

    #[test]
    fn is_idempotent() {
        let long = "x".repeat(300);
        for title in ["", "General", "Prod / Team #1", "缓存命中率", long.as_str()] {
            let once = safe_name(title);
            assert_eq!(safe_name(&once), once);
        }
    }
}
