//! Environment variable loading.
//!
//! Keeps the fallback chains in one place so callers never repeat `or_else`.

use std::env;
use std::str::FromStr;

/// Load `.env` from the current directory into the environment (existing
/// variables win).
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let path = env::current_dir()
            .map(|d| d.join(".env"))
            .unwrap_or_else(|_| std::path::PathBuf::from(".env"));
        if let Ok(content) = std::fs::read_to_string(&path) {
            for (key, value) in parse_dotenv(&content) {
                if env::var(&key).is_err() {
                    #[allow(unsafe_code)]
                    unsafe {
                        env::set_var(&key, &value);
                    }
                }
            }
        }
    });
}

/// Parse `KEY=VALUE` lines. Blank lines and `#` comments are skipped; inline
/// comments are stripped outside quotes; one level of matching quotes is
/// removed.
fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Read `key`, falling back to `default` when unset or empty.
pub fn env_or<F>(key: &str, default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(key)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Like [`env_or`] but returns `None` when unset; blank values count as unset.
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean variable: 0/false/no/off are false, any other value is true.
pub fn env_bool(key: &str, default: bool) -> bool {
    match env_optional(key).as_deref() {
        Some(s) => !matches!(s.to_lowercase().as_str(), "0" | "false" | "no" | "off"),
        None => default,
    }
}

/// Parse a variable with `FromStr`; unparsable values fall back to `default`
/// with a warning.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match env_optional(key) {
        Some(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Ignoring unparsable environment value");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotenv_strips_quotes_and_comments() {
        let pairs = parse_dotenv(
            "# comment\n\nP5MAGIC_PORT_START=9000 # inline\nP5MAGIC_HOST=\"colab\"\nbroken line\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("P5MAGIC_PORT_START".to_string(), "9000".to_string()),
                ("P5MAGIC_HOST".to_string(), "colab".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_dotenv_keeps_hash_inside_quotes() {
        let pairs = parse_dotenv("P5MAGIC_PROXY_URL_TEMPLATE='https://h/#{port}'\n");
        assert_eq!(pairs[0].1, "https://h/#{port}");
    }

    #[test]
    fn test_env_helpers_fall_back_when_unset() {
        let key = "P5MAGIC_TEST_SURELY_UNSET_KEY";
        assert_eq!(env_or(key, || "fallback".to_string()), "fallback");
        assert_eq!(env_optional(key), None);
        assert!(env_bool(key, true));
        assert_eq!(env_parse::<u16>(key, 42), 42);
    }
}
