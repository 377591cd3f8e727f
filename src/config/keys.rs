use std::fmt;
use std::str::FromStr;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

const NAMED_KEYS: &[&str] = &[
    "Backspace", "Tab", "Return", "Pause", "Space", "Insert", "Delete", "Home", "End", "PageUp",
    "PageDown", "UpArrow", "DownArrow", "LeftArrow", "RightArrow", "Backquote", "Minus", "Equals",
    "LeftBracket", "RightBracket", "Semicolon", "Quote", "Comma", "Period", "Slash", "Backslash",
    "CapsLock", "ScrollLock", "Numlock", "Print", "LeftShift", "RightShift", "LeftControl",
    "RightControl", "LeftAlt", "RightAlt", "Mouse3", "Mouse4", "Mouse5", "Mouse6",
];

/// 进入 / 退出重绑定模式的键
pub const REBIND_KEY: &str = "Insert";
pub const CANCEL_KEY: &str = "Escape";

/// 不能作为触发键
const RESERVED: &[&str] = &["None", CANCEL_KEY, REBIND_KEY];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("`{0}` is not a recognized key name")]
    Unknown(String),
    #[error("`{0}` cannot be used as a trigger key")]
    Reserved(String),
}

/// 规范化后的按键名（大小写不敏感解析，保存规范写法）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyName(String);

impl KeyName {
    pub fn default_trigger() -> Self {
        KeyName("F9".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        let raw = raw.trim();
        if let Some(r) = RESERVED.iter().find(|r| r.eq_ignore_ascii_case(raw)) {
            return Err(KeyError::Reserved(r.to_string()));
        }
        canonical(raw)
            .map(KeyName)
            .ok_or_else(|| KeyError::Unknown(raw.to_string()))
    }

    pub fn matches(&self, pressed: &str) -> bool {
        self.0.eq_ignore_ascii_case(pressed.trim())
    }
}

fn canonical(raw: &str) -> Option<String> {
    let upper = raw.to_ascii_uppercase();

    // A–Z
    if upper.len() == 1 && upper.as_bytes()[0].is_ascii_uppercase() {
        return Some(upper);
    }
    // F1–F15
    if let Some(d) = upper.strip_prefix('F') {
        if !d.starts_with('0') && !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = d.parse::<u8>() {
                if (1..=15).contains(&n) {
                    return Some(format!("F{n}"));
                }
            }
        }
    }
    for (prefix, canon) in [("ALPHA", "Alpha"), ("KEYPAD", "Keypad")] {
        if let Some(d) = upper.strip_prefix(prefix) {
            if d.len() == 1 && d.as_bytes()[0].is_ascii_digit() {
                return Some(format!("{canon}{d}"));
            }
        }
    }
    NAMED_KEYS
        .iter()
        .find(|k| k.eq_ignore_ascii_case(raw))
        .map(|k| k.to_string())
}

impl FromStr for KeyName {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyName::parse(s)
    }
}

impl TryFrom<String> for KeyName {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        KeyName::parse(&value)
    }
}

impl From<KeyName> for String {
    fn from(value: KeyName) -> Self {
        value.0
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively_to_canonical_form() {
        assert_eq!(KeyName::parse("f9").unwrap().as_str(), "F9");
        assert_eq!(KeyName::parse("pageup").unwrap().as_str(), "PageUp");
        assert_eq!(KeyName::parse("alpha3").unwrap().as_str(), "Alpha3");
        assert_eq!(KeyName::parse(" k ").unwrap().as_str(), "K");
    }

    #[test]
    fn rejects_reserved_and_unknown_names() {
        assert_eq!(
            KeyName::parse("escape"),
            Err(KeyError::Reserved("Escape".into()))
        );
        assert!(matches!(KeyName::parse("None"), Err(KeyError::Reserved(_))));
        assert_eq!(
            KeyName::parse(" INSERT "),
            Err(KeyError::Reserved("Insert".into()))
        );
        assert!(matches!(KeyName::parse("F16"), Err(KeyError::Unknown(_))));
        assert!(matches!(KeyName::parse("F09"), Err(KeyError::Unknown(_))));
        assert!(matches!(KeyName::parse("Banana"), Err(KeyError::Unknown(_))));
        assert!(matches!(KeyName::parse(""), Err(KeyError::Unknown(_))));
    }

    #[test]
    fn matches_pressed_key_ignoring_case() {
        let key = KeyName::default_trigger();
        assert!(key.matches("f9"));
        assert!(!key.matches("F10"));
    }
}
