//! Validated resource keys and the key-to-location template.
//!
//! A `ResourceKey` can only be obtained through [`ResourceKey::parse`], so
//! every key that reaches the cache map or the location template has already
//! been checked.

use std::fmt;

use fanboard_core::{ConfigError, DataLayerConfig, KeyError, DEFAULT_PATH_TEMPLATE, KEY_PLACEHOLDER};

/// Characters that would let a key escape its slot in the location template.
const FORBIDDEN: &[char] = &['/', '\\', '?', '#', '{', '}'];

/// Identifier of a logical resource, mapped 1:1 to a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    inner: String,
}

impl ResourceKey {
    /// Validate a raw key.
    ///
    /// Rejects the empty string, surrounding whitespace, `.`/`..`, and any
    /// path or URL delimiter.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }

        let invalid = |reason: &str| KeyError::Invalid {
            key: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.trim() != raw {
            return Err(invalid("surrounding whitespace"));
        }
        if raw == "." || raw == ".." {
            return Err(invalid("relative path segment"));
        }
        if let Some(c) = raw.chars().find(|c| FORBIDDEN.contains(c) || c.is_control()) {
            return Err(invalid(&format!("forbidden character {:?}", c)));
        }

        Ok(Self {
            inner: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

/// Maps a key to the location of its document by plain substitution of
/// `{key}` in a template (default `/data/{key}.json`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    template: String,
}

impl ResourceLocator {
    /// Create a locator; the template must contain `{key}` exactly once.
    pub fn new(template: impl Into<String>) -> Result<Self, ConfigError> {
        let template = template.into();
        if template.matches(KEY_PLACEHOLDER).count() != 1 {
            return Err(ConfigError::InvalidValue {
                field: "path_template".to_string(),
                value: template,
                reason: format!("must contain {} exactly once", KEY_PLACEHOLDER),
            });
        }
        Ok(Self { template })
    }

    pub fn from_config(config: &DataLayerConfig) -> Result<Self, ConfigError> {
        Self::new(config.path_template.clone())
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Location of the document for `key`.
    pub fn locate(&self, key: &ResourceKey) -> String {
        self.template.replacen(KEY_PLACEHOLDER, key.as_str(), 1)
    }
}

impl Default for ResourceLocator {
    fn default() -> Self {
        Self {
            template: DEFAULT_PATH_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_accepts_plain_keys() {
        for raw in ["schedules", "chat_rooms", "1", "youtube-music", "room.42"] {
            assert_eq!(ResourceKey::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(ResourceKey::parse(""), Err(KeyError::Empty));
    }

    #[test]
    fn test_parse_rejects_path_escapes() {
        for raw in ["..", ".", "a/b", "a\\b", " padded", "q?x", "frag#1", "{key}", "tab\there"] {
            assert!(
                matches!(ResourceKey::parse(raw), Err(KeyError::Invalid { .. })),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_default_locator() {
        let locator = ResourceLocator::default();
        let key = ResourceKey::parse("schedules").unwrap();
        assert_eq!(locator.locate(&key), "/data/schedules.json");
    }

    #[test]
    fn test_custom_locator() {
        let locator = ResourceLocator::new("https://cdn.example.com/v2/{key}.json").unwrap();
        let key = ResourceKey::parse("goods").unwrap();
        assert_eq!(locator.locate(&key), "https://cdn.example.com/v2/goods.json");
    }

    #[test]
    fn test_locator_rejects_bad_template() {
        assert!(ResourceLocator::new("/data/all.json").is_err());
        assert!(ResourceLocator::new("/{key}/{key}").is_err());
    }

    #[test]
    fn test_locator_from_config() {
        let config = DataLayerConfig::default().with_path_template("assets/{key}.json");
        let locator = ResourceLocator::from_config(&config).unwrap();
        assert_eq!(locator.template(), "assets/{key}.json");
    }

    proptest! {
        /// Locating is deterministic and only substitutes the key.
        #[test]
        fn prop_locate_is_pure_substitution(raw in "[a-z0-9_.-]{1,24}") {
            prop_assume!(raw != "." && raw != "..");
            let key = ResourceKey::parse(&raw).unwrap();
            let locator = ResourceLocator::default();
            let location = locator.locate(&key);
            prop_assert_eq!(&location, &format!("/data/{}.json", raw));
            prop_assert_eq!(location, locator.locate(&key));
        }
    }
}
