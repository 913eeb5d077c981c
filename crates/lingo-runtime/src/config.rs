#![forbid(unsafe_code)]

//! Install options.
//!
//! Options may be built in code or loaded from JSON or TOML. Every field is
//! optional; unknown fields are ignored.
//!
//! ```toml
//! locale = "ml"
//! wikilinks = true
//!
//! [messages.en]
//! hello_world = "Hello world"
//!
//! [messages.ml]
//! hello_world = "എല്ലാവർക്കും നമസ്കാരം"
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::locale::Locale;

/// Messages keyed by locale, then by message key.
pub type MessageSource = BTreeMap<Locale, BTreeMap<String, String>>;

/// Options accepted by [`crate::install`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InstallOptions {
    /// Initial message catalog.
    pub messages: MessageSource,
    /// Initial locale.
    pub locale: Locale,
    /// Convert `[url label]` and `[[Target|label]]` into anchors.
    pub wikilinks: bool,
    /// Locale consulted when the active one lacks a message.
    pub fallback_locale: Locale,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            messages: MessageSource::new(),
            locale: "en".to_owned(),
            wikilinks: false,
            fallback_locale: "en".to_owned(),
        }
    }
}

/// Errors raised while loading [`InstallOptions`].
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("invalid JSON install options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML install options: {0}")]
    Toml(#[from] toml::de::Error),
}

impl InstallOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(input: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Parse options from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(input)?)
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<Locale>) -> Self {
        self.locale = locale.into();
        self
    }

    #[must_use]
    pub fn with_wikilinks(mut self, wikilinks: bool) -> Self {
        self.wikilinks = wikilinks;
        self
    }

    #[must_use]
    pub fn with_fallback_locale(mut self, locale: impl Into<Locale>) -> Self {
        self.fallback_locale = locale.into();
        self
    }

    /// Add messages for one locale, merging with any already present.
    #[must_use]
    pub fn with_messages<K, V>(
        mut self,
        locale: impl Into<Locale>,
        messages: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.messages
            .entry(locale.into())
            .or_default()
            .extend(messages.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = InstallOptions::default();
        assert!(options.messages.is_empty());
        assert_eq!(options.locale, "en");
        assert!(!options.wikilinks);
        assert_eq!(options.fallback_locale, "en");
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(
            InstallOptions::from_json_str("{}").unwrap(),
            InstallOptions::default()
        );
    }

    #[test]
    fn json_with_unknown_fields() {
        let options = InstallOptions::from_json_str(
            r#"{
                "locale": "ml",
                "messages": {"en": {"hello_world": "Hello world"}},
                "legacy": true
            }"#,
        )
        .unwrap();
        assert_eq!(options.locale, "ml");
        assert_eq!(options.messages["en"]["hello_world"], "Hello world");
        assert!(!options.wikilinks);
    }

    #[test]
    fn toml_document() {
        let options = InstallOptions::from_toml_str(
            r#"
locale = "ml"
wikilinks = true
fallback_locale = "es"

[messages.ml]
hello_world = "എല്ലാവർക്കും നമസ്കാരം"
"#,
        )
        .unwrap();
        assert_eq!(options.locale, "ml");
        assert!(options.wikilinks);
        assert_eq!(options.fallback_locale, "es");
        assert_eq!(
            options.messages["ml"]["hello_world"],
            "എല്ലാവർക്കും നമസ്കാരം"
        );
    }

    #[test]
    fn malformed_input_reports_format() {
        let err = InstallOptions::from_json_str("{").unwrap_err();
        assert!(matches!(err, OptionsError::Json(_)));
        assert!(err.to_string().starts_with("invalid JSON install options"));

        let err = InstallOptions::from_toml_str("locale = ").unwrap_err();
        assert!(matches!(err, OptionsError::Toml(_)));

        let err = InstallOptions::from_json_str(r#"{"wikilinks": "yes"}"#).unwrap_err();
        assert!(matches!(err, OptionsError::Json(_)));
    }

    #[test]
    fn builder_merges_messages() {
        let options = InstallOptions::default()
            .with_locale("ml")
            .with_wikilinks(true)
            .with_fallback_locale("en")
            .with_messages("en", [("a", "A")])
            .with_messages("en", [("b", "B")]);
        assert_eq!(options.messages["en"].len(), 2);
        assert_eq!(options.locale, "ml");
        assert!(options.wikilinks);
    }
}
