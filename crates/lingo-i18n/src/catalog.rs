//! Message catalog with locale fallback.
//!
//! # Invariants
//!
//! 1. **Fallback chain terminates**: every lookup tries the requested
//!    locale, then its primary language subtag, then walks the fallback
//!    chain exactly once, returning `None` if no locale provides the key.
//!
//! 2. **Loading merges**: loading messages into a locale that already has
//!    messages keeps the existing keys and overwrites duplicates
//!    (last load wins).
//!
//! 3. **Templates are stored verbatim**: the catalog never interprets
//!    `$1` or `{{PLURAL:..}}` syntax; formatting happens in
//!    [`crate::message`].
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in any locale | Returns `None` |
//! | Missing locale | Locale not loaded | Falls through chain |
//! | Empty locale tag | `load("", ..)` | `I18nError::InvalidLocale` |
//! | Empty catalog | No locales loaded | All lookups return `None` |

use ahash::AHashMap;

/// Locale identifier (e.g., `"en"`, `"en-US"`, `"ml"`).
pub type Locale = String;

/// Errors from i18n operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// A locale string was malformed.
    InvalidLocale(String),
}

impl std::fmt::Display for I18nError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLocale(l) => write!(f, "invalid locale: {l:?}"),
        }
    }
}

impl std::error::Error for I18nError {}

/// Message templates for a single locale.
#[derive(Debug, Clone, Default)]
pub struct LocaleMessages {
    messages: AHashMap<String, String>,
}

impl LocaleMessages {
    /// Create an empty message set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a message template.
    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }

    /// Look up a template by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the locale has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LocaleMessages {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut messages = Self::new();
        for (key, template) in iter {
            messages.insert(key, template);
        }
        messages
    }
}

/// Central message catalog with locale fallback.
///
/// # Example
///
/// ```
/// use lingo_i18n::catalog::MessageCatalog;
///
/// let mut catalog = MessageCatalog::new();
/// catalog.load("en", [("greeting", "Hello")]).unwrap();
/// catalog.load("es", [("greeting", "Hola")]).unwrap();
/// catalog.set_fallback_chain(vec!["en".into()]);
///
/// assert_eq!(catalog.get("es", "greeting"), Some("Hola"));
/// assert_eq!(catalog.get("es-MX", "greeting"), Some("Hola"));
/// assert_eq!(catalog.get("fr", "greeting"), Some("Hello"));
/// assert_eq!(catalog.get("fr", "farewell"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    locales: AHashMap<Locale, LocaleMessages>,
    fallback_chain: Vec<Locale>,
}

impl MessageCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge messages into a locale, creating the locale if needed.
    pub fn load<K, V>(
        &mut self,
        locale: &str,
        messages: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), I18nError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let locale = locale.trim();
        if locale.is_empty() {
            return Err(I18nError::InvalidLocale(locale.to_owned()));
        }
        let entry = self.locales.entry(locale.to_owned()).or_default();
        for (key, template) in messages {
            entry.insert(key, template);
        }
        Ok(())
    }

    /// Set the fallback chain (tried in order when a key is missing).
    ///
    /// Example: `["es", "en"]`: after the requested locale and its
    /// language, try generic Spanish, then English.
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain;
    }

    /// The configured fallback chain.
    #[must_use]
    pub fn fallback_chain(&self) -> &[Locale] {
        &self.fallback_chain
    }

    /// Look up a template by key.
    ///
    /// Tries the specified locale, then its primary language subtag
    /// (`en-US` -> `en`), then walks the fallback chain.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        self.resolve(locale, key).map(|(_, template)| template)
    }

    /// Like [`get`](Self::get), but also reports which locale supplied
    /// the template (plural rules follow the supplying locale).
    #[must_use]
    pub fn resolve(&self, locale: &str, key: &str) -> Option<(&str, &str)> {
        let primary = locale.split(['-', '_']).next().unwrap_or(locale);
        let candidates = std::iter::once(locale)
            .chain((primary != locale).then_some(primary))
            .chain(self.fallback_chain.iter().map(String::as_str));

        let mut tried: Vec<&str> = Vec::with_capacity(2 + self.fallback_chain.len());
        for candidate in candidates {
            if tried.contains(&candidate) {
                continue;
            }
            tried.push(candidate);
            if let Some((tag, messages)) = self.locales.get_key_value(candidate)
                && let Some(template) = messages.get(key)
            {
                return Some((tag.as_str(), template));
            }
        }
        None
    }

    /// Messages loaded for one locale.
    #[must_use]
    pub fn messages(&self, locale: &str) -> Option<&LocaleMessages> {
        self.locales.get(locale)
    }

    /// All registered locale tags.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        self.locales.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MessageCatalog {
        let mut catalog = MessageCatalog::new();
        catalog
            .load("en", [("greeting", "Hello"), ("color", "Color")])
            .unwrap();
        catalog.load("es", [("greeting", "Hola")]).unwrap();
        catalog.load("es-MX", [("greeting", "Qué onda")]).unwrap();
        catalog.set_fallback_chain(vec!["en".into()]);
        catalog
    }

    #[test]
    fn simple_lookup() {
        assert_eq!(catalog().get("en", "greeting"), Some("Hello"));
    }

    #[test]
    fn missing_key_returns_none() {
        assert_eq!(catalog().get("en", "nonexistent"), None);
    }

    #[test]
    fn missing_locale_falls_back() {
        assert_eq!(catalog().get("fr", "greeting"), Some("Hello"));
    }

    #[test]
    fn region_falls_back_to_language() {
        let catalog = catalog();
        assert_eq!(catalog.get("es-AR", "greeting"), Some("Hola"));
        assert_eq!(catalog.get("es-MX", "greeting"), Some("Qué onda"));
        assert_eq!(catalog.get("es-MX", "color"), Some("Color"));
    }

    #[test]
    fn resolve_reports_supplying_locale() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("es-MX", "color"), Some(("en", "Color")));
        assert_eq!(catalog.resolve("es-AR", "greeting"), Some(("es", "Hola")));
    }

    #[test]
    fn load_merges_and_overwrites() {
        let mut catalog = catalog();
        catalog
            .load("en", [("greeting", "Hi"), ("new_message", "New message")])
            .unwrap();
        assert_eq!(catalog.get("en", "greeting"), Some("Hi"));
        assert_eq!(catalog.get("en", "color"), Some("Color"));
        assert_eq!(catalog.messages("en").map(LocaleMessages::len), Some(3));
    }

    #[test]
    fn empty_locale_rejected() {
        let mut catalog = MessageCatalog::new();
        let err = catalog.load("  ", [("k", "v")]).unwrap_err();
        assert_eq!(err, I18nError::InvalidLocale(String::new()));
        assert!(catalog.locales().is_empty());
    }

    #[test]
    fn empty_catalog() {
        let catalog = MessageCatalog::new();
        assert_eq!(catalog.get("en", "anything"), None);
        assert!(catalog.locales().is_empty());
    }

    #[test]
    fn locale_messages_from_iter() {
        let messages: LocaleMessages = [("a", "A"), ("b", "B")].into_iter().collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.get("b"), Some("B"));
        assert!(!messages.is_empty());
    }
}
