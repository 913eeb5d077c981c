//! Locale-aware message formatter over a [`MessageCatalog`].
//!
//! [`Banana`] keeps the active locale, resolves a key through the catalog's
//! fallback chain, and formats the template with the plural rule of the
//! locale that supplied it.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unknown key | Key in no locale of the chain | Returns the key itself |
//! | Missing parameter | `$N` beyond supplied params | `$N` kept literally |
//! | Markup in source or params | Markup format requested | Escaped; only link anchors are emitted |

use v_htmlescape::escape;

use crate::catalog::{I18nError, Locale, MessageCatalog};
use crate::message::{Format, Message};
use crate::param::Param;
use crate::plural::PluralRule;

/// Default locale used when nothing else provides a message.
pub const DEFAULT_FALLBACK_LOCALE: &str = "en";

/// Message formatter with an active locale.
///
/// # Example
///
/// ```
/// use lingo_i18n::{Banana, Param};
///
/// let mut banana = Banana::new("en");
/// banana
///     .load("en", [("search_results", "Found $1 {{PLURAL:$1|result|results}}")])
///     .unwrap();
///
/// assert_eq!(banana.i18n("search_results", &[Param::from(1)]), "Found 1 result");
/// assert_eq!(banana.i18n("missing_key", &[]), "missing_key");
/// ```
#[derive(Debug, Clone)]
pub struct Banana {
    locale: Locale,
    catalog: MessageCatalog,
    wikilinks: bool,
}

impl Banana {
    /// Create a formatter for `locale` that falls back to English.
    #[must_use]
    pub fn new(locale: impl Into<Locale>) -> Self {
        let mut catalog = MessageCatalog::new();
        catalog.set_fallback_chain(vec![DEFAULT_FALLBACK_LOCALE.to_owned()]);
        Self {
            locale: locale.into(),
            catalog,
            wikilinks: false,
        }
    }

    /// Enable `[url label]` and `[[Target|label]]` link syntax.
    #[must_use]
    pub fn with_wikilinks(mut self, wikilinks: bool) -> Self {
        self.wikilinks = wikilinks;
        self
    }

    /// Replace the fallback chain with a single fallback locale.
    #[must_use]
    pub fn with_fallback_locale(mut self, locale: impl Into<Locale>) -> Self {
        self.catalog.set_fallback_chain(vec![locale.into()]);
        self
    }

    /// The active locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Switch the active locale.
    pub fn set_locale(&mut self, locale: impl Into<Locale>) {
        self.locale = locale.into();
    }

    /// Whether link syntax is converted.
    #[must_use]
    pub fn wikilinks(&self) -> bool {
        self.wikilinks
    }

    /// Merge messages for one locale into the catalog.
    pub fn load<K, V>(
        &mut self,
        locale: &str,
        messages: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), I18nError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.catalog.load(locale, messages)
    }

    /// The underlying catalog.
    #[must_use]
    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Format `key` as plain text in the active locale.
    #[must_use]
    pub fn i18n(&self, key: &str, params: &[Param]) -> String {
        self.format(key, params, Format::Text)
    }

    /// Format `key` as sanitized markup in the active locale.
    #[must_use]
    pub fn i18n_markup(&self, key: &str, params: &[Param]) -> String {
        self.format(key, params, Format::Markup)
    }

    fn format(&self, key: &str, params: &[Param], format: Format) -> String {
        match self.catalog.resolve(&self.locale, key) {
            Some((locale, template)) => Message::parse(template, self.wikilinks).format(
                params,
                &PluralRule::for_locale(locale),
                format,
            ),
            // Unknown keys render as themselves; in markup they still pass
            // through the escaper.
            None => match format {
                Format::Text => key.to_owned(),
                Format::Markup => escape(key).to_string(),
            },
        }
    }
}
