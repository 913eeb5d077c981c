#![forbid(unsafe_code)]

//! Message catalog and formatter for Lingo.
//!
//! Provides externalized message storage with key-based lookup,
//! locale fallback chains, CLDR plural rules, and MediaWiki-style
//! message syntax (`$1` parameters, `{{PLURAL:..}}`, `{{GENDER:..}}`,
//! and optional link syntax rendered as sanitized anchors).
//!
//! # Role in Lingo
//! `lingo-i18n` is the translation engine behind the binding layer in
//! `lingo-runtime`. It knows nothing about locales being observed or
//! elements being rendered; the runtime consumes it through its
//! `TranslationEngine` trait only.

pub mod banana;
pub mod catalog;
pub mod message;
pub mod param;
pub mod plural;

pub use banana::{Banana, DEFAULT_FALLBACK_LOCALE};
pub use catalog::{I18nError, Locale, LocaleMessages, MessageCatalog};
pub use message::{Format, Message};
pub use param::Param;
pub use plural::{PluralCategory, PluralCount, PluralRule};
