#![forbid(unsafe_code)]

//! Locale context shared by every binding of one application.
//!
//! The [`LocaleContext`] owns the current locale and the translation engine.
//! Locale changes are versioned so bindings can detect, on their next update,
//! that they rendered with a stale locale. Loading messages bumps a separate
//! catalog revision for the same purpose.
//!
//! A context is created explicitly (normally by [`crate::install`]) and
//! handed out through the host's injection registry. There is no global
//! instance: two applications never share a context.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use lingo_i18n::{I18nError, Param};
pub use lingo_i18n::Locale;
use tracing::{debug, warn};

use crate::engine::TranslationEngine;
use crate::reactive::{Observable, Subscription};

/// What a rendered binding depends on besides its own key and params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSnapshot {
    pub locale: Locale,
    pub revision: u64,
}

/// Per-application locale context.
///
/// Cloning yields another handle to the same context.
#[derive(Clone)]
pub struct LocaleContext {
    current: Observable<Locale>,
    revision: Observable<u64>,
    engine: Rc<RefCell<Box<dyn TranslationEngine>>>,
}

impl LocaleContext {
    /// Create a context for `locale` around `engine`.
    ///
    /// The engine is switched to the (normalized) initial locale.
    /// A blank locale falls back to `"en"`.
    #[must_use]
    pub fn new(locale: impl Into<Locale>, engine: impl TranslationEngine + 'static) -> Self {
        let locale = normalize_locale(&locale.into()).unwrap_or_else(|| "en".to_owned());
        let mut engine: Box<dyn TranslationEngine> = Box::new(engine);
        engine.set_locale(&locale);
        Self {
            current: Observable::new(locale),
            revision: Observable::new(0),
            engine: Rc::new(RefCell::new(engine)),
        }
    }

    /// Get the active locale.
    #[must_use]
    pub fn current_locale(&self) -> Locale {
        self.current.get()
    }

    /// Set the active locale.
    ///
    /// Setting the current locale again is a no-op. A blank locale is
    /// rejected (logged) and leaves the context unchanged.
    pub fn set_locale(&self, locale: impl AsRef<str>) {
        let Some(locale) = normalize_locale(locale.as_ref()) else {
            warn!(requested = locale.as_ref(), "ignoring blank locale");
            return;
        };
        if self.current.with(|current| *current == locale) {
            return;
        }
        // The engine must be switched before subscribers run, since they
        // may translate immediately.
        self.engine.borrow_mut().set_locale(&locale);
        debug!(locale = %locale, "locale changed");
        self.current.set(locale);
    }

    /// Translate `key` as plain text. The engine's output is returned
    /// verbatim, including its key-literal fallback.
    #[must_use]
    pub fn translate(&self, key: &str, params: &[Param]) -> String {
        self.engine.borrow().translate(key, params)
    }

    /// Translate `key` as sanitized markup.
    #[must_use]
    pub fn translate_markup(&self, key: &str, params: &[Param]) -> String {
        self.engine.borrow().translate_markup(key, params)
    }

    /// Merge messages for one locale into the engine.
    ///
    /// Bumps the catalog revision so bound elements re-render on their
    /// next update.
    pub fn load_messages<K, V>(
        &self,
        locale: &str,
        messages: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), I18nError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let messages = messages
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.engine.borrow_mut().load(locale, messages)?;
        self.bump_revision();
        Ok(())
    }

    /// Merge a whole `locale -> (key -> template)` source into the engine.
    ///
    /// Bumps the revision once, after every locale has been loaded.
    pub fn load_all(
        &self,
        source: &BTreeMap<Locale, BTreeMap<String, String>>,
    ) -> Result<(), I18nError> {
        {
            let mut engine = self.engine.borrow_mut();
            for (locale, messages) in source {
                let messages = messages
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                engine.load(locale, messages)?;
            }
        }
        self.bump_revision();
        Ok(())
    }

    fn bump_revision(&self) {
        let next = self.revision.get() + 1;
        debug!(revision = next, "message catalog changed");
        self.revision.set(next);
    }

    /// What a binding rendered now would depend on.
    #[must_use]
    pub fn snapshot(&self) -> LocaleSnapshot {
        LocaleSnapshot {
            locale: self.current.get(),
            revision: self.revision.get(),
        }
    }

    /// Subscribe to locale changes.
    pub fn subscribe(&self, callback: impl Fn(&Locale) + 'static) -> Subscription {
        self.current.subscribe(callback)
    }

    /// Subscribe to catalog revisions.
    pub fn subscribe_revision(&self, callback: impl Fn(&u64) + 'static) -> Subscription {
        self.revision.subscribe(callback)
    }

    /// Current version counter for the locale.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.current.version()
    }

    /// Current catalog revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Whether two handles refer to the same context.
    #[must_use]
    pub fn same_context(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.engine, &other.engine)
    }
}

impl fmt::Debug for LocaleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleContext")
            .field("locale", &self.current.get())
            .field("version", &self.current.version())
            .field("revision", &self.revision.get())
            .finish_non_exhaustive()
    }
}

/// Normalize a locale tag.
///
/// Strips encoding and modifier suffixes (`fr_FR.UTF-8@euro` -> `fr-FR`),
/// maps `C`/`POSIX` to `en`. Returns `None` for blank input.
#[must_use]
pub fn normalize_locale(raw: &str) -> Option<Locale> {
    let raw = raw.trim();
    let raw = raw.split('@').next().unwrap_or(raw);
    let raw = raw.split('.').next().unwrap_or(raw);
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let normalized = raw.replace('_', "-");
    if normalized.eq_ignore_ascii_case("c") || normalized.eq_ignore_ascii_case("posix") {
        return Some("en".to_owned());
    }
    Some(normalized)
}
