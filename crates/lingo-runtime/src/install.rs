#![forbid(unsafe_code)]

//! Wiring a [`LocaleContext`] into a host application.
//!
//! [`install`] creates one context per application, provides it (plus the
//! [`Translator`] and [`SetLocale`] conveniences) through the host's
//! injection registry, and registers the `i18n` and `i18n-html`
//! directives. Components look the conveniences up with [`use_i18n`] and
//! [`use_set_locale`].

use std::rc::Rc;

use lingo_i18n::{Banana, I18nError, Param};
use tracing::debug;

use crate::config::{InstallOptions, MessageSource};
use crate::directive::I18nDirective;
use crate::host::{Host, InjectionKey, inject_typed};
use crate::locale::{Locale, LocaleContext};
use crate::parse::DirectiveKind;

/// Owner of every key this module provides; not nameable outside it.
struct Installed;

fn context_key() -> InjectionKey {
    InjectionKey::new::<Installed>("lingo.context")
}

fn translator_key() -> InjectionKey {
    InjectionKey::new::<Installed>("lingo.translator")
}

fn set_locale_key() -> InjectionKey {
    InjectionKey::new::<Installed>("lingo.set-locale")
}

/// Install localization into `app`.
///
/// Installing twice into the same application is a no-op that returns the
/// existing context. Different applications get independent contexts.
///
/// # Errors
///
/// Fails when `options.messages` names a blank locale.
pub fn install(
    app: &(impl Host + ?Sized),
    options: InstallOptions,
) -> Result<LocaleContext, I18nError> {
    if let Some(existing) = use_locale_context(app) {
        debug!(locale = %existing.current_locale(), "i18n already installed; ignoring");
        return Ok(existing);
    }

    let InstallOptions {
        messages,
        locale,
        wikilinks,
        fallback_locale,
    } = options;

    let mut engine = Banana::new(locale.clone())
        .with_wikilinks(wikilinks)
        .with_fallback_locale(fallback_locale);
    for (messages_locale, messages) in messages {
        engine.load(&messages_locale, messages)?;
    }

    let context = LocaleContext::new(locale, engine);
    app.provide(context_key(), Rc::new(context.clone()));
    app.provide(translator_key(), Rc::new(Translator::new(context.clone())));
    app.provide(set_locale_key(), Rc::new(SetLocale::new(context.clone())));
    for kind in [DirectiveKind::I18n, DirectiveKind::I18nHtml] {
        app.register_directive(
            kind.name(),
            Rc::new(I18nDirective::new(context.clone(), kind)),
        );
    }

    debug!(locale = %context.current_locale(), wikilinks, "i18n installed");
    Ok(context)
}

/// The application's locale context, if installed.
#[must_use]
pub fn use_locale_context(app: &(impl Host + ?Sized)) -> Option<LocaleContext> {
    inject_typed::<LocaleContext>(app, &context_key()).map(|context| (*context).clone())
}

/// The application's translator, if installed.
#[must_use]
pub fn use_i18n(app: &(impl Host + ?Sized)) -> Option<Translator> {
    inject_typed::<Translator>(app, &translator_key()).map(|t| (*t).clone())
}

/// The application's locale setter, if installed.
#[must_use]
pub fn use_set_locale(app: &(impl Host + ?Sized)) -> Option<SetLocale> {
    inject_typed::<SetLocale>(app, &set_locale_key()).map(|s| (*s).clone())
}

/// Translation convenience for component code.
#[derive(Debug, Clone)]
pub struct Translator {
    context: LocaleContext,
}

impl Translator {
    #[must_use]
    pub fn new(context: LocaleContext) -> Self {
        Self { context }
    }

    /// Translate `key` in the current locale.
    #[must_use]
    pub fn t(&self, key: &str, params: &[Param]) -> String {
        self.context.translate(key, params)
    }

    /// Translate `key` as sanitized markup.
    #[must_use]
    pub fn t_markup(&self, key: &str, params: &[Param]) -> String {
        self.context.translate_markup(key, params)
    }

    #[must_use]
    pub fn locale(&self) -> Locale {
        self.context.current_locale()
    }

    /// Merge a whole `locale -> messages` source.
    pub fn load_messages(&self, source: &MessageSource) -> Result<(), I18nError> {
        self.context.load_all(source)
    }

    /// Merge messages for a single locale.
    pub fn load_locale_messages<K, V>(
        &self,
        locale: &str,
        messages: impl IntoIterator<Item = (K, V)>,
    ) -> Result<(), I18nError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.context.load_messages(locale, messages)
    }

    #[must_use]
    pub fn context(&self) -> &LocaleContext {
        &self.context
    }
}

/// Handle for switching the application's locale.
#[derive(Debug, Clone)]
pub struct SetLocale {
    context: LocaleContext,
}

impl SetLocale {
    #[must_use]
    pub fn new(context: LocaleContext) -> Self {
        Self { context }
    }

    pub fn set(&self, locale: impl AsRef<str>) {
        self.context.set_locale(locale);
    }
}
