#![forbid(unsafe_code)]

//! Reactive localization bindings for component-based UI hosts.
//!
//! # Role in Lingo
//! `lingo-runtime` connects a live, per-application locale to rendered
//! elements. Templates bind elements with the `i18n` directive (text, or
//! markup with `.html`) or the `i18n-html` directive (markup); each bound
//! element re-renders on its next update once its locale, message catalog,
//! key or parameters change.
//!
//! # How it fits in the system
//! - [`install`] builds a [`LocaleContext`] around a [`lingo_i18n::Banana`]
//!   engine and wires it into a [`Host`].
//! - [`parse`] turns the raw directive value into a [`BindingDescriptor`].
//! - [`DirectiveController`] runs the per-element mount/update/unmount
//!   lifecycle and writes through the [`Element`] handle.

pub mod config;
pub mod directive;
pub mod engine;
pub mod host;
pub mod install;
pub mod locale;
pub mod parse;
pub mod reactive;
pub mod value;

pub use config::{InstallOptions, MessageSource, OptionsError};
pub use directive::{DirectiveController, I18nDirective, RenderOutcome};
pub use engine::TranslationEngine;
pub use host::{
    DirectiveBinding, DirectiveDefinition, DirectiveHooks, Element, Host, InjectionKey,
    inject_typed,
};
pub use install::{SetLocale, Translator, install, use_i18n, use_locale_context, use_set_locale};
pub use locale::{Locale, LocaleContext, LocaleSnapshot, normalize_locale};
pub use parse::{
    BindingDescriptor, BindingError, DirectiveKind, HTML_MODIFIER, Modifiers, OutputMode,
    RawBinding, parse,
};
pub use reactive::{Observable, Subscription};
pub use value::{BindingValue, ParamsValue};

pub use lingo_i18n::Param;
