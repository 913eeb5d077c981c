#![forbid(unsafe_code)]

//! Binding value parser.
//!
//! Normalizes a directive's raw value, argument and modifiers into a
//! [`BindingDescriptor`]. Accepted shapes, in priority order:
//!
//! | Template | Key from | Params from |
//! |----------|----------|-------------|
//! | `v-i18n:key="[a, b]"` | argument | the list |
//! | `v-i18n="{msg: 'key', params: [a, b]}"` | `msg` (argument if absent) | `params` |
//! | `v-i18n:key` / `v-i18n="'key'"` | argument, else the value | none |
//!
//! # Invariants
//!
//! 1. Pure and deterministic: equal inputs give equal descriptors.
//! 2. A descriptor never carries an empty key; no key means
//!    [`BindingError::MissingMessageKey`].
//! 3. `params` is always a list, even when a single scalar was given.
//! 4. The output mode comes from the directive kind and modifiers only,
//!    never from the message content.

use std::collections::BTreeSet;

use lingo_i18n::Param;

use crate::value::{BindingValue, ParamsValue};

/// Modifier that selects markup output on the unified directive.
pub const HTML_MODIFIER: &str = "html";

/// How a rendered message is written to its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// Text-content assignment; markup in the message shows literally.
    Text,
    /// Markup assignment of engine-sanitized output.
    Markup,
}

/// The directives registered by [`crate::install`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    /// `v-i18n`: text, or markup with the `.html` modifier.
    I18n,
    /// `v-i18n-html`: always markup.
    I18nHtml,
}

impl DirectiveKind {
    /// Registered directive name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I18n => "i18n",
            Self::I18nHtml => "i18n-html",
        }
    }

    /// Output mode for a use of this directive.
    #[must_use]
    pub fn output_mode(self, modifiers: &Modifiers) -> OutputMode {
        match self {
            Self::I18nHtml => OutputMode::Markup,
            Self::I18n if modifiers.contains(HTML_MODIFIER) => OutputMode::Markup,
            Self::I18n => OutputMode::Text,
        }
    }
}

/// Directive modifiers (`v-i18n.html` has `{"html"}`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers(BTreeSet<String>);

impl Modifiers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modifier.
    #[must_use]
    pub fn with(mut self, modifier: impl Into<String>) -> Self {
        self.0.insert(modifier.into());
        self
    }

    #[must_use]
    pub fn contains(&self, modifier: &str) -> bool {
        self.0.contains(modifier)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Modifiers {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// The normalized form of a directive use.
#[derive(Debug, Clone, PartialEq)]
pub struct BindingDescriptor {
    pub key: String,
    pub params: Vec<Param>,
    pub mode: OutputMode,
}

/// Errors raised while binding a directive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// No message key could be derived from argument, value or `msg`.
    #[error("{directive} used without a message key")]
    MissingMessageKey {
        /// Raw directive name as written in the template (e.g. `v-i18n-html`).
        directive: String,
    },
}

/// A raw directive use: everything the parser looks at.
#[derive(Debug, Clone, Copy)]
pub struct RawBinding<'a> {
    /// Directive name as written (`v-i18n:key.html`), for diagnostics.
    pub raw_name: &'a str,
    pub value: &'a BindingValue,
    pub arg: Option<&'a str>,
    pub modifiers: &'a Modifiers,
}

/// Parse a directive use into a descriptor.
pub fn parse(raw: RawBinding<'_>, kind: DirectiveKind) -> Result<BindingDescriptor, BindingError> {
    let arg = non_empty(raw.arg);
    let (key, params) = match raw.value {
        BindingValue::List(params) => (arg, params.clone()),
        BindingValue::Record { msg, params } => {
            let params = match params {
                None => Vec::new(),
                Some(ParamsValue::One(param)) => vec![param.clone()],
                Some(ParamsValue::Many(params)) => params.clone(),
            };
            (non_empty(msg.as_deref()).or(arg), params)
        }
        BindingValue::Key(key) => (arg.or(non_empty(Some(key))), Vec::new()),
        BindingValue::Null => (arg, Vec::new()),
    };

    let key = key.ok_or_else(|| BindingError::MissingMessageKey {
        directive: raw.raw_name.to_owned(),
    })?;

    Ok(BindingDescriptor {
        key: key.to_owned(),
        params,
        mode: kind.output_mode(raw.modifiers),
    })
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_with(
        value: &BindingValue,
        arg: Option<&str>,
        modifiers: &Modifiers,
        kind: DirectiveKind,
    ) -> Result<BindingDescriptor, BindingError> {
        parse(
            RawBinding {
                raw_name: "v-i18n",
                value,
                arg,
                modifiers,
            },
            kind,
        )
    }

    fn text(key: &str, params: Vec<Param>) -> BindingDescriptor {
        BindingDescriptor {
            key: key.into(),
            params,
            mode: OutputMode::Text,
        }
    }

    #[test]
    fn bare_key() {
        let none = Modifiers::new();
        let d = parse_with(&"hello_world".into(), None, &none, DirectiveKind::I18n).unwrap();
        assert_eq!(d, text("hello_world", vec![]));
    }

    #[test]
    fn argument_without_value() {
        let none = Modifiers::new();
        let d = parse_with(&BindingValue::Null, Some("hello_world"), &none, DirectiveKind::I18n)
            .unwrap();
        assert_eq!(d, text("hello_world", vec![]));
    }

    #[test]
    fn argument_wins_over_string_value() {
        let none = Modifiers::new();
        let d = parse_with(&"ignored".into(), Some("hello_world"), &none, DirectiveKind::I18n)
            .unwrap();
        assert_eq!(d.key, "hello_world");
    }

    #[test]
    fn three_shapes_agree() {
        let none = Modifiers::new();
        let record = BindingValue::record("search_results", [10]);
        let list = BindingValue::list([10]);

        let a = parse_with(&record, None, &none, DirectiveKind::I18n).unwrap();
        let b = parse_with(&list, Some("search_results"), &none, DirectiveKind::I18n).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, text("search_results", vec![Param::Int(10)]));

        let c = parse_with(&"search_results".into(), None, &none, DirectiveKind::I18n).unwrap();
        let d = parse_with(
            &BindingValue::list(Vec::<Param>::new()),
            Some("search_results"),
            &none,
            DirectiveKind::I18n,
        )
        .unwrap();
        let e = parse_with(
            &BindingValue::Record {
                msg: Some("search_results".into()),
                params: None,
            },
            None,
            &none,
            DirectiveKind::I18n,
        )
        .unwrap();
        assert_eq!(c, d);
        assert_eq!(c, e);
    }

    #[test]
    fn scalar_params_wrapped() {
        let none = Modifiers::new();
        let value = BindingValue::Record {
            msg: Some("greet".into()),
            params: Some(ParamsValue::One(Param::from("Alice"))),
        };
        let d = parse_with(&value, None, &none, DirectiveKind::I18n).unwrap();
        assert_eq!(d.params, vec![Param::from("Alice")]);
    }

    #[test]
    fn record_without_msg_uses_argument() {
        let none = Modifiers::new();
        let value = BindingValue::Record {
            msg: None,
            params: Some(ParamsValue::Many(vec![Param::Int(1)])),
        };
        let d = parse_with(&value, Some("search_results"), &none, DirectiveKind::I18n).unwrap();
        assert_eq!(d, text("search_results", vec![Param::Int(1)]));
    }

    #[test]
    fn list_without_argument_fails() {
        let none = Modifiers::new();
        let err = parse(
            RawBinding {
                raw_name: "v-i18n-html",
                value: &BindingValue::list([1, 2]),
                arg: None,
                modifiers: &none,
            },
            DirectiveKind::I18nHtml,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BindingError::MissingMessageKey {
                directive: "v-i18n-html".into()
            }
        );
        assert_eq!(err.to_string(), "v-i18n-html used without a message key");
    }

    #[test]
    fn empty_keys_are_missing() {
        let none = Modifiers::new();
        let cases = [
            (BindingValue::Null, None),
            (BindingValue::key(""), None),
            (BindingValue::key(""), Some("")),
            (
                BindingValue::Record {
                    msg: Some(String::new()),
                    params: None,
                },
                None,
            ),
            (
                BindingValue::Record {
                    msg: None,
                    params: None,
                },
                Some(""),
            ),
        ];
        for (value, arg) in &cases {
            assert!(
                matches!(
                    parse_with(value, *arg, &none, DirectiveKind::I18n),
                    Err(BindingError::MissingMessageKey { .. })
                ),
                "{value:?} / {arg:?} should fail"
            );
        }
    }

    #[test]
    fn output_mode_from_kind_and_modifier() {
        let none = Modifiers::new();
        let html = Modifiers::new().with(HTML_MODIFIER);
        let value = BindingValue::key("k");

        let mode = |m: &Modifiers, kind| parse_with(&value, None, m, kind).unwrap().mode;
        assert_eq!(mode(&none, DirectiveKind::I18n), OutputMode::Text);
        assert_eq!(mode(&html, DirectiveKind::I18n), OutputMode::Markup);
        assert_eq!(mode(&none, DirectiveKind::I18nHtml), OutputMode::Markup);
        assert_eq!(mode(&html, DirectiveKind::I18nHtml), OutputMode::Markup);
    }

    #[test]
    fn markup_looking_key_stays_text() {
        let none = Modifiers::new();
        let d = parse_with(&"<b>bold</b>".into(), None, &none, DirectiveKind::I18n).unwrap();
        assert_eq!(d.mode, OutputMode::Text);
    }

    #[test]
    fn modifiers_from_iter() {
        let m: Modifiers = ["html", "once"].into_iter().collect();
        assert!(m.contains("html"));
        assert!(!m.contains("lazy"));
        assert!(!m.is_empty());
        assert!(Modifiers::new().is_empty());
    }
}
