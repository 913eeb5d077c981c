#![forbid(unsafe_code)]

//! The translation engine seam.
//!
//! The binding layer never resolves messages itself. Everything it needs
//! from a message formatter is captured by [`TranslationEngine`];
//! [`lingo_i18n::Banana`] is the stock implementation.

use lingo_i18n::{Banana, I18nError, Param};

/// Resolves message keys into display strings for the active locale.
///
/// # Contract
///
/// 1. `translate` and `translate_markup` never fail: an unknown key
///    yields the key literal.
/// 2. `translate_markup` output is safe for markup assignment (all text
///    escaped, only engine-generated tags).
/// 3. `translate` output is plain text and must only ever be assigned as
///    text content.
pub trait TranslationEngine {
    /// Format `key` with positional `params` as plain text.
    fn translate(&self, key: &str, params: &[Param]) -> String;

    /// Format `key` with positional `params` as sanitized markup.
    fn translate_markup(&self, key: &str, params: &[Param]) -> String;

    /// The active locale.
    fn locale(&self) -> &str;

    /// Switch the active locale.
    fn set_locale(&mut self, locale: &str);

    /// Merge message templates for one locale.
    fn load(&mut self, locale: &str, messages: Vec<(String, String)>) -> Result<(), I18nError>;
}

impl TranslationEngine for Banana {
    fn translate(&self, key: &str, params: &[Param]) -> String {
        self.i18n(key, params)
    }

    fn translate_markup(&self, key: &str, params: &[Param]) -> String {
        self.i18n_markup(key, params)
    }

    fn locale(&self) -> &str {
        Banana::locale(self)
    }

    fn set_locale(&mut self, locale: &str) {
        Banana::set_locale(self, locale);
    }

    fn load(&mut self, locale: &str, messages: Vec<(String, String)>) -> Result<(), I18nError> {
        Banana::load(self, locale, messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banana_through_trait_object() {
        let mut banana = Banana::new("en");
        banana.load("en", [("greet", "Hello, $1")]).unwrap();
        let mut engine: Box<dyn TranslationEngine> = Box::new(banana);

        assert_eq!(engine.translate("greet", &[Param::from("<i>")]), "Hello, <i>");
        assert_eq!(
            engine.translate_markup("greet", &[Param::from("<i>")]),
            "Hello, &lt;i&gt;"
        );

        engine
            .load("fr", vec![("greet".into(), "Bonjour, $1".into())])
            .unwrap();
        engine.set_locale("fr");
        assert_eq!(engine.locale(), "fr");
        assert_eq!(engine.translate("greet", &[Param::from("Léa")]), "Bonjour, Léa");
    }
}
