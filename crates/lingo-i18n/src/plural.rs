//! CLDR plural rules for locale-aware pluralization.
//!
//! Implements a subset of the Unicode CLDR plural rules covering the
//! most common language families. Each [`PluralRule`] maps a count to a
//! [`PluralCategory`], and knows the order in which a message
//! lists its forms (`{{PLURAL:$1|one|other}}` for English,
//! `{{PLURAL:$1|one|few|many|other}}` for Russian, and so on).
//!
//! # Invariants
//!
//! 1. Every `PluralRule` must map any `i64` to exactly one `PluralCategory`.
//! 2. The `Other` category is always the catch-all fallback.
//! 3. Rules are pure functions: same count always yields same category.
//! 4. Form selection never fails: a message that lists fewer forms than the
//!    rule has categories falls back to its last form.
//! 5. A count with fraction digits is `One` only under the French rule
//!    (integer part 0 or 1); every other built-in rule maps it to `Other`.

use core::fmt;

/// CLDR plural categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "zero"),
            Self::One => write!(f, "one"),
            Self::Two => write!(f, "two"),
            Self::Few => write!(f, "few"),
            Self::Many => write!(f, "many"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// A plural operand: the integer part of a count and whether the count
/// carried fraction digits (CLDR operands `i` and `v > 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluralCount {
    pub integer: i64,
    pub fractional: bool,
}

impl PluralCount {
    #[must_use]
    pub const fn whole(integer: i64) -> Self {
        Self {
            integer,
            fractional: false,
        }
    }
}

impl From<i64> for PluralCount {
    fn from(integer: i64) -> Self {
        Self::whole(integer)
    }
}

/// A plural rule function that maps a count to a plural category.
///
/// Built-in rules cover the most common CLDR language groups.
/// Custom rules can be provided via the function pointer variant.
#[derive(Clone)]
pub enum PluralRule {
    /// English-like: `one` for 1, `other` for everything else.
    English,
    /// Russian/Slavic: `one` for 1, `few` for 2-4, `many` for 5-20,
    /// then repeats based on last two digits.
    Russian,
    /// Arabic: `zero` for 0, `one` for 1, `two` for 2, `few` for 3-10,
    /// `many` for 11-99, `other` for 100+.
    Arabic,
    /// French-like: `one` for 0-1, `other` for everything else.
    French,
    /// Chinese/Japanese/Korean: always `other` (no plural distinction).
    CJK,
    /// Polish: similar to Russian but with different thresholds.
    Polish,
    /// Custom rule function.
    Custom(fn(i64) -> PluralCategory),
}

const ENGLISH_ORDER: &[PluralCategory] = &[PluralCategory::One, PluralCategory::Other];
const SLAVIC_ORDER: &[PluralCategory] = &[
    PluralCategory::One,
    PluralCategory::Few,
    PluralCategory::Many,
    PluralCategory::Other,
];
const ARABIC_ORDER: &[PluralCategory] = &[
    PluralCategory::Zero,
    PluralCategory::One,
    PluralCategory::Two,
    PluralCategory::Few,
    PluralCategory::Many,
    PluralCategory::Other,
];
const CJK_ORDER: &[PluralCategory] = &[PluralCategory::Other];

impl PluralRule {
    /// Determine the plural category for the given count.
    #[must_use]
    pub fn categorize(&self, count: i64) -> PluralCategory {
        let n = count.unsigned_abs();
        match self {
            Self::English => english_rule(n),
            Self::Russian => russian_rule(n),
            Self::Arabic => arabic_rule(n),
            Self::French => french_rule(n),
            Self::CJK => PluralCategory::Other,
            Self::Polish => polish_rule(n),
            Self::Custom(f) => f(count),
        }
    }

    /// Determine the plural category for a possibly fractional count.
    ///
    /// Custom rules only see whole counts; fractions map to `Other`.
    #[must_use]
    pub fn categorize_count(&self, count: PluralCount) -> PluralCategory {
        if !count.fractional {
            return self.categorize(count.integer);
        }
        match self {
            Self::French if count.integer.unsigned_abs() <= 1 => PluralCategory::One,
            _ => PluralCategory::Other,
        }
    }

    /// Categories in the order a message lists its plural forms.
    ///
    /// Custom rules use the full CLDR order.
    #[must_use]
    pub fn categories(&self) -> &'static [PluralCategory] {
        match self {
            Self::English | Self::French => ENGLISH_ORDER,
            Self::Russian | Self::Polish => SLAVIC_ORDER,
            Self::Arabic | Self::Custom(_) => ARABIC_ORDER,
            Self::CJK => CJK_ORDER,
        }
    }

    /// Pick the form for `count` out of the forms a message lists.
    ///
    /// Returns `None` only when `forms` is empty.
    #[must_use]
    pub fn select<'a, T>(&self, count: i64, forms: &'a [T]) -> Option<&'a T> {
        self.select_count(PluralCount::whole(count), forms)
    }

    /// [`select`](Self::select) for a possibly fractional count.
    #[must_use]
    pub fn select_count<'a, T>(&self, count: PluralCount, forms: &'a [T]) -> Option<&'a T> {
        let last = forms.last()?;
        let category = self.categorize_count(count);
        let index = self
            .categories()
            .iter()
            .position(|c| *c == category)
            .unwrap_or(usize::MAX);
        Some(forms.get(index).unwrap_or(last))
    }

    /// Select the best rule for a locale tag (e.g., `"en"`, `"ru"`, `"ar"`).
    ///
    /// Falls back to English if the language is unknown.
    #[must_use]
    pub fn for_locale(lang: &str) -> Self {
        // Extract the primary language subtag
        let primary = lang.split(['-', '_']).next().unwrap_or(lang);

        match primary.to_ascii_lowercase().as_str() {
            "en" | "de" | "nl" | "sv" | "da" | "no" | "nb" | "nn" | "it" | "es" | "pt" | "el"
            | "hu" | "fi" | "et" | "he" | "tr" | "bg" | "ml" | "ta" | "te" | "kn" | "mr" => {
                Self::English
            }
            "fr" | "hi" | "bn" => Self::French,
            "ru" | "uk" | "hr" | "sr" | "bs" => Self::Russian,
            "pl" => Self::Polish,
            "ar" => Self::Arabic,
            "zh" | "ja" | "ko" | "th" | "vi" | "id" | "ms" => Self::CJK,
            _ => Self::English,
        }
    }
}

impl fmt::Debug for PluralRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::English => write!(f, "PluralRule::English"),
            Self::Russian => write!(f, "PluralRule::Russian"),
            Self::Arabic => write!(f, "PluralRule::Arabic"),
            Self::French => write!(f, "PluralRule::French"),
            Self::CJK => write!(f, "PluralRule::CJK"),
            Self::Polish => write!(f, "PluralRule::Polish"),
            Self::Custom(_) => write!(f, "PluralRule::Custom(...)"),
        }
    }
}

// ── Rule implementations ────────────────────────────────────────────

fn english_rule(n: u64) -> PluralCategory {
    if n == 1 {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

fn french_rule(n: u64) -> PluralCategory {
    if n <= 1 {
        PluralCategory::One
    } else {
        PluralCategory::Other
    }
}

fn russian_rule(n: u64) -> PluralCategory {
    let mod10 = n % 10;
    let mod100 = n % 100;

    if mod10 == 1 && mod100 != 11 {
        PluralCategory::One
    } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
        PluralCategory::Few
    } else if mod10 == 0 || (5..=9).contains(&mod10) || (11..=14).contains(&mod100) {
        PluralCategory::Many
    } else {
        PluralCategory::Other
    }
}

fn polish_rule(n: u64) -> PluralCategory {
    let mod10 = n % 10;
    let mod100 = n % 100;

    if n == 1 {
        PluralCategory::One
    } else if (2..=4).contains(&mod10) && !(12..=14).contains(&mod100) {
        PluralCategory::Few
    } else {
        PluralCategory::Many
    }
}

fn arabic_rule(n: u64) -> PluralCategory {
    let mod100 = n % 100;
    match n {
        0 => PluralCategory::Zero,
        1 => PluralCategory::One,
        2 => PluralCategory::Two,
        _ if (3..=10).contains(&mod100) => PluralCategory::Few,
        _ if (11..=99).contains(&mod100) => PluralCategory::Many,
        _ => PluralCategory::Other,
    }
}
