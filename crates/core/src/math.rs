//! Inline TeX to terminal text.
//!
//! Handles the small TeX vocabulary used on slides: fractions, sums,
//! sub/superscripts, and a few symbols. Anything unrecognized passes through.

use regex::Regex;
use std::sync::LazyLock;

/// Regex to collapse runs of spaces and tabs.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// `\frac{a}{b}` with brace-free arguments. Applied repeatedly for nesting.
static FRAC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\frac\{([^{}]*)\}\{([^{}]*)\}").unwrap());

/// Single-character subscript, e.g. `w_0`.
static SUBSCRIPT_CHAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([0-9a-z])").unwrap());

/// Braced subscript, e.g. `x_{0i}`.
static SUBSCRIPT_GROUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\{([^{}]*)\}").unwrap());

/// Superscript, braced or single character.
static SUPERSCRIPT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\^(?:\{([^{}]*)\}|([0-9a-z]))").unwrap());

/// Inline math spans inside prose: `$...$`.
static INLINE_MATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([^$]+)\$").unwrap());

/// Control words replaced by a symbol.
const SYMBOLS: &[(&str, &str)] = &[
    (r"\sum", "Σ"),
    (r"\cdot", "·"),
    (r"\times", "×"),
    (r"\partial", "∂"),
    (r"\alpha", "α"),
    (r"\theta", "θ"),
    (r"\nabla", "∇"),
    (r"\ldots", "…"),
    (r"\approx", "≈"),
    (r"\leq", "≤"),
    (r"\geq", "≥"),
];

fn subscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn superscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        'i' => 'ⁱ',
        'n' => 'ⁿ',
        _ => return None,
    })
}

/// Map every character through `table`, or fall back to `marker{text}`.
fn script(text: &str, table: fn(char) -> Option<char>, marker: char) -> String {
    match text.chars().map(table).collect::<Option<String>>() {
        Some(mapped) => mapped,
        None if text.chars().count() == 1 => format!("{}{}", marker, text),
        None => format!("{}{{{}}}", marker, text),
    }
}

/// Converts inline TeX into readable plain text.
#[derive(Debug, Clone)]
pub struct MathNormalizer {
    /// Use Unicode sub/superscript characters where available.
    unicode_scripts: bool,
}

impl Default for MathNormalizer {
    fn default() -> Self {
        Self {
            unicode_scripts: true,
        }
    }
}

impl MathNormalizer {
    /// Create a normalizer that uses Unicode sub/superscripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to use Unicode sub/superscript characters.
    pub fn with_unicode_scripts(mut self, enabled: bool) -> Self {
        self.unicode_scripts = enabled;
        self
    }

    /// Normalize a single TeX expression.
    pub fn normalize(&self, tex: &str) -> String {
        let mut result = tex.to_string();

        // Innermost fractions first so nested ones resolve.
        while FRAC_REGEX.is_match(&result) {
            result = FRAC_REGEX.replace_all(&result, "($1)/($2)").into_owned();
        }

        for (word, symbol) in SYMBOLS {
            result = result.replace(word, symbol);
        }

        if self.unicode_scripts {
            result = SUBSCRIPT_GROUP_REGEX
                .replace_all(&result, |caps: &regex::Captures| {
                    script(&caps[1], subscript_char, '_')
                })
                .into_owned();
            result = SUBSCRIPT_CHAR_REGEX
                .replace_all(&result, |caps: &regex::Captures| {
                    script(&caps[1], subscript_char, '_')
                })
                .into_owned();
            result = SUPERSCRIPT_REGEX
                .replace_all(&result, |caps: &regex::Captures| {
                    let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
                    script(inner, superscript_char, '^')
                })
                .into_owned();
        }

        // Spacing commands.
        result = result.replace(r"\,", " ").replace(r"\;", " ").replace(r"\ ", " ");

        WHITESPACE_COLLAPSE_REGEX
            .replace_all(&result, " ")
            .trim()
            .to_string()
    }

    /// Normalize prose that embeds `$...$` math spans.
    pub fn normalize_inline(&self, text: &str) -> String {
        let replaced = INLINE_MATH_REGEX.replace_all(text, |caps: &regex::Captures| self.normalize(&caps[1]));
        WHITESPACE_COLLAPSE_REGEX
            .replace_all(&replaced, " ")
            .trim()
            .to_string()
    }
}
