//! Text Normalizer
//!
//! Maps raw OCR output to a candidate arithmetic expression by running a
//! fixed, ordered list of pure transformation rules. Normalization is
//! deliberately permissive: it strips rather than validates, and leaves
//! grammar enforcement (operator adjacency, balanced parentheses) to the
//! evaluator.

use std::fmt;

/// A single normalization rule. Rules are applied in the order listed in
/// [`STEPS`]; each operates on the output of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeStep {
    /// Substitute common OCR/math-notation confusions: `x`/`X` -> `*`,
    /// `÷` -> `/`.
    SubstituteGlyphs,
    /// Cut the text at the first `=`. An input like `12+5=17` still
    /// evaluates the left-hand side; the right-hand side is discarded,
    /// not validated.
    DropEquals,
    /// Strip every character outside the allowed expression set.
    StripForeign,
}

/// The normalization pipeline, in application order. Order matters:
/// glyph substitution must run before stripping, or `x` would be lost.
pub const STEPS: [NormalizeStep; 3] = [
    NormalizeStep::SubstituteGlyphs,
    NormalizeStep::DropEquals,
    NormalizeStep::StripForeign,
];

impl NormalizeStep {
    /// Apply this rule to the given text.
    pub fn apply(self, input: &str) -> String {
        match self {
            NormalizeStep::SubstituteGlyphs => input
                .chars()
                .map(|ch| match ch {
                    'x' | 'X' => '*',
                    '÷' => '/',
                    other => other,
                })
                .collect(),
            NormalizeStep::DropEquals => {
                input.split('=').next().unwrap_or_default().to_string()
            }
            NormalizeStep::StripForeign => input.chars().filter(|ch| is_allowed(*ch)).collect(),
        }
    }
}

/// Whether a character may appear in a candidate expression.
pub fn is_allowed(ch: char) -> bool {
    ch.is_ascii_digit() || matches!(ch, '.' | '(' | ')' | '+' | '-' | '*' | '/')
}

/// A normalized string believed to represent a solvable arithmetic
/// expression. Invariant: never empty, and every character satisfies
/// [`is_allowed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateExpression(String);

impl CandidateExpression {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run the full normalization pipeline over raw OCR text.
///
/// Returns `None` when stripping leaves nothing, so an empty candidate is
/// never passed downstream.
pub fn normalize(raw: &str) -> Option<CandidateExpression> {
    let mut text = raw.to_string();
    for step in STEPS {
        text = step.apply(&text);
    }

    if text.is_empty() {
        None
    } else {
        Some(CandidateExpression(text))
    }
}
