//! Expression Evaluator Adapter
//!
//! Wraps the arithmetic engine behind a trait seam and owns the display
//! rounding policy. Callers never see raw engine errors; the pipeline
//! classifies any failure here as an unsolvable expression.

pub mod arith;

use anyhow::Result;
use async_trait::async_trait;

/// The expression evaluation capability: standard arithmetic grammar with
/// operator precedence, parentheses, unary minus, and decimals. Fails on
/// malformed input.
#[async_trait]
pub trait Evaluate: Send + Sync {
    async fn evaluate(&self, expr: &str) -> Result<f64>;
}

/// Evaluator backed by the built-in shunting-yard engine.
#[derive(Debug, Default)]
pub struct ArithmeticEvaluator;

#[async_trait]
impl Evaluate for ArithmeticEvaluator {
    async fn evaluate(&self, expr: &str) -> Result<f64> {
        arith::evaluate(expr).map_err(Into::into)
    }
}

/// Round a result for display: integral values pass through unrounded,
/// fractional values are rounded to 4 decimal places (half away from zero,
/// per `f64::round`). No other module re-derives this rounding.
pub fn display_value(value: f64) -> f64 {
    if value.fract() == 0.0 {
        value
    } else {
        (value * 10_000.0).round() / 10_000.0
    }
}
