//! Presentation formatting for pipeline outcomes
//!
//! These helpers are layered on top of the pipeline's return contract; the
//! outcome itself carries the untruncated text and the numeric value.

/// Echo the detected text with newlines collapsed to spaces, truncated to
/// `max_len` characters with a trailing ellipsis marker when longer.
pub fn detected_text_line(text: &str, max_len: usize) -> String {
    let collapsed = text.replace('\n', " ");
    if collapsed.chars().count() <= max_len {
        collapsed
    } else {
        let mut truncated: String = collapsed.chars().take(max_len).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Render the solution as `= <value>`. The value arrives already rounded
/// for display, so plain formatting suffices: integral values print with
/// no decimal point.
pub fn solution_line(display_value: f64) -> String {
    format!("= {display_value}")
}

/// Render the OCR confidence as a whole-number percentage.
pub fn confidence_line(confidence: f64) -> String {
    format!("{}%", confidence.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_untouched() {
        assert_eq!(detected_text_line("12+8=20", 30), "12+8=20");
    }

    #[test]
    fn test_newlines_collapse_to_spaces() {
        assert_eq!(detected_text_line("12\n+8", 30), "12 +8");
    }

    #[test]
    fn test_long_text_is_truncated_with_ellipsis() {
        let text = "1+2+3+4+5+6+7+8+9+10+11+12+13+14";
        let line = detected_text_line(text, 30);
        assert_eq!(line.chars().count(), 33);
        assert!(line.ends_with("..."));
        assert!(line.starts_with("1+2+3"));
    }

    #[test]
    fn test_exact_length_is_not_truncated() {
        let text = "123456789012345678901234567890";
        assert_eq!(detected_text_line(text, 30), text);
    }

    #[test]
    fn test_solution_line() {
        assert_eq!(solution_line(20.0), "= 20");
        assert_eq!(solution_line(3.3333), "= 3.3333");
        assert_eq!(solution_line(-2.5), "= -2.5");
    }

    #[test]
    fn test_confidence_line_rounds_to_integer() {
        assert_eq!(confidence_line(91.4), "91%");
        assert_eq!(confidence_line(91.5), "92%");
        assert_eq!(confidence_line(0.0), "0%");
    }
}
