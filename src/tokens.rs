//! Character-count token heuristic.
//!
//! Not a tokenizer: one token per four characters, rounded up. Length is
//! measured in UTF-16 code units so counts line up with what JavaScript
//! clients compute for the same text.

/// Characters attributed to a single token.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of `text` as `ceil(len / 4)`.
pub fn estimate_tokens(text: &str) -> u32 {
    let units = text.encode_utf16().count();
    u32::try_from(units.div_ceil(CHARS_PER_TOKEN)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn exact_multiple_does_not_round_up() {
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcdefgh"), 2);
    }

    #[test]
    fn partial_chunk_rounds_up() {
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        // `{"prompt":"abcd"}` is 17 characters
        assert_eq!(estimate_tokens(r#"{"prompt":"abcd"}"#), 5);
    }

    #[test]
    fn counts_utf16_units_not_bytes() {
        // 4 chars, 8 bytes in UTF-8
        assert_eq!(estimate_tokens("éééé"), 1);
        // one astral char is two UTF-16 units
        assert_eq!(estimate_tokens("😀😀"), 1);
        assert_eq!(estimate_tokens("😀😀😀"), 2);
    }
}
