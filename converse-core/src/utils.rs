// converse-core/src/utils.rs
//! Text helpers for the report.

/// Truncates a string to a maximum character count, adding "..." if truncated.
/// Handles multi-byte characters correctly.
pub fn truncate_string(input: &str, max_chars: usize) -> String {
    if input.chars().count() > max_chars {
        let kept: String = input.chars().take(max_chars).collect();
        format!("{}...", kept)
    } else {
        input.to_string()
    }
}

/// Formats an integer with comma thousands separators: `1500` -> `"1,500"`.
pub fn format_with_grouping(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_no_truncation() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_with_truncation() {
        assert_eq!(truncate_string("hello world", 5), "hello...");
        assert_eq!(truncate_string("hello world", 0), "...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate_string("你好世界", 4), "你好世界");
        assert_eq!(truncate_string("你好世界", 2), "你好...");
    }

    #[test]
    fn test_grouping() {
        assert_eq!(format_with_grouping(0), "0");
        assert_eq!(format_with_grouping(15), "15");
        assert_eq!(format_with_grouping(999), "999");
        assert_eq!(format_with_grouping(1500), "1,500");
        assert_eq!(format_with_grouping(123456), "123,456");
        assert_eq!(format_with_grouping(1234567), "1,234,567");
        assert_eq!(format_with_grouping(u64::MAX), "18,446,744,073,709,551,615");
    }
}
