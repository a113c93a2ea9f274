//! 文本处理工具

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

static UNICODE_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\u([0-9A-Fa-f]{4})").expect("转义序列正则无效"));

/// 将题干中的 `\uXXXX` 转义序列还原为字符，例如 `\u03A9` → `Ω`
///
/// 无法构成合法字符的序列（如代理项）原样保留
pub fn decode_unicode_escapes(text: &str) -> Cow<'_, str> {
    UNICODE_ESCAPE.replace_all(text, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_unicode_escapes() {
        assert_eq!(
            decode_unicode_escapes(r"A resistor of 5\u03A9 is used"),
            "A resistor of 5Ω is used"
        );
        assert_eq!(decode_unicode_escapes(r"\u00B0C and \u03bb"), "°C and λ");
        assert_eq!(decode_unicode_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_invalid_escape_is_kept() {
        assert_eq!(decode_unicode_escapes(r"\uD800"), r"\uD800");
        assert_eq!(decode_unicode_escapes(r"\u12"), r"\u12");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("abcdefgh", 3), "abc...");
    }
}
