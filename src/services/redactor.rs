//! # 敏感信息脱敏
//!
//! 将邮箱和疑似支付卡号（13 位及以上数字，可用单个空格或短横线分隔）
//! 替换为固定的 `[REDACTED]` 标记。
//!
//! 作用于所有进入日志的自由文本（输入内容、元素文本），
//! 从不作用于结构化字段（标签名、id）。
//!
//! ## 性能策略
//! - 预编译 regex（2 个）：使用 `std::sync::LazyLock`
//! - 无匹配时零拷贝返回 `Cow::Borrowed`

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// 脱敏替换标记
pub const REDACTED: &str = "[REDACTED]";

/// 邮箱匹配正则
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}").unwrap()
});

/// 卡号匹配正则
///
/// 匹配至少 13 位的数字串，数字之间允许单个空格或短横线。
/// 贪婪匹配整段数字，超过 19 位的长串同样整体替换，
/// 保证输出中不会残留任何 13-19 位的连续数字片段。
static CARD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d(?:[ \-]?\d){12,}").unwrap());

/// 对文本执行脱敏
///
/// 先替换邮箱，再替换卡号。替换标记本身不含数字和 `@`，
/// 因此该函数是幂等的：`redact(redact(x)) == redact(x)`。
///
/// # 参数
/// - `text` - 原始文本
///
/// # 返回值
/// 无匹配时借用原文本，否则返回替换后的新字符串
pub fn redact(text: &str) -> Cow<'_, str> {
    let emails = EMAIL_RE.replace_all(text, REDACTED);
    if !CARD_RE.is_match(&emails) {
        return emails;
    }
    Cow::Owned(CARD_RE.replace_all(&emails, REDACTED).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_redact_email() {
        assert_eq!(
            redact("contact me at jane.doe+test@example.co.uk please"),
            "contact me at [REDACTED] please"
        );
    }

    #[test]
    fn test_redact_card_with_separators() {
        assert_eq!(redact("4111 1111 1111 1111"), REDACTED);
        assert_eq!(redact("card: 4111-1111-1111-1111!"), "card: [REDACTED]!");
        assert_eq!(redact("4111111111111"), REDACTED);
    }

    #[test]
    fn test_short_numbers_untouched() {
        // 电话号码、邮编等短数字不受影响
        let text = "call 555 123 4567 or zip 94107";
        assert!(matches!(redact(text), Cow::Borrowed(_)));
        assert_eq!(redact(text), text);
    }

    #[test]
    fn test_long_digit_run_fully_replaced() {
        let out = redact("id 12345678901234567890123 end");
        assert_eq!(out, "id [REDACTED] end");
    }

    proptest! {
        #[test]
        fn test_redact_idempotent(s in ".{0,80}") {
            let once = redact(&s).into_owned();
            let twice = redact(&once).into_owned();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_no_card_run_survives(prefix in "[a-z ]{0,10}", digits in "[0-9]{13,19}", suffix in "[a-z ]{0,10}") {
            let input = format!("{prefix}{digits}{suffix}");
            let out = redact(&input).into_owned();
            prop_assert!(!out.contains(&digits));
        }

        #[test]
        fn test_no_email_survives(user in "[a-z0-9]{1,10}", domain in "[a-z]{1,10}") {
            let email = format!("{user}@{domain}.com");
            let out = redact(&format!("mail {email} now")).into_owned();
            prop_assert!(!out.contains(&email));
        }
    }
}
