//! 数值解析工具
//!
//! 表单里的数字都是用户随手输入的文本，这里按"取开头的整数部分"的规则宽松解析。

/// 解析字符串开头的十进制整数
///
/// 规则：
/// - 忽略前导空白
/// - 允许一个 `+` / `-` 符号
/// - 遇到第一个非数字字符就停止（`"42abc"` → 42，`"3.9"` → 3）
/// - 一个数字都没有时返回 `None`
/// - 超出 `i64` 范围时饱和到边界值
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digit_count = digits.bytes().take_while(u8::is_ascii_digit).count();
    if digit_count == 0 {
        return None;
    }

    let mut value: i64 = 0;
    for b in digits.bytes().take(digit_count) {
        let d = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }

    Some(if negative { -value } else { value })
}
