//! 金额格式化
//!
//! 金额以南非兰特展示，遵循 en-ZA 习惯：千位用空格分隔，小数点用逗号，
//! 例如 `R 12 345,60`。

/// 按 en-ZA 习惯格式化为兰特金额
pub fn format_zar(amount: f64) -> String {
    if !amount.is_finite() {
        return "R 0,00".to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let rands = cents / 100;
    let rem = cents % 100;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!("{}R {},{:02}", sign, group_thousands(rands), rem)
}

/// 两位小数的纯数字格式
pub fn format_amount(amount: f64) -> String {
    if amount.is_finite() {
        format!("{:.2}", amount)
    } else {
        "0.00".to_string()
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_zar() {
        assert_eq!(format_zar(0.0), "R 0,00");
        assert_eq!(format_zar(5.5), "R 5,50");
        assert_eq!(format_zar(1234.56), "R 1 234,56");
        assert_eq!(format_zar(1_000_000.0), "R 1 000 000,00");
        assert_eq!(format_zar(-42.1), "-R 42,10");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(3.0), "3.00");
        assert_eq!(format_amount(f64::NAN), "0.00");
    }
}
