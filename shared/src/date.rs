//! 日期工具模块
//!
//! 发票只关心日历日期，统一使用 `chrono::NaiveDate`：
//! - `today()`: 本地当前日期（WASM 下通过 js Date 获取）
//! - 日期差、默认到期日、报表查询用的 ISO 字符串

use chrono::{Days, Local, NaiveDate};

/// 默认账期（天）
pub const DEFAULT_PAYMENT_TERM_DAYS: u64 = 30;

/// 本地当前日期
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `to - from` 的天数，可能为负
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// 根据开票日期计算默认到期日
pub fn default_due_date(issue: NaiveDate) -> NaiveDate {
    issue
        .checked_add_days(Days::new(DEFAULT_PAYMENT_TERM_DAYS))
        .unwrap_or(issue)
}

/// 转为当天零点的 UTC ISO 字符串，例如 `2024-01-05T00:00:00.000Z`
pub fn to_iso_start_of_day(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// 表单 `<input type="date">` 使用的格式
pub fn to_input_value(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 解析表单日期输入；也接受带时间部分的 ISO 字符串
pub fn parse_input(value: &str) -> Option<NaiveDate> {
    crate::serde_helper::parse_date_prefix(value.trim())
}

/// 短格式展示，例如 `Jan 5, 2024`
pub fn format_short(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}
