//! 序列化辅助模块
//!
//! 后端的 JSON 形态并不完全一致，这里集中处理宽松的解析规则：
//! - ID 可能是数字，也可能是字符串
//! - 日期可能是 `YYYY-MM-DD`，也可能是完整的日期时间

use crate::InvoiceId;
use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// =========================================================
// InvoiceId: 数字或字符串
// =========================================================

struct StringOrNumber;

impl Visitor<'_> for StringOrNumber {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string or an integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(v.to_string())
    }
}

impl<'de> Deserialize<'de> for InvoiceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StringOrNumber).map(InvoiceId::new)
    }
}

impl Serialize for InvoiceId {
    /// 纯数字 ID 按数字回传，保持与后端一致
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_str().parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(self.as_str()),
        }
    }
}

// =========================================================
// 宽松日期
// =========================================================

/// 解析 `YYYY-MM-DD` 前缀，忽略其后的时间部分
pub fn parse_date_prefix(s: &str) -> Option<NaiveDate> {
    let prefix = s.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

pub fn lenient_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_date_prefix(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid date: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_prefix() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29);
        assert_eq!(parse_date_prefix("2024-02-29"), expected);
        assert_eq!(parse_date_prefix("2024-02-29T10:00:00.000Z"), expected);
        assert_eq!(parse_date_prefix("2024-02"), None);
        assert_eq!(parse_date_prefix("not-a-date"), None);
    }

    #[test]
    fn test_string_id_roundtrips_as_string() {
        let id: InvoiceId = serde_json::from_str("\"INV-001\"").unwrap();
        assert_eq!(id.as_str(), "INV-001");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"INV-001\"");
    }
}
