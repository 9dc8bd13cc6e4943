//! 表单校验规则
//!
//! 每条规则返回 `Option<String>`（错误文案），由 `Validator` 逐字段累积。

use chrono::NaiveDate;
use invoicer_shared::date;
use std::fmt;

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// 一次校验收集到的全部错误
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// 某字段的第一条错误
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn first_message(&self) -> Option<&str> {
        self.errors.first().map(|e| e.message.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

/// 逐字段累积错误；同一字段只记录第一条
#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: &'static str, result: Option<String>) -> &mut Self {
        if let Some(message) = result {
            if self.errors.field(field).is_none() {
                self.errors.errors.push(FieldError { field, message });
            }
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

// =========================================================
// 规则
// =========================================================

pub fn required(label: &str, value: &str) -> Option<String> {
    value
        .trim()
        .is_empty()
        .then(|| format!("{} is required", label))
}

pub fn min_len(label: &str, value: &str, min: usize) -> Option<String> {
    (value.trim().chars().count() < min)
        .then(|| format!("{} must be at least {} characters", label, min))
}

pub fn max_len(label: &str, value: &str, max: usize) -> Option<String> {
    (value.trim().chars().count() > max)
        .then(|| format!("{} must be at most {} characters", label, max))
}

pub fn email(value: &str) -> Option<String> {
    if is_valid_email(value.trim()) {
        None
    } else {
        Some("Please enter a valid email address".to_string())
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}

/// 解析金额输入，允许千位空格和逗号小数点
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn min_amount(label: &str, value: &str, min: f64) -> Option<String> {
    match parse_amount(value) {
        None => Some(format!("{} must be a number", label)),
        Some(n) if n < min => Some(format!("{} must be at least {:.2}", label, min)),
        Some(_) => None,
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    date::parse_input(value)
}

pub fn valid_date(label: &str, value: &str) -> Option<String> {
    if value.trim().is_empty() {
        return Some(format!("{} is required", label));
    }
    parse_date(value)
        .is_none()
        .then(|| format!("{} is not a valid date", label))
}
