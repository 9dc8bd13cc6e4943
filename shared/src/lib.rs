use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

pub mod date;
pub mod format;
pub mod protocol;
pub mod serde_helper;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const AUTH_PATH_PREFIX: &str = "/auth/";
pub const DEFAULT_ROLE: &str = "user";

// =========================================================
// 认证模型 (Auth Models)
// =========================================================

/// 登录凭据，仅在请求期间存在，从不持久化
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// 密码不进入日志
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// 注册请求
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_roles")]
    pub roles: Vec<String>,
}

fn default_roles() -> Vec<String> {
    vec![DEFAULT_ROLE.to_string()]
}

impl SignUpRequest {
    /// 创建注册请求，角色默认为单一的 "user"
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            roles: default_roles(),
        }
    }
}

impl fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("roles", &self.roles)
            .finish()
    }
}

/// 当前登录用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl UserRecord {
    pub fn new<I, S>(id: u64, username: &str, email: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            username: username.to_string(),
            email: email.to_string(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// 空的角色要求视为满足
    pub fn has_any_role<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.is_empty() || required.iter().any(|r| self.has_role(r.as_ref()))
    }
}

/// 登录/注册响应
///
/// 后端有两种响应形态：
/// - 嵌套: `{ token, user: { id, username, email, roles } }`
/// - 扁平: `{ token | accessToken, type, id, username, email, roles }`
///
/// 两者都通过 [`AuthResponse::into_parts`] 归一化。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "access_token")]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserRecord>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub roles: Option<BTreeSet<String>>,
}

impl AuthResponse {
    /// 提取 (token, user)；缺少任一部分时返回 None
    pub fn into_parts(self) -> Option<(String, UserRecord)> {
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .or(self.access_token.filter(|t| !t.is_empty()))?;

        let user = match self.user {
            Some(user) => user,
            None => UserRecord {
                id: self.id?,
                username: self.username?,
                email: self.email.unwrap_or_default(),
                roles: self.roles.unwrap_or_default(),
            },
        };

        Some((token, user))
    }
}

// =========================================================
// 发票模型 (Invoice Models)
// =========================================================

/// 发票 ID
///
/// 后端有时返回数字，有时返回字符串，这里统一为字符串保存。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvoiceId(String);

impl InvoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for InvoiceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Paid,
    #[default]
    Pending,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [Self::Pending, Self::Paid, Self::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Pending => "PENDING",
            Self::Overdue => "OVERDUE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
            Self::Overdue => "Overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<InvoiceId>,
    pub customer_name: String,
    pub customer_email: String,
    #[serde(deserialize_with = "serde_helper::lenient_date")]
    pub issue_date: NaiveDate,
    #[serde(deserialize_with = "serde_helper::lenient_date")]
    pub due_date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Invoice {
    /// 已过期且未付款
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.status != InvoiceStatus::Paid
    }

    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        date::days_between(self.due_date, today).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub status: InvoiceStatus,
}

/// 逾期发票汇总
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OverdueSummary {
    pub invoices: Vec<Invoice>,
    pub total: f64,
}

impl OverdueSummary {
    pub fn collect(invoices: &[Invoice], today: NaiveDate) -> Self {
        let invoices: Vec<Invoice> = invoices
            .iter()
            .filter(|inv| inv.is_overdue(today))
            .cloned()
            .collect();
        let total = invoices.iter().map(|inv| inv.amount).sum();
        Self { invoices, total }
    }
}

// =========================================================
// 付款模型 (Payment Models)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[default]
    CreditCard,
    BankTransfer,
    Paypal,
    Cash,
    Check,
    Other,
}

impl PaymentMethod {
    /// 付款对话框中提供的选项（不含 PayPal）
    pub const SELECTABLE: [PaymentMethod; 5] = [
        Self::CreditCard,
        Self::BankTransfer,
        Self::Cash,
        Self::Check,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreditCard => "CREDIT_CARD",
            Self::BankTransfer => "BANK_TRANSFER",
            Self::Paypal => "PAYPAL",
            Self::Cash => "CASH",
            Self::Check => "CHECK",
            Self::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CreditCard => "Credit Card",
            Self::BankTransfer => "Bank Transfer",
            Self::Paypal => "PayPal",
            Self::Cash => "Cash",
            Self::Check => "Check",
            Self::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::CreditCard,
            Self::BankTransfer,
            Self::Paypal,
            Self::Cash,
            Self::Check,
            Self::Other,
        ]
        .into_iter()
        .find(|m| m.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub amount: f64,
    pub payment_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub invoice_id: InvoiceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// =========================================================
// 报表模型 (Report Models)
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl GroupBy {
    pub const ALL: [GroupBy; 4] = [Self::Day, Self::Week, Self::Month, Self::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub payment_method: String,
    pub count: u64,
    pub total_amount: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub period: String,
    pub total_invoices: u64,
    pub total_invoice_amount: f64,
    pub total_paid_amount: f64,
    pub total_outstanding: f64,
    #[serde(default)]
    pub payment_summary: Vec<PaymentSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invoice(due: &str, status: InvoiceStatus, amount: f64) -> Invoice {
        Invoice {
            id: Some(InvoiceId::from(1)),
            customer_name: "Acme".into(),
            customer_email: "billing@acme.test".into(),
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            due_date: due.parse().unwrap(),
            description: "Consulting".into(),
            amount,
            status,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_auth_response_nested_shape() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "token": "T",
            "user": { "id": 1, "username": "u", "email": "u@x.test", "roles": ["user"] }
        }))
        .unwrap();

        let (token, user) = resp.into_parts().unwrap();
        assert_eq!(token, "T");
        assert_eq!(user.id, 1);
        assert!(user.has_role("user"));
    }

    #[test]
    fn test_auth_response_flat_shape() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "token": "",
            "access_token": "A",
            "token_type": "Bearer",
            "type": "Bearer",
            "id": 7,
            "username": "jane",
            "email": "jane@x.test",
            "roles": ["admin", "user"]
        }))
        .unwrap();

        let (token, user) = resp.into_parts().unwrap();
        assert_eq!(token, "A");
        assert_eq!(user.username, "jane");
        assert!(user.has_role("admin"));
    }

    #[test]
    fn test_auth_response_missing_user_is_rejected() {
        let resp: AuthResponse = serde_json::from_value(json!({ "token": "T" })).unwrap();
        assert!(resp.into_parts().is_none());
    }

    #[test]
    fn test_has_any_role() {
        let user = UserRecord {
            id: 1,
            username: "u".into(),
            email: String::new(),
            roles: ["user".to_string()].into_iter().collect(),
        };
        let empty: [&str; 0] = [];
        assert!(user.has_any_role(&empty));
        assert!(user.has_any_role(&["admin", "user"]));
        assert!(!user.has_any_role(&["admin"]));
    }

    #[test]
    fn test_signup_defaults_to_user_role() {
        let req = SignUpRequest::new("u", "u@x.test", "secret1");
        assert_eq!(req.roles, vec!["user".to_string()]);
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["roles"], json!(["user"]));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("u", "hunter2");
        let dbg = format!("{:?}", creds);
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn test_invoice_accepts_numeric_id_and_datetime_dates() {
        let inv: Invoice = serde_json::from_value(json!({
            "id": 42,
            "customerName": "Acme",
            "customerEmail": "a@acme.test",
            "issueDate": "2024-03-01T00:00:00",
            "dueDate": "2024-03-31",
            "description": "Work",
            "amount": 1500.5,
            "status": "PENDING"
        }))
        .unwrap();

        assert_eq!(inv.id, Some(InvoiceId::new("42")));
        assert_eq!(inv.issue_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(inv.status, InvoiceStatus::Pending);
    }

    #[test]
    fn test_overdue_summary_skips_paid_and_future() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let invoices = vec![
            invoice("2024-05-01", InvoiceStatus::Pending, 100.0),
            invoice("2024-05-01", InvoiceStatus::Paid, 999.0),
            invoice("2024-07-01", InvoiceStatus::Pending, 50.0),
            invoice("2024-05-30", InvoiceStatus::Overdue, 25.0),
        ];

        let summary = OverdueSummary::collect(&invoices, today);
        assert_eq!(summary.invoices.len(), 2);
        assert_eq!(summary.total, 125.0);
        assert_eq!(summary.invoices[0].days_overdue(today), 31);
    }

    #[test]
    fn test_payment_serializes_numeric_invoice_id() {
        let payment = Payment {
            amount: 10.0,
            payment_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            payment_method: PaymentMethod::BankTransfer,
            invoice_id: InvoiceId::from(5),
            notes: None,
        };
        let body = serde_json::to_value(&payment).unwrap();
        assert_eq!(body["invoiceId"], json!(5));
        assert_eq!(body["paymentMethod"], json!("BANK_TRANSFER"));
        assert_eq!(body["paymentDate"], json!("2024-01-02"));
    }

    #[test]
    fn test_selectable_payment_methods_exclude_paypal() {
        assert!(!PaymentMethod::SELECTABLE.contains(&PaymentMethod::Paypal));
        assert_eq!(PaymentMethod::parse("CASH"), Some(PaymentMethod::Cash));
    }
}
