//! 表单数据模型
//!
//! 页面组件把输入框的原始字符串收集为 `*Form`，提交时调用 `validate()`
//! 得到请求对象。校验失败时不会发出任何请求。

use crate::validation::{self, ValidationErrors, Validator};
use chrono::NaiveDate;
use invoicer_shared::{
    CreateInvoiceRequest, Credentials, GroupBy, InvoiceId, InvoiceStatus, Payment, PaymentMethod,
    ReportFilter, SignUpRequest, date,
};

const USERNAME_MIN: usize = 3;
const PASSWORD_MIN: usize = 6;
const CUSTOMER_NAME_MIN: usize = 2;
const CUSTOMER_NAME_MAX: usize = 100;
const CUSTOMER_EMAIL_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;
const MIN_AMOUNT: f64 = 0.01;

// =========================================================
// 认证表单
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut v = Validator::new();
        v.check("username", validation::required("Username", &self.username))
            .check("password", validation::required("Password", &self.password));
        v.finish()?;

        Ok(Credentials::new(self.username.trim(), self.password.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<SignUpRequest, ValidationErrors> {
        let mut v = Validator::new();
        v.check("username", validation::required("Username", &self.username))
            .check(
                "username",
                validation::min_len("Username", &self.username, USERNAME_MIN),
            )
            .check("email", validation::required("Email", &self.email))
            .check("email", validation::email(&self.email))
            .check("password", validation::required("Password", &self.password))
            .check(
                "password",
                validation::min_len("Password", &self.password, PASSWORD_MIN),
            );
        v.finish()?;

        Ok(SignUpRequest::new(
            self.username.trim(),
            self.email.trim(),
            self.password.as_str(),
        ))
    }
}

// =========================================================
// 发票表单
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceForm {
    pub customer_name: String,
    pub customer_email: String,
    pub issue_date: String,
    pub due_date: String,
    pub description: String,
    pub amount: String,
    pub status: InvoiceStatus,
}

impl InvoiceForm {
    /// 以 `today` 为开票日期，默认账期后到期
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            customer_name: String::new(),
            customer_email: String::new(),
            issue_date: date::to_input_value(today),
            due_date: date::to_input_value(date::default_due_date(today)),
            description: String::new(),
            amount: String::new(),
            status: InvoiceStatus::Pending,
        }
    }

    pub fn validate(&self) -> Result<CreateInvoiceRequest, ValidationErrors> {
        let mut v = Validator::new();
        v.check(
            "customer_name",
            validation::required("Customer name", &self.customer_name),
        )
        .check(
            "customer_name",
            validation::min_len("Customer name", &self.customer_name, CUSTOMER_NAME_MIN),
        )
        .check(
            "customer_name",
            validation::max_len("Customer name", &self.customer_name, CUSTOMER_NAME_MAX),
        )
        .check(
            "customer_email",
            validation::required("Customer email", &self.customer_email),
        )
        .check("customer_email", validation::email(&self.customer_email))
        .check(
            "customer_email",
            validation::max_len("Customer email", &self.customer_email, CUSTOMER_EMAIL_MAX),
        )
        .check(
            "issue_date",
            validation::valid_date("Issue date", &self.issue_date),
        )
        .check("due_date", validation::valid_date("Due date", &self.due_date))
        .check(
            "description",
            validation::required("Description", &self.description),
        )
        .check(
            "description",
            validation::max_len("Description", &self.description, DESCRIPTION_MAX),
        )
        .check("amount", validation::required("Amount", &self.amount))
        .check(
            "amount",
            validation::min_amount("Amount", &self.amount, MIN_AMOUNT),
        );

        let issue = validation::parse_date(&self.issue_date);
        let due = validation::parse_date(&self.due_date);
        if let (Some(issue), Some(due)) = (issue, due) {
            v.check(
                "due_date",
                (due < issue).then(|| "Due date cannot be before the issue date".to_string()),
            );
        }
        v.finish()?;

        // 上面的校验保证了以下解析成功
        let (Some(issue_date), Some(due_date), Some(amount)) =
            (issue, due, validation::parse_amount(&self.amount))
        else {
            return Err(ValidationErrors::default());
        };

        Ok(CreateInvoiceRequest {
            customer_name: self.customer_name.trim().to_string(),
            customer_email: self.customer_email.trim().to_string(),
            issue_date,
            due_date,
            description: self.description.trim().to_string(),
            amount,
            status: self.status,
        })
    }
}

// =========================================================
// 付款表单
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentForm {
    pub amount: String,
    pub payment_date: String,
    pub payment_method: PaymentMethod,
    pub notes: String,
}

impl PaymentForm {
    /// 默认金额为发票金额，日期为今天
    pub fn for_invoice(amount: f64, today: NaiveDate) -> Self {
        Self {
            amount: format!("{:.2}", amount),
            payment_date: date::to_input_value(today),
            payment_method: PaymentMethod::CreditCard,
            notes: String::new(),
        }
    }

    pub fn validate(&self, invoice_id: &InvoiceId) -> Result<Payment, ValidationErrors> {
        let mut v = Validator::new();
        v.check("amount", validation::required("Amount", &self.amount))
            .check(
                "amount",
                validation::min_amount("Amount", &self.amount, MIN_AMOUNT),
            )
            .check(
                "payment_date",
                validation::valid_date("Payment date", &self.payment_date),
            );
        v.finish()?;

        let (Some(amount), Some(payment_date)) = (
            validation::parse_amount(&self.amount),
            validation::parse_date(&self.payment_date),
        ) else {
            return Err(ValidationErrors::default());
        };

        let notes = self.notes.trim();
        Ok(Payment {
            amount,
            payment_date,
            payment_method: self.payment_method,
            invoice_id: invoice_id.clone(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

// =========================================================
// 报表筛选
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilterForm {
    pub start_date: String,
    pub end_date: String,
    pub group_by: GroupBy,
}

impl ReportFilterForm {
    pub fn validate(&self) -> Result<ReportFilter, ValidationErrors> {
        let mut v = Validator::new();
        let start = optional_date(&mut v, "start_date", "Start date", &self.start_date);
        let end = optional_date(&mut v, "end_date", "End date", &self.end_date);
        if let (Some(start), Some(end)) = (start, end) {
            v.check(
                "end_date",
                (end < start).then(|| "End date cannot be before the start date".to_string()),
            );
        }
        v.finish()?;

        Ok(ReportFilter {
            start_date: start,
            end_date: end,
            group_by: self.group_by,
        })
    }
}

fn optional_date(
    v: &mut Validator,
    field: &'static str,
    label: &str,
    value: &str,
) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        return None;
    }
    v.check(field, validation::valid_date(label, value));
    validation::parse_date(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn filled_invoice() -> InvoiceForm {
        InvoiceForm {
            customer_name: "Acme Ltd".into(),
            customer_email: "accounts@acme.test".into(),
            description: "March retainer".into(),
            amount: "1500".into(),
            ..InvoiceForm::starting(d(2024, 3, 1))
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert!(errors.field("username").is_some());
        assert!(errors.field("password").is_some());

        let form = LoginForm {
            username: " alice ".into(),
            password: "pw".into(),
        };
        assert_eq!(form.validate().unwrap().username, "alice");
    }

    #[test]
    fn test_sign_up_rules() {
        let form = SignUpForm {
            username: "al".into(),
            email: "not-an-email".into(),
            password: "12345".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 3);

        let form = SignUpForm {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password: "123456".into(),
        };
        let request = form.validate().unwrap();
        assert_eq!(request.roles, vec!["user".to_string()]);
    }

    #[test]
    fn test_invoice_form_defaults() {
        let form = InvoiceForm::starting(d(2024, 1, 15));
        assert_eq!(form.issue_date, "2024-01-15");
        assert_eq!(form.due_date, "2024-02-14");
        assert_eq!(form.status, InvoiceStatus::Pending);
    }

    #[test]
    fn test_invoice_form_valid() {
        let request = filled_invoice().validate().unwrap();
        assert_eq!(request.amount, 1500.0);
        assert_eq!(request.due_date, d(2024, 3, 31));
    }

    #[test]
    fn test_invoice_due_before_issue() {
        let form = InvoiceForm {
            due_date: "2024-02-28".into(),
            ..filled_invoice()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            errors.field("due_date"),
            Some("Due date cannot be before the issue date")
        );
    }

    #[test]
    fn test_invoice_field_limits() {
        let form = InvoiceForm {
            customer_name: "A".into(),
            description: "x".repeat(501),
            amount: "0".into(),
            ..filled_invoice()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field("customer_name").is_some());
        assert!(errors.field("description").is_some());
        assert!(errors.field("amount").is_some());
        assert!(errors.field("customer_email").is_none());
    }

    #[test]
    fn test_payment_form() {
        let id = InvoiceId::from(5);
        let form = PaymentForm::for_invoice(250.0, d(2024, 4, 2));
        let payment = form.validate(&id).unwrap();
        assert_eq!(payment.amount, 250.0);
        assert_eq!(payment.payment_method, PaymentMethod::CreditCard);
        assert!(payment.notes.is_none());

        let bad = PaymentForm {
            amount: "0.001".into(),
            payment_date: String::new(),
            ..form
        };
        let errors = bad.validate(&id).unwrap_err();
        assert!(errors.field("amount").is_some());
        assert!(errors.field("payment_date").is_some());
    }

    #[test]
    fn test_report_filter_form() {
        let filter = ReportFilterForm::default().validate().unwrap();
        assert_eq!(filter, ReportFilter::default());

        let form = ReportFilterForm {
            start_date: "2024-05-01".into(),
            end_date: "2024-04-01".into(),
            group_by: GroupBy::Week,
        };
        assert!(form.validate().unwrap_err().field("end_date").is_some());
    }
}
