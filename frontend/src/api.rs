//! 业务 API 客户端
//!
//! 每个端点由 `invoicer_shared::protocol` 中的 `ApiRequest` 描述，
//! 这里只负责拼 URL、编码、发送和把失败映射为 `ApiError`。
//! 认证头由外层的 `RequestAuthenticator` 负责。

use crate::auth::RequestAuthenticator;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::web::SharedHttp;
use crate::web::http::{HttpClient, HttpRequest};
use leptos::prelude::*;
use invoicer_shared::protocol::{
    ApiRequest, GetInvoiceRequest, InvoiceSummaryRequest, ListInvoicesRequest,
    PaymentSummaryRequest,
};
use invoicer_shared::{
    CreateInvoiceRequest, Invoice, InvoiceId, Payment, PaymentSummary, ReportFilter,
    ReportSummary,
};
use url::form_urlencoded;

/// 应用中使用的 API 客户端（带认证头）
pub type AppApi = InvoicerApi<RequestAuthenticator<SharedHttp>>;

/// 从 Context 获取 API 客户端
pub fn use_api() -> AppApi {
    use_context::<AppApi>().expect("InvoicerApi should be provided")
}

#[derive(Debug, Clone)]
pub struct InvoicerApi<C> {
    http: C,
    config: AppConfig,
}

impl<C: HttpClient> InvoicerApi<C> {
    pub fn new(http: C, config: AppConfig) -> Self {
        Self { http, config }
    }

    /// 发送任意 `ApiRequest` 并解析响应
    pub async fn call<R: ApiRequest>(&self, request: &R) -> Result<R::Response, ApiError> {
        let mut url = self.config.url(&request.path());
        let query = request.query();
        if !query.is_empty() {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            url = format!("{}?{}", url, encoded);
        }

        let mut req = HttpRequest::new(&url, R::METHOD).with_header("Accept", "application/json");
        if R::METHOD.has_body() {
            let body =
                serde_json::to_string(request).map_err(|e| ApiError::Encode(e.to_string()))?;
            req = req.with_json_body(body);
        }

        let resp = self.http.send(req).await.inspect_err(|e| {
            log::warn!("[Api] {} {} failed: {}", R::METHOD.as_str(), url, e);
        })?;

        if !resp.ok() {
            let err = ApiError::from_response(&resp);
            log::warn!(
                "[Api] {} {} status={} error={}",
                R::METHOD.as_str(),
                url,
                resp.status,
                err
            );
            return Err(err);
        }

        resp.json::<R::Response>().map_err(|e| {
            log::error!("[Api] {} {} decode failed: {}", R::METHOD.as_str(), url, e);
            ApiError::Decode(e.to_string())
        })
    }

    pub async fn list_invoices(&self) -> Result<Vec<Invoice>, ApiError> {
        self.call(&ListInvoicesRequest).await
    }

    pub async fn get_invoice(&self, id: &InvoiceId) -> Result<Invoice, ApiError> {
        self.call(&GetInvoiceRequest { id: id.clone() }).await
    }

    pub async fn create_invoice(&self, request: &CreateInvoiceRequest) -> Result<Invoice, ApiError> {
        self.call(request).await
    }

    pub async fn record_payment(&self, payment: &Payment) -> Result<(), ApiError> {
        self.call(payment).await.map(|_| ())
    }

    pub async fn invoice_summary(&self, filter: ReportFilter) -> Result<ReportSummary, ApiError> {
        self.call(&InvoiceSummaryRequest(filter)).await
    }

    pub async fn payment_summary(
        &self,
        filter: ReportFilter,
    ) -> Result<Vec<PaymentSummary>, ApiError> {
        self.call(&PaymentSummaryRequest(filter)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::http::HttpMethod;
    use crate::web::mock::MockHttpClient;
    use chrono::NaiveDate;
    use invoicer_shared::{GroupBy, InvoiceStatus, PaymentMethod};
    use serde_json::{Value, json};

    fn api() -> InvoicerApi<MockHttpClient> {
        InvoicerApi::new(MockHttpClient::new(), AppConfig::default())
    }

    fn invoice_json(id: u64, status: &str) -> Value {
        json!({
            "id": id,
            "customerName": "Acme Ltd",
            "customerEmail": "accounts@acme.test",
            "issueDate": "2024-03-01T00:00:00.000Z",
            "dueDate": "2024-03-31",
            "description": "Retainer",
            "amount": 1500.5,
            "status": status
        })
    }

    #[tokio::test]
    async fn test_list_invoices() {
        let api = api();
        api.http.mock_response(
            "/api/invoices",
            200,
            json!([invoice_json(1, "PAID"), invoice_json(2, "OVERDUE")]),
        );

        let invoices = api.list_invoices().await.unwrap();

        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[1].status, InvoiceStatus::Overdue);
        assert_eq!(
            invoices[0].issue_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        let sent = api.http.last_request().unwrap();
        assert_eq!(sent.method, HttpMethod::Get);
        assert!(sent.body.is_none());
    }

    #[tokio::test]
    async fn test_get_invoice_not_found() {
        let api = api();
        let err = api.get_invoice(&InvoiceId::new("99")).await.unwrap_err();
        assert_eq!(err, ApiError::NotFound);
        assert_eq!(api.http.last_request().unwrap().url, "/api/invoices/99");
    }

    #[tokio::test]
    async fn test_create_invoice_posts_camel_case_body() {
        let api = api();
        api.http
            .mock_response("/api/invoices", 201, invoice_json(8, "PENDING"));

        let request = CreateInvoiceRequest {
            customer_name: "Acme Ltd".into(),
            customer_email: "accounts@acme.test".into(),
            issue_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            description: "Retainer".into(),
            amount: 1500.5,
            status: InvoiceStatus::Pending,
        };
        let created = api.create_invoice(&request).await.unwrap();
        assert_eq!(created.id, Some(InvoiceId::from(8)));

        let sent = api.http.last_request().unwrap();
        let body: Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["customerName"], "Acme Ltd");
        assert_eq!(body["status"], "PENDING");
        assert_eq!(sent.headers.get("Content-Type").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_record_payment_accepts_empty_body() {
        let api = api();
        api.http.mock_response("/api/payments", 201, Value::Null);

        let payment = Payment {
            amount: 250.0,
            payment_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            payment_method: PaymentMethod::BankTransfer,
            invoice_id: InvoiceId::from(8),
            notes: None,
        };
        api.record_payment(&payment).await.unwrap();

        let body: Value =
            serde_json::from_str(api.http.last_request().unwrap().body.as_deref().unwrap())
                .unwrap();
        assert_eq!(body["invoiceId"], 8);
        assert_eq!(body["paymentMethod"], "BANK_TRANSFER");
    }

    #[tokio::test]
    async fn test_invoice_summary_query_string() {
        let api = api();
        let url = "/api/reports/invoice-summary?startDate=2024-01-01T00%3A00%3A00.000Z&groupBy=week";
        api.http.mock_response(
            url,
            200,
            json!({
                "period": "2024-W01",
                "totalInvoices": 3,
                "totalInvoiceAmount": 300.0,
                "totalPaidAmount": 100.0,
                "totalOutstanding": 200.0,
                "paymentSummary": []
            }),
        );

        let filter = ReportFilter {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
            group_by: GroupBy::Week,
        };
        let summary = api.invoice_summary(filter).await.unwrap();

        assert_eq!(summary.total_invoices, 3);
        assert_eq!(api.http.last_request().unwrap().url, url);
    }

    #[tokio::test]
    async fn test_rejection_keeps_server_message() {
        let api = api();
        api.http.mock_response(
            "/api/payments",
            422,
            json!({"message": "Payment exceeds outstanding balance"}),
        );

        let payment = Payment {
            amount: 99999.0,
            payment_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            payment_method: PaymentMethod::Cash,
            invoice_id: InvoiceId::from(8),
            notes: Some("oops".into()),
        };
        let err = api.record_payment(&payment).await.unwrap_err();

        assert_eq!(
            err,
            ApiError::Rejected {
                status: 422,
                message: Some("Payment exceeds outstanding balance".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let api = api();
        api.http
            .mock_response("/api/invoices", 200, json!({"unexpected": true}));

        let err = api.list_invoices().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
