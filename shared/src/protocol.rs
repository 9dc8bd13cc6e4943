use crate::{
    AuthResponse, CreateInvoiceRequest, Credentials, Invoice, InvoiceId, Payment, PaymentSummary,
    ReportFilter, ReportSummary, SignUpRequest, date,
};
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Whether the request carries a JSON body.
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Paths are relative to the configured API base (e.g. `/api`).
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;

    /// The URL path (or suffix).
    fn path(&self) -> String;

    /// Query string parameters, already in wire form.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for Credentials {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/login".to_string()
    }
}

impl ApiRequest for SignUpRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/auth/signup".to_string()
    }
}

// =========================================================
// Invoices
// =========================================================

/// List all invoices
#[derive(Debug, Serialize, Deserialize)]
pub struct ListInvoicesRequest;

impl ApiRequest for ListInvoicesRequest {
    type Response = Vec<Invoice>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/invoices".to_string()
    }
}

/// Fetch a single invoice
#[derive(Debug, Serialize, Deserialize)]
pub struct GetInvoiceRequest {
    pub id: InvoiceId,
}

impl ApiRequest for GetInvoiceRequest {
    type Response = Invoice;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("/invoices/{}", self.id)
    }
}

impl ApiRequest for CreateInvoiceRequest {
    type Response = Invoice;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/invoices".to_string()
    }
}

// =========================================================
// Payments
// =========================================================

/// The backend answers with a payment record we never read.
impl ApiRequest for Payment {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        "/payments".to_string()
    }
}

// =========================================================
// Reports
// =========================================================

fn date_range_query(filter: &ReportFilter) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(start) = filter.start_date {
        params.push(("startDate", date::to_iso_start_of_day(start)));
    }
    if let Some(end) = filter.end_date {
        params.push(("endDate", date::to_iso_start_of_day(end)));
    }
    params
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceSummaryRequest(pub ReportFilter);

impl ApiRequest for InvoiceSummaryRequest {
    type Response = ReportSummary;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/reports/invoice-summary".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = date_range_query(&self.0);
        params.push(("groupBy", self.0.group_by.as_str().to_string()));
        params
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentSummaryRequest(pub ReportFilter);

impl ApiRequest for PaymentSummaryRequest {
    type Response = Vec<PaymentSummary>;
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/reports/payment-summary".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        date_range_query(&self.0)
    }
}
