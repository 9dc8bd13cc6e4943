use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::layout::{ErrorAlert, MainLayout, Spinner, handle_api_error};
use crate::web::{AppRoute, Link, use_router};
use invoicer_shared::format::format_zar;
use invoicer_shared::{Invoice, InvoiceStatus, date};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 按状态和关键字（客户名、邮箱、描述）筛选
pub fn filter_invoices(
    invoices: &[Invoice],
    status: Option<InvoiceStatus>,
    query: &str,
) -> Vec<Invoice> {
    let query = query.trim().to_lowercase();
    invoices
        .iter()
        .filter(|inv| status.is_none_or(|s| inv.status == s))
        .filter(|inv| {
            query.is_empty()
                || inv.customer_name.to_lowercase().contains(&query)
                || inv.customer_email.to_lowercase().contains(&query)
                || inv.description.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

pub fn status_badge_class(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Paid => "badge badge-success",
        InvoiceStatus::Pending => "badge badge-warning",
        InvoiceStatus::Overdue => "badge badge-error",
    }
}

#[component]
pub fn InvoiceListPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();

    let (invoices, set_invoices) = signal(Vec::<Invoice>::new());
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let status_filter = RwSignal::new(Option::<InvoiceStatus>::None);
    let query = RwSignal::new(String::new());

    spawn_local(async move {
        match api.list_invoices().await {
            Ok(data) => set_invoices.set(data),
            Err(e) => set_error_msg.set(Some(handle_api_error(e, &auth, &router))),
        }
        set_loading.set(false);
    });

    let visible = Memo::new(move |_| {
        invoices.with(|all| filter_invoices(all, status_filter.get(), &query.get()))
    });

    view! {
        <MainLayout>
            <div class="flex items-center justify-between mb-6">
                <h1 class="text-2xl font-bold">"Invoices"</h1>
                <Link to=AppRoute::InvoiceNew.to_path() class="btn btn-primary btn-sm">
                    "New invoice"
                </Link>
            </div>

            <ErrorAlert message=error_msg.into() />

            <div class="flex flex-wrap gap-3 mb-4">
                <input
                    type="search"
                    placeholder="Search customer or description"
                    class="input input-bordered input-sm w-72"
                    on:input=move |ev| query.set(event_target_value(&ev))
                    prop:value=query
                />
                <select
                    class="select select-bordered select-sm"
                    on:change=move |ev| status_filter.set(InvoiceStatus::parse(&event_target_value(&ev)))
                >
                    <option value="">"All statuses"</option>
                    {InvoiceStatus::ALL
                        .into_iter()
                        .map(|s| view! { <option value=s.as_str()>{s.label()}</option> })
                        .collect_view()}
                </select>
            </div>

            <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
                <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Customer"</th>
                                <th>"Issued"</th>
                                <th>"Due"</th>
                                <th>"Status"</th>
                                <th class="text-right">"Amount"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {move || visible.get().into_iter().map(invoice_row).collect_view()}
                        </tbody>
                    </table>
                    <Show when=move || visible.with(Vec::is_empty)>
                        <p class="p-6 text-center text-base-content/60">"No invoices match."</p>
                    </Show>
                </div>
            </Show>
        </MainLayout>
    }
}

fn invoice_row(invoice: Invoice) -> impl IntoView {
    let detail = invoice
        .id
        .as_ref()
        .map(|id| AppRoute::InvoiceDetail(id.clone()).to_path())
        .unwrap_or_else(|| AppRoute::Invoices.to_path());

    view! {
        <tr class="hover">
            <td>
                <Link to=detail class="link link-hover font-medium">{invoice.customer_name}</Link>
            </td>
            <td>{date::format_short(invoice.issue_date)}</td>
            <td>{date::format_short(invoice.due_date)}</td>
            <td>
                <span class=status_badge_class(invoice.status)>{invoice.status.label()}</span>
            </td>
            <td class="text-right font-mono">{format_zar(invoice.amount)}</td>
        </tr>
    }
}
