use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::layout::{ErrorAlert, MainLayout, Spinner, handle_api_error};
use crate::web::{AppRoute, Link, use_router};
use invoicer_shared::format::format_zar;
use invoicer_shared::{Invoice, OverdueSummary, date};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 控制面板：逾期发票一览
#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();

    let (overdue, set_overdue) = signal(OverdueSummary::default());
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let today = date::today();

    // 初始加载
    spawn_local(async move {
        match api.list_invoices().await {
            Ok(invoices) => {
                let mut summary = OverdueSummary::collect(&invoices, today);
                summary
                    .invoices
                    .sort_by_key(|inv| std::cmp::Reverse(inv.days_overdue(today)));
                log::debug!(
                    "[Dashboard] loaded invoices={} overdue={}",
                    invoices.len(),
                    summary.invoices.len()
                );
                set_overdue.set(summary);
            }
            Err(e) => set_error_msg.set(Some(handle_api_error(e, &auth, &router))),
        }
        set_loading.set(false);
    });

    view! {
        <MainLayout>
            <div class="flex items-center justify-between mb-6">
                <h1 class="text-2xl font-bold">"Overdue invoices"</h1>
                <Link to=AppRoute::InvoiceNew.to_path() class="btn btn-primary btn-sm">
                    "New invoice"
                </Link>
            </div>

            <ErrorAlert message=error_msg.into() />

            <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
                <div class="stats shadow mb-6">
                    <div class="stat">
                        <div class="stat-title">"Overdue invoices"</div>
                        <div class="stat-value">{move || overdue.with(|s| s.invoices.len())}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Total outstanding"</div>
                        <div class="stat-value text-error">
                            {move || overdue.with(|s| format_zar(s.total))}
                        </div>
                    </div>
                </div>

                <Show
                    when=move || overdue.with(|s| !s.invoices.is_empty())
                    fallback=|| view! {
                        <div class="alert alert-success">"Nothing is overdue. Nice work!"</div>
                    }
                >
                    <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                        <table class="table">
                            <thead>
                                <tr>
                                    <th>"Customer"</th>
                                    <th>"Due date"</th>
                                    <th>"Days overdue"</th>
                                    <th class="text-right">"Amount"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {move || {
                                    overdue
                                        .get()
                                        .invoices
                                        .into_iter()
                                        .map(|inv| overdue_row(inv, today))
                                        .collect_view()
                                }}
                            </tbody>
                        </table>
                    </div>
                </Show>
            </Show>
        </MainLayout>
    }
}

fn overdue_row(invoice: Invoice, today: chrono::NaiveDate) -> impl IntoView {
    let days = invoice.days_overdue(today);
    let detail = invoice
        .id
        .as_ref()
        .map(|id| AppRoute::InvoiceDetail(id.clone()).to_path())
        .unwrap_or_else(|| AppRoute::Invoices.to_path());

    view! {
        <tr class="hover">
            <td>
                <Link to=detail class="link link-hover font-medium">{invoice.customer_name}</Link>
                <div class="text-xs text-base-content/60">{invoice.customer_email}</div>
            </td>
            <td>{date::format_short(invoice.due_date)}</td>
            <td>
                <span class="badge badge-error badge-outline">{format!("{} days", days)}</span>
            </td>
            <td class="text-right font-mono">{format_zar(invoice.amount)}</td>
        </tr>
    }
}
