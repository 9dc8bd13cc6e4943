//! 报表页
//!
//! 发票汇总与付款方式汇总并发请求，任一失败都展示错误。

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::layout::{ErrorAlert, FieldError, MainLayout, Spinner, field_message, handle_api_error};
use crate::forms::ReportFilterForm;
use crate::validation::ValidationErrors;
use crate::web::use_router;
use invoicer_shared::format::format_zar;
use invoicer_shared::{GroupBy, PaymentSummary, ReportFilter, ReportSummary};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ReportsPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();

    let start_date = RwSignal::new(String::new());
    let end_date = RwSignal::new(String::new());
    let group_by = RwSignal::new(GroupBy::default());
    let errors = RwSignal::new(ValidationErrors::default());

    let (summary, set_summary) = signal(Option::<ReportSummary>::None);
    let (payments, set_payments) = signal(Vec::<PaymentSummary>::new());
    let (loading, set_loading) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let load = move |filter: ReportFilter| {
        let api = api.clone();
        let auth = auth.clone();
        let router = router.clone();
        set_loading.set(true);
        set_error_msg.set(None);
        spawn_local(async move {
            let (invoices, by_method) = futures::join!(
                api.invoice_summary(filter),
                api.payment_summary(filter)
            );
            match (invoices, by_method) {
                (Ok(s), Ok(p)) => {
                    log::debug!(
                        "[Reports] loaded period={} methods={}",
                        s.period,
                        p.len()
                    );
                    set_summary.set(Some(s));
                    set_payments.set(p);
                }
                (Err(e), _) | (_, Err(e)) => {
                    set_error_msg.set(Some(handle_api_error(e, &auth, &router)));
                }
            }
            set_loading.set(false);
        });
    };

    // 默认按月汇总全部数据
    load(ReportFilter::default());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let form = ReportFilterForm {
            start_date: start_date.get_untracked(),
            end_date: end_date.get_untracked(),
            group_by: group_by.get_untracked(),
        };
        match form.validate() {
            Ok(filter) => {
                errors.set(ValidationErrors::default());
                load(filter);
            }
            Err(e) => errors.set(e),
        }
    };

    view! {
        <MainLayout>
            <h1 class="text-2xl font-bold mb-6">"Reports"</h1>

            <form class="flex flex-wrap items-end gap-3 mb-6" on:submit=on_submit novalidate>
                <div class="form-control">
                    <label class="label"><span class="label-text">"From"</span></label>
                    <input
                        type="date"
                        class="input input-bordered input-sm"
                        on:change=move |ev| start_date.set(event_target_value(&ev))
                        prop:value=start_date
                    />
                    <FieldError message=field_message(errors, "start_date") />
                </div>
                <div class="form-control">
                    <label class="label"><span class="label-text">"To"</span></label>
                    <input
                        type="date"
                        class="input input-bordered input-sm"
                        on:change=move |ev| end_date.set(event_target_value(&ev))
                        prop:value=end_date
                    />
                    <FieldError message=field_message(errors, "end_date") />
                </div>
                <div class="form-control">
                    <label class="label"><span class="label-text">"Group by"</span></label>
                    <select
                        class="select select-bordered select-sm"
                        on:change=move |ev| {
                            if let Some(g) = GroupBy::parse(&event_target_value(&ev)) {
                                group_by.set(g);
                            }
                        }
                    >
                        {GroupBy::ALL
                            .into_iter()
                            .map(|g| view! {
                                <option value=g.as_str() selected=move || group_by.get() == g>
                                    {g.as_str()}
                                </option>
                            })
                            .collect_view()}
                    </select>
                </div>
                <button class="btn btn-primary btn-sm" disabled=move || loading.get()>"Apply"</button>
            </form>

            <ErrorAlert message=error_msg.into() />

            <Show when=move || !loading.get() fallback=|| view! { <Spinner /> }>
                {move || summary.get().map(summary_stats)}

                <div class="overflow-x-auto bg-base-100 rounded-box shadow mt-6">
                    <table class="table">
                        <thead>
                            <tr>
                                <th>"Payment method"</th>
                                <th class="text-right">"Payments"</th>
                                <th class="text-right">"Total"</th>
                                <th class="text-right">"Share"</th>
                            </tr>
                        </thead>
                        <tbody>
                            {move || payments.get().into_iter().map(payment_row).collect_view()}
                        </tbody>
                    </table>
                    <Show when=move || payments.with(Vec::is_empty)>
                        <p class="p-6 text-center text-base-content/60">"No payments in this period."</p>
                    </Show>
                </div>
            </Show>
        </MainLayout>
    }
}

fn summary_stats(summary: ReportSummary) -> impl IntoView {
    view! {
        <div class="stats stats-vertical md:stats-horizontal shadow w-full">
            <div class="stat">
                <div class="stat-title">"Invoices"</div>
                <div class="stat-value">{summary.total_invoices}</div>
                <div class="stat-desc">{summary.period}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Invoiced"</div>
                <div class="stat-value text-xl">{format_zar(summary.total_invoice_amount)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Paid"</div>
                <div class="stat-value text-xl text-success">{format_zar(summary.total_paid_amount)}</div>
            </div>
            <div class="stat">
                <div class="stat-title">"Outstanding"</div>
                <div class="stat-value text-xl text-error">{format_zar(summary.total_outstanding)}</div>
            </div>
        </div>
    }
}

fn payment_row(row: PaymentSummary) -> impl IntoView {
    view! {
        <tr>
            <td>{row.payment_method}</td>
            <td class="text-right">{row.count}</td>
            <td class="text-right font-mono">{format_zar(row.total_amount)}</td>
            <td class="text-right">{format!("{:.1}%", row.percentage)}</td>
        </tr>
    }
}
