use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::invoice_list::status_badge_class;
use crate::components::layout::{ErrorAlert, MainLayout, Spinner, handle_api_error};
use crate::components::payment_dialog::PaymentDialog;
use crate::web::{AppRoute, Link, use_router};
use invoicer_shared::format::format_zar;
use invoicer_shared::{Invoice, InvoiceId, InvoiceStatus, date};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn InvoiceDetailPage(id: InvoiceId) -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();

    let (invoice, set_invoice) = signal(Option::<Invoice>::None);
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let show_payment = RwSignal::new(false);
    // 每次递增触发重新加载
    let reload = RwSignal::new(0_u32);

    Effect::new(move |_| {
        reload.track();
        let api = api.clone();
        let auth = auth.clone();
        let router = router.clone();
        let id = id.clone();
        set_loading.set(true);
        spawn_local(async move {
            match api.get_invoice(&id).await {
                Ok(data) => {
                    set_invoice.set(Some(data));
                    set_error_msg.set(None);
                }
                Err(e) => set_error_msg.set(Some(handle_api_error(e, &auth, &router))),
            }
            set_loading.set(false);
        });
    });

    let on_close = Callback::new(move |_| show_payment.set(false));
    let on_recorded = Callback::new(move |_| {
        show_payment.set(false);
        reload.update(|n| *n += 1);
    });

    view! {
        <MainLayout>
            <div class="max-w-3xl mx-auto">
                <Link to=AppRoute::Invoices.to_path() class="link link-hover text-sm">"← Back to invoices"</Link>

                <ErrorAlert message=error_msg.into() />

                <Show when=move || !loading.get() || invoice.with(Option::is_some) fallback=|| view! { <Spinner /> }>
                    {move || invoice.get().map(|inv| invoice_card(inv, show_payment))}
                </Show>

                <Show when=move || show_payment.get()>
                    {move || invoice.get().map(|inv| view! {
                        <PaymentDialog invoice=inv on_close=on_close on_recorded=on_recorded />
                    })}
                </Show>
            </div>
        </MainLayout>
    }
}

fn invoice_card(invoice: Invoice, show_payment: RwSignal<bool>) -> impl IntoView {
    let today = date::today();
    let payable = invoice.status != InvoiceStatus::Paid;
    let overdue_days = invoice
        .is_overdue(today)
        .then(|| invoice.days_overdue(today));

    view! {
        <div class="card bg-base-100 shadow mt-4">
            <div class="card-body">
                <div class="flex items-start justify-between">
                    <div>
                        <h1 class="card-title text-2xl">{invoice.customer_name.clone()}</h1>
                        <p class="text-base-content/70">{invoice.customer_email.clone()}</p>
                    </div>
                    <span class=status_badge_class(invoice.status)>{invoice.status.label()}</span>
                </div>

                <div class="stats stats-vertical md:stats-horizontal mt-4">
                    <div class="stat">
                        <div class="stat-title">"Amount"</div>
                        <div class="stat-value text-2xl">{format_zar(invoice.amount)}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Issued"</div>
                        <div class="stat-value text-lg">{date::format_short(invoice.issue_date)}</div>
                    </div>
                    <div class="stat">
                        <div class="stat-title">"Due"</div>
                        <div class="stat-value text-lg">{date::format_short(invoice.due_date)}</div>
                        {overdue_days.map(|days| view! {
                            <div class="stat-desc text-error">{format!("{} days overdue", days)}</div>
                        })}
                    </div>
                </div>

                <p class="mt-4 whitespace-pre-line">{invoice.description.clone()}</p>

                <div class="card-actions justify-end mt-4">
                    <Show when=move || payable>
                        <button class="btn btn-primary" on:click=move |_| show_payment.set(true)>
                            "Record payment"
                        </button>
                    </Show>
                </div>
            </div>
        </div>
    }
}
