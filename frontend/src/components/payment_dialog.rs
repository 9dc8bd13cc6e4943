//! 付款对话框
//!
//! 校验通过后提交付款，成功时通知父组件刷新发票。

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::layout::{ErrorAlert, FieldError, field_message, handle_api_error};
use crate::forms::PaymentForm;
use crate::validation::ValidationErrors;
use crate::web::use_router;
use invoicer_shared::format::format_zar;
use invoicer_shared::{Invoice, InvoiceId, PaymentMethod, date};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn PaymentDialog(
    invoice: Invoice,
    /// 关闭对话框
    on_close: Callback<()>,
    /// 付款记录成功
    on_recorded: Callback<()>,
) -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();

    let initial = PaymentForm::for_invoice(invoice.amount, date::today());
    let amount = RwSignal::new(initial.amount);
    let payment_date = RwSignal::new(initial.payment_date);
    let payment_method = RwSignal::new(initial.payment_method);
    let notes = RwSignal::new(initial.notes);
    let errors = RwSignal::new(ValidationErrors::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let invoice_id = invoice.id.clone().unwrap_or_else(|| InvoiceId::new(""));

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let form = PaymentForm {
            amount: amount.get_untracked(),
            payment_date: payment_date.get_untracked(),
            payment_method: payment_method.get_untracked(),
            notes: notes.get_untracked(),
        };
        let payment = match form.validate(&invoice_id) {
            Ok(payment) => payment,
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        errors.set(ValidationErrors::default());
        set_error_msg.set(None);
        set_is_submitting.set(true);

        let api = api.clone();
        let auth = auth.clone();
        let router = router.clone();
        spawn_local(async move {
            match api.record_payment(&payment).await {
                Ok(()) => {
                    log::info!(
                        "[PaymentDialog] recorded payment invoice={} amount={}",
                        payment.invoice_id,
                        payment.amount
                    );
                    on_recorded.run(());
                }
                Err(e) => set_error_msg.set(Some(handle_api_error(e, &auth, &router))),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="modal modal-open">
            <div class="modal-box">
                <h3 class="font-bold text-lg">"Record payment"</h3>
                <p class="text-sm text-base-content/70 mb-4">
                    {format!("{} · {}", invoice.customer_name, format_zar(invoice.amount))}
                </p>

                <form on:submit=on_submit novalidate class="flex flex-col gap-2">
                    <ErrorAlert message=error_msg.into() />

                    <div class="form-control">
                        <label class="label"><span class="label-text">"Amount (ZAR)"</span></label>
                        <input
                            type="number"
                            step="0.01"
                            min="0.01"
                            class="input input-bordered"
                            on:input=move |ev| amount.set(event_target_value(&ev))
                            prop:value=amount
                        />
                        <FieldError message=field_message(errors, "amount") />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Payment date"</span></label>
                        <input
                            type="date"
                            class="input input-bordered"
                            on:change=move |ev| payment_date.set(event_target_value(&ev))
                            prop:value=payment_date
                        />
                        <FieldError message=field_message(errors, "payment_date") />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Method"</span></label>
                        <select
                            class="select select-bordered"
                            on:change=move |ev| {
                                if let Some(method) = PaymentMethod::parse(&event_target_value(&ev)) {
                                    payment_method.set(method);
                                }
                            }
                        >
                            {PaymentMethod::SELECTABLE
                                .into_iter()
                                .map(|m| view! {
                                    <option value=m.as_str() selected=move || payment_method.get() == m>
                                        {m.label()}
                                    </option>
                                })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Notes"</span></label>
                        <textarea
                            class="textarea textarea-bordered"
                            on:input=move |ev| notes.set(event_target_value(&ev))
                            prop:value=notes
                        ></textarea>
                    </div>

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| on_close.run(())>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || is_submitting.get()>
                            {move || if is_submitting.get() { "Saving..." } else { "Record payment" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
