use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::layout::{ErrorAlert, FieldError, MainLayout, field_message, handle_api_error};
use crate::forms::InvoiceForm;
use crate::validation::ValidationErrors;
use crate::web::{AppRoute, Link, use_router};
use invoicer_shared::{InvoiceStatus, date};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 表单状态结构体
///
/// 使用 `RwSignal` 因为它实现了 `Copy` trait，适合在闭包之间传递。
#[derive(Clone, Copy)]
struct InvoiceFormState {
    customer_name: RwSignal<String>,
    customer_email: RwSignal<String>,
    issue_date: RwSignal<String>,
    due_date: RwSignal<String>,
    description: RwSignal<String>,
    amount: RwSignal<String>,
    status: RwSignal<InvoiceStatus>,
}

impl InvoiceFormState {
    fn new(initial: InvoiceForm) -> Self {
        Self {
            customer_name: RwSignal::new(initial.customer_name),
            customer_email: RwSignal::new(initial.customer_email),
            issue_date: RwSignal::new(initial.issue_date),
            due_date: RwSignal::new(initial.due_date),
            description: RwSignal::new(initial.description),
            amount: RwSignal::new(initial.amount),
            status: RwSignal::new(initial.status),
        }
    }

    fn snapshot(&self) -> InvoiceForm {
        InvoiceForm {
            customer_name: self.customer_name.get_untracked(),
            customer_email: self.customer_email.get_untracked(),
            issue_date: self.issue_date.get_untracked(),
            due_date: self.due_date.get_untracked(),
            description: self.description.get_untracked(),
            amount: self.amount.get_untracked(),
            status: self.status.get_untracked(),
        }
    }

    /// 修改开票日期时，按默认账期重新计算到期日
    fn on_issue_date_changed(&self, value: String) {
        if let Some(issue) = date::parse_input(&value) {
            self.due_date
                .set(date::to_input_value(date::default_due_date(issue)));
        }
        self.issue_date.set(value);
    }
}

#[component]
pub fn InvoiceFormPage() -> impl IntoView {
    let api = use_api();
    let auth = use_auth();
    let router = use_router();

    let form = InvoiceFormState::new(InvoiceForm::starting(date::today()));
    let errors = RwSignal::new(ValidationErrors::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let request = match form.snapshot().validate() {
            Ok(request) => request,
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
            match api.create_invoice(&request).await {
                Ok(created) => {
                    log::info!("[InvoiceForm] created invoice id={:?}", created.id);
                    let target = created
                        .id
                        .map(AppRoute::InvoiceDetail)
                        .unwrap_or(AppRoute::Invoices);
                    router.navigate(&target.to_path());
                }
                Err(e) => set_error_msg.set(Some(handle_api_error(e, &auth, &router))),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <MainLayout>
            <div class="max-w-2xl mx-auto">
                <h1 class="text-2xl font-bold mb-6">"New invoice"</h1>
                <div class="card bg-base-100 shadow">
                    <form class="card-body gap-2" on:submit=on_submit novalidate>
                        <ErrorAlert message=error_msg.into() />

                        <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Customer name"</span></label>
                                <input
                                    type="text"
                                    class="input input-bordered"
                                    on:input=move |ev| form.customer_name.set(event_target_value(&ev))
                                    prop:value=form.customer_name
                                />
                                <FieldError message=field_message(errors, "customer_name") />
                            </div>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Customer email"</span></label>
                                <input
                                    type="email"
                                    class="input input-bordered"
                                    on:input=move |ev| form.customer_email.set(event_target_value(&ev))
                                    prop:value=form.customer_email
                                />
                                <FieldError message=field_message(errors, "customer_email") />
                            </div>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Issue date"</span></label>
                                <input
                                    type="date"
                                    class="input input-bordered"
                                    on:change=move |ev| form.on_issue_date_changed(event_target_value(&ev))
                                    prop:value=form.issue_date
                                />
                                <FieldError message=field_message(errors, "issue_date") />
                            </div>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Due date"</span></label>
                                <input
                                    type="date"
                                    class="input input-bordered"
                                    on:change=move |ev| form.due_date.set(event_target_value(&ev))
                                    prop:value=form.due_date
                                />
                                <FieldError message=field_message(errors, "due_date") />
                            </div>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Amount (ZAR)"</span></label>
                                <input
                                    type="number"
                                    step="0.01"
                                    min="0.01"
                                    class="input input-bordered"
                                    on:input=move |ev| form.amount.set(event_target_value(&ev))
                                    prop:value=form.amount
                                />
                                <FieldError message=field_message(errors, "amount") />
                            </div>
                            <div class="form-control">
                                <label class="label"><span class="label-text">"Status"</span></label>
                                <select
                                    class="select select-bordered"
                                    on:change=move |ev| {
                                        if let Some(status) = InvoiceStatus::parse(&event_target_value(&ev)) {
                                            form.status.set(status);
                                        }
                                    }
                                >
                                    {InvoiceStatus::ALL
                                        .into_iter()
                                        .map(|s| view! {
                                            <option value=s.as_str() selected=move || form.status.get() == s>
                                                {s.label()}
                                            </option>
                                        })
                                        .collect_view()}
                                </select>
                            </div>
                        </div>

                        <div class="form-control">
                            <label class="label"><span class="label-text">"Description"</span></label>
                            <textarea
                                class="textarea textarea-bordered h-24"
                                maxlength="500"
                                on:input=move |ev| form.description.set(event_target_value(&ev))
                                prop:value=form.description
                            ></textarea>
                            <FieldError message=field_message(errors, "description") />
                        </div>

                        <div class="card-actions justify-end mt-4">
                            <Link to=AppRoute::Invoices.to_path() class="btn btn-ghost">"Cancel"</Link>
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() { "Saving..." } else { "Create invoice" }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </MainLayout>
    }
}
