use crate::auth::use_auth;
use crate::components::icons::ReceiptIcon;
use crate::components::layout::{ErrorAlert, FieldError, field_message};
use crate::error::{AppError, AuthError};
use invoicer_shared::UserRecord;
use crate::forms::LoginForm;
use crate::validation::ValidationErrors;
use crate::web::{AppRoute, Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 登录/注册结束后需要留在表单上显示的错误
///
/// 成功时页面已跳转离开，被取代时由更新的尝试接管表单，两者都返回 `None`。
pub(crate) fn failure_message(result: Result<UserRecord, AuthError>) -> Option<String> {
    match result {
        Ok(_) | Err(AuthError::Superseded) => None,
        Err(e) => Some(AppError::from(e).user_message()),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(ValidationErrors::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let form = LoginForm {
            username: username.get_untracked(),
            password: password.get_untracked(),
        };
        let credentials = match form.validate() {
            Ok(credentials) => credentials,
            Err(e) => {
                errors.set(e);
                return;
            }
        };

        errors.set(ValidationErrors::default());
        set_error_msg.set(None);
        set_is_submitting.set(true);

        let auth = auth.clone();
        let router = router.clone();
        spawn_local(async move {
            if let Some(message) = failure_message(auth.login(credentials, &router).await) {
                set_error_msg.set(Some(message));
                set_is_submitting.set(false);
            }
        });
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="text-center mb-4">
                    <div class="flex flex-col items-center gap-2">
                        <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                            <ReceiptIcon />
                        </div>
                        <h1 class="text-3xl font-bold">"Invoicer"</h1>
                        <p class="text-base-content/70">"Sign in to manage your invoices"</p>
                    </div>
                </div>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit novalidate>
                        <ErrorAlert message=error_msg.into() />

                        <div class="form-control">
                            <label class="label" for="username">
                                <span class="label-text">"Username"</span>
                            </label>
                            <input
                                id="username"
                                type="text"
                                autocomplete="username"
                                on:input=move |ev| username.set(event_target_value(&ev))
                                prop:value=username
                                class="input input-bordered"
                            />
                            <FieldError message=field_message(errors, "username") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="current-password"
                                placeholder="••••••••"
                                on:input=move |ev| password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                            />
                            <FieldError message=field_message(errors, "password") />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Signing in..." }.into_any()
                                } else {
                                    "Sign in".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "No account yet? "
                            <Link to=AppRoute::Signup.to_path() class="link link-primary">"Create one"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
