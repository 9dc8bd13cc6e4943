use crate::auth::use_auth;
use crate::components::icons::ReceiptIcon;
use crate::components::layout::{ErrorAlert, FieldError, field_message};
use crate::components::login::failure_message;
use crate::forms::SignUpForm;
use crate::validation::ValidationErrors;
use crate::web::{AppRoute, Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 注册成功后直接登录
#[component]
pub fn SignupPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let errors = RwSignal::new(ValidationErrors::default());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();

        let form = SignUpForm {
            username: username.get_untracked(),
            email: email.get_untracked(),
            password: password.get_untracked(),
        };
        let request = match form.validate() {
            Ok(request) => request,
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
            if let Some(message) = failure_message(auth.sign_up(request, &router).await) {
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
                        <h1 class="text-3xl font-bold">"Create an account"</h1>
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
                            <label class="label" for="email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input
                                id="email"
                                type="email"
                                autocomplete="email"
                                on:input=move |ev| email.set(event_target_value(&ev))
                                prop:value=email
                                class="input input-bordered"
                            />
                            <FieldError message=field_message(errors, "email") />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"Password"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                autocomplete="new-password"
                                on:input=move |ev| password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                            />
                            <FieldError message=field_message(errors, "password") />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "Creating account..." }.into_any()
                                } else {
                                    "Sign up".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "Already registered? "
                            <Link to=AppRoute::Login.to_path() class="link link-primary">"Sign in"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>
    }
}
