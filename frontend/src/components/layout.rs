//! 页面骨架与通用 UI 片段

use crate::auth::{AppAuth, use_auth, use_session};
use crate::components::icons::{AlertIcon, LogoutIcon, ReceiptIcon};
use crate::error::{ApiError, AppError};
use crate::validation::ValidationErrors;
use crate::web::{AppRoute, Link, RouterService, use_router};
use leptos::prelude::*;

/// 将 API 错误转为提示文案；401 时注销并回到登录页
pub fn handle_api_error(err: ApiError, auth: &AppAuth, router: &RouterService) -> String {
    let err = AppError::from(err);
    if err.is_unauthorized() {
        log::warn!("[Layout] request rejected with 401, signing out");
        auth.logout(router);
    }
    err.user_message()
}

/// 某字段的校验错误信号
pub fn field_message(
    errors: RwSignal<ValidationErrors>,
    field: &'static str,
) -> Signal<Option<String>> {
    Signal::derive(move || errors.with(|e| e.field(field).map(str::to_string)))
}

/// 已登录页面的外框：顶部导航 + 内容区
#[component]
pub fn MainLayout(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let user = use_session().current_user_signal();

    let on_logout = move |_| auth.logout(&router);

    let nav_items = [
        (AppRoute::Dashboard, "Overdue"),
        (AppRoute::Invoices, "Invoices"),
        (AppRoute::InvoiceNew, "New Invoice"),
        (AppRoute::Reports, "Reports"),
    ];

    view! {
        <div class="min-h-screen bg-base-200">
            <div class="navbar bg-base-100 shadow-sm px-4">
                <div class="flex-1 gap-2">
                    <span class="text-primary"><ReceiptIcon /></span>
                    <span class="text-xl font-bold">"Invoicer"</span>
                    <ul class="menu menu-horizontal px-1 ml-4">
                        {nav_items
                            .into_iter()
                            .map(|(route, label)| {
                                view! {
                                    <li>
                                        <Link to=route.to_path()>{label}</Link>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </div>
                <div class="flex-none gap-3">
                    <span class="text-sm text-base-content/70">
                        {move || user.get().map(|u| u.username).unwrap_or_default()}
                    </span>
                    <button class="btn btn-ghost btn-sm" on:click=on_logout>
                        <LogoutIcon />
                        "Sign out"
                    </button>
                </div>
            </div>
            <main class="container mx-auto p-6">{children()}</main>
        </div>
    }
}

/// 错误提示条
#[component]
pub fn ErrorAlert(message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <div role="alert" class="alert alert-error text-sm py-2 mb-4">
                <AlertIcon />
                <span>{move || message.get().unwrap_or_default()}</span>
            </div>
        </Show>
    }
}

/// 加载中占位
#[component]
pub fn Spinner() -> impl IntoView {
    view! {
        <div class="flex justify-center py-12">
            <span class="loading loading-spinner loading-lg text-primary"></span>
        </div>
    }
}

/// 字段级错误文案
#[component]
pub fn FieldError(message: Signal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || message.get().is_some()>
            <span class="label-text-alt text-error">
                {move || message.get().unwrap_or_default()}
            </span>
        </Show>
    }
}
