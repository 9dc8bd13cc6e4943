//! Invoicer 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web`: 浏览器 API 封装与路由引擎
//! - `auth`: 会话状态、登录流程与路由守卫
//! - `api`: 发票、付款与报表接口
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod dashboard;
    mod icons;
    pub mod invoice_detail;
    pub mod invoice_form;
    pub mod invoice_list;
    mod layout;
    pub mod login;
    mod payment_dialog;
    pub mod reports;
    pub mod signup;
}
mod config;
mod error;
mod forms;
mod validation;
mod web;

pub use config::AppConfig;

use crate::api::{AppApi, InvoicerApi};
use crate::auth::{AppAuth, AuthClient, RedirectTarget, RequestAuthenticator, SessionState, TokenStore};
use crate::components::dashboard::DashboardPage;
use crate::components::invoice_detail::InvoiceDetailPage;
use crate::components::invoice_form::InvoiceFormPage;
use crate::components::invoice_list::InvoiceListPage;
use crate::components::login::LoginPage;
use crate::components::reports::ReportsPage;
use crate::components::signup::SignupPage;
use crate::web::{AppRoute, History, Link, Router, RouterOutlet, SharedHttp, Timer};

use leptos::prelude::*;
use std::sync::Arc;

/// 运行环境提供的服务
///
/// 浏览器下由 [`Platform::browser`] 构造。
#[derive(Clone)]
pub struct Platform {
    config: AppConfig,
    store: TokenStore,
    http: SharedHttp,
    history: Arc<dyn History>,
    timer: Arc<dyn Timer>,
}

impl Platform {
    #[cfg(feature = "csr")]
    pub fn browser() -> Self {
        Self {
            config: AppConfig::from_build_env(),
            store: TokenStore::local(),
            http: Arc::new(web::FetchClient),
            history: Arc::new(web::BrowserHistory),
            timer: Arc::new(web::BrowserTimer),
        }
    }
}

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Signup => view! { <SignupPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Invoices => view! { <InvoiceListPage /> }.into_any(),
        AppRoute::InvoiceNew => view! { <InvoiceFormPage /> }.into_any(),
        AppRoute::InvoiceDetail(id) => view! { <InvoiceDetailPage id=id /> }.into_any(),
        AppRoute::Reports => view! { <ReportsPage /> }.into_any(),
        AppRoute::AccessDenied => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-warning">"403"</h1>
                    <p class="text-xl mt-4">"You do not have access to this page."</p>
                    <Link to=AppRoute::Dashboard.to_path() class="btn btn-primary mt-6">
                        "Back to dashboard"
                    </Link>
                </div>
            </div>
        }
        .into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                    <Link to=AppRoute::Dashboard.to_path() class="btn btn-primary mt-6">
                        "Back to dashboard"
                    </Link>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App(platform: Platform) -> impl IntoView {
    let Platform {
        config,
        store,
        http,
        history,
        timer,
    } = platform;

    // 1. 会话状态：从存储恢复
    let session = SessionState::from_store(store.clone());
    let redirect = RedirectTarget::new();
    provide_context(session.clone());

    // 2. 认证客户端
    let auth: AppAuth = AuthClient::new(
        http.clone(),
        config.clone(),
        session.clone(),
        redirect.clone(),
        timer,
    );
    provide_context(auth);

    // 3. 业务接口：请求经过 token 附加层
    let api: AppApi = InvoicerApi::new(RequestAuthenticator::new(http, store, config.clone()), config);
    provide_context(api);

    log::info!(
        "[App] started authenticated={}",
        session.snapshot().is_authenticated()
    );

    view! {
        // 4. 路由器组件：注入会话状态实现守卫
        <Router session=session redirect=redirect history=history>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
