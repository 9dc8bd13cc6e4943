//! 路由服务模块 - 核心引擎
//!
//! 实现了"请求 -> 守卫 -> 处理 -> 加载"的导航流程：
//! - 守卫规则来自 `auth::guard`，路由服务只负责执行其决定
//! - 重定向有深度上限，避免守卫之间互相跳转
//! - 会话未恢复时延后导航，恢复后重新评估

use leptos::prelude::*;
use std::sync::Arc;

use super::history::{History, HistoryMode};
use super::route::AppRoute;
use crate::auth::guard::{self, GuardDecision};
use crate::auth::{Navigator, RedirectTarget, Session, SessionState};

/// 单次导航允许的最大重定向次数
const MAX_REDIRECTS: usize = 4;

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
#[derive(Clone)]
pub struct RouterService {
    /// 当前路由
    current_route: ArcRwSignal<AppRoute>,
    /// 当前地址（含查询串）
    current_url: ArcRwSignal<String>,
    session: SessionState,
    redirect: RedirectTarget,
    history: Arc<dyn History>,
}

impl RouterService {
    /// 创建路由服务，并以当前地址完成第一次导航
    pub fn new(session: SessionState, redirect: RedirectTarget, history: Arc<dyn History>) -> Self {
        let url = history.current_url();
        let router = Self {
            current_route: ArcRwSignal::new(AppRoute::from_path(&url)),
            current_url: ArcRwSignal::new(url.clone()),
            session,
            redirect,
            history,
        };
        router.navigate_with(&url, HistoryMode::Replace, 0);
        router
    }

    /// 当前路由（追踪读取）
    pub fn current_route(&self) -> AppRoute {
        self.current_route.get()
    }

    pub fn current_route_untracked(&self) -> AppRoute {
        self.current_route.get_untracked()
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, url: &str) {
        self.navigate_with(url, HistoryMode::Push, 0);
    }

    /// 浏览器后退/前进后，按新地址重新执行守卫
    pub fn sync_from_history(&self) {
        let url = self.history.current_url();
        self.navigate_with(&url, HistoryMode::Replace, 0);
    }

    fn navigate_with(&self, url: &str, mode: HistoryMode, depth: usize) {
        if depth > MAX_REDIRECTS {
            log::error!("[Router] too many redirects, stopping at {}", url);
            return;
        }

        let route = AppRoute::from_path(url);
        // 每次导航都按存储重新核对，其他标签页可能已注销
        let session = self.session.current();

        match guard::evaluate(&session, &route, url, &self.redirect) {
            GuardDecision::Allow => self.load(url, route, mode),
            GuardDecision::Redirect(target) => {
                log::info!("[Router] {} redirected to {}", url, target);
                self.navigate_with(&target, mode, depth + 1);
            }
            GuardDecision::Wait => self.defer(url.to_string(), mode, depth),
        }
    }

    /// 验证通过：写入 History 并更新 UI
    fn load(&self, url: &str, route: AppRoute, mode: HistoryMode) {
        // 初次加载时地址已在 History 中
        if self.history.current_url() != url {
            mode.apply(self.history.as_ref(), url);
        }
        log::debug!("[Router] loaded route={} url={}", route, url);
        self.current_url.set(url.to_string());
        self.current_route.set(route);
    }

    /// 会话尚未恢复，等待后重试
    fn defer(&self, url: String, mode: HistoryMode, depth: usize) {
        log::debug!("[Router] session unresolved, deferring {}", url);
        let router = self.clone();
        leptos::task::spawn_local(async move { router.resume(url, mode, depth).await });
    }

    async fn resume(&self, url: String, mode: HistoryMode, depth: usize) {
        self.session.resolved().await;
        self.navigate_with(&url, mode, depth);
    }

    /// 登出时若停留在受保护页面，跳回登录页
    fn setup_auth_redirect(&self) {
        let router = self.clone();

        Effect::new(move |_| {
            let session = router.session.watch();
            router.on_session_changed(&session);
        });
    }

    fn on_session_changed(&self, session: &Session) {
        let route = self.current_route.get_untracked();

        if session.is_resolved() && !session.is_authenticated() && route.requires_auth() {
            log::info!("[Router] session ended on {}, redirecting to login", route);
            self.navigate_with(
                &AppRoute::auth_failure_redirect().to_path(),
                HistoryMode::Push,
                0,
            );
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    #[cfg(feature = "csr")]
    fn init_popstate_listener(&self) {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::Closure;

        let router = self.clone();
        let closure = Closure::<dyn Fn()>::new(move || router.sync_from_history());

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    #[cfg(not(feature = "csr"))]
    fn init_popstate_listener(&self) {}
}

impl Navigator for RouterService {
    fn navigate(&self, url: &str) {
        RouterService::navigate(self, url);
    }

    fn current_url(&self) -> String {
        self.current_url.get_untracked()
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(
    session: SessionState,
    redirect: RedirectTarget,
    history: Arc<dyn History>,
) -> RouterService {
    let router = RouterService::new(session, redirect, history);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router.clone());
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    session: SessionState,
    redirect: RedirectTarget,
    history: Arc<dyn History>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(session, redirect, history);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || matcher(router.current_route())
}

/// 站内链接，点击时走路由服务而不是整页刷新
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    #[prop(optional, into)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: leptos::ev::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenStore;
    use crate::web::history::MemoryHistory;
    use crate::web::{KeyValueStorage, MemoryStorage};
    use any_spawner::Executor;
    use invoicer_shared::UserRecord;

    fn signed_in(roles: &[&str]) -> SessionState {
        let store = TokenStore::in_memory();
        store.save(
            "T",
            &UserRecord::new(2, "erin", "erin@example.com", roles.iter().copied()),
        );
        SessionState::from_store(store)
    }

    fn router_at(session: SessionState, url: &str) -> (RouterService, Arc<MemoryHistory>) {
        let history = Arc::new(MemoryHistory::new(url));
        let router = RouterService::new(session, RedirectTarget::new(), history.clone());
        (router, history)
    }

    #[test]
    fn test_initial_protected_url_redirects_to_login() {
        let session = SessionState::from_store(TokenStore::in_memory());
        let (router, history) = router_at(session, "/invoices/3");

        assert_eq!(router.current_route_untracked(), AppRoute::Login);
        assert_eq!(
            history.current_url(),
            "/auth/login?returnUrl=%2Finvoices%2F3"
        );
        assert_eq!(router.redirect.peek().as_deref(), Some("/invoices/3"));
        assert_eq!(history.entries().len(), 1);
    }

    #[test]
    fn test_navigate_pushes_allowed_route() {
        let (router, history) = router_at(signed_in(&["user"]), "/dashboard");

        router.navigate("/invoices");

        assert_eq!(router.current_route_untracked(), AppRoute::Invoices);
        assert_eq!(history.entries(), vec!["/dashboard", "/invoices"]);
        assert_eq!(Navigator::current_url(&router), "/invoices");
    }

    #[test]
    fn test_authenticated_user_leaves_login() {
        let (router, history) = router_at(signed_in(&["user"]), "/dashboard");

        router.navigate("/auth/login");

        assert_eq!(router.current_route_untracked(), AppRoute::Dashboard);
        assert_eq!(history.current_url(), "/dashboard");
    }

    #[test]
    fn test_missing_role_goes_to_access_denied() {
        let (router, _) = router_at(signed_in(&["viewer"]), "/dashboard");

        router.navigate("/reports");

        assert_eq!(router.current_route_untracked(), AppRoute::AccessDenied);
    }

    #[test]
    fn test_back_navigation_is_guarded() {
        let session = signed_in(&["user"]);
        let (router, history) = router_at(session.clone(), "/invoices");

        session.clear();
        history.push("/invoices/9");
        router.sync_from_history();

        assert_eq!(router.current_route_untracked(), AppRoute::Login);
        assert_eq!(router.redirect.peek().as_deref(), Some("/invoices/9"));
    }

    #[test]
    fn test_unknown_path_renders_not_found() {
        let (router, history) = router_at(signed_in(&["user"]), "/dashboard");

        router.navigate("/nope");

        assert_eq!(router.current_route_untracked(), AppRoute::NotFound);
        assert_eq!(history.current_url(), "/nope");
    }

    #[test]
    fn test_credentials_removed_elsewhere_are_noticed_on_navigation() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionState::from_store(TokenStore::new(storage.clone()));
        session.establish(
            "T",
            UserRecord::new(3, "finn", "finn@example.com", ["user"]),
        );
        let (router, _) = router_at(session.clone(), "/dashboard");

        // 另一个标签页注销
        storage.delete("auth_token");
        storage.delete("user");
        router.navigate("/invoices");

        assert_eq!(router.current_route_untracked(), AppRoute::Login);
        assert!(!session.snapshot().is_authenticated());
        assert_eq!(router.redirect.peek().as_deref(), Some("/invoices"));
    }

    #[test]
    fn test_navigation_waits_for_session_restore() {
        let _ = Executor::init_futures_executor();

        let store = TokenStore::in_memory();
        store.save(
            "T",
            &UserRecord::new(4, "gus", "gus@example.com", ["user"]),
        );
        let session = SessionState::new(store);
        let (router, history) = router_at(session.clone(), "/invoices");

        Executor::poll_local();
        assert_eq!(router.current_route_untracked(), AppRoute::Invoices);
        assert_eq!(history.entries(), vec!["/invoices"]);

        session.restore();
        Executor::poll_local();

        assert_eq!(router.current_route_untracked(), AppRoute::Invoices);
        assert_eq!(history.current_url(), "/invoices");
    }

    #[test]
    fn test_unresolved_protected_route_falls_back_to_login() {
        let _ = Executor::init_futures_executor();

        let session = SessionState::new(TokenStore::in_memory());
        let (router, history) = router_at(session.clone(), "/reports");

        session.restore();
        Executor::poll_local();

        assert_eq!(router.current_route_untracked(), AppRoute::Login);
        assert_eq!(history.current_url(), "/auth/login?returnUrl=%2Freports");
    }

    #[test]
    fn test_session_end_on_protected_route_returns_to_login() {
        let session = signed_in(&["user"]);
        let (router, history) = router_at(session.clone(), "/invoices");

        session.clear();
        router.on_session_changed(&session.snapshot());

        assert_eq!(router.current_route_untracked(), AppRoute::Login);
        assert_eq!(history.current_url(), "/auth/login");
    }

    #[test]
    fn test_session_end_on_open_route_stays() {
        let session = signed_in(&["user"]);
        let (router, _) = router_at(session.clone(), "/access-denied");

        session.clear();
        router.on_session_changed(&session.snapshot());

        assert_eq!(router.current_route_untracked(), AppRoute::AccessDenied);
    }
}
