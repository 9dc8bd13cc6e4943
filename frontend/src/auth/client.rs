//! 认证客户端
//!
//! 登录/注册/注销流程：
//! 1. 发送凭据，非 2xx 按状态码映射为 `AuthError`
//! 2. 成功后经 `SessionState` 持久化并发布状态
//! 3. 等待会话状态可见（有上限，超时仅告警）
//! 4. 跳转到记下的目标页面或默认页面
//!
//! 并发的多次尝试以最后一次为准，过期的响应被丢弃，不写任何状态。

use super::redirect::{RedirectTarget, resolve_post_auth_target};
use super::session::{Session, SessionState};
use crate::config::AppConfig;
use crate::error::AuthError;
use crate::web::http::{HttpClient, HttpRequest};
use crate::web::{AppRoute, Timer};
use invoicer_shared::protocol::ApiRequest;
use invoicer_shared::{AuthResponse, Credentials, SignUpRequest, UserRecord};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// 导航抽象，由路由服务实现
pub trait Navigator {
    /// 跳转到站内地址
    fn navigate(&self, url: &str);

    /// 当前地址（含查询串）
    fn current_url(&self) -> String;
}

pub struct AuthClient<C> {
    http: C,
    config: AppConfig,
    session: SessionState,
    redirect: RedirectTarget,
    timer: Arc<dyn Timer>,
    attempts: Arc<AtomicUsize>,
}

impl<C: Clone> Clone for AuthClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            session: self.session.clone(),
            redirect: self.redirect.clone(),
            timer: self.timer.clone(),
            attempts: self.attempts.clone(),
        }
    }
}

impl<C: HttpClient> AuthClient<C> {
    pub fn new(
        http: C,
        config: AppConfig,
        session: SessionState,
        redirect: RedirectTarget,
        timer: Arc<dyn Timer>,
    ) -> Self {
        Self {
            http,
            config,
            session,
            redirect,
            timer,
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn redirect_target(&self) -> &RedirectTarget {
        &self.redirect
    }

    pub async fn login(
        &self,
        credentials: Credentials,
        navigator: &dyn Navigator,
    ) -> Result<UserRecord, AuthError> {
        let username = credentials.username.clone();
        self.authenticate("login", &credentials, &username, navigator)
            .await
    }

    pub async fn sign_up(
        &self,
        request: SignUpRequest,
        navigator: &dyn Navigator,
    ) -> Result<UserRecord, AuthError> {
        let username = request.username.clone();
        self.authenticate("signup", &request, &username, navigator)
            .await
    }

    /// 清除会话与跳转目标，回到登录页
    pub fn logout(&self, navigator: &dyn Navigator) {
        // 进行中的登录响应一律作废
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.session.clear();
        self.redirect.clear();
        log::info!("[AuthClient] logged out");
        navigator.navigate(&AppRoute::auth_failure_redirect().to_path());
    }

    async fn authenticate<R>(
        &self,
        operation: &'static str,
        request: &R,
        username: &str,
        navigator: &dyn Navigator,
    ) -> Result<UserRecord, AuthError>
    where
        R: ApiRequest<Response = AuthResponse>,
    {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!(
            "[AuthClient] {} started username={} attempt={}",
            operation,
            username,
            attempt
        );

        let result = self.exchange(request).await;

        if self.attempts.load(Ordering::SeqCst) != attempt {
            log::warn!(
                "[AuthClient] {} attempt={} superseded, response discarded",
                operation,
                attempt
            );
            return Err(AuthError::Superseded);
        }

        let parts = result.and_then(|resp| {
            resp.into_parts().ok_or_else(|| {
                AuthError::MalformedResponse("response lacks token or user".to_string())
            })
        });

        let (token, user) = match parts {
            Ok(parts) => parts,
            Err(e) => {
                log::warn!(
                    "[AuthClient] {} failed username={} error={}",
                    operation,
                    username,
                    e
                );
                self.discard_partial_state();
                return Err(e);
            }
        };

        if !self.session.establish(&token, user.clone()) {
            return Err(AuthError::StorageUnavailable);
        }

        let timeout = self.config.state_sync_timeout();
        if let Err(e) = self
            .session
            .wait_until(Session::is_authenticated, self.timer.as_ref(), timeout)
            .await
        {
            log::warn!(
                "[AuthClient] {} session not visible after {:?}: {}, navigating anyway",
                operation,
                timeout,
                e
            );
        }

        let target = resolve_post_auth_target(&self.redirect, &navigator.current_url());
        log::info!(
            "[AuthClient] {} succeeded username={} target={}",
            operation,
            user.username,
            target
        );
        navigator.navigate(&target);
        Ok(user)
    }

    async fn exchange<R>(&self, request: &R) -> Result<AuthResponse, AuthError>
    where
        R: ApiRequest<Response = AuthResponse>,
    {
        let url = self.config.url(&request.path());
        let body = serde_json::to_string(request)
            .map_err(|e| AuthError::MalformedResponse(format!("encode request: {}", e)))?;

        let req = HttpRequest::new(&url, R::METHOD)
            .with_header("Accept", "application/json")
            .with_json_body(body);

        let resp = self.http.send(req).await?;
        if !resp.ok() {
            log::debug!(
                "[AuthClient] {} returned status={} message={:?}",
                url,
                resp.status,
                resp.error_message()
            );
            return Err(AuthError::from_status(resp.status));
        }

        resp.json::<AuthResponse>()
            .map_err(|e| AuthError::MalformedResponse(e.to_string()))
    }

    /// 失败时不写入任何状态，只清掉可能残留的半截凭据
    fn discard_partial_state(&self) {
        if !self.session.snapshot().is_authenticated() {
            self.session.reconcile();
        }
    }
}
