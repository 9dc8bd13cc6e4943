//! 登录后跳转目标
//!
//! 守卫拦截受保护页面时记下原地址，登录成功后取出并清空。
//! 只接受站内相对路径，防止开放重定向。

use crate::web::AppRoute;
use std::sync::{Arc, Mutex, PoisonError};
use url::form_urlencoded;

/// 登录页查询参数名
pub const RETURN_URL_PARAM: &str = "returnUrl";

/// 单槽位的跳转目标，克隆后共享同一槽位
#[derive(Debug, Clone, Default)]
pub struct RedirectTarget {
    slot: Arc<Mutex<Option<String>>>,
}

impl RedirectTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录跳转目标；不合法的地址被忽略并返回 `false`
    pub fn set(&self, url: &str) -> bool {
        match sanitize_return_url(url) {
            Some(url) => {
                log::debug!("[Redirect] remembered target={}", url);
                *self.lock() = Some(url);
                true
            }
            None => {
                log::warn!("[Redirect] rejected target={}", url);
                false
            }
        }
    }

    pub fn peek(&self) -> Option<String> {
        self.lock().clone()
    }

    /// 取出并清空
    pub fn take(&self) -> Option<String> {
        self.lock().take()
    }

    pub fn clear(&self) {
        self.lock().take();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 校验站内相对路径
///
/// 拒绝：外部地址、协议相对地址 (`//host`)、认证页面本身、嵌套的 `returnUrl`。
pub fn sanitize_return_url(url: &str) -> Option<String> {
    let url = url.trim();
    if !url.starts_with('/') || url.starts_with("//") || url.starts_with("/\\") {
        return None;
    }
    if url.contains(&format!("{}=", RETURN_URL_PARAM)) {
        return None;
    }
    if AppRoute::from_path(url).is_public_only() {
        return None;
    }
    Some(url.to_string())
}

/// 从当前地址的查询串中读取合法的 `returnUrl`
pub fn return_url_from_query(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == RETURN_URL_PARAM)
        .and_then(|(_, value)| sanitize_return_url(&value))
}

/// 构造带 `returnUrl` 的登录地址
pub fn login_url_with_return(return_url: &str) -> String {
    let login = AppRoute::Login.to_path();
    match sanitize_return_url(return_url) {
        Some(target) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(RETURN_URL_PARAM, &target)
                .finish();
            format!("{}?{}", login, query)
        }
        None => login,
    }
}

/// 认证成功后的落地页
///
/// 优先级：内存中的目标 > 当前地址的 `returnUrl` > 默认页面。
pub fn resolve_post_auth_target(target: &RedirectTarget, current_url: &str) -> String {
    target
        .take()
        .or_else(|| return_url_from_query(current_url))
        .unwrap_or_else(|| AppRoute::auth_success_redirect().to_path())
}
