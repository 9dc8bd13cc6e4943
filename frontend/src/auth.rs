//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦：
//! - `TokenStore`: 凭据持久化
//! - `SessionState`: 唯一的认证状态来源，异步可等待
//! - `AuthClient`: 登录/注册/注销流程
//! - `guard`: 路由守卫的纯函数
//! - `RequestAuthenticator`: 为业务请求附加 Bearer token

mod client;
pub mod guard;
mod interceptor;
mod redirect;
mod session;
mod token_store;

pub use client::{AuthClient, Navigator};
pub use interceptor::RequestAuthenticator;
pub use redirect::{
    RETURN_URL_PARAM, RedirectTarget, login_url_with_return, resolve_post_auth_target,
    return_url_from_query, sanitize_return_url,
};
pub use session::{AuthStatus, Session, SessionState, WaitTimeout};
pub use token_store::TokenStore;

use crate::web::SharedHttp;
use leptos::prelude::*;

/// 应用中使用的认证客户端
pub type AppAuth = AuthClient<SharedHttp>;

/// 从 Context 获取认证客户端
pub fn use_auth() -> AppAuth {
    use_context::<AppAuth>().expect("AuthClient should be provided")
}

/// 从 Context 获取会话状态
pub fn use_session() -> SessionState {
    use_context::<SessionState>().expect("SessionState should be provided")
}
