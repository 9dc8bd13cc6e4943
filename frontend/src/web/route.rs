//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由及其访问规则。

use invoicer_shared::InvoiceId;
use std::fmt::Display;

/// 路由访问规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// 需要登录
    Protected,
    /// 仅限未登录用户（登录、注册）
    PublicOnly,
    /// 任何人都可访问
    Open,
}

/// 报表页面要求的角色（任一即可）
const REPORT_ROLES: &[&str] = &["user", "admin"];

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面
    Login,
    /// 注册页面
    Signup,
    /// 控制面板 (默认路由)
    #[default]
    Dashboard,
    /// 发票列表
    Invoices,
    /// 新建发票
    InvoiceNew,
    /// 发票详情
    InvoiceDetail(InvoiceId),
    /// 报表
    Reports,
    /// 无权访问
    AccessDenied,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL 解析为路由枚举，忽略查询串和片段
    pub fn from_path(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        match path {
            "/" | "/dashboard" => Self::Dashboard,
            "/auth/login" => Self::Login,
            "/auth/signup" => Self::Signup,
            "/invoices" => Self::Invoices,
            "/invoices/new" => Self::InvoiceNew,
            "/reports" => Self::Reports,
            "/access-denied" => Self::AccessDenied,
            _ => match path.strip_prefix("/invoices/") {
                Some(id) if !id.is_empty() && !id.contains('/') => {
                    Self::InvoiceDetail(InvoiceId::new(id))
                }
                _ => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/auth/login".to_string(),
            Self::Signup => "/auth/signup".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Invoices => "/invoices".to_string(),
            Self::InvoiceNew => "/invoices/new".to_string(),
            Self::InvoiceDetail(id) => format!("/invoices/{}", id),
            Self::Reports => "/reports".to_string(),
            Self::AccessDenied => "/access-denied".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫规则：定义该路由的访问方式**
    pub fn access(&self) -> RouteAccess {
        match self {
            Self::Login | Self::Signup => RouteAccess::PublicOnly,
            Self::Dashboard
            | Self::Invoices
            | Self::InvoiceNew
            | Self::InvoiceDetail(_)
            | Self::Reports => RouteAccess::Protected,
            Self::AccessDenied | Self::NotFound => RouteAccess::Open,
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.access() == RouteAccess::Protected
    }

    /// 已认证用户应当离开的路由（登录、注册）
    pub fn is_public_only(&self) -> bool {
        self.access() == RouteAccess::PublicOnly
    }

    /// 访问所需角色，空表示仅需登录
    pub fn required_roles(&self) -> &'static [&'static str] {
        match self {
            Self::Reports => REPORT_ROLES,
            _ => &[],
        }
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}
