//! 路由守卫
//!
//! 纯函数，不触碰 DOM：根据会话状态和目标路由给出放行/重定向/等待的决定，
//! 由路由服务执行。

use super::redirect::{RedirectTarget, login_url_with_return, resolve_post_auth_target};
use super::session::{AuthStatus, Session};
use crate::web::{AppRoute, RouteAccess};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
    /// 会话尚未恢复，稍后重新评估
    Wait,
}

/// 受保护路由
///
/// 未登录时记下 `attempted_url` 并跳转登录页；已登录但缺少角色时跳转无权访问页。
pub fn protected(
    session: &Session,
    required_roles: &[&str],
    attempted_url: &str,
    redirect: &RedirectTarget,
) -> GuardDecision {
    match session.status() {
        AuthStatus::Unknown => GuardDecision::Wait,
        AuthStatus::Unauthenticated => {
            log::info!("[Guard] unauthenticated access to {}", attempted_url);
            redirect.set(attempted_url);
            GuardDecision::Redirect(login_url_with_return(attempted_url))
        }
        AuthStatus::Authenticated => {
            let permitted = session
                .current_user()
                .is_some_and(|user| user.has_any_role(required_roles));
            if permitted {
                GuardDecision::Allow
            } else {
                log::warn!(
                    "[Guard] missing role for {} required={:?}",
                    attempted_url,
                    required_roles
                );
                GuardDecision::Redirect(AppRoute::AccessDenied.to_path())
            }
        }
    }
}

/// 仅限未登录用户的路由（登录、注册）
pub fn public_only(
    session: &Session,
    attempted_url: &str,
    redirect: &RedirectTarget,
) -> GuardDecision {
    match session.status() {
        AuthStatus::Unknown => GuardDecision::Wait,
        AuthStatus::Unauthenticated => GuardDecision::Allow,
        AuthStatus::Authenticated => {
            let target = resolve_post_auth_target(redirect, attempted_url);
            log::info!("[Guard] already authenticated, leaving {}", attempted_url);
            GuardDecision::Redirect(target)
        }
    }
}

/// 按路由的访问规则分派
pub fn evaluate(
    session: &Session,
    route: &AppRoute,
    attempted_url: &str,
    redirect: &RedirectTarget,
) -> GuardDecision {
    match route.access() {
        RouteAccess::Protected => {
            protected(session, route.required_roles(), attempted_url, redirect)
        }
        RouteAccess::PublicOnly => public_only(session, attempted_url, redirect),
        RouteAccess::Open => GuardDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoicer_shared::UserRecord;

    fn signed_in(roles: &[&str]) -> Session {
        Session::authenticated(UserRecord::new(
            3,
            "carol",
            "carol@example.com",
            roles.iter().copied(),
        ))
    }

    #[test]
    fn test_protected_records_attempted_url() {
        let redirect = RedirectTarget::new();
        let decision = protected(&Session::unauthenticated(), &[], "/invoices", &redirect);

        assert_eq!(
            decision,
            GuardDecision::Redirect("/auth/login?returnUrl=%2Finvoices".to_string())
        );
        assert_eq!(redirect.peek().as_deref(), Some("/invoices"));
    }

    #[test]
    fn test_protected_allows_authenticated() {
        let redirect = RedirectTarget::new();
        let decision = protected(&signed_in(&["user"]), &[], "/invoices", &redirect);
        assert_eq!(decision, GuardDecision::Allow);
        assert!(redirect.peek().is_none());
    }

    #[test]
    fn test_protected_waits_while_unknown() {
        let redirect = RedirectTarget::new();
        let decision = protected(&Session::unknown(), &[], "/invoices", &redirect);
        assert_eq!(decision, GuardDecision::Wait);
        assert!(redirect.peek().is_none());
    }

    #[test]
    fn test_role_requirement() {
        let redirect = RedirectTarget::new();
        let route = AppRoute::Reports;

        assert_eq!(
            evaluate(&signed_in(&["admin"]), &route, "/reports", &redirect),
            GuardDecision::Allow
        );
        assert_eq!(
            evaluate(&signed_in(&["auditor"]), &route, "/reports", &redirect),
            GuardDecision::Redirect("/access-denied".to_string())
        );
    }

    #[test]
    fn test_public_only_redirects_authenticated() {
        let redirect = RedirectTarget::new();
        let session = signed_in(&["user"]);

        assert_eq!(
            public_only(&session, "/auth/login", &redirect),
            GuardDecision::Redirect("/dashboard".to_string())
        );

        redirect.set("/invoices/9");
        assert_eq!(
            public_only(&session, "/auth/signup", &redirect),
            GuardDecision::Redirect("/invoices/9".to_string())
        );
        assert!(redirect.peek().is_none());
    }

    #[test]
    fn test_public_only_allows_anonymous() {
        let redirect = RedirectTarget::new();
        assert_eq!(
            public_only(&Session::unauthenticated(), "/auth/login", &redirect),
            GuardDecision::Allow
        );
    }

    #[test]
    fn test_open_routes_always_allowed() {
        let redirect = RedirectTarget::new();
        for session in [Session::unknown(), Session::unauthenticated()] {
            assert_eq!(
                evaluate(&session, &AppRoute::NotFound, "/404", &redirect),
                GuardDecision::Allow
            );
        }
    }
}
