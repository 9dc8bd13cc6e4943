//! 请求认证装饰器
//!
//! 包装任意 `HttpClient`，为非认证端点的请求附加 `Authorization: Bearer <token>`。
//! 收到 401 只记录日志，不修改会话。

use super::token_store::TokenStore;
use crate::config::AppConfig;
use crate::web::http::{HttpClient, HttpError, HttpRequest, HttpResponse};
use invoicer_shared::HEADER_AUTHORIZATION;

#[derive(Debug, Clone)]
pub struct RequestAuthenticator<C> {
    inner: C,
    store: TokenStore,
    config: AppConfig,
}

impl<C: HttpClient> RequestAuthenticator<C> {
    pub fn new(inner: C, store: TokenStore, config: AppConfig) -> Self {
        Self {
            inner,
            store,
            config,
        }
    }

    fn authorize(&self, req: HttpRequest) -> HttpRequest {
        if self.config.is_auth_endpoint(&req.url) || req.header(HEADER_AUTHORIZATION).is_some() {
            return req;
        }
        match self.store.token() {
            Some(token) => req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token)),
            None => req,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<C: HttpClient> HttpClient for RequestAuthenticator<C> {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let req = self.authorize(req);
        let url = req.url.clone();
        let method = req.method;

        let resp = self.inner.send(req).await?;
        if resp.status == 401 {
            log::warn!(
                "[RequestAuthenticator] 401 from {} {}, session left untouched",
                method.as_str(),
                url
            );
        }
        Ok(resp)
    }
}
