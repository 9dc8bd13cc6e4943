//! 运行时配置
//!
//! 默认值适用于本地开发（后端通过代理挂在 `/api`）。
//! 构建时可通过环境变量覆盖：
//! - `INVOICER_API_BASE`: 后端 API 前缀，如 `https://invoices.example.com/api`
//! - `INVOICER_STATE_SYNC_TIMEOUT_MS`: 登录后等待会话状态同步的上限

use invoicer_shared::AUTH_PATH_PREFIX;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "/api";
const DEFAULT_STATE_SYNC_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    api_base: String,
    state_sync_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl AppConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api_base,
            state_sync_timeout: Duration::from_millis(DEFAULT_STATE_SYNC_TIMEOUT_MS),
        }
    }

    /// 读取构建时注入的覆盖值，读不到就用默认值
    pub fn from_build_env() -> Self {
        let config = Self::new(option_env!("INVOICER_API_BASE").unwrap_or(DEFAULT_API_BASE));

        match option_env!("INVOICER_STATE_SYNC_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            Some(ms) => config.with_state_sync_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }

    pub fn with_state_sync_timeout(mut self, timeout: Duration) -> Self {
        self.state_sync_timeout = timeout;
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn state_sync_timeout(&self) -> Duration {
        self.state_sync_timeout
    }

    /// 拼接完整的 API URL
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        }
    }

    /// 是否为认证端点（登录/注册请求不携带 Bearer）
    pub fn is_auth_endpoint(&self, url: &str) -> bool {
        url.strip_prefix(self.api_base.as_str())
            .is_some_and(|rest| rest.starts_with(AUTH_PATH_PREFIX))
    }
}
