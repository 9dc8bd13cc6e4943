//! 定时器封装模块
//!
//! `Timer` 生成一次性的 sleep Future，用于给等待操作加上超时上限。
//! 浏览器下使用 `gloo-timers`（基于 `setTimeout`）。

use futures::future::LocalBoxFuture;
use std::time::Duration;

pub trait Timer: Send + Sync {
    /// 返回在 `duration` 后完成的 Future
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// 浏览器定时器
#[cfg(feature = "csr")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[cfg(feature = "csr")]
impl Timer for BrowserTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}
