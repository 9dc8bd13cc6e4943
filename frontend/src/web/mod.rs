//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
//! 以减小 WASM 二进制体积。每个封装都有一个 trait 和一个非浏览器实现，
//! 使上层逻辑可以在原生环境下测试。

pub mod history;
pub mod http;
mod route;
pub mod router;
mod storage;
mod timer;

pub use history::{History, HistoryMode, MemoryHistory};
pub use http::{HttpClient, SharedHttp};
pub use route::{AppRoute, RouteAccess};
pub use router::{Link, Router, RouterOutlet, RouterService, use_router};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use timer::Timer;

#[cfg(feature = "csr")]
pub use history::BrowserHistory;
#[cfg(feature = "csr")]
pub use http::FetchClient;
#[cfg(feature = "csr")]
pub use storage::LocalStorage;
#[cfg(feature = "csr")]
pub use timer::BrowserTimer;

#[cfg(test)]
pub use http::mock;
#[cfg(test)]
pub use timer::test_timers;
