//! History API 封装模块
//!
//! 所有对 window.history / window.location 的操作都集中在 `BrowserHistory`；
//! `MemoryHistory` 用于测试和非浏览器环境。

use std::sync::{Mutex, PoisonError};

pub trait History: Send + Sync {
    /// 当前地址（path + query）
    fn current_url(&self) -> String;

    /// 新增历史记录
    fn push(&self, url: &str);

    /// 替换当前历史记录（用于重定向）
    fn replace(&self, url: &str);
}

/// 导航写入方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    Push,
    Replace,
}

impl HistoryMode {
    pub fn apply(self, history: &dyn History, url: &str) {
        match self {
            Self::Push => history.push(url),
            Self::Replace => history.replace(url),
        }
    }
}

// =========================================================
// 浏览器实现
// =========================================================

#[cfg(feature = "csr")]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHistory;

#[cfg(feature = "csr")]
impl History for BrowserHistory {
    fn current_url(&self) -> String {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return "/".to_string();
        };
        let path = location.pathname().unwrap_or_else(|_| "/".to_string());
        let search = location.search().unwrap_or_default();
        format!("{}{}", path, search)
    }

    fn push(&self, url: &str) {
        if let Some(Ok(history)) = web_sys::window().map(|w| w.history()) {
            let _ = history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
        }
    }

    fn replace(&self, url: &str) {
        if let Some(Ok(history)) = web_sys::window().map(|w| w.history()) {
            let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(url));
        }
    }
}

// =========================================================
// 内存实现
// =========================================================

#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Vec<String>>,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: Mutex::new(vec![initial.to_string()]),
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl History for MemoryHistory {
    fn current_url(&self) -> String {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, url: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }

    fn replace(&self, url: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.last_mut() {
            Some(last) => *last = url.to_string(),
            None => entries.push(url.to_string()),
        }
    }
}
