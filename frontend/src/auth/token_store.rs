//! 凭据持久化
//!
//! 在 `KeyValueStorage` 中保存两条记录：
//! - `auth_token`: 不透明的 Bearer token
//! - `user`: JSON 序列化的 `UserRecord`
//!
//! 两者同时存在才算有效凭据；只剩其一时视为不存在。

use crate::web::{KeyValueStorage, MemoryStorage};
use invoicer_shared::UserRecord;
use std::fmt;
use std::sync::Arc;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";

#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.has_token())
            .finish()
    }
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    #[cfg(feature = "csr")]
    pub fn local() -> Self {
        Self::new(Arc::new(crate::web::LocalStorage))
    }

    /// 先写 token，再写用户记录
    ///
    /// 任一写入失败返回 `false`，已写入的部分由调用方清理。
    pub fn save(&self, token: &str, user: &UserRecord) -> bool {
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(e) => {
                log::error!("[TokenStore] failed to serialize user record: {}", e);
                return false;
            }
        };

        self.storage.set(TOKEN_KEY, token) && self.storage.set(USER_KEY, &user_json)
    }

    /// 读取完整凭据；缺失或用户记录无法解析时返回 `None`
    pub fn load(&self) -> Option<(String, UserRecord)> {
        let token = self.token()?;
        let raw = self.storage.get(USER_KEY)?;
        match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => Some((token, user)),
            Err(e) => {
                log::warn!("[TokenStore] stored user record is unreadable: {}", e);
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// 删除两条记录，返回之前是否存有任何内容
    ///
    /// 重复调用是安全的。
    pub fn clear(&self) -> bool {
        let had_entries =
            self.storage.get(TOKEN_KEY).is_some() || self.storage.get(USER_KEY).is_some();
        self.storage.delete(TOKEN_KEY);
        self.storage.delete(USER_KEY);
        had_entries
    }
}
