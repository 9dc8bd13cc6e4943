//! 会话状态
//!
//! `SessionState` 是全应用唯一的认证状态来源：
//! - 内存中的 `Session` 由 `ArcRwSignal` 承载，UI 可直接订阅
//! - 每次变更都先写 `TokenStore`，再发布到信号，保证两者一致
//! - 异步等待者（登录流程、路由守卫）通过 oneshot 通道在状态发布时被唤醒

use super::token_store::TokenStore;
use crate::web::Timer;
use futures::channel::oneshot;
use futures::future::{self, Either};
use invoicer_shared::UserRecord;
use leptos::prelude::*;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// 认证状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthStatus {
    /// 尚未从存储中恢复
    #[default]
    Unknown,
    Authenticated,
    Unauthenticated,
}

/// 会话快照
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    status: AuthStatus,
    user: Option<UserRecord>,
}

impl Session {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserRecord) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            user: Some(user),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            user: None,
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }

    /// 状态已确定（不再是 Unknown）
    pub fn is_resolved(&self) -> bool {
        self.status != AuthStatus::Unknown
    }

    pub fn current_user(&self) -> Option<&UserRecord> {
        self.user.as_ref()
    }
}

/// 等待会话状态超时
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("timed out waiting for session state (last status {:?})", .last.status())]
pub struct WaitTimeout {
    pub last: Session,
}

type Waiters = Arc<Mutex<Vec<oneshot::Sender<Session>>>>;

#[derive(Clone)]
pub struct SessionState {
    store: TokenStore,
    current: ArcRwSignal<Session>,
    waiters: Waiters,
}

impl SessionState {
    /// 创建状态为 Unknown 的会话，需调用 [`SessionState::restore`] 完成初始化
    pub fn new(store: TokenStore) -> Self {
        Self {
            store,
            current: ArcRwSignal::new(Session::unknown()),
            waiters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 创建并立即从存储恢复
    pub fn from_store(store: TokenStore) -> Self {
        let state = Self::new(store);
        state.restore();
        state
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// 启动时从存储恢复会话
    pub fn restore(&self) -> Session {
        let session = self.reconcile();
        log::info!(
            "[Session] restored status={:?} user={:?}",
            session.status(),
            session.current_user().map(|u| u.username.as_str())
        );
        session
    }

    /// 非追踪读取
    pub fn snapshot(&self) -> Session {
        self.current.get_untracked()
    }

    /// 按存储核对后的当前会话
    ///
    /// 尚未恢复时原样返回 Unknown。
    pub fn current(&self) -> Session {
        let snapshot = self.snapshot();
        if snapshot.is_resolved() {
            self.reconcile()
        } else {
            snapshot
        }
    }

    /// 追踪读取，供 Effect / 视图使用
    pub fn watch(&self) -> Session {
        self.current.get()
    }

    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let current = self.current.clone();
        Signal::derive(move || current.get().is_authenticated())
    }

    pub fn current_user_signal(&self) -> Signal<Option<UserRecord>> {
        let current = self.current.clone();
        Signal::derive(move || current.get().current_user().cloned())
    }

    /// 保存凭据并发布 Authenticated
    ///
    /// 存储写入失败时清除残留，返回 `false`，会话保持原状。
    pub fn establish(&self, token: &str, user: UserRecord) -> bool {
        if !self.store.save(token, &user) {
            log::error!(
                "[Session] failed to persist credentials username={}",
                user.username
            );
            self.store.clear();
            return false;
        }

        log::info!("[Session] authenticated username={}", user.username);
        self.publish(Session::authenticated(user));
        true
    }

    /// 清除凭据并发布 Unauthenticated；重复调用无副作用
    pub fn clear(&self) {
        if self.store.clear() {
            log::info!("[Session] credentials cleared");
        }
        self.publish(Session::unauthenticated());
    }

    /// 按存储内容重新推导会话
    ///
    /// token 与用户记录缺一时，删除剩下的那一条。
    pub fn reconcile(&self) -> Session {
        let derived = match self.store.load() {
            Some((_, user)) => Session::authenticated(user),
            None => {
                if self.store.clear() {
                    log::warn!("[Session] incomplete credentials in storage, discarding");
                }
                Session::unauthenticated()
            }
        };

        let current = self.snapshot();
        if current != derived {
            log::debug!(
                "[Session] reconciled {:?} -> {:?}",
                current.status(),
                derived.status()
            );
        }
        self.publish(derived.clone());
        derived
    }

    /// 等待直到 `predicate` 成立，或 `timeout` 到期
    ///
    /// 先检查当前状态，不成立时注册等待者，每次状态发布后重新检查。
    pub async fn wait_until<P>(
        &self,
        predicate: P,
        timer: &dyn Timer,
        timeout: Duration,
    ) -> Result<Session, WaitTimeout>
    where
        P: Fn(&Session) -> bool,
    {
        let mut deadline = timer.sleep(timeout);

        loop {
            let current = self.snapshot();
            if predicate(&current) {
                return Ok(current);
            }

            let next = self.subscribe();
            match future::select(next, &mut deadline).await {
                Either::Left(_) => continue,
                Either::Right(_) => {
                    return Err(WaitTimeout {
                        last: self.snapshot(),
                    });
                }
            }
        }
    }

    /// 等待状态脱离 Unknown，没有超时
    pub async fn resolved(&self) -> Session {
        loop {
            let current = self.snapshot();
            if current.is_resolved() {
                return current;
            }
            let _ = self.subscribe().await;
        }
    }

    fn subscribe(&self) -> oneshot::Receiver<Session> {
        let (tx, rx) = oneshot::channel();
        self.waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    fn publish(&self, session: Session) {
        if self.current.get_untracked() != session {
            self.current.set(session.clone());
        }

        let waiters: Vec<_> = self
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for waiter in waiters {
            let _ = waiter.send(session.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token_store::{TOKEN_KEY, USER_KEY};
    use crate::web::test_timers::{ExpiredTimer, NeverTimer};
    use crate::web::{KeyValueStorage, MemoryStorage};

    fn alice() -> UserRecord {
        UserRecord::new(1, "alice", "alice@example.com", ["user"])
    }

    /// 只允许写入 token，写入用户记录失败
    struct HalfBrokenStorage(MemoryStorage);

    impl KeyValueStorage for HalfBrokenStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> bool {
            key != USER_KEY && self.0.set(key, value)
        }
        fn delete(&self, key: &str) -> bool {
            self.0.delete(key)
        }
    }

    #[test]
    fn test_new_session_is_unknown() {
        let session = SessionState::new(TokenStore::in_memory());
        assert_eq!(session.snapshot().status(), AuthStatus::Unknown);
        assert!(!session.snapshot().is_resolved());
    }

    #[test]
    fn test_restore_from_persisted_credentials() {
        let store = TokenStore::in_memory();
        store.save("T", &alice());

        let session = SessionState::from_store(store);
        let snapshot = session.snapshot();
        assert!(snapshot.is_authenticated());
        assert_eq!(snapshot.current_user(), Some(&alice()));
    }

    #[test]
    fn test_restore_without_credentials() {
        let session = SessionState::from_store(TokenStore::in_memory());
        assert_eq!(session.snapshot().status(), AuthStatus::Unauthenticated);
        assert!(session.snapshot().current_user().is_none());
    }

    #[test]
    fn test_establish_then_clear() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionState::from_store(TokenStore::new(storage.clone()));

        assert!(session.establish("T", alice()));
        assert!(session.snapshot().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("T"));

        session.clear();
        assert!(!session.snapshot().is_authenticated());
        assert!(storage.is_empty());

        // 第二次清除不改变任何状态
        session.clear();
        assert_eq!(session.snapshot(), Session::unauthenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_establish_failure_leaves_no_partial_write() {
        let storage = Arc::new(HalfBrokenStorage(MemoryStorage::new()));
        let session = SessionState::from_store(TokenStore::new(storage.clone()));

        assert!(!session.establish("T", alice()));
        assert!(!session.snapshot().is_authenticated());
        assert!(storage.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn test_reconcile_discards_orphan_token() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionState::from_store(TokenStore::new(storage.clone()));
        session.establish("T", alice());

        // 用户记录被外部删除
        storage.delete(USER_KEY);
        let reconciled = session.reconcile();

        assert_eq!(reconciled.status(), AuthStatus::Unauthenticated);
        assert!(storage.get(TOKEN_KEY).is_none());
        assert!(!session.snapshot().is_authenticated());
    }

    #[test]
    fn test_reconcile_discards_orphan_user_record() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionState::from_store(TokenStore::new(storage.clone()));
        session.establish("T", alice());

        storage.delete(TOKEN_KEY);
        let reconciled = session.reconcile();

        assert_eq!(reconciled, Session::unauthenticated());
        assert!(storage.get(USER_KEY).is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_current_follows_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionState::from_store(TokenStore::new(storage.clone()));
        session.establish("T", alice());
        assert!(session.current().is_authenticated());

        storage.delete(TOKEN_KEY);
        storage.delete(USER_KEY);

        assert_eq!(session.current(), Session::unauthenticated());
        assert!(!session.snapshot().is_authenticated());
    }

    #[test]
    fn test_current_keeps_unknown_until_restored() {
        let store = TokenStore::in_memory();
        store.save("T", &alice());
        let session = SessionState::new(store);

        assert_eq!(session.current().status(), AuthStatus::Unknown);
    }

    #[tokio::test]
    async fn test_wait_until_already_satisfied() {
        let session = SessionState::from_store(TokenStore::in_memory());
        session.establish("T", alice());

        let result = session
            .wait_until(Session::is_authenticated, &NeverTimer, Duration::from_secs(1))
            .await;
        assert!(result.unwrap().is_authenticated());
    }

    #[tokio::test]
    async fn test_wait_until_woken_by_publish() {
        let session = SessionState::from_store(TokenStore::in_memory());

        let waiter =
            session.wait_until(Session::is_authenticated, &NeverTimer, Duration::from_secs(1));
        let writer = async {
            session.establish("T", alice());
        };
        let (result, _) = futures::join!(waiter, writer);

        assert_eq!(result.unwrap().current_user(), Some(&alice()));
    }

    #[tokio::test]
    async fn test_wait_until_times_out() {
        let session = SessionState::from_store(TokenStore::in_memory());

        let result = session
            .wait_until(Session::is_authenticated, &ExpiredTimer, Duration::from_millis(1))
            .await;
        let timeout = result.unwrap_err();
        assert_eq!(timeout.last.status(), AuthStatus::Unauthenticated);
    }

    #[tokio::test]
    async fn test_resolved_waits_for_restore() {
        let store = TokenStore::in_memory();
        store.save("T", &alice());
        let session = SessionState::new(store);

        let waiter = session.resolved();
        let restorer = async {
            session.restore();
        };
        let (resolved, _) = futures::join!(waiter, restorer);

        assert!(resolved.is_authenticated());
    }
}
