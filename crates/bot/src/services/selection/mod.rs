mod handle;
mod messages;
mod runner;

pub use handle::SessionHandle;
pub use messages::{Responder, SessionOutcome, SessionTurn};
pub use runner::SelectionSession;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moviepilot::MediaInfo;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::config::SeasonPolicy;
use crate::services::CatalogClient;

/// 每个会话的回合队列长度
const TURN_QUEUE_SIZE: usize = 8;

/// 启动一个会话所需的全部素材
pub struct SessionParams {
    pub owner_id: String,
    pub candidates: Vec<MediaInfo>,
    pub timeout: Duration,
    pub policy: SeasonPolicy,
    pub catalog: Arc<dyn CatalogClient>,
    pub responder: Arc<dyn Responder>,
}

struct ActiveSession {
    handle: SessionHandle,
    epoch: u64,
}

/// 会话注册表：owner id → 活动会话。
///
/// 同一用户同一时刻只有一个活动会话；再次发起搜索时旧会话被替换。
/// 注册表持有会话唯一的发送端，替换即关闭旧通道：旧 runner 处理完
/// 已排队的回合后以 `Superseded` 退出。终态或超时后会话自行从注册表
/// 摘除；摘除按 epoch 匹配，过期会话的摘除是空操作。
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, ActiveSession>>,
    next_epoch: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            next_epoch: AtomicU64::new(1),
        }
    }

    /// Spawn a session for `params.owner_id`, replacing any live one.
    ///
    /// The registry keeps the only handle to the turn channel; turns are
    /// routed through [`SessionRegistry::dispatch_turn`].
    pub fn spawn_session(self: &Arc<Self>, params: SessionParams) {
        let (sender, receiver) = mpsc::channel(TURN_QUEUE_SIZE);
        let handle = SessionHandle::new(sender);
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let owner_id = params.owner_id.clone();

        let session = SelectionSession::new(
            params.owner_id,
            params.candidates,
            params.timeout,
            params.policy,
            params.catalog,
            params.responder,
            receiver,
        );

        let replaced = self
            .sessions
            .lock()
            .insert(owner_id.clone(), ActiveSession { handle, epoch });
        if replaced.is_some() {
            tracing::debug!("Replacing live selection session for {}", owner_id);
        }
        // `replaced` drops here, closing the superseded session's channel.

        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = session.run().await;
            tracing::debug!("Session for {} ended: {:?}", owner_id, outcome);
            registry.evict(&owner_id, epoch);
        });
    }

    /// Route one inbound message to the owner's live session.
    /// Returns `false` when there is none.
    pub async fn dispatch_turn(&self, owner_id: &str, sender_id: &str, text: &str) -> bool {
        let handle = {
            let sessions = self.sessions.lock();
            sessions.get(owner_id).map(|s| s.handle.clone())
        };
        match handle {
            Some(handle) => handle.push_turn(sender_id, text).await,
            None => false,
        }
    }

    pub fn has_session(&self, owner_id: &str) -> bool {
        self.sessions.lock().contains_key(owner_id)
    }

    /// Epoch-guarded removal: a stale session (already replaced) must not
    /// evict its successor.
    fn evict(&self, owner_id: &str, epoch: u64) {
        let mut sessions = self.sessions.lock();
        if sessions.get(owner_id).map(|s| s.epoch) == Some(epoch) {
            sessions.remove(owner_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use moviepilot::{MediaKind, SeasonInfo};

    struct NullCatalog;

    #[async_trait]
    impl CatalogClient for NullCatalog {
        async fn search_title(&self, _title: &str) -> Vec<MediaInfo> {
            Vec::new()
        }
        async fn list_seasons(&self, _tmdb_id: i64) -> Vec<SeasonInfo> {
            Vec::new()
        }
        async fn subscribe_movie(&self, _media: &MediaInfo) -> bool {
            true
        }
        async fn subscribe_series(&self, _media: &MediaInfo, _season: i32) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct RecordingResponder {
        replies: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Responder for RecordingResponder {
        async fn reply(&self, text: &str) -> anyhow::Result<()> {
            self.replies.lock().push(text.to_string());
            Ok(())
        }
    }

    fn params(owner: &str, responder: Arc<RecordingResponder>) -> SessionParams {
        SessionParams {
            owner_id: owner.to_string(),
            candidates: vec![MediaInfo {
                title: "沙丘".to_string(),
                original_title: None,
                year: None,
                tmdb_id: 1,
                kind: MediaKind::Movie,
            }],
            timeout: Duration::from_secs(60),
            policy: SeasonPolicy::SubscribeAll,
            catalog: Arc::new(NullCatalog),
            responder,
        }
    }

    async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..200 {
            if check() {
                return true;
            }
            tokio::task::yield_now().await;
        }
        false
    }

    #[tokio::test]
    async fn terminal_session_is_evicted() {
        let registry = Arc::new(SessionRegistry::new());
        let responder = Arc::new(RecordingResponder::default());
        registry.spawn_session(params("alice", responder));
        assert!(registry.has_session("alice"));

        assert!(registry.dispatch_turn("alice", "alice", "0").await);

        assert!(wait_until(|| !registry.has_session("alice")).await);
    }

    #[tokio::test]
    async fn new_search_replaces_the_old_session() {
        let registry = Arc::new(SessionRegistry::new());
        let old_responder = Arc::new(RecordingResponder::default());
        let new_responder = Arc::new(RecordingResponder::default());

        registry.spawn_session(params("alice", Arc::clone(&old_responder)));
        // Let the first session emit its candidate list before replacing it.
        assert!(wait_until(|| !old_responder.replies.lock().is_empty()).await);

        registry.spawn_session(params("alice", Arc::clone(&new_responder)));

        assert!(registry.has_session("alice"));
        assert!(registry.dispatch_turn("alice", "alice", "0").await);
        assert!(wait_until(|| !registry.has_session("alice")).await);

        // Only the replacement session handled the cancel turn.
        assert!(new_responder
            .replies
            .lock()
            .iter()
            .any(|r| r.contains("操作已取消")));
        assert!(!old_responder
            .replies
            .lock()
            .iter()
            .any(|r| r.contains("操作已取消")));
    }

    #[tokio::test]
    async fn sessions_of_different_users_are_independent() {
        let registry = Arc::new(SessionRegistry::new());
        registry.spawn_session(params("alice", Arc::new(RecordingResponder::default())));
        registry.spawn_session(params("bob", Arc::new(RecordingResponder::default())));

        assert!(registry.dispatch_turn("alice", "alice", "0").await);
        assert!(registry.has_session("bob"));
    }

    #[tokio::test]
    async fn dispatch_without_session_reports_false() {
        let registry = Arc::new(SessionRegistry::new());
        assert!(!registry.dispatch_turn("nobody", "nobody", "1").await);
    }
}
