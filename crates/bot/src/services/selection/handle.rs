use tokio::sync::mpsc;

use super::messages::SessionTurn;

/// 会话对外接口：向正在等待的会话投递一条回复
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<SessionTurn>,
}

impl SessionHandle {
    pub(crate) fn new(sender: mpsc::Sender<SessionTurn>) -> Self {
        Self { sender }
    }

    /// Queue one inbound turn. Returns `false` when the session has already
    /// terminated (its channel is closed).
    pub async fn push_turn(&self, sender_id: impl Into<String>, text: impl Into<String>) -> bool {
        self.sender
            .send(SessionTurn {
                sender_id: sender_id.into(),
                text: text.into(),
            })
            .await
            .is_ok()
    }
}
