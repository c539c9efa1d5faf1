use async_trait::async_trait;

/// 一次入站回复：发送者 + 文本
#[derive(Debug, Clone)]
pub struct SessionTurn {
    pub sender_id: String,
    pub text: String,
}

/// 会话的出站通道，由宿主框架实现（绑定到发起订阅的那个会话）
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, text: &str) -> anyhow::Result<()>;
}

/// 会话的终态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// 用户回复 0 主动取消
    Cancelled,
    /// 电影订阅已提交（`accepted` 为 MoviePilot 是否接受）
    MovieSubscribed { accepted: bool },
    /// 整剧批量订阅完成，第 0 季不计入
    SeasonsSubscribed { success: usize, failed: usize },
    /// 单季订阅已提交（prompt_choice 策略）
    SeasonSubscribed { season: i32, accepted: bool },
    /// 剧集没有可订阅的季
    NoSeasons,
    /// 无活动超时，静默结束
    TimedOut,
    /// 处理回合时出错，已通知用户并强制终止
    Failed,
    /// 同一用户发起了新的搜索，本会话被替换
    Superseded,
}
