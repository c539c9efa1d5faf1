use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// 插件配置，由宿主框架加载后传入
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub moviepilot: MoviepilotConfig,
    #[serde(default)]
    pub emby: EmbyConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// MoviePilot 连接配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoviepilotConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
}

/// Emby 连接配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbyConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for EmbyConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            user_id: None,
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    10
}

/// 订阅会话配置
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// 会话无活动超时（秒），每次有效输入都会重置
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub season_policy: SeasonPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            season_policy: SeasonPolicy::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

/// 选中电视剧后的订阅策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPolicy {
    /// 自动订阅全部正季（跳过第 0 季特别篇）
    #[default]
    SubscribeAll,
    /// 列出季并等待用户选择一季（旧版行为）
    PromptChoice,
}

/// 每日入库推送配置，可在运行期修改
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub enabled: bool,
    /// 推送时间，HH:MM
    #[serde(default = "default_report_time")]
    pub time: String,
    /// 推送目标，`platform:id` 或纯 id
    #[serde(default)]
    pub target: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            time: default_report_time(),
            target: None,
        }
    }
}

fn default_report_time() -> String {
    "20:00".to_string()
}

impl ReportConfig {
    /// Parse `time` as HH:MM. `None` when malformed.
    pub fn parsed_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(&self.time, "%H:%M").ok()
    }
}
