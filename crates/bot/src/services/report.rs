use std::collections::BTreeMap;
use std::sync::Arc;

use dispatch::{DeliveryPayload, Dispatcher, ScopedImageFile};
use emby::{ItemKind, TodayAdditions};
use parking_lot::RwLock;

use crate::config::ReportConfig;
use crate::error::{AppError, AppResult};
use crate::services::LibraryClient;
use crate::utils::condense_episodes;

/// 日报明细最多展示的条目数
const MAX_DIGEST_LINES: usize = 15;

/// 一次日报推送的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// 已成功推送
    Sent,
    /// 今日没有新入库，跳过推送
    NothingNew,
    /// 未配置推送目标
    NoTarget,
}

/// 每日入库日报：查询当日新增，组装文案，经 Dispatcher 推送。
///
/// 查询失败或推送失败都以错误返回给调用方（定时任务记日志，
/// 手动触发时转成用户可见的提示），不会向上传播恐慌。
pub struct ReportService {
    library: Arc<dyn LibraryClient>,
    dispatcher: Arc<Dispatcher>,
    config: Arc<RwLock<ReportConfig>>,
}

impl ReportService {
    pub fn new(
        library: Arc<dyn LibraryClient>,
        dispatcher: Arc<Dispatcher>,
        config: Arc<RwLock<ReportConfig>>,
    ) -> Self {
        Self {
            library,
            dispatcher,
            config,
        }
    }

    /// Query today's additions and push the digest to the configured target.
    pub async fn send_daily_report(&self) -> AppResult<ReportStatus> {
        let target = self.config.read().target.clone();
        let Some(target) = target.filter(|t| !t.is_empty()) else {
            tracing::warn!("Daily report skipped: no delivery target configured");
            return Ok(ReportStatus::NoTarget);
        };

        let additions = self
            .library
            .today_additions()
            .await
            .ok_or_else(|| AppError::internal("获取今日入库统计失败"))?;

        if additions.total() == 0 {
            tracing::info!("Daily report skipped: nothing added today");
            return Ok(ReportStatus::NothingNew);
        }

        let digest = compose_digest(&additions);
        let outcome = self
            .dispatcher
            .dispatch(&target, &DeliveryPayload::text(digest))
            .await;

        if outcome.succeeded {
            tracing::info!(
                "Daily report delivered to {} via {}",
                target,
                outcome.via.as_deref().unwrap_or("?")
            );
            Ok(ReportStatus::Sent)
        } else {
            Err(AppError::delivery(format!(
                "推送失败，尝试了 {} 个适配器",
                outcome.attempted.len()
            )))
        }
    }

    /// Push a report the host has rendered into a staged image file. The
    /// staged file is the payload source; it is removed on every exit path,
    /// delivered or not.
    pub async fn send_rendered(
        &self,
        target: &str,
        image: ScopedImageFile,
        mime: &str,
    ) -> AppResult<()> {
        let bytes = std::fs::read(image.path())
            .map_err(|e| AppError::internal(format!("读取日报图片失败: {}", e)))?;

        let outcome = self
            .dispatcher
            .dispatch(target, &DeliveryPayload::image(bytes, mime))
            .await;

        if outcome.succeeded {
            Ok(())
        } else {
            Err(AppError::delivery(format!(
                "图片推送失败，尝试了 {} 个适配器",
                outcome.attempted.len()
            )))
        }
    }
}

/// 组装日报文案：先计数，再逐条列出，单集按（剧名，季）归并成区间。
pub(crate) fn compose_digest(additions: &TodayAdditions) -> String {
    let mut lines = vec![
        "📢 Emby 今日入库日报".to_string(),
        "━━━━━━━━━━━━".to_string(),
    ];

    if additions.movies > 0 {
        lines.push(format!("🎬 电影新增：{} 部", additions.movies));
    }
    if additions.series > 0 {
        lines.push(format!("📺 剧集新增：{} 部", additions.series));
    }
    if additions.episodes > 0 {
        lines.push(format!("🎞️ 单集新增：{} 集", additions.episodes));
    }
    lines.push("━━━━━━━━━━━━".to_string());

    let mut detail: Vec<String> = Vec::new();
    // (series name, season) -> episode numbers
    let mut grouped: BTreeMap<(String, i32), Vec<i32>> = BTreeMap::new();

    for item in &additions.items {
        match item.kind {
            ItemKind::Movie => detail.push(format!("🎬 {}{}", item.name, year_suffix(item.year))),
            ItemKind::Series => detail.push(format!("📺 {}{}", item.name, year_suffix(item.year))),
            ItemKind::Episode => {
                match (&item.series_name, item.episode_number) {
                    (Some(series), Some(episode)) => {
                        grouped
                            .entry((series.clone(), item.season_number.unwrap_or(1)))
                            .or_default()
                            .push(episode);
                    }
                    // 缺少剧名或集号的单集退化为独立条目
                    _ => detail.push(format!("🎞️ {}", item.name)),
                }
            }
            ItemKind::Other => {}
        }
    }

    for ((series, season), episodes) in grouped {
        detail.push(format!(
            "🎞️ {} S{} {}",
            series,
            season,
            condense_episodes(&episodes)
        ));
    }

    let truncated = detail.len() > MAX_DIGEST_LINES;
    detail.truncate(MAX_DIGEST_LINES);
    lines.extend(detail);
    if truncated {
        lines.push(format!("……仅显示前 {} 条", MAX_DIGEST_LINES));
    }

    lines.join("\n")
}

fn year_suffix(year: Option<i32>) -> String {
    match year {
        Some(y) => format!(" ({})", y),
        None => String::new(),
    }
}
