//! 指令入口：把宿主框架收到的文本指令翻译成服务调用。
//!
//! 上游错误一律吸收为用户可见的提示文案，不向宿主框架传播。

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use emby::{ItemKind, LibraryItem};

use crate::services::{Responder, ReportStatus, SessionParams};
use crate::state::AppState;

const EMBY_NOT_CONFIGURED: &str = "Emby 未配置，请先填写服务器地址和 API Key。";
const EMBY_QUERY_FAILED: &str = "查询 Emby 失败，请稍后重试。";

/// 发起订阅：搜索候选，开启（或替换）该用户的选择会话。
///
/// 后续回复通过 [`session_turn`] 进入会话。
pub async fn start_subscribe(
    state: &AppState,
    owner_id: &str,
    keyword: &str,
    responder: Arc<dyn Responder>,
) {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        let _ = responder
            .reply("请输入要订阅的影片名，例如：订阅 沙丘")
            .await;
        return;
    }

    let candidates = state.catalog.search_title(keyword).await;
    if candidates.is_empty() {
        let _ = responder.reply("没有查询到影片，请检查名字。").await;
        return;
    }

    state.sessions.spawn_session(SessionParams {
        owner_id: owner_id.to_string(),
        candidates,
        timeout: Duration::from_secs(state.config.session.timeout_secs),
        policy: state.config.session.season_policy,
        catalog: Arc::clone(&state.catalog),
        responder,
    });
}

/// 把一条普通消息路由给发起者的活动会话。
/// 返回 `false` 表示没有会话，消息应按普通消息处理。
pub async fn session_turn(state: &AppState, owner_id: &str, sender_id: &str, text: &str) -> bool {
    state
        .sessions
        .dispatch_turn(owner_id, sender_id, text)
        .await
}

/// 查询 MoviePilot 的下载进度。
pub async fn download_progress(state: &AppState) -> String {
    match state.moviepilot.download_progress().await {
        Ok(tasks) if tasks.is_empty() => "当前没有正在下载的任务。".to_string(),
        Ok(tasks) => {
            let mut lines = vec!["📥 当前下载进度".to_string()];
            lines.extend(tasks.iter().map(|t| t.progress_line()));
            lines.join("\n")
        }
        Err(e) => {
            tracing::error!("Download progress query failed: {}", e);
            "获取下载进度失败，请稍后重试。".to_string()
        }
    }
}

/// 最新入库，可按类型过滤（电影 / 电视剧 / 全部）。
pub async fn library_latest(state: &AppState, kind_arg: &str) -> String {
    if !state.library.is_configured() {
        return EMBY_NOT_CONFIGURED.to_string();
    }
    let kind = match parse_kind(kind_arg) {
        Ok(kind) => kind,
        Err(message) => return message,
    };
    match state.library.latest(kind).await {
        Some(items) if items.is_empty() => "媒体库中没有找到条目。".to_string(),
        Some(items) => format_items("📺 Emby 最新入库", &items),
        None => EMBY_QUERY_FAILED.to_string(),
    }
}

/// 按名称搜索媒体库。
pub async fn library_search(state: &AppState, keyword: &str) -> String {
    if !state.library.is_configured() {
        return EMBY_NOT_CONFIGURED.to_string();
    }
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return "请输入要搜索的名称，例如：搜索 庆余年".to_string();
    }
    match state.library.search(keyword).await {
        Some(items) if items.is_empty() => {
            format!("没有找到与「{}」匹配的条目。", keyword)
        }
        Some(items) => format_items(&format!("🔍 「{}」的搜索结果", keyword), &items),
        None => EMBY_QUERY_FAILED.to_string(),
    }
}

/// 媒体库整体统计。
pub async fn library_stats(state: &AppState) -> String {
    if !state.library.is_configured() {
        return EMBY_NOT_CONFIGURED.to_string();
    }
    match state.library.stats().await {
        Some(stats) => [
            "📊 Emby 媒体库统计 📊".to_string(),
            "━━━━━━━━━━━━".to_string(),
            format!("🎬 电影：{} 部", stats.movies),
            format!("📺 剧集：{} 部", stats.series),
            format!("🎞️ 单集：{} 集", stats.episodes),
        ]
        .join("\n"),
        None => EMBY_QUERY_FAILED.to_string(),
    }
}

/// 手动触发一次日报推送。
pub async fn trigger_report(state: &AppState) -> String {
    match state.report.send_daily_report().await {
        Ok(ReportStatus::Sent) => "✅ 日报已推送。".to_string(),
        Ok(ReportStatus::NothingNew) => "今日没有新入库，已跳过推送。".to_string(),
        Ok(ReportStatus::NoTarget) => {
            "❌ 未配置推送目标，请先设置：日报 target <目标ID>".to_string()
        }
        Err(e) => {
            tracing::error!("Manual report trigger failed: {}", e);
            format!("❌ 推送失败：{}", e)
        }
    }
}

/// 查看或修改日报配置：`on` / `off` / `time HH:MM` / `target <id>`。
pub fn report_config(state: &AppState, action: &str, value: &str) -> String {
    match action.trim() {
        "" | "show" | "状态" => {
            let config = state.report_config.read();
            [
                "📬 日报推送配置".to_string(),
                format!("状态：{}", if config.enabled { "开启" } else { "关闭" }),
                format!("时间：{}", config.time),
                format!(
                    "目标：{}",
                    config.target.as_deref().unwrap_or("未设置")
                ),
                "可用指令：on / off / time HH:MM / target <目标ID>".to_string(),
            ]
            .join("\n")
        }
        "on" | "开启" => {
            state.report_config.write().enabled = true;
            "✅ 已开启每日入库推送。".to_string()
        }
        "off" | "关闭" => {
            state.report_config.write().enabled = false;
            "✅ 已关闭每日入库推送。".to_string()
        }
        "time" | "时间" => {
            let value = value.trim();
            if NaiveTime::parse_from_str(value, "%H:%M").is_err() {
                return "❌ 时间格式错误，请使用 HH:MM，例如 20:00。".to_string();
            }
            state.report_config.write().time = value.to_string();
            format!("✅ 推送时间已设置为 {}。", value)
        }
        "target" | "目标" => {
            let value = value.trim();
            if value.is_empty() {
                return "❌ 请输入目标ID，例如：日报 target qq:123456".to_string();
            }
            state.report_config.write().target = Some(value.to_string());
            format!("✅ 推送目标已设置为 {}。", value)
        }
        other => format!("未知指令：{}（支持 on / off / time / target）", other),
    }
}

/// 指令帮助。
pub fn help_text() -> String {
    [
        "🎬 影片订阅助手",
        "订阅 <名称> —— 搜索并订阅电影/电视剧",
        "进度 —— 查看当前下载进度",
        "最新 [电影|电视剧] —— 查看最新入库",
        "搜索 <名称> —— 搜索媒体库",
        "统计 —— 媒体库整体统计",
        "日报 —— 查看/修改每日入库推送配置",
        "推送日报 —— 立即推送一次日报",
    ]
    .join("\n")
}

fn parse_kind(arg: &str) -> Result<Option<ItemKind>, String> {
    match arg.trim() {
        "" | "all" | "全部" => Ok(None),
        "movie" | "电影" => Ok(Some(ItemKind::Movie)),
        "series" | "电视剧" | "剧集" => Ok(Some(ItemKind::Series)),
        other => Err(format!(
            "未知的类型：{}（支持 电影 / 电视剧 / 全部）",
            other
        )),
    }
}

fn format_items(title: &str, items: &[LibraryItem]) -> String {
    let mut lines = vec![title.to_string()];
    for (index, item) in items.iter().enumerate() {
        let mut line = format!("{}. 《{}》", index + 1, item.name);
        if let Some(original) = &item.original_title {
            line.push_str(&format!(" / {}", original));
        }
        if let Some(year) = item.year {
            line.push_str(&format!(" ({})", year));
        }
        line.push_str(&format!(" [{}]", item.kind.to_chinese()));
        lines.push(line);
        if let Some(date) = &item.date_created {
            lines.push(format!("   入库时间：{}", date));
        }
    }
    lines.join("\n")
}
