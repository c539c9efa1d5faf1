use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveTime};
use parking_lot::{Mutex, RwLock};

use super::traits::{JobResult, SchedulerJob};
use crate::config::ReportConfig;
use crate::services::ReportService;

/// 每分钟检查一次是否到了推送时间
const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// 错过整点后仍然补发的窗口（分钟）
const CATCH_UP_MINUTES: i64 = 5;

/// 每日入库日报任务
///
/// 按分钟轮询配置的推送时间；同一天只发一次，进程重启后
/// 窗口内会补发一次。
pub struct DailyReportJob {
    report: Arc<ReportService>,
    config: Arc<RwLock<ReportConfig>>,
    last_sent: Mutex<Option<NaiveDate>>,
}

impl DailyReportJob {
    pub fn new(report: Arc<ReportService>, config: Arc<RwLock<ReportConfig>>) -> Self {
        Self {
            report,
            config,
            last_sent: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SchedulerJob for DailyReportJob {
    fn name(&self) -> &'static str {
        "DailyReport"
    }

    fn interval(&self) -> Duration {
        TICK_INTERVAL
    }

    async fn execute(&self) -> JobResult {
        let (enabled, target_time) = {
            let config = self.config.read();
            (config.enabled, config.parsed_time())
        };

        if !enabled {
            return Ok(());
        }
        let Some(target_time) = target_time else {
            tracing::warn!("Daily report time is malformed, expected HH:MM");
            return Ok(());
        };

        let now = Local::now();
        let today = now.date_naive();
        let sent_today = *self.last_sent.lock() == Some(today);

        if !should_fire(now.time(), target_time, sent_today) {
            return Ok(());
        }

        match self.report.send_daily_report().await {
            Ok(status) => {
                tracing::info!("Daily report tick finished: {:?}", status);
                *self.last_sent.lock() = Some(today);
                Ok(())
            }
            Err(e) => {
                // 不记 last_sent，下一个 tick 在窗口内会重试
                Err(e.into())
            }
        }
    }
}

/// 到点判断：目标时刻起 `CATCH_UP_MINUTES` 分钟内、当日未发过才触发。
fn should_fire(now: NaiveTime, target: NaiveTime, sent_today: bool) -> bool {
    if sent_today {
        return false;
    }
    let elapsed = now.signed_duration_since(target);
    elapsed >= chrono::Duration::zero() && elapsed <= chrono::Duration::minutes(CATCH_UP_MINUTES)
}
