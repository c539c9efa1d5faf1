mod daily_report_job;
mod traits;

pub use daily_report_job::DailyReportJob;
pub use traits::{JobResult, SchedulerJob};

use std::sync::Arc;

/// 后台任务调度：每个 Job 一个独立的 tick 循环。
///
/// 同一个 Job 的执行在自己的循环内天然串行；单次执行失败只记日志，
/// 循环照常走下一个 tick。
pub struct SchedulerService {
    jobs: Vec<Arc<dyn SchedulerJob>>,
}

impl Default for SchedulerService {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerService {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn with_job(mut self, job: impl SchedulerJob + 'static) -> Self {
        self.jobs.push(Arc::new(job));
        self
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Spawn one tick loop per registered job. Must be called inside a
    /// tokio runtime.
    pub fn start(&self) {
        for job in &self.jobs {
            tokio::spawn(tick_loop(Arc::clone(job)));
        }
        tracing::info!("Scheduler started with {} job(s)", self.jobs.len());
    }
}

async fn tick_loop(job: Arc<dyn SchedulerJob>) {
    let mut timer = tokio::time::interval(job.interval());
    // 迟到的 tick 直接跳过，不补课
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        timer.tick().await;
        if let Err(e) = job.execute().await {
            tracing::error!("Job '{}' failed: {}", job.name(), e);
        }
    }
}
