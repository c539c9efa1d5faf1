use async_trait::async_trait;
use std::time::Duration;

/// Job 执行结果
pub type JobResult = anyhow::Result<()>;

/// 可被调度的后台任务
///
/// 实现者提供名称、触发间隔和执行体；执行失败只记录日志，
/// 不影响后续触发。
#[async_trait]
pub trait SchedulerJob: Send + Sync {
    /// Job name, used for manual triggering and status listing.
    fn name(&self) -> &'static str;

    /// Tick interval for this job.
    fn interval(&self) -> Duration;

    async fn execute(&self) -> JobResult;
}
