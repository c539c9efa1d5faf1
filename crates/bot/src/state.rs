use std::sync::Arc;
use std::time::Duration;

use dispatch::{Dispatcher, PlatformAdapter};
use emby::EmbyClient;
use moviepilot::MoviepilotClient;
use parking_lot::RwLock;

use crate::config::{Config, ReportConfig};
use crate::services::{
    CatalogClient, DailyReportJob, EmbyLibrary, LibraryClient, MoviepilotCatalog, ReportService,
    SchedulerService, SessionRegistry,
};

/// HTTP 超时：订阅提交和批量季查询可能较慢
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub moviepilot: Arc<MoviepilotClient>,
    pub catalog: Arc<dyn CatalogClient>,
    pub library: Arc<dyn LibraryClient>,
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: Arc<SessionRegistry>,
    pub report_config: Arc<RwLock<ReportConfig>>,
    pub report: Arc<ReportService>,
    pub scheduler: Arc<SchedulerService>,
}

impl AppState {
    /// Wire every service from the loaded config and the host platform's
    /// adapters, then start the scheduler. Must be called inside a tokio
    /// runtime.
    pub fn new(config: Config, adapters: Vec<Arc<dyn PlatformAdapter>>) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        let moviepilot = Arc::new(MoviepilotClient::with_client(
            http_client.clone(),
            &config.moviepilot.base_url,
            &config.moviepilot.username,
            &config.moviepilot.password,
        ));
        let emby = Arc::new(EmbyClient::with_client(
            http_client,
            &config.emby.base_url,
            &config.emby.api_key,
            config.emby.user_id.clone(),
            config.emby.max_results,
        ));

        let catalog: Arc<dyn CatalogClient> =
            Arc::new(MoviepilotCatalog::new(Arc::clone(&moviepilot)));
        let library: Arc<dyn LibraryClient> = Arc::new(EmbyLibrary::new(emby));

        let dispatcher = Arc::new(Dispatcher::new(adapters));
        let sessions = Arc::new(SessionRegistry::new());

        let report_config = Arc::new(RwLock::new(config.report.clone()));
        let report = Arc::new(ReportService::new(
            Arc::clone(&library),
            Arc::clone(&dispatcher),
            Arc::clone(&report_config),
        ));

        let scheduler = Arc::new(SchedulerService::new().with_job(DailyReportJob::new(
            Arc::clone(&report),
            Arc::clone(&report_config),
        )));
        scheduler.start();

        Self {
            config: Arc::new(config),
            moviepilot,
            catalog,
            library,
            dispatcher,
            sessions,
            report_config,
            report,
            scheduler,
        }
    }
}
