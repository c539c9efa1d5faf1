mod catalog;
mod library;
mod report;
mod scheduler;
mod selection;

pub use catalog::{CatalogClient, MoviepilotCatalog};
pub use library::{EmbyLibrary, LibraryClient};
pub use report::{ReportService, ReportStatus};
pub use scheduler::{DailyReportJob, JobResult, SchedulerJob, SchedulerService};
pub use selection::{
    Responder, SessionHandle, SessionOutcome, SessionParams, SessionRegistry,
};
