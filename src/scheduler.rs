use std::sync::Arc;

use chrono::Local;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::email::EmailNotifier;
use crate::scan::run_daily_scan;

/// Seconds / minutes / hours / day-of-month / month / day-of-week:
/// every day at 07:00 local time.
pub const DAILY_SCAN_SCHEDULE: &str = "0 0 7 * * *";

/// Registers and starts the daily scan job. The returned scheduler handle
/// must be kept alive for the lifetime of the process.
pub async fn start_daily_scheduler(
    db_pool: PgPool,
    notifier: Arc<EmailNotifier>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_async_tz(DAILY_SCAN_SCHEDULE, Local, move |_id, _scheduler| {
        let db_pool = db_pool.clone();
        let notifier = notifier.clone();

        Box::pin(async move {
            tracing::info!("Running daily birthday scan");
            run_daily_scan(&db_pool, &notifier).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    Ok(scheduler)
}
