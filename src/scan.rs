use chrono::{Datelike, Local};
use sqlx::PgPool;

use crate::email::EmailNotifier;
use crate::store;

/// One pass over the store: find every record whose date of birth matches
/// today's month and day in server-local time, then deliver a greeting to
/// each match in turn.
///
/// A store failure aborts this invocation; a failed delivery only moves on
/// to the next match. Invoking the scan twice on the same day re-sends —
/// there is no de-duplication of already-greeted records.
#[tracing::instrument(name = "Daily birthday scan", skip(db_pool, notifier))]
pub async fn run_daily_scan(db_pool: &PgPool, notifier: &EmailNotifier) {
    let today = Local::now().date_naive();

    let matches = match store::find_by_month_day(db_pool, today.month(), today.day()).await {
        Ok(matches) => matches,
        Err(err) => {
            tracing::error!("Aborting birthday scan, store query failed: {:?}", err);
            return;
        }
    };

    tracing::info!("Found {} birthdays today", matches.len());

    let mut delivered = 0;
    let mut failed = 0;
    let mut skipped = 0;

    for record in &matches {
        if !notifier.is_configured() {
            tracing::info!(
                "Would send greeting to {} (email not configured)",
                record.email.as_ref()
            );
            skipped += 1;
            continue;
        }

        // One delivery at a time: each send, retries included, finishes
        // before the next record starts.
        if notifier.deliver(record).await {
            delivered += 1;
        } else {
            failed += 1;
        }
    }

    tracing::info!(
        matched = matches.len(),
        delivered,
        failed,
        skipped,
        "Birthday scan finished"
    );
}
