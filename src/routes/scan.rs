use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

use crate::email::EmailNotifier;
use crate::scan::run_daily_scan;

/// Manual trigger for operational testing. Fire-and-forget: the scan runs
/// in the background and the response never waits on deliveries.
#[tracing::instrument(name = "Manual birthday scan trigger", skip(db_pool, notifier))]
pub async fn handle_trigger_scan(
    db_pool: web::Data<PgPool>,
    notifier: web::Data<EmailNotifier>,
) -> impl Responder {
    let db_pool = db_pool.get_ref().clone();
    let notifier = notifier.into_inner();

    tokio::spawn(async move {
        run_daily_scan(&db_pool, &notifier).await;
    });

    HttpResponse::Ok().json(serde_json::json!({ "message": "Birthday scan triggered manually" }))
}
