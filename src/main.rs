use birthday_service::config::get_configuration;
use birthday_service::scheduler::start_daily_scheduler;
use birthday_service::startup::Application;
use birthday_service::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(String::from("birthday_service"), String::from("info"));

    init_subscriber(subscriber);

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config).await?;

    let _scheduler = start_daily_scheduler(application.get_db_pool(), application.get_notifier())
        .await
        .expect("Failed to start the daily scan scheduler.");

    tracing::info!("Server listening on port {}", application.get_port());

    application.run_until_stop().await
}
