use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::config::{DatabaseSettings, Settings};
use crate::email::EmailNotifier;
use crate::routes::{
    handle_create_birthday, handle_delete_birthday, handle_list_birthdays, handle_trigger_scan,
    health_check,
};

pub struct Application {
    port: u16,
    server: Server,
    db_pool: PgPool,
    notifier: Arc<EmailNotifier>,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, std::io::Error> {
        let db_pool = get_connection_db_pool(&config.database);
        let notifier = Arc::new(EmailNotifier::new(config.email()));

        // Non-fatal: a failed handshake only leaves the notifier unverified.
        notifier.initialize().await;

        let listener =
            TcpListener::bind(config.get_address()).expect("Failed to bind the address.");
        let port = listener.local_addr().unwrap().port();
        let server = run(listener, db_pool.clone(), notifier.clone())?;

        Ok(Self {
            port,
            server,
            db_pool,
            notifier,
        })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_db_pool(&self) -> PgPool {
        self.db_pool.clone()
    }

    pub fn get_notifier(&self) -> Arc<EmailNotifier> {
        self.notifier.clone()
    }

    pub async fn run_until_stop(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    db_pool: PgPool,
    notifier: Arc<EmailNotifier>,
) -> Result<Server, std::io::Error> {
    let db_pool = web::Data::new(db_pool);
    let notifier: web::Data<EmailNotifier> = web::Data::from(notifier);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .route("/records", web::post().to(handle_create_birthday))
            .route("/records", web::get().to(handle_list_birthdays))
            .route("/records/{id}", web::delete().to(handle_delete_birthday))
            .route("/scan-test", web::get().to(handle_trigger_scan))
            .app_data(db_pool.clone())
            .app_data(notifier.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
