use std::io::Write;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Builder;
use log::info;

use crate::config::CONFIG;
use crate::registry::{InMemoryStore, UserStore};
use crate::routes::init;

pub struct AppState {
    pub registry: Arc<dyn UserStore>,
}

pub async fn server() -> std::io::Result<()> {
    dotenv().ok();

    // Build the log format
    Builder::from_env(env_logger::Env::default().default_filter_or(&CONFIG.log_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                chrono::Local::now().format("%Y-%m-%d - %H:%M:%S").to_string(),
                record.args()
            )
        })
        .init();

    // Registry lifetime = process lifetime; nothing survives a restart.
    let registry: Arc<dyn UserStore> = Arc::new(InMemoryStore::default());

    info!("🚀 Sign-up Service Started Successfully");
    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(AppState {
                registry: registry.clone(),
            }))
            .configure(init)
    });
    server.bind(&CONFIG.server)?.run().await
}
