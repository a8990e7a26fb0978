use actix_web::middleware::NormalizePath;
use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use log::info;
use wisebite::auth::AuthLayer;
use wisebite::{api, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("Failed to load .env file: {}", e);
    }

    // Setup logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    info!("Initializing database connection pool...");
    let state = AppState::new(&database_url).await;

    // Server configuration
    const HOST: &str = "127.0.0.1";
    const PORT: u16 = 8080;

    info!("Starting server at http://{}:{}", HOST, PORT);

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(AuthLayer::new(state.auth_cfg.clone()))
            .app_data(web::JsonConfig::default().error_handler(api::default_error_handler))
            .configure(|cfg| api::configure(cfg, &state))
    })
    .bind((HOST, PORT))?
    .run()
    .await
}
