use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::from_fn, web};
use tracing::info;

use linkhop::analytics::ClickRecorder;
use linkhop::api::{AppStartTime, admin_routes, health_routes, redirect_routes, verify_rate_limiter};
use linkhop::api::middleware::AuthMiddleware;
use linkhop::config::init_config;
use linkhop::services::Resolver;
use linkhop::storage::{UrlStore, infer_backend_from_url};
use linkhop::system::init_logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    dotenvy::dotenv().ok();

    let config = init_config();

    // keep the guard alive so buffered log lines are flushed on shutdown
    let _log_guard = init_logging(&config.logging);

    let backend = infer_backend_from_url(&config.database.database_url)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let store = Arc::new(
        UrlStore::new(&config.database.database_url, &backend)
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?,
    );

    let resolver = Arc::new(Resolver::new(Arc::clone(&store)));
    let recorder = Arc::new(ClickRecorder::new(store.as_click_sink()));

    if config.api.admin_token.is_empty() {
        info!("Admin API is disabled (api.admin_token not set)");
    } else {
        info!("Admin API available at: /admin");
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&store)))
            .app_data(web::Data::new(Arc::clone(&resolver)))
            .app_data(web::Data::new(Arc::clone(&recorder)))
            .app_data(web::Data::new(app_start_time.clone()))
            .service(admin_routes().wrap(from_fn(AuthMiddleware::admin_auth)))
            .service(health_routes())
            // the catch-all redirect scope goes last; password attempts are
            // rate-limited, plain redirects are not
            .service(redirect_routes().wrap(verify_rate_limiter()))
    })
    .workers(config.server.cpu_count)
    .bind(bind_address)?
    .run()
    .await
}
