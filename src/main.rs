use actix_web::{middleware, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use stories_service::handlers;
use stories_service::platform::{GatewayClient, StoriesClient};
use stories_service::services::{MediaHost, MediaPublisher, StoryAggregator, TmpFilesHost};
use stories_service::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    tracing::info!("Starting stories-service");

    // Missing session token is fatal here, never per-request
    let config = Config::from_env().expect("Failed to load configuration");

    let client: Arc<dyn StoriesClient> = Arc::new(
        GatewayClient::from_config(&config.session)
            .expect("Failed to create session gateway client"),
    );
    let host: Arc<dyn MediaHost> = Arc::new(
        TmpFilesHost::from_config(&config.host).expect("Failed to create file host client"),
    );

    let aggregator = StoryAggregator::new(client.clone());
    let publisher = MediaPublisher::new(
        aggregator.clone(),
        client,
        host,
        config.host.staging_dir.clone(),
    );

    let bind_address = (config.app.host.clone(), config.app.port);
    tracing::info!(
        host = %bind_address.0,
        port = bind_address.1,
        env = %config.app.env,
        "stories-service HTTP listening"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(aggregator.clone()))
            .app_data(web::Data::new(publisher.clone()))
            .wrap(middleware::Logger::default())
            .route("/", web::get().to(handlers::index))
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/api")
                    .route("/current", web::get().to(handlers::current_stories))
                    .route("/all", web::get().to(handlers::all_stories))
                    .route("/special", web::get().to(handlers::special_story)),
            )
    })
    .bind(bind_address)?
    .run()
    .await
}
