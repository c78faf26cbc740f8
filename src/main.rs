use actix_web::{App, HttpServer, middleware::Logger, web};

use subscription_service::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    logging::init_logger,
    middlewares::create_cors,
    services::SubscriptionService,
    swagger::swagger_config,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = Config::load().expect("Failed to load configuration");

    init_logger(&config.logging);

    let pool = create_pool(&config.database)
        .await
        .expect("Failed to connect to database");
    log::info!("Connected to database successfully");

    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let subscription_service = SubscriptionService::new(pool);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(subscription_service.clone()))
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::api_config))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
