use actix_web::{App, HttpServer, web};
use shopping_expense_api::data::mongo::{
    MongoShoppingListRepository, MongoShoppingRepository, MongoUserRepository, connect,
};
use shopping_expense_api::infrastructure::config::Config;
use shopping_expense_api::infrastructure::logging::init_logging;
use shopping_expense_api::presentation::handlers::AppState;
use shopping_expense_api::presentation::middleware::{RequestLogger, cors};
use shopping_expense_api::presentation::routes::configure;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Logging initialized");

    let config = Config::from_env()?;

    info!(database = %config.db_name, "Connecting to MongoDB");
    let database = connect(&config.mongodb_uri, &config.db_name).await?;

    let state = web::Data::new(AppState::new(
        Arc::new(MongoUserRepository::new(&database)),
        Arc::new(MongoShoppingRepository::new(&database)),
        Arc::new(MongoShoppingListRepository::new(&database)),
        config.jwt_secret.clone(),
    ));

    let jwt_secret = config.jwt_secret.clone();
    let origins = config.cors_origins.clone();
    let server = HttpServer::new(move || {
        tracing::trace!("Creating new application instance");
        App::new()
            .app_data(state.clone())
            .wrap(cors(&origins))
            .wrap(RequestLogger)
            .configure(|cfg| configure(cfg, &jwt_secret))
    });

    let bind_addr = config.socket_addr();
    let server = server.bind(bind_addr)?;
    info!(address = %bind_addr, "server is running");
    server.run().await?;
    Ok(())
}
