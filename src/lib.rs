pub mod config;
pub mod database;
pub mod error;
pub mod fairings;
pub mod models;
pub mod routes;
pub mod rpc;
pub mod schema;
pub mod services;
pub mod state;

#[cfg(test)]
mod testutils;

use rocket::Config;
use rocket::data::{Limits, ToByteUnit};
use rocket_cors::{AllowedOrigins, CorsOptions};
use std::sync::Arc;

pub use config::{AppConfig, SharedConfig};
pub use database::DatabaseService;
pub use fairings::{ConfigReloader, RequestLogger};
pub use services::RateLimiter;
pub use state::AppState;

pub fn create_rocket() -> rocket::Rocket<rocket::Build> {
    build_rocket(AppConfig::from_env())
}

pub fn build_rocket(config: AppConfig) -> rocket::Rocket<rocket::Build> {
    let database = Arc::new(
        DatabaseService::new(&config.database_url).expect("Failed to initialize database"),
    );
    let ratelimit = Arc::new(RateLimiter::from_config(&config, Arc::clone(&database)));

    let rocket_config = Config {
        port: config.port,
        address: config.host.parse().expect("Invalid host address"),
        // multiinfo batches can carry thousands of names
        limits: Limits::default()
            .limit("string", 1.mebibytes())
            .limit("form", 1.mebibytes())
            .limit("json", 1.mebibytes()),
        ..Config::default()
    };

    let state = AppState {
        config: Arc::new(SharedConfig::new(config)),
        database,
        ratelimit,
    };

    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .to_cors()
        .expect("Failed to create CORS configuration");

    rocket::custom(&rocket_config)
        .manage(state)
        .attach(cors)
        .attach(RequestLogger)
        .attach(ConfigReloader)
        .mount("/", routes::get_routes())
        .register("/", routes::get_catchers())
}
