use std::process::ExitCode;
use std::time::Duration;

use actix_identity::IdentityMiddleware;
use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer, web};
use config::{Config, Environment, File};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use pushkind_eventos::db::establish_connection_pool_with_timeout;
use pushkind_eventos::models::config::ServerConfig;
use pushkind_eventos::repository::DieselRepository;
use pushkind_eventos::routes;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Minimum secret length accepted by [`Key::derive_from`].
const MIN_SECRET_LEN: usize = 32;

fn load_config() -> Result<ServerConfig, config::ConfigError> {
    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server_config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if server_config.secret.len() < MIN_SECRET_LEN {
        log::error!("Configured secret must be at least {MIN_SECRET_LEN} bytes");
        return ExitCode::FAILURE;
    }

    let pool = match establish_connection_pool_with_timeout(
        &server_config.database_url,
        Duration::from_secs(server_config.db_timeout_secs),
    ) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            return ExitCode::FAILURE;
        }
    };

    match pool.get() {
        Ok(mut conn) => {
            if let Err(e) = conn.run_pending_migrations(MIGRATIONS) {
                log::error!("Failed to run migrations: {e}");
                return ExitCode::FAILURE;
            }
        }
        Err(e) => {
            log::error!("Failed to get a connection for migrations: {e}");
            return ExitCode::FAILURE;
        }
    }

    let repo = DieselRepository::new(pool);
    let secret_key = Key::derive_from(server_config.secret.as_bytes());
    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!(
        "Starting server on {}:{}",
        server_config.address,
        server_config.port
    );

    let server = HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .wrap(Logger::default())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
            .configure(routes::configure)
    })
    .bind(bind_address);

    let result = match server {
        Ok(server) => server.run().await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {e}");
            ExitCode::FAILURE
        }
    }
}
