//! Main entry point for the Yelp Camp server.
//! Serves the server-rendered campground pages and their static assets.

use std::{path::Path, sync::Arc, time::Duration};

use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use auth_services::jwt::JwtService;
use auth_services::memory::MemoryAccountStore;
use auth_services::middleware::{PrincipalMiddleware, session_key, session_layer};
use auth_services::service::AuthService;
use auth_services::store::{AccountStore, PgAccountStore};
use listing_services::memory::MemoryListingStore;
use listing_services::service::{CampgroundService, ReviewService};
use listing_services::store::{CampgroundStore, PgListingStore, ReviewStore};
use postgres::database::*;
use web_handlers::method_override::MethodOverride;
use web_handlers::{configure, not_found};

mod config;

use config::{DEFAULT_SESSION_SECRET, ServerConfig, StoreBackend};

const CONNECTION_CHECK_INTERVAL: Duration = Duration::from_secs(30);

struct Stores {
    accounts: Arc<dyn AccountStore>,
    campgrounds: Arc<dyn CampgroundStore>,
    reviews: Arc<dyn ReviewStore>,
}

async fn create_stores(config: &ServerConfig) -> anyhow::Result<Stores> {
    match config.store_backend {
        StoreBackend::Memory => {
            log::warn!("💾 Using in-memory stores; data is lost on restart");
            let listings = Arc::new(MemoryListingStore::new());

            Ok(Stores {
                accounts: Arc::new(MemoryAccountStore::new()),
                campgrounds: listings.clone(),
                reviews: listings,
            })
        }
        StoreBackend::Postgres => {
            let pool = create_connection_pool(&config.database)
                .context("Failed to create database pool")?;
            log::info!("🗃️ Database pool created successfully");

            let migrated = match test_connection(&pool).await {
                Ok(()) => match run_migrations(&pool).await {
                    Ok(()) => {
                        log::info!("✅ Database connection successful, migrations applied");
                        true
                    }
                    Err(e) => {
                        log::error!("❌ Database migrations failed: {}", e);
                        false
                    }
                },
                Err(e) => {
                    log::error!("❌ Database connection test failed: {}", e);
                    log::warn!("🔁 Serving anyway; the connection will be retried");
                    false
                }
            };

            spawn_connection_monitor(pool.clone(), CONNECTION_CHECK_INTERVAL, migrated);

            let listings = Arc::new(PgListingStore::new(pool.clone()));
            Ok(Stores {
                accounts: Arc::new(PgAccountStore::new(pool)),
                campgrounds: listings.clone(),
                reviews: listings,
            })
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting Yelp Camp server...");

    let config = ServerConfig::from_env()?;
    if config.session_secret == DEFAULT_SESSION_SECRET {
        log::warn!("🔑 SESSION_SECRET is the development default; set it in production");
    }

    let stores = create_stores(&config).await?;

    let jwt = JwtService::new(&config.session_secret, config.session_ttl);
    let auth_service = web::Data::new(
        AuthService::new(stores.accounts.clone(), jwt, config.bcrypt_cost)
            .context("Failed to initialize account service")?,
    );
    let campground_service = web::Data::new(CampgroundService::new(
        stores.campgrounds.clone(),
        stores.reviews.clone(),
        stores.accounts,
    ));
    let review_service = web::Data::new(ReviewService::new(stores.campgrounds, stores.reviews));

    let public_dir = config.public_dir.clone();
    let cookie_key = session_key(&config.session_secret);
    let (session_ttl, secure_cookie) = (config.session_ttl, config.session_cookie_secure);
    if !Path::new(&public_dir).exists() {
        log::warn!("📁 Static asset directory {} not found", public_dir);
    }

    let (host, port) = config.bind_address();
    log::info!("🌐 Server will be available at: http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(auth_service.clone())
            .app_data(campground_service.clone())
            .app_data(review_service.clone())
            .configure(configure)
            .service(Files::new("/public", &public_dir))
            .default_service(web::to(not_found))
            .wrap(MethodOverride)
            .wrap(PrincipalMiddleware::new(auth_service.clone()))
            .wrap(session_layer(cookie_key.clone(), session_ttl, secure_cookie))
            .wrap(Logger::default())
    })
    .bind((host, port))?
    .run()
    .await?;

    Ok(())
}
