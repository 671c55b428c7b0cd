//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use tracing::warn;

#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::{
    Cache, FixtureTokenVerifier, FixtureUserDirectory, InMemoryLedger, NoOpCache,
};
use crate::domain::{DirectoryUsersService, HierarchyService, PointsService};
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http;
use crate::inbound::http::state::HttpState;
use crate::middleware::RequestLog;
use crate::outbound::cache::RedisCache;
use crate::outbound::persistence::{
    DieselLedgerRepository, DieselTokenVerifier, DieselUserDirectory,
};

async fn build_cache(redis_url: Option<&str>) -> Arc<dyn Cache> {
    let Some(url) = redis_url else {
        return Arc::new(NoOpCache);
    };
    match RedisCache::connect(url).await {
        Ok(cache) => Arc::new(cache),
        Err(error) => {
            // The cache is an optimisation; a dead Redis must not stop the
            // server from coming up.
            warn!(%error, "redis unavailable, balance caching disabled");
            Arc::new(NoOpCache)
        }
    }
}

/// Build the HTTP dependency bundle from configuration.
///
/// With a database pool every port is Diesel-backed; without one the server
/// runs on empty in-memory fixtures, which only makes sense for local
/// development and tests.
async fn build_http_state(config: &ServerConfig) -> HttpState {
    let cache = build_cache(config.redis_url.as_deref()).await;
    match &config.db_pool {
        Some(pool) => {
            let ledger = Arc::new(DieselLedgerRepository::new(pool.clone()));
            let directory = Arc::new(DieselUserDirectory::new(pool.clone()));
            let points = Arc::new(PointsService::new(ledger, cache));
            HttpState {
                points: points.clone(),
                points_query: points,
                hierarchy: Arc::new(HierarchyService::new(Arc::clone(&directory))),
                users: Arc::new(DirectoryUsersService::new(directory)),
                tokens: Arc::new(DieselTokenVerifier::new(pool.clone())),
            }
        }
        None => {
            warn!("no database pool configured, serving from empty fixtures");
            let ledger = Arc::new(InMemoryLedger::new());
            let directory = Arc::new(FixtureUserDirectory::default());
            let points = Arc::new(PointsService::new(ledger, cache));
            HttpState {
                points: points.clone(),
                points_query: points,
                hierarchy: Arc::new(HierarchyService::new(Arc::clone(&directory))),
                users: Arc::new(DirectoryUsersService::new(directory)),
                tokens: Arc::new(FixtureTokenVerifier::new()),
            }
        }
    }
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub async fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config).await);

    let server = HttpServer::new(move || {
        let app = App::new()
            .app_data(http_state.clone())
            .wrap(RequestLog)
            .configure(http::configure);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
        #[cfg(not(debug_assertions))]
        let app = app;

        app
    })
    .bind(config.bind_addr)?
    .run();

    Ok(server)
}
