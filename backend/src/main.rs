//! Backend entry-point: wires the REST API, persistence, and OpenAPI docs.

use std::net::SocketAddr;

use clap::Parser;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::outbound::persistence::{DbPool, PoolConfig};
use backend::server::{ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Parser)]
#[command(about = "Multi-tenant points economy and organization hierarchy API")]
struct Args {
    /// Socket address to bind.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    bind_addr: SocketAddr,
    /// PostgreSQL connection URL; omit to serve from empty fixtures.
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
    /// Redis URL for the balance cache; omit to disable caching.
    #[arg(long, env = "REDIS_URL")]
    redis_url: Option<String>,
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut connection = diesel::PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Args::parse();

    let mut config = ServerConfig::new(args.bind_addr);
    if let Some(database_url) = &args.database_url {
        run_migrations(database_url)?;
        let pool = DbPool::new(PoolConfig::new(database_url.clone()))
            .await
            .map_err(|e| std::io::Error::other(format!("database pool failed: {e}")))?;
        config = config.with_db_pool(pool);
    }
    if let Some(redis_url) = args.redis_url {
        config = config.with_redis_url(redis_url);
    }

    create_server(config).await?.await
}
