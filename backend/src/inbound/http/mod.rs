//! HTTP inbound adapter.
//!
//! Translates the domain use-case ports into an actix-web API under
//! `/api/v1`, plus unauthenticated health probes. Handlers depend only on
//! [`state::HttpState`]; wiring concrete adapters happens in the server
//! layer.

pub mod error;
pub mod health;
pub mod hierarchy;
pub mod identity;
pub mod points;
pub mod state;
pub mod users;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::ApiResult;

use actix_web::web;

/// Register every route on a service config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::live).service(health::ready).service(
        web::scope("/api/v1")
            .service(points::earn)
            .service(points::redeem)
            .service(points::transfer)
            .service(points::balance)
            .service(points::transactions)
            .service(hierarchy::manager)
            .service(hierarchy::reports)
            .service(hierarchy::peers)
            .service(hierarchy::chain)
            .service(hierarchy::tree)
            .service(users::list)
            .service(users::get),
    );
}
