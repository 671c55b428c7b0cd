//! PostgreSQL persistence adapters using Diesel.
//!
//! Concrete implementations of the domain repository ports, backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! Adapters here are thin: they translate between Diesel rows and domain
//! types and map driver errors to port errors. Business rules stay in the
//! domain services, with one deliberate exception: the posting transaction
//! in [`DieselLedgerRepository`] owns the atomicity and balance-guard
//! contracts, because only the database can enforce them under concurrency.

mod diesel_ledger_repository;
mod diesel_token_verifier;
mod diesel_user_directory;
mod error_mapping;
mod models;
mod pool;
mod schema;

pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_token_verifier::DieselTokenVerifier;
pub use diesel_user_directory::DieselUserDirectory;
pub use pool::{DbPool, PoolConfig, PoolError};
