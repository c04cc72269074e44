//! Fleet repository backends
//!
//! The maintenance engine only ever sees snapshots handed over through
//! [`FleetRepository`]; everything durable lives behind it.

mod persistence;
mod sled_repo;

pub use persistence::{FleetRepository, InMemoryRepository, RepositoryError};
pub use sled_repo::SledRepository;
