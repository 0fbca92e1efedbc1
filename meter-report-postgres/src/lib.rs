pub mod executor;
pub mod postgres_repositories;
pub mod repository;
pub mod unit_of_work;
pub mod utils;

pub use executor::Executor;
pub use postgres_repositories::PostgresRepositories;
pub use unit_of_work::{PgSession, PgUnitOfWork};

#[cfg(test)]
pub mod test_helper;
