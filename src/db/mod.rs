pub mod memory;
pub mod postgres;

pub use memory::{CatalogSnapshot, InMemoryMovieStore};
pub use postgres::{create_pool, PgMovieStore};
