//! Connection pool and migrations.

pub mod pool;

pub use pool::{create_lazy_pool, create_pool, run_migrations, Database, DatabaseError};
