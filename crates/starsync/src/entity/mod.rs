//! SeaORM entity definitions for the starsync database schema.

pub mod prelude;
pub mod starred_repo;
