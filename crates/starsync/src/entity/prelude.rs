//! Common re-exports for convenient entity usage.

pub use super::starred_repo::{
    ActiveModel as StarredRepoActiveModel, Column as StarredRepoColumn, Entity as StarredRepo,
    Model as StarredRepoModel,
};
