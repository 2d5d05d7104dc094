pub mod media;
pub mod media_store;
pub mod project;
pub mod sqlx_repo;
pub mod technology;
pub mod timeline;
