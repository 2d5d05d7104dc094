pub mod extractors;
pub mod media;
pub mod project;
pub mod technology;
pub mod timeline;
