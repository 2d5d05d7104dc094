pub mod home;
pub mod media;
pub mod projects;
pub mod system;
pub mod technologies;
pub mod timeline;
