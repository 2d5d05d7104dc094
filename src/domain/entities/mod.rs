pub mod media;
pub mod option_fields;
pub mod project;
pub mod technology;
pub mod timeline_event;
pub mod token;
