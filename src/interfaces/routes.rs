use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{
    constants::MULTIPART_TOTAL_LIMIT,
    handlers::{home::home, system::health_check},
};

mod json_error;
mod media;
mod projects;
mod technologies;
mod timeline;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);
    cfg.service(health_check);

    cfg.configure(media::config_routes)
        .configure(projects::config_routes)
        .configure(technologies::config_routes)
        .configure(timeline::config_routes);

    cfg.configure(json_error::config_routes);
    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(MULTIPART_TOTAL_LIMIT)
            .memory_limit(1024 * 1024),
    );
}
