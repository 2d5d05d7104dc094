use actix_web::web;

use crate::handlers::technologies;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/technologies")
            .service(
                web::resource("")
                    .route(web::get().to(technologies::list_technologies))
                    .route(web::post().to(technologies::create_technology))
            )
            .service(
                web::resource("/{technology_id}")
                    .route(web::get().to(technologies::get_technology))
                    .route(web::put().to(technologies::update_technology))
                    .route(web::delete().to(technologies::delete_technology))
            )
    );
}
