use actix_web::web;

use crate::handlers::media;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/media")
            .service(
                web::resource("")
                    .route(web::get().to(media::list_media))
            )
            .service(
                web::resource("/stats")
                    .route(web::get().to(media::get_media_stats))
            )
            .service(
                web::resource("/upload")
                    .route(web::post().to(media::upload_media))
            )
            .service(
                web::resource("/{media_id}")
                    .route(web::get().to(media::get_media))
                    .route(web::patch().to(media::update_media))
                    .route(web::delete().to(media::delete_media))
            )
            .service(
                web::resource("/{media_id}/signed-url")
                    .route(web::get().to(media::get_signed_url))
                    .route(web::post().to(media::get_signed_url))
            )
    );
}
