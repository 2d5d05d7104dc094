use actix_web::web;

use crate::handlers::timeline;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/timeline-events")
            .service(
                web::resource("")
                    .route(web::get().to(timeline::list_events))
                    .route(web::post().to(timeline::create_event))
            )
            .service(
                web::resource("/type/{kind}")
                    .route(web::get().to(timeline::list_events_by_type))
            )
            .service(
                web::resource("/{event_id}")
                    .route(web::get().to(timeline::get_event))
                    .route(web::put().to(timeline::update_event))
                    .route(web::delete().to(timeline::delete_event))
            )
    );
}
