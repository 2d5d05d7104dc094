use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod shared_repos;

pub use domain::{entities, object_key, use_cases};
pub use interfaces::{handlers, middlewares, repositories, routes};
pub use infrastructure::{auth, db, storage, utils};

use auth::jwt::JwtService;
use repositories::media_store::MediaStorage;
use shared_repos::SharedRepositories;
use use_cases::{
    media::MediaHandler,
    project::ProjectHandler,
    technology::TechnologyHandler,
    timeline::TimelineHandler,
};

pub struct AppState {
    pub media_handler: Arc<MediaHandler>,
    pub project_handler: ProjectHandler,
    pub technology_handler: TechnologyHandler,
    pub timeline_handler: TimelineHandler,
    pub jwt_service: JwtService,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, repos: SharedRepositories, storage: Arc<dyn MediaStorage>) -> Self {
        let media_handler = Arc::new(MediaHandler::new(
            repos.media.clone(),
            storage,
            config.s3_bucket.clone(),
        ));

        let project_handler = ProjectHandler::new(
            repos.projects.clone(),
            repos.media.clone(),
            repos.technologies.clone(),
            media_handler.clone(),
        );

        AppState {
            media_handler,
            project_handler,
            technology_handler: TechnologyHandler::new(repos.technologies),
            timeline_handler: TimelineHandler::new(repos.timeline),
            jwt_service: JwtService::new(config),
        }
    }
}
