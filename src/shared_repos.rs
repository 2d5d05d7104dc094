use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    db::memory::InMemoryDatabase,
    repositories::{
        media::MediaRepository,
        project::ProjectRepository,
        sqlx_repo::{SqlxMediaRepo, SqlxProjectRepo, SqlxTechnologyRepo, SqlxTimelineRepo},
        technology::TechnologyRepository,
        timeline::TimelineRepository,
    },
};

#[derive(Clone)]
pub struct SharedRepositories {
    pub media: Arc<dyn MediaRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub technologies: Arc<dyn TechnologyRepository>,
    pub timeline: Arc<dyn TimelineRepository>,
}

impl SharedRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        SharedRepositories {
            media: Arc::new(SqlxMediaRepo::new(pool.clone())),
            projects: Arc::new(SqlxProjectRepo::new(pool.clone())),
            technologies: Arc::new(SqlxTechnologyRepo::new(pool.clone())),
            timeline: Arc::new(SqlxTimelineRepo::new(pool)),
        }
    }

    /// All four repositories over one shared in-process table set.
    pub fn in_memory() -> Self {
        let db = Arc::new(InMemoryDatabase::new());

        SharedRepositories {
            media: db.clone(),
            projects: db.clone(),
            technologies: db.clone(),
            timeline: db,
        }
    }
}
