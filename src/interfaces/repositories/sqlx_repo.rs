use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxMediaRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxProjectRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxTechnologyRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxTimelineRepo {
    pub pool: PgPool,
}
