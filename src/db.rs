use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, Statement,
};

use crate::{
    entities::{movie, movie_genre},
    error::AppResult,
};

pub async fn connect_and_init(database_url: &str) -> AppResult<DatabaseConnection> {
    let in_memory = database_url.contains(":memory:");

    let mut opts = ConnectOptions::new(database_url);
    opts.sqlx_logging(false);
    if in_memory {
        // sea-orm takes a Duration here and cannot disable these; use a span long enough
        // to never elapse (Duration::MAX would overflow sqlx's Instant arithmetic)
        let never = std::time::Duration::from_secs(100 * 365 * 24 * 60 * 60);
        // each sqlite connection would otherwise get its own empty database,
        // so the single connection must never be recycled
        opts.max_connections(1).min_connections(1).idle_timeout(never).max_lifetime(never);
    }

    let db = Database::connect(opts).await?;

    if !in_memory {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA journal_mode=WAL".to_string(),
        ))
        .await?;

        db.execute(Statement::from_string(
            db.get_database_backend(),
            "PRAGMA synchronous=NORMAL".to_string(),
        ))
        .await?;
    }

    create_schema(&db, movie::Entity).await?;
    create_schema(&db, movie_genre::Entity).await?;
    Ok(db)
}

async fn create_schema<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> AppResult<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(backend.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(backend.build(&index)).await?;
    }

    Ok(())
}
