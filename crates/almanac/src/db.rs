//! Database connection utilities.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

/// Pragmas applied to file-backed SQLite databases.
///
/// WAL keeps readers from blocking the writer, the busy timeout waits out
/// short lock contention, and NORMAL sync is safe under WAL.
const SQLITE_PRAGMAS: [&str; 3] = [
    "PRAGMA journal_mode=WAL",
    "PRAGMA busy_timeout=5000",
    "PRAGMA synchronous=NORMAL",
];

async fn configure_sqlite(db: &DatabaseConnection) -> Result<(), DbErr> {
    for pragma in SQLITE_PRAGMAS {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            pragma.to_string(),
        ))
        .await?;
    }
    Ok(())
}

/// Whether `database_url` names an on-disk SQLite database.
///
/// In-memory databases (`sqlite::memory:`) skip the pragmas.
fn is_sqlite_file(database_url: &str) -> bool {
    database_url.starts_with("sqlite://") && !database_url.contains(":memory:")
}

/// Establish a connection to the database.
///
/// # Arguments
/// * `database_url` - Database connection string (e.g., `sqlite:///path/to/almanac.db?mode=rwc`,
///   `sqlite::memory:` or `postgres:///almanac`)
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    if is_sqlite_file(database_url) {
        configure_sqlite(&db).await?;
    }

    Ok(db)
}

/// Establish a connection to the database and run all pending migrations.
///
/// # Errors
/// Returns `DbErr` if the connection cannot be established or migrations fail.
///
/// # Example
/// ```ignore
/// let db = almanac::connect_and_migrate("sqlite::memory:").await?;
/// ```
#[cfg(feature = "migrate")]
pub async fn connect_and_migrate(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    use sea_orm_migration::MigratorTrait;

    let db = connect(database_url).await?;
    crate::migration::Migrator::up(&db, None).await?;
    tracing::debug!("Database migrations applied");
    Ok(db)
}
