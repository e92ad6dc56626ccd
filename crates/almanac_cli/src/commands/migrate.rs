use almanac::db;
use almanac::migration::{Migrator, MigratorTrait};

use crate::MigrateAction;

pub(crate) async fn handle_migrate(
    action: MigrateAction,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;

    match action {
        MigrateAction::Up => {
            let pending = Migrator::get_pending_migrations(&db).await?.len();
            if pending == 0 {
                println!("Catalog schema is up to date.");
            } else {
                println!("Applying {pending} migration(s)...");
                Migrator::up(&db, None).await?;
                println!("Catalog schema ready.");
            }
        }
        MigrateAction::Down => {
            println!("Rolling back last migration (cached catalog rows are dropped)...");
            Migrator::down(&db, Some(1)).await?;
            println!("Rollback complete.");
        }
        MigrateAction::Status => {
            println!("Migration status:");
            Migrator::status(&db).await?;
        }
        MigrateAction::Fresh => {
            println!("Dropping catalog tables and reapplying migrations...");
            Migrator::fresh(&db).await?;
            println!("Fresh migration complete; the next sync refetches everything.");
        }
    }

    Ok(())
}
