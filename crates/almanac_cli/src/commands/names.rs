use almanac::catalog::{ItemNames, NameEntry};

use crate::commands::shared::{SyncArgs, build_sync, split_result};
use crate::config::Config;

pub(crate) async fn handle_names(
    args: SyncArgs,
    limit: Option<usize>,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync = build_sync(config, database_url, &args).await?;

    let (names, failure) = split_result(sync.resolve_item_names().await, |err| {
        err.partial_names().cloned()
    })?;

    let shown = limited(&names, limit);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        for (id, entry) in &shown {
            println!("{}", format_name(*id, entry));
        }
        println!("{} of {} name(s)", shown.len(), names.len());
    }

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// The first `limit` names by id, or all of them.
fn limited(names: &ItemNames, limit: Option<usize>) -> ItemNames {
    let take = limit.unwrap_or(names.len());
    names
        .iter()
        .take(take)
        .map(|(id, entry)| (*id, entry.clone()))
        .collect()
}

fn format_name(id: i64, entry: &NameEntry) -> String {
    match &entry.category {
        Some(category) => format!("{id:>10}  {}  ({category})", entry.name),
        None => format!("{id:>10}  {}", entry.name),
    }
}
