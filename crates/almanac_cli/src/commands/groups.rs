use almanac::catalog::MarketGroup;

use crate::commands::shared::{SyncArgs, build_sync, split_result};
use crate::config::Config;

pub(crate) async fn handle_groups(
    args: SyncArgs,
    config: &Config,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let sync = build_sync(config, database_url, &args).await?;

    let (groups, failure) = split_result(sync.resolve_market_groups().await, |err| {
        err.partial_groups().map(<[MarketGroup]>::to_vec)
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        print_groups(&groups);
    }

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_groups(groups: &[MarketGroup]) {
    for group in groups {
        println!("{}", format_group(group));
    }
    println!("{} market group(s)", groups.len());
}

fn format_group(group: &MarketGroup) -> String {
    let parent = group
        .parent_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>6}  parent {:>6}  {:<40}  {} type(s)",
        group.id,
        parent,
        group.name,
        group.member_ids.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_root_group() {
        let group = MarketGroup {
            id: 2,
            name: "Blueprints".to_string(),
            description: String::new(),
            parent_id: None,
            member_ids: vec![],
        };
        let line = format_group(&group);
        assert!(line.contains("parent      -"));
        assert!(line.contains("Blueprints"));
        assert!(line.ends_with("0 type(s)"));
    }

    #[test]
    fn format_child_group_counts_members() {
        let group = MarketGroup {
            id: 18,
            name: "Minerals".to_string(),
            description: String::new(),
            parent_id: Some(1857),
            member_ids: vec![34, 35, 36],
        };
        let line = format_group(&group);
        assert!(line.contains("1857"));
        assert!(line.ends_with("3 type(s)"));
    }
}
