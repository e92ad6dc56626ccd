//! Helpers shared by the sync commands.

use almanac::esi::{ApiRateLimiter, EsiClient, EsiError};
use almanac::sync::{AggregateFetchError, CatalogSync, SyncError};

use crate::config::Config;
use crate::progress::LoggingReporter;

/// Options common to the `groups` and `names` commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub(crate) struct SyncArgs {
    /// Requests per round (default from config or 10)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Proactive pacing in requests per second (default from config, off if unset)
    #[arg(short = 'r', long)]
    pub requests_per_second: Option<u32>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Connect, migrate, and build a sync orchestrator from config and flags.
pub(crate) async fn build_sync(
    config: &Config,
    database_url: &str,
    args: &SyncArgs,
) -> Result<CatalogSync<EsiClient>, Box<dyn std::error::Error>> {
    let db = almanac::connect_and_migrate(database_url).await?;

    let rate_limiter = args
        .requests_per_second
        .or(config.esi.requests_per_second)
        .filter(|rps| *rps > 0)
        .map(ApiRateLimiter::new);
    let client = esi_client(config, rate_limiter)?;

    let mut options = config.sync.to_options();
    if let Some(concurrency) = args.concurrency {
        options.group_concurrency = concurrency;
        options.name_concurrency = concurrency;
    }
    let sync = CatalogSync::new(client, db)
        .with_options(options)
        .with_progress(LoggingReporter::new().into_callback());
    tracing::debug!(
        options = ?sync.options(),
        base_url = sync.source().base_url(),
        "Sync configured"
    );
    Ok(sync)
}

/// Build the ESI client, identifying the caller by component name and contact.
pub(crate) fn esi_client(
    config: &Config,
    rate_limiter: Option<ApiRateLimiter>,
) -> Result<EsiClient, EsiError> {
    let client = EsiClient::new(
        &config.esi.base_url,
        &config.esi.component_name,
        rate_limiter,
    )?;
    Ok(match config.esi.contact.as_deref() {
        Some(contact) => client.with_contact(contact),
        None => client,
    })
}

/// Log which pages of an incomplete sync failed.
pub(crate) fn warn_incomplete(err: &AggregateFetchError) {
    let failed = err.failed_keys();
    tracing::warn!(
        catalog = %err.catalog,
        failed_pages = err.failures.len(),
        failed_ids = failed.len(),
        resolved = err.partial.len(),
        "Showing partial results"
    );
    for failure in &err.failures {
        tracing::warn!(error = %failure, "Failed page");
    }
    if err.partial.is_empty() {
        tracing::warn!(catalog = %err.catalog, "Nothing could be resolved");
    }
}

/// Split a sync result into displayable data and the error to surface.
///
/// Incomplete syncs still yield their partial data so the caller can print
/// it before exiting non-zero.
pub(crate) fn split_result<T>(
    result: Result<T, SyncError>,
    partial: impl FnOnce(&AggregateFetchError) -> Option<T>,
) -> Result<(T, Option<SyncError>), SyncError> {
    match result {
        Ok(data) => Ok((data, None)),
        Err(SyncError::Incomplete(err)) => match partial(&err) {
            Some(data) => {
                warn_incomplete(&err);
                Ok((data, Some(SyncError::Incomplete(err))))
            }
            None => Err(SyncError::Incomplete(err)),
        },
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac::catalog::{CatalogKind, MarketGroup};
    use almanac::sync::{PageFailure, PartialCatalog, SyncReport};

    fn incomplete(groups: Vec<MarketGroup>) -> SyncError {
        SyncError::Incomplete(AggregateFetchError {
            catalog: CatalogKind::MarketGroups,
            failures: vec![PageFailure {
                keys: vec![7],
                error: EsiError::Status {
                    status: 502,
                    path: "/markets/groups/7/".to_string(),
                    message: "Bad Gateway".to_string(),
                },
            }],
            partial: PartialCatalog::Groups(groups),
            report: SyncReport::new(CatalogKind::MarketGroups),
        })
    }

    fn group(id: i64) -> MarketGroup {
        MarketGroup {
            id,
            name: format!("Group {id}"),
            description: String::new(),
            parent_id: None,
            member_ids: vec![],
        }
    }

    #[test]
    fn esi_client_sends_configured_contact() {
        let mut config = Config::default();
        config.esi.component_name = "industry-planner".to_string();
        config.esi.contact = Some("ops@example.com".to_string());

        let client = esi_client(&config, None).unwrap();
        assert_eq!(
            client.user_agent(),
            almanac::esi::user_agent("industry-planner", Some("ops@example.com"))
        );
        assert!(client.user_agent().ends_with("(industry-planner; ops@example.com)"));
    }

    #[test]
    fn esi_client_without_contact_names_only_the_component() {
        let client = esi_client(&Config::default(), None).unwrap();
        assert!(client.user_agent().starts_with("almanac/"));
        assert!(!client.user_agent().contains('('));
    }

    #[test]
    fn split_ok_has_no_error() {
        let (data, err) = split_result(Ok(vec![1, 2]), |_| None).unwrap();
        assert_eq!(data, vec![1, 2]);
        assert!(err.is_none());
    }

    #[test]
    fn split_incomplete_keeps_partial_data() {
        let (data, err) = split_result(Err(incomplete(vec![group(1)])), |e| {
            e.partial_groups().map(<[MarketGroup]>::to_vec)
        })
        .unwrap();
        assert_eq!(data.len(), 1);
        let failed = err
            .as_ref()
            .and_then(SyncError::as_incomplete)
            .map(AggregateFetchError::failed_keys);
        assert_eq!(failed, Some(vec![7]));
    }

    #[test]
    fn split_incomplete_with_nothing_resolved_still_yields_data() {
        let (data, err) = split_result(Err(incomplete(Vec::new())), |e| {
            e.partial_groups().map(<[MarketGroup]>::to_vec)
        })
        .unwrap();
        assert!(data.is_empty());
        let partial_empty = err
            .as_ref()
            .and_then(SyncError::as_incomplete)
            .map(|e| e.partial.is_empty());
        assert_eq!(partial_empty, Some(true));
    }

    #[test]
    fn split_source_error_passes_through() {
        let err = SyncError::Source(EsiError::Config("bad".to_string()));
        let result: Result<(Vec<MarketGroup>, _), _> = split_result(Err(err), |_| None);
        assert!(matches!(result, Err(SyncError::Source(_))));
    }
}
