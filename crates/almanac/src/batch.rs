//! Round-based concurrent execution.

use std::future::Future;

use futures::future::join_all;

/// Run `op` over `items` in sequential rounds of at most `width` concurrent
/// operations.
///
/// Round `k + 1` starts only after every operation of round `k` has settled,
/// so a single slow item holds up its whole round. Outcomes are returned in
/// input order and a failure never cancels its siblings. A `width` of zero is
/// treated as one.
pub async fn run_in_rounds<T, R, E, F, Fut>(items: Vec<T>, width: usize, op: F) -> Vec<Result<R, E>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let width = width.max(1);
    let mut outcomes = Vec::with_capacity(items.len());
    let mut remaining = items.into_iter().peekable();

    while remaining.peek().is_some() {
        let round: Vec<Fut> = remaining.by_ref().take(width).map(&op).collect();
        outcomes.extend(join_all(round).await);
    }

    outcomes
}
