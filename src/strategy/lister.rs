//! Concurrent fan-out over root scopes with a positional, fail-fast join.

use crate::cloud::traits::{CloudResult, Scope};
use crate::context::{Bound, ClientContext, bind_all};
use crate::executor::Executor;
use slog::{Logger, debug, o, warn};
use std::sync::Arc;
use std::time::Instant;

/// Lists a dependent collection across many scopes at once.
///
/// One task is submitted per scope on the shared [`Executor`]; the call blocks
/// until every task has completed or one of them failed.
#[derive(Debug, Clone)]
pub struct FanOutLister {
    executor: Executor,
    logger: Logger,
}

impl FanOutLister {
    pub fn new(executor: Executor, logger: Logger) -> Self {
        Self { executor, logger }
    }

    #[must_use]
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Call `list` once per scope, concurrently, and concatenate the results.
    ///
    /// Results follow the order of `scopes`, not the order in which the
    /// remote calls completed. Duplicates across scopes are kept.
    ///
    /// # Errors
    ///
    /// Returns the error of the first scope to fail, as soon as it fails;
    /// results of the other scopes are discarded.
    pub fn list_all<S, R, F>(&self, scopes: Vec<S>, list: F) -> CloudResult<Vec<R>>
    where
        S: Scope + Send + 'static,
        R: Send + 'static,
        F: Fn(&S) -> CloudResult<Vec<R>> + Send + Sync + 'static,
    {
        if scopes.is_empty() {
            debug!(self.logger, "No scopes to fan out over");
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let count = scopes.len();
        let logger = self.logger.clone();
        let per_scope = self.executor.join_all(scopes, move |scope| {
            let result = list(&scope);
            match &result {
                Ok(items) => debug!(
                    logger, "Scope listed";
                    "scope" => scope.scope_id(), "items" => items.len()
                ),
                Err(error) => warn!(
                    logger, "Scope listing failed";
                    "scope" => scope.scope_id(), "error" => %error
                ),
            }
            result
        })?;

        let items: Vec<R> = per_scope.into_iter().flatten().collect();
        debug!(
            self.logger, "Fan-out joined";
            "scopes" => count,
            "items" => items.len(),
            "elapsed" => ?started.elapsed()
        );
        Ok(items)
    }

    /// Two fan-outs in sequence: roots to intermediate scopes, then
    /// intermediate scopes to leaves.
    ///
    /// The second fan-out starts only once the first one has fully joined.
    ///
    /// # Errors
    ///
    /// Returns the first failure of either level.
    pub fn list_chained<S, M, R, F, G>(&self, roots: Vec<S>, first: F, second: G) -> CloudResult<Vec<R>>
    where
        S: Scope + Send + 'static,
        M: Scope + Send + 'static,
        R: Send + 'static,
        F: Fn(&S) -> CloudResult<Vec<M>> + Send + Sync + 'static,
        G: Fn(&M) -> CloudResult<Vec<R>> + Send + Sync + 'static,
    {
        let intermediate = self.list_all(roots, first)?;
        self.list_all(intermediate, second)
    }

    /// Fan out, bind every result to `context`, then keep those matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed scope.
    pub fn list_bound_matching<S, R, F, P>(
        &self,
        context: &Arc<ClientContext>,
        scopes: Vec<S>,
        list: F,
        filter: P,
    ) -> CloudResult<Vec<Bound<R>>>
    where
        S: Scope + Send + 'static,
        R: Send + 'static,
        F: Fn(&S) -> CloudResult<Vec<R>> + Send + Sync + 'static,
        P: Fn(&Bound<R>) -> bool,
    {
        let items = self.list_all(scopes, list)?;
        Ok(keep_matching(bind_all(context, items), filter))
    }

    /// [`list_chained`](Self::list_chained), then bind and filter the leaves
    /// like [`list_bound_matching`](Self::list_bound_matching).
    ///
    /// # Errors
    ///
    /// Returns the first failure of either level.
    pub fn list_chained_bound_matching<S, M, R, F, G, P>(
        &self,
        context: &Arc<ClientContext>,
        roots: Vec<S>,
        first: F,
        second: G,
        filter: P,
    ) -> CloudResult<Vec<Bound<R>>>
    where
        S: Scope + Send + 'static,
        M: Scope + Send + 'static,
        R: Send + 'static,
        F: Fn(&S) -> CloudResult<Vec<M>> + Send + Sync + 'static,
        G: Fn(&M) -> CloudResult<Vec<R>> + Send + Sync + 'static,
        P: Fn(&Bound<R>) -> bool,
    {
        let intermediate = self.list_all(roots, first)?;
        self.list_bound_matching(context, intermediate, second, filter)
    }

    /// A logger scoped to one strategy.
    pub(crate) fn child_logger(&self, strategy: &'static str) -> Logger {
        self.logger.new(o!("strategy" => strategy))
    }
}

/// Apply a filter after flattening, preserving order.
fn keep_matching<R, P>(items: Vec<Bound<R>>, filter: P) -> Vec<Bound<R>>
where
    P: Fn(&Bound<R>) -> bool,
{
    items.into_iter().filter(|item| filter(item)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::traits::{CloudError, ErrorKind};
    use crate::logging;

    struct Zone(u32);

    impl Scope for Zone {
        fn scope_id(&self) -> String {
            format!("zone/{}", self.0)
        }
    }

    fn lister() -> FanOutLister {
        FanOutLister::new(Executor::new(4).unwrap(), logging::discard())
    }

    #[test]
    fn empty_scopes_submit_nothing() {
        let result: Vec<u32> = lister()
            .list_all(Vec::<Zone>::new(), |_| panic!("no task expected"))
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn duplicates_across_scopes_are_kept() {
        let result = lister()
            .list_all(vec![Zone(1), Zone(2)], |_| Ok(vec![7, 7]))
            .unwrap();
        assert_eq!(result, vec![7, 7, 7, 7]);
    }

    #[test]
    fn second_level_not_started_after_first_level_failure() {
        let result: CloudResult<Vec<u32>> = lister().list_chained(
            vec![Zone(1), Zone(2)],
            |zone| {
                if zone.0 == 2 {
                    Err(CloudError::new(ErrorKind::Timeout, "slow zone"))
                } else {
                    Ok(vec![Zone(10)])
                }
            },
            |_| panic!("second level must not run"),
        );
        assert_eq!(result.unwrap_err().kind, ErrorKind::Timeout);
    }

    #[test]
    fn failing_scope_does_not_wait_for_slow_sibling() {
        let lister = FanOutLister::new(Executor::new(2).unwrap(), logging::discard());
        let started = Instant::now();
        let result: CloudResult<Vec<u32>> = lister.list_all(vec![Zone(1), Zone(2)], |zone| {
            if zone.0 == 2 {
                return Err(CloudError::new(ErrorKind::Network, "zone unreachable"));
            }
            std::thread::sleep(std::time::Duration::from_secs(3));
            Ok(vec![zone.0])
        });
        assert_eq!(result.unwrap_err().kind, ErrorKind::Network);
        assert!(started.elapsed() < std::time::Duration::from_millis(1_500));
    }

    #[test]
    fn chained_leaves_are_bound_and_filtered() {
        let context = ClientContext::new(
            "fake",
            "http://localhost",
            Arc::new(crate::cloud::fake::FakeCredentials::new("user", "secret")),
        )
        .unwrap();
        let evens = lister()
            .list_chained_bound_matching(
                &context,
                vec![Zone(1), Zone(2)],
                |zone| Ok(vec![Zone(zone.0 * 10), Zone(zone.0 * 10 + 1)]),
                |zone| Ok(vec![zone.0]),
                |n| **n % 2 == 0,
            )
            .unwrap();
        assert_eq!(evens.iter().map(|n| **n).collect::<Vec<_>>(), vec![10, 20]);
        assert!(Arc::ptr_eq(evens[0].context(), &context));
    }
}
