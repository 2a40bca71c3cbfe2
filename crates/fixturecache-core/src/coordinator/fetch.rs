use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::{FetchError, ResourceKey};
use crate::cache::ResourceCache;
use crate::models::Resource;
use crate::schedule::Clock;

/// Continuation invoked exactly once with the outcome of a request.
pub type Waiter<T> = Box<dyn FnOnce(Result<Vec<T>, FetchError>) + Send + 'static>;

/// Per-key fetch lifecycle.
///
/// Only `Idle` and `InFlight` are observable through [`FetchCoordinator::state`];
/// `Completed` and `Failed` mark the moment the waiter queue is drained and
/// the key is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InFlight,
    Completed,
    Failed,
}

struct Shared<T> {
    cache: Arc<ResourceCache>,
    clock: Arc<dyn Clock>,
    /// Waiter queues of keys with a fetch in flight, in arrival order
    in_flight: Mutex<HashMap<ResourceKey, Vec<Waiter<T>>>>,
}

/// De-duplicates fetches of one resource type and fans out their results.
///
/// Clone is cheap and clones share the in-flight table. All state
/// transitions happen under one mutex; the fetch itself and every waiter
/// continuation run with the mutex released.
pub struct FetchCoordinator<T: Resource> {
    shared: Arc<Shared<T>>,
}

impl<T: Resource> Clone for FetchCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Resource> FetchCoordinator<T> {
    pub fn new(cache: Arc<ResourceCache>, clock: Arc<dyn Clock>) -> Self {
        Self {
            shared: Arc::new(Shared {
                cache,
                clock,
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.shared.cache
    }

    pub fn state(&self, key: &ResourceKey) -> FetchState {
        if self.shared.lock_in_flight().contains_key(key) {
            FetchState::InFlight
        } else {
            FetchState::Idle
        }
    }

    /// Number of waiters queued on `key`
    pub fn pending(&self, key: &ResourceKey) -> usize {
        self.shared
            .lock_in_flight()
            .get(key)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Request data for `key`, delivering the outcome to `on_result`.
    ///
    /// On a cache hit `on_result` runs before this returns and `fetch` is
    /// never called. Otherwise the request either joins the fetch already in
    /// flight for `key` or becomes its leader, in which case `fetch` is
    /// spawned onto the current Tokio runtime. Must be called from within a
    /// Tokio runtime.
    pub fn request_with<F, Fut, C>(&self, key: ResourceKey, fetch: F, on_result: C)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
        C: FnOnce(Result<Vec<T>, FetchError>) + Send + 'static,
    {
        let waiter: Waiter<T> = Box::new(on_result);

        let hit = {
            let mut in_flight = self.shared.lock_in_flight();
            match self.shared.cached() {
                Some(data) => Some((data, waiter)),
                None => match in_flight.entry(key.clone()) {
                    Entry::Occupied(mut queue) => {
                        queue.get_mut().push(waiter);
                        debug!(key = %key, position = queue.get().len(), "Fetch in flight, request queued");
                        return;
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(vec![waiter]);
                        None
                    }
                },
            }
        };

        if let Some((data, waiter)) = hit {
            debug!(key = %key, category = %T::CATEGORY, count = data.len(), "Cache hit");
            notify(vec![waiter], Ok(data));
            return;
        }

        info!(key = %key, category = %T::CATEGORY, "Starting fetch");
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(async move { fetch().await })
                .catch_unwind()
                .await
            {
                Ok(Ok(data)) => Ok(data),
                Ok(Err(e)) => Err(FetchError::transport(&e)),
                Err(_) => Err(FetchError::Aborted("fetch task panicked".to_string())),
            };
            shared.complete(key, outcome);
        });
    }

    /// Future form of [`request_with`](Self::request_with).
    ///
    /// Dropping the returned future does not cancel the fetch; other waiters
    /// still receive its outcome.
    pub async fn request<F, Fut>(&self, key: ResourceKey, fetch: F) -> Result<Vec<T>, FetchError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<Vec<T>>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.request_with(key, fetch, move |result| {
            // Receiver gone means the caller stopped waiting
            let _ = tx.send(result);
        });
        rx.await.unwrap_or_else(|_| {
            Err(FetchError::Aborted(
                "request dropped before completion".to_string(),
            ))
        })
    }
}

impl<T: Resource> Shared<T> {
    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<ResourceKey, Vec<Waiter<T>>>> {
        // Critical sections never run caller code, so a poisoned map is still consistent
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self) -> Option<Vec<T>> {
        self.cache
            .get::<T>()
            .map(|cached| cached.data)
            .filter(|data| !data.is_empty())
    }

    /// Resolve the fetch for `key`: filter, cache, drain the queue, then
    /// notify every waiter in arrival order.
    fn complete(&self, key: ResourceKey, outcome: Result<Vec<T>, FetchError>) {
        let outcome = outcome.and_then(|data| {
            T::retain_current(data, self.clock.local_now()).map_err(FetchError::from)
        });

        let (waiters, state) = {
            let mut in_flight = self.lock_in_flight();
            if let Ok(data) = &outcome {
                if let Err(e) = self.cache.set::<T>(data) {
                    warn!(key = %key, category = %T::CATEGORY, error = %e, "Failed to cache fetched data");
                }
            }
            let waiters = in_flight.remove(&key).unwrap_or_default();
            let state = if outcome.is_ok() {
                FetchState::Completed
            } else {
                FetchState::Failed
            };
            (waiters, state)
        };

        match &outcome {
            Ok(data) => info!(
                key = %key,
                category = %T::CATEGORY,
                count = data.len(),
                waiters = waiters.len(),
                state = ?state,
                "Fetch resolved"
            ),
            Err(e) => warn!(
                key = %key,
                category = %T::CATEGORY,
                error = %e,
                waiters = waiters.len(),
                state = ?state,
                "Fetch resolved with error"
            ),
        }

        notify(waiters, outcome);
    }
}

/// Deliver `outcome` to each waiter in order. A panicking continuation is
/// logged and does not stop the remaining deliveries.
fn notify<T: Clone>(waiters: Vec<Waiter<T>>, outcome: Result<Vec<T>, FetchError>) {
    for waiter in waiters {
        let result = outcome.clone();
        if panic::catch_unwind(AssertUnwindSafe(move || waiter(result))).is_err() {
            warn!("Waiter continuation panicked");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, NaiveDateTime};
    use tokio::sync::mpsc;

    use crate::models::{Game, Race};
    use crate::schedule::{FixedClock, SystemClock};

    fn race(name: &str) -> Race {
        Race {
            id: 0,
            name: name.to_string(),
            circuit: None,
            country: None,
            date: None,
            time: None,
            track: None,
        }
    }

    fn game(id: i64, date: &str, time: &str) -> Game {
        Game {
            id,
            date: date.to_string(),
            time: time.to_string(),
            competition: None,
            opponent: None,
            stadium: None,
            badge_base64: None,
        }
    }

    fn reference_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn races() -> FetchCoordinator<Race> {
        FetchCoordinator::new(Arc::new(ResourceCache::in_memory()), Arc::new(SystemClock))
    }

    fn football() -> FetchCoordinator<Game> {
        FetchCoordinator::new(
            Arc::new(ResourceCache::in_memory()),
            Arc::new(FixedClock::at(reference_now())),
        )
    }

    fn key() -> ResourceKey {
        ResourceKey::new("https://example.test/api/f1")
    }

    async fn unreachable_fetch() -> anyhow::Result<Vec<Race>> {
        panic!("cache hit must not fetch")
    }

    async fn exploding_fetch() -> anyhow::Result<Vec<Race>> {
        panic!("decoder exploded")
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_fetch() {
        let coordinator = races();
        let calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = oneshot::channel::<()>();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();

        let leader_calls = Arc::clone(&calls);
        let tx = result_tx.clone();
        coordinator.request_with(
            key(),
            move || async move {
                leader_calls.fetch_add(1, Ordering::SeqCst);
                let _ = release_rx.await;
                Ok(vec![race("Monaco")])
            },
            move |result| tx.send((0, result)).unwrap(),
        );

        for i in 1..4 {
            let follower_calls = Arc::clone(&calls);
            let tx = result_tx.clone();
            coordinator.request_with(
                key(),
                move || async move {
                    follower_calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                },
                move |result| tx.send((i, result)).unwrap(),
            );
        }

        assert_eq!(coordinator.state(&key()), FetchState::InFlight);
        assert_eq!(coordinator.pending(&key()), 4);

        release_tx.send(()).unwrap();

        let mut order = Vec::new();
        for _ in 0..4 {
            let (i, result) = result_rx.recv().await.unwrap();
            assert_eq!(result.unwrap(), vec![race("Monaco")]);
            order.push(i);
        }

        assert_eq!(order, vec![0, 1, 2, 3]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.state(&key()), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_request_futures_share_one_fetch() {
        let coordinator = races();
        let calls = Arc::new(AtomicUsize::new(0));

        let requests = (0..5).map(|_| {
            let calls = Arc::clone(&calls);
            coordinator.request(key(), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![race("Suzuka"), race("Spa")])
            })
        });
        let results = futures::future::join_all(requests).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result.unwrap().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_fetch() {
        let coordinator = races();
        coordinator.cache().set(&[race("Imola")]).unwrap();

        let delivered = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&delivered);
        coordinator.request_with(
            key(),
            unreachable_fetch,
            move |result| *slot.lock().unwrap() = Some(result),
        );

        // Delivered synchronously, before any await
        let result = delivered.lock().unwrap().take().unwrap();
        assert_eq!(result.unwrap(), vec![race("Imola")]);
        assert_eq!(coordinator.state(&key()), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_failure_does_not_stick() {
        let coordinator = races();
        let calls = Arc::new(AtomicUsize::new(0));

        let first_calls = Arc::clone(&calls);
        let err = coordinator
            .request(key(), move || async move {
                first_calls.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("503 Service Unavailable"))
            })
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Transport("503 Service Unavailable".to_string()));
        assert_eq!(coordinator.state(&key()), FetchState::Idle);
        assert!(coordinator.cache().get::<Race>().is_none());

        let second_calls = Arc::clone(&calls);
        let data = coordinator
            .request(key(), move || async move {
                second_calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![race("Zandvoort")])
            })
            .await
            .unwrap();
        assert_eq!(data, vec![race("Zandvoort")]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_fans_out_to_all_waiters() {
        let coordinator = races();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();

        for i in 0..3 {
            let tx = result_tx.clone();
            coordinator.request_with(
                key(),
                || async { Err(anyhow::anyhow!("connection reset")) },
                move |result| tx.send((i, result)).unwrap(),
            );
        }

        for expected in 0..3 {
            let (i, result) = result_rx.recv().await.unwrap();
            assert_eq!(i, expected);
            assert_eq!(result.unwrap_err().to_string(), "Fetch failed: connection reset");
        }
    }

    #[tokio::test]
    async fn test_football_results_are_filtered_before_caching() {
        let coordinator = football();
        let data = coordinator
            .request(ResourceKey::new("football/arsenal"), || async {
                Ok(vec![
                    game(1, "2024-05-01", "15:00"),
                    game(2, "2024-06-01", "13:00:00"),
                    game(3, "2024-06-02", "12:00"),
                ])
            })
            .await
            .unwrap();

        let ids: Vec<i64> = data.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 3]);
        let cached = coordinator.cache().get::<Game>().unwrap();
        assert_eq!(cached.data, data);
    }

    #[tokio::test]
    async fn test_malformed_fixture_errors_every_waiter() {
        let coordinator = football();
        let fixture_key = ResourceKey::new("football/arsenal");
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();

        for _ in 0..2 {
            let tx = result_tx.clone();
            coordinator.request_with(
                fixture_key.clone(),
                || async { Ok(vec![game(1, "2024-06-02", "12:00"), game(9, "2024-jun-02", "12:00")]) },
                move |result| tx.send(result).unwrap(),
            );
        }

        for _ in 0..2 {
            match result_rx.recv().await.unwrap() {
                Err(FetchError::MalformedEntity(e)) => {
                    assert_eq!(e.id, 9);
                    assert_eq!(e.field, "date");
                }
                other => panic!("expected malformed entity error, got {:?}", other),
            }
        }
        assert!(coordinator.cache().get::<Game>().is_none());
        assert_eq!(coordinator.state(&fixture_key), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_empty_result_is_cached_but_refetched() {
        let coordinator = races();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            let data = coordinator
                .request(key(), move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                })
                .await
                .unwrap();
            assert!(data.is_empty());
        }

        assert!(coordinator.cache().get::<Race>().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let coordinator = races();
        let calls = Arc::new(AtomicUsize::new(0));

        let requests = ["a", "b"].into_iter().map(|k| {
            let calls = Arc::clone(&calls);
            coordinator.request(ResourceKey::from(k), move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![race(k)])
            })
        });
        let results = futures::future::join_all(requests).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[tokio::test]
    async fn test_panicking_fetch_is_reported_as_aborted() {
        let coordinator = races();
        let err = coordinator
            .request(key(), exploding_fetch)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Aborted(_)));
        assert_eq!(coordinator.state(&key()), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_panicking_waiter_does_not_block_others() {
        let coordinator = races();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();

        coordinator.request_with(
            key(),
            || async { Ok(vec![race("Jeddah")]) },
            |_| panic!("view was torn down"),
        );
        coordinator.request_with(
            key(),
            || async { Ok(Vec::new()) },
            move |result| result_tx.send(result).unwrap(),
        );

        assert_eq!(result_rx.recv().await.unwrap().unwrap(), vec![race("Jeddah")]);
    }

    #[tokio::test]
    async fn test_waiter_may_reenter_request() {
        let coordinator = races();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel();

        let inner = coordinator.clone();
        coordinator.request_with(
            key(),
            || async { Ok(vec![race("Miami")]) },
            move |first| {
                assert!(first.is_ok());
                // Served from cache while the outer fan-out is still running
                inner.request_with(
                    key(),
                    unreachable_fetch,
                    move |second| result_tx.send(second).unwrap(),
                );
            },
        );

        assert_eq!(result_rx.recv().await.unwrap().unwrap(), vec![race("Miami")]);
    }

    #[tokio::test]
    async fn test_unavailable_clock_caches_empty_fixture_list() {
        let coordinator: FetchCoordinator<Game> = FetchCoordinator::new(
            Arc::new(ResourceCache::in_memory()),
            Arc::new(FixedClock::unavailable()),
        );
        let data = coordinator
            .request(ResourceKey::new("football/arsenal"), || async {
                Ok(vec![game(1, "2099-01-01", "12:00")])
            })
            .await
            .unwrap();
        assert!(data.is_empty());
    }
}
