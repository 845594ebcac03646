use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use plcreator::{
    error::{PlaylistError, ProviderError},
    playlists::{GatherSummary, Manager, TrackProvider},
    results::ResultSet,
    types::Track,
};
use tokio_util::sync::CancellationToken;

// Provider whose behaviour is scripted per query
#[derive(Default)]
struct FakeProvider {
    catalog: HashMap<String, Vec<Track>>,
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    failing_query: Option<String>,
    fail_setup: bool,
    fail_create: bool,
    fail_populate: bool,

    setups: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    searched: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn with_matches(mut self, query: &str, ids: &[&str]) -> Self {
        let tracks = ids
            .iter()
            .map(|id| Track::new(*id, format!("Track {}", id)))
            .collect();
        self.catalog.insert(query.to_string(), tracks);
        self
    }

    fn with_delay(mut self, query: &str, delay: Duration) -> Self {
        self.delays.insert(query.to_string(), delay);
        self
    }

    fn searched(&self) -> Vec<String> {
        self.searched.lock().unwrap().clone()
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrackProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    async fn setup(&self) -> Result<(), ProviderError> {
        self.setups.fetch_add(1, Ordering::SeqCst);
        if self.fail_setup {
            return Err(ProviderError::Api("boom".to_string()));
        }
        Ok(())
    }

    async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, ProviderError> {
        self.searched.lock().unwrap().push(query.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(query)
            .copied()
            .unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_query.as_deref() == Some(query) {
            return Err(ProviderError::Api("boom".to_string()));
        }

        Ok(self.catalog.get(query).cloned().unwrap_or_default())
    }

    async fn create_playlist(&self, name: &str) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(format!("create:{}", name));
        if self.fail_create {
            return Err(ProviderError::Api("boom".to_string()));
        }
        Ok("pl-1".to_string())
    }

    async fn populate_playlist(
        &self,
        playlist_id: &str,
        tracks: &[String],
    ) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("populate:{}:{}", playlist_id, tracks.join(",")));
        if self.fail_populate {
            return Err(ProviderError::Api("boom".to_string()));
        }
        Ok(())
    }
}

fn queries(items: &[&str]) -> Vec<String> {
    items.iter().map(|q| q.to_string()).collect()
}

type Calls = Arc<Mutex<Vec<(usize, String, Vec<String>)>>>;

// Callback that records every invocation and commits the first match
fn recorder(results: Arc<ResultSet>, calls: Calls) -> impl Fn(usize, &str, &[Track]) + Send + Sync + 'static {
    move |slot, query, matches| {
        calls.lock().unwrap().push((
            slot,
            query.to_string(),
            matches.iter().map(|t| t.id.clone()).collect(),
        ));
        if let Some(track) = matches.first() {
            results.add(slot, &track.id);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gather_dedups_and_keeps_input_order() {
    let provider = Arc::new(
        FakeProvider::default()
            .with_matches("_C", &["_C"])
            .with_matches("_A", &["_A"]),
    );
    let manager = Manager::new(provider.clone(), 100);

    let input = queries(&["_C", "_B", "_A", "_A"]);
    let results = Arc::new(ResultSet::new(input.len()));
    let calls: Calls = Arc::default();

    let summary = manager
        .gather(
            &CancellationToken::new(),
            input,
            recorder(results.clone(), calls.clone()),
        )
        .await
        .unwrap();

    assert_eq!(results.slice(), vec!["_C", "_A"]);
    assert_eq!(
        summary,
        GatherSummary {
            queries: 4,
            resolved: 3,
            matches: 3,
        }
    );
    assert_eq!(provider.setups.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gather_invokes_callback_once_per_query_with_its_slot() {
    // later queries finish first
    let provider = Arc::new(
        FakeProvider::default()
            .with_matches("one", &["1"])
            .with_matches("two", &["2"])
            .with_matches("three", &["3"])
            .with_delay("one", Duration::from_millis(60))
            .with_delay("two", Duration::from_millis(30)),
    );
    let manager = Manager::new(provider, 100);

    let input = queries(&["one", "two", "three", "four"]);
    let results = Arc::new(ResultSet::new(input.len()));
    let calls: Calls = Arc::default();

    manager
        .gather(
            &CancellationToken::new(),
            input.clone(),
            recorder(results.clone(), calls.clone()),
        )
        .await
        .unwrap();

    let mut calls = calls.lock().unwrap().clone();
    assert_eq!(calls.len(), input.len());

    calls.sort_by_key(|(slot, _, _)| *slot);
    for (i, (slot, query, _)) in calls.iter().enumerate() {
        assert_eq!(*slot, i);
        assert_eq!(query, &input[i]);
    }
    assert!(calls[3].2.is_empty());

    assert_eq!(results.slice(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_gather_without_any_match_fails() {
    let provider = Arc::new(FakeProvider::default());
    let manager = Manager::new(provider, 100);

    let results = Arc::new(ResultSet::new(2));
    let calls: Calls = Arc::default();

    let err = manager
        .gather(
            &CancellationToken::new(),
            queries(&["nothing", "nowhere"]),
            recorder(results.clone(), calls.clone()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlaylistError::NoTracksFound));
    assert_eq!(err.to_string(), "no tracks found");
    // not found is still reported to the callback
    assert_eq!(calls.lock().unwrap().len(), 2);
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_gather_succeeds_with_a_single_match() {
    let provider = Arc::new(FakeProvider::default().with_matches("hit", &["h"]));
    let manager = Manager::new(provider, 100);

    let results = Arc::new(ResultSet::new(3));
    let summary = manager
        .gather(
            &CancellationToken::new(),
            queries(&["miss", "hit", "miss again"]),
            recorder(results.clone(), Arc::default()),
        )
        .await
        .unwrap();

    assert_eq!(summary.resolved, 1);
    assert_eq!(results.slice(), vec!["h"]);
}

#[tokio::test]
async fn test_gather_setup_failure_stops_before_searching() {
    let provider = Arc::new(FakeProvider {
        fail_setup: true,
        ..Default::default()
    });
    let manager = Manager::new(provider.clone(), 100);

    let calls: Calls = Arc::default();
    let err = manager
        .gather(
            &CancellationToken::new(),
            queries(&["a", "b"]),
            recorder(Arc::new(ResultSet::new(2)), calls.clone()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlaylistError::Setup { .. }));
    assert_eq!(err.to_string(), "fake: setup: boom");
    assert!(err.is_provider_failure());
    assert!(provider.searched().is_empty());
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gather_search_failure_stops_scheduling() {
    let provider = Arc::new(
        FakeProvider {
            failing_query: Some("_BAD".to_string()),
            ..Default::default()
        }
        .with_matches("a", &["a"])
        .with_matches("b", &["b"]),
    );
    // one search at a time, so nothing after the failing query can have started
    let manager = Manager::new(provider.clone(), 1);

    let calls: Calls = Arc::default();
    let err = manager
        .gather(
            &CancellationToken::new(),
            queries(&["_BAD", "a", "b"]),
            recorder(Arc::new(ResultSet::new(3)), calls.clone()),
        )
        .await
        .unwrap_err();

    match &err {
        PlaylistError::Search { provider, query, .. } => {
            assert_eq!(provider, "fake");
            assert_eq!(query, "_BAD");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "fake: searching track \"_BAD\": boom");
    assert_eq!(provider.searched(), vec!["_BAD"]);
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gather_respects_concurrency_limit() {
    let mut provider = FakeProvider {
        default_delay: Duration::from_millis(20),
        ..Default::default()
    };
    let names: Vec<String> = (0..24).map(|i| format!("song {i}")).collect();
    for name in &names {
        provider = provider.with_matches(name, &[name.as_str()]);
    }
    let provider = Arc::new(provider);
    let manager = Manager::new(provider.clone(), 3);

    let results = Arc::new(ResultSet::new(names.len()));
    let summary = manager
        .gather(
            &CancellationToken::new(),
            names.clone(),
            recorder(results.clone(), Arc::default()),
        )
        .await
        .unwrap();

    let peak = provider.max_in_flight.load(Ordering::SeqCst);
    // saturated, never exceeded
    assert_eq!(peak, 3, "peak in-flight searches: {peak}");
    assert_eq!(summary.queries, names.len());
    assert_eq!(results.slice(), names);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gather_runs_every_query_at_once_under_a_high_limit() {
    let mut provider = FakeProvider {
        default_delay: Duration::from_millis(100),
        ..Default::default()
    };
    let names: Vec<String> = (0..10).map(|i| format!("song {i}")).collect();
    for name in &names {
        provider = provider.with_matches(name, &[name.as_str()]);
    }
    let provider = Arc::new(provider);
    let manager = Manager::new(provider.clone(), 100);

    let summary = manager
        .gather(
            &CancellationToken::new(),
            names.clone(),
            recorder(Arc::new(ResultSet::new(names.len())), Arc::default()),
        )
        .await
        .unwrap();

    let peak = provider.max_in_flight.load(Ordering::SeqCst);
    assert_eq!(peak, names.len(), "peak in-flight searches: {peak}");
    assert_eq!(summary.queries, names.len());
}

#[tokio::test]
async fn test_gather_with_cancelled_token_does_nothing() {
    let provider = Arc::new(FakeProvider::default().with_matches("a", &["a"]));
    let manager = Manager::new(provider.clone(), 100);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = manager
        .gather(
            &cancel,
            queries(&["a"]),
            recorder(Arc::new(ResultSet::new(1)), Arc::default()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, PlaylistError::Cancelled));
    assert_eq!(provider.setups.load(Ordering::SeqCst), 0);
    assert!(provider.searched().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gather_cancellation_drops_in_flight_searches() {
    let provider = Arc::new(
        FakeProvider {
            default_delay: Duration::from_secs(30),
            ..Default::default()
        }
        .with_matches("slow", &["s"]),
    );
    let manager = Manager::new(provider, 100);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });
    }

    let calls: Calls = Arc::default();
    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        manager.gather(
            &cancel,
            queries(&["slow", "slow"]),
            recorder(Arc::new(ResultSet::new(2)), calls.clone()),
        ),
    )
    .await
    .expect("gather did not stop after cancellation");

    assert!(matches!(outcome, Err(PlaylistError::Cancelled)));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gather_keeps_complete_result_when_cancelled_late() {
    let provider = Arc::new(
        FakeProvider::default()
            .with_matches("a", &["a"])
            .with_matches("b", &["b"]),
    );
    // sequential, so the cancel below only fires once the last search is done
    let manager = Manager::new(provider, 1);

    let cancel = CancellationToken::new();
    let results = Arc::new(ResultSet::new(2));
    let summary = {
        let trigger = cancel.clone();
        let results = results.clone();
        manager
            .gather(&cancel, queries(&["a", "b"]), move |slot, _, matches| {
                if let Some(track) = matches.first() {
                    results.add(slot, &track.id);
                }
                if slot == 1 {
                    trigger.cancel();
                }
            })
            .await
            .unwrap()
    };

    assert!(cancel.is_cancelled());
    assert_eq!(summary.queries, 2);
    assert_eq!(results.slice(), vec!["a", "b"]);
}

#[test]
fn test_zero_concurrency_is_clamped() {
    let manager = Manager::new(Arc::new(FakeProvider::default()), 0);
    assert_eq!(manager.max_concurrency(), 1);
    assert_eq!(manager.provider_name(), "fake");
}

#[tokio::test]
async fn test_push_creates_then_populates() {
    let provider = Arc::new(FakeProvider::default());
    let manager = Manager::new(provider.clone(), 100);

    let id = manager
        .push(
            &CancellationToken::new(),
            "Mix",
            &["a".to_string(), "b".to_string()],
        )
        .await
        .unwrap();

    assert_eq!(id, "pl-1");
    assert_eq!(provider.calls(), vec!["create:Mix", "populate:pl-1:a,b"]);
}

#[tokio::test]
async fn test_push_skips_populate_when_create_fails() {
    let provider = Arc::new(FakeProvider {
        fail_create: true,
        ..Default::default()
    });
    let manager = Manager::new(provider.clone(), 100);

    let err = manager
        .push(&CancellationToken::new(), "Mix", &["a".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, PlaylistError::CreatePlaylist { .. }));
    assert_eq!(err.to_string(), "fake: create playlist: boom");
    assert_eq!(provider.calls(), vec!["create:Mix"]);
}

#[tokio::test]
async fn test_push_populate_failure_keeps_created_playlist() {
    let provider = Arc::new(FakeProvider {
        fail_populate: true,
        ..Default::default()
    });
    let manager = Manager::new(provider.clone(), 100);

    let err = manager
        .push(&CancellationToken::new(), "Mix", &["a".to_string()])
        .await
        .unwrap_err();

    assert!(matches!(err, PlaylistError::PopulatePlaylist { .. }));
    assert_eq!(err.to_string(), "fake: populate playlist: boom");
    // no rollback: nothing but the two calls was made
    assert_eq!(provider.calls(), vec!["create:Mix", "populate:pl-1:a"]);
}
