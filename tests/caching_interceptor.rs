//! Behaviour of the caching interceptor against scripted in-process transports.

use async_trait::async_trait;
use awg_http_cache::cache::{CacheConfig, CacheKey, CacheManager, CacheStore, MemoryCache};
use awg_http_cache::interceptors::{CachingInterceptor, InterceptorPipeline};
use awg_http_cache::telemetry::{InMemoryErrorReporter, PROTOCOL_ERROR_MESSAGE};
use awg_http_cache::transport::{transport_fn, Transport, TransportError};
use awg_http_cache::{
    CancelHandle, Error, HttpClient, HttpRequest, HttpResponse, ProtocolError, Result,
};
use reqwest::{StatusCode, Url};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Barrier, Notify};
use tokio_test::{assert_pending, assert_ready};

const API: &str = "https://edition.example.org/api/";

fn url(path: &str) -> Url {
    Url::parse(API).unwrap().join(path).unwrap()
}

fn test_data() -> HttpResponse {
    HttpResponse::new(StatusCode::OK, url("search/Test")).with_body(r#"{"name":"TestData"}"#)
}

/// Store wrapper counting `get`/`put` calls.
#[derive(Default)]
struct CountingStore {
    inner: MemoryCache,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl CountingStore {
    fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
    fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

impl CacheStore for CountingStore {
    fn get(&self, key: &CacheKey) -> Option<HttpResponse> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }
    fn put(&self, key: CacheKey, response: HttpResponse) {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(key, response)
    }
    fn remove(&self, key: &CacheKey) -> bool {
        self.inner.remove(key)
    }
    fn clear(&self) {
        self.inner.clear()
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
    fn name(&self) -> &'static str {
        "counting"
    }
}

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync;

/// Transport answering every request with the same scripted outcome.
struct ScriptedTransport {
    calls: AtomicUsize,
    respond: Box<Responder>,
}

impl ScriptedTransport {
    fn new(respond: impl Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            respond: Box::new(respond),
        }
    }
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.respond)(&request)
    }
}

struct Fixture {
    store: Arc<CountingStore>,
    cache: Arc<CacheManager>,
    transport: Arc<ScriptedTransport>,
    reporter: Arc<InMemoryErrorReporter>,
    pipeline: InterceptorPipeline,
}

impl Fixture {
    fn new(transport: ScriptedTransport) -> Self {
        let store = Arc::new(CountingStore::default());
        let cache = Arc::new(CacheManager::new(CacheConfig::default(), store.clone()));
        let transport = Arc::new(transport);
        let reporter = Arc::new(InMemoryErrorReporter::new());
        let pipeline = InterceptorPipeline::new(transport.clone())
            .with(CachingInterceptor::new(cache.clone()).with_reporter(reporter.clone()));
        Self {
            store,
            cache,
            transport,
            reporter,
            pipeline,
        }
    }
}

#[tokio::test]
async fn test_non_get_requests_bypass_cache() {
    let fx = Fixture::new(ScriptedTransport::new(|req| {
        Ok(HttpResponse::new(StatusCode::CREATED, req.url().clone())
            .with_body(req.body().cloned().unwrap_or_default()))
    }));

    let body = json!({"name": "TestData"});
    let requests = vec![
        HttpRequest::post(url("foo/bar")).with_json(&body).unwrap(),
        HttpRequest::put(url("foo/bar")).with_json(&body).unwrap(),
        HttpRequest::delete(url("foo/bar")),
    ];
    for req in requests {
        let expected = HttpResponse::new(StatusCode::CREATED, req.url().clone())
            .with_body(req.body().cloned().unwrap_or_default());
        let resp = fx.pipeline.execute(req).await.unwrap();
        assert_eq!(resp, expected);
    }

    assert_eq!(fx.transport.calls(), 3);
    assert_eq!(fx.store.gets(), 0);
    assert_eq!(fx.store.puts(), 0);
    assert!(fx.cache.is_empty());
}

#[tokio::test]
async fn test_non_get_errors_are_relayed_without_report() {
    let fx = Fixture::new(ScriptedTransport::new(|req| {
        Err(Error::from(ProtocolError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            req.url().clone(),
        )))
    }));

    let err = fx
        .pipeline
        .execute(HttpRequest::post(url("foo/bar")))
        .await
        .unwrap_err();

    assert_eq!(
        err.as_protocol(),
        Some(&ProtocolError::new(StatusCode::INTERNAL_SERVER_ERROR, url("foo/bar")))
    );
    assert!(fx.reporter.is_empty());
    assert_eq!(fx.store.gets(), 0);
    assert_eq!(fx.store.puts(), 0);
}

#[tokio::test]
async fn test_get_miss_is_stored_and_repeat_is_served_from_cache() {
    let fx = Fixture::new(ScriptedTransport::new(|_| Ok(test_data())));
    let request = HttpRequest::get(url("search/Test"));

    let first = fx.pipeline.execute(request.clone()).await.unwrap();
    assert_eq!(fx.transport.calls(), 1);
    assert_eq!(fx.store.gets(), 1);
    assert_eq!(fx.store.puts(), 1);
    assert_eq!(
        fx.store.inner.get(&CacheKey::from_request(&request)),
        Some(test_data())
    );

    let second = fx.pipeline.execute(request).await.unwrap();
    assert_eq!(fx.transport.calls(), 1, "second GET must not reach the transport");
    assert_eq!(fx.store.gets(), 2);
    assert_eq!(fx.store.puts(), 1);
    assert_eq!(first, second);

    let stats = fx.cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.sets), (1, 1, 1));
}

#[tokio::test]
async fn test_headers_do_not_affect_cache_identity() {
    let fx = Fixture::new(ScriptedTransport::new(|_| Ok(test_data())));

    fx.pipeline
        .execute(HttpRequest::get(url("search/Test")))
        .await
        .unwrap();
    let with_header = HttpRequest::get(url("search/Test"))
        .with_header("accept", "application/json")
        .unwrap();
    fx.pipeline.execute(with_header).await.unwrap();

    assert_eq!(fx.transport.calls(), 1);
}

#[tokio::test]
async fn test_query_parameters_are_part_of_identity() {
    let fx = Fixture::new(ScriptedTransport::new(|req| {
        Ok(HttpResponse::new(StatusCode::OK, req.url().clone())
            .with_body(req.url().query().unwrap_or_default().to_string()))
    }));

    let a = fx
        .pipeline
        .execute(HttpRequest::get(url("search")).with_query("q", "op25"))
        .await
        .unwrap();
    let b = fx
        .pipeline
        .execute(HttpRequest::get(url("search")).with_query("q", "op27"))
        .await
        .unwrap();

    assert_eq!(a.text(), "q=op25");
    assert_eq!(b.text(), "q=op27");
    assert_eq!(fx.transport.calls(), 2);
    assert_eq!(fx.cache.len(), 2);
}

#[tokio::test]
async fn test_protocol_error_is_logged_once_and_not_cached() {
    let fx = Fixture::new(ScriptedTransport::new(|req| {
        Err(Error::from(ProtocolError::new(
            StatusCode::UNAUTHORIZED,
            req.url().clone(),
        )))
    }));

    let err = fx
        .pipeline
        .execute(HttpRequest::get(url("search/Test")))
        .await
        .unwrap_err();

    assert_eq!(
        err.as_protocol(),
        Some(&ProtocolError::new(StatusCode::UNAUTHORIZED, url("search/Test")))
    );
    assert_eq!(fx.reporter.messages(), vec![PROTOCOL_ERROR_MESSAGE.to_string()]);
    assert_eq!(fx.store.gets(), 1);
    assert_eq!(fx.store.puts(), 0);
    assert!(fx.cache.is_empty());
}

#[tokio::test]
async fn test_transport_error_is_not_logged_and_not_cached() {
    let fx = Fixture::new(ScriptedTransport::new(|_| {
        Err(Error::Transport(TransportError::Connection(
            "connection refused".into(),
        )))
    }));

    let err = fx
        .pipeline
        .execute(HttpRequest::get(url("search/Test")))
        .await
        .unwrap_err();

    match err {
        Error::Transport(TransportError::Connection(msg)) => {
            assert_eq!(msg, "connection refused")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.reporter.is_empty());
    assert_eq!(fx.store.puts(), 0);
    assert!(fx.cache.is_empty());
}

#[tokio::test]
async fn test_failures_are_not_retried() {
    let fx = Fixture::new(ScriptedTransport::new(|req| {
        Err(Error::from(ProtocolError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            req.url().clone(),
        )))
    }));

    let _ = fx.pipeline.execute(HttpRequest::get(url("a"))).await;
    assert_eq!(fx.transport.calls(), 1);
}

#[tokio::test]
async fn test_clear_forces_refetch() {
    let fx = Fixture::new(ScriptedTransport::new(|_| Ok(test_data())));
    let request = HttpRequest::get(url("search/Test"));

    fx.pipeline.execute(request.clone()).await.unwrap();
    fx.cache.clear();
    fx.pipeline.execute(request).await.unwrap();

    assert_eq!(fx.transport.calls(), 2);
    assert_eq!(fx.store.puts(), 2);
}

#[test]
fn test_cache_hit_completes_without_suspending() {
    let cache = Arc::new(CacheManager::in_memory());
    let request = HttpRequest::get(url("search/Test"));
    cache.put(cache.key_for(&request), test_data());

    // A transport that never answers: reaching it would leave the future pending.
    let pipeline = InterceptorPipeline::new(Arc::new(transport_fn(|_req: HttpRequest| {
        futures::future::pending::<Result<HttpResponse>>()
    })))
    .with(CachingInterceptor::new(cache));

    let mut fut = tokio_test::task::spawn(pipeline.execute(request));
    let resp = assert_ready!(fut.poll()).unwrap();
    assert_eq!(resp, test_data());
}

#[test]
fn test_dropped_miss_never_reaches_store() {
    let store = Arc::new(CountingStore::default());
    let cache = Arc::new(CacheManager::new(CacheConfig::default(), store.clone()));
    let pipeline = InterceptorPipeline::new(Arc::new(transport_fn(|_req: HttpRequest| {
        futures::future::pending::<Result<HttpResponse>>()
    })))
    .with(CachingInterceptor::new(cache));

    let mut fut = tokio_test::task::spawn(pipeline.execute(HttpRequest::get(url("search/Test"))));
    assert_pending!(fut.poll());
    drop(fut);

    assert_eq!(store.gets(), 1);
    assert_eq!(store.puts(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_cancel_handle_leaves_store_untouched() {
    let release = Arc::new(Notify::new());
    let gate = release.clone();
    let store = Arc::new(CountingStore::default());
    let cache = Arc::new(CacheManager::new(CacheConfig::default(), store.clone()));
    let client = HttpClient::builder()
        .base_url(API)
        .unwrap()
        .transport(Arc::new(transport_fn(move |_req: HttpRequest| {
            let gate = gate.clone();
            async move {
                gate.notified().await;
                Ok(test_data())
            }
        })))
        .with_cache(cache.clone())
        .build()
        .unwrap();

    let handle = CancelHandle::new();
    let canceller = handle.clone();
    tokio::spawn(async move {
        tokio::task::yield_now().await;
        canceller.cancel();
    });

    let err = client
        .send_with_cancel(client.request(reqwest::Method::GET, "search/Test").unwrap(), &handle)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
    assert!(handle.is_cancelled());

    // Releasing the transport afterwards must not resurrect the abandoned request.
    release.notify_waiters();
    tokio::task::yield_now().await;
    assert_eq!(store.puts(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_concurrent_identical_misses_both_forward() {
    let barrier = Arc::new(Barrier::new(2));
    let calls = Arc::new(AtomicUsize::new(0));
    let (gate, counter) = (barrier.clone(), calls.clone());
    let cache = Arc::new(CacheManager::in_memory());
    let client = Arc::new(
        HttpClient::builder()
            .base_url(API)
            .unwrap()
            .transport(Arc::new(transport_fn(move |req: HttpRequest| {
                let gate = gate.clone();
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    // Both requests must be in flight before either completes.
                    gate.wait().await;
                    Ok(HttpResponse::new(StatusCode::OK, req.url().clone())
                        .with_body(format!("response-{n}")))
                }
            })))
            .with_cache(cache.clone())
            .build()
            .unwrap(),
    );

    let (a, b) = tokio::join!(
        tokio::spawn({
            let client = client.clone();
            async move { client.get("search/Test").await }
        }),
        tokio::spawn({
            let client = client.clone();
            async move { client.get("search/Test").await }
        }),
    );
    let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_ne!(a.body(), b.body());
    assert_eq!(cache.len(), 1);
    let stored = cache
        .get(&CacheKey::from_request(&HttpRequest::get(url("search/Test"))))
        .unwrap();
    assert!(stored == a || stored == b);
}
