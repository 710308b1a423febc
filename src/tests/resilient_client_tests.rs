use crate::rate_limit::RateLimitConfig;
use crate::resilient_client::{FailureClass, ResilientClient, RetryPolicy, RetrySchedule};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn policy(max_attempts: u32, base_ms: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(base_ms),
    }
}

#[test]
fn server_errors_double_the_backoff() {
    let mut schedule = RetrySchedule::new(policy(5, 5));

    assert_eq!(
        schedule.next_delay(FailureClass::ServerError),
        Some(Duration::from_millis(5))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::ServerError),
        Some(Duration::from_millis(10))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::ServerError),
        Some(Duration::from_millis(20))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::ServerError),
        Some(Duration::from_millis(40))
    );
    assert_eq!(schedule.next_delay(FailureClass::ServerError), None);
}

#[test]
fn throttle_doubles_like_server_errors() {
    let mut schedule = RetrySchedule::new(policy(4, 5));

    assert_eq!(
        schedule.next_delay(FailureClass::Throttled),
        Some(Duration::from_millis(5))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::Throttled),
        Some(Duration::from_millis(10))
    );
}

#[test]
fn transport_and_quota_failures_keep_the_delay_flat() {
    let mut schedule = RetrySchedule::new(policy(5, 5));

    assert_eq!(
        schedule.next_delay(FailureClass::Transport),
        Some(Duration::from_millis(5))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::QuotaForbidden),
        Some(Duration::from_millis(5))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::Transport),
        Some(Duration::from_millis(5))
    );
}

#[test]
fn doubling_only_advances_on_doubling_classes() {
    let mut schedule = RetrySchedule::new(policy(10, 5));

    assert_eq!(
        schedule.next_delay(FailureClass::ServerError),
        Some(Duration::from_millis(5))
    );
    // A transport failure in between must not reset or advance the delay.
    assert_eq!(
        schedule.next_delay(FailureClass::Transport),
        Some(Duration::from_millis(10))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::ServerError),
        Some(Duration::from_millis(10))
    );
    assert_eq!(
        schedule.next_delay(FailureClass::ServerError),
        Some(Duration::from_millis(20))
    );
}

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn counting_stub(hits: Arc<AtomicUsize>, failures_before_ok: usize) -> Router {
    Router::new().route(
        "/resource",
        get(move || {
            let hits = hits.clone();
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst);
                if n < failures_before_ok {
                    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
                } else {
                    (StatusCode::OK, "{\"ok\":true}")
                }
            }
        }),
    )
}

#[tokio::test]
async fn fetch_succeeds_on_fourth_attempt_after_three_server_errors() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_stub(counting_stub(hits.clone(), 3)).await;

    let client = ResilientClient::new(None, policy(5, 5), RateLimitConfig::default()).unwrap();

    let started = Instant::now();
    let response = client.fetch(&format!("{base}/resource")).await;

    assert_eq!(hits.load(Ordering::SeqCst), 4);
    assert_eq!(response.unwrap().status(), StatusCode::OK);
    // Backoff sequence 5, 10, 20 base units before the successful attempt.
    assert!(started.elapsed() >= Duration::from_millis(35));
}

#[tokio::test]
async fn fetch_gives_up_after_exhausting_attempts() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_stub(counting_stub(hits.clone(), usize::MAX)).await;

    let client = ResilientClient::new(None, policy(3, 1), RateLimitConfig::default()).unwrap();
    let response = client.fetch(&format!("{base}/resource")).await;

    assert!(response.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unmapped_status_aborts_immediately_without_sleeping() {
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_for_handler = hits.clone();
    let router = Router::new().route(
        "/teapot",
        get(move || {
            let hits = hits_for_handler.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                StatusCode::IM_A_TEAPOT
            }
        }),
    );
    let base = spawn_stub(router).await;

    // A large base delay makes any accidental sleep visible in the elapsed time.
    let client = ResilientClient::new(None, policy(5, 500), RateLimitConfig::default()).unwrap();

    let started = Instant::now();
    let response = client.fetch(&format!("{base}/teapot")).await;

    assert!(response.is_none());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(started.elapsed() < Duration::from_millis(400));
}

#[tokio::test]
async fn transport_errors_are_retried_until_the_budget_is_spent() {
    // Nothing listens here; connections are refused at the transport layer.
    let client = ResilientClient::new(None, policy(2, 1), RateLimitConfig::default()).unwrap();
    let response = client.fetch("http://127.0.0.1:9/resource").await;

    assert!(response.is_none());
}
