use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;
use tokio_test::assert_ok;

use typing_game::app::AppState;
use typing_game::config::Config;
use typing_game::game::{Engine, EngineConfig, GameHandle, GameRunner, RunnerEvent};
use typing_game::http::build_router;
use typing_game::leaderboard::{LeaderboardClient, LeaderboardError, ValidationError};

async fn spawn_server(config: Config) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(AppState::new(config));

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_client_submit_and_fetch() {
    let base_url = spawn_server(Config::default()).await;
    let client = LeaderboardClient::new(&base_url);

    assert!(assert_ok!(client.fetch_top(10).await).is_empty());

    let outcome = assert_ok!(client.submit("Ana", 50).await);
    assert!(outcome.accepted);
    assert_eq!(outcome.rank, Some(0));

    assert_ok!(client.submit("Bo", 80).await);

    let top = assert_ok!(client.fetch_top(10).await);
    let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Bo", "Ana"]);

    let top_one = assert_ok!(client.fetch_top(1).await);
    assert_eq!(top_one.len(), 1);
}

#[tokio::test]
async fn test_client_maps_api_errors() {
    let config = Config {
        api_key: Some("k3y".to_string()),
        rate_limit_max: 2,
        reset_secret: Some("wipe".to_string()),
        ..Config::default()
    };
    let base_url = spawn_server(config).await;

    let anonymous = LeaderboardClient::new(&base_url);
    let err = anonymous.submit("Ana", 5).await.unwrap_err();
    assert!(matches!(err, LeaderboardError::Authorization(_)));
    assert!(!err.is_retryable());

    let client = LeaderboardClient::new(&base_url).with_api_key("k3y");
    let err = client.submit("Ana", 100_001).await.unwrap_err();
    assert_eq!(err, LeaderboardError::Validation(ValidationError::ScoreRange));

    assert_ok!(client.submit("Ana", 5).await);
    let err = client.submit("Ana", 6).await.unwrap_err();
    match err {
        LeaderboardError::RateLimited { retry_after_secs } => assert!(retry_after_secs >= 1),
        other => panic!("expected rate limit, got {other:?}"),
    }

    assert_eq!(client.reset("nope").await, Ok(false));
    assert_eq!(client.reset("wipe").await, Ok(true));
    assert!(assert_ok!(client.fetch_top(10).await).is_empty());
}

async fn finished_runner(client: LeaderboardClient) -> (GameHandle, Receiver<RunnerEvent>) {
    let engine = Engine::new(EngineConfig {
        seed: Some(8),
        ..EngineConfig::default()
    });
    let (runner, handle) = GameRunner::new(engine, Some(client));
    let mut events = handle.subscribe();
    tokio::spawn(runner.run());

    handle.start().await.unwrap();
    handle.stop().await.unwrap();
    timeout(Duration::from_secs(5), async {
        while !matches!(events.recv().await, Ok(RunnerEvent::Outcome(_))) {}
    })
    .await
    .unwrap();

    (handle, events)
}

async fn next_save_result(events: &mut Receiver<RunnerEvent>) -> RunnerEvent {
    timeout(Duration::from_secs(15), async {
        loop {
            match events.recv().await {
                Ok(event @ (RunnerEvent::ScoreSaved { .. } | RunnerEvent::SaveFailed { .. })) => {
                    return event
                }
                Ok(_) => continue,
                Err(e) => panic!("event stream closed: {e}"),
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn test_finished_game_is_saved_once() {
    let base_url = spawn_server(Config::default()).await;
    let (handle, mut events) = finished_runner(LeaderboardClient::new(&base_url)).await;

    handle.save_score("Ana").await.unwrap();
    assert!(matches!(
        next_save_result(&mut events).await,
        RunnerEvent::ScoreSaved { rank: Some(0), .. }
    ));

    handle.save_score("Ana").await.unwrap();
    assert_eq!(
        next_save_result(&mut events).await,
        RunnerEvent::SaveFailed {
            message: "No finished game to save".to_string(),
            retryable: false,
        }
    );

    let top = assert_ok!(LeaderboardClient::new(&base_url).fetch_top(10).await);
    assert_eq!(top.len(), 1);
}

#[tokio::test]
async fn test_retryable_save_failure_keeps_score() {
    let (handle, mut events) = finished_runner(LeaderboardClient::new("http://127.0.0.1:9")).await;

    for _ in 0..2 {
        handle.save_score("Ana").await.unwrap();
        match next_save_result(&mut events).await {
            RunnerEvent::SaveFailed { retryable, .. } => assert!(retryable),
            other => panic!("expected a retryable failure, got {other:?}"),
        }
    }
}
