use std::time::Duration;

use tokio::sync::broadcast::{error::TryRecvError, Receiver};
use tokio::time::{sleep, timeout};

use typing_game::game::{
    Engine, EngineConfig, GameEvent, GameHandle, GameRunner, RunnerEvent, SessionOutcome,
};
use typing_game::leaderboard::LeaderboardClient;

fn seeded_engine() -> Engine {
    Engine::new(EngineConfig {
        seed: Some(21),
        ..EngineConfig::default()
    })
}

fn spawn_runner(client: Option<LeaderboardClient>) -> (GameHandle, Receiver<RunnerEvent>) {
    let (runner, handle) = GameRunner::new(seeded_engine(), client);
    let events = handle.subscribe();
    tokio::spawn(runner.run());
    (handle, events)
}

fn drain(events: &mut Receiver<RunnerEvent>) -> Vec<RunnerEvent> {
    let mut out = Vec::new();
    loop {
        match events.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    out
}

fn spawned_words(events: &[RunnerEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            RunnerEvent::Game(GameEvent::TargetSpawned { text, .. }) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

async fn next_outcome(events: &mut Receiver<RunnerEvent>) -> SessionOutcome {
    timeout(Duration::from_secs(60), async {
        loop {
            match events.recv().await {
                Ok(RunnerEvent::Outcome(outcome)) => return outcome,
                Ok(_) => continue,
                Err(e) => panic!("event stream closed: {e}"),
            }
        }
    })
    .await
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_initial_batch_is_staggered() {
    let (handle, mut events) = spawn_runner(None);
    handle.start().await.unwrap();

    sleep(Duration::from_millis(100)).await;
    assert_eq!(spawned_words(&drain(&mut events)).len(), 1);

    sleep(Duration::from_millis(600)).await;
    assert_eq!(spawned_words(&drain(&mut events)).len(), 2);

    // Only the spawn timer adds targets from here on
    sleep(Duration::from_millis(1000)).await;
    assert!(spawned_words(&drain(&mut events)).is_empty());

    sleep(Duration::from_millis(400)).await;
    assert_eq!(spawned_words(&drain(&mut events)).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_typed_word_scores_and_stop_reports_outcome() {
    let (handle, mut events) = spawn_runner(None);
    handle.start().await.unwrap();
    sleep(Duration::from_millis(50)).await;

    let words = spawned_words(&drain(&mut events));
    handle.input(words[0].to_uppercase()).await.unwrap();
    sleep(Duration::from_millis(10)).await;

    let after_input = drain(&mut events);
    assert!(after_input.iter().any(|e| matches!(
        e,
        RunnerEvent::Game(GameEvent::ScoreChanged { score: 10, .. })
    )));
    assert!(after_input.contains(&RunnerEvent::Game(GameEvent::InputCleared)));

    handle.stop().await.unwrap();
    let outcome = next_outcome(&mut events).await;
    assert_eq!(outcome.final_score, 10);
    assert!(outcome.qualifies);
    assert!(outcome.top.is_empty());
    assert_eq!(outcome.leaderboard_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_unmatched_words_end_the_session() {
    let (handle, mut events) = spawn_runner(None);
    handle.start().await.unwrap();

    let outcome = next_outcome(&mut events).await;
    assert_eq!(outcome.final_score, 0);
    assert!(outcome.qualifies);
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_leaderboard_still_offers_save() {
    let client = LeaderboardClient::new("http://127.0.0.1:9");
    let (handle, mut events) = spawn_runner(Some(client));
    handle.start().await.unwrap();
    sleep(Duration::from_millis(10)).await;
    handle.stop().await.unwrap();

    let outcome = next_outcome(&mut events).await;
    assert!(outcome.qualifies);
    assert!(outcome.leaderboard_error.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_save_requires_finished_game_and_client() {
    let (handle, mut events) = spawn_runner(None);

    handle.save_score("Ana").await.unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(drain(&mut events).contains(&RunnerEvent::SaveFailed {
        message: "No finished game to save".to_string(),
        retryable: false,
    }));

    handle.start().await.unwrap();
    sleep(Duration::from_millis(10)).await;
    handle.stop().await.unwrap();
    next_outcome(&mut events).await;

    handle.save_score("Ana").await.unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(drain(&mut events).contains(&RunnerEvent::SaveFailed {
        message: "Leaderboard is not configured".to_string(),
        retryable: false,
    }));
}

#[tokio::test(start_paused = true)]
async fn test_runner_stops_when_handles_drop() {
    let (runner, handle) = GameRunner::new(seeded_engine(), None);
    let task = tokio::spawn(runner.run());
    handle.start().await.unwrap();
    drop(handle);

    timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stalled_frames_still_advance_the_simulation() {
    let (handle, mut events) = spawn_runner(None);
    handle.start().await.unwrap();
    sleep(Duration::from_millis(20)).await;
    drain(&mut events);

    // Two minutes of frames collapse into one late tick
    tokio::time::advance(Duration::from_secs(120)).await;

    let outcome = timeout(Duration::from_secs(1), next_outcome(&mut events))
        .await
        .unwrap();
    assert_eq!(outcome.final_score, 0);
}

#[tokio::test(start_paused = true)]
async fn test_restart_does_not_offer_abandoned_game() {
    let (handle, mut events) = spawn_runner(None);
    handle.start().await.unwrap();
    sleep(Duration::from_millis(50)).await;
    drain(&mut events);

    handle.start().await.unwrap();
    sleep(Duration::from_millis(50)).await;

    let restart = drain(&mut events);
    assert!(restart.contains(&RunnerEvent::Game(GameEvent::Ended { final_score: 0 })));
    assert!(restart
        .iter()
        .any(|e| matches!(e, RunnerEvent::Game(GameEvent::Started { .. }))));
    assert!(!restart.iter().any(|e| matches!(e, RunnerEvent::Outcome(_))));

    // Nothing to save while the new session runs
    handle.save_score("Ana").await.unwrap();
    sleep(Duration::from_millis(10)).await;
    assert!(drain(&mut events).contains(&RunnerEvent::SaveFailed {
        message: "No finished game to save".to_string(),
        retryable: false,
    }));

    handle.stop().await.unwrap();
    assert_eq!(next_outcome(&mut events).await.final_score, 0);
}
