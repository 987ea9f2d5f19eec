use proptest::prelude::*;

use typing_game::game::{
    Engine, EngineConfig, GameEvent, MatchResult, Phase, RemovalReason, WordSource,
};

fn engine_with(words: &[&str], seed: u64) -> Engine {
    let config = EngineConfig {
        seed: Some(seed),
        ..EngineConfig::default()
    };
    let source = WordSource::with_dictionary(words.iter().map(|w| w.to_string()).collect(), Some(seed));
    Engine::with_word_source(config, source)
}

fn id_of(engine: &Engine, text: &str) -> u64 {
    engine
        .targets()
        .iter()
        .find(|t| t.text == text)
        .map(|t| t.id)
        .unwrap()
}

#[test]
fn test_unmatched_target_crosses_wall_and_ends_session() {
    let mut engine = engine_with(&["kissa"], 1);
    engine.start();

    let target = engine.targets()[0].clone();
    assert_eq!(target.text, "kissa");
    assert_eq!(target.x, 0.0);

    let mut last_x = target.x;
    let mut ticks = 0;
    while engine.is_running() {
        engine.tick(0.1);
        ticks += 1;
        if let Some(t) = engine.targets().first() {
            assert!(t.x > last_x, "target moved left at tick {ticks}");
            last_x = t.x;
        }
        assert!(ticks < 10_000, "target never reached the wall");
    }

    assert_eq!(engine.phase(), Phase::Ended);
    assert!(engine.targets().is_empty());
    assert_eq!(engine.spawn(), None);

    let events = engine.drain_events();
    assert!(events.contains(&GameEvent::Ended { final_score: 0 }));
    assert!(events.contains(&GameEvent::TargetRemoved {
        id: target.id,
        reason: RemovalReason::Cleared,
    }));
}

#[test]
fn test_partial_then_exact_between_similar_words() {
    let mut engine = engine_with(&["koira", "kala"], 2);
    engine.start();
    engine.spawn();
    assert_eq!(engine.targets().len(), 2);

    let koira = id_of(&engine, "koira");
    let kala = id_of(&engine, "kala");
    let kala_before = engine.targets().iter().find(|t| t.id == kala).cloned().unwrap();

    assert_eq!(engine.handle_input("ka"), Some(MatchResult::Partial(kala)));
    assert_eq!(engine.state().highlighted, Some(kala));

    assert_eq!(engine.handle_input("koira"), Some(MatchResult::Exact(koira)));
    assert_eq!(engine.targets().len(), 1);
    assert_eq!(engine.targets()[0], kala_before);
    assert_eq!(engine.score(), engine.config().points_per_word);
}

#[test]
fn test_shared_prefix_selects_leftmost() {
    let mut engine = engine_with(&["kala", "kana"], 4);
    engine.start();
    engine.spawn();
    // Let the two targets separate
    for _ in 0..30 {
        engine.tick(0.1);
    }

    let leftmost = engine
        .targets()
        .iter()
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .map(|t| t.id)
        .unwrap();
    assert_eq!(engine.handle_input("k"), Some(MatchResult::Partial(leftmost)));
}

#[test]
fn test_score_changes_only_on_exact() {
    let mut engine = engine_with(&["talo"], 5);
    engine.start();

    for input in ["", "x", "ta", "TAL", "talox"] {
        engine.handle_input(input);
        assert_eq!(engine.score(), 0, "input {input:?}");
    }

    assert_eq!(engine.handle_input("  TALO "), Some(MatchResult::Exact(0)));
    assert_eq!(engine.score(), 10);
    assert!(engine.targets().is_empty());
}

#[derive(Debug, Clone)]
enum Op {
    Spawn,
    Tick(f32),
    Input(String),
    Start,
    End,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Spawn),
        3 => (0.0f32..0.5).prop_map(Op::Tick),
        2 => "[a-zäö]{0,6}".prop_map(Op::Input),
        1 => Just(Op::Start),
        1 => Just(Op::End),
    ]
}

proptest! {
    #[test]
    fn prop_active_targets_never_exceed_cap(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..120)) {
        let mut engine = Engine::new(EngineConfig { seed: Some(seed), ..EngineConfig::default() });
        let cap = engine.config().max_active;

        for op in ops {
            match op {
                Op::Spawn => { engine.spawn(); }
                Op::Tick(dt) => engine.tick(dt),
                Op::Input(text) => { engine.handle_input(&text); }
                Op::Start => { engine.start(); }
                Op::End => { engine.end(); }
            }
            prop_assert!(engine.targets().len() <= cap);
            if !engine.is_running() {
                prop_assert!(engine.targets().is_empty());
            }
        }
    }

    #[test]
    fn prop_end_is_idempotent(seed in any::<u64>(), ticks in 0usize..50) {
        let mut engine = Engine::new(EngineConfig { seed: Some(seed), ..EngineConfig::default() });
        engine.start();
        for _ in 0..ticks {
            engine.tick(0.05);
        }
        let first = engine.end();
        let score = engine.score();
        prop_assert!(first.is_some());
        prop_assert_eq!(engine.end(), None);
        prop_assert_eq!(engine.score(), score);
        prop_assert_eq!(engine.phase(), Phase::Ended);
    }
}
