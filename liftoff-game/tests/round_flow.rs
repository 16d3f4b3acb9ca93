use liftoff_game::{
    ConflictReason, EngineError, ErrorKind, EventDefinition, FlightEngine, FlightMode,
    FlightService, FlightStatus, MemoryCatalog, MemorySessionStore, ResolutionBranch, RocketId,
    RocketProfile, RoundPhase, ScriptedEvents, ScriptedSignals, SessionId, Tier, judge_choice,
    resolve_stability,
};

fn load_deck() -> Vec<EventDefinition> {
    serde_json::from_str(include_str!("../../liftoff-tester/assets/events.json")).unwrap()
}

fn deck_event(id: &str) -> EventDefinition {
    load_deck()
        .into_iter()
        .find(|event| event.id == id)
        .unwrap_or_else(|| panic!("deck has no event {id}"))
}

fn engine_error(err: &anyhow::Error) -> &EngineError {
    err.downcast_ref::<EngineError>().expect("engine error")
}

#[test]
fn bear_trap_rewards_durable_rockets() {
    let engine = FlightEngine::default();
    let event: EventDefinition = serde_json::from_str(
        r#"{"isGlobal":true,"globalType":"BEAR_TRAP","thrustMod":1.0,"statMultiplier":0.2}"#,
    )
    .unwrap();

    let tough = engine
        .resolve_event(&event, &RocketProfile::new(1.0, 2.0, 1.0), &RocketId::new("titan"))
        .unwrap();
    assert!(tough.is_positive_outcome);
    assert!((tough.thrust_multiplier - 1.4).abs() < 1e-9);
    assert_eq!(tough.branch, ResolutionBranch::BearTrapReward);

    let fragile = engine
        .resolve_event(&event, &RocketProfile::new(1.0, 1.0, 1.0), &RocketId::new("falcon"))
        .unwrap();
    assert!(!fragile.is_positive_outcome);
    assert!((fragile.thrust_multiplier - 0.5).abs() < 1e-9);
    assert!((fragile.hull_damage_modifier - 1.5).abs() < 1e-9);
}

#[test]
fn negative_twist_inverts_good_news() {
    let engine = FlightEngine::default();
    let event: EventDefinition = serde_json::from_str(
        r#"{"isGlobal":false,"isTwist":true,"twistType":"NEGATIVE","thrustMod":1.2,
            "affectedStat":"boost","statMultiplier":0.3}"#,
    )
    .unwrap();
    let result = engine
        .resolve_event(&event, &RocketProfile::new(2.0, 1.0, 1.0), &RocketId::new("any"))
        .unwrap();
    assert!((result.thrust_multiplier - 0.6).abs() < 1e-9);
    assert!(!result.is_positive_outcome);
}

#[test]
fn targeted_event_skips_other_rockets() {
    let engine = FlightEngine::default();
    let event = deck_event("titan-strike");
    let result = engine
        .resolve_event(&event, &RocketProfile::default(), &RocketId::new("falcon"))
        .unwrap();
    assert!((result.thrust_multiplier - 1.0).abs() < f64::EPSILON);
    assert!((result.fuel_modifier - 1.0).abs() < f64::EPSILON);
    assert!((result.hull_damage_modifier - 1.0).abs() < f64::EPSILON);
    assert!(result.is_positive_outcome);
}

#[test]
fn choice_and_stability_contracts() {
    assert!(judge_choice(60.0, true).unwrap().is_correct_choice);
    assert!(!judge_choice(40.0, true).unwrap().is_correct_choice);
    assert!(judge_choice(40.0, false).unwrap().is_correct_choice);
    assert!(resolve_stability(42.0, 0.0).unwrap().abs() < f64::EPSILON);
}

fn service_with(
    rounds: &[(u8, &[&str])],
) -> FlightService<MemoryCatalog, ScriptedEvents, ScriptedSignals, MemorySessionStore> {
    let catalog = MemoryCatalog::default()
        .with_rocket(RocketId::new("falcon"), RocketProfile::new(1.0, 1.0, 1.0))
        .with_rocket(RocketId::new("titan"), RocketProfile::new(1.4, 2.0, 1.2));
    let feed = rounds
        .iter()
        .fold(ScriptedEvents::default(), |feed, (round, ids)| {
            feed.with_round(*round, ids.iter().map(|id| deck_event(id)).collect())
        });
    FlightService::new(
        FlightEngine::default(),
        catalog,
        feed,
        ScriptedSignals::default(),
        MemorySessionStore::default(),
    )
}

#[test]
fn mixed_round_requires_every_event_to_be_favourable() {
    let service = service_with(&[(1, &["bull-run", "bubble-burst"][..])]);
    let id = SessionId::new("mixed");
    service
        .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
        .unwrap();
    service.view_briefing(&id).unwrap();
    let result = service.submit_round(&id, 1, 20.0).unwrap();
    assert!(!result.modifiers.overall_positive);
    assert_eq!(result.modifiers.event_count, 2);
    assert!(result.choice.is_correct_choice);
    let session = service.session(&id).unwrap();
    assert_eq!(session.correct_answers, 1);
    assert_eq!(session.current_round, 2);
    assert_eq!(session.round_phase, RoundPhase::News);
}

#[test]
fn submitting_twice_for_one_round_conflicts() {
    let service = service_with(&[(1, &["sideways"][..]), (2, &["sideways"][..])]);
    let id = SessionId::new("twice");
    service
        .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
        .unwrap();
    service.view_briefing(&id).unwrap();
    service.submit_round(&id, 1, 50.0).unwrap();
    let err = service.submit_round(&id, 1, 50.0).unwrap_err();
    assert_eq!(
        engine_error(&err),
        &EngineError::Conflict(ConflictReason::RoundMismatch {
            requested: 1,
            current: 2
        })
    );
}

#[test]
fn round_guards_run_before_the_event_feed() {
    let rounds: Vec<(u8, &[&str])> = (1..=6).map(|round| (round, &["sideways"][..])).collect();
    let service = service_with(&rounds);
    let id = SessionId::new("ahead");
    service
        .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
        .unwrap();

    // still in the news phase, and round 7 has no scripted events
    let err = service.submit_round(&id, 7, 50.0).unwrap_err();
    assert_eq!(
        engine_error(&err),
        &EngineError::Conflict(ConflictReason::RoundMismatch {
            requested: 7,
            current: 1
        })
    );
    let err = service.submit_round(&id, 1, 50.0).unwrap_err();
    assert_eq!(engine_error(&err).kind(), ErrorKind::Conflict);

    let briefed = service.view_briefing(&id).unwrap();
    let err = service.submit_round(&id, 7, 50.0).unwrap_err();
    assert_eq!(
        engine_error(&err),
        &EngineError::Conflict(ConflictReason::RoundMismatch {
            requested: 7,
            current: 1
        })
    );
    assert_eq!(service.session(&id).unwrap(), briefed);
}

#[test]
fn missing_event_set_is_not_found_and_leaves_state_alone() {
    let service = service_with(&[]);
    let id = SessionId::new("no-news");
    service
        .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
        .unwrap();
    let briefed = service.view_briefing(&id).unwrap();
    let err = service.submit_round(&id, 1, 70.0).unwrap_err();
    assert_eq!(engine_error(&err).kind(), ErrorKind::NotFound);
    assert_eq!(service.session(&id).unwrap(), briefed);
}

#[test]
fn durable_rocket_arrives_through_bear_market() {
    let rounds: Vec<(u8, &[&str])> = (1..=6).map(|round| (round, &["bear-trap"][..])).collect();
    let service = service_with(&rounds);
    let id = SessionId::new("titan-run");
    service
        .start_flight(id.clone(), RocketId::new("titan"), FlightMode::Rounds)
        .unwrap();
    for round in 1..=6 {
        service.view_briefing(&id).unwrap();
        service.submit_round(&id, round, 100.0).unwrap();
    }
    let report = service.report(&id).unwrap();
    assert_eq!(report.status, FlightStatus::Completed);
    assert_eq!(report.correct_answers, 6);
    assert_eq!(report.rounds_played, 6);
    assert!((report.accuracy_pct - 100.0).abs() < f64::EPSILON);
    // six full burns use 90 fuel, so the flight arrives with too little left to grade well
    assert_eq!(report.tier, Tier::D);
}

#[test]
fn fragile_rocket_in_bear_market_falls_short() {
    let rounds: Vec<(u8, &[&str])> =
        (1..=6).map(|round| (round, &["bear-trap", "bubble-burst"][..])).collect();
    let service = service_with(&rounds);
    let id = SessionId::new("falcon-crawl");
    service
        .start_flight(id.clone(), RocketId::new("falcon"), FlightMode::Rounds)
        .unwrap();

    for round in 1..=6 {
        service.view_briefing(&id).unwrap();
        let result = service.submit_round(&id, round, 100.0).unwrap();
        assert!(!result.modifiers.overall_positive);
        assert!((result.modifiers.thrust_multiplier - 0.3).abs() < 1e-9);
        assert!((result.modifiers.hull_damage_modifier - 1.5).abs() < 1e-9);
    }
    let session = service.session(&id).unwrap();
    assert_eq!(session.status, FlightStatus::Completed);
    assert!((session.distance - 360.0).abs() < 1e-9);
    assert!((session.current_hull - 55.0).abs() < 1e-9);
    assert_eq!(session.correct_answers, 0);
    assert_eq!(session.low_stability_thrust_count, 6);

    let report = service.report(&id).unwrap();
    assert_eq!(report.tier, Tier::F);
    assert_eq!(report.archetype, liftoff_game::Archetype::RiskTaker);

    let before = service.session(&id).unwrap();
    let err = service.view_briefing(&id).unwrap_err();
    assert_eq!(engine_error(&err).kind(), ErrorKind::Conflict);
    assert_eq!(service.session(&id).unwrap(), before);
}
