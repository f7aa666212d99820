use std::time::{Duration, Instant};

use pricewatch_engine::{
    ApiSettings, EngineCommand, EngineEvent, EngineHandle, HistoryQuery, RemoteJobStatus,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn engine_for(server: &MockServer) -> EngineHandle {
    EngineHandle::new(&ApiSettings {
        base_url: server.uri(),
        ..ApiSettings::default()
    })
    .expect("engine")
}

/// Collects events until `done` returns true or the deadline passes.
fn collect_until(
    engine: &EngineHandle,
    deadline: Duration,
    mut done: impl FnMut(&[EngineEvent]) -> bool,
) -> Vec<EngineEvent> {
    let start = Instant::now();
    let mut events = Vec::new();
    while start.elapsed() < deadline && !done(&events) {
        if let Some(event) = engine.recv_timeout(Duration::from_millis(10)) {
            events.push(event);
        }
    }
    events
}

#[tokio::test(flavor = "multi_thread")]
async fn poll_result_is_tagged_with_session_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scrape/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "idle" })))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    engine.execute(EngineCommand::PollStatus { token: 42 });

    let events = tokio::task::spawn_blocking(move || {
        collect_until(&engine, Duration::from_secs(5), |events| !events.is_empty())
    })
    .await
    .unwrap();

    match &events[..] {
        [EngineEvent::StatusReceived { token, result }] => {
            assert_eq!(*token, 42);
            assert_eq!(result.as_ref().unwrap().kind(), RemoteJobStatus::Idle);
        }
        other => panic!("unexpected events: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn history_result_is_tagged_with_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = engine_for(&server);
    engine.execute(EngineCommand::FetchHistory {
        request: 3,
        query: HistoryQuery {
            days: 7,
            active_only: true,
        },
    });

    let events = tokio::task::spawn_blocking(move || {
        collect_until(&engine, Duration::from_secs(5), |events| !events.is_empty())
    })
    .await
    .unwrap();

    assert!(matches!(
        &events[..],
        [EngineEvent::HistoryReceived { request: 3, result: Err(_) }]
    ));
}

#[test]
fn ticker_fires_until_cancelled() {
    let engine = EngineHandle::new(&ApiSettings::default()).expect("engine");
    engine.execute(EngineCommand::ArmTicker {
        token: 7,
        period: Duration::from_millis(20),
    });

    let ticks = collect_until(&engine, Duration::from_secs(5), |events| events.len() >= 3);
    assert!(ticks
        .iter()
        .all(|event| *event == EngineEvent::Tick { token: 7 }));
    assert!(ticks.len() >= 3);

    engine.execute(EngineCommand::CancelTimers { token: 7 });
    // Drain anything that was already in flight, then expect silence.
    std::thread::sleep(Duration::from_millis(60));
    while engine.try_recv().is_some() {}
    assert!(engine.recv_timeout(Duration::from_millis(150)).is_none());
}

#[test]
fn grace_fires_once_and_cancel_suppresses_it() {
    let engine = EngineHandle::new(&ApiSettings::default()).expect("engine");
    engine.execute(EngineCommand::ScheduleGrace {
        token: 1,
        delay: Duration::from_millis(20),
    });
    engine.execute(EngineCommand::ScheduleGrace {
        token: 2,
        delay: Duration::from_millis(40),
    });
    engine.execute(EngineCommand::CancelTimers { token: 2 });

    let events = collect_until(&engine, Duration::from_millis(300), |_| false);
    assert_eq!(events, vec![EngineEvent::GraceElapsed { token: 1 }]);
}
