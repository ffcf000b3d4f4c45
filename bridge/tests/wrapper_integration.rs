//! Integration tests for the stateful and fire-and-forget call sites.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use overlay_bridge::{
    Bridge, BridgeConfig, BridgeError, DelayConfig, Environment, HostGlobals, MockConfig,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Player {
    id: u32,
}

fn standalone_bridge() -> Bridge {
    Bridge::builder()
        .with_environment(Environment::standalone())
        .build()
        .expect("bridge should build")
}

fn host_bridge(addr: String) -> Bridge {
    let globals = Arc::new(HostGlobals::new());
    globals.set_resource_name_provider(move || addr.clone());
    Bridge::builder()
        .with_globals(globals)
        .with_environment(Environment::host())
        .with_config(BridgeConfig::new().with_scheme("http"))
        .build()
        .expect("bridge should build")
}

fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}

// ---------------------------------------------------------------------------
// Stateful requests
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn success_runs_callback_before_state_settles() {
    let bridge = standalone_bridge();
    let mock = MockConfig::new()
        .with_data(Player { id: 7 })
        .with_delay(Duration::from_millis(100));
    let call = bridge.stateful_request::<Player, ()>("getPlayerData", |_| {}, mock);

    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let state = call.watch_state();
    call.set_callback(move |player| {
        sink.lock().unwrap().push((player, state.borrow().loading));
    });

    assert!(call.state().is_idle());

    let pending = call.invoke(None);
    let during = call.state();
    assert!(during.loading);
    assert!(during.error.is_none());

    let result = pending.await.unwrap();
    assert_eq!(result, Some(Player { id: 7 }));
    assert_eq!(*calls.lock().unwrap(), vec![(Some(Player { id: 7 }), true)]);
    assert!(call.state().is_idle());
}

#[tokio::test(start_paused = true)]
async fn state_changes_are_observable() {
    let bridge = standalone_bridge();
    let call = bridge.stateful_request::<Player, ()>(
        "getPlayerData",
        |_| {},
        MockConfig::new().with_data(Player { id: 1 }),
    );
    let mut rx = call.watch_state();
    assert!(!rx.borrow_and_update().loading);

    let pending = call.invoke(None);
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().loading);

    pending.await.unwrap();
    assert!(rx.has_changed().unwrap());
    assert!(rx.borrow_and_update().is_idle());
}

#[tokio::test]
async fn failure_records_and_returns_the_same_error() {
    let bridge = host_bridge(dead_addr());
    let called = Arc::new(Mutex::new(false));
    let flag = called.clone();
    let call = bridge.stateful_request::<Player, Player>(
        "getPlayerData",
        move |_| *flag.lock().unwrap() = true,
        MockConfig::new(),
    );

    let err = call.invoke(Some(Player { id: 1 })).await.unwrap_err();
    let state = call.state();

    assert!(!state.loading);
    let recorded = state.error.expect("error recorded");
    assert!(Arc::ptr_eq(&recorded, &err));
    assert!(matches!(*err, BridgeError::Transport(_)));
    assert_eq!(recorded.to_string(), err.to_string());
    assert!(!*called.lock().unwrap());
}

#[tokio::test]
async fn next_call_clears_previous_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/getPlayerData"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/getPlayerData"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
        .mount(&server)
        .await;

    let bridge = host_bridge(server.address().to_string());
    let call = bridge.stateful_request::<Player, ()>("getPlayerData", |_| {}, MockConfig::new());

    let err = call.invoke(None).await.unwrap_err();
    assert!(matches!(*err, BridgeError::Decode(_)));
    assert!(call.state().error.is_some());

    let pending = call.invoke(None);
    assert!(call.state().loading);
    assert!(call.state().error.is_none());
    assert_eq!(pending.await.unwrap(), Some(Player { id: 4 }));
    assert!(call.state().is_idle());
}

#[tokio::test]
async fn invoker_identity_tracks_configuration() {
    let bridge = standalone_bridge();
    let mut call = bridge.stateful_request::<Player, ()>(
        "getPlayerData",
        |_| {},
        MockConfig::new().with_data(Player { id: 1 }),
    );

    let first = call.invoker();
    call.set_callback(|_| {});
    assert!(first.same_as(&call.invoker()));

    assert!(!call.reconfigure("getPlayerData", MockConfig::new().with_data(Player { id: 1 })));
    assert!(first.same_as(&call.invoker()));

    assert!(call.reconfigure("getPlayerData", MockConfig::new().with_data(Player { id: 2 })));
    assert!(!first.same_as(&call.invoker()));

    assert!(call.reconfigure("getTarget", MockConfig::new().with_data(Player { id: 2 })));
    assert_eq!(call.invoker().event_name(), "getTarget");
}

#[tokio::test(start_paused = true)]
async fn late_results_skip_a_torn_down_scope() {
    let bridge = standalone_bridge();
    let called = Arc::new(Mutex::new(false));
    let flag = called.clone();
    let call = bridge.stateful_request::<Player, ()>(
        "getPlayerData",
        move |_| *flag.lock().unwrap() = true,
        MockConfig::new()
            .with_data(Player { id: 9 })
            .with_delay(Duration::from_millis(200)),
    );
    let state = call.watch_state();

    let pending = call.invoker().invoke(None);
    drop(call);

    assert_eq!(pending.await.unwrap(), Some(Player { id: 9 }));
    assert!(!*called.lock().unwrap());
    assert!(state.borrow().loading);
}

#[tokio::test]
async fn late_failure_leaves_a_torn_down_scope_alone() {
    let bridge = host_bridge(dead_addr());
    let call = bridge.stateful_request::<Player, ()>("getPlayerData", |_| {}, MockConfig::new());
    let state = call.watch_state();

    let pending = call.invoke(None);
    drop(call);

    let err = pending.await.unwrap_err();
    assert!(matches!(*err, BridgeError::Transport(_)));
    let state = state.borrow();
    assert!(state.loading);
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn call_settles_after_caller_stops_waiting() {
    let bridge = standalone_bridge();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let call = bridge.stateful_request::<Player, ()>(
        "getPlayerData",
        move |player| sink.lock().unwrap().push(player),
        MockConfig::new()
            .with_data(Player { id: 5 })
            .with_delay(Duration::from_millis(200)),
    );
    let mut state = call.watch_state();

    let outcome = tokio::time::timeout(Duration::from_millis(50), call.invoke(None)).await;
    assert!(outcome.is_err());
    assert!(state.borrow_and_update().loading);

    state.wait_for(|s| !s.loading).await.unwrap();
    assert!(call.state().is_idle());
    assert_eq!(*seen.lock().unwrap(), vec![Some(Player { id: 5 })]);
}

#[tokio::test(start_paused = true)]
async fn callback_swap_applies_to_existing_invoker() {
    let bridge = standalone_bridge();
    let call = bridge.stateful_request::<Player, ()>(
        "getPlayerData",
        |_| panic!("stale callback"),
        MockConfig::new().with_data(Player { id: 3 }),
    );
    let invoker = call.invoker();

    let seen = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    call.set_callback(move |player| *sink.lock().unwrap() = player);

    invoker.invoke(None).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(Player { id: 3 }));
}

// ---------------------------------------------------------------------------
// Fire-and-forget
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fire_and_forget_ignores_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/closeUI"))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = host_bridge(server.address().to_string());
    let close = bridge.fire_and_forget::<()>("closeUI", DelayConfig::new());

    let pending = close.invoke(None);
    assert!(close.state().loading);
    pending.await.unwrap();

    assert!(close.state().is_idle());
}

#[tokio::test]
async fn fire_and_forget_sends_without_being_awaited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/closeUI"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = host_bridge(server.address().to_string());
    let close = bridge.fire_and_forget::<()>("closeUI", DelayConfig::new());
    let mut state = close.watch_state();

    drop(close.invoke(None));
    assert!(state.borrow_and_update().loading);

    tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| !s.loading))
        .await
        .expect("call should settle")
        .expect("state sender alive");
    assert!(close.state().is_idle());

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn fire_and_forget_sends_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/setWaypoint"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let bridge = host_bridge(server.address().to_string());
    let waypoint = bridge.fire_and_forget::<serde_json::Value>("setWaypoint", DelayConfig::new());
    waypoint.invoke(Some(json!({"x": 1.5, "y": -2.0}))).await.unwrap();

    let requests = server.received_requests().await.expect("recording enabled");
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent, json!({"x": 1.5, "y": -2.0}));
}

#[tokio::test]
async fn fire_and_forget_failure_sets_error() {
    let bridge = host_bridge(dead_addr());
    let close = bridge.fire_and_forget::<()>("closeUI", DelayConfig::new());

    let err = close.invoke(None).await.unwrap_err();
    let state = close.state();

    assert!(!state.loading);
    assert!(Arc::ptr_eq(&state.error.expect("error recorded"), &err));
    assert!(err.to_string().starts_with("transport failure"));
}

#[tokio::test]
async fn fire_and_forget_late_failure_leaves_state_alone() {
    let bridge = host_bridge(dead_addr());
    let close = bridge.fire_and_forget::<()>("closeUI", DelayConfig::new());
    let state = close.watch_state();

    let pending = close.invoke(None);
    drop(close);

    let err = pending.await.unwrap_err();
    assert!(err.to_string().starts_with("transport failure"));
    let state = state.borrow();
    assert!(state.loading);
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn fire_and_forget_standalone_waits_for_delay() {
    let bridge = standalone_bridge();
    let close = bridge.fire_and_forget::<()>(
        "closeUI",
        DelayConfig::new().with_delay(Duration::from_millis(300)),
    );

    let start = Instant::now();
    let pending = close.invoke(None);
    assert!(close.state().loading);
    pending.await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(300));
    assert!(close.state().is_idle());
}

#[tokio::test]
async fn fire_invoker_identity_tracks_configuration() {
    let bridge = standalone_bridge();
    let mut close = bridge.fire_and_forget::<()>("closeUI", DelayConfig::new());
    let first = close.invoker();

    assert!(!close.reconfigure("closeUI", DelayConfig::new()));
    assert!(first.same_as(&close.invoker()));

    assert!(close.reconfigure("closeUI", DelayConfig::new().with_delay(Duration::ZERO)));
    assert!(!first.same_as(&close.invoker()));
}
