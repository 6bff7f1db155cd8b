//! Integration tests for the `serve(args...)` host boundary

mod common;

use common::http::{get, loopback};
use common::test_server::{free_port, setup_may_runtime};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use webserve::{
    serve, ControllerState, HostValue, PinCount, ServeError, ServeOutcome, ServerController,
    StopOutcome, DEFAULT_DOCUMENT,
};

const READY: Duration = Duration::from_secs(2);

fn args(values: &[HostValue]) -> Vec<HostValue> {
    values.to_vec()
}

#[test]
fn test_serve_without_arguments_uses_defaults() {
    setup_may_runtime();
    let controller = ServerController::new();

    match serve(&controller, &[]) {
        Ok(ServeOutcome::Serving(ControllerState::Running { addr })) => {
            assert_eq!(addr.to_string(), "0.0.0.0:8080");
            controller.wait_ready(READY).unwrap();
            let reply = get(loopback(8080)).unwrap();
            assert_eq!(reply.body, DEFAULT_DOCUMENT);
            controller.stop();
        }
        // Something else on this machine owns 8080; nothing to check.
        Err(ServeError::Bind { source, .. }) if source.kind() == io::ErrorKind::AddrInUse => {}
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_serve_start_update_stop_cycle() {
    setup_may_runtime();
    let pins = Arc::new(PinCount::new());
    let controller = ServerController::with_lock(Arc::clone(&pins));
    let port = free_port();

    serve(
        &controller,
        &args(&["v1".into(), i64::from(port).into(), "127.0.0.1".into()]),
    )
    .unwrap();
    controller.wait_ready(READY).unwrap();
    assert_eq!(get(loopback(port)).unwrap().body, "v1");
    assert!(pins.is_pinned());

    // Port given as an integral real, like a host's default numeric type.
    serve(&controller, &args(&["v2".into(), f64::from(port).into()])).unwrap();
    assert_eq!(get(loopback(port)).unwrap().body, "v2");

    let outcome = serve(&controller, &[HostValue::Int(0)]).unwrap();
    assert_eq!(
        outcome,
        ServeOutcome::Stopped(StopOutcome::Stopped {
            addr: loopback(port)
        })
    );
    assert!(!pins.is_pinned());

    // Stopping again is a no-op.
    assert_eq!(
        serve(&controller, &[HostValue::Int(0)]).unwrap(),
        ServeOutcome::Stopped(StopOutcome::AlreadyIdle)
    );
}

#[test]
fn test_validation_errors_leave_running_listener_untouched() {
    setup_may_runtime();
    let controller = ServerController::new();
    let port = free_port();
    controller.start("original", "127.0.0.1", port).unwrap();
    controller.wait_ready(READY).unwrap();

    let bad_calls = [
        args(&[HostValue::Bool(true)]),
        args(&[HostValue::Int(7)]),
        args(&["new".into(), "8080".into()]),
        args(&["new".into(), HostValue::Real(80.5)]),
        args(&["new".into(), HostValue::Int(80), HostValue::Int(127)]),
    ];
    for call in &bad_calls {
        let err = serve(&controller, call).unwrap_err();
        assert!(err.is_validation(), "{:?} should fail validation", call);
    }

    assert!(controller.is_running());
    assert_eq!(controller.document().as_str(), "original");
    assert_eq!(get(loopback(port)).unwrap().body, "original");
    controller.stop();
}
