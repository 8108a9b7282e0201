#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use liru_core::error::{ErrorCode, LiruError, Operation, Role, TransportFault};
use liru_core::timing::ManualClock;
use liru_core::TextureFormat;
use liru_session::{Receiver, SessionMetrics};

mod common;
use common::{frame, Call, ScriptedTransport};

#[test]
fn construction_never_fails_or_connects() {
    let t = ScriptedTransport::new();
    let receiver = Receiver::new(t.clone(), "");

    assert!(!receiver.is_initialized());
    assert_eq!(receiver.active_sender(), "");
    assert_eq!(receiver.width(), 0);
    assert_eq!(receiver.height(), 0);
    assert_eq!(t.transport_calls(), 0);
    assert_eq!(receiver.to_string(), "Receiver(sender='not connected', size=0x0)");
}

#[test]
fn named_target_is_forwarded_without_validation() {
    let t = ScriptedTransport::new();
    let receiver = Receiver::new(t.clone(), "cam0");

    assert_eq!(receiver.active_sender(), "cam0");
    assert!(!receiver.is_initialized());
    assert_eq!(t.calls(), vec![Call::SelectTarget("cam0".into())]);
}

#[test]
fn discover_select_receive() {
    let t = ScriptedTransport::new();
    t.script.borrow_mut().publishers = vec!["cam0".into()];
    t.script.borrow_mut().copy_in.push_back(Ok(frame("cam0", 1920, 1080)));
    let mut receiver = Receiver::new(t.clone(), "");

    assert_eq!(receiver.sender_list(), vec!["cam0".to_string()]);
    receiver.select_sender("cam0").unwrap();
    assert_eq!(receiver.receive(2).unwrap(), (1920, 1080));

    assert!(receiver.is_initialized());
    assert_eq!(receiver.active_sender(), "cam0");
    assert_eq!((receiver.width(), receiver.height()), (1920, 1080));
    assert_eq!(receiver.to_string(), "Receiver(sender='cam0', size=1920x1080)");
    assert!(t.calls().contains(&Call::CopyIn(2)));
}

#[test]
fn failed_receive_keeps_previous_state() {
    let t = ScriptedTransport::new();
    t.script.borrow_mut().copy_in.extend([
        Ok(frame("cam0", 1280, 720)),
        Err(TransportFault::NoPublisher(Some("cam0".into()))),
    ]);
    let mut receiver = Receiver::new(t.clone(), "cam0");
    receiver.receive(5).unwrap();

    let before = (
        receiver.width(),
        receiver.height(),
        receiver.active_sender().to_string(),
    );
    let err = receiver.receive(5).expect_err("publisher gone");

    assert_eq!(err.code(), ErrorCode::Transport);
    assert_eq!(err.operation(), Some(Operation::Receive));
    assert_eq!(
        (receiver.width(), receiver.height(), receiver.active_sender().to_string()),
        before
    );
    // Stays initialized permanently.
    assert!(receiver.is_initialized());
}

#[test]
fn failure_before_first_frame_then_recovery() {
    let t = ScriptedTransport::new();
    let mut receiver = Receiver::new(t.clone(), "");

    receiver.receive(3).expect_err("no publisher yet");
    assert!(!receiver.is_initialized());
    assert_eq!(receiver.active_sender(), "");
    assert_eq!((receiver.width(), receiver.height()), (0, 0));

    t.script.borrow_mut().copy_in.push_back(Ok(frame("late", 800, 600)));
    assert_eq!(receiver.receive(3).unwrap(), (800, 600));
    assert!(receiver.is_initialized());
    assert_eq!(receiver.active_sender(), "late");
}

#[test]
fn size_and_identity_follow_publisher() {
    let t = ScriptedTransport::new();
    t.script.borrow_mut().copy_in.extend([
        Ok(frame("cam0", 1920, 1080)),
        Ok(frame("cam0", 1280, 720)),
        Ok(frame("cam0-renamed", 1280, 720)),
    ]);
    let mut receiver = Receiver::new(t, "");

    assert_eq!(receiver.receive(1).unwrap(), (1920, 1080));
    assert_eq!(receiver.receive(1).unwrap(), (1280, 720));
    assert_eq!(receiver.active_sender(), "cam0");
    receiver.receive(1).unwrap();
    assert_eq!(receiver.active_sender(), "cam0-renamed");
    assert_eq!(receiver.frames_received(), 3);
}

#[test]
fn null_handle_never_reaches_transport() {
    let t = ScriptedTransport::new();
    let mut receiver = Receiver::new(t.clone(), "");

    let err = receiver.receive(0).expect_err("null handle");
    assert!(matches!(err, LiruError::InvalidArgument(_)));
    assert_eq!(t.transport_calls(), 0);
    assert_eq!(receiver.last_receive_time_ms(), 0.0);
}

#[test]
fn select_sender_rejects_empty_name() {
    let t = ScriptedTransport::new();
    let mut receiver = Receiver::new(t.clone(), "cam0");

    let err = receiver.select_sender("").expect_err("empty");
    assert_eq!(err.code(), ErrorCode::Usage);
    assert_eq!(receiver.active_sender(), "cam0");
    assert_eq!(t.calls(), vec![Call::SelectTarget("cam0".into())]);
}

#[test]
fn latency_updated_on_success_and_failure() {
    let clock = ManualClock::new();
    let t = ScriptedTransport::with_clock(clock.clone());
    t.script.borrow_mut().copy_cost = Duration::from_millis(3);
    t.script.borrow_mut().copy_in.push_back(Ok(frame("cam0", 64, 64)));
    let mut receiver = Receiver::open(t.clone(), "", TextureFormat::Bgra8, clock.clone());

    receiver.receive(1).unwrap();
    assert!((receiver.last_receive_time_ms() - 3.0).abs() < 1e-9);

    t.script.borrow_mut().copy_cost = Duration::from_millis(7);
    receiver.receive(1).unwrap_err();
    assert!((receiver.last_receive_time_ms() - 7.0).abs() < 1e-9);
    assert_eq!(receiver.format(), TextureFormat::Bgra8);
}

#[test]
fn is_updated_is_a_pure_peek() {
    let t = ScriptedTransport::new();
    t.script.borrow_mut().updated = true;
    let receiver = Receiver::new(t.clone(), "");

    assert!(receiver.is_updated());
    assert!(receiver.is_updated());
    assert!(!receiver.is_initialized());
    assert_eq!(t.script.borrow().count(|c| *c == Call::IsUpdated), 2);
}

#[test]
fn release_is_idempotent_and_blocks_exchange() {
    let t = ScriptedTransport::new();
    t.script.borrow_mut().publishers = vec!["cam0".into()];
    t.script.borrow_mut().updated = true;
    let mut receiver = Receiver::new(t.clone(), "");

    receiver.release();
    receiver.release();
    assert_eq!(t.script.borrow().count(|c| *c == Call::Release), 1);

    assert!(matches!(receiver.receive(1), Err(LiruError::Released(Role::Receiver))));
    assert!(matches!(receiver.select_sender("cam0"), Err(LiruError::Released(Role::Receiver))));
    assert!(!receiver.is_updated());
    assert!(receiver.sender_list().is_empty());

    drop(receiver);
    assert_eq!(t.script.borrow().count(|c| *c == Call::Release), 1);
}

#[test]
fn drop_after_failed_receive_releases_once() {
    let t = ScriptedTransport::new();
    t.script
        .borrow_mut()
        .copy_in
        .push_back(Err(TransportFault::Failed("device lost".into())));
    {
        let mut receiver = Receiver::new(t.clone(), "cam0");
        receiver.receive(1).expect_err("transport failure");
        receiver.receive(0).expect_err("null handle");
    }
    assert_eq!(t.script.borrow().count(|c| *c == Call::Release), 1);
}

#[test]
fn query_sender_info_does_not_connect() {
    let t = ScriptedTransport::new();
    t.script.borrow_mut().info = Some(frame("cam0", 1920, 1080));
    let mut receiver = Receiver::new(t.clone(), "");

    let info = receiver.query_sender_info().unwrap();
    assert_eq!(info.sender_name, "cam0");
    assert_eq!((info.size.width, info.size.height), (1920, 1080));

    assert!(!receiver.is_initialized());
    assert_eq!(receiver.active_sender(), "");
    assert_eq!((receiver.width(), receiver.height()), (0, 0));
    assert_eq!(receiver.frames_received(), 0);
    assert_eq!(t.script.borrow().count(|c| matches!(c, Call::CopyIn(_))), 0);
    assert_eq!(t.script.borrow().count(|c| *c == Call::QuerySender), 1);

    receiver.release();
    assert!(receiver.query_sender_info().is_none());
}

#[test]
fn reattaching_metrics_moves_active_count() {
    let first = Arc::new(SessionMetrics::new());
    let second = Arc::new(SessionMetrics::new());
    let mut receiver = Receiver::new(ScriptedTransport::new(), "")
        .with_metrics(Arc::clone(&first))
        .with_metrics(Arc::clone(&second));

    assert_eq!(first.sessions_active.get(&[("role", "receiver")]), 0);
    assert_eq!(second.sessions_active.get(&[("role", "receiver")]), 1);
    receiver.release();
    assert_eq!(second.sessions_active.get(&[("role", "receiver")]), 0);
}

#[test]
fn stats_omit_rolling_rate() {
    let t = ScriptedTransport::new();
    t.script.borrow_mut().copy_in.push_back(Ok(frame("cam0", 64, 64)));
    let mut receiver = Receiver::new(t, "");
    receiver.receive(1).unwrap();

    let v = serde_json::to_value(receiver.stats()).unwrap();
    assert_eq!(v["frames"].as_u64(), Some(1));
    assert!(v.get("rolling_rate").is_none());
}
