//! Tests for the event channel

use std::thread;

use squadrcon::{Event, EventSink, RconError};

#[test]
fn test_events_arrive_in_order() {
    let (sink, events) = EventSink::channel();

    sink.authentication_result(true);
    sink.chat_message("hi");
    sink.command_response("done");
    sink.error("boom", Some(RconError::Cancelled));

    let received: Vec<Event> = events.try_iter().collect();
    assert_eq!(received.len(), 4);
    assert!(matches!(received[0], Event::AuthenticationResult { success: true }));
    assert!(matches!(&received[1], Event::ChatMessage(t) if t == "hi"));
    assert!(matches!(&received[2], Event::CommandResponse(t) if t == "done"));
    match &received[3] {
        Event::Error { message, cause } => {
            assert_eq!(message, "boom");
            assert!(cause.as_ref().map(|c| c.is_cancelled()).unwrap_or(false));
        }
        other => panic!("Expected Error, got {:?}", other),
    }
}

#[test]
fn test_publish_without_subscribers_does_not_panic() {
    let (sink, events) = EventSink::channel();
    drop(events);

    sink.chat_message("nobody listening");
    sink.command_response("still fine");
}

#[test]
fn test_publish_never_blocks() {
    let (sink, events) = EventSink::channel();

    let producer = thread::spawn(move || {
        for i in 0..10_000 {
            sink.command_response(format!("response {}", i));
        }
    });
    producer.join().unwrap();

    assert_eq!(events.try_iter().count(), 10_000);
}

#[test]
fn test_events_are_cloneable() {
    let (sink, events) = EventSink::channel();
    sink.error("io", Some(RconError::Cancelled));

    let event = events.recv().unwrap();
    let copy = event.clone();
    assert!(matches!(copy, Event::Error { .. }));
}
