//! End-to-end behaviour of the mediator through its public API

use std::cell::RefCell;
use std::rc::Rc;
use std::str::FromStr;

use mediator_bus::{
    ActivityKind, ActivityPayload, Component, ComponentDescriptor, Envelope, Mediator,
    MediatorConfig, Publication, RegisteredComponents, SubscriptionSpec, COMPONENT_REGISTERED,
    SYSTEM_CHANNEL,
};
use serde_json::{json, Value};

type Inbox = Rc<RefCell<Vec<Envelope>>>;

fn documented(channel: &str, event: &str) -> Publication {
    Publication::new(channel, event)
        .description("test publication")
        .condition("on demand")
        .data_format("{any}")
        .example(json!({ "example": true }))
}

fn subscriber(name: &str, code: &str, channel: &str, event: &str) -> (Rc<dyn Component>, Inbox) {
    let inbox: Inbox = Rc::new(RefCell::new(Vec::new()));
    let sink = inbox.clone();
    let component: Rc<dyn Component> = Rc::new(
        ComponentDescriptor::builder(name, code)
            .description("collects deliveries")
            .subscribe(channel, event)
            .on_event(move |envelope| {
                sink.borrow_mut().push(envelope.clone());
                Ok(())
            })
            .build(),
    );
    (component, inbox)
}

fn publisher(name: &str, code: &str, channel: &str, event: &str) -> Rc<dyn Component> {
    Rc::new(
        ComponentDescriptor::builder(name, code)
            .description("declares a publication")
            .publish(documented(channel, event))
            .build(),
    )
}

fn quiet() -> Mediator {
    Mediator::with_config(MediatorConfig::default().disable_lifecycle_announcements())
}

#[test]
fn test_logger_receives_clock_start() {
    let mediator = Mediator::new();
    let (logger, inbox) = subscriber("Logger", "log1", "system", "start");
    mediator.register(logger);
    mediator.register(Rc::new(
        ComponentDescriptor::builder("Clock", "clk1")
            .description("announces start")
            .publish(
                Publication::new("system", "start")
                    .description("clock started")
                    .condition("once at boot")
                    .data_format("{timestamp: string}")
                    .example(json!({ "timestamp": "1970-01-01T00:00:00Z" })),
            )
            .build(),
    ));

    mediator.publish(
        "Clock",
        "clk1",
        "system",
        "start",
        json!({ "timestamp": "2024-01-01T00:00:00Z" }),
        1000,
    );

    let inbox = inbox.borrow();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].data["timestamp"], "2024-01-01T00:00:00Z");
    assert_eq!(inbox[0].component_name, "Clock");
    assert_eq!(inbox[0].component_code, "clk1");
    assert_eq!(inbox[0].timestamp, 1000);
}

#[test]
fn test_duplicate_code_registers_once() {
    let mediator = Mediator::new();
    let (first, first_inbox) = subscriber("A", "A", "chat", "message");
    let (second, second_inbox) = subscriber("A again", "A", "chat", "message");
    mediator.register(first);
    mediator.register(second);
    mediator.register(publisher("Chat", "chat1", "chat", "message"));

    assert_eq!(mediator.component_count(), 2);
    assert_eq!(mediator.get_registered_components().components().len(), 2);

    mediator.publish("Chat", "chat1", "chat", "message", json!("hi"), 1);
    assert_eq!(first_inbox.borrow().len(), 1);
    assert!(second_inbox.borrow().is_empty());

    let registers = mediator.get_logs_by_types(&[ActivityKind::Register], 1, 10);
    assert_eq!(registers.total, 2);
}

#[test]
fn test_undeclared_event_is_dropped() {
    let mediator = quiet();
    let (door, inbox) = subscriber("Door", "door1", "room", "knock");
    mediator.register(door);

    mediator.publish("Visitor", "v1", "room", "knock", Value::Null, 5);

    assert!(inbox.borrow().is_empty());
    assert_eq!(mediator.get_logs_by_types(&[ActivityKind::Publish], 1, 10).total, 0);
}

#[test]
fn test_declaration_by_any_component_opens_gate() {
    let mediator = quiet();
    let (door, inbox) = subscriber("Door", "door1", "room", "knock");
    mediator.register(door);
    mediator.register(publisher("Bell", "bell1", "room", "knock"));

    // Sender identity is not checked against the contributor
    mediator.publish("Visitor", "v1", "room", "knock", Value::Null, 5);

    assert_eq!(inbox.borrow().len(), 1);
    assert_eq!(mediator.get_logs_by_types(&[ActivityKind::Publish], 1, 10).total, 1);
}

#[test]
fn test_fan_out_in_registration_order() {
    let mediator = quiet();
    let order = Rc::new(RefCell::new(Vec::new()));

    for name in ["X", "Y", "Z"] {
        let order = order.clone();
        mediator.register(Rc::new(
            ComponentDescriptor::builder(name, name.to_lowercase())
                .description("records delivery order")
                .subscribe("chat", "message")
                .on_event(move |_| {
                    order.borrow_mut().push(name);
                    Ok(())
                })
                .build(),
        ));
    }
    mediator.register(publisher("Chat", "chat1", "chat", "message"));

    mediator.publish("Chat", "chat1", "chat", "message", json!({ "text": "hello" }), 1);

    assert_eq!(*order.borrow(), vec!["X", "Y", "Z"]);
    assert_eq!(mediator.subscribers_of("chat", "message"), vec!["X", "Y", "Z"]);
}

#[test]
fn test_last_unsubscribe_prunes_index() {
    let mediator = quiet();
    let (x, _) = subscriber("X", "x", "chat", "message");
    let (y, _) = subscriber("Y", "y", "chat", "message");
    mediator.register(x.clone());
    mediator.register(y.clone());

    mediator.unregister(x.as_ref());
    assert_eq!(mediator.subscribers_of("chat", "message"), vec!["Y"]);

    mediator.unregister(y.as_ref());
    let status = mediator.get_pub_sub_status();
    assert!(status.subscriptions.iter().all(|s| s.channel != "chat"));
}

#[test]
fn test_unregister_removes_catalog_rows() {
    let mediator = quiet();
    let bell = publisher("Bell", "bell1", "room", "knock");
    let (door, inbox) = subscriber("Door", "door1", "room", "knock");
    mediator.register(bell.clone());
    mediator.register(door);

    mediator.unregister(bell.as_ref());
    mediator.publish("Bell", "bell1", "room", "knock", Value::Null, 1);

    assert!(!mediator.is_declared("room", "knock"));
    assert!(inbox.borrow().is_empty());
    assert_eq!(mediator.get_logs_by_types(&[ActivityKind::Unregister], 1, 10).total, 1);
}

#[test]
fn test_system_component_cannot_be_removed() {
    let mediator = quiet();
    let (core, inbox) = subscriber("Core", "sys_core", "chat", "message");
    mediator.register(core.clone());
    mediator.register(publisher("Chat", "chat1", "chat", "message"));

    mediator.unregister(core.as_ref());

    assert!(mediator.is_registered("sys_core"));
    assert_eq!(mediator.get_logs_by_types(&[ActivityKind::Unregister], 1, 10).total, 0);

    mediator.publish("Chat", "chat1", "chat", "message", json!("still here?"), 1);
    assert_eq!(inbox.borrow().len(), 1);
}

#[test]
fn test_invalid_spec_registers_nothing() {
    let mediator = quiet();
    let broken = ComponentDescriptor::builder("Broken", "b1")
        .description("second group has no events")
        .merge_subscriptions(&SubscriptionSpec::new().event("chat", "message").channel("ui", vec![]))
        .publish(documented("chat", "sent"))
        .build();

    mediator.register(Rc::new(broken));

    assert!(!mediator.is_registered("b1"));
    assert!(!mediator.is_declared("chat", "sent"));
    assert!(mediator.subscribers_of("chat", "message").is_empty());
    assert_eq!(mediator.get_recent_logs(1, 10).total, 0);
}

#[test]
fn test_publish_pagination() {
    let mediator = quiet();
    mediator.register(publisher("Clock", "clk1", "clock", "tick"));

    for n in 0..25 {
        mediator.publish("Clock", "clk1", "clock", "tick", json!({ "n": n }), n);
    }

    let first = mediator.get_logs_by_types(&[ActivityKind::Publish], 1, 10);
    assert_eq!(first.total, 25);
    assert_eq!(first.logs.len(), 10);
    match &first.logs[0].payload {
        ActivityPayload::Publish(envelope) => assert_eq!(envelope.data["n"], 24),
        other => panic!("unexpected payload {other:?}"),
    }

    let third = mediator.get_logs_by_types(&[ActivityKind::Publish], 3, 10);
    assert_eq!(third.logs.len(), 5);

    let recent = mediator.get_recent_logs(1, 100);
    assert_eq!(recent.total, 26);
}

#[test]
fn test_string_type_filter() {
    let mediator = quiet();
    mediator.register(publisher("Clock", "clk1", "clock", "tick"));
    mediator.publish("Clock", "clk1", "clock", "tick", Value::Null, 1);

    let kinds: Vec<ActivityKind> = ["publish", "register"]
        .iter()
        .filter_map(|s| ActivityKind::from_str(s).ok())
        .collect();

    assert_eq!(mediator.get_logs_by_types(&kinds, 1, 10).total, 2);
}

#[test]
fn test_registered_components_message_when_empty() {
    let mediator = Mediator::new();

    let value = serde_json::to_value(mediator.get_registered_components()).unwrap();
    assert!(value["message"].is_string());
    assert!(matches!(
        mediator.get_registered_components(),
        RegisteredComponents::Empty { .. }
    ));
}

#[test]
fn test_registered_components_projection() {
    let mediator = quiet();
    let (logger, _) = subscriber("Logger", "log1", "system", "start");
    mediator.register(logger);
    mediator.register(publisher("Clock", "clk1", "system", "start"));

    let value = serde_json::to_value(mediator.get_registered_components()).unwrap();
    let components = value["registeredComponents"].as_array().unwrap();

    assert_eq!(components.len(), 2);
    assert_eq!(components[0]["code"], "log1");
    assert_eq!(components[0]["subscriptions"][0]["channel"], "system");
    assert_eq!(components[1]["publications"][0]["event"], "start");
}

#[test]
fn test_pub_sub_status_reflects_state() {
    let mediator = Mediator::new();
    let (logger, _) = subscriber("Logger", "log1", "system", "start");
    mediator.register(logger);
    mediator.register(publisher("Clock", "clk1", "system", "start"));

    let status = mediator.get_pub_sub_status();
    let start = status
        .subscriptions
        .iter()
        .find(|s| s.channel == "system" && s.event == "start")
        .unwrap();
    assert_eq!(start.subscribers, vec!["Logger"]);
    assert!(status
        .publications
        .iter()
        .any(|p| p.event == "start" && p.contributor == "clk1"));
    assert!(status
        .publications
        .iter()
        .any(|p| p.event == COMPONENT_REGISTERED && p.contributor == "sys_mediator"));

    mediator.teardown();
    let status = mediator.get_pub_sub_status();
    assert!(status.subscriptions.is_empty());
    assert_eq!(status.publications.len(), 2);
}

#[test]
fn test_system_watcher_learns_about_newcomers() {
    let mediator = Mediator::new();
    let (watcher, inbox) = subscriber("Dashboard", "dash1", SYSTEM_CHANNEL, COMPONENT_REGISTERED);
    mediator.register(watcher);

    mediator.register(publisher("Accounts", "acct1", "account", "created"));
    mediator.register(publisher("Taxes", "tax1", "tax", "filed"));

    let codes: Vec<_> = inbox
        .borrow()
        .iter()
        .map(|e| e.data["code"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(codes, vec!["dash1", "acct1", "tax1"]);
}

#[tokio::test]
async fn test_activity_feed_streams_entries() {
    let mediator = quiet();
    let mut feed = mediator.subscribe_activity();

    mediator.register(publisher("Clock", "clk1", "clock", "tick"));
    mediator.publish("Clock", "clk1", "clock", "tick", json!(1), 1);

    let register = tokio_test::assert_ok!(feed.recv().await);
    assert_eq!(register.kind, ActivityKind::Register);
    let publish = tokio_test::assert_ok!(feed.recv().await);
    assert_eq!(publish.kind, ActivityKind::Publish);
}
