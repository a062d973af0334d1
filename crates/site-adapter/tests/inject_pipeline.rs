use std::sync::Arc;
use std::time::Duration;

use aipanel_core_types::{EditorKind, KeywordFallback, SiteProfile};
use dom_port::{DomAction, ElementSpec, MemoryDom};
use response_observer::StreamOutcome;
use site_adapter::{AdapterConfig, AdapterError, InjectOutcome, InjectionStage, SiteAdapter};
use tokio::time::sleep;

fn profile(input: &str) -> Arc<SiteProfile> {
    Arc::new(
        SiteProfile::builder("test")
            .display_name("Test Chat")
            .inputs([input])
            .sends(["button.send"])
            .send_fallback(KeywordFallback::new("button").text(["send"]))
            .containers(["div.chat"])
            .messages(["div.assistant-msg"])
            .editor_kind(EditorKind::PlainTextarea)
            .build(),
    )
}

fn adapter(dom: &MemoryDom, input: &str) -> SiteAdapter {
    SiteAdapter::new(profile(input), Arc::new(dom.clone()), AdapterConfig::default())
}

#[tokio::test(start_paused = true)]
async fn end_to_end_reply_is_captured() {
    let dom = MemoryDom::new();
    let textarea = dom.append_to_body(ElementSpec::new("textarea").class("chat-input"));
    let send = dom.append_to_body(ElementSpec::new("button").class("send").text("Send"));
    let chat = dom.append_to_body(ElementSpec::new("div").class("chat"));

    let adapter = adapter(&dom, "textarea.chat-input");
    tokio_test::assert_ok!(adapter.start().await);
    let mut completion = adapter.subscribe_completion();

    let outcome = adapter.inject("hello").await.unwrap();
    let InjectOutcome::Submitted { trigger, .. } = &outcome else {
        panic!("expected submit, got {outcome:?}");
    };
    assert_eq!(trigger.as_ref().unwrap().target, send);
    assert_eq!(dom.value_of(&textarea).as_deref(), Some("hello"));
    assert!(dom.actions_for(&send).contains(&DomAction::Highlight(true)));
    assert_eq!(adapter.stage(), InjectionStage::Idle);

    // the page answers half a second after the submit
    sleep(Duration::from_millis(500)).await;
    dom.append(&chat, ElementSpec::new("div").class("assistant-msg").text("hello"))
        .unwrap();
    sleep(Duration::from_millis(10)).await;
    assert_eq!(adapter.latest_response(), "hello");

    completion.changed().await.unwrap();
    let outcome = completion.borrow().clone().unwrap();
    assert!(matches!(outcome, StreamOutcome::Completed { ref text, .. } if text == "hello"));
    assert_eq!(adapter.latest_response(), "hello");
}

#[tokio::test(start_paused = true)]
async fn second_injection_is_rejected_while_sending() {
    let dom = MemoryDom::new();
    dom.append_to_body(ElementSpec::new("textarea").class("chat-input"));
    dom.append_to_body(ElementSpec::new("button").class("send"));
    let adapter = adapter(&dom, "textarea.chat-input");

    let (first, second) = tokio::join!(adapter.inject("one"), adapter.inject("two"));
    let outcomes = [first.unwrap(), second.unwrap()];
    assert_eq!(outcomes.iter().filter(|o| o.is_busy()).count(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.label() == "submitted").count(), 1);

    // still inside the cooldown
    assert!(adapter.inject("three").await.unwrap().is_busy());
}

#[tokio::test(start_paused = true)]
async fn sending_flag_released_after_missing_input() {
    let dom = MemoryDom::new();
    let adapter = adapter(&dom, "textarea.chat-input");

    let err = adapter.inject("hi").await.unwrap_err();
    assert!(matches!(err, AdapterError::InputNotFound(_)));
    assert!(adapter.is_sending());
    assert_eq!(adapter.stage(), InjectionStage::Idle);

    sleep(Duration::from_millis(1001)).await;
    assert!(!adapter.is_sending());
}

#[tokio::test(start_paused = true)]
async fn commit_failure_degrades_and_releases_flag() {
    let dom = MemoryDom::new();
    dom.append_to_body(ElementSpec::new("div").class("fake-input"));
    let send = dom.append_to_body(ElementSpec::new("button").class("send"));
    let adapter = adapter(&dom, "div.fake-input");
    let completion = adapter.subscribe_completion();

    let outcome = adapter.inject("hi").await.unwrap();
    assert!(matches!(
        outcome,
        InjectOutcome::Degraded {
            stage: InjectionStage::Committing,
            ..
        }
    ));
    assert!(dom.actions_for(&send).is_empty());

    // the cycle ends at once instead of leaving subscribers waiting for a reply
    let published = completion.borrow().clone();
    assert!(matches!(published, Some(StreamOutcome::Abandoned { .. })));

    sleep(Duration::from_millis(1001)).await;
    assert!(!adapter.is_sending());
}

#[tokio::test(start_paused = true)]
async fn missing_send_control_still_arms_observer() {
    let dom = MemoryDom::new();
    dom.append_to_body(ElementSpec::new("textarea").class("chat-input"));
    let chat = dom.append_to_body(ElementSpec::new("div").class("chat"));
    dom.append(&chat, ElementSpec::new("div").class("assistant-msg").text("typed by hand"))
        .unwrap();
    let adapter = adapter(&dom, "textarea.chat-input");
    let mut completion = adapter.subscribe_completion();

    let outcome = adapter.inject("hi").await.unwrap();
    assert!(matches!(outcome, InjectOutcome::Submitted { trigger: None, .. }));

    completion.changed().await.unwrap();
    let outcome = completion.borrow().clone().unwrap();
    assert!(outcome.is_completed());
    assert_eq!(outcome.text(), "typed by hand");
}
