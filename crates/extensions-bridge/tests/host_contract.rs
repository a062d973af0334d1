use std::sync::Arc;
use std::time::Duration;

use aipanel_core_types::{EditorKind, SiteProfile};
use dom_port::{ElementRef, ElementSpec, MemoryDom};
use extensions_bridge::{ChannelRuntime, ContentScriptHost, HostClient, Notice};
use serde_json::json;
use site_adapter::{AdapterConfig, SiteAdapter};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

fn host(dom: &MemoryDom) -> (ContentScriptHost, ChannelRuntime, UnboundedReceiver<Notice>) {
    let profile = SiteProfile::builder("deepseek")
        .display_name("DeepSeek")
        .inputs(["textarea.chat-input"])
        .sends(["button.send"])
        .containers(["div.chat"])
        .messages(["div.assistant-msg"])
        .editor_kind(EditorKind::PlainTextarea)
        .build();
    let adapter = SiteAdapter::new(Arc::new(profile), Arc::new(dom.clone()), AdapterConfig::default());
    let (runtime, notices) = ChannelRuntime::new();
    let host = ContentScriptHost::new(adapter, Arc::new(runtime.clone()));
    (host, runtime, notices)
}

fn ready() -> Notice {
    Notice::ContentScriptReady {
        ai_type: "deepseek".into(),
    }
}

fn chat_page() -> MemoryDom {
    chat_page_with_log().0
}

fn chat_page_with_log() -> (MemoryDom, ElementRef) {
    let dom = MemoryDom::new();
    dom.append_to_body(ElementSpec::new("textarea").class("chat-input"));
    dom.append_to_body(ElementSpec::new("button").class("send").text("Send"));
    let chat = dom.append_to_body(ElementSpec::new("div").class("chat"));
    (dom, chat)
}

#[tokio::test(start_paused = true)]
async fn announces_once_when_loaded() {
    let dom = chat_page();
    let (host, _runtime, mut notices) = host(&dom);

    host.start().await.unwrap();
    assert_eq!(notices.recv().await, Some(ready()));
    assert!(notices.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn announces_again_after_dom_content_loaded() {
    let dom = MemoryDom::loading();
    let (host, _runtime, mut notices) = host(&dom);

    let starting = tokio::spawn({
        let host = host.clone();
        async move { host.start().await }
    });
    assert_eq!(notices.recv().await, Some(ready()));
    assert!(notices.try_recv().is_err());

    dom.finish_loading();
    starting.await.unwrap().unwrap();
    assert_eq!(notices.recv().await, Some(ready()));
}

#[tokio::test(start_paused = true)]
async fn inject_then_read_latest() {
    let (dom, chat) = chat_page_with_log();
    let (host, _runtime, _notices) = host(&dom);
    host.start().await.unwrap();
    let (client, rx) = HostClient::channel(8);
    tokio::spawn(host.clone().serve(rx));

    let reply = client
        .request(json!({"type": "INJECT_MESSAGE", "message": "hello"}))
        .await
        .unwrap();
    assert_eq!(reply, Some(json!({"success": true})));

    dom.append(&chat, ElementSpec::new("div").class("assistant-msg").text("  world  "))
        .unwrap();
    sleep(Duration::from_millis(10)).await;

    let reply = client
        .request(json!({"type": "GET_LATEST_RESPONSE"}))
        .await
        .unwrap();
    assert_eq!(reply, Some(json!({"content": "world"})));
}

#[tokio::test(start_paused = true)]
async fn concurrent_inject_reports_busy() {
    let dom = chat_page();
    let (host, _runtime, _notices) = host(&dom);
    let (client, rx) = HostClient::channel(8);
    tokio::spawn(host.serve(rx));

    let message = json!({"type": "INJECT_MESSAGE", "message": "hi"});
    let (first, second) = tokio::join!(client.request(message.clone()), client.request(message));
    let mut replies = vec![first.unwrap().unwrap(), second.unwrap().unwrap()];
    replies.sort_by_key(|v| v["success"].as_bool());
    assert_eq!(replies, vec![json!({"success": false}), json!({"success": true})]);
}

#[tokio::test(start_paused = true)]
async fn missing_input_reports_error() {
    let dom = MemoryDom::new();
    let (host, _runtime, _notices) = host(&dom);
    let (client, rx) = HostClient::channel(8);
    tokio::spawn(host.serve(rx));

    let reply = client
        .request(json!({"type": "INJECT_MESSAGE", "message": "hi"}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reply["success"], json!(false));
    assert!(reply["error"].as_str().unwrap().starts_with("input not found"));
}

#[tokio::test(start_paused = true)]
async fn unknown_type_gets_no_reply() {
    let dom = chat_page();
    let (host, _runtime, _notices) = host(&dom);
    let (client, rx) = HostClient::channel(8);
    tokio::spawn(host.clone().serve(rx));

    let reply = client.request(json!({"type": "PING"})).await.unwrap();
    assert_eq!(reply, None);

    let reply = client.request(json!({"message": "hi"})).await.unwrap();
    assert_eq!(reply, None);
    assert!(!host.adapter().is_sending());
}

#[tokio::test(start_paused = true)]
async fn invalidated_context_is_silent() {
    let dom = chat_page();
    let (host, runtime, mut notices) = host(&dom);
    runtime.invalidate();

    host.start().await.unwrap();
    assert!(host.sender().is_suppressed());
    assert!(notices.try_recv().is_err());

    // requests keep working without the outbound channel
    let reply = host
        .handle_value(json!({"type": "GET_LATEST_RESPONSE"}))
        .await;
    assert_eq!(reply, Some(json!({"content": ""})));
}
