use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use aipanel_cli::{AnswerStatus, PageFactory, Relay, RelayError};
use aipanel_core_types::{EditorKind, SiteId, SiteProfile};
use async_trait::async_trait;
use dom_port::{DomAction, DomPort, ElementRef, ElementSpec, MemoryDom};
use site_adapter::{AdapterConfig, ProfileRegistry};
use tokio::time::sleep;

#[derive(Clone)]
enum Behaviour {
    /// Streams these chunks shortly after the send button is activated.
    Answer(Vec<&'static str>),
    /// Keeps appending forever.
    Endless,
    /// The chat input is a plain `div` nothing can be typed into.
    ReadOnly,
}

struct FakeSites {
    behaviours: BTreeMap<&'static str, Behaviour>,
}

#[async_trait]
impl PageFactory for FakeSites {
    async fn open(
        &self,
        profile: &SiteProfile,
        _url: Option<&str>,
    ) -> Result<Arc<dyn DomPort>, RelayError> {
        let Some(behaviour) = self.behaviours.get(profile.site.as_str()).cloned() else {
            return Err(RelayError::Open("site offline".into()));
        };
        let dom = MemoryDom::new();
        let input_tag = match behaviour {
            Behaviour::ReadOnly => "div",
            _ => "textarea",
        };
        dom.append_to_body(ElementSpec::new(input_tag).class("chat-input"));
        let send = dom.append_to_body(ElementSpec::new("button").class("send").text("Send"));
        let chat = dom.append_to_body(ElementSpec::new("div").class("chat"));
        tokio::spawn(answer_on_submit(dom.clone(), send, chat, behaviour));
        Ok(Arc::new(dom))
    }
}

async fn answer_on_submit(dom: MemoryDom, send: ElementRef, chat: ElementRef, behaviour: Behaviour) {
    while !dom.actions_for(&send).contains(&DomAction::Activated) {
        sleep(Duration::from_millis(50)).await;
    }
    sleep(Duration::from_millis(300)).await;
    let reply = dom
        .append(&chat, ElementSpec::new("div").class("assistant-msg"))
        .unwrap();
    match behaviour {
        Behaviour::Answer(chunks) => {
            for chunk in chunks {
                dom.append_text(&reply, chunk).unwrap();
                sleep(Duration::from_millis(150)).await;
            }
        }
        Behaviour::Endless => loop {
            dom.append_text(&reply, "x").unwrap();
            sleep(Duration::from_millis(100)).await;
        },
        Behaviour::ReadOnly => {}
    }
}

fn test_profile(site: &str, name: &str) -> SiteProfile {
    SiteProfile::builder(site)
        .display_name(name)
        .inputs([".chat-input"])
        .sends(["button.send"])
        .containers(["div.chat"])
        .messages(["div.assistant-msg"])
        .editor_kind(EditorKind::PlainTextarea)
        .build()
}

fn registry(sites: &[(&str, &str)]) -> Arc<ProfileRegistry> {
    let registry = ProfileRegistry::new();
    for (site, name) in sites {
        registry.register(test_profile(site, name)).unwrap();
    }
    Arc::new(registry)
}

fn ids(sites: &[&str]) -> Vec<SiteId> {
    sites.iter().map(|s| SiteId::new(*s)).collect()
}

#[tokio::test(start_paused = true)]
async fn fans_out_and_cross_references() {
    let factory = FakeSites {
        behaviours: BTreeMap::from([
            ("alpha", Behaviour::Answer(vec!["Alpha", " says", " hi"])),
            ("beta", Behaviour::Answer(vec!["  Beta agrees  "])),
        ]),
    };
    let relay = Relay::new(
        registry(&[("alpha", "Alpha"), ("beta", "Beta"), ("offline", "Offline")]),
        AdapterConfig::default(),
        Arc::new(factory),
    );

    let report = relay
        .ask("hello?", &ids(&["alpha", "beta", "ghost", "offline"]))
        .await;

    let order: Vec<_> = report.answers.iter().map(|a| a.site.as_str()).collect();
    assert_eq!(order, ["alpha", "beta", "ghost", "offline"]);
    assert_eq!(report.completed(), 2);

    let alpha = report.answer("alpha").unwrap();
    assert_eq!(alpha.status, AnswerStatus::Completed);
    assert_eq!(alpha.text, "Alpha says hi");
    assert!(alpha.samples.unwrap() >= 11);

    let beta = report.answer("beta").unwrap();
    assert_eq!(beta.text, "Beta agrees");

    let ghost = report.answer("ghost").unwrap();
    assert_eq!(ghost.status, AnswerStatus::Failed);
    assert!(ghost.error.as_deref().unwrap().contains("unknown site"));

    let offline = report.answer("offline").unwrap();
    assert_eq!(offline.status, AnswerStatus::Failed);
    assert_eq!(offline.display_name, "Offline");
    assert!(offline.error.as_deref().unwrap().contains("site offline"));

    let text = report.render_text();
    assert!(text.starts_with("Question: hello?"));
    assert!(text.contains("== Alpha (alpha) [completed"));
    assert!(text.contains("error: unknown site `ghost`"));

    let json = tokio_test::assert_ok!(serde_json::to_value(&report));
    assert_eq!(json["answers"][0]["status"], "completed");
    assert!(json["answers"][2].get("samples").is_none());
}

#[tokio::test(start_paused = true)]
async fn endless_stream_hits_the_ceiling() {
    let factory = FakeSites {
        behaviours: BTreeMap::from([("gamma", Behaviour::Endless)]),
    };
    let mut timings = AdapterConfig::default();
    timings.observer.ceiling_ms = 3_000;
    let relay = Relay::new(registry(&[("gamma", "Gamma")]), timings, Arc::new(factory));

    let report = relay.ask("count forever", &ids(&["gamma"])).await;
    let gamma = report.answer("gamma").unwrap();
    assert_eq!(gamma.status, AnswerStatus::TimedOut);
    assert!(gamma.text.starts_with("xxx"));
    assert_eq!(report.completed(), 0);
}

#[tokio::test(start_paused = true)]
async fn uncommitted_message_fails_without_waiting_for_a_reply() {
    let factory = FakeSites {
        behaviours: BTreeMap::from([("delta", Behaviour::ReadOnly)]),
    };
    let timings = AdapterConfig::default();
    let observe_delay_ms = timings.adapter.observe_delay_ms;
    let relay = Relay::new(registry(&[("delta", "Delta")]), timings, Arc::new(factory));

    let report = relay.ask("hello", &ids(&["delta"])).await;
    let delta = report.answer("delta").unwrap();
    assert_eq!(delta.status, AnswerStatus::Failed);
    assert!(delta.error.as_deref().unwrap().contains("not submitted"));
    assert!(delta.samples.is_none());
    assert!(delta.text.is_empty());
    assert!(delta.elapsed_ms < observe_delay_ms);
}
