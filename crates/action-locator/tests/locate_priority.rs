use std::sync::Arc;

use action_locator::{ElementLocator, KeywordMatcher, LocatorError, LocatorStrategy, MatchSource};
use aipanel_core_types::KeywordFallback;
use dom_port::{DomPort, ElementSpec, MemoryDom};

fn selectors(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn locator(dom: &MemoryDom) -> ElementLocator {
    ElementLocator::new(Arc::new(dom.clone()))
}

#[tokio::test]
async fn earlier_selector_wins_over_document_position() {
    let dom = MemoryDom::new();
    let generic = dom.append_to_body(ElementSpec::new("textarea").class("plain"));
    let specific = dom.append_to_body(
        ElementSpec::new("textarea")
            .class("chat-input")
            .attr("placeholder", "输入消息"),
    );

    let located = locator(&dom)
        .locate(&selectors(&[r#"textarea[placeholder*="输入"]"#, "textarea"]))
        .await
        .unwrap();
    assert_eq!(located.element, specific);
    assert_ne!(located.element, generic);
    assert!(matches!(located.source, MatchSource::Selector { index: 0, .. }));
    assert_eq!(located.source.strategy(), LocatorStrategy::Selector);
}

#[tokio::test]
async fn invisible_first_match_falls_through_to_next_selector() {
    let dom = MemoryDom::new();
    dom.append_to_body(
        ElementSpec::new("div")
            .style("display: none")
            .child(ElementSpec::new("textarea").class("chat-input")),
    );
    let fallback = dom.append_to_body(ElementSpec::new("div").attr("contenteditable", "true"));

    let located = locator(&dom)
        .locate(&selectors(&[
            "textarea.chat-input",
            r#"div[contenteditable="true"]"#,
        ]))
        .await
        .unwrap();
    assert_eq!(located.element, fallback);
    assert!(matches!(located.source, MatchSource::Selector { index: 1, .. }));
}

#[tokio::test]
async fn rejected_selector_is_skipped() {
    let dom = MemoryDom::new();
    let button = dom.append_to_body(ElementSpec::new("button").attr("aria-label", "Send"));

    let located = locator(&dom)
        .locate(&selectors(&[
            r##"svg use[xlink:href="#send"]"##,
            r#"button[aria-label="Send"]"#,
        ]))
        .await
        .unwrap();
    assert_eq!(located.element, button);
}

#[tokio::test]
async fn keyword_fallback_finds_icon_button() {
    let dom = MemoryDom::new();
    dom.append_to_body(ElementSpec::new("button").text("Cancel"));
    dom.append_to_body(ElementSpec::new("button").text("发送").style("visibility: hidden"));
    let icon = dom.append_to_body(
        ElementSpec::new("div")
            .attr("role", "button")
            .class("ds-icon-button")
            .child(ElementSpec::new("svg")),
    );

    let fallback = KeywordFallback::new(r#"button, div[role="button"]"#)
        .text(["send", "发送"])
        .exact([""]);
    let located = locator(&dom)
        .locate_with_fallback(&selectors(&["button.send"]), Some(&fallback))
        .await
        .unwrap();
    assert_eq!(located.element, icon);
    assert_eq!(
        located.source,
        MatchSource::Keyword {
            matcher: KeywordMatcher::ExactText(String::new())
        }
    );
    assert_eq!(located.source.strategy().name(), "keyword");
}

#[tokio::test]
async fn not_found_after_both_passes() {
    let dom = MemoryDom::new();
    dom.append_to_body(ElementSpec::new("button").text("Cancel"));
    let fallback = KeywordFallback::new("button").text(["send"]);

    let err = locator(&dom)
        .locate_with_fallback(&selectors(&["textarea"]), Some(&fallback))
        .await
        .unwrap_err();
    assert!(matches!(err, LocatorError::ElementNotFound(_)));
}

#[tokio::test]
async fn first_present_ignores_visibility() {
    let dom = MemoryDom::new();
    let hidden = dom.append_to_body(ElementSpec::new("main").style("display: none"));
    let found = tokio_test::assert_ok!(
        locator(&dom)
            .first_present(&selectors(&["div.chat", "main"]))
            .await
    );
    assert_eq!(found, Some(hidden));
    assert!(dom.query_first("div.chat").await.unwrap().is_none());
}
