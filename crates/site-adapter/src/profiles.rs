//! Built-in profiles for the supported chat sites.

use aipanel_core_types::{EditorKind, KeywordFallback, SiteProfile};

/// Candidate reply containers, shared by every built-in site.
pub const CONTAINER_SELECTORS: &[&str] = &[
    r#"div[class*="chat"]"#,
    r#"div[class*="message"]"#,
    r#"div[class*="conversation"]"#,
    "main",
    r#"[role="main"]"#,
    r#"div[id*="chat"]"#,
    r#"div[id*="message"]"#,
];

/// Assistant message selectors, shared by every built-in site.
pub const MESSAGE_SELECTORS: &[&str] = &[
    r#"div[class*="message"][class*="assistant"]"#,
    r#"div[class*="chat"] div[class*="assistant"]"#,
    r#"div[data-message-role="assistant"]"#,
    r#"div[class*="markdown"]"#,
    r#"div[class*="markdown-prose"]"#,
    "article",
    r#"[data-testid*="assistant"]"#,
    "[data-message-id]",
];

const GENERIC_SEND_SELECTORS: &[&str] = &[
    r#"button[aria-label="Send"]"#,
    r#"button[aria-label="send"]"#,
    r#"button[aria-label="发送"]"#,
    r#"button[type="submit"]"#,
    r#"button[class*="send"]"#,
    r#"button[class*="submit"]"#,
    r#"div[role="button"][class*="send"]"#,
    "button:has(svg)",
];

const SEND_WORDS: [&str; 3] = ["send", "发送", "提交"];

fn with_generic_sends(site_specific: &[&str]) -> Vec<String> {
    site_specific
        .iter()
        .chain(GENERIC_SEND_SELECTORS)
        .map(|s| s.to_string())
        .collect()
}

pub fn deepseek() -> SiteProfile {
    let sends = [
        r#"div.ds-icon-button[role="button"]"#,
        r#"div[class*="ds-icon-button"][role="button"]"#,
        r#"div[class*="ds-icon-button"]"#,
        r#"button[aria-label="Send"]"#,
        r#"button[aria-label="send"]"#,
        r#"button[type="submit"]"#,
        r#"button[class*="send"]"#,
        r#"button[class*="submit"]"#,
        r#"div[role="button"][class*="send"]"#,
        r#"svg[class*="send"]"#,
        "button:has(svg)",
    ];

    SiteProfile::builder("deepseek")
        .display_name("DeepSeek")
        .inputs([
            r#"textarea[placeholder*="输入"]"#,
            r#"textarea[placeholder*="message"]"#,
            r#"textarea[placeholder*="Message"]"#,
            r#"textarea[placeholder*="问DeepSeek"]"#,
            r#"textarea[class*="input"]"#,
            r#"textarea[class*="textarea"]"#,
            r#"div[contenteditable="true"]"#,
            "textarea",
        ])
        .sends(sends)
        .send_fallback(
            KeywordFallback::new(r#"button, div[role="button"]"#)
                .text(SEND_WORDS)
                .exact([""])
                .class(["send", "submit", "icon", "button", "ds-icon"]),
        )
        .containers(CONTAINER_SELECTORS.iter().copied())
        .messages(MESSAGE_SELECTORS.iter().copied())
        .editor_kind(EditorKind::PlainTextarea)
        .build()
}

pub fn kimi() -> SiteProfile {
    SiteProfile::builder("kimi")
        .display_name("Kimi")
        .inputs([
            r#"div.chat-input-editor[contenteditable="true"]"#,
            r#"div[contenteditable="true"][data-lexical-editor="true"]"#,
            r#"div[role="textbox"][contenteditable="true"]"#,
            r#"div[class*="chat-input-editor"][contenteditable="true"]"#,
            r#"div[contenteditable="true"].chat-input-editor"#,
            r#"textarea[placeholder*="输入"]"#,
            r#"textarea[placeholder*="message"]"#,
            r#"textarea[placeholder*="问Kimi"]"#,
            r#"div[contenteditable="true"]"#,
        ])
        .sends(with_generic_sends(&[
            "div.send-button-container:not(.disabled) svg.send-icon",
            "div.send-button-container svg.send-icon",
        ]))
        .send_fallback(
            KeywordFallback::new(r#"button, div[role="button"], svg[class*="send"]"#)
                .text(SEND_WORDS)
                .exact([""])
                .class(["send", "submit", "icon", "button"]),
        )
        .send_container(".send-button-container")
        .containers(CONTAINER_SELECTORS.iter().copied())
        .messages(MESSAGE_SELECTORS.iter().copied())
        .editor_kind(EditorKind::RichText)
        .build()
}

pub fn qwen() -> SiteProfile {
    SiteProfile::builder("qwen")
        .display_name("Qwen")
        .inputs([
            r#"textarea[placeholder*="输入"]"#,
            r#"textarea[placeholder*="message"]"#,
            r#"textarea[placeholder*="Message"]"#,
            r#"textarea[placeholder*="问通义"]"#,
            r#"textarea[placeholder*="和千问"]"#,
            r#"textarea[placeholder*="向通义提问"]"#,
            r#"textarea[placeholder*="发给通义千问"]"#,
            r#"textarea[class*="input"]"#,
            r#"textarea[class*="textarea"]"#,
            r#"div[contenteditable="true"]"#,
            "textarea",
        ])
        .sends(with_generic_sends(&[
            r#"span[data-icon-type="qwpcicon-sendChat"]"#,
            r#"div[class*="operateBtn"] span[data-icon-type="qwpcicon-sendChat"]"#,
            r##"svg use[xlink\:href="#qwpcicon-sendChat"]"##,
            r#"div[class*="operateBtn"]"#,
        ]))
        .send_fallback(
            KeywordFallback::new(
                r#"button, div[class*="operateBtn"], span[data-icon-type], svg, use"#,
            )
            .text(SEND_WORDS)
            .exact([""])
            .class(["operatebtn", "send", "submit"])
            .attribute("data-icon-type", "sendChat"),
        )
        .send_container(r#"div[class*="operateBtn"]"#)
        .containers(CONTAINER_SELECTORS.iter().copied())
        .messages(MESSAGE_SELECTORS.iter().copied())
        .editor_kind(EditorKind::PlainTextarea)
        .build()
}

pub fn chatglm() -> SiteProfile {
    let mut sends = with_generic_sends(&[
        "div.enter-icon-container:not(.empty) img.enter_icon",
        "div.enter-icon-container img.enter_icon",
        r#"div[class*="enter-icon"] img[src*="send"]"#,
        "div.enter-icon-container",
    ]);
    sends.push(r#"svg[class*="send"]"#.to_string());

    SiteProfile::builder("chatglm")
        .display_name("ChatGLM")
        .inputs([
            r#"textarea[placeholder*="输入"]"#,
            r#"textarea[placeholder*="message"]"#,
            r#"textarea[placeholder*="Message"]"#,
            r#"textarea[placeholder*="问智谱"]"#,
            r#"textarea[placeholder*="和GLM"]"#,
            r#"textarea[class*="input"]"#,
            r#"textarea[class*="textarea"]"#,
            r#"div[contenteditable="true"]"#,
            "textarea",
        ])
        .sends(sends)
        .send_fallback(
            KeywordFallback::new(r#"button, div[class*="icon"], img[src*="send"]"#)
                .text(SEND_WORDS)
                .exact(["新对话"])
                .class(["enter-icon", "send", "submit"])
                .image_source("send"),
        )
        .send_container(".enter-icon-container")
        .containers(CONTAINER_SELECTORS.iter().copied())
        .messages(MESSAGE_SELECTORS.iter().copied())
        .editor_kind(EditorKind::PlainTextarea)
        .build()
}

/// Every built-in profile, in registration order.
pub fn builtin_profiles() -> Vec<SiteProfile> {
    vec![deepseek(), kimi(), qwen(), chatglm()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_validate() {
        for profile in builtin_profiles() {
            profile.validate().unwrap();
            assert_eq!(profile.container_selectors.len(), CONTAINER_SELECTORS.len());
            assert_eq!(profile.message_selectors.len(), MESSAGE_SELECTORS.len());
        }
    }

    #[test]
    fn only_kimi_is_rich_text() {
        let rich: Vec<_> = builtin_profiles()
            .into_iter()
            .filter(|p| p.editor_kind == EditorKind::RichText)
            .map(|p| p.site.to_string())
            .collect();
        assert_eq!(rich, vec!["kimi"]);
    }

    #[test]
    fn deepseek_send_table_order() {
        let profile = deepseek();
        assert_eq!(profile.send_selectors[0], r#"div.ds-icon-button[role="button"]"#);
        assert_eq!(
            profile.send_selectors.last().map(String::as_str),
            Some("button:has(svg)")
        );
        assert!(profile
            .send_selectors
            .iter()
            .all(|s| s != r#"button[aria-label="发送"]"#));
        assert!(profile.send_container.is_none());
    }

    #[test]
    fn retarget_containers_follow_site_markup() {
        assert_eq!(kimi().send_container.as_deref(), Some(".send-button-container"));
        assert_eq!(chatglm().send_container.as_deref(), Some(".enter-icon-container"));
        assert_eq!(
            chatglm().send_selectors.last().map(String::as_str),
            Some(r#"svg[class*="send"]"#)
        );
    }
}
