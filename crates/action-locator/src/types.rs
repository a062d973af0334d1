//! Core types for locator system

use aipanel_core_types::KeywordFallback;
use dom_port::{ElementRef, ElementSnapshot};
use serde::{Deserialize, Serialize};

/// Locator strategy enumeration
///
/// Two passes in fallback order:
/// - Selector: the site's ordered selector list
/// - Keyword: heuristic scan over a broader element class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocatorStrategy {
    /// Ordered selector list
    Selector,

    /// Keyword heuristics over scanned candidates
    Keyword,
}

impl LocatorStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            LocatorStrategy::Selector => "selector",
            LocatorStrategy::Keyword => "keyword",
        }
    }
}

/// Typed keyword matcher, evaluated against an element snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeywordMatcher {
    /// Lower-cased text content contains the keyword
    Text(String),

    /// Trimmed text content equals the value (empty = icon-only control)
    ExactText(String),

    /// Lower-cased class attribute contains the keyword
    Class(String),

    /// Lower-cased attribute value contains the keyword
    Attribute { attribute: String, keyword: String },

    /// `<img>` whose `src` contains the keyword
    ImageSource(String),
}

impl KeywordMatcher {
    /// Get matcher kind as string
    pub fn kind(&self) -> &'static str {
        match self {
            KeywordMatcher::Text(_) => "text",
            KeywordMatcher::ExactText(_) => "exact-text",
            KeywordMatcher::Class(_) => "class",
            KeywordMatcher::Attribute { .. } => "attribute",
            KeywordMatcher::ImageSource(_) => "image-source",
        }
    }

    /// Check whether the snapshot satisfies this matcher
    pub fn matches(&self, snapshot: &ElementSnapshot) -> bool {
        match self {
            KeywordMatcher::Text(keyword) => snapshot.text.to_lowercase().contains(keyword),
            KeywordMatcher::ExactText(expected) => snapshot.text.trim() == expected,
            KeywordMatcher::Class(keyword) => {
                snapshot.class_name().to_lowercase().contains(keyword)
            }
            KeywordMatcher::Attribute { attribute, keyword } => snapshot
                .attr(attribute)
                .map_or(false, |value| value.to_lowercase().contains(keyword)),
            KeywordMatcher::ImageSource(keyword) => {
                snapshot.tag == "img"
                    && snapshot
                        .attr("src")
                        .map_or(false, |src| src.to_lowercase().contains(keyword))
            }
        }
    }
}

/// Expand a keyword fallback into its ranked matcher list
pub fn keyword_matchers(fallback: &KeywordFallback) -> Vec<KeywordMatcher> {
    let mut matchers = Vec::new();
    matchers.extend(fallback.text_keywords.iter().cloned().map(KeywordMatcher::Text));
    matchers.extend(
        fallback
            .exact_texts
            .iter()
            .cloned()
            .map(KeywordMatcher::ExactText),
    );
    matchers.extend(
        fallback
            .class_keywords
            .iter()
            .cloned()
            .map(KeywordMatcher::Class),
    );
    matchers.extend(fallback.attribute_keywords.iter().map(|entry| {
        KeywordMatcher::Attribute {
            attribute: entry.attribute.clone(),
            keyword: entry.keyword.clone(),
        }
    }));
    matchers.extend(
        fallback
            .image_source_keywords
            .iter()
            .cloned()
            .map(KeywordMatcher::ImageSource),
    );
    matchers
}

/// First matcher (in rank order) the snapshot satisfies
pub fn classify<'m>(
    snapshot: &ElementSnapshot,
    matchers: &'m [KeywordMatcher],
) -> Option<&'m KeywordMatcher> {
    matchers.iter().find(|matcher| matcher.matches(snapshot))
}

/// How a located element was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchSource {
    /// Matched the selector at `index` of the ordered list
    Selector { index: usize, selector: String },

    /// Matched a keyword heuristic during the fallback scan
    Keyword { matcher: KeywordMatcher },
}

impl MatchSource {
    /// Strategy that produced this match
    pub fn strategy(&self) -> LocatorStrategy {
        match self {
            MatchSource::Selector { .. } => LocatorStrategy::Selector,
            MatchSource::Keyword { .. } => LocatorStrategy::Keyword,
        }
    }
}

/// Resolution result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Located {
    /// Resolved element handle
    pub element: ElementRef,

    /// Snapshot taken when the element passed the visibility check
    pub snapshot: ElementSnapshot,

    /// How the element was found
    pub source: MatchSource,
}

impl Located {
    /// Create a new resolution result
    pub fn new(snapshot: ElementSnapshot, source: MatchSource) -> Self {
        Self {
            element: snapshot.element.clone(),
            snapshot,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_port::ComputedStyle;
    use std::collections::BTreeMap;

    fn snapshot(tag: &str, text: &str, attrs: &[(&str, &str)]) -> ElementSnapshot {
        ElementSnapshot {
            element: ElementRef::new("el"),
            tag: tag.to_string(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            text: text.to_string(),
            style: ComputedStyle::default(),
            has_layout: true,
            rect: None,
        }
    }

    #[test]
    fn matchers_follow_fallback_rank() {
        let fallback = KeywordFallback::new("button")
            .text(["send", "发送"])
            .exact([""])
            .class(["submit"])
            .attribute("data-icon-type", "sendChat")
            .image_source("send");
        let matchers = keyword_matchers(&fallback);
        let kinds: Vec<_> = matchers.iter().map(KeywordMatcher::kind).collect();
        assert_eq!(
            kinds,
            vec!["text", "text", "exact-text", "class", "attribute", "image-source"]
        );
    }

    #[test]
    fn classify_picks_first_hit() {
        let fallback = KeywordFallback::new("button")
            .text(["发送"])
            .class(["icon"]);
        let matchers = keyword_matchers(&fallback);

        let labelled = snapshot("button", " 发送 ", &[("class", "Icon-Btn")]);
        assert_eq!(
            classify(&labelled, &matchers),
            Some(&KeywordMatcher::Text("发送".into()))
        );

        let icon = snapshot("button", "", &[("class", "Icon-Btn")]);
        assert_eq!(
            classify(&icon, &matchers),
            Some(&KeywordMatcher::Class("icon".into()))
        );

        let other = snapshot("button", "Cancel", &[]);
        assert!(classify(&other, &matchers).is_none());
    }

    #[test]
    fn attribute_and_image_matchers_ignore_case() {
        let span = snapshot("span", "", &[("data-icon-type", "qwpcicon-sendChat")]);
        let attr = KeywordMatcher::Attribute {
            attribute: "data-icon-type".into(),
            keyword: "sendchat".into(),
        };
        assert!(attr.matches(&span));

        let img = snapshot("img", "", &[("src", "/static/Send.svg")]);
        assert!(KeywordMatcher::ImageSource("send".into()).matches(&img));
        assert!(!KeywordMatcher::ImageSource("send".into()).matches(&span));
    }
}
