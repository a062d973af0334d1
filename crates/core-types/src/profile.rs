use serde::{Deserialize, Serialize};

use crate::{PanelError, SiteId};

/// How the site's chat input stores its content.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditorKind {
    /// `<textarea>`/`<input>` whose value is owned by a framework.
    PlainTextarea,
    /// Contenteditable host driven by a rich-text editor (Lexical, ProseMirror, ...).
    RichText,
}

impl Default for EditorKind {
    fn default() -> Self {
        EditorKind::PlainTextarea
    }
}

/// Attribute name plus a lower-cased substring its value must contain.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct AttributeKeyword {
    pub attribute: String,
    pub keyword: String,
}

/// Heuristic scan used when no send selector matched.
///
/// Candidates come from `scan_selector` in document order. A candidate is accepted when its
/// lower-cased text contains one of `text_keywords`, its whole trimmed text equals one of
/// `exact_texts` (the empty string marks icon-only buttons), its class attribute contains
/// one of `class_keywords`, one of `attribute_keywords` hits, or it is an `img` whose `src`
/// contains one of `image_source_keywords`.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordFallback {
    pub scan_selector: String,
    pub text_keywords: Vec<String>,
    pub exact_texts: Vec<String>,
    pub class_keywords: Vec<String>,
    pub attribute_keywords: Vec<AttributeKeyword>,
    pub image_source_keywords: Vec<String>,
}

impl KeywordFallback {
    pub fn new(scan_selector: impl Into<String>) -> Self {
        Self {
            scan_selector: scan_selector.into(),
            ..Self::default()
        }
    }

    pub fn text<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_keywords
            .extend(keywords.into_iter().map(|k| Into::<String>::into(k).to_lowercase()));
        self
    }

    pub fn exact<I, S>(mut self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exact_texts.extend(texts.into_iter().map(Into::into));
        self
    }

    pub fn class<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_keywords
            .extend(keywords.into_iter().map(|k| Into::<String>::into(k).to_lowercase()));
        self
    }

    pub fn attribute(mut self, attribute: impl Into<String>, keyword: impl Into<String>) -> Self {
        self.attribute_keywords.push(AttributeKeyword {
            attribute: attribute.into(),
            keyword: Into::<String>::into(keyword).to_lowercase(),
        });
        self
    }

    pub fn image_source(mut self, keyword: impl Into<String>) -> Self {
        let keyword: String = keyword.into();
        self.image_source_keywords.push(keyword.to_lowercase());
        self
    }
}

/// Immutable per-site configuration shared by every component of an adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SiteProfile {
    pub site: SiteId,
    #[serde(default)]
    pub display_name: String,
    pub input_selectors: Vec<String>,
    #[serde(default)]
    pub send_selectors: Vec<String>,
    #[serde(default)]
    pub send_fallback: Option<KeywordFallback>,
    /// Ancestor selector an icon glyph inside the send control is retargeted to.
    #[serde(default)]
    pub send_container: Option<String>,
    #[serde(default)]
    pub container_selectors: Vec<String>,
    #[serde(default)]
    pub message_selectors: Vec<String>,
    #[serde(default)]
    pub editor_kind: EditorKind,
}

impl SiteProfile {
    pub fn builder(site: impl Into<SiteId>) -> SiteProfileBuilder {
        SiteProfileBuilder::new(site)
    }

    pub fn validate(&self) -> Result<(), PanelError> {
        let invalid = |reason: &str| PanelError::InvalidProfile {
            site: self.site.to_string(),
            reason: reason.to_string(),
        };
        if self.site.as_str().trim().is_empty() {
            return Err(invalid("site id is empty"));
        }
        if self.input_selectors.is_empty() {
            return Err(invalid("no input selectors"));
        }
        if self.message_selectors.is_empty() {
            return Err(invalid("no message selectors"));
        }
        if let Some(fallback) = &self.send_fallback {
            if fallback.scan_selector.trim().is_empty() {
                return Err(invalid("send fallback has an empty scan selector"));
            }
        }
        Ok(())
    }

    pub fn label(&self) -> &str {
        if self.display_name.is_empty() {
            self.site.as_str()
        } else {
            &self.display_name
        }
    }
}

pub struct SiteProfileBuilder {
    profile: SiteProfile,
}

impl SiteProfileBuilder {
    pub fn new(site: impl Into<SiteId>) -> Self {
        Self {
            profile: SiteProfile {
                site: site.into(),
                display_name: String::new(),
                input_selectors: Vec::new(),
                send_selectors: Vec::new(),
                send_fallback: None,
                send_container: None,
                container_selectors: Vec::new(),
                message_selectors: Vec::new(),
                editor_kind: EditorKind::default(),
            },
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.profile.display_name = name.into();
        self
    }

    pub fn inputs<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile
            .input_selectors
            .extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn sends<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile
            .send_selectors
            .extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn send_fallback(mut self, fallback: KeywordFallback) -> Self {
        self.profile.send_fallback = Some(fallback);
        self
    }

    pub fn send_container(mut self, selector: impl Into<String>) -> Self {
        self.profile.send_container = Some(selector.into());
        self
    }

    pub fn containers<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile
            .container_selectors
            .extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn messages<I, S>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile
            .message_selectors
            .extend(selectors.into_iter().map(Into::into));
        self
    }

    pub fn editor_kind(mut self, kind: EditorKind) -> Self {
        self.profile.editor_kind = kind;
        self
    }

    pub fn build(self) -> SiteProfile {
        self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_selector_order() {
        let profile = SiteProfile::builder("demo")
            .inputs(["textarea.primary", "textarea"])
            .messages(["div.assistant-msg"])
            .build();
        assert_eq!(profile.input_selectors, vec!["textarea.primary", "textarea"]);
        assert_eq!(profile.editor_kind, EditorKind::PlainTextarea);
        assert!(profile.validate().is_ok());
        assert_eq!(profile.label(), "demo");
    }

    #[test]
    fn validate_rejects_profile_without_inputs() {
        let profile = SiteProfile::builder("broken")
            .messages(["article"])
            .build();
        let err = profile.validate().unwrap_err();
        assert!(matches!(err, PanelError::InvalidProfile { .. }));
    }

    #[test]
    fn keyword_fallback_lowercases_keywords() {
        let fallback = KeywordFallback::new("button")
            .text(["Send"])
            .class(["DS-Icon"])
            .attribute("data-icon-type", "sendChat");
        assert_eq!(fallback.text_keywords, vec!["send"]);
        assert_eq!(fallback.class_keywords, vec!["ds-icon"]);
        assert_eq!(fallback.attribute_keywords[0].keyword, "sendchat");
    }

    #[test]
    fn profile_loads_from_yaml_with_defaults() {
        let yaml = r#"
site: local
input_selectors: ["textarea.chat-input"]
message_selectors: ["div.assistant-msg"]
editor_kind: rich-text
"#;
        let profile: SiteProfile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(profile.site, SiteId::from("local"));
        assert_eq!(profile.editor_kind, EditorKind::RichText);
        assert!(profile.send_selectors.is_empty());
        assert!(profile.send_fallback.is_none());
    }
}
