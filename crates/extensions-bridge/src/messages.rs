use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::BridgeError;

const KNOWN_TYPES: &[&str] = &["INJECT_MESSAGE", "GET_LATEST_RESPONSE"];

/// Requests accepted from the extension background.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    InjectMessage { message: String },
    GetLatestResponse,
}

impl Request {
    /// Parses a raw envelope. A missing or unknown `type` yields `Ok(None)` and gets no reply.
    pub fn from_value(value: Value) -> Result<Option<Self>, BridgeError> {
        let Some(kind) = value.get("type").and_then(Value::as_str) else {
            return Ok(None);
        };
        if !KNOWN_TYPES.contains(&kind) {
            return Ok(None);
        }
        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| BridgeError::Malformed(err.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Request::InjectMessage { .. } => "INJECT_MESSAGE",
            Request::GetLatestResponse => "GET_LATEST_RESPONSE",
        }
    }
}

/// Unsolicited messages the host posts to the background.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notice {
    ContentScriptReady {
        #[serde(rename = "aiType")]
        ai_type: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InjectReply {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn busy() -> Self {
        Self {
            success: false,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestReply {
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Inject(InjectReply),
    Latest(LatestReply),
}

impl Reply {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_requests() {
        let inject = Request::from_value(json!({"type": "INJECT_MESSAGE", "message": "hi"}))
            .unwrap()
            .unwrap();
        assert_eq!(
            inject,
            Request::InjectMessage {
                message: "hi".into()
            }
        );
        let latest = Request::from_value(json!({"type": "GET_LATEST_RESPONSE"}))
            .unwrap()
            .unwrap();
        assert_eq!(latest.kind(), "GET_LATEST_RESPONSE");
    }

    #[test]
    fn unknown_type_is_ignored() {
        let parsed = Request::from_value(json!({"type": "PING"})).unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn untyped_envelope_is_ignored() {
        assert!(Request::from_value(json!({"message": "hi"})).unwrap().is_none());
        assert!(Request::from_value(json!({"type": 7})).unwrap().is_none());
        assert!(Request::from_value(json!("INJECT_MESSAGE")).unwrap().is_none());
    }

    #[test]
    fn known_type_with_bad_fields_is_malformed() {
        let err = Request::from_value(json!({"type": "INJECT_MESSAGE"})).unwrap_err();
        assert!(matches!(err, BridgeError::Malformed(_)));
        let err = Request::from_value(json!({"type": "INJECT_MESSAGE", "message": 3})).unwrap_err();
        assert!(matches!(err, BridgeError::Malformed(_)));
    }

    #[test]
    fn wire_shapes() {
        let ready = Notice::ContentScriptReady {
            ai_type: "kimi".into(),
        };
        assert_eq!(
            serde_json::to_value(&ready).unwrap(),
            json!({"type": "CONTENT_SCRIPT_READY", "aiType": "kimi"})
        );
        assert_eq!(
            Reply::Inject(InjectReply::busy()).to_value(),
            json!({"success": false})
        );
        assert_eq!(
            Reply::Inject(InjectReply::failed("input not found")).to_value(),
            json!({"success": false, "error": "input not found"})
        );
        assert_eq!(
            Reply::Latest(LatestReply {
                content: "42".into()
            })
            .to_value(),
            json!({"content": "42"})
        );
    }
}
