use chromiumoxide::error::CdpError;
use dom_port::DomError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CdpDomError {
    #[error("browser configuration rejected: {0}")]
    Config(String),
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("devtools protocol error: {0}")]
    Protocol(String),
    #[error("page script raised: {0}")]
    Script(String),
    #[error("element {0} detached")]
    Stale(String),
    #[error("selector `{selector}` rejected: {reason}")]
    Selector { selector: String, reason: String },
    #[error("unsupported: {0}")]
    Unsupported(String),
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

impl CdpDomError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CdpDomError::Protocol(_))
    }
}

impl From<CdpError> for CdpDomError {
    fn from(err: CdpError) -> Self {
        match err {
            CdpError::JavascriptException(details) => CdpDomError::Script(details.text.clone()),
            other => CdpDomError::Protocol(other.to_string()),
        }
    }
}

impl From<CdpDomError> for DomError {
    fn from(err: CdpDomError) -> Self {
        match err {
            CdpDomError::Stale(id) => DomError::StaleElement(id),
            CdpDomError::Selector { selector, reason } => {
                DomError::InvalidSelector { selector, reason }
            }
            CdpDomError::Unsupported(detail) => DomError::Unsupported(detail),
            CdpDomError::Clipboard(detail) => DomError::ClipboardUnavailable(detail),
            CdpDomError::Script(detail) => DomError::Script(detail),
            other => DomError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_faults_keep_their_dom_meaning() {
        let stale: DomError = CdpDomError::Stale("el-3".into()).into();
        assert!(stale.is_stale());
        let transport: DomError = CdpDomError::Protocol("socket closed".into()).into();
        assert!(transport.is_retryable());
        let selector: DomError = CdpDomError::Selector {
            selector: "div[".into(),
            reason: "SyntaxError".into(),
        }
        .into();
        assert!(matches!(selector, DomError::InvalidSelector { .. }));
    }
}
