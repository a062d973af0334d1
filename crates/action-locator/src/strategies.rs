//! Element resolution strategies
//!
//! Two strategies in fallback order:
//! 1. Selector - one `querySelector` per entry, first visible result wins
//! 2. Keyword - scan a broad element class, first visible keyword hit wins

use crate::{errors::LocatorError, types::*, visibility::is_visible};
use aipanel_core_types::KeywordFallback;
use async_trait::async_trait;
use dom_port::{DomError, DomPort};
use tracing::debug;

/// Strategy trait for element resolution
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Attempt to resolve a visible element using this strategy
    async fn resolve(&self, port: &dyn DomPort) -> Result<Option<Located>, LocatorError>;

    /// Get strategy type
    fn strategy_type(&self) -> LocatorStrategy;

    /// Get strategy name
    fn name(&self) -> &'static str {
        self.strategy_type().name()
    }
}

/// Selector errors that only disqualify one entry of the list.
fn skippable(err: &DomError) -> bool {
    matches!(
        err,
        DomError::InvalidSelector { .. } | DomError::StaleElement(_) | DomError::Script(_)
    )
}

/// Ordered selector list strategy
pub struct SelectorStrategy {
    selectors: Vec<String>,
}

impl SelectorStrategy {
    /// Create a new selector strategy
    pub fn new(selectors: &[String]) -> Self {
        Self {
            selectors: selectors.to_vec(),
        }
    }
}

#[async_trait]
impl Strategy for SelectorStrategy {
    async fn resolve(&self, port: &dyn DomPort) -> Result<Option<Located>, LocatorError> {
        for (index, selector) in self.selectors.iter().enumerate() {
            let element = match port.query_first(selector).await {
                Ok(Some(element)) => element,
                Ok(None) => {
                    debug!(selector = %selector, "selector matched nothing");
                    continue;
                }
                Err(err) if skippable(&err) => {
                    debug!(selector = %selector, error = %err, "selector skipped");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let snapshot = match port.snapshot(&element).await {
                Ok(snapshot) => snapshot,
                Err(err) if skippable(&err) => {
                    debug!(selector = %selector, error = %err, "match vanished before snapshot");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if is_visible(&snapshot) {
                debug!(selector = %selector, index, element = %element, "selector matched");
                return Ok(Some(Located::new(
                    snapshot,
                    MatchSource::Selector {
                        index,
                        selector: selector.clone(),
                    },
                )));
            }
            debug!(selector = %selector, "first match is not visible");
        }
        Ok(None)
    }

    fn strategy_type(&self) -> LocatorStrategy {
        LocatorStrategy::Selector
    }
}

/// Keyword heuristic strategy
pub struct KeywordStrategy {
    scan_selector: String,
    matchers: Vec<KeywordMatcher>,
}

impl KeywordStrategy {
    /// Create a new keyword strategy from a site's fallback description
    pub fn new(fallback: &KeywordFallback) -> Self {
        Self {
            scan_selector: fallback.scan_selector.clone(),
            matchers: keyword_matchers(fallback),
        }
    }
}

#[async_trait]
impl Strategy for KeywordStrategy {
    async fn resolve(&self, port: &dyn DomPort) -> Result<Option<Located>, LocatorError> {
        if self.matchers.is_empty() {
            return Ok(None);
        }
        let candidates = match port.query_all(&self.scan_selector).await {
            Ok(candidates) => candidates,
            Err(err) if skippable(&err) => {
                debug!(selector = %self.scan_selector, error = %err, "scan selector skipped");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        debug!(
            selector = %self.scan_selector,
            count = candidates.len(),
            "scanning keyword candidates"
        );

        for element in candidates {
            let snapshot = match port.snapshot(&element).await {
                Ok(snapshot) => snapshot,
                Err(err) if skippable(&err) => continue,
                Err(err) => return Err(err.into()),
            };
            let Some(matcher) = classify(&snapshot, &self.matchers) else {
                continue;
            };
            if !is_visible(&snapshot) {
                continue;
            }
            debug!(element = %element, matcher = matcher.kind(), "keyword candidate accepted");
            let matcher = matcher.clone();
            return Ok(Some(Located::new(snapshot, MatchSource::Keyword { matcher })));
        }
        Ok(None)
    }

    fn strategy_type(&self) -> LocatorStrategy {
        LocatorStrategy::Keyword
    }
}
