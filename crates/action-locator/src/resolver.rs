//! Element locator with fallback chain orchestration

use crate::{errors::LocatorError, strategies::*, types::*};
use aipanel_core_types::KeywordFallback;
use dom_port::{DomError, DomPort, ElementRef};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Priority-ordered element locator bound to one page
#[derive(Clone)]
pub struct ElementLocator {
    port: Arc<dyn DomPort>,
}

impl ElementLocator {
    /// Create a new locator over a page port
    pub fn new(port: Arc<dyn DomPort>) -> Self {
        Self { port }
    }

    /// First visible match of the selector list; ties go to the earlier selector
    pub async fn locate(&self, selectors: &[String]) -> Result<Located, LocatorError> {
        self.locate_with_fallback(selectors, None).await
    }

    /// Selector pass, then the keyword scan when `fallback` is given
    pub async fn locate_with_fallback(
        &self,
        selectors: &[String],
        fallback: Option<&KeywordFallback>,
    ) -> Result<Located, LocatorError> {
        let mut chain: Vec<Box<dyn Strategy>> = vec![Box::new(SelectorStrategy::new(selectors))];
        if let Some(fallback) = fallback {
            chain.push(Box::new(KeywordStrategy::new(fallback)));
        }

        for strategy in &chain {
            debug!("Trying strategy: {}", strategy.name());
            match strategy.resolve(self.port.as_ref()).await {
                Ok(Some(located)) => {
                    info!(
                        "Located element using {} strategy: {}",
                        strategy.name(),
                        located.element
                    );
                    return Ok(located);
                }
                Ok(None) => {
                    debug!("Strategy {} returned no visible candidate", strategy.name());
                }
                Err(e) => {
                    warn!("Strategy {} failed: {}", strategy.name(), e);
                }
            }
        }

        Err(LocatorError::ElementNotFound(format!(
            "no visible match among {} selector(s){}",
            selectors.len(),
            if fallback.is_some() {
                " or keyword heuristics"
            } else {
                ""
            }
        )))
    }

    /// First element matched by any selector, without a visibility check
    pub async fn first_present(
        &self,
        selectors: &[String],
    ) -> Result<Option<ElementRef>, LocatorError> {
        for selector in selectors {
            match self.port.query_first(selector).await {
                Ok(Some(element)) => return Ok(Some(element)),
                Ok(None) => continue,
                Err(DomError::InvalidSelector { .. }) => {
                    debug!(selector = %selector, "selector rejected by page, skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(None)
    }

    /// Underlying page port
    pub fn port(&self) -> &Arc<dyn DomPort> {
        &self.port
    }
}
