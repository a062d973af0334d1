use std::sync::Arc;

use action_locator::Located;
use dom_port::{DomPort, ElementRef, Point};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::model::{AttemptOutcome, TriggerReport};
use crate::policy::TriggerTimings;
use crate::retarget::retarget;
use crate::strategies::{default_chain, FireCtx, SubmitStrategy};

/// Fires every activation strategy against a send control.
pub struct SubmitTrigger {
    port: Arc<dyn DomPort>,
    timings: TriggerTimings,
    chain: Vec<Box<dyn SubmitStrategy>>,
}

impl SubmitTrigger {
    pub fn new(port: Arc<dyn DomPort>, timings: TriggerTimings) -> Self {
        Self::with_chain(port, timings, default_chain())
    }

    pub fn with_chain(
        port: Arc<dyn DomPort>,
        timings: TriggerTimings,
        chain: Vec<Box<dyn SubmitStrategy>>,
    ) -> Self {
        Self {
            port,
            timings,
            chain,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|strategy| strategy.name()).collect()
    }

    /// Runs the whole chain; a failing strategy never stops the ones after it.
    #[instrument(skip_all, fields(element = %target.element))]
    pub async fn trigger(&self, target: &Located, container: Option<&str>) -> TriggerReport {
        let requested = target.element.clone();
        let element = match retarget(
            self.port.as_ref(),
            &requested,
            &target.snapshot.tag,
            container,
        )
        .await
        {
            Ok(element) => element,
            Err(err) => {
                warn!(error = %err, "retarget failed, using located element");
                requested.clone()
            }
        };
        let center = self.center_of(&element, target).await;
        let mut report = TriggerReport::new(requested, element.clone());

        let ctx = FireCtx {
            port: self.port.as_ref(),
            element: &element,
            center,
            event_gap: self.timings.event_gap(),
        };
        for (index, strategy) in self.chain.iter().enumerate() {
            if index > 0 {
                sleep(self.timings.between_strategies()).await;
            }
            let outcome = match strategy.fire(&ctx).await {
                Ok(true) => AttemptOutcome::Attempted,
                Ok(false) => AttemptOutcome::NoOp,
                Err(err) => {
                    debug!(strategy = strategy.name(), error = %err, "strategy failed");
                    AttemptOutcome::Failed(err.to_string())
                }
            };
            report.record(strategy.name(), outcome);
        }

        info!(
            control = %report.target,
            retargeted = report.retargeted,
            attempted = report.attempted(),
            "submit fired, outcome unconfirmed"
        );
        report
    }

    /// Highlights `element` so a person can finish the submission; the highlight is removed
    /// after the configured delay.
    pub async fn flag_for_manual(&self, element: &ElementRef) {
        if let Err(err) = self.port.set_highlight(element, true).await {
            debug!(%element, error = %err, "highlight not applied");
            return;
        }
        let port = Arc::clone(&self.port);
        let element = element.clone();
        let delay = self.timings.highlight();
        tokio::spawn(async move {
            sleep(delay).await;
            if let Err(err) = port.set_highlight(&element, false).await {
                debug!(%element, error = %err, "highlight not cleared");
            }
        });
    }

    async fn center_of(&self, element: &ElementRef, target: &Located) -> Point {
        if *element == target.element {
            return target.snapshot.center().unwrap_or_default();
        }
        match self.port.snapshot(element).await {
            Ok(snapshot) => snapshot.center().unwrap_or_default(),
            Err(_) => target.snapshot.center().unwrap_or_default(),
        }
    }
}
