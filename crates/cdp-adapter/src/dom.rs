use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use dom_port::{
    DomError, DomEvent, DomPort, EditCommand, ElementRef, ElementSnapshot, MutationRecord,
    MutationStream, ReadyState,
};
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, trace};

use crate::errors::CdpDomError;
use crate::script::{self, Envelope};

/// [`DomPort`] over one Chromium page.
#[derive(Clone)]
pub struct CdpDom {
    page: Page,
    poll: Duration,
}

impl CdpDom {
    pub fn new(page: Page, poll: Duration) -> Self {
        Self { page, poll }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T, CdpDomError> {
        self.eval_for(script, None).await
    }

    async fn eval_for<T: DeserializeOwned>(
        &self,
        script: String,
        selector: Option<&str>,
    ) -> Result<T, CdpDomError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .await_promise(true)
            .return_by_value(true)
            .user_gesture(true)
            .build()
            .map_err(CdpDomError::Protocol)?;
        let envelope: Envelope<T> = self
            .page
            .evaluate_expression(params)
            .await?
            .into_value()
            .map_err(|err| CdpDomError::Script(err.to_string()))?;
        match envelope {
            Envelope::Ok(value) => Ok(value),
            Envelope::Err(fault) => Err(fault.into_error(selector)),
        }
    }
}

fn to_ref(id: String) -> ElementRef {
    ElementRef::new(id)
}

#[async_trait]
impl DomPort for CdpDom {
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, DomError> {
        let ids: Vec<String> = self
            .eval_for(script::query_all(selector), Some(selector))
            .await?;
        Ok(ids.into_iter().map(to_ref).collect())
    }

    async fn query_first(&self, selector: &str) -> Result<Option<ElementRef>, DomError> {
        let found: Option<String> = self
            .eval_for(script::query_first(selector), Some(selector))
            .await?;
        Ok(found.map(to_ref))
    }

    async fn snapshot(&self, element: &ElementRef) -> Result<ElementSnapshot, DomError> {
        Ok(self.eval(script::snapshot(element.as_str())).await?)
    }

    async fn body(&self) -> Result<ElementRef, DomError> {
        Ok(to_ref(self.eval(script::body()).await?))
    }

    async fn closest(
        &self,
        element: &ElementRef,
        selector: &str,
    ) -> Result<Option<ElementRef>, DomError> {
        let found: Option<String> = self
            .eval_for(script::closest(element.as_str(), selector), Some(selector))
            .await?;
        Ok(found.map(to_ref))
    }

    async fn parent(&self, element: &ElementRef) -> Result<Option<ElementRef>, DomError> {
        let found: Option<String> = self.eval(script::parent(element.as_str())).await?;
        Ok(found.map(to_ref))
    }

    async fn text_content(&self, element: &ElementRef) -> Result<String, DomError> {
        Ok(self.eval(script::text_content(element.as_str())).await?)
    }

    async fn focus(&self, element: &ElementRef) -> Result<(), DomError> {
        Ok(self.eval(script::focus(element.as_str())).await?)
    }

    async fn set_native_value(&self, element: &ElementRef, value: &str) -> Result<(), DomError> {
        Ok(self
            .eval(script::set_native_value(element.as_str(), value))
            .await?)
    }

    async fn clear_content(&self, element: &ElementRef) -> Result<(), DomError> {
        Ok(self.eval(script::clear_content(element.as_str())).await?)
    }

    async fn dispatch(&self, element: &ElementRef, event: DomEvent) -> Result<(), DomError> {
        trace!(element = %element, event = event.type_name(), "dispatch");
        Ok(self.eval(script::dispatch(element.as_str(), &event)).await?)
    }

    async fn activate(&self, element: &ElementRef) -> Result<(), DomError> {
        Ok(self.eval(script::activate(element.as_str())).await?)
    }

    async fn invoke_framework_handler(&self, element: &ElementRef) -> Result<bool, DomError> {
        Ok(self
            .eval(script::invoke_framework_handler(element.as_str()))
            .await?)
    }

    async fn clipboard_write(&self, text: &str) -> Result<(), DomError> {
        Ok(self.eval(script::clipboard_write(text)).await?)
    }

    async fn exec_command(&self, command: EditCommand) -> Result<bool, DomError> {
        Ok(self.eval(script::exec_command(&command)).await?)
    }

    async fn set_highlight(&self, element: &ElementRef, on: bool) -> Result<(), DomError> {
        Ok(self.eval(script::set_highlight(element.as_str(), on)).await?)
    }

    async fn ready_state(&self) -> Result<ReadyState, DomError> {
        Ok(self.eval(script::ready_state()).await?)
    }

    async fn dom_content_loaded(&self) -> Result<(), DomError> {
        while self.ready_state().await?.is_loading() {
            sleep(self.poll).await;
        }
        Ok(())
    }

    async fn observe_mutations(&self, root: &ElementRef) -> Result<MutationStream, DomError> {
        let key: String = self.eval(script::observe(root.as_str())).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        let dom = self.clone();
        let root = root.clone();
        tokio::spawn(async move {
            let mut ticker = interval(dom.poll);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    _ = ticker.tick() => {}
                }
                let taken: Result<Option<u64>, CdpDomError> =
                    dom.eval(script::take_mutations(&key)).await;
                match taken {
                    Ok(Some(0)) => {}
                    Ok(Some(added)) => {
                        let record = MutationRecord {
                            target: root.clone(),
                            added_nodes: added as usize,
                        };
                        if tx.send(record).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        debug!(root = %root, "observed root went away");
                        break;
                    }
                    Err(err) => {
                        debug!(error = %err, "mutation polling stopped");
                        break;
                    }
                }
            }
            if let Err(err) = dom.eval::<()>(script::disconnect(&key)).await {
                trace!(error = %err, "observer disconnect skipped");
            }
        });
        Ok(rx)
    }
}
