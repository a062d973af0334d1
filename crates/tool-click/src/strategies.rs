//! Activation strategies, tried in order against the send control.
//!
//! Pages differ in which synthetic signal their framework listens to, so the chain covers the
//! native click, a pointer sequence, keyboard activation and a direct call into the
//! framework's own click handler.

use std::time::Duration;

use async_trait::async_trait;
use dom_port::{DomEvent, DomPort, ElementRef, KeyInput, MouseKind, Point, PointerKind};
use tokio::time::sleep;

use crate::errors::TriggerError;

/// What a strategy acts on.
pub struct FireCtx<'a> {
    pub port: &'a dyn DomPort,
    pub element: &'a ElementRef,
    pub center: Point,
    pub event_gap: Duration,
}

impl FireCtx<'_> {
    async fn dispatch(&self, event: DomEvent) -> Result<(), TriggerError> {
        self.port.dispatch(self.element, event).await?;
        sleep(self.event_gap).await;
        Ok(())
    }
}

#[async_trait]
pub trait SubmitStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(false)` means the strategy found nothing to act on.
    async fn fire(&self, ctx: &FireCtx<'_>) -> Result<bool, TriggerError>;
}

/// `element.click()`.
pub struct DirectActivation;

#[async_trait]
impl SubmitStrategy for DirectActivation {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fire(&self, ctx: &FireCtx<'_>) -> Result<bool, TriggerError> {
        ctx.port.activate(ctx.element).await?;
        Ok(true)
    }
}

/// Hover, then pointer/mouse down-up and click at the control's visual center.
pub struct PointerSequence;

#[async_trait]
impl SubmitStrategy for PointerSequence {
    fn name(&self) -> &'static str {
        "pointer"
    }

    async fn fire(&self, ctx: &FireCtx<'_>) -> Result<bool, TriggerError> {
        let at = ctx.center;
        for phase in [MouseKind::Over, MouseKind::Move] {
            ctx.dispatch(DomEvent::Mouse { phase, at }).await?;
        }
        ctx.dispatch(DomEvent::Pointer {
            phase: PointerKind::Down,
            at,
        })
        .await?;
        ctx.dispatch(DomEvent::Mouse {
            phase: MouseKind::Down,
            at,
        })
        .await?;
        ctx.dispatch(DomEvent::Pointer {
            phase: PointerKind::Up,
            at,
        })
        .await?;
        ctx.dispatch(DomEvent::Mouse {
            phase: MouseKind::Up,
            at,
        })
        .await?;
        ctx.dispatch(DomEvent::Mouse {
            phase: MouseKind::Click,
            at,
        })
        .await?;
        Ok(true)
    }
}

/// Focus, then Enter (down/press/up) and Space (down/up).
pub struct KeyboardActivation;

#[async_trait]
impl SubmitStrategy for KeyboardActivation {
    fn name(&self) -> &'static str {
        "keyboard"
    }

    async fn fire(&self, ctx: &FireCtx<'_>) -> Result<bool, TriggerError> {
        ctx.port.focus(ctx.element).await?;
        let enter = KeyInput::enter();
        ctx.dispatch(DomEvent::KeyDown(enter.clone())).await?;
        ctx.dispatch(DomEvent::KeyPress(enter.clone())).await?;
        ctx.dispatch(DomEvent::KeyUp(enter)).await?;
        let space = KeyInput::space();
        ctx.dispatch(DomEvent::KeyDown(space.clone())).await?;
        ctx.dispatch(DomEvent::KeyUp(space)).await?;
        Ok(true)
    }
}

/// Calls the `onClick` stored on React or Vue instance properties of the element.
pub struct FrameworkHandlerProbe;

#[async_trait]
impl SubmitStrategy for FrameworkHandlerProbe {
    fn name(&self) -> &'static str {
        "framework"
    }

    async fn fire(&self, ctx: &FireCtx<'_>) -> Result<bool, TriggerError> {
        Ok(ctx.port.invoke_framework_handler(ctx.element).await?)
    }
}

/// Default chain in firing order.
pub fn default_chain() -> Vec<Box<dyn SubmitStrategy>> {
    vec![
        Box::new(DirectActivation),
        Box::new(PointerSequence),
        Box::new(KeyboardActivation),
        Box::new(FrameworkHandlerProbe),
    ]
}
