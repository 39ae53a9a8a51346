//! Sheet host
//!
//! Runs a `SheetController` against the content cache and an animation
//! driver. User input and completions arrive as `SheetEvent`s on one
//! channel and are applied in order, so the controller is only ever touched
//! from the task that owns the host.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::animation::{AnimationKind, AnimationRequest, AnimationTicket};
use super::controller::{SheetController, SheetEffect};
use super::gesture::DragRelease;
use crate::client::{ContentCache, FetchError};
use crate::document::CompiledDocument;

/// Plays sheet animations; returns when the animation has settled
#[async_trait]
pub trait Animator: Send + Sync {
    async fn animate(&self, request: AnimationRequest);
}

#[derive(Debug)]
pub enum SheetEvent {
    Select(String),
    /// Pointer is resting on a document entry
    Hover(String),
    DragStart,
    DragMove(f64),
    DragEnd(DragRelease),
    Close,
    BackdropClick,
    Retry,
    AnimationComplete(AnimationTicket),
    ContentLoaded(String, Result<Arc<CompiledDocument>, FetchError>),
}

/// Sends events to a running host
#[derive(Clone)]
pub struct SheetHandle {
    tx: mpsc::UnboundedSender<SheetEvent>,
}

impl SheetHandle {
    /// Returns false once the host is gone
    pub fn send(&self, event: SheetEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

pub struct SheetHost {
    controller: SheetController,
    cache: ContentCache,
    animator: Arc<dyn Animator>,
    tx: mpsc::UnboundedSender<SheetEvent>,
    rx: mpsc::UnboundedReceiver<SheetEvent>,
}

impl SheetHost {
    pub fn new(controller: SheetController, cache: ContentCache, animator: Arc<dyn Animator>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            cache,
            animator,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> SheetHandle {
        SheetHandle { tx: self.tx.clone() }
    }

    pub fn controller(&self) -> &SheetController {
        &self.controller
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Apply one event and start the work it produces
    pub fn dispatch(&mut self, event: SheetEvent) {
        let effects = match event {
            SheetEvent::Select(id) => self.controller.select(&id),
            SheetEvent::Hover(id) => {
                if self.controller.active_document_id() != Some(id.as_str()) {
                    self.cache.prefetch(&id);
                }
                Vec::new()
            }
            SheetEvent::DragStart => {
                self.controller.drag_start();
                Vec::new()
            }
            SheetEvent::DragMove(offset_y) => {
                self.controller.drag_move(offset_y);
                Vec::new()
            }
            SheetEvent::DragEnd(release) => self.controller.drag_end(release),
            SheetEvent::Close => self.controller.close(),
            SheetEvent::BackdropClick => self.controller.backdrop_clicked(),
            SheetEvent::Retry => self.controller.retry(),
            SheetEvent::AnimationComplete(ticket) => self.controller.animation_complete(ticket),
            SheetEvent::ContentLoaded(id, result) => {
                self.controller.content_loaded(&id, result);
                Vec::new()
            }
        };

        for effect in effects {
            self.execute(effect);
        }
    }

    /// Wait for the next event and apply it
    pub async fn step(&mut self) {
        // `self.tx` keeps the channel open, so `recv` only waits
        if let Some(event) = self.rx.recv().await {
            self.dispatch(event);
        }
    }

    /// Process events forever
    pub async fn run(mut self) {
        loop {
            self.step().await;
        }
    }

    fn execute(&self, effect: SheetEffect) {
        match effect {
            SheetEffect::Animate(request) => {
                let animator = Arc::clone(&self.animator);
                let tx = self.tx.clone();
                let close_timeout = self.controller.config().close_timeout;
                tokio::spawn(async move {
                    if request.kind == AnimationKind::Exit {
                        // The sheet must leave even if the driver never reports back
                        let _ = tokio::time::timeout(close_timeout, animator.animate(request)).await;
                    } else {
                        animator.animate(request).await;
                    }
                    let _ = tx.send(SheetEvent::AnimationComplete(request.ticket));
                });
            }
            SheetEffect::FetchContent(id) => {
                let cache = self.cache.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = cache.get(&id).await;
                    let _ = tx.send(SheetEvent::ContentLoaded(id, result));
                });
            }
            SheetEffect::PrefetchAdjacent(id) => {
                let started = self.cache.prefetch_adjacent(&id);
                if !started.is_empty() {
                    tracing::debug!("Prefetching neighbors of {}: {:?}", id, started);
                }
            }
        }
    }
}
