//! Sheet controller
//!
//! Owns the sheet lifecycle `Hidden → Opening → Partial ⇄ FullScreen →
//! Closing → Hidden`. Every input returns the effects the host has to carry
//! out; animation completions come back in through `animation_complete`.
//!
//! Content is mounted only once the entrance animation has finished, and is
//! unmounted the moment the sheet starts closing or switches documents.

use std::sync::Arc;
use std::time::Duration;

use super::animation::{
    AnimationKind, AnimationRequest, AnimationTicket, RestingPositions, SheetPosition, Spring,
};
use super::gesture::{DragRelease, GestureThresholds, ReleaseIntent};
use super::scroll::{PageScroll, ScrollGuard};
use crate::client::FetchError;
use crate::document::CompiledDocument;

/// Sheet behavior settings
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConfig {
    pub thresholds: GestureThresholds,
    pub positions: RestingPositions,
    pub spring: Spring,
    /// Resistance applied when dragging past the top of a full-screen sheet
    pub drag_elastic: f64,
    /// Upper bound on how long the exit animation may take
    pub close_timeout: Duration,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            thresholds: GestureThresholds::default(),
            positions: RestingPositions::default(),
            spring: Spring::default(),
            drag_elastic: 0.1,
            close_timeout: Duration::from_millis(300),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetPhase {
    Hidden,
    Opening,
    Partial,
    FullScreen,
    Closing,
}

impl SheetPhase {
    /// Partial or full screen
    pub fn is_resting(self) -> bool {
        matches!(self, SheetPhase::Partial | SheetPhase::FullScreen)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetState {
    pub phase: SheetPhase,
    pub drag_offset_y: f64,
    pub content_mounted: bool,
    pub active_document_id: Option<String>,
}

impl Default for SheetState {
    fn default() -> Self {
        Self {
            phase: SheetPhase::Hidden,
            drag_offset_y: 0.0,
            content_mounted: false,
            active_document_id: None,
        }
    }
}

/// What the content area of the sheet holds
#[derive(Debug, Clone)]
pub enum ContentPane {
    Empty,
    Loading,
    Ready(Arc<CompiledDocument>),
    /// Shown with a retry control
    Failed(FetchError),
}

/// Work for the host
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEffect {
    Animate(AnimationRequest),
    FetchContent(String),
    PrefetchAdjacent(String),
}

pub struct SheetController {
    config: SheetConfig,
    state: SheetState,
    content: ContentPane,
    scroll: Arc<dyn PageScroll>,
    scroll_guard: Option<ScrollGuard>,
    /// The one animation whose completion is still awaited
    animation: Option<(AnimationTicket, AnimationKind)>,
    next_ticket: u64,
    dragging: bool,
    /// Release that arrived while the entrance was still running
    queued_release: Option<DragRelease>,
}

impl SheetController {
    pub fn new(config: SheetConfig, scroll: Arc<dyn PageScroll>) -> Self {
        Self {
            config,
            state: SheetState::default(),
            content: ContentPane::Empty,
            scroll,
            scroll_guard: None,
            animation: None,
            next_ticket: 0,
            dragging: false,
            queued_release: None,
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn state(&self) -> &SheetState {
        &self.state
    }

    pub fn phase(&self) -> SheetPhase {
        self.state.phase
    }

    pub fn content(&self) -> &ContentPane {
        &self.content
    }

    pub fn active_document_id(&self) -> Option<&str> {
        self.state.active_document_id.as_deref()
    }

    /// Document to render, if it is mounted and loaded
    pub fn visible_content(&self) -> Option<&Arc<CompiledDocument>> {
        match &self.content {
            ContentPane::Ready(document) if self.state.content_mounted => Some(document),
            _ => None,
        }
    }

    /// The retryable error affordance is visible
    pub fn shows_error(&self) -> Option<&FetchError> {
        match &self.content {
            ContentPane::Failed(e) if self.state.content_mounted => Some(e),
            _ => None,
        }
    }

    pub fn shows_loading(&self) -> bool {
        self.state.content_mounted && matches!(self.content, ContentPane::Loading)
    }

    /// "Pull up for full screen" hint
    pub fn shows_expand_hint(&self) -> bool {
        self.state.phase == SheetPhase::Partial
    }

    /// Open a document, or switch the open sheet to another one
    pub fn select(&mut self, id: &str) -> Vec<SheetEffect> {
        let phase = self.state.phase;
        let same = self.active_document_id() == Some(id);
        if same && matches!(phase, SheetPhase::Opening | SheetPhase::Partial | SheetPhase::FullScreen) {
            return Vec::new();
        }

        if phase != SheetPhase::Hidden {
            tracing::debug!(
                "Switching sheet from {:?} to {}",
                self.state.active_document_id,
                id
            );
        }

        // Tear down whatever was mounted before the new id goes in
        self.state.content_mounted = false;
        self.state.active_document_id = Some(id.to_string());
        self.state.drag_offset_y = 0.0;
        self.content = ContentPane::Loading;
        self.dragging = false;
        self.queued_release = None;
        if self.scroll_guard.is_none() {
            self.scroll_guard = Some(ScrollGuard::acquire(Arc::clone(&self.scroll)));
        }
        self.set_phase(SheetPhase::Opening);

        vec![
            self.animate(AnimationKind::Entrance, SheetPosition::Partial),
            SheetEffect::FetchContent(id.to_string()),
            SheetEffect::PrefetchAdjacent(id.to_string()),
        ]
    }

    pub fn drag_start(&mut self) -> bool {
        self.dragging = matches!(
            self.state.phase,
            SheetPhase::Opening | SheetPhase::Partial | SheetPhase::FullScreen
        );
        self.dragging
    }

    /// Track the drag offset relative to the resting position
    pub fn drag_move(&mut self, offset_y: f64) {
        if !self.dragging {
            return;
        }
        self.state.drag_offset_y = if self.state.phase == SheetPhase::FullScreen && offset_y < 0.0 {
            offset_y * self.config.drag_elastic
        } else {
            offset_y
        };
    }

    pub fn drag_end(&mut self, release: DragRelease) -> Vec<SheetEffect> {
        if !std::mem::take(&mut self.dragging) {
            return Vec::new();
        }

        match self.state.phase {
            SheetPhase::Opening => {
                tracing::debug!("Queueing drag release until the entrance completes");
                self.queued_release = Some(release);
                Vec::new()
            }
            SheetPhase::Partial | SheetPhase::FullScreen => self.apply_release(release),
            SheetPhase::Hidden | SheetPhase::Closing => Vec::new(),
        }
    }

    /// Explicit dismiss; same as a release past the close threshold
    pub fn close(&mut self) -> Vec<SheetEffect> {
        match self.state.phase {
            SheetPhase::Hidden | SheetPhase::Closing => Vec::new(),
            _ => self.begin_close(),
        }
    }

    pub fn backdrop_clicked(&mut self) -> Vec<SheetEffect> {
        self.close()
    }

    /// Report that the animation for `ticket` finished.
    ///
    /// Completions for superseded animations are ignored.
    pub fn animation_complete(&mut self, ticket: AnimationTicket) -> Vec<SheetEffect> {
        let kind = match self.animation {
            Some((current, kind)) if current == ticket => kind,
            _ => {
                tracing::debug!("Ignoring stale animation {}", ticket);
                return Vec::new();
            }
        };
        self.animation = None;

        match kind {
            AnimationKind::Entrance => {
                self.state.drag_offset_y = 0.0;
                self.set_phase(SheetPhase::Partial);
                self.state.content_mounted = true;
                match self.queued_release.take() {
                    Some(release) => self.apply_release(release),
                    None => Vec::new(),
                }
            }
            AnimationKind::Snap => {
                self.state.drag_offset_y = 0.0;
                Vec::new()
            }
            AnimationKind::Exit => {
                self.set_phase(SheetPhase::Hidden);
                self.state = SheetState::default();
                self.content = ContentPane::Empty;
                self.scroll_guard = None;
                Vec::new()
            }
        }
    }

    /// Deliver a fetch result. Results for anything but the active document
    /// are dropped; returns whether it was taken.
    pub fn content_loaded(
        &mut self,
        id: &str,
        result: Result<Arc<CompiledDocument>, FetchError>,
    ) -> bool {
        if self.active_document_id() != Some(id)
            || matches!(self.state.phase, SheetPhase::Hidden | SheetPhase::Closing)
        {
            tracing::debug!("Discarding content for inactive document {}", id);
            return false;
        }

        self.content = match result {
            Ok(document) => ContentPane::Ready(document),
            Err(e) => {
                tracing::warn!("Failed to load document {}: {}", id, e);
                ContentPane::Failed(e)
            }
        };
        true
    }

    /// Fetch the active document again after a failure
    pub fn retry(&mut self) -> Vec<SheetEffect> {
        match (&self.content, &self.state.active_document_id) {
            (ContentPane::Failed(_), Some(id)) => {
                let id = id.clone();
                self.content = ContentPane::Loading;
                vec![SheetEffect::FetchContent(id)]
            }
            _ => Vec::new(),
        }
    }

    fn apply_release(&mut self, release: DragRelease) -> Vec<SheetEffect> {
        let can_expand = self.state.phase == SheetPhase::Partial;
        match self.config.thresholds.classify(release, can_expand) {
            ReleaseIntent::Close => self.begin_close(),
            ReleaseIntent::Expand => {
                self.set_phase(SheetPhase::FullScreen);
                vec![self.animate(AnimationKind::Snap, SheetPosition::FullScreen)]
            }
            ReleaseIntent::Settle => {
                let position = self.resting_position();
                vec![self.animate(AnimationKind::Snap, position)]
            }
        }
    }

    fn begin_close(&mut self) -> Vec<SheetEffect> {
        self.state.content_mounted = false;
        self.dragging = false;
        self.queued_release = None;
        self.set_phase(SheetPhase::Closing);
        vec![self.animate(AnimationKind::Exit, SheetPosition::Offscreen)]
    }

    fn resting_position(&self) -> SheetPosition {
        match self.state.phase {
            SheetPhase::FullScreen => SheetPosition::FullScreen,
            SheetPhase::Opening | SheetPhase::Partial => SheetPosition::Partial,
            SheetPhase::Hidden | SheetPhase::Closing => SheetPosition::Offscreen,
        }
    }

    /// Issue a new animation, superseding any in flight
    fn animate(&mut self, kind: AnimationKind, target: SheetPosition) -> SheetEffect {
        self.next_ticket += 1;
        let ticket = AnimationTicket(self.next_ticket);
        self.animation = Some((ticket, kind));

        SheetEffect::Animate(AnimationRequest {
            ticket,
            kind,
            from_offset: self.state.drag_offset_y,
            target,
            target_fraction: self.config.positions.fraction(target),
            spring: self.config.spring,
        })
    }

    fn set_phase(&mut self, phase: SheetPhase) {
        if self.state.phase != phase {
            tracing::debug!("Sheet phase {:?} -> {:?}", self.state.phase, phase);
            self.state.phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::compile;
    use crate::library::FrontMatter;
    use crate::sheet::scroll::testing::RecordingScroll;

    fn controller() -> (Arc<RecordingScroll>, SheetController) {
        let page = Arc::new(RecordingScroll::default());
        let controller = SheetController::new(SheetConfig::default(), page.clone());
        (page, controller)
    }

    fn ticket_of(effects: &[SheetEffect]) -> AnimationTicket {
        effects
            .iter()
            .find_map(|e| match e {
                SheetEffect::Animate(request) => Some(request.ticket),
                _ => None,
            })
            .expect("no animation requested")
    }

    fn document() -> Arc<CompiledDocument> {
        Arc::new(compile("# Title", FrontMatter::new()).unwrap())
    }

    /// Select and finish the entrance
    fn open(controller: &mut SheetController, id: &str) {
        let effects = controller.select(id);
        controller.animation_complete(ticket_of(&effects));
    }

    fn release(controller: &mut SheetController, offset_y: f64, velocity_y: f64) -> Vec<SheetEffect> {
        controller.drag_start();
        controller.drag_move(offset_y);
        controller.drag_end(DragRelease::new(offset_y, velocity_y))
    }

    #[test]
    fn test_select_opens() {
        let (page, mut sheet) = controller();
        let effects = sheet.select("post");

        assert_eq!(sheet.phase(), SheetPhase::Opening);
        assert!(!sheet.state().content_mounted);
        assert_eq!(sheet.active_document_id(), Some("post"));
        assert!(page.is_locked());
        assert_eq!(effects.len(), 3);
        assert!(matches!(
            &effects[0],
            SheetEffect::Animate(AnimationRequest { kind: AnimationKind::Entrance, target: SheetPosition::Partial, .. })
        ));
        assert_eq!(effects[1], SheetEffect::FetchContent("post".to_string()));
        assert_eq!(effects[2], SheetEffect::PrefetchAdjacent("post".to_string()));
    }

    #[test]
    fn test_entrance_completion_mounts() {
        let (_page, mut sheet) = controller();
        let effects = sheet.select("post");
        assert!(sheet.content_loaded("post", Ok(document())));
        assert!(sheet.visible_content().is_none());

        sheet.animation_complete(ticket_of(&effects));

        assert_eq!(sheet.phase(), SheetPhase::Partial);
        assert!(sheet.state().content_mounted);
        assert!(sheet.visible_content().is_some());
        assert!(sheet.shows_expand_hint());
    }

    #[test]
    fn test_release_past_close_distance_closes() {
        let (page, mut sheet) = controller();
        open(&mut sheet, "post");

        let effects = release(&mut sheet, 250.0, 0.0);
        assert_eq!(sheet.phase(), SheetPhase::Closing);
        assert!(!sheet.state().content_mounted);

        sheet.animation_complete(ticket_of(&effects));
        assert_eq!(sheet.phase(), SheetPhase::Hidden);
        assert_eq!(sheet.active_document_id(), None);
        assert!(!page.is_locked());
    }

    #[test]
    fn test_release_past_expand_distance_goes_full_screen() {
        let (_page, mut sheet) = controller();
        open(&mut sheet, "post");

        let effects = release(&mut sheet, -160.0, 0.0);
        assert_eq!(sheet.phase(), SheetPhase::FullScreen);
        assert!(sheet.state().content_mounted);
        assert!(!sheet.shows_expand_hint());
        assert!(matches!(
            &effects[0],
            SheetEffect::Animate(AnimationRequest { target: SheetPosition::FullScreen, .. })
        ));
    }

    #[test]
    fn test_small_release_snaps_back() {
        let (_page, mut sheet) = controller();
        open(&mut sheet, "post");
        release(&mut sheet, -160.0, 0.0);

        let effects = release(&mut sheet, 50.0, 0.0);
        assert_eq!(sheet.phase(), SheetPhase::FullScreen);
        assert!(matches!(
            &effects[0],
            SheetEffect::Animate(AnimationRequest { kind: AnimationKind::Snap, target: SheetPosition::FullScreen, from_offset, .. })
                if *from_offset == 50.0
        ));

        sheet.animation_complete(ticket_of(&effects));
        assert_eq!(sheet.state().drag_offset_y, 0.0);
    }

    #[test]
    fn test_full_screen_never_expands_and_closes_directly() {
        let (_page, mut sheet) = controller();
        open(&mut sheet, "post");
        release(&mut sheet, -200.0, 0.0);

        let effects = release(&mut sheet, -300.0, -2000.0);
        assert_eq!(sheet.phase(), SheetPhase::FullScreen);
        assert!(matches!(&effects[0], SheetEffect::Animate(AnimationRequest { kind: AnimationKind::Snap, .. })));

        release(&mut sheet, 10.0, 900.0);
        assert_eq!(sheet.phase(), SheetPhase::Closing);
    }

    #[test]
    fn test_upward_drag_in_full_screen_is_damped() {
        let (_page, mut sheet) = controller();
        open(&mut sheet, "post");
        release(&mut sheet, -200.0, 0.0);

        sheet.drag_start();
        sheet.drag_move(-100.0);
        assert!((sheet.state().drag_offset_y + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_release_during_opening_is_queued() {
        let (_page, mut sheet) = controller();
        let effects = sheet.select("post");

        assert!(release(&mut sheet, -300.0, 0.0).is_empty());
        assert_eq!(sheet.phase(), SheetPhase::Opening);

        let after = sheet.animation_complete(ticket_of(&effects));
        assert_eq!(sheet.phase(), SheetPhase::FullScreen);
        assert!(sheet.state().content_mounted);
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn test_close_from_any_open_phase() {
        let (page, mut sheet) = controller();

        sheet.select("post");
        let effects = sheet.close();
        assert_eq!(sheet.phase(), SheetPhase::Closing);
        assert!(sheet.close().is_empty());

        sheet.animation_complete(ticket_of(&effects));
        assert_eq!(sheet.phase(), SheetPhase::Hidden);
        assert!(!page.is_locked());

        open(&mut sheet, "post");
        let effects = sheet.backdrop_clicked();
        sheet.animation_complete(ticket_of(&effects));
        assert_eq!(sheet.phase(), SheetPhase::Hidden);
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let (_page, mut sheet) = controller();
        let first = ticket_of(&sheet.select("a"));
        let second = ticket_of(&sheet.select("b"));

        sheet.animation_complete(first);
        assert_eq!(sheet.phase(), SheetPhase::Opening);
        assert!(!sheet.state().content_mounted);

        sheet.animation_complete(second);
        assert_eq!(sheet.phase(), SheetPhase::Partial);
    }

    #[test]
    fn test_swap_unmounts_and_discards_old_content() {
        let (_page, mut sheet) = controller();
        open(&mut sheet, "a");
        sheet.content_loaded("a", Ok(document()));
        assert!(sheet.visible_content().is_some());

        let effects = sheet.select("b");
        assert_eq!(sheet.phase(), SheetPhase::Opening);
        assert!(!sheet.state().content_mounted);
        assert!(sheet.visible_content().is_none());
        assert!(effects.contains(&SheetEffect::FetchContent("b".to_string())));

        // Late result for the previous document
        assert!(!sheet.content_loaded("a", Ok(document())));
        assert!(matches!(sheet.content(), ContentPane::Loading));
    }

    #[test]
    fn test_reselecting_open_document_is_noop() {
        let (_page, mut sheet) = controller();
        open(&mut sheet, "a");
        assert!(sheet.select("a").is_empty());
        assert_eq!(sheet.phase(), SheetPhase::Partial);
    }

    #[test]
    fn test_select_while_closing_reopens() {
        let (page, mut sheet) = controller();
        open(&mut sheet, "a");
        let exit = ticket_of(&sheet.close());

        let effects = sheet.select("a");
        assert_eq!(sheet.phase(), SheetPhase::Opening);

        // The exit animation was superseded and must not hide the sheet
        sheet.animation_complete(exit);
        assert_eq!(sheet.phase(), SheetPhase::Opening);
        assert!(page.is_locked());

        sheet.animation_complete(ticket_of(&effects));
        assert_eq!(sheet.phase(), SheetPhase::Partial);
    }

    #[test]
    fn test_fetch_failure_keeps_sheet_open() {
        let (_page, mut sheet) = controller();
        open(&mut sheet, "a");

        sheet.content_loaded("a", Err(FetchError::Network("offline".to_string())));
        assert_eq!(sheet.phase(), SheetPhase::Partial);
        assert!(sheet.shows_error().is_some());

        assert_eq!(sheet.retry(), vec![SheetEffect::FetchContent("a".to_string())]);
        assert!(sheet.shows_loading());
        assert!(sheet.retry().is_empty());

        // Gestures still work
        release(&mut sheet, -200.0, 0.0);
        assert_eq!(sheet.phase(), SheetPhase::FullScreen);
    }

    #[test]
    fn test_drop_releases_scroll_lock() {
        let (page, mut sheet) = controller();
        sheet.select("a");
        assert!(page.is_locked());

        drop(sheet);
        assert!(!page.is_locked());
    }

    #[test]
    fn test_drag_ignored_when_hidden() {
        let (_page, mut sheet) = controller();
        assert!(!sheet.drag_start());
        sheet.drag_move(400.0);
        assert_eq!(sheet.state().drag_offset_y, 0.0);
        assert!(sheet.drag_end(DragRelease::new(400.0, 0.0)).is_empty());
    }
}
