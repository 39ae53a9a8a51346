//! Reader sheet
//!
//! The panel a document opens in: lifecycle state machine, drag gesture
//! interpretation, animation gating of content mount and the page scroll
//! lock. `SheetController` is synchronous and side-effect free apart from
//! the scroll lock; `SheetHost` drives it with real animations and fetches.

mod animation;
mod controller;
mod gesture;
mod host;
mod scroll;

pub use animation::{
    AnimationKind, AnimationRequest, AnimationTicket, RestingPositions, SheetPosition, Spring,
};
pub use controller::{
    ContentPane, SheetConfig, SheetController, SheetEffect, SheetPhase, SheetState,
};
pub use gesture::{DragRelease, GestureThresholds, ReleaseIntent};
pub use host::{Animator, SheetEvent, SheetHandle, SheetHost};
pub use scroll::{PageScroll, ScrollGuard};
