//! Animation requests
//!
//! The controller never animates anything itself. It hands out requests
//! carrying a ticket, and the animation driver reports completion with that
//! ticket.

use std::fmt;

/// Identifies one requested animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationTicket(pub(crate) u64);

impl fmt::Display for AnimationTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationKind {
    /// Slide in from off-screen to the partial position
    Entrance,
    /// Move to (or back to) a resting position
    Snap,
    /// Slide out of view
    Exit,
}

/// Resting positions of the sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetPosition {
    Offscreen,
    Partial,
    FullScreen,
}

/// Vertical translation of each position as a fraction of viewport height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestingPositions {
    pub offscreen: f64,
    pub partial: f64,
    pub full_screen: f64,
}

impl Default for RestingPositions {
    fn default() -> Self {
        Self {
            offscreen: 1.0,
            partial: 0.3,
            full_screen: 0.0,
        }
    }
}

impl RestingPositions {
    pub fn fraction(&self, position: SheetPosition) -> f64 {
        match position {
            SheetPosition::Offscreen => self.offscreen,
            SheetPosition::Partial => self.partial,
            SheetPosition::FullScreen => self.full_screen,
        }
    }
}

/// Spring parameters for the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub damping: f64,
    pub stiffness: f64,
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            damping: 30.0,
            stiffness: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub ticket: AnimationTicket,
    pub kind: AnimationKind,
    /// Drag offset in pixels the animation starts from
    pub from_offset: f64,
    pub target: SheetPosition,
    /// `target` as a fraction of viewport height
    pub target_fraction: f64,
    pub spring: Spring,
}

impl AnimationRequest {
    /// Target translation in pixels for a viewport of the given height
    pub fn target_px(&self, viewport_height: f64) -> f64 {
        self.target_fraction * viewport_height
    }
}
