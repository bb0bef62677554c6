//! Host-neutral input events and the response the host must apply.

use crate::host::Timer;
use crate::types::NodeId;
use glam::{UVec2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// A mouse or touch sample. Touch samples carry the first contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub page: Vec2,
    pub client: Vec2,
    /// Button that changed state (mouse only).
    pub button: i16,
    /// Bitmask of held buttons (mouse only).
    pub buttons: u16,
    pub kind: PointerKind,
}

impl PointerInput {
    pub fn mouse(page: Vec2, button: i16, buttons: u16) -> Self {
        Self {
            page,
            client: page,
            button,
            buttons,
            kind: PointerKind::Mouse,
        }
    }

    pub fn touch(page: Vec2) -> Self {
        Self {
            page,
            client: page,
            button: 0,
            buttons: 0,
            kind: PointerKind::Touch,
        }
    }

    pub fn with_client(mut self, client: Vec2) -> Self {
        self.client = client;
        self
    }

    /// Left button only, or any touch.
    pub fn is_primary(&self) -> bool {
        match self.kind {
            PointerKind::Touch => true,
            PointerKind::Mouse => self.buttons <= 1 && self.button == 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PointerDown(PointerInput),
    PointerMove(PointerInput),
    PointerUp(PointerInput),
    /// Context menu requested on the trigger element.
    ContextMenu { page: Vec2 },
    /// Context menu requested anywhere in the document.
    DocumentContextMenu { page: Vec2 },
    /// Click anywhere in the document; `target` is the innermost node the
    /// host knows about.
    DocumentClick { target: Option<NodeId> },
    MenuItemClick(usize),
    Scroll,
    WindowResize,
    ContainerResize { target: NodeId, size: UVec2 },
    Timer(Timer),
}

/// What the host should do to the native event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventResponse {
    pub fn prevent() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: false,
        }
    }

    pub fn consume() -> Self {
        Self {
            prevent_default: true,
            stop_propagation: true,
        }
    }
}
