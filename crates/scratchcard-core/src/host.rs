//! Capabilities the scratch card needs from its environment.
//!
//! The browser binding implements these over the real DOM; tests use an
//! in-memory mock. Every method takes `&self` so a host can be shared
//! between the card, its menu and spawned loads.

use crate::bitmap::Bitmap;
use crate::error::ScratchResult;
use crate::surface::Surface;
use crate::types::{NodeId, PagePos, PixelRect};
use futures::future::LocalBoxFuture;
use glam::{UVec2, Vec2};

pub type ImageFuture = LocalBoxFuture<'static, ScratchResult<Bitmap>>;

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Node(NodeId),
    Document,
    Window,
}

/// Identifies which handler a host event should be routed to. The host
/// translates the native event and hands it back via `dispatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    PointerDown,
    PointerMove,
    PointerUp,
    Scroll,
    WindowResize,
    TriggerContextMenu,
    DocumentContextMenu,
    DocumentClick,
    MenuItemClick(usize),
}

/// Named one-shot timers. Setting a timer that is already armed replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    ScratchedPercent,
    Relocate,
}

pub trait Dom {
    fn body(&self) -> NodeId;
    fn create_element(&self, tag: &str) -> NodeId;
    fn set_class_name(&self, node: NodeId, class: &str);
    fn add_class(&self, node: NodeId, class: &str);
    fn remove_class(&self, node: NodeId, class: &str);
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);
    fn set_text(&self, node: NodeId, text: &str);
    /// Set an inline style property; an empty value clears it.
    fn set_style(&self, node: NodeId, property: &str, value: &str);
    fn append_child(&self, parent: NodeId, child: NodeId);
    /// Insert `child` into `parent` before `reference`.
    fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId);
    /// Detach a node from its parent. Unknown or detached nodes are ignored.
    fn remove_node(&self, node: NodeId);
    /// Content box size, used for size adaption.
    fn client_size(&self, node: NodeId) -> UVec2;
    /// Border box size, used for hit tests.
    fn offset_size(&self, node: NodeId) -> Vec2;
    /// Top-left corner in page coordinates.
    fn page_offset(&self, node: NodeId) -> PagePos;
    fn set_canvas_size(&self, canvas: NodeId, size: UVec2);
    /// Copy the surface's pixels into the canvas element.
    fn present(&self, canvas: NodeId, surface: &Surface);
    /// Copy only `rect` of the surface into the canvas.
    fn present_region(&self, canvas: NodeId, surface: &Surface, rect: PixelRect);
}

pub trait EventSource {
    fn listen(&self, target: EventTarget, event: &'static str, listener: Listener);
    fn unlisten(&self, target: EventTarget, event: &'static str, listener: Listener);
    fn observe_resize(&self, node: NodeId);
    fn unobserve_resize(&self, node: NodeId);
    fn user_agent(&self) -> String;
}

pub trait Scheduler {
    /// Monotonic milliseconds.
    fn now_ms(&self) -> f64;
    fn set_timer(&self, timer: Timer, delay_ms: f64);
    fn clear_timer(&self, timer: Timer);
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

pub trait ImageLoader {
    fn load_image(&self, url: &str) -> ImageFuture;
}

pub trait Host: Dom + EventSource + Scheduler + ImageLoader {}

impl<T: Dom + EventSource + Scheduler + ImageLoader> Host for T {}

/// Bookkeeping for attached listeners so teardown can detach exactly what
/// was attached.
#[derive(Debug, Default)]
pub struct Subscriptions {
    entries: Vec<(EventTarget, &'static str, Listener)>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(
        &mut self,
        host: &impl EventSource,
        target: EventTarget,
        event: &'static str,
        listener: Listener,
    ) {
        if self.entries.contains(&(target, event, listener)) {
            return;
        }
        host.listen(target, event, listener);
        self.entries.push((target, event, listener));
    }

    /// Detach every registration routed to `listener`.
    pub fn detach(&mut self, host: &impl EventSource, listener: Listener) {
        self.entries.retain(|&(target, event, l)| {
            if l == listener {
                host.unlisten(target, event, l);
                false
            } else {
                true
            }
        });
    }

    pub fn detach_all(&mut self, host: &impl EventSource) {
        for (target, event, listener) in self.entries.drain(..) {
            host.unlisten(target, event, listener);
        }
    }

    pub fn is_attached(&self, listener: Listener) -> bool {
        self.entries.iter().any(|&(_, _, l)| l == listener)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
