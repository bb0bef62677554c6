//! In-memory host for exercising the card without a browser.
//!
//! Nodes form a tree rooted at a body node. Timers are deadlines against a
//! manual clock, and spawned tasks run on a `LocalPool` when the test asks.

use crate::bitmap::Bitmap;
use crate::error::{ScratchError, ScratchResult};
use crate::host::{Dom, EventSource, EventTarget, ImageFuture, ImageLoader, Listener, Scheduler, Timer};
use crate::surface::Surface;
use crate::types::{NodeId, PagePos, PixelRect};
use futures::channel::oneshot;
use futures::executor::{LocalPool, LocalSpawner};
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use glam::{UVec2, Vec2};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    text: String,
    style: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    removed: bool,
}

pub struct MockHost {
    nodes: RefCell<Vec<NodeData>>,
    client_sizes: RefCell<HashMap<NodeId, UVec2>>,
    offset_sizes: RefCell<HashMap<NodeId, Vec2>>,
    page_offsets: RefCell<HashMap<NodeId, PagePos>>,
    canvas_sizes: RefCell<HashMap<NodeId, UVec2>>,
    listeners: RefCell<Vec<(EventTarget, &'static str, Listener)>>,
    observed: RefCell<Vec<NodeId>>,
    timers: RefCell<HashMap<Timer, f64>>,
    clock: Cell<f64>,
    user_agent: RefCell<String>,
    images: RefCell<HashMap<String, ScratchResult<Bitmap>>>,
    gates: RefCell<HashMap<String, oneshot::Receiver<ScratchResult<Bitmap>>>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
    presents: Cell<usize>,
    last_region: Cell<Option<PixelRect>>,
}

impl MockHost {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        let body = NodeData {
            tag: "body".into(),
            ..NodeData::default()
        };
        Self {
            nodes: RefCell::new(vec![body]),
            client_sizes: RefCell::default(),
            offset_sizes: RefCell::default(),
            page_offsets: RefCell::default(),
            canvas_sizes: RefCell::default(),
            listeners: RefCell::default(),
            observed: RefCell::default(),
            timers: RefCell::default(),
            clock: Cell::new(0.0),
            user_agent: RefCell::new("Mozilla/5.0 (X11; Linux x86_64)".into()),
            images: RefCell::default(),
            gates: RefCell::default(),
            pool: RefCell::new(pool),
            spawner,
            presents: Cell::new(0),
            last_region: Cell::new(None),
        }
    }

    // --- setup ---

    pub fn set_client_size(&self, node: NodeId, size: UVec2) {
        self.client_sizes.borrow_mut().insert(node, size);
    }

    pub fn set_offset_size(&self, node: NodeId, size: Vec2) {
        self.offset_sizes.borrow_mut().insert(node, size);
    }

    pub fn set_page_offset(&self, node: NodeId, pos: PagePos) {
        self.page_offsets.borrow_mut().insert(node, pos);
    }

    pub fn set_user_agent(&self, ua: &str) {
        *self.user_agent.borrow_mut() = ua.to_string();
    }

    pub fn add_image(&self, url: &str, image: ScratchResult<Bitmap>) {
        self.images.borrow_mut().insert(url.to_string(), image);
    }

    /// Hold the load of `url` until the returned sender fires.
    pub fn gate_image(&self, url: &str) -> oneshot::Sender<ScratchResult<Bitmap>> {
        let (tx, rx) = oneshot::channel();
        self.gates.borrow_mut().insert(url.to_string(), rx);
        tx
    }

    // --- driving ---

    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    pub fn advance(&self, ms: f64) {
        self.clock.set(self.clock.get() + ms);
    }

    /// Take every timer whose deadline has passed.
    pub fn due_timers(&self) -> Vec<Timer> {
        let now = self.clock.get();
        let mut timers = self.timers.borrow_mut();
        let mut due: Vec<Timer> = timers
            .iter()
            .filter(|(_, &deadline)| deadline <= now)
            .map(|(&timer, _)| timer)
            .collect();
        due.sort_by_key(|timer| *timer as u8);
        for timer in &due {
            timers.remove(timer);
        }
        due
    }

    // --- inspection ---

    pub fn timer_armed(&self, timer: Timer) -> bool {
        self.timers.borrow().contains_key(&timer)
    }

    /// Full and partial presents together.
    pub fn presents(&self) -> usize {
        self.presents.get()
    }

    /// Rect of the latest partial present; cleared by a full one.
    pub fn last_region(&self) -> Option<PixelRect> {
        self.last_region.get()
    }

    pub fn tag(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0 as usize].tag.clone()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.borrow()[node.0 as usize].parent
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.borrow()[node.0 as usize].children.clone()
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes.borrow()[node.0 as usize].classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.nodes.borrow()[node.0 as usize].attributes.get(name).cloned()
    }

    pub fn text(&self, node: NodeId) -> String {
        self.nodes.borrow()[node.0 as usize].text.clone()
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.nodes.borrow()[node.0 as usize].style.get(property).cloned()
    }

    pub fn is_removed(&self, node: NodeId) -> bool {
        self.nodes.borrow()[node.0 as usize].removed
    }

    pub fn canvas_size(&self, node: NodeId) -> Option<UVec2> {
        self.canvas_sizes.borrow().get(&node).copied()
    }

    /// Nodes attached under the body carrying `class`, in document order.
    pub fn find_by_class(&self, class: &str) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut found = Vec::new();
        let mut stack = vec![self.body()];
        while let Some(node) = stack.pop() {
            let data = &nodes[node.0 as usize];
            if data.classes.iter().any(|c| c == class) {
                found.push(node);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        found
    }

    pub fn is_listening(&self, target: EventTarget, event: &str) -> bool {
        self.listeners
            .borrow()
            .iter()
            .any(|&(t, e, _)| t == target && e == event)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.borrow().contains(&node)
    }

    fn detach(&self, nodes: &mut [NodeData], child: NodeId) {
        if let Some(parent) = nodes[child.0 as usize].parent.take() {
            nodes[parent.0 as usize].children.retain(|&c| c != child);
        }
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for MockHost {
    fn body(&self) -> NodeId {
        NodeId(0)
    }

    fn create_element(&self, tag: &str) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(NodeData {
            tag: tag.to_string(),
            ..NodeData::default()
        });
        NodeId(nodes.len() as u32 - 1)
    }

    fn set_class_name(&self, node: NodeId, class: &str) {
        self.nodes.borrow_mut()[node.0 as usize].classes =
            class.split_whitespace().map(str::to_string).collect();
    }

    fn add_class(&self, node: NodeId, class: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let classes = &mut nodes[node.0 as usize].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        self.nodes.borrow_mut()[node.0 as usize]
            .classes
            .retain(|c| c != class);
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[node.0 as usize]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_text(&self, node: NodeId, text: &str) {
        self.nodes.borrow_mut()[node.0 as usize].text = text.to_string();
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        let mut nodes = self.nodes.borrow_mut();
        let style = &mut nodes[node.0 as usize].style;
        if value.is_empty() {
            style.remove(property);
        } else {
            style.insert(property.to_string(), value.to_string());
        }
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        self.detach(&mut nodes, child);
        nodes[child.0 as usize].parent = Some(parent);
        nodes[child.0 as usize].removed = false;
        nodes[parent.0 as usize].children.push(child);
    }

    fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        self.detach(&mut nodes, child);
        nodes[child.0 as usize].parent = Some(parent);
        nodes[child.0 as usize].removed = false;
        let siblings = &mut nodes[parent.0 as usize].children;
        match siblings.iter().position(|&c| c == reference) {
            Some(index) => siblings.insert(index, child),
            None => siblings.push(child),
        }
    }

    fn remove_node(&self, node: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if node.0 as usize >= nodes.len() {
            return;
        }
        self.detach(&mut nodes, node);
        nodes[node.0 as usize].removed = true;
    }

    fn client_size(&self, node: NodeId) -> UVec2 {
        self.client_sizes
            .borrow()
            .get(&node)
            .copied()
            .unwrap_or(UVec2::ZERO)
    }

    fn offset_size(&self, node: NodeId) -> Vec2 {
        if let Some(size) = self.offset_sizes.borrow().get(&node) {
            return *size;
        }
        self.canvas_size(node).map_or(Vec2::ZERO, |size| size.as_vec2())
    }

    /// Falls back to the nearest ancestor with a configured offset.
    fn page_offset(&self, node: NodeId) -> PagePos {
        let mut current = Some(node);
        while let Some(id) = current {
            if let Some(pos) = self.page_offsets.borrow().get(&id) {
                return *pos;
            }
            current = self.parent(id);
        }
        PagePos::default()
    }

    fn set_canvas_size(&self, canvas: NodeId, size: UVec2) {
        self.canvas_sizes.borrow_mut().insert(canvas, size);
    }

    fn present(&self, _canvas: NodeId, _surface: &Surface) {
        self.presents.set(self.presents.get() + 1);
        self.last_region.set(None);
    }

    fn present_region(&self, _canvas: NodeId, _surface: &Surface, rect: PixelRect) {
        self.presents.set(self.presents.get() + 1);
        self.last_region.set(Some(rect));
    }
}

impl EventSource for MockHost {
    fn listen(&self, target: EventTarget, event: &'static str, listener: Listener) {
        self.listeners.borrow_mut().push((target, event, listener));
    }

    fn unlisten(&self, target: EventTarget, event: &'static str, listener: Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(index) = listeners
            .iter()
            .position(|&entry| entry == (target, event, listener))
        {
            listeners.remove(index);
        }
    }

    fn observe_resize(&self, node: NodeId) {
        self.observed.borrow_mut().push(node);
    }

    fn unobserve_resize(&self, node: NodeId) {
        self.observed.borrow_mut().retain(|&n| n != node);
    }

    fn user_agent(&self) -> String {
        self.user_agent.borrow().clone()
    }
}

impl Scheduler for MockHost {
    fn now_ms(&self) -> f64 {
        self.clock.get()
    }

    fn set_timer(&self, timer: Timer, delay_ms: f64) {
        self.timers
            .borrow_mut()
            .insert(timer, self.clock.get() + delay_ms);
    }

    fn clear_timer(&self, timer: Timer) {
        self.timers.borrow_mut().remove(&timer);
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.spawner.spawn_local(task).expect("pool is alive");
    }
}

impl ImageLoader for MockHost {
    fn load_image(&self, url: &str) -> ImageFuture {
        if let Some(rx) = self.gates.borrow_mut().remove(url) {
            let url = url.to_string();
            return async move {
                rx.await.unwrap_or_else(|_| {
                    Err(ScratchError::ImageLoad {
                        url,
                        reason: "load cancelled".into(),
                    })
                })
            }
            .boxed_local();
        }
        let result = self.images.borrow().get(url).cloned().unwrap_or_else(|| {
            Err(ScratchError::ImageLoad {
                url: url.to_string(),
                reason: "not found".into(),
            })
        });
        future::ready(result).boxed_local()
    }
}
