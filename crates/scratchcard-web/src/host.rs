//! `Host` implementation over the real DOM.
//!
//! Nodes handed to the core are indices into a registry of elements. Native
//! listeners forward into the card through a weak sink, so a dropped widget
//! simply stops receiving events.

use crate::error::WebError;
use crate::image;
use crate::input;
use crate::registry::Registry;
use futures::future::LocalBoxFuture;
use glam::{UVec2, Vec2};
use scratchcard_core::host::{
    Dom, EventSource, EventTarget, ImageFuture, ImageLoader, Listener, Scheduler, Timer,
};
use scratchcard_core::{HostEvent, NodeId, PagePos, PixelRect, ScratchCard, Surface};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{Document, Element, Event, HtmlCanvasElement, HtmlElement, ImageData, ResizeObserver, Window};

pub type Card = ScratchCard<WebHost>;

type ListenerKey = (EventTarget, &'static str, Listener);

/// State reachable from native callbacks.
#[derive(Default)]
struct Shared {
    nodes: RefCell<Registry<Element>>,
    sink: RefCell<Weak<RefCell<Card>>>,
    /// Callbacks detached while possibly still on the stack. Dropped on the
    /// next microtask.
    retired: RefCell<Vec<Box<dyn Any>>>,
}

impl Shared {
    fn element(&self, node: NodeId) -> Option<Element> {
        self.nodes.borrow().get(node)
    }

    fn lookup(&self, target: &web_sys::EventTarget) -> Option<NodeId> {
        let element = target.dyn_ref::<Element>()?;
        self.nodes.borrow().lookup(element)
    }

    /// Deliver an event to the card, unless it is gone or already busy.
    fn deliver(&self, event: HostEvent) -> Option<scratchcard_core::EventResponse> {
        let card = self.sink.borrow().upgrade()?;
        let mut card = match card.try_borrow_mut() {
            Ok(card) => card,
            Err(_) => {
                log::warn!("dropping re-entrant {event:?}");
                return None;
            }
        };
        Some(card.dispatch(event))
    }

    fn retire(self: &Rc<Self>, callback: Box<dyn Any>) {
        self.retired.borrow_mut().push(callback);
        let shared = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            shared.retired.borrow_mut().clear();
        });
    }
}

pub struct WebHost {
    window: Window,
    document: Document,
    shared: Rc<Shared>,
    listeners: RefCell<HashMap<ListenerKey, Closure<dyn FnMut(Event)>>>,
    timers: RefCell<HashMap<Timer, (i32, Closure<dyn FnMut()>)>>,
    observer: RefCell<Option<(ResizeObserver, Closure<dyn FnMut(js_sys::Array)>)>>,
}

impl WebHost {
    pub fn new() -> Result<Self, WebError> {
        let window = web_sys::window().ok_or(WebError::MissingGlobal("window"))?;
        let document = window.document().ok_or(WebError::MissingGlobal("document"))?;
        Ok(Self {
            window,
            document,
            shared: Rc::new(Shared::default()),
            listeners: RefCell::default(),
            timers: RefCell::default(),
            observer: RefCell::default(),
        })
    }

    /// Hand a page element to the engine. It stays registered until the
    /// host is dropped.
    pub fn register(&self, element: Element) -> NodeId {
        self.shared.nodes.borrow_mut().adopt(element)
    }

    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.shared.element(node)
    }

    /// Route native events to `card` from now on.
    pub fn connect(&self, card: &Rc<RefCell<Card>>) {
        *self.shared.sink.borrow_mut() = Rc::downgrade(card);
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.element(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn canvas(&self, node: NodeId) -> Option<HtmlCanvasElement> {
        self.element(node)?.dyn_into::<HtmlCanvasElement>().ok()
    }

    fn event_target(&self, target: EventTarget) -> Option<web_sys::EventTarget> {
        match target {
            EventTarget::Node(node) => self.element(node).map(Into::into),
            EventTarget::Document => Some(self.document.clone().into()),
            EventTarget::Window => Some(self.window.clone().into()),
        }
    }

    fn ensure_observer(&self) -> Option<ResizeObserver> {
        if let Some((observer, _)) = self.observer.borrow().as_ref() {
            return Some(observer.clone());
        }
        let shared = self.shared.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<web_sys::ResizeObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let Some(node) = shared.lookup(target.as_ref()) else {
                    continue;
                };
                let size = UVec2::new(target.client_width().max(0) as u32, target.client_height().max(0) as u32);
                shared.deliver(HostEvent::ContainerResize { target: node, size });
            }
        });
        let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(e) => {
                log::warn!("ResizeObserver unavailable: {e:?}");
                return None;
            }
        };
        *self.observer.borrow_mut() = Some((observer.clone(), callback));
        Some(observer)
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        if let Some((observer, _)) = self.observer.borrow().as_ref() {
            observer.disconnect();
        }
        for (id, _) in self.timers.borrow().values() {
            self.window.clear_timeout_with_handle(*id);
        }
    }
}

impl Dom for WebHost {
    fn body(&self) -> NodeId {
        let root = self
            .document
            .body()
            .map(Element::from)
            .or_else(|| self.document.document_element())
            .expect("document has a root element");
        self.register(root)
    }

    fn create_element(&self, tag: &str) -> NodeId {
        let element = self
            .document
            .create_element(tag)
            .expect("tag names are static and valid");
        self.shared.nodes.borrow_mut().create(element)
    }

    fn set_class_name(&self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            el.set_class_name(class);
        }
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            el.class_list().add_1(class).ok();
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(el) = self.element(node) {
            el.class_list().remove_1(class).ok();
        }
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element(node) {
            el.set_attribute(name, value).ok();
        }
    }

    fn set_text(&self, node: NodeId, text: &str) {
        if let Some(el) = self.element(node) {
            el.set_text_content(Some(text));
        }
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        let Some(el) = self.html(node) else {
            return;
        };
        let style = el.style();
        if value.is_empty() {
            style.remove_property(property).ok();
        } else {
            style.set_property(property, value).ok();
        }
    }

    fn append_child(&self, parent: NodeId, child: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            parent.append_child(&child).ok();
        }
    }

    fn insert_before(&self, parent: NodeId, child: NodeId, reference: NodeId) {
        if let (Some(parent), Some(child)) = (self.element(parent), self.element(child)) {
            let reference = self.element(reference);
            parent.insert_before(&child, reference.as_ref().map(|el| &**el)).ok();
        }
    }

    fn remove_node(&self, node: NodeId) {
        let Some(el) = self.element(node) else {
            return;
        };
        el.remove();
        self.shared
            .nodes
            .borrow_mut()
            .release(node, |outer, inner| outer.contains(Some(inner.as_ref())));
    }

    fn client_size(&self, node: NodeId) -> UVec2 {
        self.element(node).map_or(UVec2::ZERO, |el| {
            UVec2::new(el.client_width().max(0) as u32, el.client_height().max(0) as u32)
        })
    }

    fn offset_size(&self, node: NodeId) -> Vec2 {
        self.html(node).map_or(Vec2::ZERO, |el| {
            Vec2::new(el.offset_width() as f32, el.offset_height() as f32)
        })
    }

    fn page_offset(&self, node: NodeId) -> PagePos {
        let Some(el) = self.element(node) else {
            return PagePos::default();
        };
        let rect = el.get_bounding_client_rect();
        let scroll_x = self.window.scroll_x().unwrap_or(0.0);
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        PagePos::new((rect.top() + scroll_y) as f32, (rect.left() + scroll_x) as f32)
    }

    fn set_canvas_size(&self, canvas: NodeId, size: UVec2) {
        if let Some(canvas) = self.canvas(canvas) {
            canvas.set_width(size.x);
            canvas.set_height(size.y);
        }
    }

    fn present(&self, canvas: NodeId, surface: &Surface) {
        if let Some(rect) = surface.bounds() {
            self.present_region(canvas, surface, rect);
        }
    }

    fn present_region(&self, canvas: NodeId, surface: &Surface, rect: PixelRect) {
        let Some(canvas) = self.canvas(canvas) else {
            return;
        };
        let ctx = match image::context_2d(&canvas) {
            Ok(ctx) => ctx,
            Err(e) => {
                log::warn!("cannot present: {e}");
                return;
            }
        };
        let rgba = surface.region_rgba8(rect);
        match ImageData::new_with_u8_clamped_array_and_sh(Clamped(rgba.as_slice()), rect.width, rect.height) {
            Ok(data) => {
                ctx.put_image_data(&data, rect.x as f64, rect.y as f64).ok();
            }
            Err(e) => log::warn!("cannot build ImageData: {e:?}"),
        }
    }
}

impl EventSource for WebHost {
    fn listen(&self, target: EventTarget, event: &'static str, listener: Listener) {
        let Some(native) = self.event_target(target) else {
            return;
        };
        let shared = self.shared.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |e: Event| {
            let translated = input::translate(listener, &e, |t| shared.lookup(t));
            if let Some(response) = translated.and_then(|ev| shared.deliver(ev)) {
                input::apply(&e, response);
            }
        });
        // Non-passive so touch and context menu defaults can be prevented.
        let options = web_sys::AddEventListenerOptions::new();
        options.set_passive(false);
        if let Err(e) = native.add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        ) {
            log::warn!("failed to add {event} listener: {e:?}");
            return;
        }
        let replaced = self
            .listeners
            .borrow_mut()
            .insert((target, event, listener), closure);
        if let Some(old) = replaced {
            native
                .remove_event_listener_with_callback(event, old.as_ref().unchecked_ref())
                .ok();
            self.shared.retire(Box::new(old));
        }
    }

    fn unlisten(&self, target: EventTarget, event: &'static str, listener: Listener) {
        let Some(closure) = self.listeners.borrow_mut().remove(&(target, event, listener)) else {
            return;
        };
        if let Some(native) = self.event_target(target) {
            native
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
                .ok();
        }
        self.shared.retire(Box::new(closure));
    }

    fn observe_resize(&self, node: NodeId) {
        if let (Some(observer), Some(el)) = (self.ensure_observer(), self.element(node)) {
            observer.observe(&el);
        }
    }

    fn unobserve_resize(&self, node: NodeId) {
        let observer = self.observer.borrow();
        if let (Some((observer, _)), Some(el)) = (observer.as_ref(), self.element(node)) {
            observer.unobserve(&el);
        }
    }

    fn user_agent(&self) -> String {
        self.window.navigator().user_agent().unwrap_or_default()
    }
}

impl Scheduler for WebHost {
    fn now_ms(&self) -> f64 {
        self.window
            .performance()
            .map_or_else(js_sys::Date::now, |p| p.now())
    }

    fn set_timer(&self, timer: Timer, delay_ms: f64) {
        self.clear_timer(timer);
        let shared = self.shared.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            shared.deliver(HostEvent::Timer(timer));
        });
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                delay_ms.ceil() as i32,
            ) {
            Ok(id) => {
                self.timers.borrow_mut().insert(timer, (id, closure));
            }
            Err(e) => log::warn!("setTimeout failed for {timer:?}: {e:?}"),
        }
    }

    fn clear_timer(&self, timer: Timer) {
        if let Some((id, closure)) = self.timers.borrow_mut().remove(&timer) {
            self.window.clear_timeout_with_handle(id);
            self.shared.retire(Box::new(closure));
        }
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

impl ImageLoader for WebHost {
    fn load_image(&self, url: &str) -> ImageFuture {
        image::load_image(self.document.clone(), url)
    }
}
