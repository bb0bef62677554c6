//! The scratch card engine: canvas, coating, erasure sessions and the
//! scratched-fraction bookkeeping that drives completion.

use crate::background::{self, Background};
use crate::brush::Brush;
use crate::coating::{Coating, Resolved};
use crate::constants::THROTTLE_INTERVAL_MS;
use crate::error::ScratchResult;
use crate::events::{EventResponse, HostEvent, PointerInput};
use crate::host::{EventTarget, Host, Listener, Subscriptions, Timer};
use crate::menu::{ContextMenu, MenuItem};
use crate::options::{Content, Options};
use crate::slot::Slot;
use crate::surface::{Composite, Surface};
use crate::throttle::{Throttle, Throttled};
use crate::types::{NodeId, ScratchState};
use crate::util::{is_mobile_user_agent, InputEventNames};
use futures::future::{self, FutureExt, LocalBoxFuture};
use glam::UVec2;
use std::cell::Cell;
use std::rc::Rc;

/// Pointer session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Idle,
    Scratching,
}

pub struct ScratchCard<H: Host> {
    host: Rc<H>,
    options: Options,
    container: NodeId,
    canvas: NodeId,
    surface: Slot<Surface>,
    layers: Slot<Background>,
    /// Bumped by every coating paint; a load that lands under an older
    /// value has been superseded.
    coat_generation: Rc<Cell<u64>>,
    state: ScratchState,
    session: Session,
    brush: Brush,
    menu: ContextMenu<H>,
    input: InputEventNames,
    subscriptions: Subscriptions,
    percent_throttle: Throttle<()>,
    relocate_throttle: Throttle<()>,
    /// Set the first time the threshold is crossed.
    menu_unlocked: bool,
    removed: bool,
}

impl<H: Host + 'static> ScratchCard<H> {
    pub fn new(host: Rc<H>, container: NodeId, options: Options, menu: Vec<MenuItem>) -> ScratchResult<Self> {
        options.validate()?;
        let size = if options.size_adaption {
            host.client_size(container)
        } else {
            UVec2::new(options.size.width, options.size.height)
        };
        log::info!("scratch card {}x{} (adaptive: {})", size.x, size.y, options.size_adaption);

        let canvas = host.create_element("canvas");
        host.set_canvas_size(canvas, size);
        host.append_child(container, canvas);

        let menu = ContextMenu::new(host.clone(), canvas, menu, options.menu_container);
        let input = InputEventNames::for_device(is_mobile_user_agent(&host.user_agent()));

        let mut card = Self {
            surface: Slot::new(Surface::new(size.x, size.y)),
            layers: Slot::new(Background::new(container, Some(canvas))),
            coat_generation: Rc::new(Cell::new(0)),
            state: ScratchState::default(),
            session: Session::Idle,
            brush: Brush::new(options.brush_radius),
            menu,
            input,
            subscriptions: Subscriptions::new(),
            percent_throttle: Throttle::new(THROTTLE_INTERVAL_MS),
            relocate_throttle: Throttle::new(THROTTLE_INTERVAL_MS),
            menu_unlocked: false,
            removed: false,
            host,
            options,
            container,
            canvas,
        };

        let content = card.options.content.clone();
        let placed = card.set_background(content);
        card.spawn_logged("background", placed);
        card.relocate();
        card.init_card();
        card.init_event();
        Ok(card)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn scratched_percent(&self) -> f32 {
        self.state.scratched_percent
    }

    pub fn state(&self) -> &ScratchState {
        &self.state
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn menu(&self) -> &ContextMenu<H> {
        &self.menu
    }

    pub fn canvas(&self) -> NodeId {
        self.canvas
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Read the drawing surface, if it has not been released.
    pub fn with_surface<R>(&self, f: impl FnOnce(&Surface) -> R) -> Option<R> {
        self.surface.with(|surface| f(surface))
    }

    /// Paint the coating over the whole canvas, then show the layers
    /// beneath. `None` repaints the configured coating. The latest call wins:
    /// an image that lands after a newer paint, or after removal, is dropped
    /// and its future completes with `Ok(())`.
    pub fn set_coating(&self, coating: Option<Coating>) -> LocalBoxFuture<'static, ScratchResult<()>> {
        if self.removed {
            return future::ready(Ok(())).boxed_local();
        }
        let coating = coating.unwrap_or_else(|| self.options.coating.clone());
        let resolved = match coating.resolve() {
            Ok(resolved) => resolved,
            Err(err) => return future::ready(Err(err)).boxed_local(),
        };
        let generation = self.coat_generation.get() + 1;
        self.coat_generation.set(generation);

        match resolved {
            Resolved::Local(paint) => {
                let painted = self
                    .surface
                    .with(|surface| surface.with_composite(Composite::SourceOver, |s| paint.paint(s)))
                    .unwrap_or(Ok(()));
                if painted.is_ok() {
                    self.present();
                    self.layers.with(|layers| layers.reveal(self.host.as_ref()));
                }
                future::ready(painted).boxed_local()
            }
            Resolved::Remote(url) => {
                let load = self.host.load_image(&url);
                let surface = self.surface.clone();
                let layers = self.layers.clone();
                let current = self.coat_generation.clone();
                let host = self.host.clone();
                let canvas = self.canvas;
                async move {
                    let loaded = load.await;
                    if !surface.is_live() {
                        log::debug!("coating {url} arrived after removal");
                        return Ok(());
                    }
                    if current.get() != generation {
                        log::debug!("coating {url} superseded");
                        return Ok(());
                    }
                    let bitmap = loaded?;
                    surface.with(|surface| {
                        surface.with_composite(Composite::SourceOver, |s| s.draw_bitmap_cover(&bitmap));
                        host.present(canvas, surface);
                    });
                    layers.with(|layers| layers.reveal(host.as_ref()));
                    Ok(())
                }
                .boxed_local()
            }
        }
    }

    /// Replace the content beneath the canvas. The new layers stay hidden
    /// until the coating has been painted.
    pub fn set_background(&mut self, content: Content) -> LocalBoxFuture<'static, ScratchResult<()>> {
        if self.removed {
            return future::ready(Ok(())).boxed_local();
        }
        background::set_background(
            &self.host,
            &self.layers,
            &content,
            &self.options.font_family,
            &self.options.font_size,
        )
    }

    pub fn set_context_menu(&mut self, items: Vec<MenuItem>) {
        self.menu.re_create_menu(items);
    }

    /// Recount transparent pixels. Returns the new fraction.
    pub fn update_scratched_percent(&mut self) -> f32 {
        if let Some(fraction) = self.surface.with(|surface| surface.transparent_fraction()) {
            self.state.scratched_percent = fraction;
        }
        self.state.scratched_percent
    }

    /// Route a host event to its handler.
    pub fn dispatch(&mut self, event: HostEvent) -> EventResponse {
        if self.removed {
            return EventResponse::default();
        }
        match event {
            HostEvent::PointerDown(input) => self.handle_pointer_down(input),
            HostEvent::PointerMove(input) => self.handle_pointer_move(input),
            HostEvent::PointerUp(input) => self.handle_pointer_up(input),
            HostEvent::ContextMenu { page } => self.menu.handle_trigger_context_menu(page),
            HostEvent::DocumentContextMenu { page } => self.menu.handle_document_context_menu(page),
            HostEvent::DocumentClick { target } => self.menu.handle_document_click(target),
            HostEvent::MenuItemClick(index) => {
                if let Some((on_click, click)) = self.menu.handle_item_click(index) {
                    on_click(&click);
                }
                EventResponse::default()
            }
            HostEvent::Scroll | HostEvent::WindowResize => {
                self.schedule_relocate();
                EventResponse::default()
            }
            HostEvent::ContainerResize { target, size } => {
                self.handle_container_resize(target, size);
                EventResponse::default()
            }
            HostEvent::Timer(timer) => {
                self.handle_timer(timer);
                EventResponse::default()
            }
        }
    }

    /// Tear everything down. Safe to call repeatedly; in-flight loads
    /// resolve into no-ops.
    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        self.session = Session::Idle;
        let host = self.host.clone();

        self.menu.remove();
        self.subscriptions.detach_all(host.as_ref());
        if self.options.size_adaption {
            host.unobserve_resize(self.container);
        }
        host.clear_timer(Timer::ScratchedPercent);
        host.clear_timer(Timer::Relocate);
        self.percent_throttle.cancel();
        self.relocate_throttle.cancel();

        self.surface.release();
        host.remove_node(self.canvas);
        if let Some(mut layers) = self.layers.release() {
            layers.clear(host.as_ref());
        }
        log::info!("scratch card removed");
    }

    fn spawn_logged(&self, what: &'static str, task: LocalBoxFuture<'static, ScratchResult<()>>) {
        self.host.spawn(
            async move {
                if let Err(err) = task.await {
                    log::error!("{what}: {err}");
                }
            }
            .boxed_local(),
        );
    }

    fn present(&self) {
        self.surface.with(|surface| self.host.present(self.canvas, surface));
    }

    /// Clear and hide the layers; the coating paint reveals them.
    fn init_card(&mut self) {
        let host = self.host.clone();
        self.surface.with(Surface::clear);
        self.layers.with(|layers| layers.conceal(host.as_ref()));
        let painted = self.set_coating(None);
        self.spawn_logged("coating", painted);
    }

    fn init_event(&mut self) {
        let host = self.host.clone();
        let subs = &mut self.subscriptions;
        subs.attach(host.as_ref(), EventTarget::Node(self.canvas), self.input.down, Listener::PointerDown);
        subs.attach(host.as_ref(), EventTarget::Window, "scroll", Listener::Scroll);
        subs.attach(host.as_ref(), EventTarget::Window, "resize", Listener::WindowResize);
        if self.options.size_adaption {
            host.observe_resize(self.container);
        }
    }

    fn relocate(&mut self) {
        self.state.canvas_pos = self.host.page_offset(self.canvas);
    }

    fn schedule_relocate(&mut self) {
        match self.relocate_throttle.call(self.host.now_ms(), ()) {
            Throttled::Run(()) => self.relocate(),
            Throttled::Schedule { wait_ms } => self.host.set_timer(Timer::Relocate, wait_ms),
            Throttled::Coalesced => {}
        }
    }

    fn schedule_percent_update(&mut self) {
        match self.percent_throttle.call(self.host.now_ms(), ()) {
            Throttled::Run(()) => {
                self.update_scratched_percent();
            }
            Throttled::Schedule { wait_ms } => self.host.set_timer(Timer::ScratchedPercent, wait_ms),
            Throttled::Coalesced => {}
        }
    }

    fn handle_timer(&mut self, timer: Timer) {
        let now = self.host.now_ms();
        match timer {
            Timer::ScratchedPercent => {
                if self.percent_throttle.fire(now).is_some() {
                    self.update_scratched_percent();
                }
            }
            Timer::Relocate => {
                if self.relocate_throttle.fire(now).is_some() {
                    self.relocate();
                }
            }
        }
    }

    fn handle_pointer_down(&mut self, input: PointerInput) -> EventResponse {
        if !input.is_primary() {
            return EventResponse::default();
        }
        if self.session == Session::Scratching {
            return EventResponse::prevent();
        }
        self.session = Session::Scratching;
        let host = self.host.clone();
        self.subscriptions.attach(
            host.as_ref(),
            EventTarget::Node(self.canvas),
            self.input.moved,
            Listener::PointerMove,
        );
        self.subscriptions
            .attach(host.as_ref(), EventTarget::Document, self.input.up, Listener::PointerUp);
        self.options.on_start.call();
        EventResponse::prevent()
    }

    fn handle_pointer_move(&mut self, input: PointerInput) -> EventResponse {
        if self.session != Session::Scratching {
            return EventResponse::default();
        }
        if !input.is_primary() {
            return EventResponse::prevent();
        }
        let local = self.state.canvas_pos.to_local(input.page);
        self.brush.move_brush_pos(local.x, local.y);
        self.state.brush_pos = local;
        self.scratch();
        if self.options.auto_refresh_scratched_percent {
            self.schedule_percent_update();
        }
        EventResponse::prevent()
    }

    fn scratch(&mut self) {
        let (brush, host, canvas) = (&self.brush, &self.host, self.canvas);
        self.surface.with(|surface| {
            surface.with_composite(Composite::DestinationOut, |s| brush.brush(s));
            if let Some(dirty) = brush.footprint(surface.width(), surface.height()) {
                host.present_region(canvas, surface, dirty);
            }
        });
    }

    fn handle_pointer_up(&mut self, input: PointerInput) -> EventResponse {
        if self.session != Session::Scratching {
            return EventResponse::default();
        }
        self.session = Session::Idle;
        let host = self.host.clone();
        self.subscriptions.detach(host.as_ref(), Listener::PointerMove);
        self.subscriptions.detach(host.as_ref(), Listener::PointerUp);

        if self.options.auto_refresh_scratched_percent {
            host.clear_timer(Timer::ScratchedPercent);
            if self.percent_throttle.flush(host.now_ms()).is_some() {
                self.update_scratched_percent();
            }
        } else {
            self.update_scratched_percent();
        }
        self.options.on_scratching.call();

        if self.state.scratched_percent > self.options.finished_threshold {
            if !self.menu_unlocked {
                self.menu_unlocked = true;
                log::info!("threshold crossed at {:.3}, unlocking menu", self.state.scratched_percent);
                self.menu.enable_all();
            }
            if input.is_primary() {
                self.options.callback.call();
            }
        }
        EventResponse::default()
    }

    fn handle_container_resize(&mut self, target: NodeId, size: UVec2) {
        if target != self.container || !self.options.size_adaption {
            return;
        }
        log::debug!("container resized to {}x{}", size.x, size.y);
        self.host.set_canvas_size(self.canvas, size);
        self.surface.with(|surface| surface.resize(size.x, size.y));
        self.state.scratched_percent = 0.0;
        self.percent_throttle.cancel();
        self.host.clear_timer(Timer::ScratchedPercent);
        self.init_card();
        self.relocate();
    }
}
