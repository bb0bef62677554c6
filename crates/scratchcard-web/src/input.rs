//! Translation of native DOM events into host-neutral card events.

use glam::Vec2;
use scratchcard_core::{EventResponse, HostEvent, Listener, NodeId, PointerInput};
use wasm_bindgen::JsCast;
use web_sys::{Event, MouseEvent, TouchEvent};

fn mouse_page(e: &MouseEvent) -> Vec2 {
    Vec2::new(e.page_x() as f32, e.page_y() as f32)
}

/// First active contact, falling back to the contacts that just ended so
/// `touchend` still has a position.
fn touch_input(e: &TouchEvent) -> Option<PointerInput> {
    let touch = e.touches().get(0).or_else(|| e.changed_touches().get(0))?;
    let page = Vec2::new(touch.page_x() as f32, touch.page_y() as f32);
    let client = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
    Some(PointerInput::touch(page).with_client(client))
}

fn pointer_input(event: &Event) -> Option<PointerInput> {
    if let Some(e) = event.dyn_ref::<MouseEvent>() {
        let client = Vec2::new(e.client_x() as f32, e.client_y() as f32);
        return Some(PointerInput::mouse(mouse_page(e), e.button(), e.buttons()).with_client(client));
    }
    event.dyn_ref::<TouchEvent>().and_then(touch_input)
}

/// Build the card event for a native event delivered to `listener`.
/// `resolve` maps the event target back to a registered node.
pub fn translate(
    listener: Listener,
    event: &Event,
    resolve: impl FnOnce(&web_sys::EventTarget) -> Option<NodeId>,
) -> Option<HostEvent> {
    let page = || event.dyn_ref::<MouseEvent>().map(mouse_page);
    Some(match listener {
        Listener::PointerDown => HostEvent::PointerDown(pointer_input(event)?),
        Listener::PointerMove => HostEvent::PointerMove(pointer_input(event)?),
        Listener::PointerUp => HostEvent::PointerUp(pointer_input(event)?),
        Listener::Scroll => HostEvent::Scroll,
        Listener::WindowResize => HostEvent::WindowResize,
        Listener::TriggerContextMenu => HostEvent::ContextMenu { page: page()? },
        Listener::DocumentContextMenu => HostEvent::DocumentContextMenu { page: page()? },
        Listener::DocumentClick => HostEvent::DocumentClick {
            target: event.target().as_ref().and_then(resolve),
        },
        Listener::MenuItemClick(index) => HostEvent::MenuItemClick(index),
    })
}

pub fn apply(event: &Event, response: EventResponse) {
    if response.prevent_default {
        event.prevent_default();
    }
    if response.stop_propagation {
        event.stop_propagation();
    }
}
