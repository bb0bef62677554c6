//! Right-click popup bound to a trigger element.

use crate::constants::*;
use crate::events::EventResponse;
use crate::host::{EventTarget, Host, Listener, Subscriptions};
use crate::types::NodeId;
use crate::util::point_in_box;
use glam::Vec2;
use std::fmt;
use std::rc::Rc;

/// Passed to an item's click handler.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuClick {
    pub key: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MenuLabel {
    Text(String),
    /// Host element placed inside the entry.
    Element(NodeId),
}

#[derive(Clone)]
pub struct MenuItem {
    pub key: String,
    pub label: MenuLabel,
    pub on_click: Rc<dyn Fn(&MenuClick)>,
    pub disabled: bool,
}

impl MenuItem {
    pub fn new(key: impl Into<String>, label: impl Into<String>, on_click: impl Fn(&MenuClick) + 'static) -> Self {
        Self {
            key: key.into(),
            label: MenuLabel::Text(label.into()),
            on_click: Rc::new(on_click),
            disabled: false,
        }
    }

    pub fn with_element(mut self, node: NodeId) -> Self {
        self.label = MenuLabel::Element(node);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuState {
    pub visible: bool,
    /// Popup top-left in page coordinates.
    pub position: Vec2,
    pub items: Vec<MenuItem>,
}

/// Rendered popup nodes. Present only while the menu has items.
#[derive(Debug)]
struct MenuDom {
    top: NodeId,
    wrapper: NodeId,
    list: NodeId,
    items: Vec<NodeId>,
}

pub struct ContextMenu<H: Host> {
    host: Rc<H>,
    trigger: NodeId,
    container: NodeId,
    state: MenuState,
    dom: Option<MenuDom>,
    /// Trigger and document listeners.
    global: Subscriptions,
    /// Per-item click listeners, rebuilt with the DOM.
    item_listeners: Subscriptions,
    removed: bool,
}

impl<H: Host> ContextMenu<H> {
    pub fn new(host: Rc<H>, trigger: NodeId, items: Vec<MenuItem>, container: Option<NodeId>) -> Self {
        let container = container.unwrap_or_else(|| host.body());
        let mut menu = Self {
            host,
            trigger,
            container,
            state: MenuState {
                items,
                ..MenuState::default()
            },
            dom: None,
            global: Subscriptions::new(),
            item_listeners: Subscriptions::new(),
            removed: false,
        };
        menu.build();
        let host = menu.host.clone();
        menu.global
            .attach(host.as_ref(), EventTarget::Node(trigger), "contextmenu", Listener::TriggerContextMenu);
        menu.global
            .attach(host.as_ref(), EventTarget::Document, "contextmenu", Listener::DocumentContextMenu);
        menu.global
            .attach(host.as_ref(), EventTarget::Document, "click", Listener::DocumentClick);
        menu
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.state.items
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Popup root node, if anything is rendered.
    pub fn root(&self) -> Option<NodeId> {
        self.dom.as_ref().map(|dom| dom.top)
    }

    pub fn item_node(&self, index: usize) -> Option<NodeId> {
        self.dom.as_ref().and_then(|dom| dom.items.get(index).copied())
    }

    fn build(&mut self) {
        if self.state.items.is_empty() {
            return;
        }
        let host = self.host.clone();
        let list = host.create_element("ul");
        host.set_class_name(list, MENU_ROOT_CLASS);
        host.set_attribute(list, "role", "menu");

        let mut nodes = Vec::with_capacity(self.state.items.len());
        for (index, item) in self.state.items.iter().enumerate() {
            let li = host.create_element("li");
            host.set_class_name(li, MENU_ITEM_CLASS);
            if item.disabled {
                host.add_class(li, MENU_DISABLED_CLASS);
            }
            host.set_attribute(li, "role", "menuitem");
            match &item.label {
                MenuLabel::Text(text) => host.set_text(li, text),
                MenuLabel::Element(node) => host.append_child(li, *node),
            }
            if !item.disabled {
                self.item_listeners
                    .attach(host.as_ref(), EventTarget::Node(li), "click", Listener::MenuItemClick(index));
            }
            host.append_child(list, li);
            nodes.push(li);
        }

        let top = host.create_element("div");
        host.set_style(top, "position", "absolute");
        host.set_style(top, "top", "0px");
        host.set_style(top, "left", "0px");
        host.set_style(top, "width", "100%");
        let wrapper = host.create_element("div");
        host.set_class_name(wrapper, MENU_WRAPPER_CLASS);
        host.add_class(wrapper, MENU_HIDDEN_CLASS);
        host.append_child(wrapper, list);
        host.append_child(top, wrapper);
        host.append_child(self.container, top);

        self.state.visible = false;
        self.dom = Some(MenuDom {
            top,
            wrapper,
            list,
            items: nodes,
        });
    }

    fn teardown(&mut self) {
        let host = self.host.clone();
        self.item_listeners.detach_all(host.as_ref());
        if let Some(dom) = self.dom.take() {
            host.remove_node(dom.list);
            host.remove_node(dom.wrapper);
            host.remove_node(dom.top);
        }
        self.state.visible = false;
    }

    /// Replace the item list, rebuilding the popup from scratch.
    pub fn re_create_menu(&mut self, items: Vec<MenuItem>) {
        if self.removed {
            return;
        }
        self.teardown();
        self.state.items = items;
        self.build();
        log::debug!("context menu rebuilt with {} items", self.state.items.len());
    }

    /// Enable every item and rebuild so they become clickable.
    pub fn enable_all(&mut self) {
        let items = self
            .state
            .items
            .iter()
            .cloned()
            .map(|item| item.disabled(false))
            .collect();
        self.re_create_menu(items);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.state.position = Vec2::new(x, y);
        if let Some(dom) = &self.dom {
            self.host.set_style(dom.wrapper, "left", &format!("{x}px"));
            self.host.set_style(dom.wrapper, "top", &format!("{y}px"));
        }
    }

    pub fn show(&mut self) {
        if let Some(dom) = &self.dom {
            self.host.remove_class(dom.wrapper, MENU_HIDDEN_CLASS);
            self.state.visible = true;
        }
    }

    pub fn hide(&mut self) {
        if let Some(dom) = &self.dom {
            self.host.add_class(dom.wrapper, MENU_HIDDEN_CLASS);
            self.state.visible = false;
        }
    }

    /// Right-click on the trigger element.
    pub fn handle_trigger_context_menu(&mut self, page: Vec2) -> EventResponse {
        if self.dom.is_none() {
            return EventResponse::default();
        }
        self.move_to(page.x, page.y);
        self.show();
        EventResponse::consume()
    }

    /// Right-click anywhere. The native menu is suppressed only over the
    /// trigger.
    pub fn handle_document_context_menu(&mut self, page: Vec2) -> EventResponse {
        self.hide();
        if self.pointer_in_trigger(page) {
            EventResponse::prevent()
        } else {
            EventResponse::default()
        }
    }

    /// Left-click anywhere. Clicks on a disabled entry keep the menu open.
    pub fn handle_document_click(&mut self, target: Option<NodeId>) -> EventResponse {
        let on_disabled = target.is_some_and(|node| {
            self.dom.as_ref().is_some_and(|dom| {
                dom.items
                    .iter()
                    .zip(&self.state.items)
                    .any(|(&li, item)| li == node && item.disabled)
            })
        });
        if !on_disabled {
            self.hide();
        }
        EventResponse::default()
    }

    /// Returns the handler to invoke so the caller can run it outside any
    /// borrow of the menu.
    pub fn handle_item_click(&self, index: usize) -> Option<(Rc<dyn Fn(&MenuClick)>, MenuClick)> {
        let item = self.state.items.get(index).filter(|item| !item.disabled)?;
        Some((
            item.on_click.clone(),
            MenuClick {
                key: item.key.clone(),
                index,
            },
        ))
    }

    fn pointer_in_trigger(&self, page: Vec2) -> bool {
        let origin = self.host.page_offset(self.trigger);
        let size = self.host.offset_size(self.trigger);
        point_in_box(origin, size, page)
    }

    pub fn remove(&mut self) {
        if self.removed {
            return;
        }
        self.teardown();
        let host = self.host.clone();
        self.global.detach_all(host.as_ref());
        self.state.items.clear();
        self.removed = true;
    }
}
