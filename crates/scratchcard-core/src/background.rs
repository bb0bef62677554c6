//! Content layers placed beneath the canvas.
//!
//! Layers stay hidden while the coating is being painted so the prize is
//! never visible before it is covered.

use crate::constants::{CONTENT_CLASS, CONTENT_TEXT_CLASS};
use crate::error::ScratchResult;
use crate::host::{Dom, Host};
use crate::options::Content;
use crate::slot::Slot;
use crate::types::NodeId;
use futures::future::{self, FutureExt, LocalBoxFuture};
use std::rc::Rc;

#[derive(Debug)]
pub struct Background {
    container: NodeId,
    /// Layers are inserted before this node when set.
    anchor: Option<NodeId>,
    nodes: Vec<NodeId>,
    coated: bool,
    /// Bumped on every clear so stale image loads can be discarded.
    generation: u64,
}

impl Background {
    pub fn new(container: NodeId, anchor: Option<NodeId>) -> Self {
        Self {
            container,
            anchor,
            nodes: Vec::new(),
            coated: false,
            generation: 0,
        }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn is_coated(&self) -> bool {
        self.coated
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Remove every layer from the container.
    pub fn clear(&mut self, dom: &impl Dom) {
        for node in self.nodes.drain(..) {
            dom.remove_node(node);
        }
        self.generation += 1;
    }

    pub fn insert(&mut self, dom: &impl Dom, node: NodeId) {
        dom.add_class(node, CONTENT_CLASS);
        if !self.coated {
            dom.set_style(node, "visibility", "hidden");
        }
        match self.anchor {
            Some(anchor) => dom.insert_before(self.container, node, anchor),
            None => dom.append_child(self.container, node),
        }
        self.nodes.push(node);
    }

    /// Hide all layers until the next coat completes.
    pub fn conceal(&mut self, dom: &impl Dom) {
        self.coated = false;
        for &node in &self.nodes {
            dom.set_style(node, "visibility", "hidden");
        }
    }

    pub fn reveal(&mut self, dom: &impl Dom) {
        self.coated = true;
        for &node in &self.nodes {
            dom.set_style(node, "visibility", "");
        }
    }
}

fn text_layer(dom: &impl Dom, text: &str, font_family: &str, font_size: &str) -> NodeId {
    let div = dom.create_element("div");
    let span = dom.create_element("span");
    dom.set_text(span, text);
    dom.set_class_name(span, CONTENT_TEXT_CLASS);
    dom.set_style(div, "font-family", font_family);
    dom.set_style(div, "font-size", font_size);
    dom.append_child(div, span);
    div
}

/// Replace the layers with `content`. Text and element content land
/// synchronously; image content lands once the host has loaded it, unless
/// the layers were cleared or released in the meantime.
pub fn set_background<H: Host + 'static>(
    host: &Rc<H>,
    layers: &Slot<Background>,
    content: &Content,
    font_family: &str,
    font_size: &str,
) -> LocalBoxFuture<'static, ScratchResult<()>> {
    let Some(generation) = layers.with(|bg| {
        bg.clear(host.as_ref());
        bg.generation
    }) else {
        return future::ready(Ok(())).boxed_local();
    };

    match content {
        Content::Text(text) => {
            let node = text_layer(host.as_ref(), text, font_family, font_size);
            layers.with(|bg| bg.insert(host.as_ref(), node));
            future::ready(Ok(())).boxed_local()
        }
        Content::Element(node) => {
            let node = *node;
            layers.with(|bg| bg.insert(host.as_ref(), node));
            future::ready(Ok(())).boxed_local()
        }
        Content::Image(url) => {
            let img = host.create_element("img");
            host.set_attribute(img, "alt", "");
            let load = host.load_image(url);
            let host = host.clone();
            let layers = layers.clone();
            let url = url.clone();
            async move {
                load.await?;
                let landed = layers.with(|bg| {
                    if bg.generation != generation {
                        return false;
                    }
                    host.set_attribute(img, "src", &url);
                    bg.insert(host.as_ref(), img);
                    true
                });
                if landed != Some(true) {
                    log::debug!("discarding late background image {url}");
                }
                Ok(())
            }
            .boxed_local()
        }
    }
}
