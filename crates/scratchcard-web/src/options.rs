//! Reading widget configuration out of plain JavaScript values.
//!
//! Serializable fields go through `JSON.stringify` and serde; DOM elements
//! and functions are pulled out by hand first since JSON cannot carry them.

use crate::error::WebError;
use crate::host::WebHost;
use js_sys::{Function, Object, Reflect, JSON};
use scratchcard_core::{Callback, Coating, Content, MenuClick, MenuItem, MenuLabel, Options};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlImageElement};

const NON_JSON_KEYS: [&str; 6] = [
    "content",
    "coating",
    "menuContainer",
    "callback",
    "onStart",
    "onScratching",
];

fn get(object: &JsValue, key: &str) -> Result<JsValue, WebError> {
    Ok(Reflect::get(object, &JsValue::from_str(key))?)
}

fn is_absent(value: &JsValue) -> bool {
    value.is_undefined() || value.is_null()
}

fn stringify(value: &JsValue) -> Result<String, WebError> {
    JSON::stringify(value)?
        .as_string()
        .ok_or_else(|| WebError::Options("value is not serializable".into()))
}

/// Wrap a JS function so it runs on a fresh task, never while the card is
/// mid-dispatch.
fn deferred(function: Function) -> Callback {
    Callback::new(move || {
        let function = function.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = function.call0(&JsValue::NULL) {
                log::error!("callback threw: {e:?}");
            }
        });
    })
}

fn callback(object: &JsValue, key: &str) -> Result<Callback, WebError> {
    Ok(get(object, key)?
        .dyn_into::<Function>()
        .map(deferred)
        .unwrap_or_default())
}

pub fn read_options(host: &WebHost, value: &JsValue) -> Result<Options, WebError> {
    if is_absent(value) {
        return Ok(Options::default());
    }
    let plain = Object::assign(&Object::new(), value.unchecked_ref());
    for key in NON_JSON_KEYS {
        Reflect::delete_property(&plain, &JsValue::from_str(key))?;
    }
    let mut options = Options::from_json(&stringify(&plain)?)?;

    if let Some(content) = read_content(host, &get(value, "content")?)? {
        options.content = content;
    }
    if let Some(coating) = read_coating(&get(value, "coating")?)? {
        options.coating = coating;
    }
    if let Ok(container) = get(value, "menuContainer")?.dyn_into::<Element>() {
        options.menu_container = Some(host.register(container));
    }
    options.callback = callback(value, "callback")?;
    options.on_start = callback(value, "onStart")?;
    options.on_scratching = callback(value, "onScratching")?;
    options.validate()?;
    Ok(options)
}

/// `None` when the value is absent.
pub fn read_content(host: &WebHost, value: &JsValue) -> Result<Option<Content>, WebError> {
    if is_absent(value) {
        return Ok(None);
    }
    if let Some(text) = value.as_string() {
        return Ok(Some(Content::from(text)));
    }
    if let Some(img) = value.dyn_ref::<HtmlImageElement>() {
        return Ok(Some(Content::Image(img.src())));
    }
    match value.clone().dyn_into::<Element>() {
        Ok(element) => Ok(Some(Content::Element(host.register(element)))),
        Err(_) => Err(WebError::Options(format!("unsupported content {value:?}"))),
    }
}

/// `None` when the value is absent, meaning "use the configured coating".
pub fn read_coating(value: &JsValue) -> Result<Option<Coating>, WebError> {
    if is_absent(value) {
        return Ok(None);
    }
    if let Some(text) = value.as_string() {
        return Ok(Some(Coating::from(text)));
    }
    if let Some(img) = value.dyn_ref::<HtmlImageElement>() {
        return Ok(Some(Coating::Url(img.src())));
    }
    let json = stringify(value)?;
    serde_json::from_str::<Coating>(&json)
        .map(Some)
        .map_err(|_| WebError::Core(scratchcard_core::ScratchError::UnsupportedCoating(json)))
}

fn read_menu_item(host: &WebHost, item: &JsValue) -> Result<MenuItem, WebError> {
    let key = get(item, "key")?.as_string().unwrap_or_default();
    let text = get(item, "text")?;
    let label = match text.as_string() {
        Some(text) => MenuLabel::Text(text),
        None => match text.dyn_into::<Element>() {
            Ok(element) => MenuLabel::Element(host.register(element)),
            Err(_) => MenuLabel::Text(key.clone()),
        },
    };
    let handler = get(item, "onClick")?.dyn_into::<Function>().ok();
    let disabled = get(item, "disabled")?.is_truthy();
    Ok(MenuItem {
        key,
        label,
        on_click: Rc::new(move |click: &MenuClick| {
            let Some(handler) = handler.clone() else {
                return;
            };
            let key = JsValue::from_str(&click.key);
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = handler.call1(&JsValue::NULL, &key) {
                    log::error!("menu handler threw: {e:?}");
                }
            });
        }),
        disabled,
    })
}

pub fn read_menu(host: &WebHost, items: &js_sys::Array) -> Result<Vec<MenuItem>, WebError> {
    items.iter().map(|item| read_menu_item(host, &item)).collect()
}

/// Plain-object view of the effective configuration.
pub fn describe(options: &Options) -> Result<JsValue, WebError> {
    Ok(JSON::parse(&summary(options).to_string())?)
}

fn summary(options: &Options) -> serde_json::Value {
    let coating = match &options.coating {
        Coating::Color(text) | Coating::Url(text) => serde_json::Value::from(text.as_str()),
        Coating::Image(_) => serde_json::Value::from("[image]"),
        Coating::Gradient(_) => serde_json::Value::from("[gradient]"),
    };
    let content = match &options.content {
        Content::Text(text) | Content::Image(text) => serde_json::Value::from(text.as_str()),
        Content::Element(_) => serde_json::Value::from("[element]"),
    };
    let menu_container = if options.menu_container.is_some() { "[element]" } else { "body" };
    serde_json::json!({
        "size": { "width": options.size.width, "height": options.size.height },
        "sizeAdaption": options.size_adaption,
        "content": content,
        "coating": coating,
        "fontFamily": options.font_family,
        "fontSize": options.font_size,
        "finishedThreshold": options.finished_threshold,
        "autoRefreshScratchedPercent": options.auto_refresh_scratched_percent,
        "brushRadius": options.brush_radius,
        "menuContainer": menu_container,
    })
}
