//! Image loading through an `<img>` element, decoded via an offscreen canvas.

use crate::error::WebError;
use futures::channel::oneshot;
use futures::future::FutureExt;
use scratchcard_core::host::ImageFuture;
use scratchcard_core::{Bitmap, ScratchError};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

type Outcome = Result<(), String>;

pub fn load_image(document: Document, url: &str) -> ImageFuture {
    let url = url.to_string();
    async move {
        let failed = |reason: String| ScratchError::ImageLoad {
            url: url.clone(),
            reason,
        };
        let img = HtmlImageElement::new().map_err(|e| failed(WebError::from(e).to_string()))?;
        img.set_cross_origin(Some(""));

        let (tx, rx) = oneshot::channel::<Outcome>();
        let tx = Rc::new(RefCell::new(Some(tx)));
        let settle = move |tx: &Rc<RefCell<Option<oneshot::Sender<Outcome>>>>, outcome: Outcome| {
            if let Some(tx) = tx.borrow_mut().take() {
                tx.send(outcome).ok();
            }
        };

        let onload = {
            let tx = tx.clone();
            Closure::<dyn FnMut()>::new(move || settle(&tx, Ok(())))
        };
        let onerror = {
            let tx = tx.clone();
            Closure::<dyn FnMut()>::new(move || settle(&tx, Err("network or decode error".into())))
        };
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        img.set_src(&url);

        let outcome = rx.await.unwrap_or_else(|_| Err("load abandoned".into()));
        img.set_onload(None);
        img.set_onerror(None);
        drop((onload, onerror));
        outcome.map_err(failed)?;

        rasterize(&document, &img).map_err(|e| failed(e.to_string()))
    }
    .boxed_local()
}

/// Read an image's pixels by drawing it into a scratch canvas.
fn rasterize(document: &Document, img: &HtmlImageElement) -> Result<Bitmap, WebError> {
    let (width, height) = (img.natural_width(), img.natural_height());
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| WebError::Js("created element is not a canvas".into()))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = context_2d(&canvas)?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0)?;
    let data = ctx.get_image_data(0.0, 0.0, width as f64, height as f64)?.data();
    Ok(Bitmap::from_rgba(width, height, &data)?)
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, WebError> {
    canvas
        .get_context("2d")?
        .ok_or(WebError::MissingGlobal("CanvasRenderingContext2D"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| WebError::Js("2d context has an unexpected type".into()))
}
