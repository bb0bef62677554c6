mod error;
mod host;
mod image;
mod input;
mod options;
mod registry;

use crate::error::WebError;
use crate::host::{Card, WebHost};
use futures::future::{self, FutureExt, LocalBoxFuture};
use scratchcard_core::ScratchResult;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// WASM entry point. Sets the panic hook and initializes logging.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("logger init failed");
    log::info!("scratchcard ready");
}


type Task = LocalBoxFuture<'static, Result<(), WebError>>;

/// Start `task` with the argument read from JS. A bad argument becomes a
/// failed task rather than an early return, so callers always get a
/// promise to await.
fn start<T>(read: Result<T, WebError>, task: impl FnOnce(T) -> LocalBoxFuture<'static, ScratchResult<()>>) -> Task {
    match read {
        Ok(value) => task(value).map(|done| done.map_err(WebError::from)).boxed_local(),
        Err(err) => future::ready(Err(err)).boxed_local(),
    }
}

fn to_promise(task: Task) -> js_sys::Promise {
    future_to_promise(async move {
        task.await.map(|()| JsValue::UNDEFINED).map_err(JsValue::from)
    })
}

/// A scratch card mounted into a container element.
#[wasm_bindgen]
pub struct ScratchCardWidget {
    host: Rc<WebHost>,
    card: Rc<RefCell<Card>>,
}

#[wasm_bindgen]
impl ScratchCardWidget {
    /// `options` is a plain object in the same shape as the JSON options;
    /// `menu` is an optional array of `{ key, text, onClick, disabled }`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: web_sys::HtmlElement,
        options: JsValue,
        menu: Option<js_sys::Array>,
    ) -> Result<ScratchCardWidget, JsValue> {
        let host = Rc::new(WebHost::new()?);
        let container = host.register(container.into());
        let options = options::read_options(&host, &options)?;
        let items = match menu {
            Some(menu) => options::read_menu(&host, &menu)?,
            None => Vec::new(),
        };
        let card = Card::new(host.clone(), container, options, items).map_err(WebError::from)?;
        let card = Rc::new(RefCell::new(card));
        host.connect(&card);
        Ok(Self { host, card })
    }

    /// Repaint the coating; resolves once drawn. Omit the argument to reuse
    /// the configured coating. An unsupported value rejects.
    #[wasm_bindgen(js_name = setCoating)]
    pub fn set_coating(&self, coating: JsValue) -> js_sys::Promise {
        let card = &self.card;
        to_promise(start(options::read_coating(&coating), |coating| {
            card.borrow().set_coating(coating)
        }))
    }

    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&self, content: JsValue) -> js_sys::Promise {
        let card = &self.card;
        let content = options::read_content(&self.host, &content).map(Option::unwrap_or_default);
        to_promise(start(content, |content| card.borrow_mut().set_background(content)))
    }

    #[wasm_bindgen(js_name = setContextMenu)]
    pub fn set_context_menu(&self, items: js_sys::Array) -> Result<(), JsValue> {
        let items = options::read_menu(&self.host, &items)?;
        self.card.borrow_mut().set_context_menu(items);
        Ok(())
    }

    pub fn remove(&self) {
        self.card.borrow_mut().remove();
    }

    #[wasm_bindgen(getter, js_name = scratchedPercent)]
    pub fn scratched_percent(&self) -> f32 {
        self.card.borrow().scratched_percent()
    }

    #[wasm_bindgen(getter)]
    pub fn options(&self) -> Result<JsValue, JsValue> {
        Ok(options::describe(self.card.borrow().options())?)
    }
}
