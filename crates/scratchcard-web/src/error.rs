use scratchcard_core::ScratchError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures at the JavaScript boundary.
#[derive(Debug, Error)]
pub enum WebError {
    #[error("{0} is not available in this environment")]
    MissingGlobal(&'static str),

    #[error("JavaScript error: {0}")]
    Js(String),

    #[error("invalid options: {0}")]
    Options(String),

    #[error(transparent)]
    Core(#[from] ScratchError),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        WebError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
