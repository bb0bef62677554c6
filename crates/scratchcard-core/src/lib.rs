//! Browser-independent scratch card engine.
//!
//! `ScratchCard` owns a software canvas painted with an opaque coating that
//! pointer sessions erase. Everything it needs from the page goes through
//! the `Host` traits, so the engine runs the same in a browser binding and
//! in tests.

pub mod background;
pub mod bitmap;
pub mod brush;
pub mod card;
pub mod coating;
pub mod constants;
pub mod error;
pub mod events;
pub mod host;
pub mod menu;
pub mod options;
pub mod slot;
pub mod surface;
pub mod throttle;
pub mod types;
pub mod util;

#[cfg(test)]
mod test_harness;

pub use bitmap::Bitmap;
pub use card::{ScratchCard, Session};
pub use coating::{ColorStop, Coating, Gradient};
pub use error::{ScratchError, ScratchResult};
pub use events::{EventResponse, HostEvent, PointerInput, PointerKind};
pub use host::{Dom, EventSource, EventTarget, Host, ImageLoader, Listener, Scheduler, Timer};
pub use menu::{ContextMenu, MenuClick, MenuItem, MenuLabel};
pub use options::{Callback, Content, Options, Size};
pub use surface::Surface;
pub use types::{NodeId, PagePos, PixelRect, ScratchState};
