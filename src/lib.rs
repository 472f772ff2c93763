//! Chat-overlay renders a scrolling, time-synchronized chat log (as used
//! for stream replays) into premultiplied RGBA frames.
//!
//! Given a popcorn-style XML log of timestamped `(user, message)` entries
//! and a playback time, [`ChatOverlay::render`] composites the currently
//! active messages (fading in, held, fading out) top-to-bottom as rounded
//! bubbles, and [`ChatOverlay::copy_into`] hands the clipped result to the
//! host in its expected channel order and vertical orientation.
//!
//! ```no_run
//! use chat_overlay::{ChatOverlay, FontSpec, OverlayConfig};
//!
//! let font = FontSpec::from_path("DejaVuSans.ttf", 16.0)?;
//! let overlay = ChatOverlay::new(OverlayConfig::new(font))?;
//! overlay.reload_messages("chat.xml");
//! let occupied = overlay.render(12.5)?;
//! # let _ = occupied;
//! # Ok::<(), chat_overlay::OverlayError>(())
//! ```
#![forbid(unsafe_code)]

pub mod chatlog;
pub mod color;
pub mod compositor;
pub mod copy_out;
pub mod error;
pub mod fade;
pub mod text;

mod overlay;
mod surface;

pub use chatlog::{ChatEntry, MessageStore};
pub use color::{Rgb, Rgba};
pub use compositor::{FontSpec, FrameRGBA, OverlayConfig, OverlayRenderer};
pub use copy_out::{ChannelOrder, RectI};
pub use error::{OverlayError, OverlayResult};
pub use fade::{Fade, FadeTiming, MIN_VISIBLE_ALPHA};
pub use overlay::ChatOverlay;
pub use text::{MessageBrush, TextLayoutEngine};
