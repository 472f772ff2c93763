//! Thread-safe per-instance facade over [`OverlayRenderer`].
//!
//! Hosts may issue render and reconfigure calls for the same overlay from
//! multiple worker threads; one mutex per instance serializes store
//! replacement, configuration changes, surface (re)allocation and the
//! render pass. Distinct instances share nothing.

use std::path::Path;
use std::sync::Mutex;

use crate::chatlog::{self, ChatEntry};
use crate::color::{Rgb, Rgba};
use crate::compositor::{FontSpec, FrameRGBA, OverlayConfig, OverlayRenderer};
use crate::copy_out::{ChannelOrder, RectI};
use crate::error::OverlayResult;
use crate::fade::FadeTiming;

/// One chat overlay instance: sorted message store, configuration and
/// render surface behind a single lock.
pub struct ChatOverlay {
    inner: Mutex<OverlayRenderer>,
}

impl ChatOverlay {
    /// Create an overlay instance from a configuration.
    pub fn new(config: OverlayConfig) -> OverlayResult<Self> {
        Ok(Self {
            inner: Mutex::new(OverlayRenderer::new(config)?),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, OverlayRenderer> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Reload the message store from a chat log file.
    ///
    /// Any load failure clears the store so a bad file degrades to "no
    /// overlay" instead of interrupting playback; the failure is logged.
    /// Returns the number of messages loaded.
    #[tracing::instrument(skip(self))]
    pub fn reload_messages(&self, path: impl AsRef<Path> + std::fmt::Debug) -> usize {
        match chatlog::load_from_file(path.as_ref()) {
            Ok(entries) => {
                let n = entries.len();
                self.lock().set_messages(entries);
                n
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load chat log, clearing overlay");
                self.lock().set_messages(Vec::new());
                0
            }
        }
    }

    /// Replace the message store with already-parsed entries.
    pub fn set_messages(&self, entries: Vec<ChatEntry>) {
        self.lock().set_messages(entries);
    }

    /// Number of messages currently in the store.
    pub fn message_count(&self) -> usize {
        self.lock().message_count()
    }

    /// Set the render target size (releases the surface on change).
    pub fn set_dimensions(&self, width: u32, height: u32) -> OverlayResult<()> {
        self.lock().set_dimensions(width, height)
    }

    /// Set the layout margin (releases the surface on change).
    pub fn set_margin(&self, margin: u32) -> OverlayResult<()> {
        self.lock().set_margin(margin)
    }

    /// Set bubble, user-name and body-text colors.
    pub fn set_colors(&self, bg: Rgba, user: Rgb, text: Rgb) {
        self.lock().set_colors(bg, user, text);
    }

    /// Set fade-in/hold/fade-out timing.
    pub fn set_timing(&self, timing: FadeTiming) -> OverlayResult<()> {
        self.lock().set_timing(timing)
    }

    /// Swap the message font (releases the surface).
    pub fn set_font(&self, font: FontSpec) -> OverlayResult<()> {
        self.lock().set_font(font)
    }

    /// Apply a whole configuration in one critical section, the batched
    /// counterpart of the individual setters. The message store is kept.
    pub fn apply_config(&self, config: OverlayConfig) -> OverlayResult<()> {
        // Validate everything up front so a rejected config leaves the
        // instance unchanged; the font swap below can still fail on bad
        // bytes, before any other field is touched.
        config.validate()?;
        let mut inner = self.lock();
        inner.set_font(config.font.clone())?;
        inner.set_dimensions(config.width, config.height)?;
        inner.set_margin(config.margin)?;
        inner.set_colors(config.bg, config.user_color, config.text_color);
        inner.set_timing(config.timing)?;
        Ok(())
    }

    /// Render the overlay at playback time `time` (seconds) and return the
    /// occupied height.
    #[tracing::instrument(skip(self))]
    pub fn render(&self, time: f64) -> OverlayResult<u32> {
        self.lock().render(time)
    }

    pub fn width(&self) -> u32 {
        self.lock().width()
    }

    pub fn height(&self) -> u32 {
        self.lock().height()
    }

    /// Bytes per surface row, or 0 before the first render.
    pub fn stride(&self) -> usize {
        self.lock().stride()
    }

    /// Occupied height reported by the last render.
    pub fn painted_height(&self) -> u32 {
        self.lock().painted_height()
    }

    /// Snapshot of the current surface pixels.
    pub fn frame(&self) -> Option<FrameRGBA> {
        self.lock().frame()
    }

    /// Copy the painted region into `dest` (see
    /// [`OverlayRenderer::copy_into`]).
    pub fn copy_into(
        &self,
        dest: &mut [u8],
        dest_stride: usize,
        order: ChannelOrder,
        clip: RectI,
    ) -> OverlayResult<()> {
        self.lock().copy_into(dest, dest_stride, order, clip)
    }
}
