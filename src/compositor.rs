//! The stacked-layout compositor: turns a playback time into pixels.
//!
//! Active messages are drawn oldest-first from the top, each as a rounded
//! bubble sized to its shaped text, with the fade curve's alpha baked into
//! every paint color. The returned occupied height is the progress-weighted
//! sum of bubble advances, so a message still fading in contributes
//! proportionally to the space it will eventually take.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use kurbo::Shape;

use crate::chatlog::{ChatEntry, MessageStore};
use crate::color::{Rgb, Rgba};
use crate::copy_out::{self, ChannelOrder, RectI};
use crate::error::{OverlayError, OverlayResult};
use crate::fade::{FadeTiming, MIN_VISIBLE_ALPHA};
use crate::surface::SurfaceManager;
use crate::text::TextLayoutEngine;

/// Font used for message text: raw font-file bytes plus the pixel size.
///
/// The host boundary is expected to resolve a family name to a concrete
/// font file; the engine only ever consumes bytes.
#[derive(Clone)]
pub struct FontSpec {
    /// Raw TTF/OTF bytes.
    pub bytes: Arc<Vec<u8>>,
    /// Font size in pixels.
    pub size_px: f32,
}

impl FontSpec {
    /// Wrap in-memory font bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, size_px: f32) -> OverlayResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(OverlayError::validation(
                "font size_px must be finite and > 0",
            ));
        }
        Ok(Self {
            bytes: Arc::new(bytes.into()),
            size_px,
        })
    }

    /// Read a font file from disk.
    pub fn from_path(path: impl AsRef<Path>, size_px: f32) -> OverlayResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font file '{}'", path.display()))?;
        Self::from_bytes(bytes, size_px)
    }
}

impl std::fmt::Debug for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSpec")
            .field("bytes_len", &self.bytes.len())
            .field("size_px", &self.size_px)
            .finish()
    }
}

/// Full overlay configuration, applied atomically via
/// [`OverlayRenderer::new`] or [`crate::ChatOverlay::apply_config`].
///
/// Defaults: 640x360, margin 10, translucent grey bubbles, dark red user
/// names, black text, 1s/15s/1s timing.
#[derive(Clone, Debug)]
pub struct OverlayConfig {
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub bg: Rgba,
    pub user_color: Rgb,
    pub text_color: Rgb,
    pub timing: FadeTiming,
    pub font: FontSpec,
}

impl OverlayConfig {
    /// Default configuration around the given font.
    pub fn new(font: FontSpec) -> Self {
        Self {
            width: 640,
            height: 360,
            margin: 10,
            bg: Rgba {
                r: 0.5,
                g: 0.5,
                b: 0.5,
                a: 0.5,
            },
            user_color: Rgb {
                r: 0.628,
                g: 0.0,
                b: 0.0,
            },
            text_color: Rgb {
                r: 0.0,
                g: 0.0,
                b: 0.0,
            },
            timing: FadeTiming::default(),
            font,
        }
    }

    pub(crate) fn validate(&self) -> OverlayResult<()> {
        check_dimensions(self.width, self.height)?;
        check_margin(self.margin)?;
        self.timing.validate()?;
        Ok(())
    }
}

fn check_dimensions(width: u32, height: u32) -> OverlayResult<()> {
    if width == 0 || height == 0 {
        return Err(OverlayError::validation("dimensions must be > 0"));
    }
    if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
        return Err(OverlayError::validation(
            "dimensions exceed raster backend limit",
        ));
    }
    Ok(())
}

fn check_margin(margin: u32) -> OverlayResult<()> {
    if margin == 0 {
        return Err(OverlayError::validation("margin must be > 0"));
    }
    Ok(())
}

/// Rounded-rectangle bubble outline, flattened for the raster backend.
fn bubble_path(width: f64, height: f64, radius: f64) -> vello_cpu::kurbo::BezPath {
    let rr = kurbo::RoundedRect::new(0.0, 0.0, width, height, radius);
    let mut path = vello_cpu::kurbo::BezPath::new();
    for el in rr.path_elements(0.1) {
        path.push(el);
    }
    path
}

/// A rendered frame snapshot as premultiplied RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major, top-down.
    pub data: Vec<u8>,
    /// Always premultiplied alpha.
    pub premultiplied: bool,
}

/// Message store, configuration and surface for one overlay instance.
///
/// Not internally synchronized; [`crate::ChatOverlay`] adds the per-instance
/// lock for hosts that render from multiple worker threads.
pub struct OverlayRenderer {
    store: MessageStore,
    timing: FadeTiming,
    width: u32,
    height: u32,
    margin: u32,
    bg: Rgba,
    user_color: Rgb,
    text_color: Rgb,
    font_size: f32,
    engine: TextLayoutEngine,
    surfaces: SurfaceManager,
    painted_height: u32,
}

impl OverlayRenderer {
    /// Build a renderer from a validated configuration.
    pub fn new(config: OverlayConfig) -> OverlayResult<Self> {
        config.validate()?;
        let engine = TextLayoutEngine::new(config.font.bytes.clone())?;
        Ok(Self {
            store: MessageStore::new(),
            timing: config.timing,
            width: config.width,
            height: config.height,
            margin: config.margin,
            bg: config.bg,
            user_color: config.user_color,
            text_color: config.text_color,
            font_size: config.font.size_px,
            engine,
            surfaces: SurfaceManager::default(),
            painted_height: 0,
        })
    }

    /// Replace the message store contents.
    pub fn set_messages(&mut self, entries: Vec<ChatEntry>) {
        self.store.replace_all(entries);
    }

    /// Number of messages currently in the store.
    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// Set the render target size. A change releases the surface; it is
    /// recreated on the next render.
    pub fn set_dimensions(&mut self, width: u32, height: u32) -> OverlayResult<()> {
        check_dimensions(width, height)?;
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.surfaces.invalidate();
        }
        Ok(())
    }

    /// Set the layout margin in pixels. A change releases the surface.
    pub fn set_margin(&mut self, margin: u32) -> OverlayResult<()> {
        check_margin(margin)?;
        if self.margin != margin {
            self.margin = margin;
            self.surfaces.invalidate();
        }
        Ok(())
    }

    /// Set bubble, user-name and body-text colors. Does not touch the
    /// surface.
    pub fn set_colors(&mut self, bg: Rgba, user: Rgb, text: Rgb) {
        self.bg = bg;
        self.user_color = user;
        self.text_color = text;
    }

    /// Set the animation timing; affects subsequent queries only. The
    /// durations are checked even for literally-constructed values.
    pub fn set_timing(&mut self, timing: FadeTiming) -> OverlayResult<()> {
        timing.validate()?;
        self.timing = timing;
        Ok(())
    }

    /// Swap the font. Rebuilds the text engine and releases the surface.
    pub fn set_font(&mut self, font: FontSpec) -> OverlayResult<()> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(OverlayError::validation(
                "font size_px must be finite and > 0",
            ));
        }
        self.engine = TextLayoutEngine::new(font.bytes.clone())?;
        self.font_size = font.size_px;
        self.surfaces.invalidate();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Bytes per row of the current surface, or 0 before the first render.
    pub fn stride(&self) -> usize {
        self.surfaces.current().map_or(0, |s| s.stride())
    }

    /// Occupied height reported by the last render.
    pub fn painted_height(&self) -> u32 {
        self.painted_height
    }

    /// Snapshot of the current surface pixels, if a surface exists.
    pub fn frame(&self) -> Option<FrameRGBA> {
        let s = self.surfaces.current()?;
        Some(FrameRGBA {
            width: s.width(),
            height: s.height(),
            data: s.data().to_vec(),
            premultiplied: true,
        })
    }

    /// Render the overlay for playback time `time` (seconds).
    ///
    /// Returns the occupied height: the progress-weighted sum of bubble
    /// advances, rounded. Returns 0 without touching the surface when no
    /// message is active.
    pub fn render(&mut self, time: f64) -> OverlayResult<u32> {
        let Self {
            store,
            timing,
            width,
            height,
            margin,
            bg,
            user_color,
            text_color,
            font_size,
            engine,
            surfaces,
            painted_height,
        } = self;

        let active = store.query_active(time, timing.window());
        if active.is_empty() {
            *painted_height = 0;
            return Ok(0);
        }

        let surface = surfaces.ensure(*width, *height)?;

        let margin_f = f64::from(*margin);
        let wrap_width = (i64::from(*width) - 2 * i64::from(*margin)).max(1) as f32;

        let mut cursor_y = 0.0f64;
        let mut total = 0.0f64;

        surface.draw(|ctx| {
            for msg in active {
                let fade = timing.fade_at(msg.time, time);
                if fade.alpha <= MIN_VISIBLE_ALPHA {
                    continue;
                }
                let alpha = fade.alpha.min(1.0) as f32;

                let shaped = engine.layout_message(
                    &msg.user,
                    &msg.text,
                    user_color.to_rgba8(alpha).into(),
                    text_color.to_rgba8(alpha).into(),
                    *font_size,
                    wrap_width,
                );

                // Bubble behind the text, corners at 1.5x margin radius.
                let bubble_w = f64::from(shaped.width) + 2.0 * margin_f;
                let bubble_h = f64::from(shaped.height) + 2.0 * margin_f;
                let [r, g, b, a] = bg.to_rgba8_scaled(alpha);
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((margin_f, cursor_y)));
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
                ctx.fill_path(&bubble_path(bubble_w, bubble_h, 1.5 * margin_f));

                // Glyphs inset by one margin inside the bubble.
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                    margin_f * 2.0,
                    cursor_y + margin_f,
                )));
                for line in shaped.layout.lines() {
                    for item in line.items() {
                        let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                            continue;
                        };
                        let brush = run.style().brush;
                        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                            brush.r, brush.g, brush.b, brush.a,
                        ));
                        let glyphs = run.glyphs().map(|glyph| vello_cpu::Glyph {
                            id: glyph.id,
                            x: glyph.x,
                            y: glyph.y,
                        });
                        ctx.glyph_run(engine.font())
                            .font_size(run.run().font_size())
                            .fill_glyphs(glyphs);
                    }
                }

                let advance = f64::from(shaped.height) + 3.0 * margin_f;
                cursor_y += advance;
                total += fade.progress * advance;
            }
            Ok(())
        })?;

        *painted_height = total.round().max(0.0) as u32;
        Ok(*painted_height)
    }

    /// Copy the painted region into a caller-provided buffer.
    ///
    /// `clip` must already be intersected with the destination bounds; it is
    /// further intersected with the painted rectangle. Before the first
    /// render (or after one that painted nothing) this is a no-op.
    pub fn copy_into(
        &self,
        dest: &mut [u8],
        dest_stride: usize,
        order: ChannelOrder,
        clip: RectI,
    ) -> OverlayResult<()> {
        let Some(surface) = self.surfaces.current() else {
            return Ok(());
        };
        if self.painted_height == 0 {
            return Ok(());
        }
        copy_out::copy_into(
            surface.data(),
            surface.stride(),
            surface.width(),
            surface.height(),
            self.painted_height,
            dest,
            dest_stride,
            order,
            clip,
        )
    }
}
