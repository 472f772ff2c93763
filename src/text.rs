//! Parley-backed text shaping for chat messages.
//!
//! A message is shaped as a single `[user] body` paragraph: the bracketed
//! user prefix bold in the user brush, the body in the body brush. The
//! engine owns the Parley contexts and the font registered from raw bytes;
//! the same bytes back the `FontData` used when painting glyph runs.

use std::sync::Arc;

use crate::error::{OverlayError, OverlayResult};

/// RGBA8 brush color carried through Parley layout styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MessageBrush {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<[u8; 4]> for MessageBrush {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// A shaped message ready for painting, with its measured pixel extent.
pub struct ShapedMessage {
    /// Fully built layout; glyph run brushes carry the span colors.
    pub layout: parley::Layout<MessageBrush>,
    /// Measured width in pixels, rounded up.
    pub width: u32,
    /// Measured height in pixels, rounded up.
    pub height: u32,
}

/// Stateful text layout engine wrapping Parley's font and layout contexts.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<MessageBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl TextLayoutEngine {
    /// Build an engine around one font, registered from raw bytes.
    pub fn new(font_bytes: Arc<Vec<u8>>) -> OverlayResult<Self> {
        let mut font_ctx = parley::FontContext::default();

        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.as_ref().clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            OverlayError::validation("no font families registered from font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| OverlayError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.as_ref().clone()),
            0,
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    /// Resolved family name of the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Font used to paint glyph runs produced by this engine.
    pub fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `[user] body` at `size_px`, wrapped to `max_width` pixels.
    ///
    /// Word wrapping falls back to breaking inside words so an unbroken
    /// token can never exceed the wrap width. Left aligned.
    pub fn layout_message(
        &mut self,
        user: &str,
        body: &str,
        user_brush: MessageBrush,
        body_brush: MessageBrush,
        size_px: f32,
        max_width: f32,
    ) -> ShapedMessage {
        let prefix = format!("[{user}]");
        let text = format!("{prefix} {body}");

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, &text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(body_brush));
        builder.push_default(parley::style::StyleProperty::OverflowWrap(
            parley::style::OverflowWrap::Anywhere,
        ));
        builder.push(
            parley::style::StyleProperty::FontWeight(parley::style::FontWeight::BOLD),
            0..prefix.len(),
        );
        builder.push(
            parley::style::StyleProperty::Brush(user_brush),
            0..prefix.len(),
        );

        let mut layout: parley::Layout<MessageBrush> = builder.build(&text);
        layout.break_all_lines(Some(max_width));
        layout.align(
            Some(max_width),
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );

        let width = layout.width().ceil().max(0.0) as u32;
        let height = layout.height().ceil().max(0.0) as u32;
        ShapedMessage {
            layout,
            width,
            height,
        }
    }
}
