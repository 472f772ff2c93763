//! Pixel-format adapter: clipped copy-out of the rendered surface into a
//! caller-provided buffer, converting channel order and flipping the
//! vertical origin (internal surface is top-down, destinations are
//! bottom-up).

use crate::error::{OverlayError, OverlayResult};

/// Destination channel layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChannelOrder {
    /// Same order as the internal surface; rows are copied as-is.
    Rgba8,
    /// Channels 0 and 2 swapped per pixel.
    Bgra8,
}

/// Integer pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RectI {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl RectI {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Intersection of two rectangles; may be empty.
    pub fn intersect(self, other: Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    pub fn is_empty(self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Copy the painted region of a rendered surface into `dest`.
///
/// `clip` is the requested render window, already intersected with the
/// destination image bounds by the caller; it is further intersected here
/// with the surface's painted rectangle `[0, width) x [0, painted_height)`.
/// The destination row `y` receives source row `painted_height - y - 1`
/// (vertical origin flip). Rows and columns of `dest` outside the
/// intersected rectangle are left untouched; the caller is expected to have
/// cleared them.
///
/// A destination too small for the intersected rectangle is rejected with
/// [`OverlayError::Aborted`] before any byte is written.
#[allow(clippy::too_many_arguments)]
pub fn copy_into(
    src: &[u8],
    src_stride: usize,
    src_width: u32,
    src_height: u32,
    painted_height: u32,
    dest: &mut [u8],
    dest_stride: usize,
    order: ChannelOrder,
    clip: RectI,
) -> OverlayResult<()> {
    // The progress-weighted height metric can exceed the surface extent;
    // never read rows that were not actually allocated.
    let painted = painted_height.min(src_height);
    let painted_rect = RectI::new(0, 0, src_width as i32, painted as i32);
    let rect = clip.intersect(painted_rect);
    if rect.is_empty() {
        return Ok(());
    }

    let (x0, y0, x1, y1) = (
        rect.x0 as usize,
        rect.y0 as usize,
        rect.x1 as usize,
        rect.y1 as usize,
    );
    let row_bytes = (x1 - x0) * 4;

    // Validate both buffers up front; partial writes are never acceptable.
    let dest_end = (y1 - 1) * dest_stride + x1 * 4;
    if dest_end > dest.len() {
        return Err(OverlayError::aborted(format!(
            "destination buffer too small: need {dest_end} bytes, have {}",
            dest.len()
        )));
    }
    let src_end = (painted as usize - 1 - y0) * src_stride + x1 * 4;
    if src_end > src.len() {
        return Err(OverlayError::aborted(
            "source surface smaller than its painted rectangle",
        ));
    }

    for y in y0..y1 {
        let src_row = painted as usize - y - 1;
        let src_ofs = src_row * src_stride + x0 * 4;
        let dst_ofs = y * dest_stride + x0 * 4;
        let src_px = &src[src_ofs..src_ofs + row_bytes];
        let dst_px = &mut dest[dst_ofs..dst_ofs + row_bytes];
        match order {
            ChannelOrder::Rgba8 => dst_px.copy_from_slice(src_px),
            ChannelOrder::Bgra8 => {
                for (d, s) in dst_px.chunks_exact_mut(4).zip(src_px.chunks_exact(4)) {
                    d[0] = s[2];
                    d[1] = s[1];
                    d[2] = s[0];
                    d[3] = s[3];
                }
            }
        }
    }

    Ok(())
}
