//! Surface lifecycle: the premultiplied RGBA8 pixmap and its render
//! context, lazily (re)created when dimensions change and cleared between
//! renders.

use crate::error::{OverlayError, OverlayResult};

/// Pixel surface plus the `vello_cpu` context that draws into it.
pub(crate) struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: vello_cpu::RenderContext,
}

impl Surface {
    /// Width in pixels.
    pub(crate) fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub(crate) fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Bytes per pixel row. The pixmap is tightly packed.
    pub(crate) fn stride(&self) -> usize {
        usize::from(self.width) * 4
    }

    /// Raw premultiplied RGBA8 bytes, row-major, top-down.
    pub(crate) fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Run a draw pass: `f` issues context calls, then the scene is flushed
    /// and committed into the pixmap.
    pub(crate) fn draw(
        &mut self,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> OverlayResult<()>,
    ) -> OverlayResult<()> {
        self.ctx.reset();
        f(&mut self.ctx)?;
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut self.pixmap);
        Ok(())
    }
}

/// Owns the lazily-created [`Surface`].
#[derive(Default)]
pub(crate) struct SurfaceManager {
    slot: Option<Surface>,
}

impl SurfaceManager {
    /// Get a surface matching `width x height`, allocating on first use and
    /// clearing to transparent on reuse. A dimension mismatch (stale surface
    /// that [`Self::invalidate`] should have dropped) reallocates.
    pub(crate) fn ensure(&mut self, width: u32, height: u32) -> OverlayResult<&mut Surface> {
        let w: u16 = width
            .try_into()
            .map_err(|_| OverlayError::resource("surface width exceeds backend limit"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| OverlayError::resource("surface height exceeds backend limit"))?;
        if w == 0 || h == 0 {
            return Err(OverlayError::resource("surface dimensions must be > 0"));
        }

        match &mut self.slot {
            Some(s) if s.width == w && s.height == h => {
                s.pixmap.data_as_u8_slice_mut().fill(0);
            }
            _ => {
                tracing::debug!(width, height, "allocating overlay surface");
                self.slot = Some(Surface {
                    width: w,
                    height: h,
                    pixmap: vello_cpu::Pixmap::new(w, h),
                    ctx: vello_cpu::RenderContext::new(w, h),
                });
            }
        }

        Ok(self.slot.as_mut().expect("slot populated above"))
    }

    /// Release the surface and context; the next render recreates them.
    pub(crate) fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Current surface, if one has been created and not invalidated.
    pub(crate) fn current(&self) -> Option<&Surface> {
        self.slot.as_ref()
    }
}
