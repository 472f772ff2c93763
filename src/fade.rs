//! Three-phase message animation curve: linear fade-in, hold, linear
//! fade-out.

use crate::error::{OverlayError, OverlayResult};

/// Alpha below which a message is treated as fully transparent and skipped
/// (below visible precision for 8-bit output).
pub const MIN_VISIBLE_ALPHA: f64 = 1.0 / 255.0;

/// Durations of the three animation phases, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FadeTiming {
    /// Fade-in duration, > 0.
    pub fade_in: f64,
    /// Hold duration, >= 0.
    pub hold: f64,
    /// Fade-out duration, > 0.
    pub fade_out: f64,
}

/// Sampled curve state for one message at one query time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    /// Opacity. Capped at 1 from above; may go below zero past the end of
    /// the fade-out, which callers treat as invisible via
    /// [`MIN_VISIBLE_ALPHA`].
    pub alpha: f64,
    /// Fraction of the message's eventual height it currently contributes:
    /// equals `alpha` during fade-in, 1 afterwards.
    pub progress: f64,
}

impl Default for FadeTiming {
    fn default() -> Self {
        Self {
            fade_in: 1.0,
            hold: 15.0,
            fade_out: 1.0,
        }
    }
}

impl FadeTiming {
    /// Create a validated timing configuration.
    pub fn new(fade_in: f64, hold: f64, fade_out: f64) -> OverlayResult<Self> {
        let timing = Self {
            fade_in,
            hold,
            fade_out,
        };
        timing.validate()?;
        Ok(timing)
    }

    /// Check the phase durations. Fields are public (serde, literal
    /// construction), so consumers revalidate at the point of use; a zero
    /// fade duration would make [`Self::fade_at`] divide by zero.
    pub fn validate(self) -> OverlayResult<()> {
        if !self.fade_in.is_finite() || self.fade_in <= 0.0 {
            return Err(OverlayError::validation("fade_in must be finite and > 0"));
        }
        if !self.hold.is_finite() || self.hold < 0.0 {
            return Err(OverlayError::validation("hold must be finite and >= 0"));
        }
        if !self.fade_out.is_finite() || self.fade_out <= 0.0 {
            return Err(OverlayError::validation("fade_out must be finite and > 0"));
        }
        Ok(())
    }

    /// Total animation window: a message with timestamp `t0` is active for
    /// query times in `[t0, t0 + window]`.
    pub fn window(self) -> f64 {
        self.fade_in + self.hold + self.fade_out
    }

    /// Sample the curve for a message posted at `t0` at query time `t`.
    pub fn fade_at(self, t0: f64, t: f64) -> Fade {
        let t_hold = t0 + self.fade_in;
        let t_fade_out = t0 + self.fade_in + self.hold;

        if t < t_hold {
            let alpha = (t - t0) / self.fade_in;
            Fade {
                alpha,
                progress: alpha,
            }
        } else if t <= t_fade_out {
            Fade {
                alpha: 1.0,
                progress: 1.0,
            }
        } else {
            Fade {
                alpha: 1.0 - (t - t_fade_out) / self.fade_out,
                progress: 1.0,
            }
        }
    }
}
