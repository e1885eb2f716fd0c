//! Cosmetic visible overlay.
//!
//! Stamps a translucent text marker onto the pixels at a chosen anchor.
//! Purely presentational: the verifier never reads it, and it sits on top of
//! the invisible fingerprint without disturbing it beyond ordinary pixel
//! edits. Characters render as simple filled cells rather than shaped
//! glyphs.

use crate::pixels::{PixelBuffer, CHANNELS};

const CELL_WIDTH: usize = 8;
const CELL_HEIGHT: usize = 14;
const CELL_GAP: usize = 2;
const MARGIN: usize = 10;

/// Where the overlay sits on the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayAnchor {
    TopLeft,
    TopRight,
    Center,
    BottomLeft,
    #[default]
    BottomRight,
}

impl OverlayAnchor {
    fn position(
        &self,
        frame_width: usize,
        frame_height: usize,
        overlay_width: usize,
        overlay_height: usize,
    ) -> (i64, i64) {
        let fw = frame_width as i64;
        let fh = frame_height as i64;
        let ow = overlay_width as i64;
        let oh = overlay_height as i64;
        let margin = MARGIN as i64;

        match self {
            OverlayAnchor::TopLeft => (margin, margin),
            OverlayAnchor::TopRight => (fw - ow - margin, margin),
            OverlayAnchor::Center => ((fw - ow) / 2, (fh - oh) / 2),
            OverlayAnchor::BottomLeft => (margin, fh - oh - margin),
            OverlayAnchor::BottomRight => (fw - ow - margin, fh - oh - margin),
        }
    }
}

/// A translucent text stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleOverlay {
    pub text: String,
    pub anchor: OverlayAnchor,
    /// Blend factor in `[0, 1]`; 0 leaves the image untouched.
    pub opacity: f32,
}

impl VisibleOverlay {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor: OverlayAnchor::default(),
            opacity: 0.35,
        }
    }
}

/// Blend the overlay into the color channels. Alpha bytes stay untouched.
pub fn stamp(pixels: &mut PixelBuffer, overlay: &VisibleOverlay) {
    let opacity = overlay.opacity.clamp(0.0, 1.0);
    let glyphs = overlay.text.chars().filter(|c| !c.is_control()).count();
    if opacity == 0.0 || glyphs == 0 {
        return;
    }

    let width = pixels.width() as usize;
    let height = pixels.height() as usize;
    let overlay_width = glyphs * CELL_WIDTH + glyphs.saturating_sub(1) * CELL_GAP;
    let (x0, y0) = overlay
        .anchor
        .position(width, height, overlay_width, CELL_HEIGHT);

    let data = pixels.data_mut();
    for glyph in 0..glyphs {
        let gx = x0 + (glyph * (CELL_WIDTH + CELL_GAP)) as i64;
        for dy in 0..CELL_HEIGHT as i64 {
            for dx in 0..CELL_WIDTH as i64 {
                let px = gx + dx;
                let py = y0 + dy;
                if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                    continue;
                }
                let at = (py as usize * width + px as usize) * CHANNELS;
                for channel in &mut data[at..at + 3] {
                    let blended =
                        (1.0 - opacity) * *channel as f32 + opacity * 255.0;
                    *channel = blended.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    }
}
