//! System load card.

use mosaic_compose::{ComposeError, Composer};
use mosaic_core::{
    Align, Anchor, Corners, Frame, Rgba, composite_at, hstack, resource_to_color, rounded_rect,
    vstack,
};
use mosaic_fonts::{GLYPH_HEIGHT, text_frame};

use super::card_fill;
use crate::system_metrics::SystemLoad;

const BAR_HEIGHT: u32 = 3;
const ROW_GAP: u32 = 2;
const TRACK: Rgba<u8> = Rgba([40, 44, 56, 255]);

/// Columns taken by everything in a row except the bar.
const ROW_CHROME: u32 = 36;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemState {
    /// `None` until the monitor has taken its first sample.
    pub load: Option<SystemLoad>,
    pub color: Rgba<u8>,
    pub size: (u32, u32),
}

/// Horizontal gauge filled to `percent`.
fn bar(width: u32, percent: u8) -> Frame {
    let fraction = percent.min(100) as f32 / 100.0;
    let filled = (width as f32 * fraction).round() as u32;
    let track = Frame::solid(width, BAR_HEIGHT, TRACK);
    if filled == 0 {
        return track;
    }
    track.overlay(&Frame::solid(filled, BAR_HEIGHT, resource_to_color(fraction)), 0, 0)
}

fn row(label: &str, percent: u8, bar_width: u32, color: Rgba<u8>) -> Frame {
    hstack(
        [
            &text_frame(label, color),
            &bar(bar_width, percent),
            &text_frame(&format!("{percent}%"), color),
        ],
        ROW_GAP,
        Align::Center,
    )
}

pub fn compose(state: &SystemState) -> Result<Option<Frame>, ComposeError> {
    let Some(load) = state.load else {
        return Ok(None);
    };
    let (width, height) = state.size;
    if height < 2 * GLYPH_HEIGHT + ROW_GAP + 2 {
        return Err(ComposeError::invalid(format!("load card {width}x{height} is too small")));
    }

    let bar_width = width.saturating_sub(ROW_CHROME).max(4);
    let rows = vstack(
        [
            &row("CPU", load.cpu, bar_width, state.color),
            &row("MEM", load.memory, bar_width, state.color),
        ],
        ROW_GAP,
        Align::Start,
    );
    let card = rounded_rect(width, height, Corners::all(3), card_fill(), 1, state.color);
    Ok(Some(composite_at(&rows, &card, Anchor::Center, 0, 0, false)))
}

pub fn composer() -> Composer<SystemState> {
    Composer::new("system", compose)
}
