//! Date card.

use chrono::{DateTime, Local};
use mosaic_compose::{ComposeError, Composer};
use mosaic_core::{Align, Anchor, Corners, Frame, Rgba, composite_at, rounded_rect, vstack};
use mosaic_fonts::{GLYPH_HEIGHT, text_frame};

use super::card_fill;

const LINE_GAP: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateState {
    pub weekday: String,
    pub day_month: String,
    pub color: Rgba<u8>,
    pub size: (u32, u32),
}

impl DateState {
    pub fn new(now: &DateTime<Local>, color: Rgba<u8>, size: (u32, u32)) -> Self {
        Self {
            weekday: now.format("%A").to_string().to_uppercase(),
            day_month: now.format("%-d %b %Y").to_string().to_uppercase(),
            color,
            size,
        }
    }
}

pub fn compose(state: &DateState) -> Result<Option<Frame>, ComposeError> {
    let (width, height) = state.size;
    if height < 2 * GLYPH_HEIGHT + LINE_GAP + 2 {
        return Err(ComposeError::invalid(format!("date card {width}x{height} is too small")));
    }

    let text = vstack(
        [
            text_frame(&state.weekday, state.color),
            text_frame(&state.day_month, state.color),
        ]
        .iter(),
        LINE_GAP,
        Align::Center,
    );
    let card = rounded_rect(width, height, Corners::all(3), card_fill(), 1, state.color);
    Ok(Some(composite_at(&text, &card, Anchor::Center, 0, 0, false)))
}

pub fn composer() -> Composer<DateState> {
    Composer::new("date", compose)
}
