//! Scrolling text along the bottom of the panel.

use mosaic_compose::{ComposeError, Composer};
use mosaic_core::{Frame, Rgba};
use mosaic_fonts::text_frame;
use mosaic_motion::Scroller;

/// Blank text appended so the end of the message does not run into its
/// start when it wraps.
const TAIL: &str = "   ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarqueeState {
    pub text: String,
    pub color: Rgba<u8>,
}

pub fn compose(state: &MarqueeState) -> Result<Option<Frame>, ComposeError> {
    if state.text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(text_frame(&format!("{}{TAIL}", state.text), state.color)))
}

pub fn composer() -> Composer<MarqueeState> {
    Composer::new("marquee", compose)
}

/// The scroller that reveals the marquee, free-running with a rest at each
/// wrap.
pub fn scroller(name: &str, width: u32, delta: u32, speed: f64, pause: f64) -> Scroller {
    Scroller::horizontal(name, width)
        .with_delta(delta)
        .with_speed(speed)
        .with_pause_at_loop(pause > 0.0)
        .with_pause_duration(pause)
}
