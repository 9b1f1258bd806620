//! The panel's screens and where they sit.

pub mod clock;
pub mod date;
pub mod marquee;
pub mod system;

use mosaic_core::Rgba;
use mosaic_fonts::{GLYPH_HEIGHT, LARGE_HEIGHT};

/// Rows above the clock.
const CLOCK_TOP: u32 = 1;

/// Rows between regions.
const REGION_GAP: u32 = 2;

/// Background of the cards in the carousel.
pub fn card_fill() -> Rgba<u8> {
    Rgba([12, 14, 22, 255])
}

/// Vertical regions of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub width: u32,
    pub height: u32,
    pub clock_y: u32,
    pub cards_y: u32,
    pub cards_height: u32,
    pub marquee_y: u32,
}

impl PanelLayout {
    pub fn new(width: u32, height: u32) -> Self {
        let clock_y = CLOCK_TOP;
        let cards_y = clock_y + LARGE_HEIGHT + REGION_GAP;
        let marquee_y = height.saturating_sub(GLYPH_HEIGHT + 1);
        let cards_height = marquee_y.saturating_sub(cards_y + 1).max(1);
        Self {
            width,
            height,
            clock_y,
            cards_y,
            cards_height,
            marquee_y,
        }
    }

    /// Size every card is drawn at.
    pub fn card_size(&self) -> (u32, u32) {
        (self.width, self.cards_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_panel_regions_do_not_overlap() {
        let layout = PanelLayout::new(64, 32);
        assert_eq!(layout.clock_y + LARGE_HEIGHT, 8);
        assert_eq!(layout.cards_y, 10);
        assert_eq!(layout.marquee_y, 26);
        assert!(layout.cards_y + layout.cards_height < layout.marquee_y);
        assert_eq!(layout.card_size(), (64, 15));
    }
}
