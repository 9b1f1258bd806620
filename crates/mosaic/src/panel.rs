//! Terminal output: two pixel rows per text row using half blocks.

use mosaic_core::{Frame, Rgba};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: &str = "▀";

/// Draws a [`Frame`] centred in the area, one cell per pixel column and two
/// pixel rows per cell.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    frame: &'a Frame,
}

impl<'a> PanelView<'a> {
    pub fn new(frame: &'a Frame) -> Self {
        Self { frame }
    }

    /// Terminal cells needed to show the whole frame.
    pub fn size(&self) -> (u16, u16) {
        let (w, h) = self.frame.dimensions();
        (
            w.min(u16::MAX as u32) as u16,
            h.div_ceil(2).min(u16::MAX as u32) as u16,
        )
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let (width, height) = self.frame.dimensions();
        (0..height.div_ceil(2))
            .map(|row| {
                let spans: Vec<Span> = (0..width)
                    .map(|x| {
                        let top = self.frame.pixel(x, row * 2);
                        let bottom = self.frame.pixel(x, row * 2 + 1);
                        Span::styled(
                            HALF_BLOCK,
                            Style::new().fg(to_color(top)).bg(to_color(bottom)),
                        )
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn to_color(px: Rgba<u8>) -> Color {
    let [r, g, b, _] = px.0;
    Color::Rgb(r, g, b)
}

impl Widget for PanelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (w, h) = self.size();
        let x = area.x + area.width.saturating_sub(w) / 2;
        let y = area.y + area.height.saturating_sub(h) / 2;
        let target = Rect::new(x, y, w.min(area.width), h.min(area.height)).intersection(area);
        Paragraph::new(self.lines()).render(target, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_blocks_pair_rows() {
        let frame = Frame::from_fn(2, 3, |x, y| Rgba([x as u8 * 100, y as u8 * 50, 0, 255]));
        let view = PanelView::new(&frame);
        assert_eq!(view.size(), (2, 2));

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);

        let cell = &buf[(1, 0)];
        assert_eq!(cell.symbol(), HALF_BLOCK);
        assert_eq!(cell.fg, Color::Rgb(100, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(100, 50, 0));

        // Odd height: the last row's lower half reads as transparent black.
        let last = &buf[(0, 1)];
        assert_eq!(last.fg, Color::Rgb(0, 100, 0));
        assert_eq!(last.bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_centred_in_larger_area() {
        let frame = Frame::solid(2, 2, Rgba([255, 0, 0, 255]));
        let area = Rect::new(0, 0, 6, 3);
        let mut buf = Buffer::empty(area);
        PanelView::new(&frame).render(area, &mut buf);
        assert_eq!(buf[(2, 1)].fg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }
}
