//! Boxed backgrounds: padding, margin, rounded corners and borders.

use std::collections::HashMap;
use std::sync::LazyLock;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;

use crate::frame::{Frame, Tag};

/// Rounded shapes are rasterised at this multiple of the target size.
const SUPERSAMPLE: u32 = 3;

/// Shape cache is cleared once it holds this many entries.
const SHAPE_CACHE_LIMIT: usize = 256;

/// Per-side spacing in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Edges {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Edges {
    pub fn all(n: u32) -> Self {
        Self {
            top: n,
            right: n,
            bottom: n,
            left: n,
        }
    }

    pub fn symmetric(vertical: u32, horizontal: u32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    fn vertical(&self) -> u32 {
        self.top + self.bottom
    }
}

/// Per-corner radius in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Corners {
    pub top_left: u32,
    pub top_right: u32,
    pub bottom_right: u32,
    pub bottom_left: u32,
}

impl Corners {
    pub fn all(r: u32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    fn is_square(&self) -> bool {
        *self == Corners::default()
    }

    fn shrink(&self, by: u32) -> Self {
        Self {
            top_left: self.top_left.saturating_sub(by),
            top_right: self.top_right.saturating_sub(by),
            bottom_right: self.bottom_right.saturating_sub(by),
            bottom_left: self.bottom_left.saturating_sub(by),
        }
    }

    fn scale(&self, k: u32) -> Self {
        Self {
            top_left: self.top_left * k,
            top_right: self.top_right * k,
            bottom_right: self.bottom_right * k,
            bottom_left: self.bottom_left * k,
        }
    }
}

/// Styling for [`div`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DivStyle {
    /// Space between the content and the border.
    pub padding: Edges,
    /// Transparent space outside the box.
    pub margin: Edges,
    pub radius: Corners,
    pub background: Option<Rgba<u8>>,
    /// Border width in pixels, drawn inside the box.
    pub border: u32,
    pub border_color: Rgba<u8>,
    /// Mask the content with the rounded box shape.
    pub clip: bool,
}

impl Default for DivStyle {
    fn default() -> Self {
        Self {
            padding: Edges::default(),
            margin: Edges::default(),
            radius: Corners::default(),
            background: None,
            border: 0,
            border_color: Rgba([255, 255, 255, 255]),
            clip: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ShapeKey {
    width: u32,
    height: u32,
    radius: Corners,
    fill: [u8; 4],
    border: u32,
    border_color: [u8; 4],
}

static SHAPE_CACHE: LazyLock<Mutex<HashMap<ShapeKey, Frame>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Rasterise an antialiased rounded rectangle.
///
/// The result is a pure function of its arguments and is memoised, so
/// repeated calls with identical styling share one allocation.
pub fn rounded_rect(
    width: u32,
    height: u32,
    radius: Corners,
    fill: Rgba<u8>,
    border: u32,
    border_color: Rgba<u8>,
) -> Frame {
    let key = ShapeKey {
        width: width.max(1),
        height: height.max(1),
        radius,
        fill: fill.0,
        border,
        border_color: border_color.0,
    };

    if let Some(frame) = SHAPE_CACHE.lock().get(&key) {
        return frame.clone();
    }

    let frame = rasterize(&key);
    let mut cache = SHAPE_CACHE.lock();
    if cache.len() >= SHAPE_CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(key, frame.clone());
    frame
}

fn rasterize(key: &ShapeKey) -> Frame {
    let tag = Tag::derive(("rounded_rect", key));
    let fill = Rgba(key.fill);
    let border_color = Rgba(key.border_color);

    // Square corners need no antialiasing.
    if key.radius.is_square() {
        let image = RgbaImage::from_fn(key.width, key.height, |x, y| {
            let edge = x < key.border
                || y < key.border
                || x + key.border >= key.width
                || y + key.border >= key.height;
            if edge { border_color } else { fill }
        });
        return Frame::with_tag(image, tag);
    }

    let (w, h) = (key.width * SUPERSAMPLE, key.height * SUPERSAMPLE);
    let outer = key.radius.scale(SUPERSAMPLE);
    let inset = key.border * SUPERSAMPLE;
    let inner = outer.shrink(inset);
    let hires = RgbaImage::from_fn(w, h, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        if !inside_rounded(px, py, 0.0, 0.0, w as f32, h as f32, &outer) {
            return Rgba([0, 0, 0, 0]);
        }
        let i = inset as f32;
        if inset > 0 && !inside_rounded(px, py, i, i, w as f32 - i, h as f32 - i, &inner) {
            border_color
        } else {
            fill
        }
    });
    let image = imageops::resize(&hires, key.width, key.height, FilterType::Lanczos3);
    Frame::with_tag(image, tag)
}

/// Point-in-rounded-rectangle test for the box `[x0, x1) × [y0, y1)`.
fn inside_rounded(px: f32, py: f32, x0: f32, y0: f32, x1: f32, y1: f32, r: &Corners) -> bool {
    if px < x0 || py < y0 || px >= x1 || py >= y1 {
        return false;
    }
    let corner = |cx: f32, cy: f32, radius: u32| {
        let radius = radius as f32;
        let (dx, dy) = (px - cx, py - cy);
        dx * dx + dy * dy <= radius * radius
    };
    let (tl, tr, br, bl) = (
        r.top_left as f32,
        r.top_right as f32,
        r.bottom_right as f32,
        r.bottom_left as f32,
    );
    if px < x0 + tl && py < y0 + tl {
        return corner(x0 + tl, y0 + tl, r.top_left);
    }
    if px > x1 - tr && py < y0 + tr {
        return corner(x1 - tr, y0 + tr, r.top_right);
    }
    if px > x1 - br && py > y1 - br {
        return corner(x1 - br, y1 - br, r.bottom_right);
    }
    if px < x0 + bl && py > y1 - bl {
        return corner(x0 + bl, y1 - bl, r.bottom_left);
    }
    true
}

/// Wrap `frame` in a padded, optionally rounded and bordered box.
pub fn div(frame: &Frame, style: &DivStyle) -> Frame {
    let box_w = frame.width() + style.padding.horizontal() + style.border * 2;
    let box_h = frame.height() + style.padding.vertical() + style.border * 2;
    let fill = style.background.unwrap_or(Rgba([0, 0, 0, 0]));
    let shape = rounded_rect(
        box_w,
        box_h,
        style.radius,
        fill,
        style.border,
        style.border_color,
    );

    let cx = style.border + style.padding.left;
    let cy = style.border + style.padding.top;

    let mut boxed = shape.image().clone();
    if style.clip {
        // Coverage of the box without its colours, for masking.
        let mask = rounded_rect(
            box_w,
            box_h,
            style.radius,
            Rgba([255, 255, 255, 255]),
            0,
            Rgba([255, 255, 255, 255]),
        );
        let clipped = RgbaImage::from_fn(frame.width(), frame.height(), |x, y| {
            let mut px = frame.pixel(x, y);
            let coverage = mask.pixel(x + cx, y + cy).0[3] as u32;
            px.0[3] = (px.0[3] as u32 * coverage / 255) as u8;
            px
        });
        imageops::overlay(&mut boxed, &clipped, cx as i64, cy as i64);
    } else {
        imageops::overlay(&mut boxed, frame.image(), cx as i64, cy as i64);
    }

    let mut out = RgbaImage::new(
        box_w + style.margin.horizontal(),
        box_h + style.margin.vertical(),
    );
    imageops::replace(&mut out, &boxed, style.margin.left as i64, style.margin.top as i64);
    Frame::with_tag(out, Tag::derive(("div", frame.tag(), style)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn test_rounded_rect_is_memoized() {
        let a = rounded_rect(17, 9, Corners::all(3), RED, 1, WHITE);
        let b = rounded_rect(17, 9, Corners::all(3), RED, 1, WHITE);
        assert_eq!(a, b);
        assert!(a.shares_pixels(&b));
    }

    #[test]
    fn test_rounded_rect_corners_are_antialiased() {
        let f = rounded_rect(12, 12, Corners::all(4), RED, 0, WHITE);
        assert_eq!(f.dimensions(), (12, 12));
        assert!(f.pixel(0, 0).0[3] < 128, "corner mostly cut away");
        assert!(f.pixel(6, 6).0[3] >= 250, "interior fully covered");
    }

    #[test]
    fn test_square_border() {
        let f = rounded_rect(4, 4, Corners::default(), RED, 1, WHITE);
        assert_eq!(f.pixel(0, 0), WHITE);
        assert_eq!(f.pixel(1, 1), RED);
    }

    #[test]
    fn test_div_geometry() {
        let content = Frame::solid(4, 2, RED);
        let style = DivStyle {
            padding: Edges::all(1),
            margin: Edges::symmetric(0, 2),
            background: Some(Rgba([0, 0, 0, 255])),
            ..DivStyle::default()
        };
        let out = div(&content, &style);
        assert_eq!(out.dimensions(), (4 + 2 + 4, 2 + 2));
        assert_eq!(out.pixel(0, 0).0[3], 0, "margin is transparent");
        assert_eq!(out.pixel(2, 0), Rgba([0, 0, 0, 255]), "padding shows background");
        assert_eq!(out.pixel(3, 1), RED);
    }

    #[test]
    fn test_div_clip_masks_corners() {
        let content = Frame::solid(12, 12, RED);
        let style = DivStyle {
            radius: Corners::all(5),
            clip: true,
            ..DivStyle::default()
        };
        let out = div(&content, &style);
        assert!(out.pixel(0, 0).0[3] < 128);
        let centre = out.pixel(6, 6);
        assert_eq!(centre.0[0], 255);
        assert!(centre.0[3] >= 250);
    }
}
