//! Layout compositing: stacking frames along an axis and placing one frame
//! on another.

use image::imageops;
use image::RgbaImage;

use crate::frame::{Frame, Tag};

/// Blur radius used behind frosted overlays.
const FROST_SIGMA: f32 = 1.5;

/// Cross-axis alignment: top/left, center, bottom/right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Align {
    Start,
    #[default]
    Center,
    End,
}

impl Align {
    /// Offset that aligns `inner` within `outer`.
    fn offset(self, outer: u32, inner: u32) -> u32 {
        let slack = outer.saturating_sub(inner);
        match self {
            Align::Start => 0,
            Align::Center => slack / 2,
            Align::End => slack,
        }
    }

    /// The coordinate this alignment designates on a span of `len`.
    fn point(self, len: u32) -> i64 {
        match self {
            Align::Start => 0,
            Align::Center => (len / 2) as i64,
            Align::End => len as i64,
        }
    }
}

/// One of the nine reference points of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    /// Horizontal and vertical components.
    fn split(self) -> (Align, Align) {
        use Align::{Center, End, Start};
        match self {
            Anchor::TopLeft => (Start, Start),
            Anchor::Top => (Center, Start),
            Anchor::TopRight => (End, Start),
            Anchor::Left => (Start, Center),
            Anchor::Center => (Center, Center),
            Anchor::Right => (End, Center),
            Anchor::BottomLeft => (Start, End),
            Anchor::Bottom => (Center, End),
            Anchor::BottomRight => (End, End),
        }
    }

    /// Coordinates of this anchor on a `width × height` box.
    pub fn point(self, width: u32, height: u32) -> (i64, i64) {
        let (h, v) = self.split();
        (h.point(width), v.point(height))
    }
}

/// Layout / scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Extent of `frame` along this axis.
    pub fn main_len(self, frame: &Frame) -> u32 {
        match self {
            Axis::Horizontal => frame.width(),
            Axis::Vertical => frame.height(),
        }
    }

    /// Extent of `frame` across this axis.
    pub fn cross_len(self, frame: &Frame) -> u32 {
        match self {
            Axis::Horizontal => frame.height(),
            Axis::Vertical => frame.width(),
        }
    }

    /// Crop `len` pixels starting at `offset` along this axis, keeping the
    /// full cross extent.
    pub fn crop(self, frame: &Frame, offset: u32, len: u32) -> Frame {
        match self {
            Axis::Horizontal => frame.crop(offset, 0, len, frame.height()),
            Axis::Vertical => frame.crop(0, offset, frame.width(), len),
        }
    }

    /// Map (main, cross) coordinates to (x, y).
    pub fn xy(self, main: i64, cross: i64) -> (i64, i64) {
        match self {
            Axis::Horizontal => (main, cross),
            Axis::Vertical => (cross, main),
        }
    }

    /// Concatenate frames along this axis.
    pub fn stack<'a, I>(self, frames: I, gap: u32, align: Align) -> Frame
    where
        I: IntoIterator,
        I::Item: Into<Option<&'a Frame>>,
    {
        let frames: Vec<&Frame> = frames.into_iter().filter_map(Into::into).collect();
        match frames.as_slice() {
            [] => Frame::with_tag(
                RgbaImage::new(1, 1),
                Tag::derive(("stack-empty", self, gap, align)),
            ),
            [only] => (*only).clone(),
            _ => {
                let main: u32 = frames.iter().map(|f| self.main_len(f)).sum::<u32>()
                    + gap * (frames.len() as u32 - 1);
                let cross = frames.iter().map(|f| self.cross_len(f)).max().unwrap_or(1);
                let (width, height) = self.xy(main as i64, cross as i64);
                let mut canvas = RgbaImage::new(width as u32, height as u32);

                let mut cursor = 0i64;
                for frame in &frames {
                    let off = align.offset(cross, self.cross_len(frame)) as i64;
                    let (x, y) = self.xy(cursor, off);
                    imageops::replace(&mut canvas, frame.image(), x, y);
                    cursor += (self.main_len(frame) + gap) as i64;
                }

                let tags: Vec<Tag> = frames.iter().map(|f| f.tag()).collect();
                Frame::with_tag(canvas, Tag::derive(("stack", self, gap, align, tags)))
            }
        }
    }
}

/// Concatenate frames left to right. Absent entries are skipped; an input
/// with nothing present yields a 1×1 transparent frame.
pub fn hstack<'a, I>(frames: I, gap: u32, align: Align) -> Frame
where
    I: IntoIterator,
    I::Item: Into<Option<&'a Frame>>,
{
    Axis::Horizontal.stack(frames, gap, align)
}

/// Concatenate frames top to bottom. See [`hstack`].
pub fn vstack<'a, I>(frames: I, gap: u32, align: Align) -> Frame
where
    I: IntoIterator,
    I::Item: Into<Option<&'a Frame>>,
{
    Axis::Vertical.stack(frames, gap, align)
}

/// Place `frame` on `dest` so that the two share the `anchor` point, shifted
/// by `(dx, dy)`.
///
/// With `frosted`, the destination behind the frame is blurred wherever the
/// frame has any coverage before the frame is blended on top.
pub fn composite_at(
    frame: &Frame,
    dest: &Frame,
    anchor: Anchor,
    dx: i64,
    dy: i64,
    frosted: bool,
) -> Frame {
    let (dax, day) = anchor.point(dest.width(), dest.height());
    let (fax, fay) = anchor.point(frame.width(), frame.height());
    let (x, y) = (dax - fax + dx, day - fay + dy);

    if !frosted {
        return dest.overlay(frame, x, y);
    }

    let mut canvas = dest.image().clone();
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + frame.width() as i64).min(dest.width() as i64);
    let y1 = (y + frame.height() as i64).min(dest.height() as i64);
    if x0 < x1 && y0 < y1 {
        let region = imageops::crop_imm(
            dest.image(),
            x0 as u32,
            y0 as u32,
            (x1 - x0) as u32,
            (y1 - y0) as u32,
        )
        .to_image();
        let blurred = imageops::blur(&region, FROST_SIGMA);
        for (rx, ry, px) in blurred.enumerate_pixels() {
            let (gx, gy) = (x0 + rx as i64, y0 + ry as i64);
            if frame.pixel((gx - x) as u32, (gy - y) as u32).0[3] > 0 {
                canvas.put_pixel(gx as u32, gy as u32, *px);
            }
        }
    }
    imageops::overlay(&mut canvas, frame.image(), x, y);
    Frame::with_tag(canvas, Tag::derive(("frosted", dest.tag(), frame.tag(), x, y)))
}

/// Place `frame` on `dest` so that the frame's `anchor` point lands on the
/// absolute coordinate `(x, y)`.
pub fn place_at(frame: &Frame, dest: &Frame, x: i64, y: i64, anchor: Anchor) -> Frame {
    let (ax, ay) = anchor.point(frame.width(), frame.height());
    dest.overlay(frame, x - ax, y - ay)
}
