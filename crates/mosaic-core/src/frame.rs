//! Immutable raster frames.

use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

/// Derived tags always carry this bit, fresh tags never do.
const DERIVED_BIT: u64 = 1 << 63;

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// Opaque identity of a [`Frame`].
///
/// Two frames are equal when their tags are equal. Tags are either fresh
/// (unique per constructed image) or derived from the inputs of the operation
/// that produced the frame, which makes repeated identical operations yield
/// equal frames without looking at a single pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag(u64);

impl Tag {
    /// A tag that no other frame has been given.
    pub fn fresh() -> Self {
        Tag(NEXT_TAG.fetch_add(1, Ordering::Relaxed) & !DERIVED_BIT)
    }

    /// A tag computed from the operation name and its inputs.
    pub fn derive(parts: impl Hash) -> Self {
        let mut hasher = DefaultHasher::new();
        parts.hash(&mut hasher);
        Tag(hasher.finish() | DERIVED_BIT)
    }
}

/// An immutable RGBA raster buffer plus its identity tag.
///
/// Cloning is cheap: the pixels are shared behind an [`Arc`].
#[derive(Clone)]
pub struct Frame {
    image: Arc<RgbaImage>,
    tag: Tag,
}

impl Frame {
    /// Wrap an image with a fresh tag.
    pub fn new(image: RgbaImage) -> Self {
        Self::with_tag(image, Tag::fresh())
    }

    /// Wrap an image with an explicit tag.
    pub fn with_tag(image: RgbaImage, tag: Tag) -> Self {
        Self {
            image: Arc::new(image),
            tag,
        }
    }

    /// Build a frame pixel by pixel.
    pub fn from_fn(width: u32, height: u32, f: impl FnMut(u32, u32) -> Rgba<u8>) -> Self {
        Self::new(RgbaImage::from_fn(width.max(1), height.max(1), f))
    }

    /// A fully transparent frame. Equal sizes give equal frames.
    pub fn transparent(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self::with_tag(
            RgbaImage::new(width, height),
            Tag::derive(("transparent", width, height)),
        )
    }

    /// A frame filled with a single colour.
    pub fn solid(width: u32, height: u32, color: Rgba<u8>) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        Self::with_tag(
            RgbaImage::from_pixel(width, height, color),
            Tag::derive(("solid", width, height, color.0)),
        )
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Borrow the underlying pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Read one pixel, transparent when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        if x < self.width() && y < self.height() {
            *self.image.get_pixel(x, y)
        } else {
            Rgba([0, 0, 0, 0])
        }
    }

    /// Whether both frames share the same pixel allocation.
    pub fn shares_pixels(&self, other: &Frame) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }

    /// Crop a rectangle. The rectangle is clamped to the frame bounds and
    /// never collapses below 1×1.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Frame {
        let x = x.min(self.width().saturating_sub(1));
        let y = y.min(self.height().saturating_sub(1));
        let width = width.min(self.width() - x).max(1);
        let height = height.min(self.height() - y).max(1);
        if (x, y, width, height) == (0, 0, self.width(), self.height()) {
            return self.clone();
        }
        let image = imageops::crop_imm(self.image.as_ref(), x, y, width, height).to_image();
        Frame::with_tag(image, Tag::derive(("crop", self.tag, x, y, width, height)))
    }

    /// Rescale with a triangle filter.
    pub fn resize(&self, width: u32, height: u32) -> Frame {
        self.resize_with(width, height, FilterType::Triangle)
    }

    /// Rescale with an explicit filter. Zero sizes clamp to 1.
    pub fn resize_with(&self, width: u32, height: u32, filter: FilterType) -> Frame {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == self.dimensions() {
            return self.clone();
        }
        let image = imageops::resize(self.image.as_ref(), width, height, filter);
        Frame::with_tag(
            image,
            Tag::derive(("resize", self.tag, width, height, filter as u8)),
        )
    }

    /// Rotate clockwise by a number of quarter turns.
    pub fn rotate(&self, quarter_turns: u8) -> Frame {
        let image = match quarter_turns % 4 {
            0 => return self.clone(),
            1 => imageops::rotate90(self.image.as_ref()),
            2 => imageops::rotate180(self.image.as_ref()),
            _ => imageops::rotate270(self.image.as_ref()),
        };
        Frame::with_tag(image, Tag::derive(("rotate", self.tag, quarter_turns % 4)))
    }

    /// Scale the alpha channel by `opacity` (clamped to `[0, 1]`).
    pub fn with_opacity(&self, opacity: f32) -> Frame {
        let opacity = opacity.clamp(0.0, 1.0);
        if opacity >= 1.0 {
            return self.clone();
        }
        let mut image = (*self.image).clone();
        for px in image.pixels_mut() {
            px.0[3] = (px.0[3] as f32 * opacity).round() as u8;
        }
        Frame::with_tag(image, Tag::derive(("opacity", self.tag, opacity.to_bits())))
    }

    /// Scale the colour channels by `level` (clamped to `[0, 1]`).
    pub fn brightness(&self, level: f32) -> Frame {
        let level = level.clamp(0.0, 1.0);
        if level >= 1.0 {
            return self.clone();
        }
        let mut image = (*self.image).clone();
        for px in image.pixels_mut() {
            for c in &mut px.0[..3] {
                *c = (*c as f32 * level).round() as u8;
            }
        }
        Frame::with_tag(image, Tag::derive(("brightness", self.tag, level.to_bits())))
    }

    /// Multiply every pixel by `color`, alpha included. White content takes
    /// on the colour exactly.
    pub fn tint(&self, color: Rgba<u8>) -> Frame {
        if color.0 == [255; 4] {
            return self.clone();
        }
        let mut image = (*self.image).clone();
        for px in image.pixels_mut() {
            for (c, k) in px.0.iter_mut().zip(color.0) {
                *c = (*c as u16 * k as u16 / 255) as u8;
            }
        }
        Frame::with_tag(image, Tag::derive(("tint", self.tag, color.0)))
    }

    /// Return a copy with `top` alpha-blended at `(x, y)`.
    pub fn overlay(&self, top: &Frame, x: i64, y: i64) -> Frame {
        let mut image = (*self.image).clone();
        imageops::overlay(&mut image, top.image(), x, y);
        Frame::with_tag(image, Tag::derive(("overlay", self.tag, top.tag, x, y)))
    }

    /// Composite onto an opaque background colour.
    pub fn flatten(&self, background: Rgba<u8>) -> Frame {
        let mut image = RgbaImage::from_pixel(self.width(), self.height(), background);
        imageops::overlay(&mut image, self.image(), 0, 0);
        Frame::with_tag(image, Tag::derive(("flatten", self.tag, background.0)))
    }

    /// Horizontally scale each row about the vertical centre line, from
    /// `top_scale` on the first row to `bottom_scale` on the last.
    ///
    /// Scales above 1 widen a row, content pushed outside is dropped.
    pub fn trapezoid(&self, top_scale: f32, bottom_scale: f32) -> Frame {
        let (width, height) = self.dimensions();
        let cx = width as f32 / 2.0;
        let span = height.saturating_sub(1).max(1) as f32;
        let image = RgbaImage::from_fn(width, height, |x, y| {
            let scale = top_scale + (bottom_scale - top_scale) * (y as f32 / span);
            if scale <= f32::EPSILON {
                return Rgba([0, 0, 0, 0]);
            }
            let sx = cx + (x as f32 + 0.5 - cx) / scale;
            if sx < 0.0 || sx >= width as f32 {
                Rgba([0, 0, 0, 0])
            } else {
                *self.image.get_pixel(sx as u32, y)
            }
        });
        Frame::with_tag(
            image,
            Tag::derive((
                "trapezoid",
                self.tag,
                top_scale.to_bits(),
                bottom_scale.to_bits(),
            )),
        )
    }

    /// Linear cross-blend from `from` to `to` at `t ∈ [0, 1]`.
    ///
    /// Frames of different sizes are centred on a canvas large enough for
    /// both. An absent side blends as transparency.
    pub fn cross_fade(from: Option<&Frame>, to: Option<&Frame>, t: f32) -> Option<Frame> {
        let t = t.clamp(0.0, 1.0);
        match (from, to) {
            (None, None) => None,
            (Some(a), _) if t <= 0.0 => Some(a.clone()),
            (_, Some(b)) if t >= 1.0 => Some(b.clone()),
            (None, Some(b)) => Some(b.with_opacity(t)),
            (Some(a), None) => Some(a.with_opacity(1.0 - t)),
            (Some(a), Some(b)) => {
                let width = a.width().max(b.width());
                let height = a.height().max(b.height());
                let (ax, ay) = ((width - a.width()) / 2, (height - a.height()) / 2);
                let (bx, by) = ((width - b.width()) / 2, (height - b.height()) / 2);
                let image = RgbaImage::from_fn(width, height, |x, y| {
                    let pa = a.pixel(x.wrapping_sub(ax), y.wrapping_sub(ay));
                    let pb = b.pixel(x.wrapping_sub(bx), y.wrapping_sub(by));
                    lerp_premultiplied(pa, pb, t)
                });
                Some(Frame::with_tag(
                    image,
                    Tag::derive(("cross_fade", a.tag, b.tag, t.to_bits())),
                ))
            }
        }
    }
}

/// Interpolate two straight-alpha pixels in premultiplied space.
fn lerp_premultiplied(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    let aa = a.0[3] as f32 / 255.0;
    let ba = b.0[3] as f32 / 255.0;
    let alpha = aa + (ba - aa) * t;
    if alpha <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for i in 0..3 {
        let ca = a.0[i] as f32 * aa;
        let cb = b.0[i] as f32 * ba;
        out[i] = ((ca + (cb - ca) * t) / alpha).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (alpha * 255.0).round() as u8;
    Rgba(out)
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for Frame {}

impl Hash for Frame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("tag", &self.tag)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_equality_is_by_tag() {
        let a = Frame::new(RgbaImage::from_pixel(2, 2, RED));
        let b = Frame::new(RgbaImage::from_pixel(2, 2, RED));
        assert_ne!(a, b, "same pixels, different identity");
        assert_eq!(a, a.clone());
        assert_eq!(Frame::transparent(3, 4), Frame::transparent(3, 4));
    }

    #[test]
    fn test_fresh_and_derived_tags_never_collide() {
        let fresh = Tag::fresh();
        assert_eq!(fresh.0 & DERIVED_BIT, 0);
        assert_ne!(Tag::derive("x").0 & DERIVED_BIT, 0);
    }

    #[test]
    fn test_crop_is_deterministic_and_clamped() {
        let f = Frame::solid(10, 5, RED);
        let a = f.crop(2, 1, 4, 3);
        assert_eq!(a.dimensions(), (4, 3));
        assert_eq!(a, f.crop(2, 1, 4, 3));
        assert_eq!(f.crop(8, 0, 10, 10).dimensions(), (2, 5));
        assert!(f.crop(0, 0, 10, 5).shares_pixels(&f));
    }

    #[test]
    fn test_with_opacity_scales_alpha_only() {
        let f = Frame::solid(1, 1, RED).with_opacity(0.5);
        assert_eq!(f.pixel(0, 0), Rgba([255, 0, 0, 128]));
    }

    #[test]
    fn test_cross_fade_endpoints_return_inputs() {
        let a = Frame::solid(2, 2, RED);
        let b = Frame::solid(4, 4, Rgba([0, 0, 255, 255]));
        assert_eq!(Frame::cross_fade(Some(&a), Some(&b), 0.0), Some(a.clone()));
        assert_eq!(Frame::cross_fade(Some(&a), Some(&b), 1.0), Some(b.clone()));
        let mid = Frame::cross_fade(Some(&a), Some(&b), 0.5).unwrap();
        assert_eq!(mid.dimensions(), (4, 4));
        // Corner only covered by `b`: half-transparent blue.
        assert_eq!(mid.pixel(0, 0), Rgba([0, 0, 255, 128]));
        // Centre covered by both: purple, opaque.
        let c = mid.pixel(1, 1);
        assert_eq!(c.0[3], 255);
        assert!(c.0[0] > 100 && c.0[2] > 100);
    }

    #[test]
    fn test_tint_colours_white() {
        let white = Frame::solid(2, 1, Rgba([255, 255, 255, 255]));
        let tinted = white.tint(Rgba([0, 128, 255, 255]));
        assert_eq!(tinted.pixel(1, 0), Rgba([0, 128, 255, 255]));
        assert_eq!(tinted, white.tint(Rgba([0, 128, 255, 255])));
        assert!(white.tint(Rgba([255; 4])).shares_pixels(&white));
    }

    #[test]
    fn test_flatten_is_opaque() {
        let f = Frame::transparent(3, 3).flatten(Rgba([1, 2, 3, 255]));
        assert!(f.image().pixels().all(|p| *p == Rgba([1, 2, 3, 255])));
    }

    #[test]
    fn test_trapezoid_narrows_rows() {
        let f = Frame::solid(8, 2, RED).trapezoid(0.5, 1.0);
        assert_eq!(f.pixel(0, 0).0[3], 0, "top row narrowed");
        assert_eq!(f.pixel(4, 0), RED);
        assert_eq!(f.pixel(0, 1), RED, "bottom row untouched");
    }

    #[test]
    fn test_rotate_swaps_dimensions() {
        let f = Frame::solid(3, 1, RED);
        assert_eq!(f.rotate(1).dimensions(), (1, 3));
        assert_eq!(f.rotate(4), f);
    }
}
