//! Colour helpers for panel content.

use image::Rgba;

/// Map a resource value (0.0-1.0) to a color from cool blue to warm red.
pub fn resource_to_color(value: f32) -> Rgba<u8> {
    let value = value.clamp(0.0, 1.0);

    // Hue: 240 (blue) -> 60 (yellow) -> 0 (red)
    let hue = 240.0 - (value * 240.0);

    // LED pixels wash out at low lightness, keep it brighter than a terminal would
    let saturation = 0.7 + (value * 0.3);
    let lightness = 0.35 + (value * 0.15);

    hsl_to_rgb(hue, saturation, lightness)
}

/// Convert HSL to an opaque RGBA pixel.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Rgba<u8> {
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return Rgba([v, v, v, 255]);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let h = h.rem_euclid(360.0) / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Rgba([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255])
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex(s: &str) -> Option<Rgba<u8>> {
    let hex = s.strip_prefix('#')?;
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}

/// Format as `#rrggbb`, appending alpha only when not opaque.
pub fn to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
    }
}
