//! Flip clock drawn on the render thread.

use chrono::{DateTime, Local, Timelike};
use mosaic_core::{Align, Frame, Rgba, TimeFormat, hstack};
use mosaic_fonts::{large_colon_frame, large_digit_frame, text_frame};
use mosaic_motion::{Easing, Effect, FrameTransition, RenderContext};

/// Glyphs are drawn white and tinted by the caller.
const INK: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Columns between clock glyphs.
const DIGIT_GAP: u32 = 1;

/// Hours and minutes as four digits, plus whether it is afternoon.
pub fn digits<T: Timelike>(time: &T, format: TimeFormat) -> ([u32; 4], bool) {
    let (is_pm, hour12) = time.hour12();
    let hours = match format {
        TimeFormat::TwentyFourHour => time.hour(),
        TimeFormat::TwelveHour => hour12,
    };
    let minutes = time.minute();
    ([hours / 10, hours % 10, minutes / 10, minutes % 10], is_pm)
}

/// Clock settings that can change at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockFace {
    pub time_format: TimeFormat,
    pub flip_duration: f64,
    pub easing: Easing,
}

/// Draw the clock for `now` at animation time `t`. Each digit flips on its
/// own when it changes; the colon fades with the seconds.
pub fn draw(ctx: &mut RenderContext, face: &ClockFace, now: &DateTime<Local>, t: f64) -> Frame {
    let (digits, is_pm) = digits(now, face.time_format);

    let mut glyphs: Vec<Option<Frame>> = digits
        .iter()
        .enumerate()
        .map(|(i, &digit)| {
            ctx.transition(&format!("clock.digit{i}"), |name| {
                FrameTransition::new(name, Effect::FlipTop)
                    .with_duration(face.flip_duration)
                    .with_easing(face.easing)
            })
            .animate(Some(large_digit_frame(digit, INK)), t)
        })
        .collect();

    let colon = if now.second() % 2 == 0 {
        large_colon_frame(INK)
    } else {
        large_colon_frame(INK).with_opacity(0.0)
    };
    let colon = ctx
        .transition("clock.colon", |name| {
            FrameTransition::new(name, Effect::FadeIn).with_duration(0.25)
        })
        .animate(Some(colon), t);
    glyphs.insert(2, colon);

    if face.time_format == TimeFormat::TwelveHour {
        let suffix = text_frame(if is_pm { "PM" } else { "AM" }, INK);
        glyphs.push(Some(suffix));
    }

    hstack(glyphs.iter().map(Option::as_ref), DIGIT_GAP, Align::End)
}
