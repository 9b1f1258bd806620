//! Timed transitions between successive values of a named state.
//!
//! [`TimedTransition`] holds the timing state machine shared by every kind
//! of transition. [`FrameTransition`] pairs it with an [`Effect`] describing
//! how two frames are interpolated; [`NumberTransition`] interpolates a
//! scalar.

use mosaic_core::{Align, Anchor, Axis, Frame, Rgba, composite_at};

use crate::easing::Easing;

/// How far a flipping card's far edge widens at the start of its fold.
const FLIP_PERSPECTIVE: f32 = 0.25;

/// Colour of the seam drawn across the flip hinge.
const FLIP_SEAM: Rgba<u8> = Rgba([0, 0, 0, 170]);

/// Lifecycle of a transition. `Finished` behaves like `Idle` until the next
/// value change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Finished,
}

/// Timing core shared by all transitions.
#[derive(Debug, Clone)]
pub struct TimedTransition<T> {
    name: String,
    prev: T,
    curr: T,
    /// Seconds from the end of the delay to completion.
    duration: f64,
    /// Seconds to hold at progress 0 after a change.
    delay: f64,
    easing: Easing,
    start_time: f64,
    /// Origin progress is measured from. Follows `now` while not running and
    /// sits at the end of the delay while running.
    last_tick_time: f64,
    progress: f32,
    position: f32,
    phase: Phase,
}

impl<T: Clone + PartialEq> TimedTransition<T> {
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        Self {
            name: name.into(),
            prev: initial.clone(),
            curr: initial,
            duration: 0.5,
            delay: 0.0,
            easing: Easing::default(),
            start_time: 0.0,
            last_tick_time: 0.0,
            progress: 0.0,
            position: 0.0,
            phase: Phase::Idle,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prev(&self) -> &T {
        &self.prev
    }

    pub fn curr(&self) -> &T {
        &self.curr
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Raw progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Eased progress; may leave `[0, 1]` for overshooting curves.
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Start a transition towards `value`. Returns `false` and changes
    /// nothing when `value` equals the current value.
    pub fn update(&mut self, value: T, now: f64) -> bool {
        if value == self.curr {
            return false;
        }
        self.prev = std::mem::replace(&mut self.curr, value);
        self.progress = 0.0;
        self.position = 0.0;
        self.phase = Phase::Running;
        self.start_time = now;
        self.last_tick_time = now + self.delay;
        tracing::trace!(transition = %self.name, now, "value changed");
        true
    }

    /// Advance the clock to `now`.
    pub fn tick(&mut self, now: f64) {
        if self.phase != Phase::Running {
            self.last_tick_time = now;
            return;
        }

        if now < self.start_time + self.delay {
            self.progress = 0.0;
            self.position = 0.0;
            return;
        }

        let raw = if self.duration <= 0.0 {
            1.0
        } else {
            ((now - self.last_tick_time) / self.duration).clamp(0.0, 1.0) as f32
        };
        self.progress = raw;
        self.position = self.easing.apply(raw);

        if raw >= 1.0 {
            self.phase = Phase::Finished;
            self.prev = self.curr.clone();
        }
    }
}

/// A transition over a plain number, used for animated readouts such as
/// brightness.
pub type NumberTransition = TimedTransition<f64>;

impl TimedTransition<f64> {
    /// The interpolated value at the current position.
    pub fn value(&self) -> f64 {
        if self.phase != Phase::Running {
            return self.curr;
        }
        self.prev + (self.curr - self.prev) * self.position as f64
    }
}

/// Edge a sliding frame enters from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    fn axis(self) -> Axis {
        match self {
            Edge::Top | Edge::Bottom => Axis::Vertical,
            Edge::Left | Edge::Right => Axis::Horizontal,
        }
    }

    /// Whether the incoming frame sits before the outgoing one on the axis.
    fn leads(self) -> bool {
        matches!(self, Edge::Top | Edge::Left)
    }
}

/// How a [`FrameTransition`] renders the space between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Alpha cross-blend.
    FadeIn,
    /// Both frames scale towards an interpolated size with complementary
    /// opacity.
    Resize,
    /// The new frame pushes the old one out of a sliding window.
    SlideIn { edge: Edge, align: Align },
    /// Split-flap card: the old top half folds down over the hinge, then
    /// the new bottom half unfolds.
    FlipTop,
    /// The new frame grows out of nothing on top of the old one.
    ScaleIn,
    /// The old frame shrinks into nothing, uncovering the new one.
    ScaleOut,
}

/// A named transition between frames.
#[derive(Debug, Clone)]
pub struct FrameTransition {
    core: TimedTransition<Option<Frame>>,
    effect: Effect,
}

impl FrameTransition {
    pub fn new(name: impl Into<String>, effect: Effect) -> Self {
        Self {
            core: TimedTransition::new(name, None),
            effect,
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.core = self.core.with_duration(seconds);
        self
    }

    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.core = self.core.with_delay(seconds);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.core = self.core.with_easing(easing);
        self
    }

    pub fn core(&self) -> &TimedTransition<Option<Frame>> {
        &self.core
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn update(&mut self, frame: Option<Frame>, now: f64) -> bool {
        self.core.update(frame, now)
    }

    pub fn tick(&mut self, now: f64) {
        self.core.tick(now);
    }

    /// Update, tick and draw in one call.
    pub fn animate(&mut self, frame: Option<Frame>, now: f64) -> Option<Frame> {
        self.update(frame, now);
        self.tick(now);
        self.draw()
    }

    /// Render the current state of the transition.
    pub fn draw(&self) -> Option<Frame> {
        let prev = self.core.prev.as_ref();
        let curr = self.core.curr.as_ref();
        if self.core.phase != Phase::Running || self.core.progress >= 1.0 {
            return curr.cloned();
        }
        if self.core.progress <= 0.0 {
            return prev.cloned();
        }

        let t = self.core.position;
        match self.effect {
            Effect::FadeIn => Frame::cross_fade(prev, curr, t),
            Effect::Resize => Some(resize(prev, curr, t)),
            Effect::SlideIn { edge, align } => Some(slide(prev, curr, t, edge, align)),
            Effect::FlipTop => Some(flip(prev, curr, t)),
            Effect::ScaleIn => Some(scale_over(prev, curr, t)),
            Effect::ScaleOut => Some(scale_over(curr, prev, 1.0 - t)),
        }
    }
}

fn lerp(a: u32, b: u32, t: f32) -> u32 {
    (a as f32 + (b as f32 - a as f32) * t).round().max(0.0) as u32
}

/// Centre `frame` on a transparent `width × height` canvas.
fn fit(frame: &Frame, width: u32, height: u32) -> Frame {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    composite_at(
        frame,
        &Frame::transparent(width, height),
        Anchor::Center,
        0,
        0,
        false,
    )
}

/// Size large enough for both sides, at least 1×1.
fn canvas_size(a: Option<&Frame>, b: Option<&Frame>) -> (u32, u32) {
    let dims = |f: Option<&Frame>| f.map(Frame::dimensions).unwrap_or((1, 1));
    let (aw, ah) = dims(a);
    let (bw, bh) = dims(b);
    (aw.max(bw), ah.max(bh))
}

fn resize(prev: Option<&Frame>, curr: Option<&Frame>, t: f32) -> Frame {
    let placeholder = Frame::transparent(1, 1);
    let a = prev.unwrap_or(&placeholder);
    let b = curr.unwrap_or(&placeholder);
    let width = lerp(a.width(), b.width(), t).max(1);
    let height = lerp(a.height(), b.height(), t).max(1);
    let a = a.resize(width, height);
    let b = b.resize(width, height);
    Frame::cross_fade(Some(&a), Some(&b), t).unwrap_or(b)
}

fn slide(prev: Option<&Frame>, curr: Option<&Frame>, t: f32, edge: Edge, align: Align) -> Frame {
    let t = t.clamp(0.0, 1.0);
    let (width, height) = canvas_size(prev, curr);
    let blank = Frame::transparent(width, height);
    let old = prev.unwrap_or(&blank);
    let new = curr.unwrap_or(&blank);

    let axis = edge.axis();
    let (old_len, new_len) = (axis.main_len(old), axis.main_len(new));
    let (strip, offset) = if edge.leads() {
        (axis.stack([new, old], 0, align), (1.0 - t) * new_len as f32)
    } else {
        (axis.stack([old, new], 0, align), t * old_len as f32)
    };
    let len = lerp(old_len, new_len, t).max(1);
    axis.crop(&strip, offset.round() as u32, len)
}

fn flip(prev: Option<&Frame>, curr: Option<&Frame>, t: f32) -> Frame {
    let t = t.clamp(0.0, 1.0);
    let (width, height) = canvas_size(prev, curr);
    if height < 2 {
        return Frame::cross_fade(prev, curr, t).unwrap_or_else(|| Frame::transparent(1, 1));
    }
    let blank = Frame::transparent(width, height);
    let old = fit(prev.unwrap_or(&blank), width, height);
    let new = fit(curr.unwrap_or(&blank), width, height);

    let hinge = height / 2;
    let lower = height - hinge;
    let old_top = old.crop(0, 0, width, hinge);
    let old_bottom = old.crop(0, hinge, width, lower);
    let new_top = new.crop(0, 0, width, hinge);
    let new_bottom = new.crop(0, hinge, width, lower);

    // Behind the moving flap: the new top is already revealed, the old
    // bottom stays until the flap lands on it.
    let mut card = Frame::transparent(width, height)
        .overlay(&new_top, 0, 0)
        .overlay(&old_bottom, 0, hinge as i64);

    if t < 0.5 {
        let squash = 1.0 - 2.0 * t;
        let flap_height = (hinge as f32 * squash).round() as u32;
        if flap_height > 0 {
            let flap = old_top
                .resize(width, flap_height)
                .trapezoid(1.0 + FLIP_PERSPECTIVE * (1.0 - squash), 1.0);
            card = card.overlay(&flap, 0, (hinge - flap_height) as i64);
        }
    } else {
        let squash = 2.0 * t - 1.0;
        let flap_height = (lower as f32 * squash).round() as u32;
        if flap_height > 0 {
            let flap = new_bottom
                .resize(width, flap_height)
                .trapezoid(1.0, 1.0 + FLIP_PERSPECTIVE * (1.0 - squash));
            card = card.overlay(&flap, 0, hinge as i64);
        }
    }

    card.overlay(&Frame::solid(width, 1, FLIP_SEAM), 0, hinge as i64)
}

/// Draw `under` at full size, then `over` scaled by `t` about the centre.
fn scale_over(under: Option<&Frame>, over: Option<&Frame>, t: f32) -> Frame {
    let (width, height) = canvas_size(under, over);
    let mut canvas = Frame::transparent(width, height);
    if let Some(under) = under {
        canvas = composite_at(under, &canvas, Anchor::Center, 0, 0, false);
    }
    if let Some(over) = over {
        let w = lerp(0, over.width(), t);
        let h = lerp(0, over.height(), t);
        if w > 0 && h > 0 {
            canvas = composite_at(&over.resize(w, h), &canvas, Anchor::Center, 0, 0, false);
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    #[test]
    fn test_update_with_same_value_is_noop() {
        let mut t = NumberTransition::new("n", 0.0).with_duration(1.0);
        assert!(t.update(10.0, 0.0));
        t.tick(0.5);
        let progress = t.progress();
        assert!(!t.update(10.0, 0.6));
        assert_eq!(t.phase(), Phase::Running);
        assert_eq!(t.progress(), progress);

        t.tick(2.0);
        assert_eq!(t.phase(), Phase::Finished);
        assert!(!t.update(10.0, 2.5));
        assert_eq!(t.phase(), Phase::Finished, "unchanged value must not restart");
    }

    #[test]
    fn test_completes_after_duration() {
        let target = Frame::solid(4, 4, RED);
        let mut t = FrameTransition::new("fade", Effect::FadeIn).with_duration(0.25);
        t.update(Some(Frame::solid(4, 4, BLUE)), 0.0);
        t.tick(1.0);
        t.update(Some(target.clone()), 1.0);
        t.tick(1.1);
        assert_eq!(t.core().phase(), Phase::Running);
        t.tick(1.25);
        assert_eq!(t.core().phase(), Phase::Finished);
        assert_eq!(t.draw(), Some(target.clone()));
        assert_eq!(t.core().prev(), t.core().curr());
    }

    #[test]
    fn test_idle_ticks_do_not_count_towards_progress() {
        let mut t = NumberTransition::new("n", 0.0).with_duration(2.0);
        t.tick(0.0);
        t.tick(100.0);
        t.update(1.0, 100.0);
        t.tick(101.0);
        assert!((t.progress() - 0.5).abs() < 1e-6);
        assert!((t.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_delay_holds_progress_at_zero() {
        let mut t = NumberTransition::new("n", 0.0)
            .with_duration(1.0)
            .with_delay(0.5);
        t.update(4.0, 0.0);
        t.tick(0.4);
        assert_eq!(t.progress(), 0.0);
        assert_eq!(t.value(), 0.0);
        t.tick(1.0);
        assert!((t.progress() - 0.5).abs() < 1e-6);
        assert!((t.value() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_duration_finishes_on_next_tick() {
        let mut t = NumberTransition::new("n", 1.0).with_duration(0.0);
        t.update(3.0, 5.0);
        t.tick(5.0);
        assert_eq!(t.phase(), Phase::Finished);
        assert_eq!(t.value(), 3.0);
    }

    #[test]
    fn test_eased_number() {
        let mut t = NumberTransition::new("n", 0.0)
            .with_duration(1.0)
            .with_easing(Easing::CubicIn);
        t.update(8.0, 0.0);
        t.tick(0.5);
        assert!((t.value() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_slide_from_top_reveals_new_frame() {
        let old = Frame::solid(4, 4, BLUE);
        let new = Frame::solid(4, 4, RED);
        let mut t = FrameTransition::new(
            "slide",
            Effect::SlideIn {
                edge: Edge::Top,
                align: Align::Center,
            },
        )
        .with_duration(1.0);
        t.update(Some(old), 0.0);
        t.tick(0.0);
        t.tick(10.0);
        t.update(Some(new), 10.0);
        t.tick(10.5);
        let f = t.draw().unwrap();
        assert_eq!(f.dimensions(), (4, 4));
        assert_eq!(f.pixel(0, 0), RED);
        assert_eq!(f.pixel(0, 1), RED);
        assert_eq!(f.pixel(0, 2), BLUE);
        assert_eq!(f.pixel(0, 3), BLUE);
    }

    #[test]
    fn test_resize_interpolates_size() {
        let mut t = FrameTransition::new("resize", Effect::Resize).with_duration(1.0);
        t.update(Some(Frame::solid(2, 2, RED)), 0.0);
        t.tick(0.0);
        t.tick(1.0);
        t.update(Some(Frame::solid(10, 6, BLUE)), 1.0);
        t.tick(1.5);
        assert_eq!(t.draw().unwrap().dimensions(), (6, 4));
    }

    #[test]
    fn test_scale_in_from_nothing() {
        let mut t = FrameTransition::new("scale", Effect::ScaleIn).with_duration(1.0);
        t.update(Some(Frame::solid(8, 8, RED)), 0.0);
        t.tick(0.5);
        let f = t.draw().unwrap();
        assert_eq!(f.dimensions(), (8, 8));
        assert_eq!(f.pixel(0, 0).0[3], 0);
        assert_eq!(f.pixel(4, 4), RED);
    }

    #[test]
    fn test_flip_keeps_card_size_and_draws_seam() {
        let mut t = FrameTransition::new("flip", Effect::FlipTop).with_duration(1.0);
        t.update(Some(Frame::solid(6, 8, BLUE)), 0.0);
        t.tick(0.0);
        t.tick(1.0);
        t.update(Some(Frame::solid(6, 8, RED)), 1.0);
        for step in [1.1, 1.4, 1.6, 1.9] {
            t.tick(step);
            let f = t.draw().unwrap();
            assert_eq!(f.dimensions(), (6, 8));
            // Top half always shows the new card at its outer edge.
            assert_eq!(f.pixel(3, 0).0[0], 255);
            let seam = f.pixel(3, 4);
            assert!(seam.0[0] < 255 || seam.0[2] < 255, "hinge is darkened");
        }
        t.tick(2.0);
        assert_eq!(t.draw().unwrap().pixel(3, 7), RED);
    }

    /// A transition settled on `from`, then changed to `to` at time 1.0.
    fn changed(effect: Effect, from: Option<Frame>, to: Option<Frame>) -> FrameTransition {
        let mut t = FrameTransition::new("t", effect).with_duration(1.0);
        t.update(from, 0.0);
        t.tick(0.0);
        t.tick(1.0);
        t.update(to, 1.0);
        t
    }

    #[test]
    fn test_fade_in_blends_halfway() {
        let mut t = changed(
            Effect::FadeIn,
            Some(Frame::solid(4, 4, BLUE)),
            Some(Frame::solid(4, 4, RED)),
        );
        t.tick(1.5);
        let f = t.draw().unwrap();
        assert_eq!(f.dimensions(), (4, 4));
        assert_eq!(f.pixel(1, 1), Rgba([128, 0, 128, 255]));
    }

    #[test]
    fn test_scale_out_shrinks_old_frame_over_new() {
        let mut t = changed(
            Effect::ScaleOut,
            Some(Frame::solid(8, 8, RED)),
            Some(Frame::solid(8, 8, BLUE)),
        );
        t.tick(1.5);
        let f = t.draw().unwrap();
        assert_eq!(f.dimensions(), (8, 8));
        assert_eq!(f.pixel(0, 0), BLUE, "new frame uncovered at the edge");
        let centre = f.pixel(4, 4);
        assert!(centre.0[0] > 200 && centre.0[2] < 50, "old frame still in the middle");

        t.tick(1.9);
        let f = t.draw().unwrap();
        assert_eq!(f.pixel(2, 2), BLUE, "old frame keeps shrinking");
    }

    #[test]
    fn test_resize_into_and_out_of_nothing() {
        let mut t = changed(Effect::Resize, None, Some(Frame::solid(9, 5, RED)));
        t.tick(1.5);
        let f = t.draw().unwrap();
        assert_eq!(f.dimensions(), (5, 3), "halfway from the 1x1 placeholder");
        let px = f.pixel(2, 1);
        assert!(px.0[0] > 200 && (120..=135).contains(&px.0[3]), "{px:?}");

        t.tick(2.0);
        t.update(None, 2.0);
        t.tick(2.5);
        let f = t.draw().unwrap();
        assert_eq!(f.dimensions(), (5, 3));
        assert!((120..=135).contains(&f.pixel(2, 1).0[3]));
    }
}
