//! Windowed scrolling over content larger than the panel.
//!
//! A [`Scroller`] reveals a fixed-size window onto a content frame and moves
//! that window over time: freely (marquee), towards a target (carousel), or
//! from one pause point to the next with a dwell at each.

use mosaic_core::{Align, Axis, Frame, Rgba};

/// Content extended past its end so a window never needs wraparound
/// splicing.
#[derive(Debug, Clone)]
struct Extended {
    source: Frame,
    frame: Frame,
}

/// Target-seeking positional animator for one axis.
#[derive(Debug, Clone)]
pub struct Scroller {
    name: String,
    axis: Axis,
    window_size: u32,
    content: Option<Extended>,
    content_size: u32,
    /// Always in `[0, content_size)` once content is set.
    position: u32,
    target: Option<u32>,
    /// Pause point currently armed as the target.
    armed: Option<u32>,
    direction: i8,
    /// Sorted ascending.
    pause_points: Vec<u32>,
    pause_offset: u32,
    pause_duration: f64,
    pause_at_loop: bool,
    /// Minimum seconds between two moves.
    speed: f64,
    delta: u32,
    reverse_delta: u32,
    scrollbar: Option<Rgba<u8>>,
    last_move: f64,
    dwell_from: Option<f64>,
}

impl Scroller {
    pub fn new(name: impl Into<String>, axis: Axis, window_size: u32) -> Self {
        Self {
            name: name.into(),
            axis,
            window_size: window_size.max(1),
            content: None,
            content_size: 0,
            position: 0,
            target: None,
            armed: None,
            direction: 0,
            pause_points: Vec::new(),
            pause_offset: 1,
            pause_duration: 0.0,
            pause_at_loop: false,
            speed: 0.0,
            delta: 1,
            reverse_delta: 1,
            scrollbar: None,
            last_move: f64::NEG_INFINITY,
            dwell_from: None,
        }
    }

    /// Horizontal marquee.
    pub fn horizontal(name: impl Into<String>, window_size: u32) -> Self {
        Self::new(name, Axis::Horizontal, window_size)
    }

    /// Vertical list scroller.
    pub fn vertical(name: impl Into<String>, window_size: u32) -> Self {
        Self::new(name, Axis::Vertical, window_size)
    }

    /// Pixels moved per eligible step. Also sets the reverse delta.
    pub fn with_delta(mut self, delta: u32) -> Self {
        self.delta = delta;
        self.reverse_delta = delta;
        self
    }

    /// Pixels moved per eligible step when heading backwards.
    pub fn with_reverse_delta(mut self, delta: u32) -> Self {
        self.reverse_delta = delta;
        self
    }

    /// Minimum seconds between moves; 0 moves on every step.
    pub fn with_speed(mut self, seconds: f64) -> Self {
        self.speed = seconds.max(0.0);
        self
    }

    pub fn with_pause_points(mut self, points: impl IntoIterator<Item = u32>) -> Self {
        self.set_pause_points(points);
        self
    }

    /// Distance past the current position the next pause point is searched
    /// from. Never below 1, otherwise a reached pause point re-arms itself.
    pub fn with_pause_offset(mut self, offset: u32) -> Self {
        self.pause_offset = offset.max(1);
        self
    }

    /// Seconds to dwell at each pause point.
    pub fn with_pause_duration(mut self, seconds: f64) -> Self {
        self.pause_duration = seconds.max(0.0);
        self
    }

    /// Dwell for the pause duration whenever free-running content wraps.
    pub fn with_pause_at_loop(mut self, enabled: bool) -> Self {
        self.pause_at_loop = enabled;
        self
    }

    /// Draw a scrollbar thumb in this colour when content overflows.
    pub fn with_scrollbar(mut self, color: Rgba<u8>) -> Self {
        self.scrollbar = Some(color);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn target(&self) -> Option<u32> {
        self.target
    }

    /// Sign of the last tick's movement.
    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn content_size(&self) -> u32 {
        self.content_size
    }

    pub fn window_size(&self) -> u32 {
        self.window_size
    }

    /// Whether the scroller has settled on its target (trivially true
    /// without one).
    pub fn on_target(&self) -> bool {
        self.target.is_none_or(|t| t == self.position)
    }

    pub fn set_pause_points(&mut self, points: impl IntoIterator<Item = u32>) {
        let mut points: Vec<u32> = points.into_iter().collect();
        points.sort_unstable();
        points.dedup();
        self.pause_points = points;
        self.armed = None;
    }

    /// Seek towards `target`. Ignored while pause points drive the target.
    pub fn set_target(&mut self, target: Option<u32>) {
        if self.pause_points.is_empty() {
            self.target = target.map(|t| self.clamp(t));
        }
    }

    /// Replace the content. Unchanged content (by frame identity) is a
    /// no-op.
    pub fn set_content(&mut self, content: &Frame) {
        if self.content.as_ref().is_some_and(|c| c.source == *content) {
            return;
        }

        let size = self.axis.main_len(content);
        // Repeat the content until at least one full window fits past its end.
        let copies = 1 + self.window_size.div_ceil(size.max(1)) as usize;
        let frame = self.axis.stack(std::iter::repeat_n(content, copies), 0, Align::Start);

        self.content = Some(Extended {
            source: content.clone(),
            frame,
        });
        self.content_size = size;
        self.position = self.clamp(self.position);
        self.target = self.target.map(|t| self.clamp(t));
    }

    fn clamp(&self, value: u32) -> u32 {
        if self.content_size == 0 {
            0
        } else {
            value % self.content_size
        }
    }

    /// Advance the animation to time `step` (seconds).
    pub fn tick(&mut self, step: f64) {
        self.direction = 0;
        if self.content_size == 0 {
            return;
        }

        if !self.pause_points.is_empty() {
            let from = self.position.saturating_add(self.pause_offset);
            let idx = self.pause_points.partition_point(|&p| p < from);
            let next = self
                .pause_points
                .get(idx)
                .copied()
                .filter(|&p| p < self.content_size);
            if next != self.armed {
                self.armed = next;
                self.target = next;
            }
        }

        if let Some(since) = self.dwell_from {
            if step - since < self.pause_duration {
                return;
            }
            self.dwell_from = None;
        }

        if step - self.last_move < self.speed {
            return;
        }

        let before = self.position;
        match self.target {
            Some(target) if target > self.position => {
                self.position = self.position.saturating_add(self.delta).min(target);
            }
            Some(target) if target < self.position => {
                self.position = self.position.saturating_sub(self.reverse_delta).max(target);
            }
            Some(_) => {}
            None => {
                let next = self.position as u64 + self.delta as u64;
                if next >= self.content_size as u64 {
                    self.position = (next % self.content_size as u64) as u32;
                    if self.pause_at_loop {
                        self.dwell_from = Some(step);
                    }
                } else {
                    self.position = next as u32;
                }
            }
        }

        if self.position != before {
            self.last_move = step;
            self.direction = if self.position > before { 1 } else { -1 };
            if self.target == Some(self.position) && self.armed == self.target {
                self.dwell_from = Some(step);
            }
        }
    }

    /// Tick, then render the window over `content`.
    pub fn draw(&mut self, content: &Frame, step: f64) -> Frame {
        self.set_content(content);
        self.tick(step);
        self.window()
    }

    /// Render the window at the current position without advancing.
    pub fn window(&self) -> Frame {
        let Some(content) = &self.content else {
            return Frame::transparent(1, 1);
        };
        let window = self.axis.crop(&content.frame, self.position, self.window_size);

        match self.scrollbar {
            Some(color) if self.content_size > self.window_size => {
                let (span, total) = (self.window_size as u64, self.content_size as u64);
                let thumb_len = (span * span / total).max(1);
                let offset = self.position as u64 * span / total;
                let cross = self.axis.cross_len(&window);
                let (w, h) = self.axis.xy(thumb_len as i64, 1);
                let thumb = Frame::solid(w as u32, h as u32, color);
                let (x, y) = self.axis.xy(offset as i64, cross as i64 - 1);
                window.overlay(&thumb, x, y)
            }
            _ => window,
        }
    }
}
