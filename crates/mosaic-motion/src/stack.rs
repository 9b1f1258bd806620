//! Rotating carousel of widgets.
//!
//! A [`Stack`] lays its widgets out top to bottom and scrolls a vertical
//! window onto the selected one. Selection follows focus first, then newly
//! arrived content, then timed rotation.

use mosaic_core::{Align, Frame, vstack};

use crate::scroll::Scroller;
use crate::widget::Widget;

/// Seconds added to a widget's wait time before rotation is allowed.
const ROTATION_GRACE: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Stack {
    name: String,
    /// Sorted by priority, highest first.
    widgets: Vec<Widget>,
    previous: Vec<Widget>,
    current: usize,
    last_rotation: f64,
    gap: u32,
    scroller: Scroller,
    /// The only widget that gained content at the last update, consumed by
    /// the next tick.
    entered: Option<String>,
}

impl Stack {
    /// A stack showing a window `window_height` pixels tall.
    pub fn new(name: impl Into<String>, window_height: u32) -> Self {
        let name = name.into();
        let scroller = Scroller::vertical(format!("{name}.scroll"), window_height);
        Self {
            name,
            widgets: Vec::new(),
            previous: Vec::new(),
            current: 0,
            last_rotation: 0.0,
            gap: 0,
            scroller,
            entered: None,
        }
    }

    /// Vertical space between widgets.
    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    /// Scroll speed towards a later widget, also used backwards unless
    /// overridden by [`with_reverse_delta`](Self::with_reverse_delta).
    pub fn with_delta(mut self, delta: u32) -> Self {
        self.scroller = self.scroller.with_delta(delta);
        self
    }

    /// Scroll speed when returning to an earlier widget.
    pub fn with_reverse_delta(mut self, delta: u32) -> Self {
        self.scroller = self.scroller.with_reverse_delta(delta);
        self
    }

    /// Minimum seconds between scroll moves.
    pub fn with_speed(mut self, seconds: f64) -> Self {
        self.scroller = self.scroller.with_speed(seconds);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&Widget> {
        self.widgets.get(self.current)
    }

    pub fn scroller(&self) -> &Scroller {
        &self.scroller
    }

    /// Replace the widget list.
    ///
    /// The selection follows the current widget by name. A widget that has
    /// content now but did not at the previous update counts as entered when
    /// it is the only one.
    pub fn update(&mut self, mut widgets: Vec<Widget>) {
        widgets.sort_by(|a, b| b.priority.total_cmp(&a.priority));

        let selected = self.current().map(|w| w.name.clone());
        self.previous = std::mem::replace(&mut self.widgets, widgets);

        let mut entered = self.widgets.iter().filter(|w| {
            w.has_content()
                && !self
                    .previous
                    .iter()
                    .any(|p| p.name == w.name && p.has_content())
        });
        self.entered = match (entered.next(), entered.next()) {
            (Some(only), None) => Some(only.name.clone()),
            _ => None,
        };

        self.current = selected
            .and_then(|name| self.widgets.iter().position(|w| w.name == name))
            .unwrap_or_else(|| self.current.min(self.widgets.len().saturating_sub(1)));
    }

    /// Advance the selection to time `step`.
    pub fn tick(&mut self, step: f64) {
        let entered = self.entered.take();

        let mut focused = self
            .widgets
            .iter()
            .enumerate()
            .filter(|(_, w)| w.focus && w.has_content());
        if let (Some((index, _)), None) = (focused.next(), focused.next()) {
            self.select(index, step, "focus");
            return;
        }

        if let Some(index) = entered.and_then(|name| {
            self.widgets
                .iter()
                .position(|w| w.name == name && w.has_content())
        }) {
            self.select(index, step, "entered");
            return;
        }

        let wait = self.current().map_or(0.0, |w| w.wait_time);
        if self.scroller.on_target() && step - self.last_rotation > wait + ROTATION_GRACE {
            let next = self.next_candidate();
            self.select(next, step, "rotation");
        }
    }

    /// Rotate to the next widget with content right away.
    pub fn advance(&mut self, step: f64) {
        let next = self.next_candidate();
        self.select(next, step, "advance");
    }

    fn next_candidate(&self) -> usize {
        let len = self.widgets.len();
        let mut present = self.widgets.iter().enumerate().filter(|(_, w)| w.has_content());
        match (present.next(), present.next()) {
            (None, _) => 0,
            (Some((only, _)), None) => only,
            _ => (1..=len)
                .map(|k| (self.current + k) % len)
                .find(|&i| self.widgets[i].has_content())
                .unwrap_or(0),
        }
    }

    fn select(&mut self, index: usize, step: f64, reason: &str) {
        if index != self.current {
            tracing::debug!(
                stack = %self.name,
                widget = self.widgets.get(index).map(|w| w.name.as_str()),
                reason,
                "stack selection changed"
            );
        }
        self.current = index;
        self.last_rotation = step;
    }

    /// Tick, then render the window onto the selected widget.
    ///
    /// Returns `None` while no widget has content.
    pub fn draw(&mut self, step: f64) -> Option<Frame> {
        self.tick(step);
        if !self.widgets.iter().any(Widget::has_content) {
            return None;
        }

        let target: u32 = self.widgets[..self.current.min(self.widgets.len())]
            .iter()
            .filter_map(|w| w.frame.as_ref())
            .map(|f| f.height() + self.gap)
            .sum();
        let settled = self.scroller.target() == Some(target) && self.scroller.on_target();

        let current = self.current;
        let content = vstack(
            self.widgets
                .iter()
                .enumerate()
                .map(|(i, w)| w.render(i == current && settled)),
            self.gap,
            Align::Start,
        );

        self.scroller.set_content(&content);
        self.scroller.set_target(Some(target));
        Some(self.scroller.draw(&content, step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);

    fn card(color: Rgba<u8>) -> Option<Frame> {
        Some(Frame::solid(6, 4, color))
    }

    #[test]
    fn test_single_candidate_is_pinned() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", None),
            Widget::new("b", card(RED)).with_wait_time(2.0),
        ]);
        stack.tick(0.0);
        assert_eq!(stack.current().map(|w| w.name.as_str()), Some("b"));
        stack.tick(5.0);
        assert_eq!(stack.current().map(|w| w.name.as_str()), Some("b"));
    }

    #[test]
    fn test_focus_is_exclusive() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(100.0),
            Widget::new("b", card(BLUE)).with_focus(true),
        ]);
        stack.tick(0.0);
        assert_eq!(stack.current_index(), 1);
        for step in 1..20 {
            stack.tick(step as f64);
            assert_eq!(stack.current_index(), 1);
        }
    }

    #[test]
    fn test_focus_without_content_is_ignored() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", card(RED)),
            Widget::new("b", None).with_focus(true),
        ]);
        stack.tick(0.0);
        assert_eq!(stack.current_index(), 0);
    }

    #[test]
    fn test_sorted_by_priority() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("low", card(RED)).with_priority(-1.0),
            Widget::new("high", card(BLUE)).with_priority(2.0),
            Widget::new("mid", card(GREEN)),
        ]);
        let names: Vec<&str> = stack.widgets().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["high", "mid", "low"]);
    }

    #[test]
    fn test_rotation_waits_and_skips_empty_slots() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(2.0),
            Widget::new("b", None),
            Widget::new("c", card(BLUE)).with_wait_time(2.0),
        ]);
        stack.tick(0.0);
        assert_eq!(stack.current_index(), 0);
        stack.tick(3.0);
        assert_eq!(stack.current_index(), 0, "wait time plus grace not exceeded");
        stack.tick(3.5);
        assert_eq!(stack.current_index(), 2);
        stack.tick(7.0);
        assert_eq!(stack.current_index(), 0, "wraps past the end");
    }

    #[test]
    fn test_entered_content_jumps_once() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(100.0),
            Widget::new("b", None),
            Widget::new("c", card(GREEN)).with_wait_time(100.0),
        ]);
        stack.tick(0.0);
        assert_eq!(stack.current_index(), 0);

        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(100.0),
            Widget::new("b", card(BLUE)).with_wait_time(100.0),
            Widget::new("c", card(GREEN)).with_wait_time(100.0),
        ]);
        stack.tick(1.0);
        assert_eq!(stack.current_index(), 1);

        // Still present next time round: no longer new.
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(100.0),
            Widget::new("b", card(BLUE)).with_wait_time(100.0),
            Widget::new("c", card(GREEN)).with_wait_time(100.0),
        ]);
        stack.advance(2.0);
        stack.tick(3.0);
        assert_eq!(stack.current_index(), 2);
    }

    #[test]
    fn test_selection_follows_name_across_updates() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![Widget::new("a", card(RED)), Widget::new("b", card(BLUE))]);
        stack.advance(0.0);
        assert_eq!(stack.current().map(|w| w.name.as_str()), Some("b"));
        stack.update(vec![
            Widget::new("a", card(RED)),
            Widget::new("b", card(BLUE)).with_priority(1.0),
        ]);
        assert_eq!(stack.current_index(), 0);
        assert_eq!(stack.current().map(|w| w.name.as_str()), Some("b"));
    }

    #[test]
    fn test_draw_scrolls_to_selected_widget() {
        let mut stack = Stack::new("cards", 4).with_delta(4);
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(1.0),
            Widget::new("b", card(BLUE)).with_wait_time(1.0),
        ]);
        let first = stack.draw(0.0).expect("content present");
        assert_eq!(first.dimensions(), (6, 4));
        assert_eq!(first.pixel(0, 0), RED);

        let second = stack.draw(2.5).expect("content present");
        assert_eq!(stack.current_index(), 1);
        assert_eq!(stack.scroller().position(), 4);
        assert_eq!(second.pixel(0, 0), BLUE);
    }

    #[test]
    fn test_active_frame_once_settled() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", card(RED))
                .with_active_frame(card(GREEN))
                .with_wait_time(100.0),
        ]);
        let first = stack.draw(0.0).expect("content present");
        assert_eq!(first.pixel(0, 0), RED);
        let settled = stack.draw(0.1).expect("content present");
        assert_eq!(settled.pixel(0, 0), GREEN);
    }

    #[test]
    fn test_draw_without_content() {
        let mut stack = Stack::new("cards", 4);
        assert!(stack.draw(0.0).is_none());
        stack.update(vec![Widget::new("a", None)]);
        assert!(stack.draw(1.0).is_none());
    }

    #[test]
    fn test_entered_content_is_forgotten_by_next_update() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(100.0),
            Widget::new("b", None).with_wait_time(100.0),
        ]);
        stack.tick(0.0);
        assert_eq!(stack.current_index(), 0);

        let both = || {
            vec![
                Widget::new("a", card(RED)).with_wait_time(100.0),
                Widget::new("b", card(BLUE)).with_wait_time(100.0),
            ]
        };
        stack.update(both());
        // "b" already had content in the list this update replaces.
        stack.update(both());
        stack.tick(1.0);
        assert_eq!(stack.current().map(|w| w.name.as_str()), Some("a"));
    }

    #[test]
    fn test_emptied_widget_still_waits_before_rotating() {
        let mut stack = Stack::new("cards", 4);
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(100.0),
            Widget::new("b", card(BLUE)),
        ]);
        stack.tick(0.0);
        assert_eq!(stack.current_index(), 0);

        stack.update(vec![
            Widget::new("a", None).with_wait_time(100.0),
            Widget::new("b", card(BLUE)),
        ]);
        stack.tick(0.1);
        assert_eq!(stack.current_index(), 0);
        stack.tick(100.5);
        assert_eq!(stack.current_index(), 0, "wait time plus grace not exceeded");
        stack.tick(101.5);
        assert_eq!(stack.current().map(|w| w.name.as_str()), Some("b"));
    }

    #[test]
    fn test_rotation_waits_for_scroll_to_settle() {
        let mut stack = Stack::new("cards", 4).with_speed(10.0);
        stack.update(vec![
            Widget::new("a", card(RED)).with_wait_time(1.0),
            Widget::new("b", card(BLUE)).with_wait_time(1.0),
        ]);
        stack.draw(0.0);
        stack.draw(2.5);
        assert_eq!(stack.current_index(), 1);
        assert!(!stack.scroller().on_target());
        // Due by time, but the window is still travelling to "b".
        stack.draw(5.0);
        assert_eq!(stack.current_index(), 1);
    }
}
