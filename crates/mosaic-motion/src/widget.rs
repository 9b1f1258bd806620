//! Schedulable units of panel content.

use mosaic_core::Frame;

/// Seconds a widget stays on screen before the stack rotates away.
const DEFAULT_WAIT_TIME: f64 = 5.0;

/// A named, prioritised piece of content for a [`Stack`](crate::Stack).
///
/// Widgets are rebuilt every render tick; the stack keeps only the latest
/// list.
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub name: String,
    /// Content to show. `None` means nothing to show this tick.
    pub frame: Option<Frame>,
    /// Alternative content used while the stack has this widget selected.
    pub active_frame: Option<Frame>,
    /// Higher priorities sort first.
    pub priority: f32,
    /// Seconds to dwell before rotating to the next widget.
    pub wait_time: f64,
    /// A single focused widget with content is shown exclusively.
    pub focus: bool,
}

impl Widget {
    pub fn new(name: impl Into<String>, frame: Option<Frame>) -> Self {
        Self {
            name: name.into(),
            frame,
            active_frame: None,
            priority: 0.0,
            wait_time: DEFAULT_WAIT_TIME,
            focus: false,
        }
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_wait_time(mut self, seconds: f64) -> Self {
        self.wait_time = seconds.max(0.0);
        self
    }

    pub fn with_focus(mut self, focus: bool) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_active_frame(mut self, frame: Option<Frame>) -> Self {
        self.active_frame = frame;
        self
    }

    pub fn has_content(&self) -> bool {
        self.frame.is_some()
    }

    /// The frame to draw, honouring the active state.
    pub fn render(&self, active: bool) -> Option<&Frame> {
        let frame = self.frame.as_ref()?;
        if active {
            Some(self.active_frame.as_ref().unwrap_or(frame))
        } else {
            Some(frame)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_core::Rgba;

    #[test]
    fn test_active_frame_requires_content() {
        let active = Frame::solid(1, 1, Rgba([1, 1, 1, 255]));
        let empty = Widget::new("w", None).with_active_frame(Some(active.clone()));
        assert!(empty.render(true).is_none());

        let normal = Frame::solid(1, 1, Rgba([2, 2, 2, 255]));
        let w = Widget::new("w", Some(normal.clone())).with_active_frame(Some(active.clone()));
        assert_eq!(w.render(false), Some(&normal));
        assert_eq!(w.render(true), Some(&active));
    }
}
