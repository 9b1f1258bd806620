//! Animation machinery for the mosaic pixel panel.
//!
//! Everything here is driven by the render loop: callers pass the current
//! time in seconds to `tick`/`draw` and get frames back. Named instances live
//! in a [`RenderContext`] owned by the loop, so each one has exactly one
//! writer.

mod context;
mod easing;
mod scroll;
mod stack;
mod transition;
mod widget;

pub use context::RenderContext;
pub use easing::Easing;
pub use scroll::Scroller;
pub use stack::Stack;
pub use transition::{
    Edge, Effect, FrameTransition, NumberTransition, Phase, TimedTransition,
};
pub use widget::Widget;
