//! Runs each screen's composer on its own worker thread so the render loop
//! only ever reads the latest finished frame.

mod composer;
mod error;
mod pacer;

pub use composer::{ComposeFn, Composer};
pub use error::ComposeError;
pub use pacer::FramePacer;
