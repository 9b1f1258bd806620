//! Core raster types for the mosaic pixel panel.
//!
//! A [`Frame`] is an immutable RGBA buffer with a cheap identity tag. Every
//! layout operation in this crate takes frames and returns new ones, so a
//! frame handed to another thread or cached by a composer can never change
//! underneath its reader.

mod color;
mod frame;
mod layout;
mod shape;
mod theme;

pub use color::{hsl_to_rgb, parse_hex, resource_to_color, to_hex};
pub use frame::{Frame, Tag};
pub use image::Rgba;
pub use layout::{Align, Anchor, Axis, composite_at, hstack, place_at, vstack};
pub use shape::{Corners, DivStyle, Edges, div, rounded_rect};
pub use theme::{ColorTheme, TimeFormat};
