//! Sprites: frames, cached maps and animation.
//!
//! A [`Processor`] is the unit of editing. It owns its [`Frame`]s and their
//! generated map caches, and is only ever mutated through `&mut`, so one
//! sprite never runs two generations at once.

mod animation;
mod frame;
mod processor;
pub mod split;

pub use animation::{Affordances, Animation, DEFAULT_FRAME_INTERVAL};
pub use frame::{Frame, MapState, SourceImage};
pub use processor::Processor;
