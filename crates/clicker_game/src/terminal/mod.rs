//! Terminal output.
//!
//! A [`Surface`] owns two cell grids: `next`, which accumulates draw calls
//! for the frame being built, and `prev`, which mirrors what the client last
//! received. [`Surface::render`] writes only rows that differ, so a frame's
//! cost scales with what changed rather than with the terminal's area.
//!
//! Bytes leave through a [`Sink`]. The local TTY and a remote SSH channel are
//! just two sinks; the surface logic is shared.

mod cell;
mod sink;
mod surface;

pub use cell::{Cell, Color, Style};
pub use sink::{MemorySink, Sink, TtySink};
pub use surface::{clamp_size, Surface, MAX_HEIGHT, MAX_WIDTH};
