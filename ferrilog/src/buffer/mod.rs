//! The event buffer: a compact, self-describing binary record built inline
//! on the producer side.
//!
//! See [`event::EventBuffer`] for the type itself; [`offset`] defines the
//! typed offsets that address into it, and [`visitor`] defines the walk
//! used to render a finished record.

pub mod event;
pub mod offset;
pub mod visitor;

pub use event::{DispatchTag, EventBuffer};
pub use offset::{FieldTag, ScalarOffset, ScalarTag, StringOffset};
pub use visitor::{CollectingVisitor, FieldVisitor, OwnedFieldValue};

/// Inline small-buffer-optimization capacity, in bytes, before the event
/// buffer's backing storage spills to the heap.
pub const INLINE_CAPACITY: usize = 255;

/// The event buffer's backing storage. A `SmallVec` already gives us the
/// small-buffer-optimization contract the spec asks for: inline storage up
/// to `INLINE_CAPACITY` bytes, geometric growth to the heap beyond that,
/// and a move that is a plain byte copy (never pointer patching).
pub(crate) type Bytes = smallvec::SmallVec<[u8; INLINE_CAPACITY]>;
