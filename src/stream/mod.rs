//! Lazy stream nodes and their capability traits
//!
//! Both node types implement the same capability layers from the `core`
//! module, so code written against [`LinearStream`] works with either. Mixing
//! node types within one logical stream is not supported.

pub mod core;
pub mod doubly;
pub mod lockstep;
pub mod singly;
pub mod slice;
pub mod thunk;

// Re-export capability traits
pub use self::core::{Backward, Direction, Forward, Iter, LinearStream, LinkExt, Stream, Truthy};

// Re-export node types
pub use doubly::{DoublyLinkedStream, WeakDoublyLinkedStream};
pub use singly::{SinglyLinkedStream, WeakSinglyLinkedStream};

// Re-export construction helpers
pub use lockstep::{BackwardLockstep, Lockstep};
pub use slice::SliceBounds;
pub use thunk::{absent, thunk, thunk_init, Thunk};
