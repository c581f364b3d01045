//! Lazy, possibly infinite streams whose nodes are also the streams they head.
//!
//! Each node holds a value and a deferred computation producing the rest of
//! the sequence. Links are resolved on demand and, by default, memoized, which
//! makes self-referential and mutually recursive sequences cheap to describe:
//!
//! ```
//! use lazy_stream::{LinearStream, SinglyLinkedStream};
//!
//! let ones = SinglyLinkedStream::cyclic(1u64, |ones| move || Ok(ones.upgrade()));
//! let naturals = SinglyLinkedStream::cyclic(1u64, |naturals| {
//!     let ones = ones.clone();
//!     move || {
//!         Ok(naturals
//!             .upgrade()
//!             .map(|naturals| ones.zip_with(&naturals, |a, b| a + b)))
//!     }
//! });
//!
//! let first = naturals.slice(None, Some(5), None).unwrap();
//! let values: Vec<u64> = first.unwrap().iter().collect::<Result<_, _>>().unwrap();
//! assert_eq!(values, vec![1, 2, 3, 4, 5]);
//! ```

pub mod error;
pub mod stream;
pub mod stream_configuration;

pub use error::{RangeError, StreamError, StreamResult};
pub use stream::{
    Backward, BackwardLockstep, Direction, DoublyLinkedStream, Forward, Iter, LinearStream,
    LinkExt, Lockstep, SinglyLinkedStream, Stream, Truthy, WeakDoublyLinkedStream,
    WeakSinglyLinkedStream,
};
pub use stream_configuration::{Resolution, StreamConfig};
