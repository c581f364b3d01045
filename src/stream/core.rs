//! Core stream capability traits and the traversal logic shared by every node type
//!
//! A stream is a node and a node is a stream: each handle holds one value and
//! lazily knows the rest of the sequence. The traits here are layered the
//! same way the capabilities are:
//!
//! - [`Stream`]: a readable/writable value, containment and mapping
//! - [`Forward`] / [`Backward`]: lazily resolved links in one or two directions
//! - [`LinearStream`]: iteration, indexing, slicing, filtering and
//!   construction from an iterator, on top of three primitives each concrete
//!   type supplies (`advance_by`, `limit_to`, `skip_by`)

use std::cell::Ref;
use std::iter::FusedIterator;

use crate::error::{StreamError, StreamResult};
use crate::stream::slice::SliceBounds;
use crate::stream_configuration::StreamConfig;

/// Direction of travel along a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Value holder capability shared by all stream nodes
pub trait Stream: Clone + Sized + 'static {
    type Value: Clone + 'static;

    /// Stream type produced by [`Stream::map`]
    type Mapped<U: Clone + 'static>: Stream<Value = U>;

    fn value(&self) -> Self::Value;

    fn value_ref(&self) -> Ref<'_, Self::Value>;

    /// Replace the node's value, returning the old one.
    fn set_value(&self, value: Self::Value) -> Self::Value;

    /// Whether `value` is reachable from this node.
    ///
    /// Does not terminate on an infinite stream that never contains `value`.
    fn contains(&self, value: &Self::Value) -> StreamResult<bool>
    where
        Self::Value: PartialEq;

    /// Lazily apply `f` to every value of the stream.
    fn map<U, F>(&self, f: F) -> Self::Mapped<U>
    where
        U: Clone + 'static,
        F: Fn(Self::Value) -> U + 'static;
}

/// Forward linkage
pub trait Forward: Stream {
    /// The following node, or `None` at the end of the stream.
    fn next(&self) -> StreamResult<Option<Self>>;

    fn memoizes(&self) -> bool;

    /// Whether both handles refer to the same node.
    fn ptr_eq(&self, other: &Self) -> bool;
}

/// Backward linkage
pub trait Backward: Forward {
    /// The preceding node, or `None` at the start of the stream.
    fn previous(&self) -> StreamResult<Option<Self>>;

    fn step(&self, direction: Direction) -> StreamResult<Option<Self>> {
        match direction {
            Direction::Next => self.next(),
            Direction::Previous => self.previous(),
        }
    }
}

/// Ordered traversal, indexing and slicing
pub trait LinearStream: Forward {
    /// The node `n` links away from this one.
    ///
    /// Fails with [`StreamError::OutOfRange`] when the end of the stream is
    /// reached first.
    fn advance_by(&self, n: isize) -> StreamResult<Self>;

    /// A stream truncated to at most `n` nodes, or `None` when `n` is zero.
    fn limit_to(&self, n: usize) -> Option<Self>;

    /// A stream visiting every `n`-th node, starting with this one.
    ///
    /// A step of zero, or one too large to express as an offset, leaves this
    /// node with nothing after (or before) it.
    fn skip_by(&self, n: usize) -> Self;

    /// The first node satisfying `predicate`, linked lazily to the next ones.
    ///
    /// The search for the first match is eager and never ends on an infinite
    /// stream without one.
    fn filter<P>(&self, predicate: P) -> StreamResult<Option<Self>>
    where
        P: Fn(&Self::Value) -> bool + 'static;

    /// Build a stream that pulls one value from `iter` per node, as traversal
    /// demands them. Using the iterator elsewhere afterwards desynchronizes
    /// the stream.
    fn from_iter_with_config<I>(iter: I, config: StreamConfig) -> Option<Self>
    where
        I: IntoIterator<Item = Self::Value>,
        I::IntoIter: 'static;

    fn build_from<I>(iterable: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self::Value>,
        I::IntoIter: 'static,
    {
        Self::from_iter_with_config(iterable, StreamConfig::default())
    }

    fn iter(&self) -> Iter<Self> {
        Iter::new(Some(self.clone()))
    }

    fn index(&self, i: isize) -> StreamResult<Self::Value> {
        Ok(self.advance_by(i)?.value())
    }

    /// Skip to `start`, keep nodes up to `stop`, then every `step`-th node.
    ///
    /// Parameters are validated before anything is traversed.
    fn slice(
        &self,
        start: Option<isize>,
        stop: Option<isize>,
        step: Option<isize>,
    ) -> StreamResult<Option<Self>> {
        let bounds = SliceBounds::new(start, stop, step)?;

        let mut head = Some(self.advance_by(bounds.start as isize)?);
        if let Some(limit) = bounds.limit {
            head = head.and_then(|node| node.limit_to(limit));
        }
        if let Some(step) = bounds.step {
            head = head.map(|node| node.skip_by(step));
        }
        Ok(head)
    }

    fn filter_truthy(&self) -> StreamResult<Option<Self>>
    where
        Self::Value: Truthy,
    {
        self.filter(|value: &Self::Value| value.is_truthy())
    }
}

/// Iteration over possibly-absent stream heads
pub trait LinkExt {
    type Node: Forward;

    fn values(&self) -> Iter<Self::Node>;

    fn to_vec(&self) -> StreamResult<Vec<<Self::Node as Stream>::Value>> {
        self.values().collect()
    }
}

impl<S: Forward> LinkExt for Option<S> {
    type Node = S;

    fn values(&self) -> Iter<S> {
        Iter::new(self.clone())
    }
}

/// Forward iterator over stream values
///
/// A node's successor is only resolved when the value after it is requested.
/// After an error is yielded the iterator is exhausted.
pub struct Iter<S> {
    cursor: Cursor<S>,
}

enum Cursor<S> {
    At(S),
    After(S),
    Done,
}

impl<S> Iter<S> {
    pub fn new(head: Option<S>) -> Self {
        Self {
            cursor: head.map_or(Cursor::Done, Cursor::At),
        }
    }
}

impl<S: Forward> Iterator for Iter<S> {
    type Item = StreamResult<S::Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.cursor, Cursor::Done) {
                Cursor::At(node) => {
                    let value = node.value();
                    self.cursor = Cursor::After(node);
                    return Some(Ok(value));
                }
                Cursor::After(node) => match Forward::next(&node) {
                    Ok(Some(following)) => self.cursor = Cursor::At(following),
                    Ok(None) => return None,
                    Err(e) => return Some(Err(e)),
                },
                Cursor::Done => return None,
            }
        }
    }
}

impl<S: Forward> FusedIterator for Iter<S> {}

/// Truthiness test used by [`LinearStream::filter_truthy`]
pub trait Truthy {
    fn is_truthy(&self) -> bool;
}

macro_rules! impl_truthy_for_numbers {
    ($($t:ty),*) => {
        $(
            impl Truthy for $t {
                fn is_truthy(&self) -> bool {
                    *self != 0 as $t
                }
            }
        )*
    };
}

impl_truthy_for_numbers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for &str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().map_or(false, Truthy::is_truthy)
    }
}

// ================================
// Shared traversal helpers
// ================================

/// Take `steps` links with `step`, failing if the stream ends first.
pub(crate) fn walk<S, F>(from: &S, steps: usize, requested: isize, step: F) -> StreamResult<S>
where
    S: Clone,
    F: Fn(&S) -> StreamResult<Option<S>>,
{
    let mut node = from.clone();
    for taken in 0..steps {
        node = match step(&node)? {
            Some(following) => following,
            None => {
                log::debug!(
                    "walk of {} step(s) ran off the stream after {}",
                    requested,
                    taken
                );
                return Err(StreamError::out_of_range(requested, taken));
            }
        };
    }
    Ok(node)
}

/// Turn running off the end of a stream into the absent sentinel.
pub(crate) fn absent_past_end<S>(walked: StreamResult<S>) -> StreamResult<Option<S>> {
    match walked {
        Ok(node) => Ok(Some(node)),
        Err(e) if e.is_out_of_range() => {
            log::debug!("step ran past the end of the stream, ending it");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Signed offset for a `skip_by` step, or `None` when the step cannot move.
pub(crate) fn skip_offset(n: usize) -> Option<isize> {
    match isize::try_from(n) {
        Ok(0) => {
            log::debug!("skip step of zero ends the stream");
            None
        }
        Ok(offset) => Some(offset),
        Err(_) => {
            log::debug!("skip step {} runs past the end of any stream", n);
            None
        }
    }
}

/// Continue a limited stream of `remaining` nodes onto `next`.
///
/// Running out exactly at the boundary ends the stream; running out with more
/// than one node still owed is an error.
pub(crate) fn limit_boundary<S: LinearStream>(
    next: Option<S>,
    remaining: usize,
) -> StreamResult<Option<S>> {
    match next {
        Some(next) => Ok(next.limit_to(remaining - 1)),
        None if remaining > 1 => {
            log::debug!("limited stream ended {} node(s) early", remaining - 1);
            Err(StreamError::out_of_range((remaining - 1) as isize, 0))
        }
        None => Ok(None),
    }
}

/// Look for `value` from `cursor` onwards, moving with `step`.
pub(crate) fn scan<S, F>(mut cursor: Option<S>, value: &S::Value, step: F) -> StreamResult<bool>
where
    S: Stream,
    S::Value: PartialEq,
    F: Fn(&S) -> StreamResult<Option<S>>,
{
    while let Some(node) = cursor {
        if *node.value_ref() == *value {
            return Ok(true);
        }
        cursor = step(&node)?;
    }
    Ok(false)
}
