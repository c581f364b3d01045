//! Singly linked streams: one-directional lazy traversal with optional memoization
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{StreamError, StreamResult};
use crate::stream::core::{
    absent_past_end, limit_boundary, scan, skip_offset, walk, Forward, Iter, LinearStream, Stream,
};
use crate::stream::lockstep::Lockstep;
use crate::stream::thunk::{LazyLink, SameNode, Thunk};
use crate::stream_configuration::{Resolution, StreamConfig};

struct SinglyNode<V> {
    value: RefCell<V>,
    next: LazyLink<SinglyLinkedStream<V>>,
}

/// A singly linked list node that is also the head of the rest of the list.
///
/// This is the stream type most callers want. Handles are cheap to clone and
/// all clones refer to the same node.
///
/// ```
/// use lazy_stream::{LinearStream, SinglyLinkedStream};
///
/// let ones = SinglyLinkedStream::cyclic(1, |ones| move || Ok(ones.upgrade()));
/// let first: Vec<i32> = ones.iter().take(3).collect::<Result<_, _>>().unwrap();
/// assert_eq!(first, vec![1, 1, 1]);
/// ```
pub struct SinglyLinkedStream<V>(Rc<SinglyNode<V>>);

/// Non-owning handle to a [`SinglyLinkedStream`] node
pub struct WeakSinglyLinkedStream<V>(Weak<SinglyNode<V>>);

impl<V> Clone for SinglyLinkedStream<V> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<V> Clone for WeakSinglyLinkedStream<V> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<V> SameNode for SinglyLinkedStream<V> {
    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V> WeakSinglyLinkedStream<V> {
    /// Returns `None` once every strong handle is gone.
    pub fn upgrade(&self) -> Option<SinglyLinkedStream<V>> {
        self.0.upgrade().map(SinglyLinkedStream)
    }
}

impl<V: Clone + 'static> SinglyLinkedStream<V> {
    /// A memoizing node holding `value`, whose successor is produced by `next`
    /// the first time it is needed.
    pub fn new<N>(value: V, next: N) -> Self
    where
        N: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::with_config(value, next, StreamConfig::default())
    }

    /// Like [`SinglyLinkedStream::new`], with an explicit resolution policy.
    pub fn with_config<N>(value: V, next: N, config: StreamConfig) -> Self
    where
        N: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::from_thunk(value, Rc::new(next), config.resolution)
    }

    /// A memoizing node whose successor may refer back to the node itself.
    ///
    /// `make_next` receives a weak handle to the node being built and returns
    /// the deferred computation of its successor.
    pub fn cyclic<F, N>(value: V, make_next: F) -> Self
    where
        F: FnOnce(WeakSinglyLinkedStream<V>) -> N,
        N: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::cyclic_with_config(value, make_next, StreamConfig::default())
    }

    /// [`SinglyLinkedStream::cyclic`] with an explicit resolution policy.
    pub fn cyclic_with_config<F, N>(value: V, make_next: F, config: StreamConfig) -> Self
    where
        F: FnOnce(WeakSinglyLinkedStream<V>) -> N,
        N: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self(Rc::new_cyclic(|weak| {
            let next: Thunk<Self> = Rc::new(make_next(WeakSinglyLinkedStream(weak.clone())));
            SinglyNode {
                value: RefCell::new(value),
                next: LazyLink::new(next, config.resolution),
            }
        }))
    }

    pub(crate) fn from_thunk(value: V, next: Thunk<Self>, resolution: Resolution) -> Self {
        Self(Rc::new(SinglyNode {
            value: RefCell::new(value),
            next: LazyLink::new(next, resolution),
        }))
    }

    /// Weak handle to this node.
    pub fn downgrade(&self) -> WeakSinglyLinkedStream<V> {
        WeakSinglyLinkedStream(Rc::downgrade(&self.0))
    }

    /// Whether the successor has been computed and cached.
    pub fn is_next_resolved(&self) -> bool {
        self.0.next.is_resolved()
    }

    /// The policy this node was built with.
    pub fn config(&self) -> StreamConfig {
        StreamConfig {
            resolution: self.0.next.resolution(),
        }
    }

    /// Apply `f` to the current values of every stream in `inputs`, moving
    /// them forward in lock-step. The result ends with the shortest input.
    pub fn map_with<L, F>(inputs: L, f: F) -> Self
    where
        L: Lockstep,
        F: Fn(L::Values) -> V + 'static,
    {
        Self::map_with_config(inputs, f, StreamConfig::default())
    }

    pub fn map_with_config<L, F>(inputs: L, f: F, config: StreamConfig) -> Self
    where
        L: Lockstep,
        F: Fn(L::Values) -> V + 'static,
    {
        Self::map_lockstep(inputs, Rc::new(f), config.resolution)
    }

    /// Combine this stream with `other` value by value.
    pub fn zip_with<W, U, F>(&self, other: &W, f: F) -> SinglyLinkedStream<U>
    where
        W: Forward,
        U: Clone + 'static,
        F: Fn(V, W::Value) -> U + 'static,
    {
        SinglyLinkedStream::map_with_config(
            (self.clone(), other.clone()),
            move |(a, b)| f(a, b),
            self.config(),
        )
    }

    fn map_lockstep<L: Lockstep>(
        inputs: L,
        f: Rc<dyn Fn(L::Values) -> V>,
        resolution: Resolution,
    ) -> Self {
        let value = f(inputs.values());
        let next: Thunk<Self> = Rc::new(move || {
            Ok(inputs
                .forward()?
                .map(|following| Self::map_lockstep(following, f.clone(), resolution)))
        });
        Self::from_thunk(value, next, resolution)
    }

    fn filter_shared(&self, predicate: Rc<dyn Fn(&V) -> bool>) -> StreamResult<Option<Self>> {
        let mut node = self.clone();
        while !predicate(&node.value()) {
            match node.next()? {
                Some(following) => node = following,
                None => return Ok(None),
            }
        }

        let resolution = node.0.next.resolution();
        let value = node.value();
        let next: Thunk<Self> = Rc::new(move || match node.next()? {
            Some(following) => following.filter_shared(predicate.clone()),
            None => Ok(None),
        });
        Ok(Some(Self::from_thunk(value, next, resolution)))
    }

    fn pull<I>(source: Rc<RefCell<I>>, resolution: Resolution) -> Option<Self>
    where
        I: Iterator<Item = V> + 'static,
    {
        let value = source.borrow_mut().next()?;
        let next: Thunk<Self> = Rc::new(move || Ok(Self::pull(source.clone(), resolution)));
        Some(Self::from_thunk(value, next, resolution))
    }
}

// Unlink memoized successors one at a time so long chains do not overflow
// the stack when dropped.
impl<V> Drop for SinglyNode<V> {
    fn drop(&mut self) {
        let mut link = self.next.take_resolved();
        while let Some(SinglyLinkedStream(node)) = link {
            match Rc::try_unwrap(node) {
                Ok(mut node) => link = node.next.take_resolved(),
                Err(_) => break,
            }
        }
    }
}

impl<V: Clone + 'static> Stream for SinglyLinkedStream<V> {
    type Value = V;
    type Mapped<U: Clone + 'static> = SinglyLinkedStream<U>;

    fn value(&self) -> V {
        self.0.value.borrow().clone()
    }

    fn value_ref(&self) -> Ref<'_, V> {
        self.0.value.borrow()
    }

    fn set_value(&self, value: V) -> V {
        self.0.value.replace(value)
    }

    fn contains(&self, value: &Self::Value) -> StreamResult<bool>
    where
        Self::Value: PartialEq,
    {
        scan(Some(self.clone()), value, |node| node.next())
    }

    fn map<U, F>(&self, f: F) -> SinglyLinkedStream<U>
    where
        U: Clone + 'static,
        F: Fn(Self::Value) -> U + 'static,
    {
        SinglyLinkedStream::map_with_config(self.clone(), f, self.config())
    }
}

impl<V: Clone + 'static> Forward for SinglyLinkedStream<V> {
    fn next(&self) -> StreamResult<Option<Self>> {
        self.0.next.resolve(self)
    }

    fn memoizes(&self) -> bool {
        self.0.next.resolution() == Resolution::Memoize
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl<V: Clone + 'static> LinearStream for SinglyLinkedStream<V> {
    fn advance_by(&self, n: isize) -> StreamResult<Self> {
        if n < 0 {
            log::debug!("singly linked stream cannot walk {} step(s) backward", n);
            return Err(StreamError::out_of_range(n, 0));
        }
        walk(self, n as usize, n, |node| node.next())
    }

    fn limit_to(&self, n: usize) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let source = self.clone();
        let next: Thunk<Self> = Rc::new(move || limit_boundary(source.next()?, n));
        Some(Self::from_thunk(self.value(), next, self.0.next.resolution()))
    }

    fn skip_by(&self, n: usize) -> Self {
        let source = self.clone();
        let next: Thunk<Self> = Rc::new(move || {
            let Some(offset) = skip_offset(n) else {
                return Ok(None);
            };
            Ok(absent_past_end(source.advance_by(offset))?.map(|node| node.skip_by(n)))
        });
        Self::from_thunk(self.value(), next, self.0.next.resolution())
    }

    fn filter<P>(&self, predicate: P) -> StreamResult<Option<Self>>
    where
        P: Fn(&Self::Value) -> bool + 'static,
    {
        self.filter_shared(Rc::new(predicate))
    }

    fn from_iter_with_config<I>(iter: I, config: StreamConfig) -> Option<Self>
    where
        I: IntoIterator<Item = Self::Value>,
        I::IntoIter: 'static,
    {
        Self::pull(Rc::new(RefCell::new(iter.into_iter())), config.resolution)
    }
}

impl<V: Clone + 'static> Lockstep for SinglyLinkedStream<V> {
    type Values = V;

    fn values(&self) -> V {
        self.value()
    }

    fn forward(&self) -> StreamResult<Option<Self>> {
        self.next()
    }
}

impl<'a, V: Clone + 'static> IntoIterator for &'a SinglyLinkedStream<V> {
    type Item = StreamResult<V>;
    type IntoIter = Iter<SinglyLinkedStream<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug> fmt::Debug for SinglyLinkedStream<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("SinglyLinkedStream");
        match self.0.value.try_borrow() {
            Ok(value) => out.field("value", &*value),
            Err(_) => out.field("value", &"<borrowed>"),
        };
        out.field("resolution", &self.0.next.resolution())
            .field("next", &self.0.next)
            .finish()
    }
}
