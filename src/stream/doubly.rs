//! Doubly linked streams
//!
//! Each node carries two independent deferred links. When a memoizing node
//! resolves one of them, the node it discovers has its opposite link pointed
//! back at the resolving node (if that link is still unresolved). Construction
//! therefore only ever names adjacent nodes in one direction, yet a memoized
//! traversal stays consistent both ways, including around cycles.
//!
//! Memoized links hold strong references, so a memoized traversal over two or
//! more nodes forms reference cycles that keep those nodes alive. A link that
//! leads back to its own node is the exception and holds nothing.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::StreamResult;
use crate::stream::core::{
    absent_past_end, limit_boundary, scan, skip_offset, walk, Backward, Direction, Forward,
    Iter, LinearStream, Stream,
};
use crate::stream::lockstep::{BackwardLockstep, Lockstep};
use crate::stream::thunk::{absent, thunk_init, LazyLink, SameNode, Thunk};
use crate::stream_configuration::{Resolution, StreamConfig};

type Predicate<V> = Rc<dyn Fn(&V) -> bool>;

struct DoublyNode<V> {
    value: RefCell<V>,
    next: LazyLink<DoublyLinkedStream<V>>,
    previous: LazyLink<DoublyLinkedStream<V>>,
}

/// A doubly linked list node that is also the head of the rest of the list,
/// lazily linked in both directions.
pub struct DoublyLinkedStream<V>(Rc<DoublyNode<V>>);

/// Non-owning handle to a [`DoublyLinkedStream`] node
pub struct WeakDoublyLinkedStream<V>(Weak<DoublyNode<V>>);

impl<V> Clone for DoublyLinkedStream<V> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<V> Clone for WeakDoublyLinkedStream<V> {
    fn clone(&self) -> Self {
        Self(Weak::clone(&self.0))
    }
}

impl<V> SameNode for DoublyLinkedStream<V> {
    fn same_node(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<V> WeakDoublyLinkedStream<V> {
    /// The node, if any strong handle to it is still alive.
    pub fn upgrade(&self) -> Option<DoublyLinkedStream<V>> {
        self.0.upgrade().map(DoublyLinkedStream)
    }
}

impl<V: Clone + 'static> DoublyLinkedStream<V> {
    /// A memoizing node holding `value` with deferred links in both directions.
    pub fn new<N, P>(value: V, next: N, previous: P) -> Self
    where
        N: Fn() -> StreamResult<Option<Self>> + 'static,
        P: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::with_config(value, next, previous, StreamConfig::default())
    }

    /// Like [`DoublyLinkedStream::new`], with an explicit resolution policy.
    pub fn with_config<N, P>(value: V, next: N, previous: P, config: StreamConfig) -> Self
    where
        N: Fn() -> StreamResult<Option<Self>> + 'static,
        P: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::assemble(value, config.resolution, move |_| {
            let next: Thunk<Self> = Rc::new(next);
            let previous: Thunk<Self> = Rc::new(previous);
            (next, previous)
        })
    }

    /// A memoizing node with nothing before it, unless a later back-fill says
    /// otherwise.
    pub fn forward_only<N>(value: V, next: N) -> Self
    where
        N: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::assemble(value, Resolution::Memoize, move |_| {
            let next: Thunk<Self> = Rc::new(next);
            (next, absent())
        })
    }

    /// A memoizing node whose links may refer back to the node itself.
    ///
    /// `make_links` receives a weak handle to the node being built and returns
    /// its `(next, previous)` deferred computations.
    pub fn cyclic<F, N, P>(value: V, make_links: F) -> Self
    where
        F: FnOnce(WeakDoublyLinkedStream<V>) -> (N, P),
        N: Fn() -> StreamResult<Option<Self>> + 'static,
        P: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::cyclic_with_config(value, make_links, StreamConfig::default())
    }

    /// [`DoublyLinkedStream::cyclic`] with an explicit resolution policy.
    pub fn cyclic_with_config<F, N, P>(value: V, make_links: F, config: StreamConfig) -> Self
    where
        F: FnOnce(WeakDoublyLinkedStream<V>) -> (N, P),
        N: Fn() -> StreamResult<Option<Self>> + 'static,
        P: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::assemble(value, config.resolution, move |this| {
            let (next, previous) = make_links(this);
            let next: Thunk<Self> = Rc::new(next);
            let previous: Thunk<Self> = Rc::new(previous);
            (next, previous)
        })
    }

    /// Every node is built here. Memoizing nodes route both links through
    /// [`thunk_init`] so that resolving one direction back-fills the other.
    fn assemble<F>(value: V, resolution: Resolution, make_links: F) -> Self
    where
        F: FnOnce(WeakDoublyLinkedStream<V>) -> (Thunk<Self>, Thunk<Self>),
    {
        Self(Rc::new_cyclic(|weak| {
            let this = WeakDoublyLinkedStream(weak.clone());
            let (mut next, mut previous) = make_links(this.clone());
            if resolution == Resolution::Memoize {
                next = thunk_init(next, back_fill(this.clone(), Direction::Previous));
                previous = thunk_init(previous, back_fill(this, Direction::Next));
            }
            DoublyNode {
                value: RefCell::new(value),
                next: LazyLink::new(next, resolution),
                previous: LazyLink::new(previous, resolution),
            }
        }))
    }

    fn link(&self, direction: Direction) -> &LazyLink<Self> {
        match direction {
            Direction::Next => &self.0.next,
            Direction::Previous => &self.0.previous,
        }
    }

    fn resolution(&self) -> Resolution {
        self.0.next.resolution()
    }

    /// A handle that does not keep this node alive.
    pub fn downgrade(&self) -> WeakDoublyLinkedStream<V> {
        WeakDoublyLinkedStream(Rc::downgrade(&self.0))
    }

    /// Whether the following node is cached, either resolved or back-filled.
    pub fn is_next_resolved(&self) -> bool {
        self.0.next.is_resolved()
    }

    /// Whether the preceding node is cached.
    pub fn is_previous_resolved(&self) -> bool {
        self.0.previous.is_resolved()
    }

    /// The policy this node was built with.
    pub fn config(&self) -> StreamConfig {
        StreamConfig {
            resolution: self.resolution(),
        }
    }

    /// The same values traversed the other way round: `next` of the result
    /// is the reversal of this node's `previous`, and vice versa.
    pub fn reverse(&self) -> Self {
        let source = self.clone();
        Self::assemble(self.value(), self.resolution(), move |_| {
            let ahead = source.clone();
            let next: Thunk<Self> = Rc::new(move || Ok(Self::reverse_link(source.previous()?)));
            let previous: Thunk<Self> = Rc::new(move || Ok(Self::reverse_link(ahead.next()?)));
            (next, previous)
        })
    }

    /// Reverse a possibly absent node; the absent sentinel reverses to itself.
    pub fn reverse_link(link: Option<Self>) -> Option<Self> {
        link.map(|node| node.reverse())
    }

    /// Lock-step map over `inputs`, linked in both directions.
    pub fn map_with<L, F>(inputs: L, f: F) -> Self
    where
        L: BackwardLockstep,
        F: Fn(L::Values) -> V + 'static,
    {
        Self::map_with_config(inputs, f, StreamConfig::default())
    }

    pub fn map_with_config<L, F>(inputs: L, f: F, config: StreamConfig) -> Self
    where
        L: BackwardLockstep,
        F: Fn(L::Values) -> V + 'static,
    {
        Self::map_lockstep(inputs, Rc::new(f), config.resolution)
    }

    pub fn zip_with<W, U, F>(&self, other: &W, f: F) -> DoublyLinkedStream<U>
    where
        W: Backward,
        U: Clone + 'static,
        F: Fn(V, W::Value) -> U + 'static,
    {
        DoublyLinkedStream::map_with_config(
            (self.clone(), other.clone()),
            move |(a, b)| f(a, b),
            self.config(),
        )
    }

    fn map_lockstep<L: BackwardLockstep>(
        inputs: L,
        f: Rc<dyn Fn(L::Values) -> V>,
        resolution: Resolution,
    ) -> Self {
        let value = f(inputs.values());
        Self::assemble(value, resolution, move |_| {
            let ahead = inputs.clone();
            let forward_fn = f.clone();
            let next: Thunk<Self> = Rc::new(move || {
                Ok(ahead
                    .forward()?
                    .map(|following| Self::map_lockstep(following, forward_fn.clone(), resolution)))
            });
            let previous: Thunk<Self> = Rc::new(move || {
                Ok(inputs
                    .backward()?
                    .map(|preceding| Self::map_lockstep(preceding, f.clone(), resolution)))
            });
            (next, previous)
        })
    }

    /// Search toward `direction` for a node satisfying `predicate`, then link
    /// the match to filtered continuations in both directions.
    fn filter_toward(
        &self,
        predicate: Predicate<V>,
        direction: Direction,
    ) -> StreamResult<Option<Self>> {
        let mut node = self.clone();
        while !predicate(&node.value()) {
            match node.step(direction)? {
                Some(following) => node = following,
                None => return Ok(None),
            }
        }

        let resolution = node.resolution();
        let value = node.value();
        Ok(Some(Self::assemble(value, resolution, move |_| {
            let ahead = node.clone();
            let forward_predicate = predicate.clone();
            let next: Thunk<Self> = Rc::new(move || match ahead.next()? {
                Some(following) => following.filter_toward(forward_predicate.clone(), Direction::Next),
                None => Ok(None),
            });
            let previous: Thunk<Self> = Rc::new(move || match node.previous()? {
                Some(preceding) => preceding.filter_toward(predicate.clone(), Direction::Previous),
                None => Ok(None),
            });
            (next, previous)
        })))
    }

    /// Like [`LinearStream::from_iter_with_config`], with `previous` as the
    /// backward link of the first node.
    pub fn from_iter_after<I, P>(iter: I, previous: P, config: StreamConfig) -> Option<Self>
    where
        I: IntoIterator<Item = V>,
        I::IntoIter: 'static,
        P: Fn() -> StreamResult<Option<Self>> + 'static,
    {
        Self::pull(
            Rc::new(RefCell::new(iter.into_iter())),
            Rc::new(previous),
            config.resolution,
        )
    }

    fn pull<I>(source: Rc<RefCell<I>>, previous: Thunk<Self>, resolution: Resolution) -> Option<Self>
    where
        I: Iterator<Item = V> + 'static,
    {
        let value = source.borrow_mut().next()?;
        Some(Self::assemble(value, resolution, move |this| {
            let next: Thunk<Self> = Rc::new(move || {
                let origin = this.upgrade();
                Ok(Self::pull(
                    source.clone(),
                    Rc::new(move || Ok(origin.clone())),
                    resolution,
                ))
            });
            (next, previous)
        }))
    }
}

/// Initializer pointing the `toward` link of a newly discovered node at `origin`.
fn back_fill<V: Clone + 'static>(
    origin: WeakDoublyLinkedStream<V>,
    toward: Direction,
) -> impl Fn(&DoublyLinkedStream<V>) + 'static {
    move |node: &DoublyLinkedStream<V>| {
        if let Some(origin) = origin.upgrade() {
            node.link(toward).fill(node, Some(origin));
        }
    }
}

impl<V: Clone + 'static> Stream for DoublyLinkedStream<V> {
    type Value = V;
    type Mapped<U: Clone + 'static> = DoublyLinkedStream<U>;

    fn value(&self) -> V {
        self.0.value.borrow().clone()
    }

    fn value_ref(&self) -> Ref<'_, V> {
        self.0.value.borrow()
    }

    fn set_value(&self, value: V) -> V {
        self.0.value.replace(value)
    }

    /// Scans forward from this node, then backward from the node before it.
    /// A stream may be finite one way and infinite (or cyclic) the other.
    fn contains(&self, value: &Self::Value) -> StreamResult<bool>
    where
        Self::Value: PartialEq,
    {
        if scan(Some(self.clone()), value, |node| node.next())? {
            return Ok(true);
        }
        scan(self.previous()?, value, |node| node.previous())
    }

    fn map<U, F>(&self, f: F) -> DoublyLinkedStream<U>
    where
        U: Clone + 'static,
        F: Fn(Self::Value) -> U + 'static,
    {
        DoublyLinkedStream::map_with_config(self.clone(), f, self.config())
    }
}

impl<V: Clone + 'static> Forward for DoublyLinkedStream<V> {
    fn next(&self) -> StreamResult<Option<Self>> {
        self.0.next.resolve(self)
    }

    fn memoizes(&self) -> bool {
        self.resolution() == Resolution::Memoize
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl<V: Clone + 'static> Backward for DoublyLinkedStream<V> {
    fn previous(&self) -> StreamResult<Option<Self>> {
        self.0.previous.resolve(self)
    }
}

impl<V: Clone + 'static> LinearStream for DoublyLinkedStream<V> {
    /// Walks forward for positive `n` and backward for negative `n`.
    fn advance_by(&self, n: isize) -> StreamResult<Self> {
        let direction = if n < 0 {
            Direction::Previous
        } else {
            Direction::Next
        };
        walk(self, n.unsigned_abs(), n, |node| node.step(direction))
    }

    /// Only the forward direction is bounded; walking backward from a limited
    /// node leaves one more node available ahead of it.
    fn limit_to(&self, n: usize) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let source = self.clone();
        Some(Self::assemble(self.value(), self.resolution(), move |_| {
            let behind = source.clone();
            let next: Thunk<Self> = Rc::new(move || limit_boundary(source.next()?, n));
            let previous: Thunk<Self> = Rc::new(move || {
                Ok(behind
                    .previous()?
                    .and_then(|node| node.limit_to(n.saturating_add(1))))
            });
            (next, previous)
        }))
    }

    fn skip_by(&self, n: usize) -> Self {
        let offset = skip_offset(n);
        let source = self.clone();
        Self::assemble(self.value(), self.resolution(), move |_| {
            let behind = source.clone();
            let next: Thunk<Self> = Rc::new(move || {
                let Some(offset) = offset else {
                    return Ok(None);
                };
                Ok(absent_past_end(source.advance_by(offset))?.map(|node| node.skip_by(n)))
            });
            let previous: Thunk<Self> = Rc::new(move || {
                let Some(offset) = offset else {
                    return Ok(None);
                };
                Ok(absent_past_end(behind.advance_by(-offset))?.map(|node| node.skip_by(n)))
            });
            (next, previous)
        })
    }

    fn filter<P>(&self, predicate: P) -> StreamResult<Option<Self>>
    where
        P: Fn(&Self::Value) -> bool + 'static,
    {
        self.filter_toward(Rc::new(predicate), Direction::Next)
    }

    fn from_iter_with_config<I>(iter: I, config: StreamConfig) -> Option<Self>
    where
        I: IntoIterator<Item = Self::Value>,
        I::IntoIter: 'static,
    {
        Self::pull(
            Rc::new(RefCell::new(iter.into_iter())),
            absent(),
            config.resolution,
        )
    }
}

impl<V: Clone + 'static> Lockstep for DoublyLinkedStream<V> {
    type Values = V;

    fn values(&self) -> V {
        self.value()
    }

    fn forward(&self) -> StreamResult<Option<Self>> {
        self.next()
    }
}

impl<V: Clone + 'static> BackwardLockstep for DoublyLinkedStream<V> {
    fn backward(&self) -> StreamResult<Option<Self>> {
        self.previous()
    }
}

impl<'a, V: Clone + 'static> IntoIterator for &'a DoublyLinkedStream<V> {
    type Item = StreamResult<V>;
    type IntoIter = Iter<DoublyLinkedStream<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<V: fmt::Debug> fmt::Debug for DoublyLinkedStream<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("DoublyLinkedStream");
        match self.0.value.try_borrow() {
            Ok(value) => out.field("value", &*value),
            Err(_) => out.field("value", &"<borrowed>"),
        };
        out.field("resolution", &self.0.next.resolution())
            .field("next", &self.0.next)
            .field("previous", &self.0.previous)
            .finish()
    }
}
