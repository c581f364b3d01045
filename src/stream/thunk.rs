//! Deferred computations and the cells that cache them

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::StreamResult;
use crate::stream_configuration::Resolution;

/// Zero-argument computation producing an adjacent node, or `None` past the end.
///
/// Thunks are `Fn` rather than `FnOnce`: a recomputing node calls its thunk on
/// every traversal.
pub type Thunk<S> = Rc<dyn Fn() -> StreamResult<Option<S>>>;

/// Box a closure as a [`Thunk`].
pub fn thunk<S, F>(f: F) -> Thunk<S>
where
    F: Fn() -> StreamResult<Option<S>> + 'static,
{
    Rc::new(f)
}

/// A thunk that always yields the absent sentinel.
pub fn absent<S: 'static>() -> Thunk<S> {
    Rc::new(|| Ok(None))
}

/// Wrap `thunk` so that every node it produces is passed through `init`
/// before being handed back.
///
/// This is how a node that is still under construction gets wired into the
/// nodes it discovers later: `init` typically points the discovered node's
/// opposite link back at the constructing node. `init` is not called when the
/// thunk yields the absent sentinel or fails.
pub fn thunk_init<S, I>(thunk: Thunk<S>, init: I) -> Thunk<S>
where
    S: 'static,
    I: Fn(&S) + 'static,
{
    Rc::new(move || {
        let node = thunk()?;
        if let Some(node) = &node {
            init(node);
        }
        Ok(node)
    })
}

/// Identity comparison between node handles
pub(crate) trait SameNode {
    fn same_node(&self, other: &Self) -> bool;
}

/// What a memoized link has settled on
enum Cached<S> {
    Node(Option<S>),
    /// The link leads back to the node that owns it. Nothing is stored, so a
    /// self-loop does not keep its own node alive.
    Owner,
}

/// A link to a neighbouring node, resolved on first demand.
///
/// Every accessor takes `owner`, a handle to the node holding this link.
pub(crate) struct LazyLink<S> {
    thunk: Thunk<S>,
    resolution: Resolution,
    resolved: RefCell<Option<Cached<S>>>,
}

impl<S: Clone + SameNode> LazyLink<S> {
    pub(crate) fn new(thunk: Thunk<S>, resolution: Resolution) -> Self {
        Self {
            thunk,
            resolution,
            resolved: RefCell::new(None),
        }
    }

    pub(crate) fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub(crate) fn is_resolved(&self) -> bool {
        self.resolved.borrow().is_some()
    }

    /// Return the linked node, running the thunk if nothing is cached.
    ///
    /// No borrow is held while the thunk runs, so thunks may freely traverse
    /// (and back-fill) the node that owns this link.
    pub(crate) fn resolve(&self, owner: &S) -> StreamResult<Option<S>> {
        if let Some(cached) = self.resolved.borrow().as_ref() {
            return Ok(Self::read(cached, owner));
        }

        let produced = (self.thunk)()?;
        match self.resolution {
            Resolution::Recompute => Ok(produced),
            Resolution::Memoize => {
                log::trace!("memoizing resolved link");
                // A re-entrant resolution or a back-fill may have won the race.
                let mut slot = self.resolved.borrow_mut();
                let cached = slot.get_or_insert_with(|| Self::settle(produced, owner));
                Ok(Self::read(cached, owner))
            }
        }
    }

    /// Move the cached node out, leaving the link unresolved.
    pub(crate) fn take_resolved(&mut self) -> Option<S> {
        match self.resolved.get_mut().take() {
            Some(Cached::Node(node)) => node,
            Some(Cached::Owner) | None => None,
        }
    }

    /// Cache `node` without running the thunk, unless the link is already
    /// resolved or does not memoize. Returns whether the cell was filled.
    pub(crate) fn fill(&self, owner: &S, node: Option<S>) -> bool {
        if self.resolution != Resolution::Memoize {
            return false;
        }
        let mut slot = self.resolved.borrow_mut();
        if slot.is_some() {
            return false;
        }
        log::trace!("back-filling unresolved link");
        *slot = Some(Self::settle(node, owner));
        true
    }

    fn settle(node: Option<S>, owner: &S) -> Cached<S> {
        match node {
            Some(node) if node.same_node(owner) => Cached::Owner,
            node => Cached::Node(node),
        }
    }

    fn read(cached: &Cached<S>, owner: &S) -> Option<S> {
        match cached {
            Cached::Node(node) => node.clone(),
            Cached::Owner => Some(owner.clone()),
        }
    }
}

impl<S> fmt::Debug for LazyLink<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.resolved.try_borrow() {
            Ok(slot) if slot.is_some() => "resolved",
            Ok(_) => "deferred",
            Err(_) => "resolving",
        };
        f.write_str(state)
    }
}
