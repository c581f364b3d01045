//! Bundles of streams that `map` walks in lock-step
//!
//! A bundle advances all of its members together and ends as soon as any one
//! of them does, so mapping over streams of different lengths stops with the
//! shortest.

use crate::error::StreamResult;
use crate::stream::core::{Backward, Forward};

/// A group of stream cursors moving forward together
pub trait Lockstep: Clone + 'static {
    type Values;

    fn values(&self) -> Self::Values;

    /// Every member's next node, or `None` once any member is exhausted.
    fn forward(&self) -> StreamResult<Option<Self>>;
}

/// A [`Lockstep`] bundle that can also move backward together
pub trait BackwardLockstep: Lockstep {
    fn backward(&self) -> StreamResult<Option<Self>>;
}

impl<A: Forward, B: Forward> Lockstep for (A, B) {
    type Values = (A::Value, B::Value);

    fn values(&self) -> Self::Values {
        (self.0.value(), self.1.value())
    }

    fn forward(&self) -> StreamResult<Option<Self>> {
        let Some(a) = self.0.next()? else {
            return Ok(None);
        };
        Ok(self.1.next()?.map(|b| (a, b)))
    }
}

impl<A: Backward, B: Backward> BackwardLockstep for (A, B) {
    fn backward(&self) -> StreamResult<Option<Self>> {
        let Some(a) = self.0.previous()? else {
            return Ok(None);
        };
        Ok(self.1.previous()?.map(|b| (a, b)))
    }
}

impl<A: Forward, B: Forward, C: Forward> Lockstep for (A, B, C) {
    type Values = (A::Value, B::Value, C::Value);

    fn values(&self) -> Self::Values {
        (self.0.value(), self.1.value(), self.2.value())
    }

    fn forward(&self) -> StreamResult<Option<Self>> {
        let Some(a) = self.0.next()? else {
            return Ok(None);
        };
        let Some(b) = self.1.next()? else {
            return Ok(None);
        };
        Ok(self.2.next()?.map(|c| (a, b, c)))
    }
}

impl<A: Backward, B: Backward, C: Backward> BackwardLockstep for (A, B, C) {
    fn backward(&self) -> StreamResult<Option<Self>> {
        let Some(a) = self.0.previous()? else {
            return Ok(None);
        };
        let Some(b) = self.1.previous()? else {
            return Ok(None);
        };
        Ok(self.2.previous()?.map(|c| (a, b, c)))
    }
}

/// Any number of streams of one type, mapped over a `Vec` of their values
impl<S: Forward> Lockstep for Vec<S> {
    type Values = Vec<S::Value>;

    fn values(&self) -> Self::Values {
        self.iter().map(|node| node.value()).collect()
    }

    fn forward(&self) -> StreamResult<Option<Self>> {
        collect_all(self.iter().map(|node| node.next()))
    }
}

impl<S: Backward> BackwardLockstep for Vec<S> {
    fn backward(&self) -> StreamResult<Option<Self>> {
        collect_all(self.iter().map(|node| node.previous()))
    }
}

fn collect_all<S, I>(links: I) -> StreamResult<Option<Vec<S>>>
where
    I: Iterator<Item = StreamResult<Option<S>>>,
{
    let mut nodes = Vec::new();
    for link in links {
        match link? {
            Some(node) => nodes.push(node),
            None => return Ok(None),
        }
    }
    Ok(Some(nodes))
}
