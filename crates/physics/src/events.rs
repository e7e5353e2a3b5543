//! Begin / persist / end notifications for colliding body pairs.

use std::collections::BTreeSet;

/// Phase of a collision between two bodies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollisionPhase {
    /// The pair touches this step but did not last step.
    Begin,
    /// The pair touched last step and still does.
    Persist,
    /// The pair touched last step and no longer does.
    End,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CollisionEvent {
    pub phase: CollisionPhase,
    pub body_a: String,
    pub body_b: String,
}

/// Colliding pairs of the previous step, keyed by body id so that removing
/// a body does not confuse index based bookkeeping.
#[derive(Clone, Debug, Default)]
pub(crate) struct CollisionTracker {
    previous: BTreeSet<(String, String)>,
    pending: Vec<CollisionEvent>,
}

impl CollisionTracker {
    fn key(a: &str, b: &str) -> (String, String) {
        if a <= b {
            (a.to_owned(), b.to_owned())
        } else {
            (b.to_owned(), a.to_owned())
        }
    }

    /// Compares this step's colliding pairs against the previous step and
    /// queues the resulting events.
    pub(crate) fn record<'a>(&mut self, pairs: impl IntoIterator<Item = (&'a str, &'a str)>) {
        let current: BTreeSet<(String, String)> = pairs.into_iter().map(|(a, b)| Self::key(a, b)).collect();

        for (a, b) in &current {
            let phase = if self.previous.contains(&(a.clone(), b.clone())) {
                CollisionPhase::Persist
            } else {
                CollisionPhase::Begin
            };
            self.pending.push(CollisionEvent {
                phase,
                body_a: a.clone(),
                body_b: b.clone(),
            });
        }
        for (a, b) in self.previous.difference(&current) {
            self.pending.push(CollisionEvent {
                phase: CollisionPhase::End,
                body_a: a.clone(),
                body_b: b.clone(),
            });
        }

        self.previous = current;
    }

    pub(crate) fn drain(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn clear(&mut self) {
        self.previous.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_persist_end() {
        let mut tracker = CollisionTracker::default();
        tracker.record([("b", "a")]);
        tracker.record([("a", "b")]);
        tracker.record(std::iter::empty());
        let phases: Vec<_> = tracker.drain().into_iter().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            vec![CollisionPhase::Begin, CollisionPhase::Persist, CollisionPhase::End]
        );
        assert!(tracker.drain().is_empty());
    }
}
