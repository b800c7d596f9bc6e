//! Tracked subjects. The camera holds handles, never the transforms themselves.

use rapier3d::data::{Arena, Index};
use rapier3d::math::Isometry;
use rapier3d::prelude::Real;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetHandle(Index);

impl TargetHandle {
    pub fn index(&self) -> u32 {
        self.0.into_raw_parts().0
    }

    pub fn generation(&self) -> u32 {
        self.0.into_raw_parts().1
    }
}

/// Read access to subject transforms, answered with `None` once a handle has died.
pub trait TargetSource {
    fn target_transform(&self, handle: TargetHandle) -> Option<Isometry<Real>>;
}

/// Generational table of subject transforms owned by the scene.
#[derive(Clone, Debug, Default)]
pub struct TargetTable {
    entries: Arena<Isometry<Real>>,
}

impl TargetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transform: Isometry<Real>) -> TargetHandle {
        TargetHandle(self.entries.insert(transform))
    }

    /// Kills the handle; later lookups through it fail even if the slot is reused.
    pub fn remove(&mut self, handle: TargetHandle) -> Option<Isometry<Real>> {
        self.entries.remove(handle.0)
    }

    pub fn is_alive(&self, handle: TargetHandle) -> bool {
        self.entries.contains(handle.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn set_transform(&mut self, handle: TargetHandle, transform: Isometry<Real>) -> bool {
        match self.entries.get_mut(handle.0) {
            Some(entry) => {
                *entry = transform;
                true
            }
            None => false,
        }
    }

    pub fn transform(&self, handle: TargetHandle) -> Option<Isometry<Real>> {
        self.entries.get(handle.0).copied()
    }
}

impl TargetSource for TargetTable {
    fn target_transform(&self, handle: TargetHandle) -> Option<Isometry<Real>> {
        self.transform(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapier3d::math::Vector;

    #[test]
    fn removed_handle_stays_dead_after_slot_reuse() {
        let mut table = TargetTable::new();
        let first = table.insert(Isometry::translation(1.0, 0.0, 0.0));
        assert!(table.is_alive(first));
        assert!(table.remove(first).is_some());
        assert!(!table.is_alive(first));
        assert!(table.remove(first).is_none());

        let second = table.insert(Isometry::translation(2.0, 0.0, 0.0));
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert!(table.target_transform(first).is_none());
        assert_eq!(
            table.target_transform(second).map(|iso| iso.translation.vector),
            Some(Vector::new(2.0, 0.0, 0.0))
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn dead_handle_rejects_updates() {
        let mut table = TargetTable::new();
        let handle = table.insert(Isometry::identity());
        assert!(table.set_transform(handle, Isometry::translation(0.0, 1.0, 0.0)));
        table.remove(handle);
        assert!(!table.set_transform(handle, Isometry::identity()));
        assert!(table.is_empty());
    }
}
