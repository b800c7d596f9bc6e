use std::collections::BTreeSet;

/// Identifies a system that can veto camera behaviour (cutscene, menu, script).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CameraOwner(pub u32);

/// Camera switches shared by every system in a frame. Each switch stays off while any
/// owner holds it off.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CameraSystemContext {
    collision_disabled_by: BTreeSet<CameraOwner>,
    tracking_disabled_by: BTreeSet<CameraOwner>,
}

impl CameraSystemContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_collisions(&mut self, enabled: bool, owner: CameraOwner) {
        if enabled {
            self.collision_disabled_by.remove(&owner);
        } else {
            self.collision_disabled_by.insert(owner);
        }
    }

    pub fn collisions_enabled(&self) -> bool {
        self.collision_disabled_by.is_empty()
    }

    pub fn disable_tracking(&mut self, owner: CameraOwner) {
        self.tracking_disabled_by.insert(owner);
    }

    pub fn enable_tracking(&mut self, owner: CameraOwner) {
        self.tracking_disabled_by.remove(&owner);
    }

    pub fn tracking_disabled(&self) -> bool {
        !self.tracking_disabled_by.is_empty()
    }

    pub fn reset(&mut self) {
        self.collision_disabled_by.clear();
        self.tracking_disabled_by.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collisions_stay_off_until_every_owner_releases() {
        let mut ctx = CameraSystemContext::new();
        assert!(ctx.collisions_enabled());
        ctx.set_collisions(false, CameraOwner(1));
        ctx.set_collisions(false, CameraOwner(4));
        ctx.set_collisions(true, CameraOwner(1));
        assert!(!ctx.collisions_enabled());
        ctx.set_collisions(true, CameraOwner(4));
        assert!(ctx.collisions_enabled());
        // Re-enabling for an owner that never disabled is harmless.
        ctx.set_collisions(true, CameraOwner(9));
        assert!(ctx.collisions_enabled());
    }

    #[test]
    fn tracking_and_reset() {
        let mut ctx = CameraSystemContext::new();
        ctx.disable_tracking(CameraOwner(2));
        ctx.disable_tracking(CameraOwner(2));
        assert!(ctx.tracking_disabled());
        ctx.enable_tracking(CameraOwner(2));
        assert!(!ctx.tracking_disabled());

        ctx.disable_tracking(CameraOwner(3));
        ctx.set_collisions(false, CameraOwner(3));
        ctx.reset();
        assert!(!ctx.tracking_disabled());
        assert!(ctx.collisions_enabled());
    }
}
