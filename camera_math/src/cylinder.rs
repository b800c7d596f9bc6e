use rapier3d::math::Vector;
use rapier3d::prelude::Real;

use crate::angle::wrap_angle;

/// Camera placement around a subject: horizontal distance, height and azimuth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CylinderCoords {
    pub distance: Real,
    pub height: Real,
    pub azimuth: Real,
}

/// Which components are measured in world space instead of relative to the subject.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CylinderFrame {
    /// Height is absolute rather than above the subject.
    pub world_height: bool,
    /// Azimuth is a world heading rather than relative to the subject's facing.
    pub world_azimuth: bool,
}

impl CylinderFrame {
    pub fn world_azimuth(&self, azimuth: Real, subject_heading: Real) -> Real {
        if self.world_azimuth {
            azimuth
        } else {
            azimuth + subject_heading
        }
    }

    pub fn to_world(
        &self,
        coords: CylinderCoords,
        subject: &Vector<Real>,
        subject_heading: Real,
    ) -> Vector<Real> {
        let y = if self.world_height {
            coords.height
        } else {
            coords.height + subject.y
        };
        let azimuth = self.world_azimuth(coords.azimuth, subject_heading);
        Vector::new(
            coords.distance * azimuth.sin() + subject.x,
            y,
            coords.distance * azimuth.cos() + subject.z,
        )
    }

    pub fn from_world(
        &self,
        position: &Vector<Real>,
        subject: &Vector<Real>,
        subject_heading: Real,
    ) -> CylinderCoords {
        let dx = position.x - subject.x;
        let dz = position.z - subject.z;
        let distance = (dx * dx + dz * dz).sqrt();
        let height = if self.world_height {
            position.y
        } else {
            position.y - subject.y
        };
        let heading = if dx == 0.0 && dz == 0.0 {
            0.0
        } else {
            dx.atan2(dz)
        };
        let azimuth = if self.world_azimuth {
            wrap_angle(heading)
        } else {
            wrap_angle(heading - subject_heading)
        };
        CylinderCoords {
            distance,
            height,
            azimuth,
        }
    }
}
