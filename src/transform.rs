//! Position/size state and the capability trait that exposes it as a flat
//! coordinate record

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Flat snapshot of a transform. Always total: a field that was never set is
/// simply 0. Partial updates use struct-update syntax, e.g.
/// `TransformRecord { x: 1.0, ..Default::default() }`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
    pub h: f64,
}

/// Position and size of a drawable or entity. The size vector is read as
/// width/height through its x/y components; its z is unused.
///
/// Every transform owns its vectors. Construction allocates fresh ones, so no
/// two independently created objects can alias default state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transform {
    position: Vec3,
    size: Vec3,
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Vec3 {
        &self.position
    }

    pub fn position_mut(&mut self) -> &mut Vec3 {
        &mut self.position
    }

    pub fn size(&self) -> &Vec3 {
        &self.size
    }

    pub fn size_mut(&mut self) -> &mut Vec3 {
        &mut self.size
    }

    pub fn record(&self) -> TransformRecord {
        TransformRecord {
            x: self.position.x,
            y: self.position.y,
            z: self.position.z,
            w: self.size.x,
            h: self.size.y,
        }
    }

    /// Replaces both vectors wholesale with freshly built ones. This is not a
    /// merge: an axis the record leaves at its default resets to 0.
    pub fn set_record(&mut self, record: TransformRecord) {
        self.position = Vec3::new(record.x, record.y, record.z);
        self.size = Vec3::new(record.w, record.h, 0.0);
    }
}

/// Capability trait for anything carrying a [`Transform`]. Implementors
/// provide the two accessors; the record operations come for free.
pub trait Transformable {
    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    /// Snapshot of the current transform; every field present, absent state
    /// reads as 0.
    fn get_transform(&self) -> TransformRecord {
        self.transform().record()
    }

    /// Wholesale replacement. See [`Transform::set_record`]: replace, never
    /// merge. Behaviors like the camera mapping rely on z/w/h surviving only
    /// when explicitly carried through.
    fn set_transform(&mut self, record: TransformRecord) {
        self.transform_mut().set_record(record);
    }

    /// Applies `f` to the current snapshot and returns its result. Pure read:
    /// the transform itself is untouched unless the caller feeds the result
    /// back through [`Transformable::set_transform`].
    fn map_transform<T>(&self, f: impl FnOnce(TransformRecord) -> T) -> T
    where
        Self: Sized,
    {
        f(self.get_transform())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        transform: Transform,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                transform: Transform::new(),
            }
        }
    }

    impl Transformable for Probe {
        fn transform(&self) -> &Transform {
            &self.transform
        }

        fn transform_mut(&mut self) -> &mut Transform {
            &mut self.transform
        }
    }

    #[test]
    fn test_default_transform_is_all_zero() {
        let probe = Probe::new();
        assert_eq!(probe.get_transform(), TransformRecord::default());
    }

    #[test]
    fn test_record_round_trip() {
        let mut probe = Probe::new();
        let record = TransformRecord {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            w: 4.0,
            h: 5.0,
        };
        probe.set_transform(record);
        assert_eq!(probe.get_transform(), record);
    }

    #[test]
    fn test_set_transform_replaces_rather_than_merges() {
        let mut probe = Probe::new();
        probe.set_transform(TransformRecord {
            x: 1.0,
            z: 7.0,
            w: 10.0,
            ..Default::default()
        });
        probe.set_transform(TransformRecord {
            y: 2.0,
            ..Default::default()
        });

        let record = probe.get_transform();
        assert_eq!(record.x, 0.0);
        assert_eq!(record.y, 2.0);
        assert_eq!(record.z, 0.0);
        assert_eq!(record.w, 0.0);
        assert_eq!(record.h, 0.0);
    }

    #[test]
    fn test_set_record_rebuilds_the_vectors() {
        let mut transform = Transform::new();
        let before = *transform.position();
        transform.set_record(TransformRecord {
            x: 3.0,
            ..Default::default()
        });
        assert_eq!(before, Vec3::default());
        assert_eq!(*transform.position(), Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_map_transform_does_not_mutate() {
        let mut probe = Probe::new();
        probe.set_transform(TransformRecord {
            x: 1.0,
            y: 1.0,
            ..Default::default()
        });

        let doubled = probe.map_transform(|record| TransformRecord {
            x: record.x * 2.0,
            y: record.y * 2.0,
            ..record
        });

        assert_eq!(doubled.x, 2.0);
        assert_eq!(probe.get_transform().x, 1.0);

        probe.set_transform(doubled);
        assert_eq!(probe.get_transform().x, 2.0);
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let mut a = Probe::new();
        let b = Probe::new();
        a.set_transform(TransformRecord {
            x: 1.0,
            ..Default::default()
        });
        assert_eq!(b.get_transform().x, 0.0);
    }
}
