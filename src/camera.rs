//! Viewport-relative coordinate mapping and target following

use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::transform::{Transform, Transformable, TransformRecord};

/// A rectangular region of visible space. Nothing beyond its transform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Viewport {
    transform: Transform,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(mut self, record: TransformRecord) -> Self {
        self.set_transform(record);
        self
    }
}

impl Transformable for Viewport {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

/// Maps world coordinates into view-relative ones and can re-center its
/// viewport on a target. Process-wide instance behind [`global`]; plain
/// instances are constructible for direct use.
#[derive(Debug, Default)]
pub struct Camera {
    viewport: Viewport,
}

impl Camera {
    /// Starts with a zero-transform viewport.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Replaces the viewport wholesale; chainable.
    pub fn set_viewport(&mut self, viewport: Viewport) -> &mut Self {
        self.viewport = viewport;
        self
    }

    /// Re-centers the viewport on the target: the viewport midpoint moves to
    /// the target midpoint on both axes. The viewport's z, w and h are
    /// preserved. Pure centering, no clamping to any bounds.
    pub fn follow<T: Transformable>(&mut self, target: &T) -> &mut Self {
        let t = target.get_transform();
        let v = self.viewport.get_transform();
        self.viewport.set_transform(TransformRecord {
            x: t.x + t.w / 2.0 - v.w / 2.0,
            y: t.y + t.h / 2.0 - v.h / 2.0,
            ..v
        });
        self
    }

    /// Translates a record into viewport-relative space: x/y shift by the
    /// viewport origin, z/w/h pass through unchanged.
    pub fn map_transform_in_viewport(&self, record: TransformRecord) -> TransformRecord {
        let v = self.viewport.get_transform();
        TransformRecord {
            x: record.x - v.x,
            y: record.y - v.y,
            ..record
        }
    }
}

lazy_static! {
    static ref CAMERA: Mutex<Camera> = Mutex::new(Camera::new());
}

/// The shared camera, created lazily on first access and alive for the
/// process lifetime.
pub fn global() -> &'static Mutex<Camera> {
    &CAMERA
}
