pub mod camera;
pub mod components;
pub mod entity;
pub mod math;
pub mod render;
pub mod resources;
pub mod scene;
pub mod transform;

pub use camera::{Camera, Viewport};
pub use components::{CameraFollow, RectRenderer, SpriteRenderer};
pub use entity::{Component, Entity};
pub use math::Vec3;
pub use render::{DrawContext, Rect, RenderManager, Sprite};
pub use resources::{ImageData, ImageHandle, ImageLoader, LoadError, ResourceCache};
pub use scene::Scene;
pub use transform::{Transform, TransformRecord, Transformable};
