//! Built-in components: the typical per-frame consumers of the camera
//! mapping and the render manager
//!
//! Each one resolves its singleton handles once, at construction time.

use std::sync::Mutex;

use anyhow::Result;

use crate::camera::{self, Camera};
use crate::entity::{Component, Entity};
use crate::render::{self, Rect, RenderManager, Sprite};
use crate::transform::Transformable;

/// Re-centers the camera viewport on its entity every update.
pub struct CameraFollow {
    camera: &'static Mutex<Camera>,
}

impl CameraFollow {
    pub fn new() -> Self {
        Self {
            camera: camera::global(),
        }
    }

    #[cfg(test)]
    fn at(camera: &'static Mutex<Camera>) -> Self {
        Self { camera }
    }
}

impl Default for CameraFollow {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for CameraFollow {
    fn update(&mut self, entity: &mut Entity) -> Result<()> {
        self.camera
            .lock()
            .expect("camera lock poisoned")
            .follow(entity);
        Ok(())
    }
}

/// Draws its entity as a filled rectangle in viewport-relative space.
pub struct RectRenderer {
    rect: Rect,
    color: String,
    camera: &'static Mutex<Camera>,
    renderer: &'static Mutex<RenderManager>,
}

impl RectRenderer {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            rect: Rect::new(),
            color: color.into(),
            camera: camera::global(),
            renderer: render::global(),
        }
    }

    #[cfg(test)]
    fn at(
        color: &str,
        camera: &'static Mutex<Camera>,
        renderer: &'static Mutex<RenderManager>,
    ) -> Self {
        Self {
            rect: Rect::new(),
            color: color.to_string(),
            camera,
            renderer,
        }
    }
}

impl Default for RectRenderer {
    fn default() -> Self {
        Self::new("#000")
    }
}

impl Component for RectRenderer {
    fn update(&mut self, entity: &mut Entity) -> Result<()> {
        let mapped = self
            .camera
            .lock()
            .expect("camera lock poisoned")
            .map_transform_in_viewport(entity.get_transform());
        self.rect.set_transform(mapped);
        self.renderer
            .lock()
            .expect("render manager lock poisoned")
            .draw_rect(&self.rect, &self.color);
        Ok(())
    }
}

/// Draws a sprite at its entity's viewport-relative position. Without a
/// sprite the update does nothing.
pub struct SpriteRenderer {
    sprite: Option<Sprite>,
    camera: &'static Mutex<Camera>,
    renderer: &'static Mutex<RenderManager>,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self {
            sprite: None,
            camera: camera::global(),
            renderer: render::global(),
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    /// Resolves the sprite from the resource cache by texture id. No
    /// existence check; an unknown id leaves the sprite drawing as a no-op.
    pub fn with_texture(self, id: &str) -> Self {
        let sprite = self
            .renderer
            .lock()
            .expect("render manager lock poisoned")
            .get_sprite(id);
        self.with_sprite(sprite)
    }

    #[cfg(test)]
    fn at(camera: &'static Mutex<Camera>, renderer: &'static Mutex<RenderManager>) -> Self {
        Self {
            sprite: None,
            camera,
            renderer,
        }
    }
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SpriteRenderer {
    fn update(&mut self, entity: &mut Entity) -> Result<()> {
        let Some(sprite) = self.sprite.as_mut() else {
            return Ok(());
        };
        let mapped = self
            .camera
            .lock()
            .expect("camera lock poisoned")
            .map_transform_in_viewport(entity.get_transform());
        sprite.set_transform(mapped);
        self.renderer
            .lock()
            .expect("render manager lock poisoned")
            .draw_sprite(sprite);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::camera::Viewport;
    use crate::render::recording::{Op, RecordingContext};
    use crate::resources::{ImageData, ImageFuture, ImageLoader, ResourceCache};
    use crate::transform::TransformRecord;

    fn leaked_camera() -> &'static Mutex<Camera> {
        Box::leak(Box::new(Mutex::new(Camera::new())))
    }

    fn leaked_renderer() -> &'static Mutex<RenderManager> {
        Box::leak(Box::new(Mutex::new(RenderManager::new())))
    }

    struct TinyLoader;

    impl ImageLoader for TinyLoader {
        fn fetch(&self, _url: &str) -> ImageFuture {
            Box::pin(async { Ok(ImageData::new(4, 4, Bytes::new())) })
        }
    }

    #[test]
    fn test_camera_follow_recenters_each_update() {
        let camera = leaked_camera();
        camera
            .lock()
            .unwrap()
            .set_viewport(Viewport::new().with_transform(TransformRecord {
                w: 10.0,
                h: 10.0,
                ..Default::default()
            }));

        let mut entity = Entity::new()
            .with_transform(TransformRecord {
                x: 5.0,
                y: 5.0,
                w: 5.0,
                h: 5.0,
                ..Default::default()
            })
            .with_component(CameraFollow::at(camera));

        entity.update().unwrap();

        let v = camera.lock().unwrap().viewport().get_transform();
        assert_eq!((v.x, v.y), (2.5, 2.5));
    }

    #[test]
    fn test_rect_renderer_draws_viewport_relative() {
        let camera = leaked_camera();
        camera
            .lock()
            .unwrap()
            .set_viewport(Viewport::new().with_transform(TransformRecord {
                x: 5.0,
                y: 5.0,
                w: 20.0,
                h: 20.0,
                ..Default::default()
            }));

        let renderer = leaked_renderer();
        let (ctx, ops) = RecordingContext::new(64.0, 64.0);
        renderer.lock().unwrap().set_context(ctx);

        let mut entity = Entity::new()
            .with_transform(TransformRecord {
                x: 7.0,
                y: 7.0,
                w: 2.0,
                h: 2.0,
                ..Default::default()
            })
            .with_component(RectRenderer::at("#0a0", camera, renderer));

        entity.update().unwrap();

        assert_eq!(
            *ops.lock().unwrap(),
            vec![
                Op::Save,
                Op::FillStyle("#0a0".to_string()),
                Op::FillRect(2.0, 2.0, 2.0, 2.0),
                Op::Restore,
            ]
        );
    }

    #[tokio::test]
    async fn test_sprite_renderer_draws_its_sprite() {
        let cache = ResourceCache::new();
        cache
            .load(&TinyLoader, &[("dot".to_string(), "dot.png".to_string())])
            .await
            .unwrap();

        let camera = leaked_camera();
        let renderer = leaked_renderer();
        let (ctx, ops) = RecordingContext::new(64.0, 64.0);
        renderer.lock().unwrap().set_context(ctx);

        let mut sprite = Sprite::new();
        sprite.set_image(cache.get("dot").unwrap());

        let mut entity = Entity::new()
            .with_transform(TransformRecord {
                x: 3.0,
                y: 4.0,
                w: 8.0,
                h: 8.0,
                ..Default::default()
            })
            .with_component(SpriteRenderer::at(camera, renderer).with_sprite(sprite));

        entity.update().unwrap();

        assert_eq!(
            *ops.lock().unwrap(),
            vec![Op::DrawImage {
                src: (0.0, 0.0, 4.0, 4.0),
                dst: (3.0, 4.0, 8.0, 8.0),
            }]
        );
    }

    #[test]
    fn test_sprite_renderer_without_sprite_is_a_no_op() {
        let camera = leaked_camera();
        let renderer = leaked_renderer();
        let mut entity = Entity::new().with_component(SpriteRenderer::at(camera, renderer));
        entity.update().unwrap();
    }
}
