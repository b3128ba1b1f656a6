//! Drawing over an external 2D context
//!
//! The surface itself is a collaborator behind [`DrawContext`]; the manager
//! only sequences calls against it. Guard policy is uniform: every drawing
//! operation, `clear` included, is a silent no-op while no context is set.

use std::sync::Mutex;

use lazy_static::lazy_static;

use crate::resources::{self, ImageData, ImageHandle};
use crate::transform::{Transform, Transformable, TransformRecord};

/// The external drawing surface: a canvas-shaped 2D context. `save`/`restore`
/// scope state changes such as the fill style; `surface_size` is the full
/// drawable area in pixels.
pub trait DrawContext: Send {
    fn surface_size(&self) -> (f64, f64);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_fill_style(&mut self, color: &str);
    fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    #[allow(clippy::too_many_arguments)]
    fn draw_image(
        &mut self,
        image: &ImageData,
        sx: f64,
        sy: f64,
        sw: f64,
        sh: f64,
        dx: f64,
        dy: f64,
        dw: f64,
        dh: f64,
    );
}

/// A fillable axis-aligned rectangle; nothing beyond its transform.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rect {
    transform: Transform,
}

impl Rect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(mut self, record: TransformRecord) -> Self {
        self.set_transform(record);
        self
    }
}

impl Transformable for Rect {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

/// A positioned image. The handle may be absent (id never registered) or
/// still pending; drawing such a sprite does nothing.
#[derive(Debug, Clone, Default)]
pub struct Sprite {
    transform: Transform,
    image: Option<ImageHandle>,
}

impl Sprite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(mut self, record: TransformRecord) -> Self {
        self.set_transform(record);
        self
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, handle: ImageHandle) {
        self.image = Some(handle);
    }
}

impl Transformable for Sprite {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

/// Holds the active drawing context and issues draw calls against it.
/// Process-wide instance behind [`global`]; stateless apart from the context.
#[derive(Default)]
pub struct RenderManager {
    ctx: Option<Box<dyn DrawContext>>,
}

impl RenderManager {
    /// Starts without a context; drawing is a no-op until one is set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_context(&mut self, ctx: impl DrawContext + 'static) {
        self.ctx = Some(Box::new(ctx));
    }

    pub fn has_context(&self) -> bool {
        self.ctx.is_some()
    }

    /// Clears the full surface rectangle.
    pub fn clear(&mut self) {
        let Some(ctx) = self.ctx.as_deref_mut() else {
            return;
        };
        let (width, height) = ctx.surface_size();
        ctx.clear_rect(0.0, 0.0, width, height);
    }

    /// Fills the rect at its transform. Scoped: the fill style is set between
    /// `save` and `restore`, so the surrounding context state survives.
    pub fn draw_rect(&mut self, rect: &Rect, color: &str) {
        let Some(ctx) = self.ctx.as_deref_mut() else {
            return;
        };
        let record = rect.get_transform();
        ctx.save();
        ctx.set_fill_style(color);
        ctx.fill_rect(record.x, record.y, record.w, record.h);
        ctx.restore();
    }

    /// Blits the sprite's full source image into its transform rectangle.
    /// No-op while the image is absent, pending or failed.
    pub fn draw_sprite(&mut self, sprite: &Sprite) {
        let Some(ctx) = self.ctx.as_deref_mut() else {
            return;
        };
        let Some(handle) = sprite.image() else {
            return;
        };
        let record = sprite.get_transform();
        handle.with_data(|image| {
            let (sw, sh) = (f64::from(image.width), f64::from(image.height));
            ctx.draw_image(
                image, 0.0, 0.0, sw, sh, record.x, record.y, record.w, record.h,
            );
        });
    }

    /// Builds a fresh sprite whose image is resolved from the shared resource
    /// cache. No existence check: an unknown id yields a sprite without an
    /// image, which draws as a no-op.
    pub fn get_sprite(&self, id: &str) -> Sprite {
        Sprite {
            transform: Transform::new(),
            image: resources::global().get(id),
        }
    }
}

lazy_static! {
    static ref RENDER_MANAGER: Mutex<RenderManager> = Mutex::new(RenderManager::new());
}

/// The shared render manager, created lazily on first access and alive for
/// the process lifetime.
pub fn global() -> &'static Mutex<RenderManager> {
    &RENDER_MANAGER
}
