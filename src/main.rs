use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use diorama::resources::ImageFuture;
use diorama::{
    camera, render, resources, CameraFollow, Component, DrawContext, Entity, ImageData,
    ImageLoader, RectRenderer, Scene, SpriteRenderer, TransformRecord, Transformable, Viewport,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "diorama demo scene runner")]
struct Cli {
    /// Number of frames to run
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Surface width in pixels
    #[arg(long, default_value_t = 320.0)]
    width: f64,

    /// Surface height in pixels
    #[arg(long, default_value_t = 240.0)]
    height: f64,

    /// Number of scattered sprite entities
    #[arg(long, default_value_t = 8)]
    shrubs: usize,

    /// Seed for entity placement
    #[arg(long, default_value_t = 7)]
    seed: u64,
}

/// Headless surface: swallows every call and counts the actual draws.
struct CountingContext {
    size: (f64, f64),
    draw_calls: Arc<AtomicUsize>,
}

impl DrawContext for CountingContext {
    fn surface_size(&self) -> (f64, f64) {
        self.size
    }

    fn save(&mut self) {}

    fn restore(&mut self) {}

    fn set_fill_style(&mut self, _color: &str) {}

    fn clear_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) {}

    fn fill_rect(&mut self, _x: f64, _y: f64, _w: f64, _h: f64) {
        self.draw_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn draw_image(
        &mut self,
        _image: &ImageData,
        _sx: f64,
        _sy: f64,
        _sw: f64,
        _sh: f64,
        _dx: f64,
        _dy: f64,
        _dw: f64,
        _dh: f64,
    ) {
        self.draw_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Stands in for the platform image decoder: every url yields a 16x16 tile.
struct StubLoader;

impl ImageLoader for StubLoader {
    fn fetch(&self, _url: &str) -> ImageFuture {
        Box::pin(async {
            let pixels = Bytes::from(vec![0xff; 16 * 16 * 4]);
            Ok(ImageData::new(16, 16, pixels))
        })
    }
}

/// Walks its entity east a fixed step per frame.
struct Patrol {
    step: f64,
}

impl Component for Patrol {
    fn update(&mut self, entity: &mut Entity) -> Result<()> {
        let moved = entity.map_transform(|record| TransformRecord {
            x: record.x + self.step,
            ..record
        });
        entity.set_transform(moved);
        Ok(())
    }
}

#[derive(Serialize)]
struct FrameLine {
    frame: u64,
    player: TransformRecord,
    draw_calls: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let draw_calls = Arc::new(AtomicUsize::new(0));
    render::global()
        .lock()
        .expect("render manager lock poisoned")
        .set_context(CountingContext {
            size: (cli.width, cli.height),
            draw_calls: draw_calls.clone(),
        });
    camera::global()
        .lock()
        .expect("camera lock poisoned")
        .set_viewport(Viewport::new().with_transform(TransformRecord {
            w: cli.width,
            h: cli.height,
            ..Default::default()
        }));

    resources::global()
        .load(
            &StubLoader,
            &[("shrub".to_string(), "stub://shrub".to_string())],
        )
        .await?;

    let mut rng = ChaCha8Rng::seed_from_u64(cli.seed);
    let mut scene = Scene::new();
    for _ in 0..cli.shrubs {
        scene.add_entity(
            Entity::new()
                .with_transform(TransformRecord {
                    x: rng.gen_range(0.0..cli.width),
                    y: rng.gen_range(0.0..cli.height),
                    w: 16.0,
                    h: 16.0,
                    ..Default::default()
                })
                .with_component(SpriteRenderer::new().with_texture("shrub")),
        );
    }
    scene.add_entity(
        Entity::new()
            .with_transform(TransformRecord {
                x: 10.0,
                y: 10.0,
                w: 12.0,
                h: 12.0,
                ..Default::default()
            })
            .with_component(Patrol { step: 4.0 })
            .with_component(CameraFollow::new())
            .with_component(RectRenderer::new("#3a6")),
    );

    for frame in 0..cli.frames {
        render::global()
            .lock()
            .expect("render manager lock poisoned")
            .clear();
        scene.update()?;

        let player = scene
            .entities()
            .last()
            .expect("scene has entities")
            .get_transform();
        let line = FrameLine {
            frame,
            player,
            draw_calls: draw_calls.swap(0, Ordering::SeqCst),
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    println!(
        "Scene completed after {} frames with {} entities.",
        cli.frames,
        scene.entities().len()
    );
    Ok(())
}
