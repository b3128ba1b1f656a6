//! Scenes drive the per-frame update cascade over their entities

use anyhow::Result;

use crate::entity::Entity;

/// An ordered collection of entities. Append-only; insertion order is update
/// order.
#[derive(Default)]
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Scene::add_entity`].
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    /// Updates every entity in insertion order. Fail-fast like the entity
    /// cascade: the first failing entity halts the rest and the error
    /// propagates to the frame driver.
    pub fn update(&mut self) -> Result<()> {
        self.entities.iter_mut().try_for_each(Entity::update)
    }
}
