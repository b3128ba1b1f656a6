//! Entities and the component behaviors attached to them

use anyhow::Result;

use crate::transform::{Transform, Transformable, TransformRecord};

/// A behavior unit attached to exactly one entity, invoked once per update
/// cycle. The owning entity is passed into every call; components never own
/// or outlive their entity.
pub trait Component {
    /// Per-frame hook. The default does nothing.
    fn update(&mut self, entity: &mut Entity) -> Result<()> {
        let _ = entity;
        Ok(())
    }
}

/// A positioned scene object owning an ordered list of components.
/// Insertion order is update order.
#[derive(Default)]
pub struct Entity {
    transform: Transform,
    components: Vec<Box<dyn Component>>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Entity::set_transform`].
    pub fn with_transform(mut self, record: TransformRecord) -> Self {
        self.set_transform(record);
        self
    }

    /// Builder form of [`Entity::add_component`].
    pub fn with_component(mut self, component: impl Component + 'static) -> Self {
        self.components.push(Box::new(component));
        self
    }

    /// Appends a component; chainable.
    pub fn add_component(&mut self, component: impl Component + 'static) -> &mut Self {
        self.components.push(Box::new(component));
        self
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Runs every component in insertion order, handing each one a mutable
    /// view of this entity. Fail-fast: the first error halts the remaining
    /// updates and propagates. The component list is detached for the
    /// duration of the cascade and restored afterwards, error or not.
    pub fn update(&mut self) -> Result<()> {
        let mut components = std::mem::take(&mut self.components);
        let result = components
            .iter_mut()
            .try_for_each(|component| component.update(self));
        // Components attached during the cascade land behind the existing ones.
        components.append(&mut self.components);
        self.components = components;
        result
    }
}

impl Transformable for Entity {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}
