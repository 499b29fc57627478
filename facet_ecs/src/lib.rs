use hecs::{ComponentError, DynamicBundle, Query, QueryBorrow, Ref, World as HecsWorld};
use std::collections::HashMap;

pub use hecs::{CommandBuffer, Component, Entity, EntityBuilder, NoSuchEntity};

/// Node store for a loaded scene.
///
/// Every scene node is an entity; its fields and render outputs are
/// components. Nodes may be registered under a `DEF` name so later `USE`
/// sites can resolve them once while the scene is being built.
pub struct World {
    world: HecsWorld,
    defs: HashMap<String, Entity>,
}

/// Name a node was registered under.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DefName(pub String);

impl World {
    pub fn new() -> Self {
        Self {
            world: HecsWorld::new(),
            defs: HashMap::new(),
        }
    }

    pub fn get(&self) -> &HecsWorld {
        &self.world
    }

    pub fn get_mut(&mut self) -> &mut HecsWorld {
        &mut self.world
    }

    pub fn spawn(&mut self, components: impl DynamicBundle) -> Entity {
        self.world.spawn(components)
    }

    /// Spawns a node and registers it under `name`. A later registration
    /// with the same name shadows the earlier one.
    pub fn spawn_def(&mut self, name: &str, components: impl DynamicBundle) -> Entity {
        let entity = self.world.spawn(components);
        let _ = self.world.insert_one(entity, DefName(name.to_owned()));
        self.defs.insert(name.to_owned(), entity);
        entity
    }

    pub fn lookup_def(&self, name: &str) -> Option<Entity> {
        self.defs
            .get(name)
            .copied()
            .filter(|entity| self.world.contains(*entity))
    }

    pub fn despawn(&mut self, entity: Entity) -> Result<(), NoSuchEntity> {
        if let Ok(name) = self.world.get::<&DefName>(entity) {
            if self.defs.get(&name.0) == Some(&entity) {
                let key = name.0.clone();
                drop(name);
                self.defs.remove(&key);
            }
        }
        self.world.despawn(entity)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    pub fn query<Q: Query>(&self) -> QueryBorrow<'_, Q> {
        self.world.query::<Q>()
    }

    pub fn component<T: Component>(&self, entity: Entity) -> Result<Ref<'_, T>, ComponentError> {
        self.world.get::<&T>(entity)
    }

    pub fn insert_one(
        &mut self,
        entity: Entity,
        component: impl Component,
    ) -> Result<(), NoSuchEntity> {
        self.world.insert_one(entity, component)
    }

    pub fn remove_one<T: Component>(&mut self, entity: Entity) -> Result<T, ComponentError> {
        self.world.remove_one::<T>(entity)
    }

    pub fn run_commands(&mut self, commands: &mut CommandBuffer) {
        commands.run_on(&mut self.world);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(u32);

    #[test]
    fn def_names_resolve_until_despawned() {
        let mut world = World::new();
        let entity = world.spawn_def("Box", (Marker(7),));

        assert_eq!(world.lookup_def("Box"), Some(entity));
        assert_eq!(world.component::<Marker>(entity).unwrap().0, 7);

        world.despawn(entity).unwrap();
        assert_eq!(world.lookup_def("Box"), None);
    }

    #[test]
    fn redefinition_shadows_previous_node() {
        let mut world = World::new();
        let first = world.spawn_def("Shape", (Marker(1),));
        let second = world.spawn_def("Shape", (Marker(2),));

        assert_eq!(world.lookup_def("Shape"), Some(second));

        world.despawn(first).unwrap();
        assert_eq!(world.lookup_def("Shape"), Some(second));
    }
}
