//! Human-readable dump of the state of the world.

use std::fmt;

use super::{ComponentManager, EntityRegistry, Scheduler, Signature, SignatureIndex};

/// Lists component bits, entity signatures and entity sets of systems.
///
/// Created by [`World::signature_report`](super::World::signature_report).
///
pub struct SignatureReport<'w> {
    entities: &'w EntityRegistry,
    components: &'w ComponentManager,
    index: &'w SignatureIndex,
    scheduler: &'w Scheduler,
}

impl<'w> SignatureReport<'w> {
    pub(crate) fn new(
        entities: &'w EntityRegistry,
        components: &'w ComponentManager,
        index: &'w SignatureIndex,
        scheduler: &'w Scheduler,
    ) -> Self {
        Self {
            entities,
            components,
            index,
            scheduler,
        }
    }

    fn names(&self, signature: &Signature) -> String {
        let names: Vec<_> = signature
            .iter()
            .map(|component| self.components.name(component).unwrap_or("?"))
            .collect();
        if names.is_empty() {
            "none".to_string()
        } else {
            names.join(", ")
        }
    }
}

impl fmt::Display for SignatureReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} component types", self.components.len())?;
        for (component, name) in self.components.registered() {
            writeln!(f, "  {} -> bit {}", name, component.index())?;
        }

        writeln!(f, "{} entities", self.entities.len())?;
        for (entity, signature) in self.entities.iter() {
            writeln!(f, "  {:?} -> {} [{}]", entity, signature, self.names(signature))?;
        }

        writeln!(f, "{} systems", self.scheduler.len())?;
        for id in self.scheduler.ids() {
            let name = self.scheduler.name(id).unwrap_or("?");
            let (required, entities) = match (self.index.required(id), self.index.entities(id)) {
                (Ok(required), Ok(entities)) => (required, entities),
                _ => continue,
            };
            let entities: Vec<_> = entities.iter().map(|entity| format!("{:?}", entity)).collect();
            writeln!(
                f,
                "  {} -> {} [{}]: {}",
                name,
                required,
                self.names(required),
                if entities.is_empty() {
                    "none".to_string()
                } else {
                    entities.join(", ")
                },
            )?;
        }
        Ok(())
    }
}
