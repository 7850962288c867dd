//! Configuration utilities for the entity component runtime and your game.

use semver::Version;

/// Number of component types a world can hold unless configured otherwise.
pub const DEFAULT_MAX_COMPONENT_TYPES: usize = 256;

/// This struct represents general configuration of the runtime.
#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    version: Version,
    max_component_types: usize,
}

pub const ENGINE_NAME: &str = env!("CARGO_CRATE_NAME", "library must be compiled by Cargo");

const ENGINE_VERSION_STR: &str = env!("CARGO_PKG_VERSION", "library must be compiled by Cargo");
lazy_static::lazy_static! {
    pub static ref ENGINE_VERSION: Version = ENGINE_VERSION_STR.parse().unwrap();
}

impl Config {
    /// Creates new configuration with given name, version and default limits.
    pub const fn new(name: String, version: Version) -> Self {
        Self {
            name,
            version,
            max_component_types: DEFAULT_MAX_COMPONENT_TYPES,
        }
    }

    /// Sets how many component types can be registered.
    pub fn with_max_component_types(mut self, max_component_types: usize) -> Self {
        self.max_component_types = max_component_types;
        self
    }

    /// Name of your game.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semver version of your game.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// How many component types can be registered.
    pub fn max_component_types(&self) -> usize {
        self.max_component_types
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("Hello World".to_string(), Version::new(0, 0, 0))
    }
}
