//! Registry configuration

/// Configuration for the consumer registry
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Initial slot capacity
    ///
    /// Capacity doubles whenever the table fills up and never shrinks
    /// while the registry is alive. Values below 2 are raised to 2.
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 2,
        }
    }
}

impl RegistryConfig {
    /// Set the initial slot capacity
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
