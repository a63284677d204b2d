//! Construction parameters for `Dictionary` and `DefaultDict`.

use crate::error::DictError;

/// Slot count of a freshly built dictionary.
pub const DEFAULT_CAPACITY: usize = 4;

/// Factor applied to the capacity on every growth.
pub const DEFAULT_GROWTH_MULTIPLIER: usize = 2;

/// Initial capacity and growth policy of a dictionary.
///
/// ```
/// use slot_dict::{DictConfig, Dictionary};
///
/// let config = DictConfig::default().initial_capacity(16).growth_multiplier(3);
/// let d: Dictionary<&str, i32> = Dictionary::with_config(config).unwrap();
/// assert_eq!(d.capacity(), 16);
/// assert_eq!(d.growth_multiplier(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictConfig {
    pub initial_capacity: usize,
    pub growth_multiplier: usize,
}

impl DictConfig {
    pub const fn new() -> Self {
        Self {
            initial_capacity: DEFAULT_CAPACITY,
            growth_multiplier: DEFAULT_GROWTH_MULTIPLIER,
        }
    }

    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub const fn growth_multiplier(mut self, multiplier: usize) -> Self {
        self.growth_multiplier = multiplier;
        self
    }

    /// Reject configurations that could never hold an entry or never grow.
    pub fn validate(&self) -> Result<(), DictError> {
        if self.initial_capacity == 0 {
            return Err(DictError::ZeroCapacity);
        }
        if self.growth_multiplier < 2 {
            return Err(DictError::GrowthMultiplierTooSmall {
                multiplier: self.growth_multiplier,
            });
        }
        Ok(())
    }
}

impl Default for DictConfig {
    fn default() -> Self {
        Self::new()
    }
}
