//! Object pool configuration.

use crate::error::PoolError;

/// Whether a pool may create instances beyond its initial fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Growth {
    /// Exhaustion is reported by `allocate()` returning `None`.
    Fixed,
    /// The factory is called when no instance is available.
    #[default]
    Growable,
}

/// Sizing for an [`ObjectPool`](crate::ObjectPool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Instances created up front. Default: 64.
    pub initial: usize,
    /// Growth policy once the initial instances are all allocated.
    pub growth: Growth,
}

impl PoolConfig {
    /// Default number of pre-created instances.
    pub const DEFAULT_INITIAL: usize = 64;

    /// Check structural invariants.
    ///
    /// A fixed pool with no instances can never satisfy an allocation.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.initial == 0 && self.growth == Growth::Fixed {
            return Err(PoolError::ZeroCapacity);
        }
        if u32::try_from(self.initial).is_err() {
            return Err(PoolError::CapacityOverflow {
                requested: self.initial,
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial: Self::DEFAULT_INITIAL,
            growth: Growth::Growable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sixty_four_growable() {
        let c = PoolConfig::default();
        assert_eq!(c.initial, 64);
        assert_eq!(c.growth, Growth::Growable);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn empty_fixed_pool_is_rejected() {
        let c = PoolConfig {
            initial: 0,
            growth: Growth::Fixed,
        };
        assert_eq!(c.validate(), Err(PoolError::ZeroCapacity));
    }

    #[test]
    fn empty_growable_pool_is_fine() {
        let c = PoolConfig {
            initial: 0,
            growth: Growth::Growable,
        };
        assert!(c.validate().is_ok());
    }
}
