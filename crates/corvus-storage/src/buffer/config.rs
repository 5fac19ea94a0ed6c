//! Buffer pool configuration.

use corvus_common::constants::MIN_POOL_SIZE;
use corvus_common::DEFAULT_POOL_SIZE;

/// Configuration for one buffer pool instance.
///
/// A deployment may run several instances in parallel, statically
/// partitioning the page-id space: instance `instance_index` of
/// `num_instances` only ever allocates ids congruent to its index modulo
/// `num_instances`.
#[derive(Debug, Clone)]
pub struct BufferPoolConfig {
    /// Number of page frames in this instance.
    pub pool_size: usize,
    /// Total number of parallel pool instances.
    pub num_instances: u32,
    /// Index of this instance, `< num_instances`.
    pub instance_index: u32,
}

impl BufferPoolConfig {
    /// Creates a single-instance configuration with the given frame count.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size,
            num_instances: 1,
            instance_index: 0,
        }
    }

    /// Places this instance inside a group of `num_instances` parallel
    /// pools.
    pub fn with_sharding(mut self, num_instances: u32, instance_index: u32) -> Self {
        self.num_instances = num_instances;
        self.instance_index = instance_index;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.pool_size < MIN_POOL_SIZE {
            return Err("pool_size must be > 0");
        }
        if self.num_instances == 0 {
            return Err("num_instances must be >= 1");
        }
        if self.instance_index >= self.num_instances {
            return Err("instance_index must be < num_instances");
        }
        Ok(())
    }
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_new() {
        let config = BufferPoolConfig::new(128);
        assert_eq!(config.pool_size, 128);
        assert_eq!(config.num_instances, 1);
        assert_eq!(config.instance_index, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_sharding() {
        let config = BufferPoolConfig::new(64).with_sharding(4, 2);
        assert_eq!(config.num_instances, 4);
        assert_eq!(config.instance_index, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(BufferPoolConfig::new(0).validate().is_err());
        assert!(BufferPoolConfig::new(8)
            .with_sharding(0, 0)
            .validate()
            .is_err());
        assert!(BufferPoolConfig::new(8)
            .with_sharding(4, 4)
            .validate()
            .is_err());
    }
}
