//! Memory probing for batch sizing
//!
//! Batch capacity is a soft upper bound on how many randomized copies of an
//! artifact fit in memory at once:
//! `available / artifact_size / safety_factor`, with
//! `available = max - (total - free)`.

use sysinfo::System;

/// Read-only memory figures in bytes
pub trait MemoryProbe {
    /// Most memory the process may use
    fn max_memory(&self) -> u64;

    /// Memory currently reserved
    fn total_memory(&self) -> u64;

    /// Unused part of the reserved memory
    fn free_memory(&self) -> u64;

    /// Memory still obtainable
    fn available_memory(&self) -> u64 {
        let used = self.total_memory().saturating_sub(self.free_memory());
        self.max_memory().saturating_sub(used)
    }
}

/// Host memory as reported by the operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemMemory {
    total: u64,
    available: u64,
}

impl SystemMemory {
    /// Query the host
    #[must_use]
    pub fn refresh() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        let memory = Self {
            total: system.total_memory(),
            available: system.available_memory(),
        };
        tracing::debug!(
            "Host memory: {} bytes total, {} bytes available",
            memory.total,
            memory.available
        );
        memory
    }
}

impl MemoryProbe for SystemMemory {
    fn max_memory(&self) -> u64 {
        self.total
    }

    fn total_memory(&self) -> u64 {
        self.total
    }

    fn free_memory(&self) -> u64 {
        self.available
    }
}

/// `available / file_size / safety_factor`, or 0 when either divisor is 0
#[inline]
#[must_use]
pub fn batch_capacity(available: u64, file_size: u64, safety_factor: u64) -> u64 {
    available
        .checked_div(file_size)
        .and_then(|per_file| per_file.checked_div(safety_factor))
        .unwrap_or(0)
}
