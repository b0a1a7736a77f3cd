//! Heap measurement for benchmark trials.
//!
//! A [`MemoryProbe`] reads global allocator counters before and after a
//! trial; the difference becomes the trial's [`MemoryUsage`]. Without
//! heap profiling, [`NoMemoryProbe`] reports nothing and records carry
//! `memory: None`.

/// Allocator counters at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySnapshot {
    /// Bytes allocated since profiling started.
    pub total_bytes: u64,
    /// Allocations since profiling started.
    pub total_blocks: u64,
    /// Heap high-water mark in bytes.
    pub max_bytes: u64,
}

/// Memory cost of one trial.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryUsage {
    /// Bytes allocated during the trial.
    pub allocated_bytes: u64,
    /// Number of allocations during the trial.
    pub allocations: u64,
    /// Heap high-water mark reached during the trial.
    ///
    /// Allocator counters only keep a process-wide maximum, so the peak
    /// is known only when the trial raised it. A trial that stayed below
    /// an earlier trial's peak reports `None`.
    pub peak_bytes: Option<u64>,
}

impl MemoryUsage {
    /// Usage between two snapshots taken around a trial.
    pub fn between(before: &MemorySnapshot, after: &MemorySnapshot) -> Self {
        Self {
            allocated_bytes: after.total_bytes.saturating_sub(before.total_bytes),
            allocations: after.total_blocks.saturating_sub(before.total_blocks),
            peak_bytes: (after.max_bytes > before.max_bytes).then_some(after.max_bytes),
        }
    }
}

/// Source of allocator counters.
pub trait MemoryProbe {
    /// Current counters, or `None` when heap profiling is unavailable.
    fn snapshot(&self) -> Option<MemorySnapshot>;
}

/// Probe used when heap profiling is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn snapshot(&self) -> Option<MemorySnapshot> {
        None
    }
}

/// Probe reading `dhat` heap statistics.
///
/// Borrowing the running [`dhat::Profiler`] ties the probe's lifetime to
/// active heap profiling, which `dhat::HeapStats::get` requires.
#[cfg(feature = "dhat-heap")]
#[derive(Debug)]
pub struct DhatProbe<'a> {
    _profiler: &'a dhat::Profiler,
}

#[cfg(feature = "dhat-heap")]
impl<'a> DhatProbe<'a> {
    /// Creates a probe for the given heap profiler.
    pub fn new(profiler: &'a dhat::Profiler) -> Self {
        Self {
            _profiler: profiler,
        }
    }
}

#[cfg(feature = "dhat-heap")]
impl MemoryProbe for DhatProbe<'_> {
    fn snapshot(&self) -> Option<MemorySnapshot> {
        let stats = dhat::HeapStats::get();
        Some(MemorySnapshot {
            total_bytes: stats.total_bytes,
            total_blocks: stats.total_blocks,
            max_bytes: stats.max_bytes as u64,
        })
    }
}
