//! Constants used throughout the execution core.

/// The fixed row cap for every `DataChunk` that flows through the runner.
pub const STANDARD_VECTOR_SIZE: usize = 2048;

/// Sentinel for "no column"/"no index" in places that use `usize` slots.
pub const INVALID_INDEX: usize = usize::MAX;

/// Sentinel for "no column" in places that index by column.
pub const INVALID_COLUMN: usize = usize::MAX;

/// Upper bound on a single VARCHAR/BLOB value's byte length.
pub const MAX_STRING_LENGTH: usize = 1 << 30;

/// Upper bound on a single LIST value's element count.
pub const MAX_LIST_LENGTH: usize = 1 << 30;
