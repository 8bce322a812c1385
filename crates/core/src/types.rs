use chrono::{DateTime, Utc};

/// UTC timestamp used across every domain type.
pub type Timestamp = DateTime<Utc>;

/// Problem identifiers are small positive integers (1-based).
pub type ProblemId = u32;
