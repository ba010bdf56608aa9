/// Article identifiers are positive 64-bit integers.
pub type ArticleId = i64;

/// Monotonically increasing article revision, starting at 1.
pub type Revision = i32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
