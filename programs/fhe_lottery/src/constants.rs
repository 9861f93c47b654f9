// Centralized Lottery Constants

// Round timing
// ============

/// Length of the ticket sale window. A round opens at creation and closes
/// this many seconds later.
pub const ROUND_DURATION_SECS: i64 = 15 * 24 * 60 * 60;

/// Default grace period after a draw before unclaimed prizes may be swept.
pub const DEFAULT_CLAIM_GRACE_SECS: i64 = 30 * 24 * 60 * 60;

// Ticket shape
// ============

/// Numbers on every ticket and in every draw.
pub const NUMBERS_PER_TICKET: usize = 6;

/// Inclusive range every number must lie in.
pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 49;

// Capacity
// ========

/// Upper bound on tickets per round. A draw loads every ticket account of the
/// round in one transaction, so this stays below the per-transaction account lock limit.
pub const MAX_TICKETS_PER_ROUND: usize = 48;

/// Maximum round name length in bytes.
pub const MAX_ROUND_NAME_LEN: usize = 64;

// Accounts
// ========

/// Initial version for account structures.
pub const INITIAL_VERSION: u16 = 1;

/// Starting round ID for a new registry.
pub const INITIAL_ROUND_ID: u64 = 0;
