//! The capability contract between device adapters and the input logger.

use super::table::LogTable;

/// Implemented by every hardware-input struct that participates in
/// capture/replay.
///
/// Both operations are total: `to_log` writes every observable field under
/// fixed human-readable keys, and `from_log` reads every field back using
/// the *current in-memory value* as the default. A field absent from an
/// older log therefore keeps whatever value it already had (typically the
/// previous cycle's reading), rather than resetting to a type zero. That
/// asymmetry is a deliberate replay-stability choice.
pub trait LoggableInputs {
    /// Serialize every observable field into `table`.
    fn to_log(&self, table: &mut LogTable);

    /// Repopulate every field from `table`, keeping the current value for
    /// any key that is missing or mistyped.
    fn from_log(&mut self, table: &LogTable);
}
