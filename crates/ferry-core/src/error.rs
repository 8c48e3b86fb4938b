//! Error types for the state assembler.

use thiserror::Error;

/// Errors the assembler's public surface can return.
///
/// The assembler never propagates upstream trouble as an error. It
/// degrades and reports the degradation in `Snapshot.meta`. The only
/// error that escapes `build_snapshot` is an unknown route.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("unknown route: {0}")]
    UnknownRoute(u32),
}
