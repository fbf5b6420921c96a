use thiserror::Error;

/// Errors surfaced by the core.
///
/// Load-time failures are fatal to the load operation only; the emulator
/// stays in the "no ROM loaded" state. Runtime failures (a failed auto-save,
/// a checksum mismatch) are logged and emulation continues.
#[derive(Debug, Error)]
pub enum Error {
    /// The image names a board this core does not implement.
    #[error("unsupported mapper/board: {0}")]
    UnsupportedMapper(String),
    /// Format-violating header, truncated section or malformed disk side.
    #[error("invalid image: {0}")]
    InvalidImage(String),
    /// Stored checksum does not match the image contents. Non-fatal.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    /// Non-volatile RAM backing file could not be opened.
    #[error("failed to open non-volatile RAM store: {0}")]
    NvramOpenFailed(String),
    /// Non-volatile RAM flush failed at shutdown or eject.
    #[error("failed to write non-volatile RAM store: {0}")]
    NvramWriteFailed(String),
    /// An input binding line did not parse.
    #[error("bad input binding: {0}")]
    BindingSyntax(String),
    /// A binding referenced an action name that does not exist.
    #[error("unknown action: {0}")]
    UnknownAction(String),
    /// FDS emulation requested without a BIOS image available.
    #[error("FDS BIOS image is missing")]
    MissingBios,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
