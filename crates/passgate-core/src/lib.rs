pub mod associate;
pub mod entry;
pub mod error;
pub mod panel;
pub mod resolver;
pub mod socket;

/// Maximum proxy frame size in bytes (1 MB).
///
/// The vault proxy speaks native-messaging framing with a 4-byte length
/// prefix; anything larger than this is a malformed or hostile frame.
pub const MAX_FRAME_LENGTH: usize = 1024 * 1024;
