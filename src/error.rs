//! Error type returned by every driver operation.

use core::fmt;

/// Failure of a driver operation. `BusE` is the error type of the underlying
/// `CommandChannel`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<BusE> {
    /// The command channel failed (or timed out) during a command or data transaction. The
    /// driver's cached controller state has been invalidated and will be resent by the next
    /// operation.
    Bus(BusE),
    /// The operation requires `Display::init` to have completed.
    NotInitialized,
    /// A window of zero width or height, or one whose coordinates do not fit the 16-bit address
    /// registers.
    InvalidWindow,
    /// The fixed scroll regions leave no scrollable rows.
    InvalidScroll,
    /// A pixel slice holds fewer entries than the window it is meant to cover.
    BufferTooSmall,
}

impl<BusE: fmt::Debug> fmt::Display for Error<BusE> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "command channel error: {:?}", e),
            Error::NotInitialized => f.write_str("display not initialized"),
            Error::InvalidWindow => f.write_str("invalid address window"),
            Error::InvalidScroll => f.write_str("fixed scroll regions cover the whole panel"),
            Error::BufferTooSmall => f.write_str("pixel buffer smaller than window"),
        }
    }
}

#[cfg(feature = "std")]
impl<BusE: fmt::Debug> std::error::Error for Error<BusE> {}
