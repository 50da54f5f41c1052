//! Addressing window and scan direction management. Logical coordinates are mapped through the
//! configured orientation to the controller's column and row ranges, and MADCTL is only
//! reprogrammed when the scan direction actually changes.

use log::trace;

use super::Display;
use crate::command::Command;
use crate::error::Error;
use crate::interface::CommandChannel;
use crate::orientation::ScanDirection;

/// Inclusive logical row bounds of the last programmed window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RowSpan {
    pub y_start: u16,
    pub y_end: u16,
}

impl From<(u16, u16)> for RowSpan {
    fn from((y_start, y_end): (u16, u16)) -> Self {
        RowSpan { y_start, y_end }
    }
}

/// The inclusive range covering `len` addresses from `start`. Empty ranges and ranges running
/// past the 16-bit address space are rejected.
pub(crate) fn span<E>(start: u16, len: u16) -> Result<(u16, u16), Error<E>> {
    if len == 0 {
        return Err(Error::InvalidWindow);
    }
    start
        .checked_add(len - 1)
        .map(|end| (start, end))
        .ok_or(Error::InvalidWindow)
}

impl<DI> Display<DI>
where
    DI: CommandChannel,
{
    /// Select `dir` unless it is already known to be active.
    pub(crate) fn ensure_direction(&mut self, dir: ScanDirection) -> Result<(), Error<DI::Error>> {
        if self.state.last_direction == Some(dir) {
            return Ok(());
        }
        let mad = self
            .config
            .orientation
            .scan_pattern(dir, self.config.color_order);
        trace!("st7796: scan {:?}, MADCTL {:#04x}", dir, mad);
        self.send(Command::SetMemoryAccessControl(mad))?;
        self.state.last_direction = Some(dir);
        Ok(())
    }

    /// Program the `width` x `height` logical window at (`x`, `y`) and remember its rows.
    pub(crate) fn program_window(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Error<DI::Error>> {
        let cols = span(x, width)?;
        let rows = span(y, height)?;
        self.program_logical(cols, rows)?;
        self.state.window = Some(RowSpan::from(rows));
        Ok(())
    }

    /// Send inclusive logical X and Y ranges as controller column and row ranges.
    pub(crate) fn program_logical(
        &mut self,
        x: (u16, u16),
        y: (u16, u16),
    ) -> Result<(), Error<DI::Error>> {
        let (cols, rows) = self.config.orientation.map_window(x, y);
        self.send(Command::SetColumnAddress(cols.0, cols.1))?;
        self.send(Command::SetRowAddress(rows.0, rows.1))
    }

    /// Reprogram only the controller range that carries logical rows.
    pub(crate) fn program_logical_rows(&mut self, y: (u16, u16)) -> Result<(), Error<DI::Error>> {
        if self.config.orientation.is_landscape() {
            self.send(Command::SetColumnAddress(y.0, y.1))
        } else {
            self.send(Command::SetRowAddress(y.0, y.1))
        }
    }

    /// Row range addressing `rows` when filling bottom to top.
    pub(crate) fn mirrored_rows(&self, rows: RowSpan) -> Result<(u16, u16), Error<DI::Error>> {
        let last = self
            .panel_height()
            .checked_sub(1)
            .ok_or(Error::InvalidWindow)?;
        match (last.checked_sub(rows.y_end), last.checked_sub(rows.y_start)) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(Error::InvalidWindow),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::interface::test_spy::TestSpyInterface;
    use crate::orientation::Orientation;
    use proptest::prelude::*;

    type E = Error<()>;

    #[test]
    fn span_is_inclusive() {
        assert_eq!(span::<()>(10, 1), Ok((10, 10)));
        assert_eq!(span::<()>(10, 30), Ok((10, 39)));
        assert_eq!(span::<()>(0xFFFF, 1), Ok((0xFFFF, 0xFFFF)));
    }

    #[test]
    fn span_rejects_empty_and_overflow() {
        assert_eq!(span::<()>(10, 0), Err(E::InvalidWindow));
        assert_eq!(span::<()>(0xFFFF, 2), Err(E::InvalidWindow));
    }

    #[test]
    fn mirrored_rows_in_landscape_use_logical_height() {
        let disp = Display::new(
            TestSpyInterface::new(),
            Config::new(Orientation::Landscape270),
        );
        assert_eq!(
            disp.mirrored_rows(RowSpan::from((0, 319))),
            Ok((0, 319))
        );
        assert_eq!(
            disp.mirrored_rows(RowSpan::from((0, 320))),
            Err(Error::InvalidWindow)
        );
    }

    proptest! {
        #[test]
        fn mirroring_twice_is_identity(a in 0u16..480, b in 0u16..480) {
            let disp = Display::new(TestSpyInterface::new(), Config::new(Orientation::Portrait0));
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let once = disp.mirrored_rows(RowSpan::from((lo, hi))).unwrap();
            prop_assert!(once.0 <= once.1);
            prop_assert_eq!(once.1 - once.0, hi - lo);
            let twice = disp.mirrored_rows(RowSpan::from(once)).unwrap();
            prop_assert_eq!(twice, (lo, hi));
        }
    }
}
