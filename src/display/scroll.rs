//! Hardware vertical scrolling. The controller scrolls along its physical row axis, so the
//! scrolling area is always expressed in physical rows regardless of orientation. Which fixed
//! region is scanned first, and the sign of the offset, depend on the orientation.

use log::trace;

use super::Display;
use crate::command::Command;
use crate::error::Error;
use crate::interface::CommandChannel;

/// The scroll registers as last programmed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScrollState {
    /// `(top, bottom)` fixed heights of the last area definition.
    fixed: Option<(u16, u16)>,
    /// Height of the scrolling region.
    scrollable: u16,
    /// First physical row of the scrolling region.
    base: u16,
    /// Last VSCRSADD value sent.
    start: Option<u16>,
}

impl ScrollState {
    /// Nothing but the scroll start address known.
    pub fn at_start(start: u16) -> Self {
        ScrollState {
            start: Some(start),
            ..ScrollState::default()
        }
    }
}

/// Scroll start address for `offset` rows of scroll inside a region of `scrollable` rows starting
/// at row `base`.
pub(crate) fn scroll_start(offset: i16, negate: bool, scrollable: u16, base: u16) -> u16 {
    let requested = if negate {
        -i32::from(offset)
    } else {
        i32::from(offset)
    };
    let wrapped = requested.rem_euclid(i32::from(scrollable));
    (wrapped + i32::from(base)) as u16
}

impl<DI> Display<DI>
where
    DI: CommandChannel,
{
    /// Scroll the region between `top_fixed` and `bottom_fixed` rows by `offset` rows. Offsets
    /// of any sign or magnitude wrap around the scrolling region. The area definition is only
    /// resent when the fixed heights change, and the start address only when it moves.
    pub fn set_scroll(
        &mut self,
        offset: i16,
        top_fixed: u16,
        bottom_fixed: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        let height = self.config.panel_size.1;
        if u32::from(top_fixed) + u32::from(bottom_fixed) >= u32::from(height) {
            return Err(Error::InvalidScroll);
        }
        let quirk = self.config.orientation.scroll_quirk();

        if self.state.scroll.fixed != Some((top_fixed, bottom_fixed)) {
            let scrollable = height - top_fixed - bottom_fixed;
            let (first, last) = if quirk.fixed_swapped {
                (bottom_fixed, top_fixed)
            } else {
                (top_fixed, bottom_fixed)
            };
            trace!("st7796: scroll area {}/{}/{}", first, scrollable, last);
            self.send(Command::SetVerticalScrollDefinition(first, scrollable, last))?;
            self.state.scroll.fixed = Some((top_fixed, bottom_fixed));
            self.state.scroll.scrollable = scrollable;
            self.state.scroll.base = first;
        }

        let scroll = self.state.scroll;
        let start = scroll_start(offset, quirk.negate, scroll.scrollable, scroll.base);
        if scroll.start != Some(start) {
            self.send(Command::SetVerticalScrollStart(start))?;
            self.state.scroll.start = Some(start);
        }
        Ok(())
    }
}
