//! Physical mounting orientations and the controller register patterns they select.
//!
//! Everything that differs between the four orientations lives in one table: the MADCTL bit
//! pattern for each logical scan direction, whether logical X/Y are exchanged before being sent
//! as controller columns/rows, and the quirks of the vertical scroll arithmetic.

use crate::command::consts::{MAD_BGR, MAD_MV, MAD_MX, MAD_MY};

/// One of the four fixed mounting rotations of the panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Portrait, connector at the top.
    Portrait0,
    /// Landscape, connector on the left.
    Landscape90,
    /// Portrait, connector at the bottom.
    Portrait180,
    /// Landscape, connector on the right.
    Landscape270,
}

/// Byte order of the color components in the panel's pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorOrder {
    Rgb,
    Bgr,
}

/// The logical address increment orders used by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanDirection {
    /// Left to right, then top to bottom. Used for all row-major pixel data.
    RightThenDown,
    /// Left to right, then bottom to top. Used for bitmaps stored bottom row first.
    RightThenUp,
}

/// How the vertical scroll registers are programmed in one orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ScrollQuirk {
    /// The bottom fixed region goes in the first VSCRDEF field and the top one in the last.
    pub fixed_swapped: bool,
    /// The requested offset is negated before it is normalized.
    pub negate: bool,
}

struct Entry {
    swap_axes: bool,
    right_then_down: u8,
    right_then_up: u8,
    scroll: ScrollQuirk,
}

// Indexed by `Orientation as usize`.
const TABLE: [Entry; 4] = [
    // Portrait0
    Entry {
        swap_axes: false,
        right_then_down: 0,
        right_then_up: MAD_MY,
        scroll: ScrollQuirk {
            fixed_swapped: true,
            negate: true,
        },
    },
    // Landscape90
    Entry {
        swap_axes: true,
        right_then_down: MAD_MV | MAD_MX,
        right_then_up: MAD_MV,
        scroll: ScrollQuirk {
            fixed_swapped: true,
            negate: false,
        },
    },
    // Portrait180
    Entry {
        swap_axes: false,
        right_then_down: MAD_MX | MAD_MY,
        right_then_up: MAD_MX,
        scroll: ScrollQuirk {
            fixed_swapped: false,
            negate: false,
        },
    },
    // Landscape270
    Entry {
        swap_axes: true,
        right_then_down: MAD_MV | MAD_MY,
        right_then_up: MAD_MV | MAD_MX | MAD_MY,
        scroll: ScrollQuirk {
            fixed_swapped: false,
            negate: true,
        },
    },
];

impl Orientation {
    fn entry(self) -> &'static Entry {
        &TABLE[self as usize]
    }

    /// Whether logical X runs along the physical row axis.
    pub fn is_landscape(self) -> bool {
        self.entry().swap_axes
    }

    /// The logical `(width, height)` of a panel whose portrait size is `physical`.
    pub fn logical_size(self, physical: (u16, u16)) -> (u16, u16) {
        if self.is_landscape() {
            (physical.1, physical.0)
        } else {
            physical
        }
    }

    /// MADCTL parameter selecting `dir` in this orientation.
    pub fn scan_pattern(self, dir: ScanDirection, order: ColorOrder) -> u8 {
        let entry = self.entry();
        let bits = match dir {
            ScanDirection::RightThenDown => entry.right_then_down,
            ScanDirection::RightThenUp => entry.right_then_up,
        };
        match order {
            ColorOrder::Rgb => bits,
            ColorOrder::Bgr => bits | MAD_BGR,
        }
    }

    /// Map inclusive logical ranges to the `(column, row)` ranges sent to the controller.
    pub fn map_window(
        self,
        x: (u16, u16),
        y: (u16, u16),
    ) -> ((u16, u16), (u16, u16)) {
        if self.is_landscape() {
            (y, x)
        } else {
            (x, y)
        }
    }

    pub(crate) fn scroll_quirk(self) -> ScrollQuirk {
        self.entry().scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Orientation; 4] = [
        Orientation::Portrait0,
        Orientation::Landscape90,
        Orientation::Portrait180,
        Orientation::Landscape270,
    ];

    #[test]
    fn logical_size_swaps_in_landscape() {
        assert_eq!(Orientation::Portrait0.logical_size((320, 480)), (320, 480));
        assert_eq!(Orientation::Landscape90.logical_size((320, 480)), (480, 320));
        assert_eq!(Orientation::Portrait180.logical_size((320, 480)), (320, 480));
        assert_eq!(Orientation::Landscape270.logical_size((320, 480)), (480, 320));
    }

    #[test]
    fn scan_patterns() {
        let rgb = ColorOrder::Rgb;
        let down = ScanDirection::RightThenDown;
        let up = ScanDirection::RightThenUp;
        assert_eq!(Orientation::Portrait0.scan_pattern(down, rgb), 0x00);
        assert_eq!(Orientation::Portrait0.scan_pattern(up, rgb), 0x80);
        assert_eq!(Orientation::Landscape90.scan_pattern(down, rgb), 0x60);
        assert_eq!(Orientation::Landscape90.scan_pattern(up, rgb), 0x20);
        assert_eq!(Orientation::Portrait180.scan_pattern(down, rgb), 0xC0);
        assert_eq!(Orientation::Portrait180.scan_pattern(up, rgb), 0x40);
        assert_eq!(Orientation::Landscape270.scan_pattern(down, rgb), 0xA0);
        assert_eq!(Orientation::Landscape270.scan_pattern(up, rgb), 0xE0);
    }

    #[test]
    fn directions_are_distinct_in_every_orientation() {
        for o in ALL.iter() {
            for order in [ColorOrder::Rgb, ColorOrder::Bgr].iter() {
                assert_ne!(
                    o.scan_pattern(ScanDirection::RightThenDown, *order),
                    o.scan_pattern(ScanDirection::RightThenUp, *order)
                );
            }
        }
    }

    #[test]
    fn bgr_sets_color_order_bit() {
        for o in ALL.iter() {
            let rgb = o.scan_pattern(ScanDirection::RightThenDown, ColorOrder::Rgb);
            let bgr = o.scan_pattern(ScanDirection::RightThenDown, ColorOrder::Bgr);
            assert_eq!(rgb & 0x08, 0);
            assert_eq!(bgr, rgb | 0x08);
        }
    }

    #[test]
    fn map_window_swaps_in_landscape() {
        assert_eq!(
            Orientation::Portrait0.map_window((10, 39), (20, 59)),
            ((10, 39), (20, 59))
        );
        assert_eq!(
            Orientation::Landscape90.map_window((10, 39), (20, 59)),
            ((20, 59), (10, 39))
        );
        assert_eq!(
            Orientation::Portrait180.map_window((10, 39), (20, 59)),
            ((10, 39), (20, 59))
        );
        assert_eq!(
            Orientation::Landscape270.map_window((10, 39), (20, 59)),
            ((20, 59), (10, 39))
        );
    }
}
