//! Driver configuration fixed at construction time: mounting orientation, color order, wire color
//! depths and panel geometry.

use crate::color::WireDepth;
use crate::command::consts::{PIXEL_HEIGHT, PIXEL_WIDTH};
use crate::orientation::{ColorOrder, Orientation};

/// A configuration for the driver. Builder methods offer a declarative way to override the
/// defaults, which match a 320x480 ST7796 module writing at 16 bits and reading back at 24 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub(crate) orientation: Orientation,
    pub(crate) color_order: ColorOrder,
    pub(crate) write_depth: WireDepth,
    pub(crate) read_depth: WireDepth,
    pub(crate) panel_size: (u16, u16),
    pub(crate) clear_on_init: bool,
}

impl Config {
    /// Create a new configuration. The orientation is mandatory because it changes the meaning
    /// of every coordinate passed to the driver; all other options can be optionally set by
    /// calling the provided builder methods on `Config`.
    pub fn new(orientation: Orientation) -> Self {
        Config {
            orientation,
            color_order: ColorOrder::Rgb,
            write_depth: WireDepth::Rgb565,
            read_depth: WireDepth::Rgb888,
            panel_size: (PIXEL_WIDTH, PIXEL_HEIGHT),
            clear_on_init: true,
        }
    }

    /// Extend this `Config` to select the color filter order of the panel.
    pub fn color_order(self, color_order: ColorOrder) -> Self {
        Self {
            color_order,
            ..self
        }
    }

    /// Extend this `Config` to select the pixel format used for memory writes.
    pub fn write_depth(self, write_depth: WireDepth) -> Self {
        Self {
            write_depth,
            ..self
        }
    }

    /// Extend this `Config` to select the pixel format used for memory reads. Many SPI modules
    /// only return valid data at 24 bits per pixel.
    pub fn read_depth(self, read_depth: WireDepth) -> Self {
        Self { read_depth, ..self }
    }

    /// Extend this `Config` with the panel resolution in portrait orientation, for modules that
    /// do not use the full 320x480 of the controller.
    pub fn panel_size(self, width: u16, height: u16) -> Self {
        Self {
            panel_size: (width, height),
            ..self
        }
    }

    /// Extend this `Config` to choose whether `Display::init` clears the frame memory to black
    /// before returning.
    pub fn clear_on_init(self, clear_on_init: bool) -> Self {
        Self {
            clear_on_init,
            ..self
        }
    }

    /// The orientation the driver was configured with.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Whether memory writes and reads use different pixel formats, in which case COLMOD has to
    /// be reprogrammed whenever the transfer direction changes.
    pub(crate) fn split_depths(&self) -> bool {
        self.write_depth != self.read_depth
    }

    /// Panel size as seen through the configured orientation.
    pub(crate) fn logical_size(&self) -> (u16, u16) {
        self.orientation.logical_size(self.panel_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::new(Orientation::Portrait0);
        assert_eq!(cfg.color_order, ColorOrder::Rgb);
        assert_eq!(cfg.write_depth, WireDepth::Rgb565);
        assert_eq!(cfg.read_depth, WireDepth::Rgb888);
        assert_eq!(cfg.panel_size, (320, 480));
        assert!(cfg.clear_on_init);
        assert!(cfg.split_depths());
    }

    #[test]
    fn builder_overrides() {
        let cfg = Config::new(Orientation::Landscape270)
            .color_order(ColorOrder::Bgr)
            .read_depth(WireDepth::Rgb565)
            .panel_size(240, 320)
            .clear_on_init(false);
        assert_eq!(cfg.orientation(), Orientation::Landscape270);
        assert_eq!(cfg.color_order, ColorOrder::Bgr);
        assert!(!cfg.split_depths());
        assert_eq!(cfg.logical_size(), (320, 240));
        assert!(!cfg.clear_on_init);
    }
}
