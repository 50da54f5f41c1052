//! The main API to the display driver. `Display` owns the command channel together with
//! everything the driver knows about the controller's current state, so that redundant mode
//! commands can be skipped, and exposes the drawing operations on top of it.

// This has to be here in order to be usable by mods declared afterwards.
#[cfg(test)]
#[macro_use]
pub mod testing {
    macro_rules! send {
        ($c:expr, [$($d:expr),*]) => {Sent::Cmd($c, vec![$($d,)*])};
        ($c:expr) => {Sent::Cmd($c, vec![])};
    }
}

pub mod pixels;
pub mod scroll;
pub mod window;

use log::{debug, warn};

use crate::command::consts::*;
use crate::command::{BufCommand, Command};
use crate::config::Config;
use crate::error::Error;
use crate::interface::CommandChannel;
use crate::orientation::ScanDirection;

use self::pixels::TransferDirection;
use self::scroll::ScrollState;
use self::window::RowSpan;

// Panel tuning values of the power-on sequence.
const DISPLAY_OUTPUT_CONTROL: [u8; 8] = [0x40, 0x8A, 0x00, 0x00, 0x29, 0x19, 0xA5, 0x33];
const POSITIVE_GAMMA: [u8; 14] = [
    0xF0, 0x09, 0x0B, 0x06, 0x04, 0x15, 0x2F, 0x54, 0x42, 0x3C, 0x17, 0x14, 0x18, 0x1B,
];
const NEGATIVE_GAMMA: [u8; 14] = [
    0xE0, 0x09, 0x0B, 0x06, 0x04, 0x03, 0x2B, 0x43, 0x42, 0x3B, 0x16, 0x14, 0x17, 0x1B,
];

/// Initialization progress flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct InitFlags(u8);

impl InitFlags {
    /// The command channel has carried a transaction.
    pub const IO_READY: u8 = 0x02;
    /// The power-on sequence completed.
    pub const CONTROLLER_READY: u8 = 0x01;

    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn insert(&mut self, flag: u8) {
        self.0 |= flag;
    }
}

/// Everything the driver remembers about the controller between calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DriverState {
    /// Scan direction of the last MADCTL sent, or `None` if it is not known.
    pub last_direction: Option<ScanDirection>,
    /// Logical row bounds of the last programmed window.
    pub window: Option<RowSpan>,
    /// Transfer direction COLMOD is currently set up for, when the two depths differ.
    pub last_transfer: Option<TransferDirection>,
    pub initialized: InitFlags,
    pub scroll: ScrollState,
}

impl DriverState {
    /// Forget everything that mirrors controller registers. Called when a transaction fails and
    /// the controller may hold any mix of old and new values.
    fn invalidate(&mut self) {
        self.last_direction = None;
        self.window = None;
        self.last_transfer = None;
        self.scroll = ScrollState::default();
    }
}

/// An RGB565 image stored bottom row first, as found in BMP files.
#[derive(Clone, Copy, Debug)]
pub struct Bitmap<'a> {
    pub width: u16,
    pub height: u16,
    /// At least `width * height` pixels, the bottom row first.
    pub pixels: &'a [u16],
}

/// A raw controller transaction for `Display::user_command`.
pub enum UserCommand<'a> {
    /// Send bytes after the command.
    Write8(&'a [u8]),
    /// Send words after the command, high byte first.
    Write16(&'a [u16]),
    /// Read bytes after the command and one dummy clock.
    Read8(&'a mut [u8]),
    /// Read words after the command and one dummy clock.
    Read16(&'a mut [u16]),
}

/// A driver for an ST7796 display.
pub struct Display<DI>
where
    DI: CommandChannel,
{
    iface: DI,
    config: Config,
    state: DriverState,
}

impl<DI> Display<DI>
where
    DI: CommandChannel,
{
    /// Construct a new display driver talking over `iface`. Nothing is sent to the controller
    /// until `init` is called.
    pub fn new(iface: DI, config: Config) -> Self {
        Display {
            iface,
            config,
            state: DriverState::default(),
        }
    }

    /// Tear the driver down, giving back the command channel.
    pub fn release(self) -> DI {
        self.iface
    }

    /// Run the power-on sequence and, if configured, clear the frame memory.
    pub fn init(&mut self) -> Result<(), Error<DI::Error>> {
        debug!("st7796: init ({:?})", self.config.orientation);
        self.state = DriverState::default();
        self.state.initialized.insert(InitFlags::IO_READY);

        self.iface.delay_ms(120);
        self.send(Command::SoftwareReset)?;
        self.iface.delay_ms(120);

        self.send(Command::SetPixelFormat(self.config.write_depth))?;
        self.state.last_transfer = Some(TransferDirection::Write);
        self.iface.delay_ms(50);

        self.send(Command::SetVerticalScrollStart(0))?;
        self.state.scroll = ScrollState::at_start(0);

        // The scan direction set here is not recorded; the first drawing call always sends its
        // own.
        let mad = self
            .config
            .orientation
            .scan_pattern(ScanDirection::RightThenDown, self.config.color_order);
        self.send(Command::SetMemoryAccessControl(mad))?;
        self.send(Command::SetSleepMode(false))?;
        self.iface.delay_ms(120);

        for &param in CSCON_ENABLE.iter() {
            self.send(Command::SetCommandSetControl(param))?;
        }
        self.send(Command::SetMemoryAccessControl(mad))?;
        self.send(Command::SetDisplayInversionControl(0x01))?;
        self.send(Command::SetDisplayFunctionControl(0x80, 0x02, 0x3B))?;
        self.send_buf(BufCommand::SetDisplayOutputControl(&DISPLAY_OUTPUT_CONTROL))?;
        self.send(Command::SetPowerControl2(0x06))?;
        self.send(Command::SetPowerControl3(0xA7))?;
        self.send(Command::SetVcomControl(0x18))?;
        self.iface.delay_ms(120);

        self.send_buf(BufCommand::SetPositiveGamma(&POSITIVE_GAMMA))?;
        self.send_buf(BufCommand::SetNegativeGamma(&NEGATIVE_GAMMA))?;
        self.iface.delay_ms(120);

        for &param in CSCON_DISABLE.iter() {
            self.send(Command::SetCommandSetControl(param))?;
        }
        self.iface.delay_ms(120);

        self.send(Command::NormalDisplayMode)?;
        self.send(Command::SetDisplayOn(true))?;
        self.state.initialized.insert(InitFlags::CONTROLLER_READY);

        if self.config.clear_on_init {
            let (width, height) = self.config.logical_size();
            self.fill_rect(0, 0, width, height, 0x0000)?;
            self.iface.delay_ms(10);
        }
        Ok(())
    }

    /// Switch the backlight on and wake the controller.
    pub fn display_on(&mut self) -> Result<(), Error<DI::Error>> {
        self.require_io()?;
        debug!("st7796: display on");
        let r = self.iface.backlight(true);
        self.bus(r)?;
        self.send(Command::SetSleepMode(false))
    }

    /// Put the controller to sleep and switch the backlight off.
    pub fn display_off(&mut self) -> Result<(), Error<DI::Error>> {
        self.require_io()?;
        debug!("st7796: display off");
        self.send(Command::SetSleepMode(true))?;
        let r = self.iface.backlight(false);
        self.bus(r)
    }

    /// Width of the panel in the configured orientation.
    pub fn panel_width(&self) -> u16 {
        self.config.logical_size().0
    }

    /// Height of the panel in the configured orientation.
    pub fn panel_height(&self) -> u16 {
        self.config.logical_size().1
    }

    /// Read the three display identification bytes, the first one in the least significant
    /// position.
    pub fn read_id(&mut self) -> Result<u32, Error<DI::Error>> {
        self.require_io()?;
        let mut id = [0u8; 3];
        let r = self.iface.read_command(RDDID, &mut id, 1);
        self.bus(r)?;
        Ok(u32::from_le_bytes([id[0], id[1], id[2], 0]))
    }

    /// Set the addressing window to the single pixel at (`x`, `y`).
    pub fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        self.program_window(x, y, 1, 1)
    }

    /// Set the addressing window to the `width` x `height` rectangle at (`x`, `y`). The window is
    /// not checked against the panel size.
    pub fn set_window(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        self.program_window(x, y, width, height)
    }

    /// Draw one pixel.
    pub fn write_pixel(&mut self, x: u16, y: u16, color: u16) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        self.ensure_direction(ScanDirection::RightThenDown)?;
        self.program_window(x, y, 1, 1)?;
        self.write_pixels(color, 1)
    }

    /// Read one pixel back from frame memory.
    pub fn read_pixel(&mut self, x: u16, y: u16) -> Result<u16, Error<DI::Error>> {
        self.require_init()?;
        self.ensure_direction(ScanDirection::RightThenDown)?;
        self.program_window(x, y, 1, 1)?;
        let mut px = [0u16; 1];
        self.read_pixels(&mut px)?;
        Ok(px[0])
    }

    /// Draw a horizontal line of `length` pixels starting at (`x`, `y`).
    pub fn draw_hline(
        &mut self,
        color: u16,
        x: u16,
        y: u16,
        length: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        self.ensure_direction(ScanDirection::RightThenDown)?;
        self.program_window(x, y, length, 1)?;
        self.write_pixels(color, u32::from(length))
    }

    /// Draw a vertical line of `length` pixels starting at (`x`, `y`).
    pub fn draw_vline(
        &mut self,
        color: u16,
        x: u16,
        y: u16,
        length: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        self.ensure_direction(ScanDirection::RightThenDown)?;
        self.program_window(x, y, 1, length)?;
        self.write_pixels(color, u32::from(length))
    }

    /// Fill a rectangle with a solid color.
    pub fn fill_rect(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        color: u16,
    ) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        self.ensure_direction(ScanDirection::RightThenDown)?;
        self.program_window(x, y, width, height)?;
        self.write_pixels(color, u32::from(width) * u32::from(height))
    }

    /// Draw a row-major RGB565 image. Only the first `width * height` entries of `pixels` are
    /// sent.
    pub fn draw_rgb_image(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        pixels: &[u16],
    ) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        let n = usize::from(width) * usize::from(height);
        if pixels.len() < n {
            return Err(Error::BufferTooSmall);
        }
        self.ensure_direction(ScanDirection::RightThenDown)?;
        self.program_window(x, y, width, height)?;
        self.write_image(&pixels[..n])
    }

    /// Read a rectangle of frame memory into `buf`, row-major.
    pub fn read_rgb_image(
        &mut self,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        buf: &mut [u16],
    ) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        let n = usize::from(width) * usize::from(height);
        if buf.len() < n {
            return Err(Error::BufferTooSmall);
        }
        self.ensure_direction(ScanDirection::RightThenDown)?;
        self.program_window(x, y, width, height)?;
        self.read_pixels(&mut buf[..n])
    }

    /// Draw a bottom-up bitmap with its top-left corner at (`x`, `y`). The controller is switched
    /// to fill rows upwards, so the pixel data is streamed unmodified.
    pub fn draw_bitmap(&mut self, x: u16, y: u16, bitmap: &Bitmap) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        let n = usize::from(bitmap.width) * usize::from(bitmap.height);
        if bitmap.pixels.len() < n {
            return Err(Error::BufferTooSmall);
        }
        let cols = window::span(x, bitmap.width)?;
        let rows = RowSpan::from(window::span(y, bitmap.height)?);
        let mirrored = self.mirrored_rows(rows)?;
        self.ensure_direction(ScanDirection::RightThenUp)?;
        self.program_logical(cols, mirrored)?;
        self.state.window = Some(rows);
        self.write_image(&bitmap.pixels[..n])
    }

    /// Stream a bottom-up bitmap into the most recently programmed window. Only the row range is
    /// reprogrammed (mirrored for upward filling); the column range is whatever the last window
    /// left behind. Fails with `InvalidWindow` if no window has been set since `init`.
    pub fn draw_bitmap_in_window(&mut self, pixels: &[u16]) -> Result<(), Error<DI::Error>> {
        self.require_init()?;
        let rows = self.state.window.ok_or(Error::InvalidWindow)?;
        let mirrored = self.mirrored_rows(rows)?;
        self.ensure_direction(ScanDirection::RightThenUp)?;
        self.program_logical_rows(mirrored)?;
        self.write_image(pixels)
    }

    /// Send an arbitrary command. The driver's view of the scan direction and pixel format is
    /// not updated, so a caller changing MADCTL or COLMOD this way is responsible for restoring
    /// them.
    pub fn user_command(&mut self, cmd: u8, op: UserCommand) -> Result<(), Error<DI::Error>> {
        self.require_io()?;
        let r = match op {
            UserCommand::Write8(data) => self.iface.write_command(cmd, data),
            UserCommand::Write16(data) => self.iface.write_command16(cmd, data),
            UserCommand::Read8(buf) => self.iface.read_command(cmd, buf, 1),
            UserCommand::Read16(buf) => self.iface.read_command16(cmd, buf, 1),
        };
        self.bus(r)
    }

    fn require_io(&self) -> Result<(), Error<DI::Error>> {
        if self.state.initialized.contains(InitFlags::IO_READY) {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn require_init(&self) -> Result<(), Error<DI::Error>> {
        if self.state.initialized.contains(InitFlags::CONTROLLER_READY) {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Convert a channel result, dropping all cached controller state on failure.
    fn bus<T>(&mut self, r: Result<T, DI::Error>) -> Result<T, Error<DI::Error>> {
        match r {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!("st7796: bus error, cached controller state dropped");
                self.state.invalidate();
                Err(Error::Bus(e))
            }
        }
    }

    fn send(&mut self, cmd: Command) -> Result<(), Error<DI::Error>> {
        let r = cmd.send(&mut self.iface);
        self.bus(r)
    }

    fn send_buf(&mut self, cmd: BufCommand) -> Result<(), Error<DI::Error>> {
        let r = cmd.send(&mut self.iface);
        self.bus(r)
    }
}
