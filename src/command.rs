//! The command set for the ST7796.
//!
//! Note 1: Multi-byte parameters (addresses, scroll heights) are sent most significant byte
//! first. Address ranges are inclusive at both ends.
//!
//! Note 2: Pixel data commands (RAMWR, RAMRD and their "continue" forms) are not modeled here,
//! since their payloads depend on the configured wire depth; see `display::pixels`.

use crate::color::WireDepth;
use crate::interface::CommandChannel;

pub mod consts {
    //! Register addresses and bit fields of the ST7796.

    /// Native panel width in portrait orientation.
    pub const PIXEL_WIDTH: u16 = 320;
    /// Native panel height in portrait orientation.
    pub const PIXEL_HEIGHT: u16 = 480;

    pub const NOP: u8 = 0x00;
    pub const SWRESET: u8 = 0x01;
    pub const RDDID: u8 = 0x04;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const CASET: u8 = 0x2A;
    pub const RASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
    pub const RAMRD: u8 = 0x2E;
    pub const VSCRDEF: u8 = 0x33;
    pub const MADCTL: u8 = 0x36;
    pub const VSCRSADD: u8 = 0x37;
    pub const COLMOD: u8 = 0x3A;
    pub const RAMWRC: u8 = 0x3C;
    pub const RAMRDC: u8 = 0x3E;
    pub const DIC: u8 = 0xB4;
    pub const DFC: u8 = 0xB6;
    pub const PWR2: u8 = 0xC1;
    pub const PWR3: u8 = 0xC2;
    pub const VCMPCTL: u8 = 0xC5;
    pub const PGC: u8 = 0xE0;
    pub const NGC: u8 = 0xE1;
    pub const DOCA: u8 = 0xE8;
    pub const CSCON: u8 = 0xF0;

    /// MADCTL: row address order (mirror Y).
    pub const MAD_MY: u8 = 0x80;
    /// MADCTL: column address order (mirror X).
    pub const MAD_MX: u8 = 0x40;
    /// MADCTL: row/column exchange.
    pub const MAD_MV: u8 = 0x20;
    /// MADCTL: BGR color filter order.
    pub const MAD_BGR: u8 = 0x08;

    /// CSCON parameters unlocking and relocking the extension command set. Both halves of a
    /// pair must be sent, in order.
    pub const CSCON_ENABLE: [u8; 2] = [0xC3, 0x96];
    pub const CSCON_DISABLE: [u8; 2] = [0x3C, 0x69];
}

use self::consts::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Reset all registers to their power-on defaults. The controller needs 120ms before it
    /// accepts `SetSleepMode(false)`.
    SoftwareReset,
    /// Enter (`true`) or leave (`false`) sleep mode.
    SetSleepMode(bool),
    /// Leave partial mode and display the whole frame memory.
    NormalDisplayMode,
    /// Turn the display output on or off. Frame memory is preserved.
    SetDisplayOn(bool),
    /// Set the column start and end address of the addressing window and reset the column
    /// pointer to the start. (Note 1)
    SetColumnAddress(u16, u16),
    /// Set the row start and end address of the addressing window and reset the row pointer to
    /// the start. (Note 1)
    SetRowAddress(u16, u16),
    /// Set the memory data access control register: address increment order, row/column
    /// exchange, and color filter order. See `consts::MAD_*`.
    SetMemoryAccessControl(u8),
    /// Set the interface pixel format for both memory writes and reads.
    SetPixelFormat(WireDepth),
    /// Define the vertical scrolling area as three heights in wire order: the fixed region
    /// scanned first, the scrolling region, and the fixed region scanned last. The three must add
    /// up to the physical panel height.
    SetVerticalScrollDefinition(u16, u16, u16),
    /// Set the frame memory row displayed at the top of the scrolling region.
    SetVerticalScrollStart(u16),
    /// Write one command set control (CSCON) parameter.
    SetCommandSetControl(u8),
    /// Display inversion control (dot/column inversion mode).
    SetDisplayInversionControl(u8),
    /// Display function control: source/gate scan setting and the number of drive lines.
    SetDisplayFunctionControl(u8, u8, u8),
    /// Power control 2: VAP/VAN gamma reference voltages.
    SetPowerControl2(u8),
    /// Power control 3: source and gamma driving current levels.
    SetPowerControl3(u8),
    /// VCOM voltage.
    SetVcomControl(u8),
}

pub enum BufCommand<'buf> {
    /// Set the positive-polarity gamma correction curve.
    SetPositiveGamma(&'buf [u8; 14]),
    /// Set the negative-polarity gamma correction curve.
    SetNegativeGamma(&'buf [u8; 14]),
    /// Display output control adjust: source/gate timing of the panel.
    SetDisplayOutputControl(&'buf [u8; 8]),
}

macro_rules! ok_command {
    ($buf:ident, $cmd:expr,[]) => {
        ($cmd, &$buf[..0])
    };
    ($buf:ident, $cmd:expr,[$($arg:expr),+]) => {{
        let args = [$($arg),+];
        $buf[..args.len()].copy_from_slice(&args);
        ($cmd, &$buf[..args.len()])
    }};
}

/// Pack `words` big-endian into the front of `buf`.
fn words<'a>(buf: &'a mut [u8; 6], words: &[u16]) -> &'a [u8] {
    for (dst, word) in buf.chunks_mut(2).zip(words) {
        dst.copy_from_slice(&word.to_be_bytes());
    }
    &buf[..words.len() * 2]
}

impl Command {
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), DI::Error>
    where
        DI: CommandChannel,
    {
        let mut arg_buf = [0u8; 6];
        let (cmd, data): (u8, &[u8]) = match self {
            Command::SoftwareReset => ok_command!(arg_buf, SWRESET, []),
            Command::SetSleepMode(ena) => ok_command!(
                arg_buf,
                match ena {
                    true => SLPIN,
                    false => SLPOUT,
                },
                []
            ),
            Command::NormalDisplayMode => ok_command!(arg_buf, NORON, []),
            Command::SetDisplayOn(ena) => ok_command!(
                arg_buf,
                match ena {
                    true => DISPON,
                    false => DISPOFF,
                },
                []
            ),
            Command::SetColumnAddress(start, end) => (CASET, words(&mut arg_buf, &[start, end])),
            Command::SetRowAddress(start, end) => (RASET, words(&mut arg_buf, &[start, end])),
            Command::SetMemoryAccessControl(mad) => ok_command!(arg_buf, MADCTL, [mad]),
            Command::SetPixelFormat(depth) => ok_command!(arg_buf, COLMOD, [depth.colmod()]),
            Command::SetVerticalScrollDefinition(first, scrolling, last) => (
                VSCRDEF,
                words(&mut arg_buf, &[first, scrolling, last]),
            ),
            Command::SetVerticalScrollStart(line) => (VSCRSADD, words(&mut arg_buf, &[line])),
            Command::SetCommandSetControl(param) => ok_command!(arg_buf, CSCON, [param]),
            Command::SetDisplayInversionControl(mode) => ok_command!(arg_buf, DIC, [mode]),
            Command::SetDisplayFunctionControl(a, b, c) => ok_command!(arg_buf, DFC, [a, b, c]),
            Command::SetPowerControl2(v) => ok_command!(arg_buf, PWR2, [v]),
            Command::SetPowerControl3(v) => ok_command!(arg_buf, PWR3, [v]),
            Command::SetVcomControl(v) => ok_command!(arg_buf, VCMPCTL, [v]),
        };
        iface.write_command(cmd, data)
    }
}

impl<'a> BufCommand<'a> {
    pub fn send<DI>(self, iface: &mut DI) -> Result<(), DI::Error>
    where
        DI: CommandChannel,
    {
        let (cmd, data): (u8, &[u8]) = match self {
            BufCommand::SetPositiveGamma(table) => (PGC, &table[..]),
            BufCommand::SetNegativeGamma(table) => (NGC, &table[..]),
            BufCommand::SetDisplayOutputControl(params) => (DOCA, &params[..]),
        };
        iface.write_command(cmd, data)
    }
}
