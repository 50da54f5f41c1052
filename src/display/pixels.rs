//! Pixel data transfers. Pixels are RGB565 everywhere in the API and converted to the configured
//! wire depth here. When writes and reads use different depths, COLMOD is switched lazily on the
//! first transfer in the other direction.

use itertools::Itertools;
use log::trace;

use super::Display;
use crate::color::{self, rgb565_to_rgb888, rgb888_to_rgb565, WireDepth};
use crate::command::consts::{RAMRD, RAMRDC, RAMWR, RAMWRC};
use crate::command::Command;
use crate::error::Error;
use crate::interface::CommandChannel;

/// Pixels staged per 24-bit transfer; the first chunk uses the plain memory command and the rest
/// use its "continue" form.
const CHUNK_PIXELS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TransferDirection {
    Write,
    Read,
}

impl<DI> Display<DI>
where
    DI: CommandChannel,
{
    fn select_transfer(&mut self, dir: TransferDirection) -> Result<(), Error<DI::Error>> {
        if !self.config.split_depths() || self.state.last_transfer == Some(dir) {
            return Ok(());
        }
        let depth = match dir {
            TransferDirection::Write => self.config.write_depth,
            TransferDirection::Read => self.config.read_depth,
        };
        trace!("st7796: {:?} transfers at {:?}", dir, depth);
        self.send(Command::SetPixelFormat(depth))?;
        self.state.last_transfer = Some(dir);
        Ok(())
    }

    /// Stream `count` copies of `color` into the current window.
    pub(crate) fn write_pixels(&mut self, color: u16, count: u32) -> Result<(), Error<DI::Error>> {
        self.select_transfer(TransferDirection::Write)?;
        let mut px = [0u8; 3];
        let n = color::encode(self.config.write_depth, color, &mut px);
        let r = self.iface.fill_command(RAMWR, &px[..n], count);
        self.bus(r)
    }

    /// Stream `pixels` into the current window.
    pub(crate) fn write_image(&mut self, pixels: &[u16]) -> Result<(), Error<DI::Error>> {
        self.select_transfer(TransferDirection::Write)?;
        match self.config.write_depth {
            WireDepth::Rgb565 => {
                let r = self.iface.write_command16(RAMWR, pixels);
                self.bus(r)
            }
            WireDepth::Rgb888 => {
                if pixels.is_empty() {
                    let r = self.iface.write_command(RAMWR, &[]);
                    return self.bus(r);
                }
                let mut buf = [0u8; CHUNK_PIXELS * 3];
                for (i, chunk) in pixels.chunks(CHUNK_PIXELS).enumerate() {
                    for (dst, &p) in buf.chunks_mut(3).zip(chunk) {
                        dst.copy_from_slice(&rgb565_to_rgb888(p));
                    }
                    let cmd = if i == 0 { RAMWR } else { RAMWRC };
                    let r = self.iface.write_command(cmd, &buf[..chunk.len() * 3]);
                    self.bus(r)?;
                }
                Ok(())
            }
        }
    }

    /// Fill `out` from the current window.
    pub(crate) fn read_pixels(&mut self, out: &mut [u16]) -> Result<(), Error<DI::Error>> {
        self.select_transfer(TransferDirection::Read)?;
        match self.config.read_depth {
            WireDepth::Rgb565 => {
                let r = self.iface.read_command16(RAMRD, out, 1);
                self.bus(r)
            }
            WireDepth::Rgb888 => {
                let mut raw = [0u8; CHUNK_PIXELS * 3];
                for (i, chunk) in out.chunks_mut(CHUNK_PIXELS).enumerate() {
                    let cmd = if i == 0 { RAMRD } else { RAMRDC };
                    let r = self.iface.read_command(cmd, &mut raw[..chunk.len() * 3], 1);
                    self.bus(r)?;
                    for (px, (red, green, blue)) in chunk.iter_mut().zip(raw.iter().cloned().tuples())
                    {
                        *px = rgb888_to_rgb565(red, green, blue);
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::interface::test_spy::{Sent, TestSpyInterface};
    use crate::orientation::Orientation;

    fn ready(cfg: Config) -> (TestSpyInterface, Display<TestSpyInterface>) {
        let mut di = TestSpyInterface::new();
        let mut disp = Display::new(di.split(), cfg.clear_on_init(false));
        disp.init().unwrap();
        di.clear();
        (di, disp)
    }

    #[test]
    fn colmod_follows_transfer_direction() {
        let (di, mut disp) = ready(Config::new(Orientation::Portrait0));
        let mut px = [0u16; 1];
        disp.write_pixels(0, 1).unwrap();
        disp.read_pixels(&mut px).unwrap();
        disp.read_pixels(&mut px).unwrap();
        disp.write_pixels(0, 1).unwrap();
        disp.write_image(&[0]).unwrap();
        #[cfg_attr(rustfmt, rustfmt_skip)]
        di.check_multi(&[
            Sent::Fill(RAMWR, vec![0, 0], 1),
            send!(0x3A, [0x66]),
            Sent::Read(RAMRD, 3, 1),
            Sent::Read(RAMRD, 3, 1),
            send!(0x3A, [0x55]),
            Sent::Fill(RAMWR, vec![0, 0], 1),
            Sent::Cmd16(RAMWR, vec![0]),
        ]);
    }

    #[test]
    fn equal_depths_never_switch() {
        let cfg = Config::new(Orientation::Portrait0)
            .write_depth(WireDepth::Rgb888)
            .read_depth(WireDepth::Rgb888);
        let (di, mut disp) = ready(cfg);
        let mut px = [0u16; 1];
        disp.read_pixels(&mut px).unwrap();
        disp.write_pixels(0, 1).unwrap();
        assert_eq!(di.count_cmd(0x3A), 0);
    }

    #[test]
    fn wide_24bit_writes_continue() {
        let cfg = Config::new(Orientation::Portrait0).write_depth(WireDepth::Rgb888);
        let (di, mut disp) = ready(cfg);
        let pixels = [0xF800u16; 20];
        disp.write_image(&pixels).unwrap();
        let first: Vec<u8> = [0xF8, 0, 0].iter().cloned().cycle().take(48).collect();
        let rest: Vec<u8> = [0xF8, 0, 0].iter().cloned().cycle().take(12).collect();
        di.check_multi(&[Sent::Cmd(RAMWR, first), Sent::Cmd(RAMWRC, rest)]);
    }

    #[test]
    fn empty_24bit_write_still_opens_memory() {
        let cfg = Config::new(Orientation::Portrait0).write_depth(WireDepth::Rgb888);
        let (di, mut disp) = ready(cfg);
        disp.write_image(&[]).unwrap();
        di.check_multi(&[send!(RAMWR)]);
    }

    #[test]
    fn wide_24bit_reads_continue() {
        let (di, mut disp) = ready(Config::new(Orientation::Portrait0));
        let mut reply = Vec::new();
        for _ in 0..17 {
            reply.extend_from_slice(&[0x00, 0x00, 0xF8]);
        }
        di.reply(&reply);
        let mut out = [0u16; 17];
        disp.read_pixels(&mut out).unwrap();
        assert!(out.iter().all(|&p| p == 0x001F));
        #[cfg_attr(rustfmt, rustfmt_skip)]
        di.check_multi(&[
            send!(0x3A, [0x66]),
            Sent::Read(RAMRD, 48, 1),
            Sent::Read(RAMRDC, 3, 1),
        ]);
    }
}
