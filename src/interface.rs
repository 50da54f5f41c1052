//! The command channel used to talk to the controller. The driver only needs a handful of bus
//! transactions: a command byte followed by parameter bytes or words, a repeated-value fill, and
//! reads of bytes or words following a command byte.

/// A bus capable of carrying ST7796 command/data transactions. Every transaction starts with a
/// command byte sent with the D/C line low; parameter and pixel data follow with D/C high.
pub trait CommandChannel {
    type Error;

    /// Send `cmd` followed by `data`.
    fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Send `cmd` followed by `data`, each word high byte first.
    fn write_command16(&mut self, cmd: u8, data: &[u16]) -> Result<(), Self::Error>;

    /// Send `cmd` followed by `pattern` repeated `count` times. Used for solid fills so that the
    /// driver never has to materialize a full-window buffer.
    fn fill_command(&mut self, cmd: u8, pattern: &[u8], count: u32) -> Result<(), Self::Error>;

    /// Send `cmd`, skip `dummy_cycles` clock cycles, then read `buf.len()` bytes.
    fn read_command(&mut self, cmd: u8, buf: &mut [u8], dummy_cycles: u32)
        -> Result<(), Self::Error>;

    /// Send `cmd`, skip `dummy_cycles` clock cycles, then read `buf.len()` words, high byte first.
    fn read_command16(
        &mut self,
        cmd: u8,
        buf: &mut [u16],
        dummy_cycles: u32,
    ) -> Result<(), Self::Error>;

    /// Block for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Switch the panel backlight.
    fn backlight(&mut self, on: bool) -> Result<(), Self::Error>;
}

pub mod spi {
    //! The SPI interface supports the "4-wire" serial interface of the controller, such that each
    //! word on the SPI bus is 8 bits and a separate D/C GPIO selects between command and data.
    //! Reads use the same SDA/MISO arrangement; dummy clock cycles that are not a multiple of 8
    //! are removed by shifting the received bit stream.

    use hal::blocking::delay::DelayMs;
    use hal::blocking::spi::{Transfer, Write};
    use hal::digital::v2::OutputPin;

    use super::CommandChannel;

    /// Size of the staging buffer used for conversions. Divisible by both 2 and 3 so 16-bit and
    /// 24-bit pixels never straddle two writes.
    const CHUNK: usize = 48;

    /// Failure of the SPI interface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum SpiError<SpiE, PinE> {
        /// The SPI peripheral reported an error.
        Spi(SpiE),
        /// Driving the D/C or backlight GPIO failed.
        Pin(PinE),
    }

    pub struct SpiInterface<SPI, DC, BL, DELAY> {
        /// The SPI master device connected to the ST7796.
        spi: SPI,
        /// A GPIO output pin connected to the D/C (data/command) pin of the ST7796.
        dc: DC,
        /// A GPIO output pin switching the backlight, active high.
        bl: BL,
        delay: DELAY,
    }

    impl<SPI, DC, BL, DELAY, SpiE, PinE> SpiInterface<SPI, DC, BL, DELAY>
    where
        SPI: Write<u8, Error = SpiE> + Transfer<u8, Error = SpiE>,
        DC: OutputPin<Error = PinE>,
        BL: OutputPin<Error = PinE>,
        DELAY: DelayMs<u32>,
    {
        /// Create a new SPI interface to communicate with the display controller. `spi` is the SPI
        /// master device, `dc` is the GPIO output pin connected to the D/C pin of the ST7796, `bl`
        /// drives the backlight and `delay` provides the millisecond waits of the power-on
        /// sequence.
        pub fn new(spi: SPI, dc: DC, bl: BL, delay: DELAY) -> Self {
            Self { spi, dc, bl, delay }
        }

        /// Give back the peripherals owned by the interface.
        pub fn release(self) -> (SPI, DC, BL, DELAY) {
            (self.spi, self.dc, self.bl, self.delay)
        }

        fn command(&mut self, cmd: u8) -> Result<(), SpiError<SpiE, PinE>> {
            self.dc.set_low().map_err(SpiError::Pin)?;
            self.spi.write(&[cmd]).map_err(SpiError::Spi)?;
            self.dc.set_high().map_err(SpiError::Pin)
        }

        fn data(&mut self, buf: &[u8]) -> Result<(), SpiError<SpiE, PinE>> {
            if buf.is_empty() {
                return Ok(());
            }
            self.spi.write(buf).map_err(SpiError::Spi)
        }

        /// Clock `len` bytes in from the controller after skipping `dummy_cycles` bits, handing
        /// each byte and its index to `sink`.
        fn receive<F>(
            &mut self,
            len: usize,
            dummy_cycles: u32,
            mut sink: F,
        ) -> Result<(), SpiError<SpiE, PinE>>
        where
            F: FnMut(usize, u8),
        {
            let mut single = [0u8; 1];
            for _ in 0..dummy_cycles / 8 {
                single[0] = 0;
                self.spi.transfer(&mut single).map_err(SpiError::Spi)?;
            }

            // With a partial dummy byte, every output byte spans two wire bytes; prime the carry
            // with the first one.
            let shift = dummy_cycles % 8;
            let mut carry = 0u8;
            if shift != 0 && len != 0 {
                single[0] = 0;
                self.spi.transfer(&mut single).map_err(SpiError::Spi)?;
                carry = single[0];
            }

            let mut buf = [0u8; CHUNK];
            let mut done = 0;
            while done < len {
                let n = (len - done).min(CHUNK);
                for b in buf[..n].iter_mut() {
                    *b = 0;
                }
                self.spi.transfer(&mut buf[..n]).map_err(SpiError::Spi)?;
                for (i, &wire) in buf[..n].iter().enumerate() {
                    let byte = if shift == 0 {
                        wire
                    } else {
                        let out = (carry << shift) | (wire >> (8 - shift));
                        carry = wire;
                        out
                    };
                    sink(done + i, byte);
                }
                done += n;
            }
            Ok(())
        }
    }

    impl<SPI, DC, BL, DELAY, SpiE, PinE> CommandChannel for SpiInterface<SPI, DC, BL, DELAY>
    where
        SPI: Write<u8, Error = SpiE> + Transfer<u8, Error = SpiE>,
        DC: OutputPin<Error = PinE>,
        BL: OutputPin<Error = PinE>,
        DELAY: DelayMs<u32>,
    {
        type Error = SpiError<SpiE, PinE>;

        fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), Self::Error> {
            self.command(cmd)?;
            self.data(data)
        }

        fn write_command16(&mut self, cmd: u8, data: &[u16]) -> Result<(), Self::Error> {
            self.command(cmd)?;
            let mut buf = [0u8; CHUNK];
            for words in data.chunks(CHUNK / 2) {
                for (dst, word) in buf.chunks_mut(2).zip(words) {
                    dst.copy_from_slice(&word.to_be_bytes());
                }
                self.data(&buf[..words.len() * 2])?;
            }
            Ok(())
        }

        fn fill_command(&mut self, cmd: u8, pattern: &[u8], count: u32) -> Result<(), Self::Error> {
            self.command(cmd)?;
            if pattern.is_empty() {
                return Ok(());
            }
            if pattern.len() > CHUNK {
                for _ in 0..count {
                    self.data(pattern)?;
                }
                return Ok(());
            }

            // Stage as many whole copies of the pattern as fit, then replay the staging buffer.
            // Counted in u32; usize may be 16 bits.
            let per_chunk = (CHUNK / pattern.len()) as u32;
            let mut buf = [0u8; CHUNK];
            for dst in buf.chunks_mut(pattern.len()).take(per_chunk as usize) {
                dst.copy_from_slice(pattern);
            }
            let mut remaining = count;
            while remaining > 0 {
                let n = remaining.min(per_chunk);
                self.data(&buf[..n as usize * pattern.len()])?;
                remaining -= n;
            }
            Ok(())
        }

        fn read_command(
            &mut self,
            cmd: u8,
            buf: &mut [u8],
            dummy_cycles: u32,
        ) -> Result<(), Self::Error> {
            self.command(cmd)?;
            let len = buf.len();
            self.receive(len, dummy_cycles, |i, byte| buf[i] = byte)
        }

        fn read_command16(
            &mut self,
            cmd: u8,
            buf: &mut [u16],
            dummy_cycles: u32,
        ) -> Result<(), Self::Error> {
            self.command(cmd)?;
            let len = buf.len() * 2;
            self.receive(len, dummy_cycles, |i, byte| {
                let word = &mut buf[i / 2];
                if i % 2 == 0 {
                    *word = u16::from(byte) << 8;
                } else {
                    *word |= u16::from(byte);
                }
            })
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delay.delay_ms(ms);
        }

        fn backlight(&mut self, on: bool) -> Result<(), Self::Error> {
            if on {
                self.bl.set_high().map_err(SpiError::Pin)
            } else {
                self.bl.set_low().map_err(SpiError::Pin)
            }
        }
    }

}

#[cfg(test)]
pub mod test_spy {
    //! A channel for use in unit tests to spy on whatever was sent to it, feed canned read
    //! responses, and inject bus failures.

    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::CommandChannel;

    /// One recorded channel transaction.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Cmd(u8, Vec<u8>),
        Cmd16(u8, Vec<u16>),
        Fill(u8, Vec<u8>, u32),
        Read(u8, usize, u32),
        Read16(u8, usize, u32),
        Delay(u32),
        Backlight(bool),
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SpyError;

    #[derive(Default)]
    struct Inner {
        sent: Vec<Sent>,
        replies: VecDeque<u8>,
        replies16: VecDeque<u16>,
        fail_after: Option<usize>,
    }

    /// Handles produced by `split` share one transaction log, so a test can keep a handle while
    /// the driver owns the other.
    #[derive(Clone)]
    pub struct TestSpyInterface {
        inner: Rc<RefCell<Inner>>,
    }

    impl TestSpyInterface {
        pub fn new() -> Self {
            TestSpyInterface {
                inner: Rc::new(RefCell::new(Inner::default())),
            }
        }
        pub fn split(&self) -> Self {
            self.clone()
        }
        pub fn sent(&self) -> Vec<Sent> {
            self.inner.borrow().sent.clone()
        }
        /// Assert that the most recent transaction was `cmd` with parameters `data`.
        pub fn check(&self, cmd: u8, data: &[u8]) {
            assert_eq!(
                self.inner.borrow().sent.last(),
                Some(&Sent::Cmd(cmd, data.to_vec()))
            );
        }
        pub fn check_multi(&self, expected: &[Sent]) {
            assert_eq!(self.inner.borrow().sent, expected);
        }
        pub fn clear(&mut self) {
            self.inner.borrow_mut().sent.clear()
        }
        /// Number of recorded commands carrying command byte `cmd`.
        pub fn count_cmd(&self, cmd: u8) -> usize {
            self.inner
                .borrow()
                .sent
                .iter()
                .filter(|s| match s {
                    Sent::Cmd(c, _)
                    | Sent::Cmd16(c, _)
                    | Sent::Fill(c, _, _)
                    | Sent::Read(c, _, _)
                    | Sent::Read16(c, _, _) => *c == cmd,
                    _ => false,
                })
                .count()
        }
        /// Queue bytes returned by subsequent `read_command` calls.
        pub fn reply(&self, bytes: &[u8]) {
            self.inner.borrow_mut().replies.extend(bytes.iter().cloned());
        }
        /// Queue words returned by subsequent `read_command16` calls.
        pub fn reply16(&self, words: &[u16]) {
            self.inner.borrow_mut().replies16.extend(words.iter().cloned());
        }
        /// Let `n` more bus transactions succeed, then fail the next one.
        pub fn fail_after(&self, n: usize) {
            self.inner.borrow_mut().fail_after = Some(n);
        }

        fn record(&self, sent: Sent) -> Result<(), SpyError> {
            let mut inner = self.inner.borrow_mut();
            match inner.fail_after {
                Some(0) => {
                    inner.fail_after = None;
                    return Err(SpyError);
                }
                Some(n) => inner.fail_after = Some(n - 1),
                None => {}
            }
            inner.sent.push(sent);
            Ok(())
        }
    }

    impl CommandChannel for TestSpyInterface {
        type Error = SpyError;

        fn write_command(&mut self, cmd: u8, data: &[u8]) -> Result<(), SpyError> {
            self.record(Sent::Cmd(cmd, data.to_vec()))
        }
        fn write_command16(&mut self, cmd: u8, data: &[u16]) -> Result<(), SpyError> {
            self.record(Sent::Cmd16(cmd, data.to_vec()))
        }
        fn fill_command(&mut self, cmd: u8, pattern: &[u8], count: u32) -> Result<(), SpyError> {
            self.record(Sent::Fill(cmd, pattern.to_vec(), count))
        }
        fn read_command(&mut self, cmd: u8, buf: &mut [u8], dummy: u32) -> Result<(), SpyError> {
            self.record(Sent::Read(cmd, buf.len(), dummy))?;
            let mut inner = self.inner.borrow_mut();
            for b in buf.iter_mut() {
                *b = inner.replies.pop_front().unwrap_or(0);
            }
            Ok(())
        }
        fn read_command16(
            &mut self,
            cmd: u8,
            buf: &mut [u16],
            dummy: u32,
        ) -> Result<(), SpyError> {
            self.record(Sent::Read16(cmd, buf.len(), dummy))?;
            let mut inner = self.inner.borrow_mut();
            for w in buf.iter_mut() {
                *w = inner.replies16.pop_front().unwrap_or(0);
            }
            Ok(())
        }
        fn delay_ms(&mut self, ms: u32) {
            self.inner.borrow_mut().sent.push(Sent::Delay(ms));
        }
        fn backlight(&mut self, on: bool) -> Result<(), SpyError> {
            self.record(Sent::Backlight(on))
        }
    }
}
