use core::fmt;

use super::{SerialSink, vga_text::TextRenderer};

/// The early boot console: every byte goes to the screen, and to the serial line as well once
/// dual output has been switched on.
///
/// Dual output is a one-way switch. Nothing here synchronises the two sinks beyond call order,
/// so a scroll on screen and the matching serial transmission are independent events.
pub struct Console<'a, S: SerialSink> {
    screen: TextRenderer<'a>,
    serial: S,
    dual: bool,
}

impl<'a, S: SerialSink> Console<'a, S> {
    /// Both sinks must already be initialized.
    pub fn new(screen: TextRenderer<'a>, serial: S) -> Self {
        Self {
            screen,
            serial,
            dual: false,
        }
    }

    /// Starts mirroring output to the serial sink. Calling it again has no effect.
    pub fn enable_dual_output(&mut self) {
        self.dual = true;
    }

    pub fn is_dual_output(&self) -> bool {
        self.dual
    }

    /// Routes `bytes` up to the first NUL.
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().take_while(|&&byte| byte != 0) {
            self.screen.write_char(byte);
            if self.dual {
                self.serial.put_char(byte);
            }
        }
    }

    /// Same routing as [`Self::write`], for call sites that mean to reach both sinks.
    pub fn write_dual(&mut self, bytes: &[u8]) {
        self.write(bytes);
    }

    pub fn screen(&self) -> &TextRenderer<'a> {
        &self.screen
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn into_parts(self) -> (TextRenderer<'a>, S) {
        (self.screen, self.serial)
    }
}

impl<S: SerialSink> fmt::Write for Console<'_, S> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}
