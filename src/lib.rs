//! Driver library for the Sitronix ST7796 320x480 TFT display controller.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate embedded_hal as hal;
extern crate itertools;
extern crate log;

pub mod color;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod interface;
pub mod orientation;

// Re-exports for primary API.
pub use color::WireDepth;
pub use command::consts;
pub use config::Config;
pub use display::{Bitmap, Display, UserCommand};
pub use error::Error;
pub use interface::spi::SpiInterface;
pub use interface::CommandChannel;
pub use orientation::{ColorOrder, Orientation, ScanDirection};
