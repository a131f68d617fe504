//! Библиотека формата лога АЦП-логгера
//!
//! Декодирует бинарный лог (`.bin`: 512-байтный заголовок и блоки
//! `count, overrun, count × u16`), считает статистику, нормирует амплитуду
//! и пишет моно PCM16 WAV.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use adcwav_core::{convert, ConversionOptions};
//! use std::fs::File;
//!
//! let input = File::open("ADC_01.bin")?;
//! let output = File::create("ADC_01.wav")?;
//!
//! let report = convert(input, output, &ConversionOptions::default())?;
//! println!("{} frames, scale {}", report.frames_written, report.scale_factor);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod decoder;
pub mod format;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod stats;
pub mod wav;

pub use decoder::*;
pub use format::*;
pub use normalize::*;
pub use pipeline::*;
pub use reader::*;
pub use stats::*;
pub use wav::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
