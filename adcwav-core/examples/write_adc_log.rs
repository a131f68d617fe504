//! Пример: запись синтетического лога АЦП
//!
//! Демонстрирует:
//! - сериализацию заголовка сессии
//! - генерацию синусоиды 440 Гц в 10-битном диапазоне АЦП
//! - запись блоков по 254 выборки

use std::{fs::File, io::Write};

use adcwav_core::{DataBlockExt, SessionHeaderExt, NOMINAL_SAMPLES_PER_BLOCK};
use adcwav_types::{DataBlock, SampleWidth, SessionHeader};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = "adcwav-core/test_output.bin";

    // --- Заголовок: АЦП 1 МГц, CPU 16 МГц, 500 тактов между выборками ---
    let header = SessionHeader::new(1_000_000, 16_000_000, 500);
    let rate = header.nominal_sample_rate_hz().unwrap_or(32_000.0);

    let mut file = File::create(output_path)?;
    file.write_all(&header.serialize()?)?;

    // --- Синусоида вокруг середины шкалы ---
    let num_blocks = 64;
    let per_block = NOMINAL_SAMPLES_PER_BLOCK as usize;

    for block_idx in 0..num_blocks {
        let samples: Vec<u16> = (0..per_block)
            .map(|i| {
                let t = (block_idx * per_block + i) as f64 / rate;
                let v = 512.0 + 400.0 * (2.0 * std::f64::consts::PI * 440.0 * t).sin();
                v.round() as u16
            })
            .collect();

        file.write_all(&DataBlock::new(samples).serialize(SampleWidth::Bits16)?)?;
    }

    println!("✓ Записано: {output_path}");
    println!("  Blocks      : {num_blocks}");
    println!("  Samples     : {}", num_blocks * per_block);
    println!("  Sample rate : {rate:.1} Hz");

    Ok(())
}
