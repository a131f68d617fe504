//! Пример: чтение лога АЦП через SampleStreamReader
//!
//! Демонстрирует:
//! - чтение заголовка сессии
//! - итерацию блоков со статистикой переполнений
//! - сводную статистику сигнала

use std::fs::File;

use adcwav_core::{SampleStreamReader, SignalStatistics};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = "adcwav-core/test_output.bin";

    let file = File::open(input_path)?;
    let mut reader = SampleStreamReader::new(file)?;

    let h = reader.header().clone();
    println!("✓ Header read");
    println!("  ADC clock     : {} Hz", h.adc_clock_hz);
    println!("  CPU clock     : {} Hz", h.cpu_clock_hz);
    println!("  Interval      : {} cycles", h.sample_interval_cycles);
    println!("  Sample width  : {:?}", h.sample_width());
    println!("  Pins          : {} {:?}", h.pin_count, h.pin_numbers);

    let mut samples = Vec::new();
    for block in reader.by_ref() {
        samples.extend(block?.samples);
    }

    println!("\n✓ Read complete ({:?})", reader.termination());
    println!("  Blocks ok     : {}", reader.stats().blocks_ok);
    println!("  Overruns      : {}", reader.stats().overruns_total);
    println!("  Bytes         : {}", reader.stats().bytes_consumed);

    let stats = SignalStatistics::compute(&samples)?;
    println!("\nSignal:\n{stats}");

    Ok(())
}
