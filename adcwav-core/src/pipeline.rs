//! Конвертация одного лога: чтение → статистика → нормировка → WAV.
//!
//! Этапы строго последовательны: каждый потребляет полный результат
//! предыдущего. Приёмник WAV трогается только после успешной нормировки.

use std::{
    io::{Read, Seek, Write},
    path::Path,
};

use adcwav_types::{AdcError, AdcResult, SessionHeader};
use log::info;

use crate::{
    normalize::{AmplitudeNormalizer, NormalizedSignal, DEFAULT_TARGET_PEAK},
    reader::{ReadStats, SampleStream, SampleStreamReader, Termination},
    stats::SignalStatistics,
    wav::{PcmEncoder, DEFAULT_SAMPLE_RATE_HZ},
};

/// Лимит блоков по умолчанию (~12.7 млрд выборок)
pub const DEFAULT_MAX_BLOCKS: u64 = 50_000_000;

/// Параметры конвертации одного файла.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Максимум читаемых блоков
    pub max_blocks: u64,
    /// Целевая пиковая амплитуда PCM
    pub target_peak: i32,
    /// Частота дискретизации WAV (Гц)
    pub sample_rate_hz: u32,
    /// Конвертировать только один вход (для многоканальных записей)
    pub pin_index: Option<usize>,
}

/// Файл прочитан и нормирован, WAV ещё не записан.
#[derive(Debug, Clone)]
pub struct PreparedConversion {
    pub stream: SampleStream,
    pub statistics: SignalStatistics,
    pub signal: NormalizedSignal,
    encoder: PcmEncoder,
}

/// Итог конвертации одного файла.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub header: SessionHeader,
    pub stats: ReadStats,
    pub termination: Termination,
    pub statistics: SignalStatistics,
    pub median_offset: i32,
    pub scale_factor: i32,
    pub clipped: usize,
    pub sample_rate_hz: u32,
    pub frames_written: u64,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            max_blocks: DEFAULT_MAX_BLOCKS,
            target_peak: DEFAULT_TARGET_PEAK,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            pin_index: None,
        }
    }
}

/// Читает и нормирует лог, не открывая приёмник.
pub fn prepare<R: Read>(
    source: R,
    options: &ConversionOptions,
) -> AdcResult<PreparedConversion> {
    let normalizer = AmplitudeNormalizer::new(options.target_peak)?;
    let encoder = PcmEncoder::new(options.sample_rate_hz)?;

    let stream = SampleStreamReader::new(source)?.read_samples(options.max_blocks)?;

    let selected = match options.pin_index {
        None => None,
        Some(i) => Some(stream.channel(i).ok_or_else(|| {
            AdcError::invalid_parameter(format!(
                "pin index {i} out of range: header declares {} pins",
                stream.header.pin_count
            ))
        })?),
    };
    let samples: &[u16] = selected.as_deref().unwrap_or(&stream.samples);

    let statistics = SignalStatistics::compute(samples)?;
    let signal = normalizer.normalize(samples, &statistics)?;

    info!(
        "Decoded {} samples from {} blocks ({:?}); median={:.1}, spread={:.1}, scale={}",
        stream.samples_read(),
        stream.blocks_read(),
        stream.termination,
        statistics.median,
        statistics.spread,
        signal.scale_factor,
    );

    Ok(PreparedConversion {
        stream,
        statistics,
        signal,
        encoder,
    })
}

/// Полная конвертация: один источник байт → один WAV приёмник.
pub fn convert<R: Read, W: Write + Seek>(
    source: R,
    sink: W,
    options: &ConversionOptions,
) -> AdcResult<ConversionReport> {
    prepare(source, options)?.write_to(sink)
}

impl PreparedConversion {
    /// Записывает WAV в произвольный приёмник.
    pub fn write_to<W: Write + Seek>(
        &self,
        sink: W,
    ) -> AdcResult<ConversionReport> {
        self.encoder.encode(sink, &self.signal.samples)?;
        Ok(self.report())
    }

    /// Записывает WAV файл атомарно (см. [`PcmEncoder::write_file`]).
    pub fn write_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> AdcResult<ConversionReport> {
        self.encoder.write_file(path, &self.signal.samples)?;
        Ok(self.report())
    }

    pub fn report(&self) -> ConversionReport {
        ConversionReport {
            header: self.stream.header.clone(),
            stats: self.stream.stats.clone(),
            termination: self.stream.termination,
            statistics: self.statistics,
            median_offset: self.signal.median_offset,
            scale_factor: self.signal.scale_factor,
            clipped: self.signal.clipped,
            sample_rate_hz: self.encoder.sample_rate_hz(),
            frames_written: self.signal.samples.len() as u64,
        }
    }
}
