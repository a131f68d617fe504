//! Центрирование и масштабирование выборок АЦП в PCM16.
//!
//! Типы на границах этапов фиксированы: `u16` сырые выборки → `i32` после
//! центрирования и масштабирования → `i16` после явного ограничения.
//! Значения за пределами `[-32768, 32767]` ограничиваются (clip), а не
//! заворачиваются переполнением. Это осознанная потеря: сигнал с
//! амплитудой больше опорной обрезается.

use adcwav_types::{AdcError, AdcResult};
use log::{debug, warn};

use crate::stats::SignalStatistics;

/// Целевая пиковая амплитуда по умолчанию
pub const DEFAULT_TARGET_PEAK: i32 = 30_000;

/// Нормировщик амплитуды к целевому пику.
#[derive(Debug, Clone, Copy)]
pub struct AmplitudeNormalizer {
    target_peak: i32,
}

/// Нормированный сигнал, готовый к записи в WAV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSignal {
    /// PCM16 выборки, та же длина и порядок, что у входа
    pub samples: Vec<i16>,
    /// Вычтенная медиана (округлённая)
    pub median_offset: i32,
    /// Целый коэффициент масштабирования
    pub scale_factor: i32,
    /// Сколько выборок было ограничено
    pub clipped: usize,
}

impl AmplitudeNormalizer {
    pub fn new(target_peak: i32) -> AdcResult<Self> {
        if target_peak <= 0 {
            return Err(AdcError::invalid_parameter(format!(
                "target peak amplitude must be positive, got {target_peak}"
            )));
        }

        Ok(Self { target_peak })
    }

    pub fn target_peak(&self) -> i32 {
        self.target_peak
    }

    /// `floor(target_peak / spread)`.
    ///
    /// Нулевой разброс — [`AdcError::DegenerateSignal`]; разброс больше
    /// целевого пика дал бы коэффициент 0 и тишину на выходе —
    /// [`AdcError::ScaleUnderflow`].
    pub fn scale_factor(
        &self,
        stats: &SignalStatistics,
    ) -> AdcResult<i32> {
        let spread = stats.spread;

        if stats.is_degenerate() {
            return Err(AdcError::DegenerateSignal {
                median: stats.median,
            });
        }

        let factor = (self.target_peak as f64 / spread).floor();

        if factor < 1.0 {
            return Err(AdcError::ScaleUnderflow {
                spread,
                target_peak: self.target_peak,
            });
        }

        Ok(factor.min(i32::MAX as f64) as i32)
    }

    /// Центрирует выборки относительно медианы и масштабирует к целевому пику.
    pub fn normalize(
        &self,
        samples: &[u16],
        stats: &SignalStatistics,
    ) -> AdcResult<NormalizedSignal> {
        let scale_factor = self.scale_factor(stats)?;
        let median_offset = median_offset(stats.median);

        debug!("Normalizing: median offset={median_offset}, scale factor={scale_factor}");

        let centered = center(samples, median_offset);
        let (samples, clipped) = scale_centered(&centered, scale_factor);

        if clipped > 0 {
            warn!(
                "{clipped} of {} samples clipped to the 16-bit range",
                samples.len()
            );
        }

        Ok(NormalizedSignal {
            samples,
            median_offset,
            scale_factor,
            clipped,
        })
    }
}

impl Default for AmplitudeNormalizer {
    fn default() -> Self {
        Self {
            target_peak: DEFAULT_TARGET_PEAK,
        }
    }
}

/// Медиана, округлённая до ближайшего целого (половины — от нуля).
pub fn median_offset(median: f64) -> i32 {
    median.round() as i32
}

/// Вычитает смещение из каждой выборки.
pub fn center(
    samples: &[u16],
    offset: i32,
) -> Vec<i32> {
    samples.iter().map(|&s| s as i32 - offset).collect()
}

/// Умножает центрированные выборки на `scale` и ограничивает до i16.
///
/// Возвращает PCM выборки и число ограниченных значений. Умножение
/// насыщающее, поэтому до ограничения переполнения i32 не бывает.
pub fn scale_centered(
    centered: &[i32],
    scale: i32,
) -> (Vec<i16>, usize) {
    let mut clipped = 0;

    let pcm = centered
        .iter()
        .map(|&c| {
            let scaled = c.saturating_mul(scale);
            let pcm = clamp_pcm16(scaled);
            if pcm as i32 != scaled {
                clipped += 1;
            }
            pcm
        })
        .collect();

    (pcm, clipped)
}

/// Явное ограничение до диапазона PCM16.
pub fn clamp_pcm16(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
