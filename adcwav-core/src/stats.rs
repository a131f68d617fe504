//! Описательная статистика сигнала.
//!
//! Поле [`SignalStatistics::rms`] исторически называется «RMS», но содержит
//! стандартное отклонение генеральной совокупности (центрированное
//! значение), а не корень из среднего квадрата сырых выборок. Формула
//! сохранена ради совместимости с уже накопленными отчётами; несоответствие
//! названия известно.

use adcwav_types::{AdcError, AdcResult};

/// Сводка по последовательности выборок.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalStatistics {
    /// Количество выборок
    pub count: usize,
    /// Медиана; для чётной длины — среднее двух центральных значений
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// `max(median - min, max - median)` — опорная амплитуда нормировки
    pub spread: f64,
    /// Стандартное отклонение (population), см. заметку модуля
    pub rms: f64,
}

impl SignalStatistics {
    /// Считает статистику по непустой последовательности.
    pub fn compute<T: Copy + Into<f64>>(samples: &[T]) -> AdcResult<Self> {
        if samples.is_empty() {
            return Err(AdcError::EmptySequence);
        }

        let mut sorted: Vec<f64> = samples.iter().map(|&s| s.into()).collect();
        sorted.sort_unstable_by(f64::total_cmp);

        let count = sorted.len();
        let min = sorted[0];
        let max = sorted[count - 1];
        let median = median_of_sorted(&sorted);

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted
            .iter()
            .map(|&x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>()
            / count as f64;

        Ok(SignalStatistics {
            count,
            median,
            mean,
            min,
            max,
            spread: (median - min).max(max - median),
            rms: variance.sqrt(),
        })
    }

    /// `true`, если сигнал постоянен (или разброс не определён) и
    /// нормировать его нельзя.
    pub fn is_degenerate(&self) -> bool {
        self.spread.is_nan() || self.spread <= 0.0
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;

    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

impl std::fmt::Display for SignalStatistics {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "  Samples       : {}", self.count)?;
        writeln!(f, "  Mean          : {:.3}", self.mean)?;
        writeln!(f, "  Median        : {:.3}", self.median)?;
        writeln!(f, "  Min / Max     : {} / {}", self.min, self.max)?;
        writeln!(f, "  Spread        : {:.3}", self.spread)?;
        write!(f, "  RMS (std dev) : {:.3}", self.rms)
    }
}
