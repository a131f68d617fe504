//! Подготовка рядов для графиков: амплитудный спектр и осциллограмма.

use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::debug;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::{AnalyzerError, AnalyzerResult};

/// Что строить.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    /// Односторонний амплитудный спектр, ось X в герцах
    Frequency,
    /// Значение выборки во времени, ось X в секундах
    Amplitude,
}

/// Ряд точек графика с подписями осей.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub points: Vec<(f64, f64)>,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

/// Моно сигнал, прочитанный из WAV.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

impl PlotMode {
    /// Имя подкаталога для графиков этого режима.
    pub fn subdir(&self) -> &'static str {
        match self {
            PlotMode::Frequency => "Frequency",
            PlotMode::Amplitude => "Amplitude",
        }
    }

    pub fn series(
        &self,
        signal: &Signal,
    ) -> Series {
        match self {
            PlotMode::Frequency => Series {
                points: magnitude_spectrum(&signal.samples, signal.sample_rate_hz),
                x_label: "Frequency [Hz]",
                y_label: "Amplitude",
            },
            PlotMode::Amplitude => Series {
                points: waveform(&signal.samples, signal.sample_rate_hz),
                x_label: "Time [s]",
                y_label: "Amplitude",
            },
        }
    }
}

impl std::fmt::Display for PlotMode {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            PlotMode::Frequency => write!(f, "frequency"),
            PlotMode::Amplitude => write!(f, "amplitude"),
        }
    }
}

impl std::str::FromStr for PlotMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "f" | "freq" | "frequency" => Ok(PlotMode::Frequency),
            "a" | "amp" | "amplitude" => Ok(PlotMode::Amplitude),
            _ => Err(format!("Unknown plot mode: '{s}'. Use: f, a")),
        }
    }
}

impl Signal {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }

        self.samples.len() as f64 / self.sample_rate_hz as f64
    }
}

/// Читает WAV и берёт первый канал, не более `max_samples` выборок.
pub fn load_wav<P: AsRef<Path>>(
    path: P,
    max_samples: usize,
) -> AnalyzerResult<Signal> {
    let path = path.as_ref();
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;
    let limit = max_samples.saturating_mul(channels);

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Int => reader
            .samples::<i32>()
            .take(limit)
            .map(|s| s.map(|v| v as f32))
            .collect::<Result<_, _>>()?,
        SampleFormat::Float => reader
            .samples::<f32>()
            .take(limit)
            .collect::<Result<_, _>>()?,
    };

    let samples: Vec<f32> = interleaved.into_iter().step_by(channels).collect();

    if samples.is_empty() {
        return Err(AnalyzerError::EmptyInput(path.to_path_buf()));
    }

    debug!(
        "{:?}: {} samples @ {} Hz, {} ch",
        path,
        samples.len(),
        spec.sample_rate,
        spec.channels
    );

    Ok(Signal {
        sample_rate_hz: spec.sample_rate,
        samples,
    })
}

/// Односторонний амплитудный спектр: `(частота Гц, |X_k| нормированный)`.
///
/// Возвращает `n/2 + 1` точек. Нормировка такова, что синус амплитуды `A`
/// на частоте бина даёт пик `A`.
pub fn magnitude_spectrum(
    samples: &[f32],
    sample_rate_hz: u32,
) -> Vec<(f64, f64)> {
    let n = samples.len();

    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex<f32>> = samples.iter().map(|&s| Complex::new(s, 0.0)).collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let bin_hz = sample_rate_hz as f64 / n as f64;
    let half = n / 2;

    buffer
        .iter()
        .take(half + 1)
        .enumerate()
        .map(|(k, c)| {
            // DC и Найквист не имеют зеркальной пары
            let one_sided = if k == 0 || (n % 2 == 0 && k == half) {
                1.0
            } else {
                2.0
            };
            (k as f64 * bin_hz, c.norm() as f64 * one_sided / n as f64)
        })
        .collect()
}

/// Осциллограмма: `(время с, значение)`.
pub fn waveform(
    samples: &[f32],
    sample_rate_hz: u32,
) -> Vec<(f64, f64)> {
    let dt = if sample_rate_hz == 0 {
        1.0
    } else {
        1.0 / sample_rate_hz as f64
    };

    samples
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 * dt, s as f64))
        .collect()
}
