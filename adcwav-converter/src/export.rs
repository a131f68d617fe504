//! Побочные выгрузки: CSV выборок, текстовая сводка статистики, JSON отчёт.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use adcwav_core::SignalStatistics;
use log::info;
use serde::Serialize;

use crate::{metrics::BatchSummary, pipeline::FileReport, ConverterError, ConverterResult};

/// Исход обработки одного файла в пакете.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted(FileReport),
    Failed { input: PathBuf, error: String },
    /// Не отправлен в работу из-за остановки (Ctrl+C)
    Skipped { input: PathBuf },
}

/// Отчёт по всему запуску.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
    pub summary: BatchSummary,
}

impl FileOutcome {
    pub fn input(&self) -> &Path {
        match self {
            FileOutcome::Converted(r) => &r.input,
            FileOutcome::Failed { input, .. } | FileOutcome::Skipped { input } => input,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self, FileOutcome::Converted(_))
    }
}

/// Пишет выборки АЦП по одной на строку.
pub fn write_samples_csv<P: AsRef<Path>>(
    path: P,
    samples: &[u16],
) -> ConverterResult<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);

    for s in samples {
        writeln!(out, "{s}")?;
    }

    out.flush()?;
    info!("CSV saved: {:?} ({} samples)", path, samples.len());

    Ok(())
}

/// Читает выборки, сохранённые [`write_samples_csv`].
///
/// Пустые строки пропускаются; из строки с запятыми берётся первое поле.
pub fn read_samples_csv<P: AsRef<Path>>(path: P) -> ConverterResult<Vec<u16>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let mut samples = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let field = line.split(',').next().unwrap_or("").trim();

        if field.is_empty() {
            continue;
        }

        let value = field.parse::<u16>().map_err(|_| ConverterError::InvalidCsv {
            path: path.to_path_buf(),
            line: i + 1,
            value: field.to_string(),
        })?;

        samples.push(value);
    }

    Ok(samples)
}

/// Пишет текстовую сводку статистики сигнала.
pub fn write_rms_summary<P: AsRef<Path>>(
    path: P,
    source: &Path,
    stats: &SignalStatistics,
) -> ConverterResult<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "Source: {}", source.display())?;
    writeln!(out, "RMS in ADC counts: {:.6}", stats.rms)?;
    writeln!(out, "{stats}")?;
    out.flush()?;

    Ok(())
}

/// Сохраняет JSON отчёт по запуску.
pub fn write_batch_report<P: AsRef<Path>>(
    path: P,
    report: &BatchReport,
) -> ConverterResult<()> {
    let path = path.as_ref();
    let out = BufWriter::new(File::create(path)?);

    serde_json::to_writer_pretty(out, report)?;
    info!("Report saved: {path:?}");

    Ok(())
}
