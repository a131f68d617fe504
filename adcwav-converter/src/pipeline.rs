use std::{
    collections::HashSet,
    fs::File,
    path::{Path, PathBuf},
};

use adcwav_core::{prepare, ConversionReport};
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    export::{write_rms_summary, write_samples_csv},
    ConverterConfig, ConverterResult,
};

/// Задание для воркера: один входной файл и пути его артефактов.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    /// Порядковый номер в отсортированном списке входов
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
    stem: String,
}

/// Итог конвертации одного файла (попадает в JSON отчёт).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub blocks: u64,
    pub samples: u64,
    pub bytes_consumed: u64,
    pub overruns: u64,
    pub truncated: bool,
    pub median: f64,
    pub spread: f64,
    pub rms: f64,
    pub median_offset: i32,
    pub scale_factor: i32,
    pub clipped: usize,
    pub sample_rate_hz: u32,
    pub frames_written: u64,
}

impl FileJob {
    /// Имя выхода: основа имени входа + `.wav` в `output_dir`.
    pub fn new(
        index: usize,
        input: PathBuf,
        output_dir: &Path,
    ) -> Self {
        let stem = input_stem(&input, index);
        Self::with_stem(index, input, output_dir, stem)
    }

    /// Задание с явно заданной основой имени артефактов.
    pub fn with_stem(
        index: usize,
        input: PathBuf,
        output_dir: &Path,
        stem: String,
    ) -> Self {
        let output = output_dir.join(format!("{stem}.wav"));

        Self {
            index,
            input,
            output,
            stem,
        }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn csv_path(&self) -> PathBuf {
        self.sibling(&format!("{}_adc.csv", self.stem))
    }

    pub fn rms_path(&self) -> PathBuf {
        self.sibling(&format!("{}_rms.txt", self.stem))
    }

    fn sibling(
        &self,
        name: &str,
    ) -> PathBuf {
        self.output
            .parent()
            .map(|dir| dir.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

fn input_stem(
    input: &Path,
    index: usize,
) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("file_{index}"))
}

/// Задания для отсортированного списка входов.
///
/// Входы с совпадающей без учёта регистра основой имени (`a.bin` и
/// `a.BIN`) писали бы в один WAV. Первый сохраняет имя, следующие получают
/// суффикс `(n)`: `a(1).wav`, `a(1)_adc.csv`.
pub fn plan_jobs(
    inputs: Vec<PathBuf>,
    output_dir: &Path,
) -> Vec<FileJob> {
    let mut stems: Vec<String> = inputs
        .iter()
        .enumerate()
        .map(|(index, input)| input_stem(input, index))
        .collect();

    let mut taken = HashSet::new();
    let mut clashes = Vec::new();

    for (index, stem) in stems.iter().enumerate() {
        if !taken.insert(stem.to_lowercase()) {
            clashes.push(index);
        }
    }

    for index in clashes {
        let base = &stems[index];
        let Some(renamed) = (1..)
            .map(|n| format!("{base}({n})"))
            .find(|candidate| !taken.contains(&candidate.to_lowercase()))
        else {
            continue;
        };

        warn!(
            "{:?}: output name clashes with another input, writing {renamed}.wav",
            inputs[index]
        );
        taken.insert(renamed.to_lowercase());
        stems[index] = renamed;
    }

    inputs
        .into_iter()
        .zip(stems)
        .enumerate()
        .map(|(index, (input, stem))| FileJob::with_stem(index, input, output_dir, stem))
        .collect()
}

impl FileReport {
    pub fn new(
        job: &FileJob,
        report: &ConversionReport,
    ) -> Self {
        Self {
            input: job.input.clone(),
            output: job.output.clone(),
            blocks: report.stats.blocks_ok,
            samples: report.stats.samples_recovered,
            bytes_consumed: report.stats.bytes_consumed,
            overruns: report.stats.overruns_total,
            truncated: report.termination.is_damaged(),
            median: report.statistics.median,
            spread: report.statistics.spread,
            rms: report.statistics.rms,
            median_offset: report.median_offset,
            scale_factor: report.scale_factor,
            clipped: report.clipped,
            sample_rate_hz: report.sample_rate_hz,
            frames_written: report.frames_written,
        }
    }

    /// Длительность полученного WAV в секундах.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }

        self.frames_written as f64 / self.sample_rate_hz as f64
    }
}

/// Конвертирует один файл: .bin → WAV (+ экспорты по конфигурации).
///
/// WAV пишется только после успешной нормировки; при ошибке на выходе не
/// остаётся частичного WAV.
pub fn convert_file(
    job: &FileJob,
    config: &ConverterConfig,
) -> ConverterResult<FileReport> {
    debug!("Converting {:?} → {:?}", job.input, job.output);

    let file = File::open(&job.input)?;
    let prepared = prepare(file, &config.options)?;

    if config.export_csv {
        write_samples_csv(job.csv_path(), &prepared.stream.samples)?;
    }

    let report = prepared.write_file(&job.output)?;

    if config.export_rms {
        write_rms_summary(job.rms_path(), &job.input, &report.statistics)?;
    }

    let file_report = FileReport::new(job, &report);

    if file_report.truncated {
        warn!(
            "{:?}: stream ended on a damaged block, {} complete blocks kept",
            job.input, file_report.blocks
        );
    }

    info!(
        "✓ {:?}: {} samples, {:.1}s @ {} Hz, scale={}",
        job.input,
        file_report.samples,
        file_report.duration_secs(),
        file_report.sample_rate_hz,
        file_report.scale_factor
    );

    Ok(file_report)
}

#[cfg(test)]
mod tests {
    use adcwav_core::{DataBlockExt, SessionHeaderExt};
    use adcwav_types::{AdcError, DataBlock, SampleWidth, SessionHeader};

    use super::*;
    use crate::ConverterError;

    fn write_log(
        path: &Path,
        blocks: &[Vec<u16>],
    ) {
        let mut raw = SessionHeader::new(16_000_000, 16_000_000, 500)
            .serialize()
            .unwrap()
            .to_vec();

        for samples in blocks {
            raw.extend(
                DataBlock::new(samples.clone())
                    .serialize(SampleWidth::Bits16)
                    .unwrap(),
            );
        }
        std::fs::write(path, raw).unwrap();
    }

    #[test]
    fn test_job_paths() {
        let job = FileJob::new(3, PathBuf::from("bins/ADC_07.bin"), Path::new("WAVs"));

        assert_eq!(job.output, PathBuf::from("WAVs/ADC_07.wav"));
        assert_eq!(job.csv_path(), PathBuf::from("WAVs/ADC_07_adc.csv"));
        assert_eq!(job.rms_path(), PathBuf::from("WAVs/ADC_07_rms.txt"));
        assert_eq!(job.stem(), "ADC_07");
    }

    #[test]
    fn test_plan_jobs_renames_case_clashes() {
        let inputs = vec![
            PathBuf::from("bins/a(1).bin"),
            PathBuf::from("bins/a.BIN"),
            PathBuf::from("bins/a.bin"),
            PathBuf::from("bins/b.bin"),
        ];

        let jobs = plan_jobs(inputs, Path::new("WAVs"));
        let outputs: Vec<_> = jobs.iter().map(|j| j.output.clone()).collect();

        assert_eq!(
            outputs,
            vec![
                PathBuf::from("WAVs/a(1).wav"),
                PathBuf::from("WAVs/a.wav"),
                PathBuf::from("WAVs/a(2).wav"),
                PathBuf::from("WAVs/b.wav"),
            ]
        );
        assert_eq!(jobs[2].csv_path(), PathBuf::from("WAVs/a(2)_adc.csv"));
        assert_eq!(jobs[2].input, PathBuf::from("bins/a.bin"));
        assert_eq!(jobs[3].index, 3);
    }

    #[test]
    fn test_convert_file_with_exports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("session.bin");
        write_log(&input, &[vec![10, 20, 30, 40], vec![50, 60, 70, 80]]);

        let out_dir = dir.path().join("out");
        std::fs::create_dir(&out_dir).unwrap();

        let config = ConverterConfig {
            export_csv: true,
            export_rms: true,
            ..ConverterConfig::default()
        };
        let job = FileJob::new(0, input, &out_dir);
        let report = convert_file(&job, &config).unwrap();

        assert_eq!(report.samples, 8);
        assert_eq!(report.frames_written, 8);
        assert_eq!(report.scale_factor, 857);
        assert!(!report.truncated);
        assert!((report.duration_secs() - 8.0 / 32_000.0).abs() < 1e-12);

        assert!(job.output.exists());
        assert!(job.csv_path().exists());
        assert!(job.rms_path().exists());
    }

    #[test]
    fn test_degenerate_file_leaves_no_wav() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("flat.bin");
        write_log(&input, &[vec![512; 254]]);

        let job = FileJob::new(0, input, dir.path());
        let err = convert_file(&job, &ConverterConfig::default()).unwrap_err();

        assert!(matches!(
            err,
            ConverterError::Adc(AdcError::DegenerateSignal { .. })
        ));
        assert!(!job.output.exists());
    }

    #[test]
    fn test_missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let job = FileJob::new(0, dir.path().join("absent.bin"), dir.path());

        let err = convert_file(&job, &ConverterConfig::default()).unwrap_err();
        assert!(matches!(err, ConverterError::Io(_)));
    }
}
