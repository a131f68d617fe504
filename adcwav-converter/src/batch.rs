use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};

use crate::{
    export::{write_batch_report, BatchReport, FileOutcome},
    metrics::BatchMetrics,
    pipeline::{convert_file, plan_jobs, FileJob},
    ConverterConfig, ConverterError, ConverterResult,
};

/// Оркестрирует пакетную конвертацию каталога.
pub struct BatchRunner {
    config: ConverterConfig,
    metrics: Arc<BatchMetrics>,
    stop_flag: Arc<AtomicBool>,
}

impl BatchRunner {
    /// Создаёт раннер. Возвращает также shared-ссылку на метрики.
    pub fn new(config: ConverterConfig) -> (Self, Arc<BatchMetrics>) {
        let metrics = BatchMetrics::new();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let runner = Self {
            config,
            metrics: metrics.clone(),
            stop_flag,
        };

        (runner, metrics)
    }

    /// Флаг остановки: новые файлы перестают выдаваться воркерам,
    /// начатые дорабатываются.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Запускает конвертацию. Блокируется до завершения всех воркеров.
    ///
    /// Ошибка возвращается только при проблемах с каталогами или отчётом;
    /// ошибки отдельных файлов попадают в [`FileOutcome::Failed`].
    pub fn run(&self) -> ConverterResult<BatchReport> {
        let cfg = &self.config;
        cfg.validate()?;

        let started = Instant::now();

        prepare_output_dir(&cfg.output_dir, cfg.clear_output)?;
        let inputs = discover_inputs(&cfg.input_dir, &cfg.input_extension)?;

        if inputs.is_empty() {
            warn!(
                "No .{} files found in {:?}",
                cfg.input_extension, cfg.input_dir
            );
        }

        let jobs = plan_jobs(inputs, &cfg.output_dir);
        let workers = cfg.workers.min(jobs.len()).max(1);
        info!(
            "Converting {} files from {:?} to {:?} on {workers} workers",
            jobs.len(),
            cfg.input_dir,
            cfg.output_dir
        );

        let (job_tx, job_rx) = crossbeam_channel::bounded::<FileJob>(workers * 2);
        let (done_tx, done_rx) = crossbeam_channel::unbounded::<(usize, FileOutcome)>();

        let mut outcomes = std::thread::scope(|s| {
            for worker_id in 0..workers {
                let jobs = job_rx.clone();
                let done = done_tx.clone();
                s.spawn(move || self.worker_loop(worker_id, jobs, done));
            }
            drop(job_rx);
            drop(done_tx);

            let skipped = self.dispatch(jobs, &job_tx);
            drop(job_tx);

            let mut outcomes: Vec<(usize, FileOutcome)> = done_rx.iter().collect();
            outcomes.extend(skipped);
            outcomes
        });

        outcomes.sort_by_key(|(index, _)| *index);

        let report = BatchReport {
            files: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
            summary: self.metrics.summary(&started),
        };

        if let Some(path) = &cfg.report_path {
            write_batch_report(path, &report)?;
        }

        Ok(report)
    }

    /// Раздаёт задания, пока не выставлен флаг остановки. Возвращает
    /// невыданные файлы.
    fn dispatch(
        &self,
        jobs: Vec<FileJob>,
        queue: &Sender<FileJob>,
    ) -> Vec<(usize, FileOutcome)> {
        let mut pending = jobs.into_iter();
        let mut skipped = Vec::new();

        for job in pending.by_ref() {
            if self.stop_flag.load(Ordering::Relaxed) {
                skipped.push((job.index, FileOutcome::Skipped { input: job.input }));
                break;
            }

            if let Err(e) = queue.send(job) {
                let job = e.into_inner();
                error!("All workers exited; {:?} not converted", job.input);
                skipped.push((job.index, FileOutcome::Skipped { input: job.input }));
                break;
            }
        }

        skipped.extend(pending.map(|job| (job.index, FileOutcome::Skipped { input: job.input })));

        if !skipped.is_empty() {
            warn!("{} files left unconverted", skipped.len());
            self.metrics.record_skipped(skipped.len() as u64);
        }

        skipped
    }

    fn worker_loop(
        &self,
        worker_id: usize,
        jobs: Receiver<FileJob>,
        done: Sender<(usize, FileOutcome)>,
    ) {
        for job in jobs.iter() {
            debug!("Worker {worker_id}: {:?}", job.input);

            let outcome = match convert_file(&job, &self.config) {
                Ok(report) => {
                    self.metrics.record_success(&report);
                    FileOutcome::Converted(report)
                }
                Err(e) => {
                    self.metrics.record_failure();
                    if e.is_input_fault() {
                        warn!("✗ {:?}: {e}", job.input);
                    } else {
                        error!("✗ {:?}: {e}", job.input);
                    }
                    FileOutcome::Failed {
                        input: job.input.clone(),
                        error: e.to_string(),
                    }
                }
            };

            if done.send((job.index, outcome)).is_err() {
                warn!("Worker {worker_id}: result channel closed");
                break;
            }
        }
    }
}

/// Создаёт выходной каталог; при `clear` удаляет из него все файлы.
///
/// Подкаталоги не трогаются.
pub fn prepare_output_dir(
    dir: &Path,
    clear: bool,
) -> ConverterResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        info!("Created output directory {dir:?}");
        return Ok(());
    }

    if !dir.is_dir() {
        return Err(ConverterError::Config(format!(
            "output path {dir:?} is not a directory"
        )));
    }

    if clear {
        let mut removed = 0;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;

            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Removed {removed} old files from {dir:?}");
        }
    }

    Ok(())
}

/// Список файлов каталога с данным расширением (без учёта регистра),
/// отсортированный по имени.
pub fn discover_inputs(
    dir: &Path,
    extension: &str,
) -> ConverterResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ConverterError::Config(format!(
            "input directory {dir:?} does not exist"
        )));
    }

    let wanted = extension.trim_start_matches('.');
    let mut inputs = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;

        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        let matches = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(wanted))
            .unwrap_or(false);

        if matches {
            inputs.push(path);
        }
    }

    inputs.sort();
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();

        for name in ["b.bin", "a.BIN", "c.txt", "d.bin.bak"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.bin")).unwrap();

        let found = discover_inputs(dir.path(), "bin").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.BIN", "b.bin"]);
    }

    #[test]
    fn test_discover_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_inputs(&dir.path().join("nope"), "bin").unwrap_err();
        assert!(matches!(err, ConverterError::Config(_)));
    }

    #[test]
    fn test_prepare_output_dir_creates_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("WAVs");

        prepare_output_dir(&out, true).unwrap();
        assert!(out.is_dir());

        fs::write(out.join("old.wav"), b"stale").unwrap();
        fs::create_dir(out.join("keep")).unwrap();

        prepare_output_dir(&out, false).unwrap();
        assert!(out.join("old.wav").exists());

        prepare_output_dir(&out, true).unwrap();
        assert!(!out.join("old.wav").exists());
        assert!(out.join("keep").is_dir());
    }

    #[test]
    fn test_stop_flag_skips_everything() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("bins");
        fs::create_dir(&input_dir).unwrap();
        for name in ["a.bin", "b.bin"] {
            fs::write(input_dir.join(name), b"").unwrap();
        }

        let config = ConverterConfig {
            input_dir,
            output_dir: dir.path().join("WAVs"),
            workers: 1,
            ..ConverterConfig::default()
        };
        let (runner, metrics) = BatchRunner::new(config);
        runner.stop_flag().store(true, Ordering::Relaxed);

        let report = runner.run().unwrap();

        assert_eq!(report.files.len(), 2);
        assert!(report
            .files
            .iter()
            .all(|f| matches!(f, FileOutcome::Skipped { .. })));
        assert_eq!(metrics.files_skipped.load(Ordering::Relaxed), 2);
        assert_eq!(report.files[0].input().file_name().unwrap(), "a.bin");
    }
}
