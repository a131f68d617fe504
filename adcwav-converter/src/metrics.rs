use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use serde::Serialize;

use crate::pipeline::FileReport;

/// Метрики запуска, обновляемые lock-free из воркеров.
#[derive(Debug, Default)]
pub struct BatchMetrics {
    pub files_converted: AtomicU64,
    pub files_failed: AtomicU64,
    pub files_skipped: AtomicU64,
    pub files_truncated: AtomicU64,
    pub samples_decoded: AtomicU64,
    pub frames_written: AtomicU64,
    pub bytes_read: AtomicU64,
    pub samples_clipped: AtomicU64,
    pub overruns: AtomicU64,
}

/// Snapshot метрик для отображения / отчёта.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub duration_secs: f64,
    pub files_converted: u64,
    pub files_failed: u64,
    pub files_skipped: u64,
    pub files_truncated: u64,
    pub samples_decoded: u64,
    pub frames_written: u64,
    pub bytes_read: u64,
    pub samples_clipped: u64,
    pub overruns: u64,
    pub throughput_msps: f64,
    pub read_speed_mbps: f64,
}

impl BatchMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Учитывает успешно сконвертированный файл.
    pub fn record_success(
        &self,
        report: &FileReport,
    ) {
        self.files_converted.fetch_add(1, Ordering::Relaxed);
        self.samples_decoded
            .fetch_add(report.samples, Ordering::Relaxed);
        self.frames_written
            .fetch_add(report.frames_written, Ordering::Relaxed);
        self.bytes_read
            .fetch_add(report.bytes_consumed, Ordering::Relaxed);
        self.samples_clipped
            .fetch_add(report.clipped as u64, Ordering::Relaxed);
        self.overruns.fetch_add(report.overruns, Ordering::Relaxed);

        if report.truncated {
            self.files_truncated.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(
        &self,
        count: u64,
    ) {
        self.files_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn throughput_msps(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let secs = elapsed.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.samples_decoded.load(Ordering::Relaxed) as f64 / secs / 1_000_000.0
    }

    /// Скорость чтения в МБ/с.
    pub fn read_speed_mbps(
        &self,
        elapsed: &Instant,
    ) -> f64 {
        let secs = elapsed.elapsed().as_secs_f64();

        if secs < 1e-9 {
            return 0.0;
        }

        self.bytes_read.load(Ordering::Relaxed) as f64 / secs / 1_000_000.0
    }

    /// `true`, если хотя бы один файл не сконвертирован.
    pub fn has_failures(&self) -> bool {
        self.files_failed.load(Ordering::Relaxed) > 0
    }

    /// Итоговая сводка для вывода в конце запуска.
    pub fn summary(
        &self,
        elapsed: &Instant,
    ) -> BatchSummary {
        BatchSummary {
            duration_secs: elapsed.elapsed().as_secs_f64(),
            files_converted: self.files_converted.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            files_truncated: self.files_truncated.load(Ordering::Relaxed),
            samples_decoded: self.samples_decoded.load(Ordering::Relaxed),
            frames_written: self.frames_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            samples_clipped: self.samples_clipped.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
            throughput_msps: self.throughput_msps(elapsed),
            read_speed_mbps: self.read_speed_mbps(elapsed),
        }
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  Duration      : {:.1}s", self.duration_secs)?;
        writeln!(
            f,
            "  Files         : {} ok, {} failed, {} skipped",
            self.files_converted, self.files_failed, self.files_skipped
        )?;
        writeln!(f, "  Truncated     : {}", self.files_truncated)?;
        writeln!(f, "  Samples       : {}", self.samples_decoded)?;
        writeln!(f, "  WAV frames    : {}", self.frames_written)?;
        writeln!(f, "  Clipped       : {}", self.samples_clipped)?;
        writeln!(f, "  Overruns      : {}", self.overruns)?;
        writeln!(f, "  Bytes read    : {:.1} MB", self.bytes_read as f64 / 1e6)?;
        writeln!(f, "  Throughput    : {:.3} Msps", self.throughput_msps)?;
        writeln!(f, "  Read speed    : {:.1} MB/s", self.read_speed_mbps)?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}
