use std::path::PathBuf;

use adcwav_core::ConversionOptions;

use crate::{ConverterError, ConverterResult};

/// Полная конфигурация пакетной конвертации.
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Каталог с исходными .bin файлами
    pub input_dir: PathBuf,
    /// Каталог для WAV и экспортов
    pub output_dir: PathBuf,
    /// Удалить файлы в `output_dir` перед запуском
    pub clear_output: bool,
    /// Расширение входных файлов (без точки, регистр не важен)
    pub input_extension: String,
    /// Число рабочих потоков
    pub workers: usize,
    /// Параметры конвертации одного файла
    pub options: ConversionOptions,
    /// Сохранять декодированные выборки в `<stem>_adc.csv`
    pub export_csv: bool,
    /// Сохранять статистику в `<stem>_rms.txt`
    pub export_rms: bool,
    /// Путь к JSON отчёту по всему запуску
    pub report_path: Option<PathBuf>,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl ConverterConfig {
    /// Проверяет согласованность параметров до начала работы.
    pub fn validate(&self) -> ConverterResult<()> {
        if self.workers == 0 {
            return Err(ConverterError::Config("workers must be >= 1".into()));
        }

        if self.input_extension.is_empty() {
            return Err(ConverterError::Config(
                "input extension must not be empty".into(),
            ));
        }

        if self.input_dir == self.output_dir && self.clear_output {
            return Err(ConverterError::Config(format!(
                "refusing to clear input directory {:?}",
                self.input_dir
            )));
        }

        Ok(())
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("bins"),
            output_dir: PathBuf::from("WAVs"),
            clear_output: true,
            input_extension: "bin".into(),
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            options: ConversionOptions::default(),
            export_csv: false,
            export_rms: false,
            report_path: None,
        }
    }
}

/// Парсит строку частоты дискретизации в герцы.
///
/// Поддерживает суффиксы: `MHz`, `kHz`, `Hz` (регистронезависимо).
///
/// # Примеры
/// ```
/// use adcwav_converter::config::parse_rate_hz;
/// assert_eq!(parse_rate_hz("32kHz").unwrap(), 32_000);
/// assert_eq!(parse_rate_hz("44.1kHz").unwrap(), 44_100);
/// assert_eq!(parse_rate_hz("32000").unwrap(), 32_000);
/// ```
pub fn parse_rate_hz(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let lower = s.to_lowercase();

    let (num_str, mult) = if let Some(v) = lower.strip_suffix("mhz") {
        (v.trim(), 1_000_000_f64)
    } else if let Some(v) = lower.strip_suffix("khz") {
        (v.trim(), 1_000_f64)
    } else if let Some(v) = lower.strip_suffix("hz") {
        (v.trim(), 1_f64)
    } else {
        // Без суффикса — число в герцах
        return s
            .parse::<u32>()
            .map_err(|e| format!("Invalid sample rate '{s}': {e}"));
    };

    let n: f64 = num_str
        .parse()
        .map_err(|e| format!("Invalid sample rate value '{num_str}': {e}"))?;

    let hz = (n * mult).round();

    if !(1.0..=u32::MAX as f64).contains(&hz) {
        return Err(format!("Sample rate '{s}' out of range"));
    }

    Ok(hz as u32)
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
