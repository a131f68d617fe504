use std::path::PathBuf;

use thiserror::Error;

pub type ConverterResult<T> = std::result::Result<T, ConverterError>;

#[derive(Debug, Error)]
pub enum ConverterError {
    /// Ошибка декодирования или кодирования одного файла
    #[error("ADC log error: {0}")]
    Adc(#[from] adcwav_types::AdcError),

    /// Ошибка ввода/вывода (каталоги, экспорт)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Неверная конфигурация запуска
    #[error("Configuration error: {0}")]
    Config(String),

    /// Сбой пула воркеров (inter-thread)
    #[error("Worker error: {0}")]
    Worker(String),

    /// Строка CSV экспорта не является выборкой АЦП
    #[error("Invalid CSV sample at {path:?}:{line}: '{value}'")]
    InvalidCsv {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// Ошибка сериализации отчёта
    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),
}

impl ConverterError {
    /// `true`, если виноват сам входной файл, а не окружение.
    pub fn is_input_fault(&self) -> bool {
        match self {
            ConverterError::Adc(e) => e.is_input_fault(),
            ConverterError::InvalidCsv { .. } => true,
            _ => false,
        }
    }
}
