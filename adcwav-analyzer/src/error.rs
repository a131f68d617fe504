use std::path::PathBuf;

use thiserror::Error;

pub type AnalyzerResult<T> = std::result::Result<T, AnalyzerError>;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// WAV файл не читается
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Ошибка кодирования PNG
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// В файле нет ни одной выборки
    #[error("No samples in {0:?}")]
    EmptyInput(PathBuf),

    /// Неверные параметры запуска
    #[error("Configuration error: {0}")]
    Config(String),
}
