use thiserror::Error;

/// Результат для операций adcwav
pub type AdcResult<T> = std::result::Result<T, AdcError>;

/// Типы ошибок декодирования и конвертации.
///
/// Штатные условия завершения потока (конец файла, усечённый последний блок)
/// сюда не входят: они возвращаются как [`crate::BlockRead`].
#[derive(Debug, Error)]
pub enum AdcError {
    /// Заголовок сессии короче 512 байт
    #[error("Truncated header: expected {expected} bytes, found {found}")]
    TruncatedHeader { expected: usize, found: usize },

    /// Заявленный размер блока не помещается в 512-байтную запись
    #[error(
        "Oversized block at offset {offset}: {sample_count} samples exceed block capacity of {capacity}"
    )]
    OversizedBlock {
        offset: u64,
        sample_count: u16,
        capacity: usize,
    },

    /// Статистика запрошена для пустой последовательности
    #[error("Empty sample sequence: statistics are undefined")]
    EmptySequence,

    /// Разброс равен нулю — нормировать постоянный сигнал нельзя
    #[error("Degenerate signal: spread is zero (constant at median {median})")]
    DegenerateSignal { median: f64 },

    /// Целый коэффициент масштабирования обнулил бы весь сигнал
    #[error("Scale underflow: spread {spread} exceeds target peak {target_peak}")]
    ScaleUnderflow { spread: f64, target_peak: i32 },

    /// Ошибка записи WAV контейнера
    #[error("WAV encode failed: {0}")]
    EncodeWriteFailure(String),

    /// Некорректный параметр конвертации
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AdcError {
    /// Удобные конструкторы
    pub fn encode_write_failure<S: Into<String>>(s: S) -> Self {
        Self::EncodeWriteFailure(s.into())
    }

    pub fn invalid_parameter<S: Into<String>>(s: S) -> Self {
        Self::InvalidParameter(s.into())
    }

    /// `true` для ошибок, относящихся к содержимому входного файла.
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            AdcError::TruncatedHeader { .. }
                | AdcError::OversizedBlock { .. }
                | AdcError::EmptySequence
                | AdcError::DegenerateSignal { .. }
                | AdcError::ScaleUnderflow { .. }
        )
    }
}
