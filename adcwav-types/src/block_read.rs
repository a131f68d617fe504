use crate::DataBlock;

/// Результат чтения одного блока.
///
/// `EndOfStream` и `Truncated` — штатные исходы, а не ошибки: образцы из
/// предыдущих блоков остаются валидными.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRead {
    /// Блок прочитан полностью
    Decoded(DataBlock),
    /// Ни одного байта на месте поля `sample_count`
    EndOfStream,
    /// Файл оборвался внутри блока
    Truncated(TruncatedBlock),
}

/// Описание оборванного хвостового блока.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncatedBlock {
    /// Смещение начала блока от начала файла
    pub offset: u64,
    /// Заявленное количество выборок (None, если оборвалось само поле)
    pub declared_samples: Option<u16>,
    /// Сколько байт блока требовалось прочитать
    pub expected_bytes: usize,
    /// Сколько байт блока фактически удалось прочитать
    pub available_bytes: usize,
}

