/// Блок АЦП данных (одна 512-байтная запись после заголовка)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlock {
    /// Количество выборок в блоке (обычно 254, но читается из файла)
    pub sample_count: u16,
    /// Счётчик переполнений буфера логгера с предыдущего блока
    pub overrun_count: u16,
    /// Выборки в порядке записи
    pub samples: Vec<u16>,
}

impl DataBlock {
    /// Создаёт блок без переполнений; `sample_count` берётся из длины.
    pub fn new(samples: Vec<u16>) -> Self {
        DataBlock {
            sample_count: samples.len() as u16,
            overrun_count: 0,
            samples,
        }
    }

    pub fn with_overruns(
        samples: Vec<u16>,
        overrun_count: u16,
    ) -> Self {
        DataBlock {
            overrun_count,
            ..DataBlock::new(samples)
        }
    }
}
