use crate::SampleWidth;

/// Заголовок сессии логгера (первая 512-байтная запись файла)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHeader {
    /// Тактовая частота АЦП в Гц
    pub adc_clock_hz: u32,
    /// Тактовая частота CPU в Гц
    pub cpu_clock_hz: u32,
    /// Интервал между выборками в тактах CPU
    pub sample_interval_cycles: u32,
    /// Ненулевое значение — 8-битные выборки
    pub record_eight_bits: u32,
    /// Количество аналоговых входов в одной выборке
    pub pin_count: u32,
    /// Номера входов: первые `pin_count` (не более 123), но не меньше одного
    pub pin_numbers: Vec<u32>,
}

impl SessionHeader {
    /// Заголовок одноканальной 16-битной записи с одним входом.
    pub fn new(
        adc_clock_hz: u32,
        cpu_clock_hz: u32,
        sample_interval_cycles: u32,
    ) -> Self {
        SessionHeader {
            adc_clock_hz,
            cpu_clock_hz,
            sample_interval_cycles,
            record_eight_bits: SampleWidth::Bits16.as_flag(),
            pin_count: 1,
            pin_numbers: vec![0],
        }
    }

    pub fn sample_width(&self) -> SampleWidth {
        SampleWidth::from_flag(self.record_eight_bits)
    }

    /// Номинальная частота дискретизации `cpu_clock / sample_interval`.
    ///
    /// Для 16 МГц и интервала 500 тактов это 32 кГц.
    pub fn nominal_sample_rate_hz(&self) -> Option<f64> {
        if self.sample_interval_cycles == 0 {
            return None;
        }

        Some(self.cpu_clock_hz as f64 / self.sample_interval_cycles as f64)
    }

    /// Номер первого записанного входа, если он есть.
    pub fn first_pin(&self) -> Option<u32> {
        self.pin_numbers.first().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nominal_rate() {
        let h = SessionHeader::new(1_000_000, 16_000_000, 500);
        assert_eq!(h.nominal_sample_rate_hz(), Some(32_000.0));
        assert_eq!(h.sample_width(), SampleWidth::Bits16);
        assert_eq!(h.first_pin(), Some(0));

        let zero = SessionHeader::new(1_000_000, 16_000_000, 0);
        assert_eq!(zero.nominal_sample_rate_hz(), None);
    }
}
