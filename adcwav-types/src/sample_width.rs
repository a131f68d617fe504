/// Разрядность АЦП значений в блоках данных
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SampleWidth {
    /// 16-битное слово на выборку (10-битный АЦП, младший байт первым)
    Bits16 = 2,
    /// 1 байт на выборку (логгер в 8-битном режиме)
    Bits8 = 1,
}

impl SampleWidth {
    /// Разрядность по полю `recordEightBits` заголовка: 0 — 16 бит.
    pub fn from_flag(record_eight_bits: u32) -> Self {
        if record_eight_bits == 0 {
            SampleWidth::Bits16
        } else {
            SampleWidth::Bits8
        }
    }

    /// Обратное преобразование для сериализации заголовка.
    pub fn as_flag(&self) -> u32 {
        match self {
            SampleWidth::Bits16 => 0,
            SampleWidth::Bits8 => 1,
        }
    }

    /// Размер одной выборки в байтах
    pub fn bytes(&self) -> usize {
        *self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_from_flag() {
        assert_eq!(SampleWidth::from_flag(0), SampleWidth::Bits16);
        assert_eq!(SampleWidth::from_flag(1), SampleWidth::Bits8);
        assert_eq!(SampleWidth::from_flag(0xFFFF_FFFF), SampleWidth::Bits8);
        assert_eq!(SampleWidth::Bits16.bytes(), 2);
        assert_eq!(SampleWidth::Bits8.bytes(), 1);
        assert_eq!(SampleWidth::Bits8.as_flag(), 1);
    }
}
