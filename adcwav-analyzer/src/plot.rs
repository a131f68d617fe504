//! Линейный график в PNG.
//!
//! Точки раскладываются по столбцам пикселей; в каждом столбце рисуется
//! вертикальный отрезок от минимума до максимума, поэтому миллионы выборок
//! дают тот же вид, что и полная прорисовка, за O(n).

use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use log::info;

use crate::{AnalyzerError, AnalyzerResult, Series};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([40, 40, 40]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const LINE: Rgb<u8> = Rgb([31, 119, 180]);

/// Отступ области построения от краёв изображения
const MARGIN: u32 = 40;
const GRID_DIVISIONS: u32 = 10;

/// Границы данных по осям.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Параметры рендера линейного графика.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePlot {
    width: u32,
    height: u32,
}

impl LinePlot {
    pub fn new(
        width: u32,
        height: u32,
    ) -> AnalyzerResult<Self> {
        if width <= 2 * MARGIN + 1 || height <= 2 * MARGIN + 1 {
            return Err(AnalyzerError::Config(format!(
                "plot size {width}x{height} leaves no drawing area"
            )));
        }

        Ok(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Рисует ряд точек. Пустой ряд даёт только оси.
    pub fn render(
        &self,
        series: &Series,
    ) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        self.draw_frame(&mut img);

        let Some(bounds) = Bounds::of(&series.points) else {
            return img;
        };

        let (left, top, right, bottom) = self.area();
        let cols = (right - left + 1) as usize;
        let mut buckets: Vec<Option<(f64, f64)>> = vec![None; cols];

        for &(x, y) in &series.points {
            if !x.is_finite() || !y.is_finite() {
                continue;
            }

            let col = (bounds.x_fraction(x) * (cols - 1) as f64).round() as usize;
            let slot = &mut buckets[col.min(cols - 1)];
            *slot = Some(match *slot {
                None => (y, y),
                Some((lo, hi)) => (lo.min(y), hi.max(y)),
            });
        }

        let to_row = |y: f64| -> u32 {
            let frac = bounds.y_fraction(y);
            bottom - (frac * (bottom - top) as f64).round() as u32
        };

        let mut prev_row: Option<u32> = None;

        for (i, bucket) in buckets.iter().enumerate() {
            let Some((lo, hi)) = *bucket else {
                continue;
            };

            let x = left + i as u32;
            let mut row_a = to_row(hi);
            let mut row_b = to_row(lo);

            // соединяем с предыдущим столбцом, чтобы линия не рвалась
            if let Some(p) = prev_row {
                row_a = row_a.min(p);
                row_b = row_b.max(p);
            }

            for y in row_a..=row_b {
                img.put_pixel(x, y, LINE);
            }

            prev_row = Some(to_row((lo + hi) / 2.0));
        }

        img
    }

    /// Рисует и сохраняет PNG.
    pub fn save<P: AsRef<Path>>(
        &self,
        series: &Series,
        path: P,
    ) -> AnalyzerResult<()> {
        let path = path.as_ref();
        self.render(series)
            .save_with_format(path, ImageFormat::Png)?;

        info!(
            "Plot saved: {:?} ({} points, {} vs {})",
            path,
            series.points.len(),
            series.y_label,
            series.x_label
        );

        Ok(())
    }

    /// `(left, top, right, bottom)` области построения, включительно.
    fn area(&self) -> (u32, u32, u32, u32) {
        (
            MARGIN,
            MARGIN,
            self.width - MARGIN - 1,
            self.height - MARGIN - 1,
        )
    }

    fn draw_frame(
        &self,
        img: &mut RgbImage,
    ) {
        let (left, top, right, bottom) = self.area();

        for i in 1..GRID_DIVISIONS {
            let x = left + (right - left) * i / GRID_DIVISIONS;
            let y = top + (bottom - top) * i / GRID_DIVISIONS;

            for yy in top..=bottom {
                img.put_pixel(x, yy, GRID);
            }
            for xx in left..=right {
                img.put_pixel(xx, y, GRID);
            }
        }

        for x in left..=right {
            img.put_pixel(x, bottom, AXIS);
        }
        for y in top..=bottom {
            img.put_pixel(left, y, AXIS);
        }
    }
}

impl Default for LinePlot {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
        }
    }
}

impl Bounds {
    /// Границы по конечным точкам; `None`, если таких нет.
    pub fn of(points: &[(f64, f64)]) -> Option<Self> {
        let mut finite = points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite());

        let &(x0, y0) = finite.next()?;
        let mut b = Bounds {
            x_min: x0,
            x_max: x0,
            y_min: y0,
            y_max: y0,
        };

        for &(x, y) in finite {
            b.x_min = b.x_min.min(x);
            b.x_max = b.x_max.max(x);
            b.y_min = b.y_min.min(y);
            b.y_max = b.y_max.max(y);
        }

        Some(b)
    }

    /// Положение `x` в [0, 1]; вырожденный диапазон даёт середину.
    pub fn x_fraction(
        &self,
        x: f64,
    ) -> f64 {
        fraction(x, self.x_min, self.x_max)
    }

    pub fn y_fraction(
        &self,
        y: f64,
    ) -> f64 {
        fraction(y, self.y_min, self.y_max)
    }
}

fn fraction(
    v: f64,
    min: f64,
    max: f64,
) -> f64 {
    let span = max - min;

    if span <= 0.0 {
        return 0.5;
    }

    ((v - min) / span).clamp(0.0, 1.0)
}

/// Свободное имя `dir/stem.ext`; при коллизии `dir/stem(1).ext`, `(2)`…
pub fn unique_path(
    dir: &Path,
    stem: &str,
    ext: &str,
) -> PathBuf {
    let first = dir.join(format!("{stem}.{ext}"));

    if !first.exists() {
        return first;
    }

    (1..)
        .map(|n| dir.join(format!("{stem}({n}).{ext}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}
