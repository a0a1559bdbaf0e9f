//! Symmetric 8-bit weight quantization.

/// Largest magnitude representable by a quantized weight.
const QUANT_MAX: f32 = 127.0;

/// Row-major int8 matrix with one scale per row.
///
/// Each row is quantized independently: `scale = max(|w|) / 127` and
/// `q = round(w / scale)`, so the largest weight of a row maps to +/-127.
#[derive(Debug, Clone)]
pub struct QuantizedMatrix {
    values: Vec<i8>,
    scales: Vec<f32>,
    rows: usize,
    cols: usize,
}

impl QuantizedMatrix {
    /// Quantizes float rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f32>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(rows.len() * cols);
        let mut scales = Vec::with_capacity(rows.len());

        for row in rows {
            let max_abs = row.iter().fold(0.0f32, |acc, &w| acc.max(w.abs()));
            let scale = if max_abs > 0.0 {
                max_abs / QUANT_MAX
            } else {
                1.0
            };
            scales.push(scale);
            values.extend(
                row.iter()
                    .map(|&w| (w / scale).round().clamp(-QUANT_MAX, QUANT_MAX) as i8),
            );
        }

        Self {
            values,
            scales,
            rows: rows.len(),
            cols,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Dot product of row `row` with `input`, rescaled to float.
    #[inline(always)]
    pub fn dot_row(&self, row: usize, input: &[f32]) -> f32 {
        let start = row * self.cols;
        let quantized_row = &self.values[start..start + self.cols];
        let mut sum = 0.0f32;
        for (&q, &x) in quantized_row.iter().zip(input.iter()) {
            sum += q as f32 * x;
        }
        sum * self.scales[row]
    }
}
