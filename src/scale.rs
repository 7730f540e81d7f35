//! Band and linear scales for bar geometry.
//!
//! The band scale splits a pixel range into equal slots with inner and outer
//! padding expressed as a fraction of the step, centred in the range. The
//! linear scale maps `[0, max]` onto a pixel range and generates "nice" axis
//! ticks (multiples of 1, 2 or 5 times a power of ten).

/// Categorical scale: one band per label, in the order given.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    labels: Vec<String>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    pub fn new<I, S>(labels: I, range: (f64, f64), padding: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let (r0, r1) = range;
        let n = labels.len() as f64;
        let step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        let start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        Self {
            labels,
            start,
            step,
            bandwidth: step * (1.0 - padding),
        }
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Left edge of the band at `index`.
    pub fn position(&self, index: usize) -> f64 {
        self.start + self.step * index as f64
    }

    /// Left edge of the band for `label`, if it is in the domain.
    pub fn locate(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|idx| self.position(idx))
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Linear scale from `[0, max]` onto `(range.0, range.1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    max: f64,
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(max: f64, range: (f64, f64)) -> Self {
        Self { max, range }
    }

    /// True when the domain cannot be normalised (empty, non-positive or non-finite max).
    pub fn is_degenerate(&self) -> bool {
        !(self.max.is_finite() && self.max > 0.0)
    }

    /// Maps `value` to pixels. Degenerate domains and non-finite values map to `range.0`.
    pub fn map(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        if self.is_degenerate() || !value.is_finite() {
            return r0;
        }
        r0 + (value / self.max) * (r1 - r0)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        if self.is_degenerate() {
            return vec![0.0];
        }
        nice_ticks(0.0, self.max, count)
    }

    pub fn tick_step(&self, count: usize) -> f64 {
        if self.is_degenerate() {
            return 1.0;
        }
        let inc = tick_increment(0.0, self.max, count);
        if inc > 0.0 { inc } else { 1.0 / -inc }
    }
}

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Positive values are step sizes; negative values `-k` mean a step of `1/k`.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let step = (stop - start) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power)) / factor
    }
}

/// Evenly spaced round values within `[start, stop]`, roughly `count` of them.
pub fn nice_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if !(start.is_finite() && stop.is_finite()) || count == 0 || stop <= start {
        return Vec::new();
    }
    let inc = tick_increment(start, stop, count);
    if inc > 0.0 {
        let mut i1 = (start / inc).round();
        let mut i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
        (i1 as i64..=i2 as i64).map(|i| i as f64 * inc).collect()
    } else {
        let inc = -inc;
        let mut i1 = (start * inc).round();
        let mut i2 = (stop * inc).round();
        if i1 / inc < start {
            i1 += 1.0;
        }
        if i2 / inc > stop {
            i2 -= 1.0;
        }
        (i1 as i64..=i2 as i64).map(|i| i as f64 / inc).collect()
    }
}

/// Formats a tick with the precision its step needs and thousands separators.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let rendered = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match rendered.split_once('.') {
        Some((int, frac)) => (int.to_string(), Some(frac.to_string())),
        None => (rendered, None),
    };
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && rendered_nonzero(&grouped, fraction.as_deref()) {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn rendered_nonzero(integer: &str, fraction: Option<&str>) -> bool {
    integer.chars().chain(fraction.unwrap_or("").chars()).any(|c| c.is_ascii_digit() && c != '0')
}
