//! Per-series statistics used for rendering decisions and debug export.
//!
//! A point can be in three conditions:
//!
//! ```text
//! None          gap: the entity was not present in that snapshot
//! Some(-1)      sentinel: present but "not assigned" / "unset"
//! Some(-1001)
//! Some(v)       valid
//! ```
//!
//! Whether `-1` is a sentinel depends on the metric: for a broker's
//! connection state it is the DOWN level, so broker metrics are classified
//! with [`SentinelPolicy::None`].

use std::fmt;

use crate::source::{NOT_ASSIGNED, UNSET_OFFSET};

const ABSOLUTE_TOLERANCE: f64 = 1e-8;
const RELATIVE_TOLERANCE: f64 = 1e-5;

/// Which values of a series are reserved sentinels rather than data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SentinelPolicy {
    /// `-1` and `-1001` mean "not assigned".
    #[default]
    Reserved,
    /// Every value is data.
    None,
}

impl SentinelPolicy {
    pub fn is_sentinel(&self, value: f64) -> bool {
        match self {
            SentinelPolicy::Reserved => {
                value == NOT_ASSIGNED as f64 || value == UNSET_OFFSET as f64
            }
            SentinelPolicy::None => false,
        }
    }
}

/// Display classification of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesStatus {
    /// Every point is a gap.
    NoData,
    /// Every point is a sentinel.
    NotAssigned,
    /// Fewer than two valid points; a line cannot be drawn.
    Sparse,
    /// Two or more valid points, all equal.
    Constant(f64),
    Varying,
}

/// Summary statistics of one series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesStats {
    pub total_points: usize,
    /// Points that are neither gaps nor sentinels.
    pub valid_count: usize,
    pub first_valid_index: Option<usize>,
    pub last_valid_index: Option<usize>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// All valid values equal within tolerance; false with no valid value.
    pub is_constant: bool,
    pub sentinel_count: usize,
}

impl SeriesStats {
    /// Classify with the reserved sentinels `-1` and `-1001`.
    pub fn classify(series: &[Option<f64>]) -> Self {
        Self::classify_with(series, SentinelPolicy::Reserved)
    }

    pub fn classify_with(series: &[Option<f64>], policy: SentinelPolicy) -> Self {
        let mut stats = SeriesStats {
            total_points: series.len(),
            ..Default::default()
        };

        for (index, value) in series.iter().enumerate() {
            let Some(value) = *value else { continue };
            if policy.is_sentinel(value) {
                stats.sentinel_count += 1;
                continue;
            }
            if value.is_nan() {
                continue;
            }

            stats.valid_count += 1;
            stats.first_valid_index.get_or_insert(index);
            stats.last_valid_index = Some(index);
            stats.min = Some(stats.min.map_or(value, |m| m.min(value)));
            stats.max = Some(stats.max.map_or(value, |m| m.max(value)));
        }

        stats.is_constant = match (stats.min, stats.max) {
            (Some(min), Some(max)) => approx_equal(min, max),
            _ => false,
        };
        stats
    }

    /// True when the series has anything to show, valid or sentinel.
    pub fn has_observations(&self) -> bool {
        self.valid_count > 0 || self.sentinel_count > 0
    }

    /// Fewer than two valid points render as markers instead of a line.
    pub fn needs_markers(&self) -> bool {
        self.valid_count < 2
    }

    /// Every point is a sentinel.
    pub fn is_all_sentinel(&self) -> bool {
        self.total_points > 0 && self.sentinel_count == self.total_points
    }

    pub fn status(&self) -> SeriesStatus {
        if self.is_all_sentinel() {
            SeriesStatus::NotAssigned
        } else if !self.has_observations() {
            SeriesStatus::NoData
        } else if self.valid_count < 2 {
            SeriesStatus::Sparse
        } else if self.is_constant {
            SeriesStatus::Constant(self.min.unwrap_or_default())
        } else {
            SeriesStatus::Varying
        }
    }

    /// The constant value, if the series has at least one valid point and is flat.
    pub fn constant_value(&self) -> Option<f64> {
        if self.is_constant {
            self.min
        } else {
            None
        }
    }
}

impl fmt::Display for SeriesStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total={}, valid={}", self.total_points, self.valid_count)?;
        if self.sentinel_count > 0 && self.valid_count > 0 {
            write!(f, ", not_assigned={}", self.sentinel_count)?;
        }
        write!(
            f,
            ", first_idx={}, last_idx={}, min={}, max={}, constant={}",
            optional(self.first_valid_index),
            optional(self.last_valid_index),
            optional(self.min.map(|v| format!("{v:?}"))),
            optional(self.max.map(|v| format!("{v:?}"))),
            self.is_constant
        )
    }
}

fn optional<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |v| v.to_string())
}

fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * b.abs()
}

/// Legend label for a series.
///
/// With `annotate` off this is just the name. With it on, the label carries
/// the number of valid points and, for flat series, the constant value.
pub fn legend_label(name: &str, stats: &SeriesStats, annotate: bool) -> String {
    if !annotate {
        return name.to_string();
    }
    if stats.is_all_sentinel() {
        return format!("{name} (Not Assigned)");
    }
    match stats.constant_value() {
        Some(value) => format!(
            "{name} ({} data points, constant={})",
            stats.valid_count,
            format_constant(value)
        ),
        None => format!("{name} ({} data points)", stats.valid_count),
    }
}

/// Format a constant for a legend.
///
/// Large values (offsets) become integers with thousands separators, tiny
/// non-zero values use scientific notation, everything else two decimals.
pub fn format_constant(value: f64) -> String {
    if value.abs() >= 1000.0 {
        group_thousands(value.trunc() as i64)
    } else if value != 0.0 && value.abs() < 0.01 {
        format!("{value:.2e}")
    } else {
        format!("{value:.2}")
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
