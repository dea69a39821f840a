//! Grid line builders
//!
//! Grid spacing should be at least the typical extent of a cluster. For
//! mass spectrometry data the m/z tolerance usually grows with m/z (ppm),
//! so the x lines get sparser towards high m/z, while retention time uses
//! a fixed step.

use super::error::{ClusteringError, Result};

/// Upper bound on the lines of one axis
pub const MAX_LINES: usize = 1_000_000;

fn check_line_count(name: &'static str, value: f64, count: f64) -> Result<()> {
    if !count.is_finite() || count >= MAX_LINES as f64 {
        return Err(ClusteringError::InvalidParameter { name, value });
    }
    Ok(())
}

fn check_range(min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(ClusteringError::InvalidParameter {
            name: "range",
            value: max - min,
        });
    }
    Ok(())
}

/// Lines at `min, min + step, ...` below `max`, with `max` as last line
pub fn uniform(min: f64, max: f64, step: f64) -> Result<Vec<f64>> {
    check_range(min, max)?;
    if !step.is_finite() || step <= 0.0 {
        return Err(ClusteringError::InvalidParameter {
            name: "step",
            value: step,
        });
    }

    let count = ((max - min) / step).ceil();
    check_line_count("step", step, count)?;
    let count = count as usize;
    let mut lines: Vec<f64> = (0..count)
        .map(|k| min + k as f64 * step)
        .take_while(|&v| v < max)
        .collect();
    lines.push(max);
    Ok(lines)
}

/// Lines growing by a relative tolerance: `m_{k+1} = m_k * (1 + ppm * 1e-6)`
///
/// `min` must be positive.
pub fn ppm(min: f64, max: f64, tolerance_ppm: f64) -> Result<Vec<f64>> {
    check_range(min, max)?;
    if min <= 0.0 {
        return Err(ClusteringError::InvalidParameter {
            name: "min",
            value: min,
        });
    }
    if !tolerance_ppm.is_finite() || tolerance_ppm <= 0.0 {
        return Err(ClusteringError::InvalidParameter {
            name: "tolerance_ppm",
            value: tolerance_ppm,
        });
    }

    let factor = 1.0 + tolerance_ppm * 1e-6;
    check_line_count("tolerance_ppm", tolerance_ppm, (max / min).ln() / factor.ln())?;
    let mut lines = Vec::new();
    let mut line = min;
    while line < max {
        lines.push(line);
        line *= factor;
    }
    lines.push(max);
    Ok(lines)
}

/// Uniform lines covering all finite `values`, extended by half a step
/// on both ends
///
/// A single distinct value still yields a valid grid.
pub fn covering(values: &[f64], step: f64) -> Result<Vec<f64>> {
    let (min, max) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(ClusteringError::InvalidParameter {
            name: "values",
            value: f64::NAN,
        })?;
    if !step.is_finite() || step <= 0.0 {
        return Err(ClusteringError::InvalidParameter {
            name: "step",
            value: step,
        });
    }
    uniform(min - step / 2.0, max + step / 2.0, step)
}
