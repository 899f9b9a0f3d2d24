//! Small numeric helpers shared by the summary and the views.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sort a copy of `values` ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

/// Quantile `q` (0..=1) of an ascending slice, linearly interpolated
/// between the closest ranks.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile_sorted(&sorted(values), 0.5)
}

// ---------------------------------------------------------------------------
// Box-plot statistics
// ---------------------------------------------------------------------------

/// Five-number summary plus Tukey whiskers and outliers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value ≥ q1 − 1.5·IQR.
    pub lower_whisker: f64,
    /// Largest value ≤ q3 + 1.5·IQR.
    pub upper_whisker: f64,
    /// Values beyond the whiskers, ascending.
    pub outliers: Vec<f64>,
    pub count: usize,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let v = sorted(values);
        let q1 = quantile_sorted(&v, 0.25)?;
        let median = quantile_sorted(&v, 0.5)?;
        let q3 = quantile_sorted(&v, 0.75)?;
        let iqr = q3 - q1;
        let lo_fence = q1 - 1.5 * iqr;
        let hi_fence = q3 + 1.5 * iqr;

        let inside: Vec<f64> = v
            .iter()
            .copied()
            .filter(|x| (lo_fence..=hi_fence).contains(x))
            .collect();
        let outliers: Vec<f64> = v
            .iter()
            .copied()
            .filter(|x| !(lo_fence..=hi_fence).contains(x))
            .collect();

        Some(BoxStats {
            min: v[0],
            q1,
            median,
            q3,
            max: v[v.len() - 1],
            // quartiles always lie inside the fences
            lower_whisker: inside.first().copied().unwrap_or(q1),
            upper_whisker: inside.last().copied().unwrap_or(q3),
            outliers,
            count: v.len(),
        })
    }
}
