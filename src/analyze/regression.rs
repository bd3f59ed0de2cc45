use crate::error::{PipelineError, Result};

/// Ordinary least squares fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Number of (x, y) pairs used.
    pub n: usize,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// `"R-Squared: 0.79"`
    pub fn r_squared_label(&self) -> String {
        format!("R-Squared: {:.2}", self.r_squared)
    }

    /// `"y = 1.2345x-2.3456"`, sign always shown on the intercept.
    pub fn equation_label(&self) -> String {
        format!("y = {:.4}x{:+.4}", self.slope, self.intercept)
    }
}

/// Closed-form OLS over the pairs where both sides are present.
///
/// Needs at least two pairs and some spread in `x`. R² is
/// `1 - SS_res / SS_tot`; when every `y` is equal the fit is exact and R² is 1.
pub fn fit_linear(x: &[Option<f64>], y: &[Option<f64>]) -> Result<LinearFit> {
    if x.len() != y.len() {
        return Err(PipelineError::Analysis(format!(
            "regression inputs differ in length ({} vs {})",
            x.len(),
            y.len()
        )));
    }
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    let n = pairs.len();
    if n < 2 {
        return Err(PipelineError::Analysis(format!(
            "regression needs at least 2 complete pairs, got {}",
            n
        )));
    }

    let nf = n as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;

    let sxx: f64 = pairs.iter().map(|(a, _)| (a - mean_x).powi(2)).sum();
    let sxy: f64 = pairs
        .iter()
        .map(|(a, b)| (a - mean_x) * (b - mean_y))
        .sum();
    if sxx == 0.0 {
        return Err(PipelineError::Analysis(
            "regression x values have no variance".into(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = pairs.iter().map(|(_, b)| (b - mean_y).powi(2)).sum();
    let ss_res: f64 = pairs
        .iter()
        .map(|(a, b)| (b - (slope * a + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
        n,
    })
}
