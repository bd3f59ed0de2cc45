use crate::error::{PipelineError, Result};

/// One right-closed interval `(lo, hi]` and how many values fell in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: u32,
}

impl Bin {
    pub fn label(&self) -> String {
        format!("({:.1}, {:.1}]", self.lo, self.hi)
    }
}

/// Split `values` into `bins` equal-width intervals between their min and max.
///
/// Bins are right-closed. The lowest edge is pushed down by 0.1 % of the range
/// so the minimum lands in the first bin. When every value is equal the range
/// is widened by 0.1 % of the value (or 0.001 around zero) on both sides.
pub fn equal_width_bins(values: &[f64], bins: usize) -> Result<Vec<Bin>> {
    if bins == 0 {
        return Err(PipelineError::Analysis("histogram needs at least one bin".into()));
    }
    if values.is_empty() {
        return Err(PipelineError::Analysis("histogram of an empty column".into()));
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let edges: Vec<f64> = if min == max {
        let pad = if min != 0.0 { 0.001 * min.abs() } else { 0.001 };
        min -= pad;
        max += pad;
        linspace(min, max, bins + 1)
    } else {
        let mut e = linspace(min, max, bins + 1);
        e[0] -= (max - min) * 0.001;
        e
    };

    let mut out: Vec<Bin> = edges
        .windows(2)
        .map(|w| Bin {
            lo: w[0],
            hi: w[1],
            count: 0,
        })
        .collect();

    for &v in values {
        // values equal to an inner edge belong to the bin on its left
        let idx = out
            .iter()
            .position(|b| v > b.lo && v <= b.hi)
            .unwrap_or(out.len() - 1);
        out[idx].count += 1;
    }

    Ok(out)
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seven_bins_cover_the_range() {
        let lengths = [106.0, 110.0, 115.0, 117.0, 125.0, 130.0, 133.0, 143.0, 163.0];
        let bins = equal_width_bins(&lengths, 7).unwrap();
        assert_eq!(bins.len(), 7);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u32>(), 9);
        // width (163 - 106) / 7
        let width = 57.0 / 7.0;
        assert!((bins[0].hi - (106.0 + width)).abs() < 1e-9);
        assert!(bins[0].lo < 106.0);
        assert_eq!(bins[6].hi, 163.0);
        // 106, 110 | 115, 117 | 125, 130 | 133 | 143 | - | 163
        assert_eq!(
            bins.iter().map(|b| b.count).collect::<Vec<_>>(),
            vec![2, 2, 2, 1, 1, 0, 1]
        );
    }

    #[test]
    fn constant_values_get_one_full_bin() {
        let bins = equal_width_bins(&[5.0, 5.0], 3).unwrap();
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![0, 2, 0]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(equal_width_bins(&[], 7).is_err());
        assert!(equal_width_bins(&[1.0], 0).is_err());
    }

    #[test]
    fn labels_are_right_closed() {
        let bins = equal_width_bins(&[0.0, 10.0], 2).unwrap();
        assert_eq!(bins[1].label(), "(5.0, 10.0]");
    }
}
