//! Descriptive statistics, distribution fit and the cross-club regression.

use crate::analysis::aggregator::CombinedDataset;
use crate::dataset::ClubDataset;
use crate::error::AnalysisError;
use crate::models::{ClubDistribution, HistogramBin, RegressionFit, ValueStats};
use std::f64::consts::PI;

/// Mean and sample standard deviation of a club's known values.
pub fn summarize(dataset: &ClubDataset) -> Result<ValueStats, AnalysisError> {
    describe(&dataset.values(), &format!("club '{}'", dataset.club_name()))
}

/// Mean and sample standard deviation (n - 1) of `values`.
pub fn describe(values: &[f64], context: &str) -> Result<ValueStats, AnalysisError> {
    if values.is_empty() {
        return Err(AnalysisError::InsufficientData {
            context: context.to_string(),
            needed: 1,
            found: 0,
        });
    }

    let n = values.len();
    let mean = mean(values);
    let stddev = (n > 1).then(|| {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1) as f64).sqrt()
    });

    Ok(ValueStats {
        count: n,
        mean,
        stddev,
    })
}

/// OLS fit of row ordinal (y) against value (x) over the combined dataset.
///
/// Rows without a value are dropped first; `y` is the position in the
/// remaining sequence. The dependent variable carries no meaning beyond
/// ordering, so the fit is only a coarse view of how values are spread.
pub fn regress(combined: &CombinedDataset) -> Result<RegressionFit, AnalysisError> {
    let xs: Vec<f64> = combined.players().iter().filter_map(|p| p.value).collect();
    let ys: Vec<f64> = (0..xs.len()).map(|i| i as f64).collect();
    fit_line(&xs, &ys)
}

/// Ordinary least squares `y = intercept + slope * x`.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<RegressionFit, AnalysisError> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Err(AnalysisError::InsufficientData {
            context: "regression".to_string(),
            needed: 2,
            found: n,
        });
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);

    let mean_x = mean(xs);
    let mean_y = mean(ys);

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        return Err(AnalysisError::InsufficientData {
            context: "regression (all values identical)".to_string(),
            needed: 2,
            found: 1,
        });
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };

    Ok(RegressionFit {
        slope,
        intercept,
        r_squared,
        observations: n,
    })
}

/// Density-normalized histogram with `bins` equal-width bins over the value range.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = min_max(values);
    if hi == lo {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let total = values.len() as f64;
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: lo + i as f64 * width,
            upper: lo + (i + 1) as f64 * width,
            count,
            density: count as f64 / (total * width),
        })
        .collect()
}

/// Normal probability density.
pub fn normal_pdf(x: f64, mean: f64, stddev: f64) -> f64 {
    let z = (x - mean) / stddev;
    (-0.5 * z * z).exp() / (stddev * (2.0 * PI).sqrt())
}

/// `points` evenly spaced samples of the fitted normal curve on `[lo, hi]`.
/// Empty when the spread is unknown or zero.
pub fn normal_curve(stats: &ValueStats, lo: f64, hi: f64, points: usize) -> Vec<(f64, f64)> {
    let sd = match stats.stddev {
        Some(sd) if sd > 0.0 => sd,
        _ => return Vec::new(),
    };
    if points < 2 || hi <= lo {
        return Vec::new();
    }

    let step = (hi - lo) / (points - 1) as f64;
    (0..points)
        .map(|i| {
            let x = lo + i as f64 * step;
            (x, normal_pdf(x, stats.mean, sd))
        })
        .collect()
}

/// Histogram and normal fit for one club, if it has any known values.
pub fn distribution(dataset: &ClubDataset, bins: usize, points: usize) -> Option<ClubDistribution> {
    let stats = summarize(dataset).ok()?;
    let bins = histogram(&dataset.values(), bins);
    let lo = bins.first()?.lower;
    let hi = bins.last()?.upper;

    Some(ClubDistribution {
        club_name: dataset.club_name().to_string(),
        curve: normal_curve(&stats, lo, hi, points),
        bins,
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::merge;
    use crate::roster::RosterRow;

    fn dataset(club_id: &str, items: &[(&str, &str)]) -> ClubDataset {
        let rows: Vec<RosterRow> = items
            .iter()
            .map(|(name, value)| RosterRow {
                name: name.to_string(),
                raw_value: value.to_string(),
            })
            .collect();
        ClubDataset::build(club_id, &rows)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_summarize_sample_stddev() {
        let x = dataset("club-x", &[("Alice", "€2m"), ("Bob", "€500k"), ("Carl", "-")]);
        let stats = summarize(&x).unwrap();

        assert_eq!(stats.count, 2);
        assert!(approx(stats.mean, 1.25));
        assert!(approx(stats.stddev.unwrap(), 1.0607));
    }

    #[test]
    fn test_summarize_single_value() {
        let x = dataset("club-x", &[("Alice", "€2m")]);
        let stats = summarize(&x).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.stddev, None);
    }

    #[test]
    fn test_summarize_all_unknown() {
        let y = dataset("club-y", &[("Carl", "-"), ("Dora", "?")]);
        let err = summarize(&y).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                context: "club 'club y'".to_string(),
                needed: 1,
                found: 0
            }
        );
    }

    #[test]
    fn test_regress_skips_unknown_values() {
        let a = dataset("fc-a", &[("A", "€1m"), ("B", "-"), ("C", "€2m")]);
        let b = dataset("fc-b", &[("D", "€3m")]);
        let combined = merge(&[a, b]).unwrap();

        // Points (1,0), (2,1), (3,2): a perfect line.
        let fit = regress(&combined).unwrap();
        assert_eq!(fit.observations, 3);
        assert!(approx(fit.slope, 1.0));
        assert!(approx(fit.intercept, -1.0));
        assert!(approx(fit.r_squared, 1.0));
    }

    #[test]
    fn test_regress_needs_two_values() {
        let a = dataset("fc-a", &[("A", "€1m"), ("B", "-")]);
        let combined = merge(&[a]).unwrap();
        let err = regress(&combined).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                needed: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_regress_constant_values() {
        let a = dataset("fc-a", &[("A", "€1m"), ("B", "€1m")]);
        let combined = merge(&[a]).unwrap();
        assert!(regress(&combined).is_err());
    }

    #[test]
    fn test_fit_line_noisy() {
        let xs = [0.5, 2.0, 10.0, 1.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let fit = fit_line(&xs, &ys).unwrap();

        // mean_x 3.375, mean_y 1.5, sxy 4.75, sxx 59.6875
        assert!(approx(fit.slope, 4.75 / 59.6875));
        assert!(approx(fit.intercept, 1.5 - (4.75 / 59.6875) * 3.375));
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }

    #[test]
    fn test_histogram_densities_integrate_to_one() {
        let values = [0.5, 1.0, 1.5, 2.0, 10.0];
        let bins = histogram(&values, 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[3].count, 1);
        let area: f64 = bins.iter().map(|b| b.density * (b.upper - b.lower)).sum();
        assert!(approx(area, 1.0));
    }

    #[test]
    fn test_histogram_degenerate() {
        assert!(histogram(&[], 5).is_empty());
        assert!(histogram(&[1.0], 0).is_empty());

        let bins = histogram(&[3.0, 3.0], 2);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].lower, 2.5);
        assert_eq!(bins[1].upper, 3.5);
    }

    #[test]
    fn test_normal_pdf_peak() {
        let peak = normal_pdf(0.0, 0.0, 1.0);
        assert!(approx(peak, 0.398942));
        assert!(normal_pdf(1.0, 0.0, 1.0) < peak);
    }

    #[test]
    fn test_normal_curve() {
        let stats = ValueStats {
            count: 2,
            mean: 1.25,
            stddev: Some(1.0607),
        };
        let curve = normal_curve(&stats, 0.0, 2.5, 6);
        assert_eq!(curve.len(), 6);
        assert_eq!(curve[0].0, 0.0);
        assert!(approx(curve[5].0, 2.5));

        let flat = ValueStats {
            stddev: None,
            ..stats
        };
        assert!(normal_curve(&flat, 0.0, 2.5, 6).is_empty());
    }

    #[test]
    fn test_distribution() {
        let x = dataset("club-x", &[("Alice", "€2m"), ("Bob", "€500k")]);
        let dist = distribution(&x, 5, 20).unwrap();
        assert_eq!(dist.club_name, "club x");
        assert_eq!(dist.bins.len(), 5);
        assert_eq!(dist.curve.len(), 20);

        let y = dataset("club-y", &[("Carl", "-")]);
        assert!(distribution(&y, 5, 20).is_none());
    }
}
