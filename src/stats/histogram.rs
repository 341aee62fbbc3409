//! Histograms over `f64` samples, reported as bin-center -> count series.
//!
//! Binning follows the conventions of the common array libraries: the range
//! defaults to the sample min/max, uniform edges are `linspace(min, max, n + 1)`,
//! every bin is half-open except the last, which includes its right edge.

use std::str::FromStr;

use thiserror::Error;

/// Bin count used when the caller does not choose one.
pub const DEFAULT_BIN_COUNT: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum HistogramError {
    #[error("bin count must be positive")]
    ZeroBins,
    #[error("explicit bin edges need at least 2 values, got {0}")]
    TooFewEdges(usize),
    #[error("bin edges must increase monotonically")]
    NonMonotonicEdges,
    #[error("range max {max} must not be smaller than min {min}")]
    InvalidRange { min: f64, max: f64 },
    #[error("range [{min}, {max}] is not finite")]
    NonFiniteRange { min: f64, max: f64 },
    #[error("{actual} weights for {expected} samples")]
    WeightsLength { expected: usize, actual: usize },
}

/// Width estimators that derive the bin count from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinRule {
    /// `ptp / sqrt(n)`
    Sqrt,
    /// `ptp / (log2(n) + 1)`
    Sturges,
    /// `ptp / (2 * n^(1/3))`
    Rice,
    /// `(24 * sqrt(pi) / n)^(1/3) * std`
    Scott,
}

impl BinRule {
    fn width(self, samples: &[f64]) -> f64 {
        let n = samples.len() as f64;
        match self {
            BinRule::Sqrt => ptp(samples) / n.sqrt(),
            BinRule::Sturges => ptp(samples) / (n.log2() + 1.0),
            BinRule::Rice => ptp(samples) / (2.0 * n.cbrt()),
            BinRule::Scott => (24.0 * std::f64::consts::PI.sqrt() / n).cbrt() * std_dev(samples),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bins {
    /// Equal-width bins over the range.
    Count(usize),
    /// Explicit, monotonically increasing edges (`n + 1` values for `n` bins).
    Edges(Vec<f64>),
    /// Equal-width bins, count derived from the data.
    Rule(BinRule),
}

impl Default for Bins {
    fn default() -> Self {
        Bins::Count(DEFAULT_BIN_COUNT)
    }
}

impl FromStr for BinRule {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sqrt" => Ok(BinRule::Sqrt),
            "sturges" => Ok(BinRule::Sturges),
            "rice" => Ok(BinRule::Rice),
            "scott" => Ok(BinRule::Scott),
            other => Err(format!("unknown bin rule '{other}'")),
        }
    }
}

/// `"10"` -> count, `"0,1,5"` -> edges, `"sturges"` -> rule.
impl FromStr for Bins {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.contains(',') {
            return value
                .split(',')
                .map(|edge| {
                    edge.trim()
                        .parse::<f64>()
                        .map_err(|_| format!("invalid bin edge '{}'", edge.trim()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Bins::Edges);
        }
        if let Ok(count) = value.parse::<usize>() {
            return Ok(Bins::Count(count));
        }
        value.parse::<BinRule>().map(Bins::Rule)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistogramOptions {
    pub bins: Bins,
    /// Lower and upper range; samples outside are ignored.
    pub range: Option<(f64, f64)>,
    /// Per-sample weights; counts become weight sums.
    pub weights: Option<Vec<f64>>,
    /// Normalize so the histogram integrates to 1 over the range.
    pub density: bool,
}

impl HistogramOptions {
    pub fn with_bins(mut self, bins: Bins) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_density(mut self, density: bool) -> Self {
        self.density = density;
        self
    }
}

/// Raw histogram: `counts.len() + 1 == edges.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub counts: Vec<f64>,
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Midpoint of each bin.
    pub fn centers(&self) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / 2.0)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub center: f64,
    pub count: f64,
}

/// Histogram keyed by bin center, in ascending bin order.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSeries {
    bins: Vec<HistogramBin>,
}

impl HistogramSeries {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistogramBin> {
        self.bins.iter()
    }

    pub fn centers(&self) -> Vec<f64> {
        self.bins.iter().map(|bin| bin.center).collect()
    }

    pub fn counts(&self) -> Vec<f64> {
        self.bins.iter().map(|bin| bin.count).collect()
    }

    /// Count of the bin whose center equals `center` exactly.
    pub fn get(&self, center: f64) -> Option<f64> {
        self.bins
            .iter()
            .find(|bin| bin.center == center)
            .map(|bin| bin.count)
    }
}

impl From<Histogram> for HistogramSeries {
    fn from(histogram: Histogram) -> Self {
        let bins = histogram
            .centers()
            .into_iter()
            .zip(histogram.counts)
            .map(|(center, count)| HistogramBin { center, count })
            .collect();
        Self { bins }
    }
}

impl<'a> IntoIterator for &'a HistogramSeries {
    type Item = &'a HistogramBin;
    type IntoIter = std::slice::Iter<'a, HistogramBin>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins.iter()
    }
}

/// Histogram of `samples` re-expressed as a center -> count series.
pub fn hist(samples: &[f64], options: &HistogramOptions) -> Result<HistogramSeries, HistogramError> {
    histogram(samples, options).map(HistogramSeries::from)
}

/// Counts and bin edges of `samples`.
pub fn histogram(samples: &[f64], options: &HistogramOptions) -> Result<Histogram, HistogramError> {
    if let Some(weights) = &options.weights
        && weights.len() != samples.len()
    {
        return Err(HistogramError::WeightsLength {
            expected: samples.len(),
            actual: weights.len(),
        });
    }
    let weight = |idx: usize| options.weights.as_ref().map_or(1.0, |weights| weights[idx]);

    let (edges, counts) = match &options.bins {
        Bins::Edges(edges) => {
            validate_edges(edges)?;
            (edges.clone(), count_explicit(samples, edges, weight))
        }
        Bins::Count(n) => {
            if *n == 0 {
                return Err(HistogramError::ZeroBins);
            }
            let (first, last) = outer_edges(samples, options.range)?;
            let edges = linspace(first, last, *n);
            let counts = count_uniform(samples, &edges, weight);
            (edges, counts)
        }
        Bins::Rule(rule) => {
            let (first, last) = outer_edges(samples, options.range)?;
            let kept: Vec<f64> = samples
                .iter()
                .copied()
                .filter(|x| options.range.is_none() || (*x >= first && *x <= last))
                .collect();
            let n = rule_bin_count(*rule, &kept, first, last);
            let edges = linspace(first, last, n);
            let counts = count_uniform(samples, &edges, weight);
            (edges, counts)
        }
    };

    let counts = if options.density {
        normalize_density(&counts, &edges)
    } else {
        counts
    };
    Ok(Histogram { counts, edges })
}

fn outer_edges(samples: &[f64], range: Option<(f64, f64)>) -> Result<(f64, f64), HistogramError> {
    let (mut first, mut last) = match range {
        Some((min, max)) => {
            if min > max {
                return Err(HistogramError::InvalidRange { min, max });
            }
            if !min.is_finite() || !max.is_finite() {
                return Err(HistogramError::NonFiniteRange { min, max });
            }
            (min, max)
        }
        None if samples.is_empty() => (0.0, 1.0),
        None => {
            let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
            let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if samples.iter().any(|x| !x.is_finite()) {
                return Err(HistogramError::NonFiniteRange { min, max });
            }
            (min, max)
        }
    };
    if first == last {
        first -= 0.5;
        last += 0.5;
    }
    Ok((first, last))
}

fn validate_edges(edges: &[f64]) -> Result<(), HistogramError> {
    if edges.len() < 2 {
        return Err(HistogramError::TooFewEdges(edges.len()));
    }
    if edges.windows(2).any(|pair| !(pair[0] <= pair[1])) {
        return Err(HistogramError::NonMonotonicEdges);
    }
    Ok(())
}

/// `n + 1` evenly spaced edges; the last edge is exactly `last`.
fn linspace(first: f64, last: f64, n: usize) -> Vec<f64> {
    let step = (last - first) / n as f64;
    let mut edges: Vec<f64> = (0..=n).map(|i| first + i as f64 * step).collect();
    edges[n] = last;
    edges
}

fn rule_bin_count(rule: BinRule, kept: &[f64], first: f64, last: f64) -> usize {
    if kept.is_empty() {
        return 1;
    }
    let width = rule.width(kept);
    if width > 0.0 && width.is_finite() {
        ((last - first) / width).ceil().max(1.0) as usize
    } else {
        1
    }
}

fn count_uniform(samples: &[f64], edges: &[f64], weight: impl Fn(usize) -> f64) -> Vec<f64> {
    let n = edges.len() - 1;
    let first = edges[0];
    let last = edges[n];
    let span = last - first;
    let mut counts = vec![0.0; n];
    for (idx, &x) in samples.iter().enumerate() {
        if !(x >= first && x <= last) {
            continue;
        }
        // Scaled index, then corrected against the stored edges to absorb rounding.
        let mut bin = (((x - first) / span) * n as f64) as usize;
        if bin >= n {
            bin = n - 1;
        }
        if x < edges[bin] && bin > 0 {
            bin -= 1;
        }
        if bin != n - 1 && x >= edges[bin + 1] {
            bin += 1;
        }
        counts[bin] += weight(idx);
    }
    counts
}

fn count_explicit(samples: &[f64], edges: &[f64], weight: impl Fn(usize) -> f64) -> Vec<f64> {
    let n = edges.len() - 1;
    let first = edges[0];
    let last = edges[n];
    let mut counts = vec![0.0; n];
    for (idx, &x) in samples.iter().enumerate() {
        if !(x >= first && x <= last) {
            continue;
        }
        let bin = (edges.partition_point(|edge| *edge <= x) - 1).min(n - 1);
        counts[bin] += weight(idx);
    }
    counts
}

fn normalize_density(counts: &[f64], edges: &[f64]) -> Vec<f64> {
    let total: f64 = counts.iter().sum();
    counts
        .iter()
        .zip(edges.windows(2))
        .map(|(count, pair)| count / (pair[1] - pair[0]) / total)
        .collect()
}

fn ptp(samples: &[f64]) -> f64 {
    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    max - min
}

fn std_dev(samples: &[f64]) -> f64 {
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < EPS, "{actual:?} vs {expected:?}");
        }
    }

    fn count(n: usize) -> HistogramOptions {
        HistogramOptions::default().with_bins(Bins::Count(n))
    }

    #[test]
    fn three_bins_over_small_sample() {
        let series = hist(&[1.0, 2.0, 2.0, 3.0, 3.0, 3.0], &count(3)).unwrap();
        approx(&series.centers(), &[4.0 / 3.0, 2.0, 8.0 / 3.0]);
        assert_eq!(series.counts(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn edges_and_centers_line_up() {
        let raw = histogram(&[1.0, 2.0, 2.0, 3.0, 3.0, 3.0], &count(3)).unwrap();
        approx(&raw.edges, &[1.0, 5.0 / 3.0, 7.0 / 3.0, 3.0]);
        assert_eq!(raw.edges.len(), raw.counts.len() + 1);
    }

    #[test]
    fn counts_sum_to_sample_len_and_centers_ascend() {
        let samples: Vec<f64> = (0..97).map(|i| ((i * 37) % 101) as f64 * 0.31 - 7.0).collect();
        for bins in [1, 2, 5, 10, 33] {
            let series = hist(&samples, &count(bins)).unwrap();
            assert_eq!(series.len(), bins);
            assert_eq!(series.counts().iter().sum::<f64>(), samples.len() as f64);
            assert!(series.centers().windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn default_uses_ten_bins() {
        let series = hist(&[0.0, 1.0], &HistogramOptions::default()).unwrap();
        assert_eq!(series.len(), DEFAULT_BIN_COUNT);
        assert_eq!(series.counts()[0], 1.0);
        assert_eq!(series.counts()[9], 1.0);
    }

    #[test]
    fn last_bin_includes_right_edge() {
        let raw = histogram(&[0.0, 0.5, 1.0], &count(2)).unwrap();
        assert_eq!(raw.counts, vec![1.0, 2.0]);
    }

    #[test]
    fn constant_samples_widen_range() {
        let raw = histogram(&[5.0, 5.0], &count(2)).unwrap();
        approx(&raw.edges, &[4.5, 5.0, 5.5]);
        assert_eq!(raw.counts, vec![0.0, 2.0]);
    }

    #[test]
    fn empty_samples_use_unit_range() {
        let raw = histogram(&[], &count(4)).unwrap();
        approx(&raw.edges, &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(raw.counts, vec![0.0; 4]);
    }

    #[test]
    fn range_drops_outside_samples() {
        let raw = histogram(&[-1.0, 0.0, 0.4, 0.6, 1.0, 2.0], &count(2).with_range(0.0, 1.0)).unwrap();
        assert_eq!(raw.counts, vec![2.0, 2.0]);
    }

    #[test]
    fn explicit_edges() {
        let options = HistogramOptions::default().with_bins(Bins::Edges(vec![0.0, 1.0, 10.0]));
        let series = hist(&[0.0, 0.5, 1.0, 9.0, 10.0, 11.0], &options).unwrap();
        assert_eq!(series.centers(), vec![0.5, 5.5]);
        assert_eq!(series.counts(), vec![2.0, 3.0]);
        assert_eq!(series.get(5.5), Some(3.0));
    }

    #[test]
    fn weights_replace_unit_counts() {
        let options = count(2).with_weights(vec![0.5, 2.0, 3.0]);
        let raw = histogram(&[0.0, 0.2, 1.0], &options).unwrap();
        assert_eq!(raw.counts, vec![2.5, 3.0]);
    }

    #[test]
    fn density_integrates_to_one() {
        let raw = histogram(&[0.0, 1.0, 1.5, 3.0, 4.0], &count(4).with_density(true)).unwrap();
        let area: f64 = raw
            .counts
            .iter()
            .zip(raw.edges.windows(2))
            .map(|(density, pair)| density * (pair[1] - pair[0]))
            .sum();
        assert!((area - 1.0).abs() < EPS);
    }

    #[test]
    fn sturges_rule_picks_bin_count() {
        let options = HistogramOptions::default().with_bins(Bins::Rule(BinRule::Sturges));
        let series = hist(&[1.0, 2.0, 2.0, 3.0, 3.0, 3.0], &options).unwrap();
        assert_eq!(series.len(), 4);
        assert_eq!(series.counts().iter().sum::<f64>(), 6.0);
    }

    #[test]
    fn sqrt_rule_on_constant_data_uses_one_bin() {
        let options = HistogramOptions::default().with_bins(Bins::Rule(BinRule::Sqrt));
        assert_eq!(hist(&[2.0, 2.0, 2.0], &options).unwrap().len(), 1);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert_eq!(histogram(&[1.0], &count(0)), Err(HistogramError::ZeroBins));
        assert_eq!(
            histogram(&[1.0], &count(2).with_range(2.0, 1.0)),
            Err(HistogramError::InvalidRange { min: 2.0, max: 1.0 })
        );
        assert!(matches!(
            histogram(&[1.0, f64::NAN], &count(2)),
            Err(HistogramError::NonFiniteRange { .. })
        ));
        assert_eq!(
            histogram(&[1.0], &HistogramOptions::default().with_bins(Bins::Edges(vec![2.0, 1.0]))),
            Err(HistogramError::NonMonotonicEdges)
        );
        assert_eq!(
            histogram(&[1.0], &HistogramOptions::default().with_bins(Bins::Edges(vec![1.0]))),
            Err(HistogramError::TooFewEdges(1))
        );
        assert_eq!(
            histogram(&[1.0, 2.0], &count(2).with_weights(vec![1.0])),
            Err(HistogramError::WeightsLength {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn bins_parse_from_text() {
        assert_eq!("7".parse::<Bins>(), Ok(Bins::Count(7)));
        assert_eq!("0, 1.5,3".parse::<Bins>(), Ok(Bins::Edges(vec![0.0, 1.5, 3.0])));
        assert_eq!("Scott".parse::<Bins>(), Ok(Bins::Rule(BinRule::Scott)));
        assert!("auto".parse::<Bins>().is_err());
        assert!("1,x".parse::<Bins>().is_err());
    }

    #[test]
    fn nan_samples_are_ignored_with_explicit_range() {
        let raw = histogram(&[0.0, f64::NAN, 1.0], &count(1).with_range(0.0, 1.0)).unwrap();
        assert_eq!(raw.counts, vec![2.0]);
    }
}
