use std::collections::BTreeMap;

use crate::data::Values;

use super::Channel;

/// Histogram options.
#[derive(Debug, Clone, PartialEq)]
pub struct HistOptions {
    /// Number of equal-width bins.
    pub bins: usize,
    /// Report densities instead of raw counts.
    pub normalized: bool,
}

impl Default for HistOptions {
    fn default() -> Self {
        Self {
            bins: 10,
            normalized: false,
        }
    }
}

/// One histogram bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    /// Bucket index.
    pub index: usize,
    /// Lower edge.
    pub x0: f64,
    /// Upper edge.
    pub x1: f64,
    /// Sample count, or density when normalized.
    pub count: f64,
}

/// Bin the finite values of `sample` into `bins` equal-width buckets over
/// `[min, max]`. The last bucket includes its upper edge.
pub fn histogram(sample: &[f64], bins: usize, normalized: bool) -> Vec<Bin> {
    let finite: Vec<f64> = sample.iter().copied().filter(|v| v.is_finite()).collect();
    if bins == 0 || finite.is_empty() {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    let mut counts = vec![0.0_f64; bins];
    for value in &finite {
        let index = if width > 0.0 {
            (((value - min) / width).floor() as usize).min(bins - 1)
        } else {
            0
        };
        counts[index] += 1.0;
    }
    if normalized {
        let total = finite.len() as f64;
        let scale = if width > 0.0 { total * width } else { total };
        counts.iter_mut().for_each(|count| *count /= scale);
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| Bin {
            index,
            x0: min + width * index as f64,
            x1: if index + 1 == bins {
                max
            } else {
                min + width * (index + 1) as f64
            },
            count,
        })
        .collect()
}

pub(super) fn build(fields: &BTreeMap<Channel, Values>, options: &HistOptions) -> Vec<Bin> {
    match fields.get(&Channel::Sample) {
        Some(Values::Numbers(sample)) => histogram(sample, options.bins, options.normalized),
        Some(nested @ Values::Nested(_)) => {
            let flat: Vec<f64> = nested.rows().into_iter().flatten().copied().collect();
            histogram(&flat, options.bins, options.normalized)
        }
        _ => Vec::new(),
    }
}

/// Sample extent on the x scale and `[0, max count]` on the count scale.
pub(super) fn contributions(bins: &[Bin]) -> BTreeMap<Channel, Values> {
    let mut out = BTreeMap::new();
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return out;
    };
    out.insert(Channel::Sample, Values::Numbers(vec![first.x0, last.x1]));
    let max_count = bins.iter().map(|bin| bin.count).fold(0.0, f64::max);
    out.insert(Channel::Count, Values::Numbers(vec![0.0, max_count]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hundred_samples_in_three_bins() {
        let sample: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&sample, 3, false);
        assert_eq!(bins.len(), 3);
        let total: f64 = bins.iter().map(|bin| bin.count).sum();
        assert_eq!(total, 100.0);
        assert_eq!(bins[2].x1, 99.0);
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0], 2, false);
        assert_eq!(bins[0].count, 2.0);
        assert_eq!(bins[1].count, 2.0);
    }

    #[test]
    fn constant_sample_fills_first_bin() {
        let bins = histogram(&[4.0, 4.0, f64::NAN], 4, false);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].count, 2.0);
    }

    #[test]
    fn normalized_density_integrates_to_one() {
        let sample: Vec<f64> = (0..10).map(f64::from).collect();
        let bins = histogram(&sample, 5, true);
        let area: f64 = bins.iter().map(|bin| bin.count * (bin.x1 - bin.x0)).sum();
        assert!((area - 1.0).abs() < 1e-9);
    }

    #[test]
    fn count_domain_starts_at_zero() {
        let bins = histogram(&[1.0, 1.0, 2.0], 2, false);
        let contributions = contributions(&bins);
        assert_eq!(contributions[&Channel::Count], Values::Numbers(vec![0.0, 2.0]));
    }
}
