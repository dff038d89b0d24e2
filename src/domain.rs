//! Data domains: numeric extents, resolved scale domains, and contributions.

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Extent {
    /// Create a new extent, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Span of the extent.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Midpoint of the extent.
    pub fn center(&self) -> f64 {
        (self.min + self.max) * 0.5
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Expand the extent to include a value.
    pub fn expand_to_include(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    /// Union two extents.
    pub fn union(a: Self, b: Self) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Check whether a value lies inside the extent.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One contributor's partial domain.
#[derive(Debug, Clone, PartialEq)]
pub enum PartialDomain {
    /// The contributor has no data; it never wins a min/max reduction.
    Empty,
    /// Continuous `[min, max]` contribution.
    Extent(Extent),
    /// Ordinal labels in first-seen order.
    Labels(Vec<String>),
}

impl PartialDomain {
    /// First element used by the min reduction.
    pub(crate) fn first(&self) -> f64 {
        match self {
            Self::Extent(extent) => extent.min,
            _ => f64::INFINITY,
        }
    }

    /// Last element used by the max reduction.
    pub(crate) fn last(&self) -> f64 {
        match self {
            Self::Extent(extent) => extent.max,
            _ => f64::NEG_INFINITY,
        }
    }
}

/// The resolved domain of a scale.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Domain {
    /// No contributor supplied data and no override is set.
    #[default]
    Empty,
    /// Two-point continuous domain.
    Continuous {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Three-point divergent domain for color scales.
    Divergent {
        /// Lower bound.
        min: f64,
        /// Divergence point.
        mid: f64,
        /// Upper bound.
        max: f64,
    },
    /// Ordered label list.
    Ordinal(Vec<String>),
}

impl Domain {
    /// Check whether the domain is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Ordinal(labels) => labels.is_empty(),
            _ => false,
        }
    }

    /// Continuous bounds, if the domain is continuous.
    pub fn extent(&self) -> Option<Extent> {
        match self {
            Self::Continuous { min, max } | Self::Divergent { min, max, .. } => {
                Some(Extent { min: *min, max: *max })
            }
            _ => None,
        }
    }

    /// Ordinal labels, if the domain is ordinal.
    pub fn labels(&self) -> Option<&[String]> {
        match self {
            Self::Ordinal(labels) => Some(labels),
            _ => None,
        }
    }

    /// Numeric domain points: two for continuous, three for divergent.
    pub fn points(&self) -> Vec<f64> {
        match self {
            Self::Continuous { min, max } => vec![*min, *max],
            Self::Divergent { min, mid, max } => vec![*min, *mid, *max],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_swaps_and_expands() {
        let mut extent = Extent::new(4.0, 1.0);
        assert_eq!(extent.min, 1.0);
        extent.expand_to_include(f64::NAN);
        extent.expand_to_include(9.0);
        assert_eq!(extent.max, 9.0);
        assert_eq!(extent.center(), 5.0);
    }

    #[test]
    fn empty_contribution_never_wins() {
        let empty = PartialDomain::Empty;
        assert_eq!(empty.first(), f64::INFINITY);
        assert_eq!(empty.last(), f64::NEG_INFINITY);
    }
}
