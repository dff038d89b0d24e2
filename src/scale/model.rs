//! Scale models and their domain merge policies.
//!
//! A scale model keeps one partial domain per contributor and folds them into
//! the resolved domain on every mutation. Contributors never hold references
//! to each other; the table is the only shared state.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::ScaleConfig;
use crate::data::Values;
use crate::domain::{Domain, Extent, PartialDomain};

use super::ScaleKind;

static SCALE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a scale model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScaleId(u64);

impl ScaleId {
    fn next() -> Self {
        Self(SCALE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identity of something supplying a partial domain to a scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContributorId(u64);

impl ContributorId {
    /// Wrap a raw contributor id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Access the raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Notification that a scale's resolved domain changed.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainChanged {
    /// Scale whose domain changed.
    pub scale: ScaleId,
    /// The new resolved domain.
    pub domain: Domain,
}

/// Shared scale state: contributions, overrides, and the resolved domain.
#[derive(Debug, Clone)]
pub struct ScaleModel {
    id: ScaleId,
    kind: ScaleKind,
    config: ScaleConfig,
    domains: Vec<(ContributorId, PartialDomain)>,
    domain: Domain,
}

impl ScaleModel {
    /// Create a scale model with default options.
    pub fn new(kind: ScaleKind) -> Self {
        Self::with_config(kind, ScaleConfig::default())
    }

    /// Create a scale model with explicit options.
    pub fn with_config(kind: ScaleKind, config: ScaleConfig) -> Self {
        let mut model = Self {
            id: ScaleId::next(),
            kind,
            config,
            domains: Vec::new(),
            domain: Domain::Empty,
        };
        model.update_domain();
        model
    }

    /// Create a linear scale.
    pub fn linear() -> Self {
        Self::new(ScaleKind::Linear)
    }

    /// Create a log scale.
    pub fn log() -> Self {
        Self::new(ScaleKind::Log)
    }

    /// Create a date scale.
    pub fn date() -> Self {
        Self::new(ScaleKind::Date)
    }

    /// Create an ordinal scale.
    pub fn ordinal() -> Self {
        Self::new(ScaleKind::Ordinal)
    }

    /// Create a linear color scale.
    pub fn color() -> Self {
        Self::new(ScaleKind::ColorLinear)
    }

    /// Create an ordinal color scale.
    pub fn ordinal_color() -> Self {
        Self::new(ScaleKind::ColorOrdinal)
    }

    /// Access the scale identifier.
    pub fn id(&self) -> ScaleId {
        self.id
    }

    /// Access the scale type.
    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    /// Access the scale options.
    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Access the resolved domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Access one contributor's partial domain.
    pub fn contribution(&self, contributor: ContributorId) -> Option<&PartialDomain> {
        self.domains
            .iter()
            .find(|(id, _)| *id == contributor)
            .map(|(_, partial)| partial)
    }

    /// Number of registered contributors.
    pub fn contributor_count(&self) -> usize {
        self.domains.len()
    }

    /// Whether the lower bound is derived from data.
    pub fn min_from_data(&self) -> bool {
        self.config.min.is_none()
    }

    /// Whether the upper bound is derived from data.
    pub fn max_from_data(&self) -> bool {
        self.config.max.is_none()
    }

    /// Store or replace a contributor's partial domain.
    pub fn set_domain(
        &mut self,
        partial: PartialDomain,
        contributor: ContributorId,
    ) -> Option<DomainChanged> {
        match self.domains.iter_mut().find(|(id, _)| *id == contributor) {
            Some((_, existing)) => *existing = partial,
            None => self.domains.push((contributor, partial)),
        }
        self.update_domain()
    }

    /// Remove a contributor.
    pub fn del_domain(&mut self, contributor: ContributorId) -> Option<DomainChanged> {
        let before = self.domains.len();
        self.domains.retain(|(id, _)| *id != contributor);
        if self.domains.len() == before {
            return None;
        }
        self.update_domain()
    }

    /// Derive a partial domain from raw values and store it.
    ///
    /// Continuous scales reduce to `[min, max]` over all finite numbers;
    /// ordinal scales take the de-duplicated labels in first-seen order.
    pub fn compute_and_set_domain(
        &mut self,
        values: &Values,
        contributor: ContributorId,
    ) -> Option<DomainChanged> {
        let partial = if self.kind.is_ordinal() {
            let labels = values.unique_labels();
            if labels.is_empty() {
                PartialDomain::Empty
            } else {
                PartialDomain::Labels(labels)
            }
        } else {
            values
                .extent()
                .map(PartialDomain::Extent)
                .unwrap_or(PartialDomain::Empty)
        };
        self.set_domain(partial, contributor)
    }

    /// Set or clear the explicit lower bound.
    pub fn set_min(&mut self, min: Option<f64>) -> Option<DomainChanged> {
        self.config.min = min;
        self.update_domain()
    }

    /// Set or clear the explicit upper bound.
    pub fn set_max(&mut self, max: Option<f64>) -> Option<DomainChanged> {
        self.config.max = max;
        self.update_domain()
    }

    /// Set or clear the explicit divergence point.
    pub fn set_mid(&mut self, mid: Option<f64>) -> Option<DomainChanged> {
        self.config.mid = mid;
        self.update_domain()
    }

    /// Toggle the divergent three-point domain of color scales.
    pub fn set_divergent(&mut self, divergent: bool) -> Option<DomainChanged> {
        self.config.divergent = divergent;
        self.update_domain()
    }

    /// Toggle the scale direction.
    pub fn set_reverse(&mut self, reverse: bool) -> Option<DomainChanged> {
        self.config.reverse = reverse;
        self.update_domain()
    }

    /// Toggle stabilized domain updates.
    pub fn set_stabilized(&mut self, stabilized: bool) {
        self.config.stabilized = stabilized;
    }

    /// Set or clear the explicit ordinal domain.
    pub fn set_ordinal_domain(&mut self, domain: Option<Vec<String>>) -> Option<DomainChanged> {
        self.config.domain = domain;
        self.update_domain()
    }

    /// Recompute the resolved domain from contributions and overrides.
    ///
    /// Returns the change notification when the resolved domain differs from
    /// the previous one.
    pub fn update_domain(&mut self) -> Option<DomainChanged> {
        let next = if self.kind.is_ordinal() {
            self.resolve_ordinal()
        } else {
            self.resolve_continuous()?
        };
        if next == self.domain {
            return None;
        }
        tracing::debug!(scale = ?self.id, kind = ?self.kind, domain = ?next, "scale domain changed");
        self.domain = next.clone();
        Some(DomainChanged {
            scale: self.id,
            domain: next,
        })
    }

    fn resolve_ordinal(&self) -> Domain {
        let mut labels: Vec<String> = match &self.config.domain {
            Some(explicit) => explicit.clone(),
            None => {
                let mut union: Vec<String> = Vec::new();
                for (_, partial) in &self.domains {
                    if let PartialDomain::Labels(labels) = partial {
                        for label in labels {
                            if !union.contains(label) {
                                union.push(label.clone());
                            }
                        }
                    }
                }
                union
            }
        };
        if labels.is_empty() {
            return Domain::Empty;
        }
        if self.config.reverse {
            labels.reverse();
        }
        Domain::Ordinal(labels)
    }

    /// Resolve a continuous domain; `None` means the stabilized policy keeps
    /// the previous domain.
    fn resolve_continuous(&self) -> Option<Domain> {
        let min = match self.config.min {
            Some(min) => min,
            None => self
                .domains
                .iter()
                .map(|(_, partial)| partial.first())
                .fold(f64::INFINITY, f64::min),
        };
        let max = match self.config.max {
            Some(max) => max,
            None => self
                .domains
                .iter()
                .map(|(_, partial)| partial.last())
                .fold(f64::NEG_INFINITY, f64::max),
        };
        if !min.is_finite() || !max.is_finite() {
            return Some(Domain::Empty);
        }

        let mut extent = Extent { min, max };
        if self.config.stabilized && self.min_from_data() && self.max_from_data() {
            if let Some(previous) = self.domain.extent() {
                extent = self.stabilize(previous, extent)?;
            }
        }

        if self.kind.is_color() && self.config.divergent {
            let mid = self.config.mid.unwrap_or_else(|| extent.center());
            return Some(Domain::Divergent {
                min: extent.min,
                mid,
                max: extent.max,
            });
        }
        Some(Domain::Continuous {
            min: extent.min,
            max: extent.max,
        })
    }

    fn stabilize(&self, previous: Extent, next: Extent) -> Option<Extent> {
        let inside = next.min >= previous.min && next.max <= previous.max;
        if inside && next.span() >= self.config.min_range * previous.span() {
            return None;
        }
        let mid_range = self.config.mid_range;
        if mid_range <= 0.0 {
            return Some(next);
        }
        let half = next.span() / mid_range * 0.5;
        let center = next.center();
        Some(Extent {
            min: center - half,
            max: center + half,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contributor(raw: u64) -> ContributorId {
        ContributorId::new(raw)
    }

    fn extent(min: f64, max: f64) -> PartialDomain {
        PartialDomain::Extent(Extent::new(min, max))
    }

    #[test]
    fn linear_merge_takes_min_first_and_max_last() {
        let mut scale = ScaleModel::linear();
        scale.set_domain(extent(0.0, 1.0), contributor(1));
        scale.set_domain(extent(0.5, 2.0), contributor(2));
        scale.set_domain(PartialDomain::Empty, contributor(3));
        assert_eq!(scale.domain(), &Domain::Continuous { min: 0.0, max: 2.0 });
    }

    #[test]
    fn deleting_last_contributor_empties_domain() {
        let mut scale = ScaleModel::linear();
        let id = contributor(1);
        scale.compute_and_set_domain(&Values::Numbers(vec![3.0, -1.0]), id);
        assert_eq!(scale.domain(), &Domain::Continuous { min: -1.0, max: 3.0 });
        let changed = scale.del_domain(id).expect("domain changes");
        assert_eq!(changed.domain, Domain::Empty);
        assert!(scale.domain().is_empty());
        assert!(scale.del_domain(id).is_none());
    }

    #[test]
    fn unchanged_contribution_emits_nothing() {
        let mut scale = ScaleModel::linear();
        assert!(scale.set_domain(extent(0.0, 1.0), contributor(1)).is_some());
        assert!(scale.set_domain(extent(0.0, 1.0), contributor(1)).is_none());
        assert!(scale.set_domain(extent(0.2, 0.8), contributor(2)).is_none());
    }

    #[test]
    fn explicit_bounds_short_circuit_data() {
        let mut scale = ScaleModel::linear();
        scale.set_domain(extent(0.0, 10.0), contributor(1));
        scale.set_min(Some(-5.0));
        assert_eq!(scale.domain(), &Domain::Continuous { min: -5.0, max: 10.0 });
        scale.set_max(Some(3.0));
        assert_eq!(scale.domain(), &Domain::Continuous { min: -5.0, max: 3.0 });
        scale.set_min(None);
        assert_eq!(scale.domain(), &Domain::Continuous { min: 0.0, max: 3.0 });
        assert!(!scale.max_from_data());
    }

    #[test]
    fn stabilized_ignores_small_moves_inside_window() {
        let mut scale = ScaleModel::linear();
        scale.set_stabilized(true);
        scale.set_domain(extent(0.0, 10.0), contributor(1));
        assert_eq!(scale.domain(), &Domain::Continuous { min: 0.0, max: 10.0 });
        assert!(scale.set_domain(extent(1.0, 9.0), contributor(1)).is_none());
        assert_eq!(scale.domain(), &Domain::Continuous { min: 0.0, max: 10.0 });
    }

    #[test]
    fn stabilized_recenters_when_data_escapes() {
        let mut scale = ScaleModel::linear();
        scale.set_stabilized(true);
        scale.set_domain(extent(0.0, 10.0), contributor(1));
        scale.set_domain(extent(0.0, 16.0), contributor(1));
        let extent = scale.domain().extent().unwrap();
        assert!((extent.min - -2.0).abs() < 1e-9);
        assert!((extent.max - 18.0).abs() < 1e-9);
    }

    #[test]
    fn ordinal_union_preserves_first_seen_order() {
        let mut scale = ScaleModel::ordinal();
        scale.compute_and_set_domain(&Values::from(vec!["b", "a", "b"]), contributor(1));
        scale.compute_and_set_domain(&Values::from(vec!["c", "a"]), contributor(2));
        assert_eq!(scale.domain().labels().unwrap(), ["b", "a", "c"]);
        assert!(
            scale
                .compute_and_set_domain(&Values::from(vec!["a", "c"]), contributor(2))
                .is_none()
        );
        assert!(
            scale
                .compute_and_set_domain(&Values::from(vec!["a"]), contributor(2))
                .is_some()
        );
        assert_eq!(scale.domain().labels().unwrap(), ["b", "a"]);
    }

    #[test]
    fn reversed_ordinal_is_reverse_of_union() {
        let mut plain = ScaleModel::ordinal();
        let mut reversed = ScaleModel::ordinal();
        reversed.set_reverse(true);
        let values = Values::from(vec!["x", "y", "z", "y"]);
        plain.compute_and_set_domain(&values, contributor(1));
        reversed.compute_and_set_domain(&values, contributor(1));
        let mut expected = plain.domain().labels().unwrap().to_vec();
        expected.reverse();
        assert_eq!(reversed.domain().labels().unwrap(), expected.as_slice());
    }

    #[test]
    fn explicit_ordinal_domain_wins() {
        let mut scale = ScaleModel::ordinal();
        scale.compute_and_set_domain(&Values::from(vec!["a", "b"]), contributor(1));
        scale.set_ordinal_domain(Some(vec!["z".to_string()]));
        assert_eq!(scale.domain().labels().unwrap(), ["z"]);
    }

    #[test]
    fn divergent_color_domain_has_midpoint() {
        let mut scale = ScaleModel::color();
        scale.set_divergent(true);
        scale.compute_and_set_domain(&Values::Numbers(vec![-2.0, 6.0]), contributor(1));
        assert_eq!(
            scale.domain(),
            &Domain::Divergent {
                min: -2.0,
                mid: 2.0,
                max: 6.0
            }
        );
        scale.set_mid(Some(0.0));
        assert_eq!(scale.domain().points(), vec![-2.0, 0.0, 6.0]);
    }
}
