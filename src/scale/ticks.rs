//! Tick generation and tick label formatting.

use chrono::DateTime;

const MAX_TICKS: f64 = 10_000.0;

const SECOND: f64 = 1_000.0;
const MINUTE: f64 = 60.0 * SECOND;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

const DATE_STEPS: [f64; 18] = [
    SECOND,
    5.0 * SECOND,
    15.0 * SECOND,
    30.0 * SECOND,
    MINUTE,
    5.0 * MINUTE,
    15.0 * MINUTE,
    30.0 * MINUTE,
    HOUR,
    3.0 * HOUR,
    6.0 * HOUR,
    12.0 * HOUR,
    DAY,
    2.0 * DAY,
    7.0 * DAY,
    30.0 * DAY,
    90.0 * DAY,
    365.0 * DAY,
];

/// Nice step size for roughly `count` intervals over `span`.
pub fn nice_step(span: f64, count: usize) -> f64 {
    let raw = span.abs() / count.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 0.0;
    }
    let power = 10_f64.powf(raw.log10().floor());
    let fraction = raw / power;
    let nice = if fraction >= 7.5 {
        10.0
    } else if fraction >= 3.5 {
        5.0
    } else if fraction >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * power
}

/// Ticks at nice multiples inside `[min, max]`.
pub fn linear_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo == hi {
        return vec![lo];
    }
    let step = nice_step(hi - lo, count);
    if step == 0.0 {
        return vec![lo, hi];
    }
    // Fractional steps divide by the inverse step so 3 * 0.2 lands on 0.6.
    if step < 1.0 {
        let inverse = (1.0 / step).round();
        let start = (lo * inverse).ceil();
        let stop = (hi * inverse).floor();
        let n = (stop - start).min(MAX_TICKS);
        if n < 0.0 {
            return Vec::new();
        }
        return (0..=n as u64)
            .map(|i| (start + i as f64) / inverse)
            .collect();
    }
    let start = (lo / step).ceil();
    let stop = (hi / step).floor();
    let n = (stop - start).min(MAX_TICKS);
    if n < 0.0 {
        return Vec::new();
    }
    (0..=n as u64).map(|i| (start + i as f64) * step).collect()
}

/// Decade ticks inside `[min, max]`, falling back to linear ticks when the
/// range spans less than two decades.
pub fn log_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if min <= 0.0 || max <= 0.0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let first = lo.log10().ceil() as i32;
    let last = hi.log10().floor() as i32;
    if last - first < 1 {
        return linear_ticks(lo, hi, count);
    }
    (first..=last).map(|exp| 10_f64.powi(exp)).collect()
}

/// Date tick step (milliseconds) closest to `count` intervals over the span.
pub fn date_step(span_ms: f64, count: usize) -> f64 {
    let target = span_ms.abs() / count.max(1) as f64;
    DATE_STEPS
        .iter()
        .copied()
        .find(|step| *step >= target)
        .unwrap_or_else(|| {
            let years = (target / DATE_STEPS[17]).ceil().max(1.0);
            years * DATE_STEPS[17]
        })
}

/// Date ticks (milliseconds since the epoch) inside `[min, max]`.
pub fn date_ticks(min: f64, max: f64, count: usize) -> Vec<f64> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo == hi {
        return vec![lo];
    }
    let step = date_step(hi - lo, count);
    let start = (lo / step).ceil();
    let stop = (hi / step).floor();
    let n = (stop - start).min(MAX_TICKS);
    if n < 0.0 {
        return Vec::new();
    }
    (0..=n as u64).map(|i| (start + i as f64) * step).collect()
}

/// Format a numeric tick with just enough precision for the tick step.
pub fn format_number(value: f64, step: f64) -> String {
    let decimals = if step > 0.0 && step.is_finite() {
        (-step.log10().floor()).max(0.0) as usize
    } else {
        0
    };
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.decimals$}")
}

/// Format a date tick according to the step granularity.
pub fn format_date(value_ms: f64, step_ms: f64) -> String {
    let Some(date) = DateTime::from_timestamp_millis(value_ms as i64) else {
        return format_number(value_ms, step_ms);
    };
    let pattern = if step_ms < MINUTE {
        "%H:%M:%S"
    } else if step_ms < DAY {
        "%H:%M"
    } else if step_ms < 30.0 * DAY {
        "%b %d"
    } else if step_ms < 365.0 * DAY {
        "%b %Y"
    } else {
        "%Y"
    };
    date.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_ticks_stay_inside_domain() {
        let ticks = linear_ticks(0.0, 1.0, 5);
        assert_eq!(ticks, vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        let ticks = linear_ticks(0.5, 2.0, 10);
        assert!(ticks.iter().all(|t| (0.5..=2.0).contains(t)));
    }

    #[test]
    fn log_ticks_are_decades() {
        assert_eq!(log_ticks(1.0, 1000.0, 10), vec![1.0, 10.0, 100.0, 1000.0]);
        assert!(log_ticks(0.0, 10.0, 10).is_empty());
    }

    #[test]
    fn number_format_follows_step() {
        assert_eq!(format_number(0.25, 0.05), "0.25");
        assert_eq!(format_number(20.0, 5.0), "20");
        assert_eq!(format_number(-0.0, 1.0), "0");
    }

    #[test]
    fn date_ticks_use_calendar_steps() {
        let ticks = date_ticks(0.0, 10.0 * DAY, 10);
        assert_eq!(ticks.len(), 11);
        assert_eq!(format_date(ticks[1], DAY), "Jan 02");
    }
}
