//! Period analysis result series and top-hit extraction.
//!
//! A scan produces four aligned coordinate series: frequency, period, power
//! and semi-amplitude. They are always produced and consumed together, so
//! they live in one record rather than behind a lookup by coordinate name.

use serde::{Deserialize, Serialize};

/// One sampled point of a period analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodAnalysisDatum {
    /// Frequency in cycles per day
    pub frequency: f64,
    /// Period in days, `1 / frequency`
    pub period: f64,
    /// Spectral power
    pub power: f64,
    /// Semi-amplitude of the best-fitting sinusoid at this frequency
    pub semi_amplitude: f64,
}

/// Four aligned coordinate series over a scan grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodAnalysisSeries {
    pub frequency: Vec<f64>,
    pub period: Vec<f64>,
    pub power: Vec<f64>,
    pub semi_amplitude: Vec<f64>,
}

impl PeriodAnalysisSeries {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frequency: Vec::with_capacity(capacity),
            period: Vec::with_capacity(capacity),
            power: Vec::with_capacity(capacity),
            semi_amplitude: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, datum: PeriodAnalysisDatum) {
        self.frequency.push(datum.frequency);
        self.period.push(datum.period);
        self.power.push(datum.power);
        self.semi_amplitude.push(datum.semi_amplitude);
    }

    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Row `i` across all four series.
    pub fn get(&self, i: usize) -> Option<PeriodAnalysisDatum> {
        Some(PeriodAnalysisDatum {
            frequency: *self.frequency.get(i)?,
            period: *self.period.get(i)?,
            power: *self.power.get(i)?,
            semi_amplitude: *self.semi_amplitude.get(i)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = PeriodAnalysisDatum> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Row with the largest power; ties keep the earliest row.
    pub fn peak(&self) -> Option<PeriodAnalysisDatum> {
        let mut best: Option<usize> = None;
        for (i, &p) in self.power.iter().enumerate() {
            if best.map_or(true, |b| p > self.power[b]) {
                best = Some(i);
            }
        }
        best.and_then(|i| self.get(i))
    }
}

impl FromIterator<PeriodAnalysisDatum> for PeriodAnalysisSeries {
    fn from_iter<I: IntoIterator<Item = PeriodAnalysisDatum>>(iter: I) -> Self {
        let mut series = Self::default();
        for datum in iter {
            series.push(datum);
        }
        series
    }
}

/// Local power maxima of `series`, strongest first.
///
/// Row `i` is a candidate when `power[i] > power[i - 1]` and
/// `power[i] >= power[i + 1]`; the first and last rows never qualify and a
/// flat-topped peak contributes its first row only. Candidates are ranked by
/// descending power, with equal powers kept in grid order.
///
/// With `min_separation > 0`, a candidate whose frequency lies within
/// `min_separation` of an already accepted (stronger) hit is dropped. At most
/// `max_hits` hits are returned.
pub fn find_top_hits(
    series: &PeriodAnalysisSeries,
    max_hits: usize,
    min_separation: f64,
) -> Vec<PeriodAnalysisDatum> {
    let power = &series.power;
    let n = power.len();
    if n < 3 || max_hits == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<usize> = (1..n - 1)
        .filter(|&i| power[i] > power[i - 1] && power[i] >= power[i + 1])
        .collect();

    // stable: equal powers stay in grid order
    candidates.sort_by(|&a, &b| power[b].total_cmp(&power[a]));

    let mut hits: Vec<PeriodAnalysisDatum> = Vec::with_capacity(max_hits.min(candidates.len()));
    for i in candidates {
        if hits.len() == max_hits {
            break;
        }
        let Some(datum) = series.get(i) else {
            continue;
        };
        if min_separation > 0.0
            && hits
                .iter()
                .any(|h| (h.frequency - datum.frequency).abs() < min_separation)
        {
            continue;
        }
        tracing::trace!(
            rank = hits.len(),
            frequency = datum.frequency,
            period = datum.period,
            power = datum.power,
            "top hit"
        );
        hits.push(datum);
    }

    hits
}
