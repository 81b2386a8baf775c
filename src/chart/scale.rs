//! Linear scales and chart domains.

/// Number of ticks on the price axis.
pub const X_TICKS: usize = 11;
/// Number of ticks on the score axis.
pub const Y_TICKS: usize = 6;
/// Fixed upper bound of the score axis.
pub const SCORE_CEILING: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Maps a domain value to the range. A zero-width domain maps everything
    /// to the start of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return r0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// `count` values evenly spaced across the domain, both ends included.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        match count {
            0 => Vec::new(),
            1 => vec![d0],
            _ => {
                let step = (d1 - d0) / (count - 1) as f64;
                (0..count).map(|i| d0 + step * i as f64).collect()
            }
        }
    }
}

/// `[0, ceil(1.1 * max price)]`; an empty set behaves as a maximum of zero.
pub fn price_domain(prices: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let max = prices.into_iter().fold(None, |acc: Option<f64>, price| {
        Some(acc.map_or(price, |current| current.max(price)))
    });
    (0.0, (max.unwrap_or(0.0) * 1.1).ceil())
}

/// `[floor(0.9 * min score), 100]`; an empty set behaves as a minimum of zero.
pub fn score_domain(scores: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let min = scores.into_iter().fold(None, |acc: Option<f64>, score| {
        Some(acc.map_or(score, |current| current.min(score)))
    });
    ((min.unwrap_or(0.0) * 0.9).floor(), SCORE_CEILING)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_domain_pads_and_rounds_up() {
        assert_eq!(price_domain([12.2675, 4.0, 21.03]), (0.0, 24.0));
        assert_eq!(price_domain([5.0]), (0.0, 6.0));
        assert_eq!(price_domain(Vec::new()), (0.0, 0.0));
    }

    #[test]
    fn score_domain_zooms_to_minimum() {
        assert_eq!(score_domain([69.57, 45.0, 88.0]), (40.0, 100.0));
        assert_eq!(score_domain([100.0]), (90.0, 100.0));
        assert_eq!(score_domain(Vec::new()), (0.0, 100.0));
    }

    #[test]
    fn maps_linearly_with_inverted_range() {
        let y = LinearScale::new((40.0, 100.0), (450.0, 20.0));
        assert_eq!(y.map(40.0), 450.0);
        assert_eq!(y.map(100.0), 20.0);
        assert_eq!(y.map(70.0), 235.0);
    }

    #[test]
    fn degenerate_domain_maps_to_range_start() {
        let x = LinearScale::new((0.0, 0.0), (60.0, 770.0));
        assert_eq!(x.map(0.0), 60.0);
    }

    #[test]
    fn ticks_are_evenly_spaced() {
        let x = LinearScale::new((0.0, 20.0), (0.0, 1.0));
        let ticks = x.ticks(X_TICKS);
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[0], 0.0);
        assert_eq!(ticks[1], 2.0);
        assert_eq!(ticks[10], 20.0);

        let y = LinearScale::new((40.0, 100.0), (0.0, 1.0));
        assert_eq!(y.ticks(Y_TICKS), vec![40.0, 52.0, 64.0, 76.0, 88.0, 100.0]);
    }
}
