//! Detects parameter edits that need an immediate refetch.

use crate::domain::{PolynomialParams, StrategyToggles};

use super::service::DashboardRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamChange {
    None,
    /// Request parameters changed: refetch once, now.
    Refetch,
    /// Pair or timeframe changed: clear the response cache, drop the old
    /// market view, then refetch.
    RefetchAndReset,
}

impl ParamChange {
    pub fn needs_refetch(self) -> bool {
        !matches!(self, ParamChange::None)
    }
}

/// Remembers the last request the dashboard was fetched with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamsWatcher {
    last: DashboardRequest,
}

impl ParamsWatcher {
    pub fn new(initial: DashboardRequest) -> Self {
        Self { last: initial }
    }

    pub fn current(&self) -> &DashboardRequest {
        &self.last
    }

    /// Compare against the last seen request and remember `next`.
    ///
    /// The unit size only matters when a trade is placed, so editing it
    /// alone never triggers a refetch.
    pub fn update(&mut self, next: &DashboardRequest) -> ParamChange {
        let change = classify(&self.last, next);
        if self.last != *next {
            self.last = next.clone();
        }
        change
    }
}

fn classify(prev: &DashboardRequest, next: &DashboardRequest) -> ParamChange {
    if next.params.requires_cache_reset(&prev.params) {
        return ParamChange::RefetchAndReset;
    }
    if next.params.affects_requests(&prev.params)
        || polynomial_changed(prev, next)
        || toggles_changed(&prev.toggles, &next.toggles)
    {
        return ParamChange::Refetch;
    }
    ParamChange::None
}

/// Polynomial settings only matter while the forecast is shown.
fn polynomial_changed(prev: &DashboardRequest, next: &DashboardRequest) -> bool {
    let shown = next.toggles.polynomial;
    shown && !same_poly(&prev.polynomial, &next.polynomial)
}

fn same_poly(a: &PolynomialParams, b: &PolynomialParams) -> bool {
    a.clamped() == b.clamped()
}

/// Turning the forecast on needs its data; turning it off does not.
fn toggles_changed(prev: &StrategyToggles, next: &StrategyToggles) -> bool {
    next.polynomial && !prev.polynomial
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timeframe;

    fn request() -> DashboardRequest {
        DashboardRequest::default()
    }

    #[test]
    fn unchanged_request_is_quiet() {
        let mut w = ParamsWatcher::new(request());
        assert_eq!(w.update(&request()), ParamChange::None);
    }

    #[test]
    fn pair_and_timeframe_reset() {
        let mut w = ParamsWatcher::new(request());
        let mut next = request();
        next.params.pair = "EUR_USD".into();
        assert_eq!(w.update(&next), ParamChange::RefetchAndReset);
        assert_eq!(w.update(&next), ParamChange::None);

        next.params.timeframe = Timeframe::H1;
        assert_eq!(w.update(&next), ParamChange::RefetchAndReset);
    }

    #[test]
    fn periods_and_strategy_refetch_without_reset() {
        let mut w = ParamsWatcher::new(request());
        let mut next = request();
        next.params.periods = 96;
        assert_eq!(w.update(&next), ParamChange::Refetch);

        next.toggles.toggle_zero_lag(&mut next.params);
        assert_eq!(w.update(&next), ParamChange::Refetch);
    }

    #[test]
    fn units_alone_never_refetch() {
        let mut w = ParamsWatcher::new(request());
        let mut next = request();
        next.params.step_units(true);
        assert_eq!(w.update(&next), ParamChange::None);
        assert_eq!(w.current().params.units, next.params.units);
    }

    #[test]
    fn polynomial_edits_only_count_while_shown() {
        let mut w = ParamsWatcher::new(request());
        let mut next = request();
        next.polynomial.adjust_degree(1);
        assert_eq!(w.update(&next), ParamChange::None);

        next.toggles.polynomial = true;
        assert_eq!(w.update(&next), ParamChange::Refetch);

        next.polynomial.adjust_lookback(1);
        assert_eq!(w.update(&next), ParamChange::Refetch);

        next.toggles.polynomial = false;
        assert_eq!(w.update(&next), ParamChange::None);
    }
}
