//! Per-view interactive state.
//!
//! A `Session` is owned by whoever drives the UI. Each user action starts new
//! tickets on the charts it affects; results computed elsewhere (for instance
//! on a worker thread) are committed with those tickets, and results of an
//! older action are dropped.

use crate::batch::{ChartSlot, Ticket};
use crate::dashboard::{
    ChartContent, CountryCharts, EmissionChart, HeatmapChart, PieChart, PyramidChart, RadarChart,
    TrendChart,
};

/// Tickets for every country chart, issued by one selection.
#[derive(Debug, Clone)]
pub struct CountryTickets {
    pub country: String,
    gdp: Ticket,
    gdp_growth: Ticket,
    co2_intensity: Ticket,
    emissions: Ticket,
    pies: Ticket,
    pyramid: Ticket,
    heatmap: Ticket,
}

#[derive(Debug, Default)]
pub struct Session {
    country: Option<String>,
    compared: Option<String>,
    gdp: ChartSlot<ChartContent<TrendChart>>,
    gdp_growth: ChartSlot<ChartContent<TrendChart>>,
    co2_intensity: ChartSlot<ChartContent<TrendChart>>,
    emissions: ChartSlot<ChartContent<EmissionChart>>,
    pies: ChartSlot<ChartContent<Vec<PieChart>>>,
    pyramid: ChartSlot<ChartContent<PyramidChart>>,
    heatmap: ChartSlot<ChartContent<HeatmapChart>>,
    radar: ChartSlot<ChartContent<RadarChart>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn compared(&self) -> Option<&str> {
        self.compared.as_deref()
    }

    /// Select a country: every country chart starts a new generation.
    pub fn select_country(&mut self, name: &str) -> CountryTickets {
        self.country = Some(name.to_string());
        CountryTickets {
            country: name.to_string(),
            gdp: self.gdp.begin(),
            gdp_growth: self.gdp_growth.begin(),
            co2_intensity: self.co2_intensity.begin(),
            emissions: self.emissions.begin(),
            pies: self.pies.begin(),
            pyramid: self.pyramid.begin(),
            heatmap: self.heatmap.begin(),
        }
    }

    /// Commit a full set of country charts. Returns how many charts were
    /// still current and got stored.
    pub fn apply_country(&mut self, tickets: CountryTickets, charts: CountryCharts) -> usize {
        [
            self.gdp.commit(tickets.gdp, charts.gdp),
            self.gdp_growth.commit(tickets.gdp_growth, charts.gdp_growth),
            self.co2_intensity.commit(tickets.co2_intensity, charts.co2_intensity),
            self.emissions.commit(tickets.emissions, charts.emissions),
            self.pies.commit(tickets.pies, charts.pies),
            self.pyramid.commit(tickets.pyramid, charts.pyramid),
            self.heatmap.commit(tickets.heatmap, charts.heatmap),
        ]
        .into_iter()
        .filter(|stored| *stored)
        .count()
    }

    /// Redraw only the pies, e.g. after a year slider moved.
    pub fn redraw_pies(&mut self) -> Ticket {
        self.pies.begin()
    }

    pub fn commit_pies(&mut self, ticket: Ticket, pies: ChartContent<Vec<PieChart>>) -> bool {
        self.pies.commit(ticket, pies)
    }

    /// Pick the second country of the comparison view.
    pub fn compare_with(&mut self, name: &str) -> Ticket {
        self.compared = Some(name.to_string());
        self.radar.begin()
    }

    pub fn commit_radar(&mut self, ticket: Ticket, radar: ChartContent<RadarChart>) -> bool {
        self.radar.commit(ticket, radar)
    }

    pub fn gdp(&self) -> Option<&ChartContent<TrendChart>> {
        self.gdp.current()
    }

    pub fn gdp_growth(&self) -> Option<&ChartContent<TrendChart>> {
        self.gdp_growth.current()
    }

    pub fn co2_intensity(&self) -> Option<&ChartContent<TrendChart>> {
        self.co2_intensity.current()
    }

    pub fn emissions(&self) -> Option<&ChartContent<EmissionChart>> {
        self.emissions.current()
    }

    pub fn pies(&self) -> Option<&ChartContent<Vec<PieChart>>> {
        self.pies.current()
    }

    pub fn pyramid(&self) -> Option<&ChartContent<PyramidChart>> {
        self.pyramid.current()
    }

    pub fn heatmap(&self) -> Option<&ChartContent<HeatmapChart>> {
        self.heatmap.current()
    }

    pub fn radar(&self) -> Option<&ChartContent<RadarChart>> {
        self.radar.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder(msg: &str) -> CountryCharts {
        CountryCharts {
            gdp: ChartContent::NoData(msg.into()),
            gdp_growth: ChartContent::NoData(msg.into()),
            co2_intensity: ChartContent::NoData(msg.into()),
            emissions: ChartContent::NoData(msg.into()),
            pies: ChartContent::NoData(msg.into()),
            pyramid: ChartContent::NoData(msg.into()),
            heatmap: ChartContent::NoData(msg.into()),
        }
    }

    #[test]
    fn latest_selection_wins_even_if_it_finishes_first() {
        let mut s = Session::new();
        let old = s.select_country("France");
        let new = s.select_country("Germany");
        assert_eq!(s.apply_country(new, placeholder("germany")), 7);
        assert_eq!(s.apply_country(old, placeholder("france")), 0);
        assert_eq!(s.country(), Some("Germany"));
        assert_eq!(s.gdp().and_then(|c| c.message()), Some("germany"));
    }

    #[test]
    fn pie_redraw_invalidates_only_pies() {
        let mut s = Session::new();
        let tickets = s.select_country("Chile");
        let pie_ticket = s.redraw_pies();
        assert_eq!(s.apply_country(tickets, placeholder("first")), 6);
        assert!(s.pies().is_none());
        assert!(s.commit_pies(pie_ticket, ChartContent::Ready(Vec::new())));
        assert!(s.pies().is_some_and(|p| p.is_ready()));
    }
}
