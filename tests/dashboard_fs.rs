//! Chart builders over a fixture data directory.

mod common;

use std::path::Path;
use tempfile::{TempDir, tempdir};
use wdi_dash::catalog::{AGE_GROUPS, Gas, Gender, ScatterSection, Sector};
use wdi_dash::{Catalog, ChartContent, Dashboard, FsSource, KeyColumn, Session};

const YEARS: [i32; 4] = [2000, 2001, 2002, 2003];

fn fixture() -> TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    let c = Catalog::default();

    // GDP grows by 10% a year for Germany
    common::write(
        root,
        &c.gdp_current,
        &common::wdi_csv(
            &YEARS,
            &[
                ("Germany", "DEU", ["100", "110", "121", "133.1"]),
                ("France", "FRA", ["1000", "", "1100", "1200"]),
                ("Nowhere", "NWH", ["0", "0", "0", "0"]),
            ],
        ),
    );
    common::write(
        root,
        &c.gdp_growth,
        &common::wdi_csv(
            &YEARS,
            &[
                ("France", "FRA", ["1", "2", "3", "4"]),
                ("Germany", "DEU", ["3", "-1.5", "", "2"]),
                ("Nowhere", "NWH", ["1", "1", "1", "1"]),
            ],
        ),
    );
    common::write(
        root,
        &c.total_population,
        &common::wdi_csv(
            &YEARS,
            &[
                ("Germany", "DEU", ["80", "81", "82", "83"]),
                ("France", "FRA", ["60", "61", "62", ""]),
                ("Nowhere", "NWH", ["0", "0", "0", "0"]),
            ],
        ),
    );
    for locator in [&c.crop_index, &c.food_index] {
        common::write(
            root,
            locator,
            &common::wdi_csv(&YEARS, &[("Germany", "DEU", ["90", "95", "100", "105"])]),
        );
    }

    for gas in Gas::ALL {
        for (i, sector) in Sector::ALL.iter().enumerate() {
            let base = (i + 1) as f64 * if gas == Gas::CO2 { 10.0 } else { 1.0 };
            let cells: Vec<String> = (0..YEARS.len()).map(|k| (base + k as f64).to_string()).collect();
            let germany = [cells[0].as_str(), cells[1].as_str(), cells[2].as_str(), cells[3].as_str()];
            // Transport has no row for Germany
            let rows: Vec<(&str, &str, [&str; 4])> = if *sector == Sector::Transport {
                vec![("France", "FRA", ["1", "1", "1", "1"])]
            } else {
                vec![("Germany", "DEU", germany)]
            };
            common::write(root, &c.emission_file(gas, *sector), &common::wdi_csv(&YEARS, &rows));
        }
    }

    for (i, bracket) in AGE_GROUPS.iter().enumerate() {
        let m = format!("{}", i + 1);
        let f = format!("{}", i + 3);
        let male = [m.as_str(), m.as_str(), m.as_str(), ""];
        let female = [f.as_str(), f.as_str(), f.as_str(), f.as_str()];
        common::write(
            root,
            &c.age_group_file(bracket, Gender::Male),
            &common::wdi_csv(&YEARS, &[("Germany", "DEU", male), ("France", "FRA", male)]),
        );
        // female files list countries in a different order
        common::write(
            root,
            &c.age_group_file(bracket, Gender::Female),
            &common::wdi_csv(&YEARS, &[("France", "FRA", female), ("Germany", "DEU", female)]),
        );
    }
    dir
}

fn dashboard(root: &Path) -> Dashboard<FsSource> {
    Dashboard::new(FsSource::new(root), Catalog::default())
}

#[test]
fn gdp_trend_fits_growth_curve() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.trend(&dash.catalog().gdp_current.clone(), "GDP", "Germany");
    let chart = chart.ready().expect("gdp chart");
    assert_eq!(chart.series.len(), 4);
    assert_eq!(chart.summary.max, Some(133.1));
    assert_eq!(chart.y_domain, (0.0, 133.1));
    let trend = chart.trend.expect("trend");
    assert!((trend.b - 1.1f64.ln()).abs() < 1e-9);
    assert_eq!(chart.trend_curve.len(), 4);
    assert!((chart.trend_curve[0].value - 100.0).abs() < 1e-6);
}

#[test]
fn gdp_growth_keeps_negative_years() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.rate(&dash.catalog().gdp_growth.clone(), "GDP growth", "Germany");
    let chart = chart.ready().expect("growth chart");
    let years: Vec<i32> = chart.series.iter().map(|p| p.year).collect();
    assert_eq!(years, vec![2000, 2001, 2003]);
    assert_eq!(chart.series.value_at(2001), Some(-1.5));
    assert_eq!(chart.y_domain, (-1.5, 3.0));
    assert!(chart.trend.is_none());
    assert!(chart.trend_curve.is_empty());
}

#[test]
fn missing_file_degrades_only_its_chart() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let co2 = dash.trend(&dash.catalog().co2_intensity.clone(), "CO2 intensity", "Germany");
    assert_eq!(co2.message(), Some("Failed to load CO2 intensity data."));
    assert!(dash.trend(&dash.catalog().gdp_current.clone(), "GDP", "Germany").is_ready());
}

#[test]
fn unknown_country_is_no_data() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.trend(&dash.catalog().gdp_current.clone(), "GDP", "Atlantis");
    assert!(matches!(chart, ChartContent::NoData(_)));
}

#[test]
fn emissions_align_available_sectors() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.emissions("Germany", Gas::CO2);
    let chart = chart.ready().expect("emission chart");
    assert_eq!(chart.records.len(), 4);
    assert_eq!(chart.series.len(), 4);
    let first = &chart.records[0];
    assert_eq!(first.get("Industrial Combustion"), Some(10.0));
    assert_eq!(first.get("Transport"), None);
    // Building is sector 4 -> base 40, last year 43
    assert_eq!(chart.y_max, 43.0);
}

#[test]
fn pies_count_missing_as_zero() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let pies = dash.emission_pies("Germany", 2001);
    let pies = pies.ready().expect("pies");
    assert_eq!(pies.len(), 4);
    let transport = pies.iter().find(|p| p.sector == "Transport").unwrap();
    assert!(transport.slices.iter().all(|s| s.value == 0.0));
    let industry = &pies[0];
    let cats: Vec<&str> = industry.slices.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(cats, vec!["CO2", "N2O", "CH4"]);
    assert_eq!(industry.slices[0].value, 11.0);
    assert_eq!(industry.slices[1].value, 2.0);
}

#[test]
fn pyramid_reads_both_genders() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.pyramid("Germany", 2000);
    let chart = chart.ready().expect("pyramid");
    assert_eq!(chart.bars.len(), AGE_GROUPS.len());
    assert_eq!(chart.bars[0].age_group, "00-04");
    assert_eq!(chart.bars[0].male, 1.0);
    assert_eq!(chart.bars[0].female, 3.0);
    assert_eq!(chart.bars[16].age_group, "80+");

    // male cells are empty in 2003
    assert!(!dash.pyramid("Germany", 2003).is_ready());
}

#[test]
fn heatmap_averages_by_country_code() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.heatmap("Germany");
    let chart = chart.ready().expect("heatmap");
    // male cells are empty in 2003, so the combined row keeps the empty cell
    assert_eq!(chart.years, vec![2000, 2001, 2002]);
    assert_eq!(chart.age_groups.len(), AGE_GROUPS.len());
    let cell = chart
        .cells
        .iter()
        .find(|c| c.year == 2000 && c.age_group == "00-04")
        .unwrap();
    assert_eq!(cell.value, 2.0);
    assert!(!chart.cells.iter().any(|c| c.year == 2003));
    assert_eq!(chart.extent, (2.0, 18.0));
}

#[test]
fn scatter_joins_by_code_and_drops_non_positive_x() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.scatter(ScatterSection::Economy, 2000);
    let chart = chart.ready().expect("scatter");
    let codes: Vec<&str> = chart.points.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes, vec!["DEU", "FRA"]);
    let germany = &chart.points[0];
    assert_eq!((germany.x, germany.y), (100.0, 3.0));
    // y = -2 * log10(x) + 7 through (100, 3) and (1000, 1)
    let m = chart.regression.expect("regression");
    assert!((m.slope + 2.0).abs() < 1e-9);
    assert!((m.intercept - 7.0).abs() < 1e-9);
    let trend = chart.trend.unwrap();
    assert_eq!(trend[0].0, 100.0);
    assert!((trend[1].1 - 1.0).abs() < 1e-9);
}

#[test]
fn scatter_with_one_point_has_no_trend() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    // France has no GDP in 2001
    let chart = dash.scatter(ScatterSection::Economy, 2001);
    let chart = chart.ready().unwrap();
    assert_eq!(chart.points.len(), 1);
    assert!(chart.regression.is_none());
    assert!(chart.trend.is_none());
}

#[test]
fn packing_keeps_positive_populations() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let chart = dash.packing(2003);
    let chart = chart.ready().unwrap();
    assert_eq!(chart.nodes.len(), 1);
    assert_eq!(chart.nodes[0].code, "DEU");
    assert_eq!(chart.max, 83.0);
}

#[test]
fn radar_normalizes_two_countries() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let axes = dash.default_radar_axes();
    let chart = dash.radar(&["Germany", "France"], &axes, 2000);
    let chart = chart.ready().expect("radar");
    assert_eq!(chart.axes, vec!["GDP", "Population", "Crop production", "Food production"]);
    // shared max is France GDP = 1000
    assert_eq!(chart.frames[1].values[0].value, 1.0);
    assert!((chart.frames[0].values[0].value - 0.1).abs() < 1e-12);
    assert!((chart.frames[0].values[2].value - 0.09).abs() < 1e-12);
    assert_eq!(chart.frames[1].values[2].value, 0.0);
}

#[test]
fn tables_are_fetched_once_per_view() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let _ = dash.pyramid("Germany", 2000);
    assert_eq!(dash.cache().len(), 34);
    let _ = dash.heatmap("France");
    assert_eq!(dash.cache().len(), 34);
}

#[test]
fn lookup_by_code() {
    let dir = fixture();
    let dash = dashboard(dir.path()).with_key_column(KeyColumn::CountryCode);
    assert!(dash.emissions("DEU", Gas::CH4).is_ready());
    assert!(!dash.emissions("Germany", Gas::CH4).is_ready());
}

#[test]
fn session_keeps_latest_country() {
    let dir = fixture();
    let dash = dashboard(dir.path());
    let mut session = Session::new();
    let first = session.select_country("France");
    let second = session.select_country("Germany");
    let germany = dash.country_charts("Germany", Gas::CO2, 2000);
    let france = dash.country_charts("France", Gas::CO2, 2000);
    assert!(germany.gdp_growth.is_ready());
    assert_eq!(session.apply_country(second, germany), 7);
    assert_eq!(session.apply_country(first, france), 0);
    let gdp = session.gdp().and_then(|c| c.ready()).unwrap();
    assert_eq!(gdp.entity, "Germany");
    let growth = session.gdp_growth().and_then(|c| c.ready()).unwrap();
    assert_eq!(growth.summary.min, Some(-1.5));
}
