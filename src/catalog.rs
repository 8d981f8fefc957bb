//! Indicator file layout: `<category>/<Indicator description>.csv`.
//!
//! The defaults match the WDI extract shipped with the dashboard. A JSON file
//! with any subset of the fields overrides them.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Age brackets of the population pyramid, youngest first.
pub const AGE_GROUPS: [&str; 17] = [
    "00-04", "05-09", "10-14", "15-19", "20-24", "25-29", "30-34", "35-39", "40-44", "45-49",
    "50-54", "55-59", "60-64", "65-69", "70-74", "75-79", "80+",
];

/// Token used for an age bracket inside file names.
pub fn age_group_token(bracket: &str) -> &str {
    if bracket == "80+" { "80_and_above" } else { bracket }
}

/// Greenhouse gas of an emission table.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gas {
    CO2,
    N2O,
    CH4,
}

impl Gas {
    pub const ALL: [Gas; 3] = [Gas::CO2, Gas::N2O, Gas::CH4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gas::CO2 => "CO2",
            Gas::N2O => "N2O",
            Gas::CH4 => "CH4",
        }
    }
}

impl fmt::Display for Gas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gas {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CO2" => Ok(Gas::CO2),
            "N2O" => Ok(Gas::N2O),
            "CH4" => Ok(Gas::CH4),
            other => bail!("unknown gas {other:?}, expected CO2, N2O or CH4"),
        }
    }
}

/// Energy sector of an emission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    IndustrialCombustion,
    Transport,
    PowerIndustry,
    Building,
}

impl Sector {
    pub const ALL: [Sector; 4] = [
        Sector::IndustrialCombustion,
        Sector::Transport,
        Sector::PowerIndustry,
        Sector::Building,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Sector::IndustrialCombustion => "Industrial Combustion",
            Sector::Transport => "Transport",
            Sector::PowerIndustry => "Power Industry",
            Sector::Building => "Building",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Pair of indicators plotted against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScatterSection {
    /// GDP (current US$) against GDP growth.
    Economy,
    /// Crop production index against food production index.
    Agriculture,
}

/// Locations of every indicator table the dashboard reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub gdp_current: String,
    pub gdp_growth: String,
    pub co2_intensity: String,
    pub crop_index: String,
    pub food_index: String,
    pub total_population: String,
    /// `{gas}` and `{sector}` are substituted.
    pub emission_pattern: String,
    /// `{bracket}` and `{gender}` are substituted.
    pub age_group_pattern: String,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            gdp_current: "Economy/Economy_GDP (current US$).csv".into(),
            gdp_growth: "Economy/Economy_GDP growth (annual _).csv".into(),
            co2_intensity: "Environment/Urban_developement_Carbon_intensity_of_GDP_(kg_CO2e_per_constant_2015_US$_of_GDP).csv".into(),
            crop_index: "Agriculture/Agriculture and Rural development_Crop production index (2014-2016 = 100).csv".into(),
            food_index: "Agriculture/Agriculture and Rural development_Food production index (2014-2016 = 100).csv".into(),
            total_population: "Health/total_population.csv".into(),
            emission_pattern: "Environment/Urban developement ({gas}) emissions from {sector} (Energy) (Mt CO2e).csv".into(),
            age_group_pattern: "Health/Health_Population_ages_{bracket}_{gender}_of_{gender}_population.csv".into(),
        }
    }
}

impl Catalog {
    /// Load overrides from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading catalog {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing catalog {}", path.display()))
    }

    pub fn emission_file(&self, gas: Gas, sector: Sector) -> String {
        self.emission_pattern
            .replace("{gas}", gas.as_str())
            .replace("{sector}", sector.label())
    }

    pub fn age_group_file(&self, bracket: &str, gender: Gender) -> String {
        self.age_group_pattern
            .replace("{bracket}", age_group_token(bracket))
            .replace("{gender}", gender.as_str())
    }

    /// `(x, y)` locators and axis labels of a scatter section.
    pub fn scatter_pair(&self, section: ScatterSection) -> ((&str, &str), (&str, &str)) {
        match section {
            ScatterSection::Economy => (
                (self.gdp_current.as_str(), "GDP (current US$)"),
                (self.gdp_growth.as_str(), "GDP growth (%)"),
            ),
            ScatterSection::Agriculture => (
                (self.crop_index.as_str(), "Crop production"),
                (self.food_index.as_str(), "Food production"),
            ),
        }
    }

    /// Locator for a short indicator alias used on the command line.
    pub fn indicator(&self, alias: &str) -> Option<&str> {
        match alias {
            "gdp" => Some(self.gdp_current.as_str()),
            "gdp-growth" => Some(self.gdp_growth.as_str()),
            "co2-intensity" => Some(self.co2_intensity.as_str()),
            "crop" => Some(self.crop_index.as_str()),
            "food" => Some(self.food_index.as_str()),
            "population" => Some(self.total_population.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_files_follow_naming_convention() {
        let c = Catalog::default();
        assert_eq!(
            c.age_group_file("80+", Gender::Male),
            "Health/Health_Population_ages_80_and_above_male_of_male_population.csv"
        );
        assert_eq!(
            c.age_group_file("05-09", Gender::Female),
            "Health/Health_Population_ages_05-09_female_of_female_population.csv"
        );
    }

    #[test]
    fn emission_file_substitutes_gas_and_sector() {
        let c = Catalog::default();
        assert_eq!(
            c.emission_file(Gas::N2O, Sector::PowerIndustry),
            "Environment/Urban developement (N2O) emissions from Power Industry (Energy) (Mt CO2e).csv"
        );
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c: Catalog = serde_json::from_str(r#"{"gdp_current":"gdp.csv"}"#).unwrap();
        assert_eq!(c.gdp_current, "gdp.csv");
        assert_eq!(c.total_population, Catalog::default().total_population);
    }

    #[test]
    fn gas_parses_case_insensitively() {
        assert_eq!("ch4".parse::<Gas>().unwrap(), Gas::CH4);
        assert!("SO2".parse::<Gas>().is_err());
    }
}
