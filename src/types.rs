use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One harvest observation from the tabular source. Immutable once parsed;
/// the full in-memory set is the fact table every report derives from.
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestRecord {
    pub id: String,
    pub region_name: String,
    pub commodity: String,
    pub area: f64,
    pub year: String,
}

/// One dimension of the report filter: everything, or a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Only(String),
}

impl Selection {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(token) => token == value,
        }
    }

    /// Parse user input; `"ALL"` (any case) or blank means no restriction.
    pub fn parse(input: &str) -> Selection {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub year: Selection,
    pub commodity: Selection,
}

impl FilterSelection {
    pub fn all() -> FilterSelection {
        FilterSelection {
            year: Selection::All,
            commodity: Selection::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionAggregate {
    pub region_name: String,
    pub total_area: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommodityAggregate {
    pub commodity: String,
    pub total_area: f64,
    /// Share of the grand total of the same filtered set, in percent.
    /// Zero when the grand total is zero.
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearAggregate {
    pub year: String,
    pub total_area: f64,
}

/// Region total plus its per-commodity breakdown, as joined onto the map.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionProfile {
    pub region_name: String,
    pub total_area: f64,
    pub commodity_breakdown: IndexMap<String, f64>,
    /// Commodity with the largest summed area; ties keep the first
    /// commodity encountered. Empty when no commodity has a positive total.
    pub dominant_commodity: String,
}

/// Region share of the grand total, used by the top-10 insight ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShare {
    pub region_name: String,
    pub total_area: f64,
    pub share_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Multiplier applied per projected period by the primary forecast.
    pub fn factor(self) -> f64 {
        match self {
            Trend::Up => 1.05,
            Trend::Down => 0.95,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::Up => "naik",
            Trend::Down => "turun",
        }
    }
}

/// Two-period projection derived from the year aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub moving_average: f64,
    pub trend: Trend,
    /// Absolute percent change between the last two historical periods.
    pub change_percent: f64,
    pub last_year: String,
    pub next_year1: String,
    pub next_year2: String,
    pub projected_period1: f64,
    pub projected_period2: f64,
}

/// One point of a per-dimension projection series (top region or top
/// commodity per year, historical and projected).
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionProjection {
    pub year: String,
    pub label: String,
    pub total_area: f64,
    pub projected: bool,
}

/// One point of the year-over-year productivity change series.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangePoint {
    pub year: String,
    pub total_area: f64,
    pub change: f64,
    pub change_percent: f64,
    pub projected: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

/// A geographic feature. The pipeline only joins on labels, so the
/// geometry itself is carried opaquely.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub properties: Option<FeatureProperties>,
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    #[serde(rename = "NAME_1")]
    pub name_1: Option<String>,
    #[serde(rename = "NAME_2")]
    pub name_2: Option<String>,
    pub name: Option<String>,
}

impl Feature {
    /// Sub-region label used for the join: `NAME_2`, falling back to `name`.
    pub fn region_label(&self) -> &str {
        match &self.properties {
            Some(props) => props
                .name_2
                .as_deref()
                .or(props.name.as_deref())
                .unwrap_or(""),
            None => "",
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionRankRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "KabupatenKota")]
    #[tabled(rename = "KabupatenKota")]
    pub region: String,
    #[serde(rename = "LuasPanenHa")]
    #[tabled(rename = "LuasPanenHa")]
    pub total_area: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CommodityShareRow {
    #[serde(rename = "Komoditas")]
    #[tabled(rename = "Komoditas")]
    pub commodity: String,
    #[serde(rename = "LuasPanenHa")]
    #[tabled(rename = "LuasPanenHa")]
    pub total_area: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionShareRow {
    #[serde(rename = "KabupatenKota")]
    #[tabled(rename = "KabupatenKota")]
    pub region: String,
    #[serde(rename = "LuasPanenHa")]
    #[tabled(rename = "LuasPanenHa")]
    pub total_area: String,
    #[serde(rename = "SharePct")]
    #[tabled(rename = "SharePct")]
    pub share: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct YearTrendRow {
    #[serde(rename = "Tahun")]
    #[tabled(rename = "Tahun")]
    pub year: String,
    #[serde(rename = "LuasPanenHa")]
    #[tabled(rename = "LuasPanenHa")]
    pub total_area: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProjectionRow {
    #[serde(rename = "Tahun")]
    #[tabled(rename = "Tahun")]
    pub year: String,
    #[serde(rename = "Nama")]
    #[tabled(rename = "Nama")]
    pub label: String,
    #[serde(rename = "LuasPanenHa")]
    #[tabled(rename = "LuasPanenHa")]
    pub total_area: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ChangeRow {
    #[serde(rename = "Tahun")]
    #[tabled(rename = "Tahun")]
    pub year: String,
    #[serde(rename = "LuasPanenHa")]
    #[tabled(rename = "LuasPanenHa")]
    pub total_area: String,
    #[serde(rename = "Perubahan")]
    #[tabled(rename = "Perubahan")]
    pub change: String,
    #[serde(rename = "PerubahanPct")]
    #[tabled(rename = "PerubahanPct")]
    pub change_percent: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MapCoverageRow {
    #[serde(rename = "WilayahGeo")]
    #[tabled(rename = "WilayahGeo")]
    pub geometry_label: String,
    #[serde(rename = "WilayahData")]
    #[tabled(rename = "WilayahData")]
    pub region: String,
    #[serde(rename = "LuasPanenHa")]
    #[tabled(rename = "LuasPanenHa")]
    pub total_area: String,
    #[serde(rename = "KomoditasDominan")]
    #[tabled(rename = "KomoditasDominan")]
    pub dominant_commodity: String,
}

/// JSON summary written next to the insight report.
#[derive(Debug, Serialize)]
pub struct InsightSummary {
    pub total_records: usize,
    pub total_area: f64,
    pub regions: usize,
    pub commodities: usize,
    pub years: usize,
    pub trend: Option<String>,
    pub projected_period1: Option<f64>,
    pub projected_period2: Option<f64>,
}
