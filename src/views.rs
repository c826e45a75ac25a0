use crate::aggregate;
use crate::filter::filter_records;
use crate::forecast;
use crate::reconcile::{self, SubstringMatcher};
use crate::types::{
    ChangePoint, CommodityAggregate, DimensionProjection, FeatureCollection, FilterSelection,
    Forecast, HarvestRecord, RegionAggregate, RegionProfile, RegionShare, YearAggregate,
};
use indexmap::IndexMap;

/// Everything the dashboard view renders for one filter selection.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub total_area: f64,
    pub top_region: Option<RegionAggregate>,
    pub top_commodity: Option<CommodityAggregate>,
    pub region_ranking: Vec<RegionAggregate>,
    pub commodity_distribution: Vec<CommodityAggregate>,
}

pub fn compute_dashboard(
    records: &[HarvestRecord],
    selection: &FilterSelection,
) -> DashboardView {
    let filtered = filter_records(records, selection);
    let region_ranking = aggregate::by_region(&filtered);
    let commodity_distribution = aggregate::by_commodity(&filtered);
    DashboardView {
        total_area: aggregate::total_area(&filtered),
        top_region: region_ranking.first().cloned(),
        top_commodity: commodity_distribution.first().cloned(),
        region_ranking,
        commodity_distribution,
    }
}

/// The three forecast-flavored series of the insight view.
#[derive(Debug, Clone)]
pub struct DetailedForecasts {
    pub region_productivity: Vec<DimensionProjection>,
    pub top_commodity: Vec<DimensionProjection>,
    pub productivity_change: Vec<ChangePoint>,
}

/// Distributions, probabilities and projections over the full dataset.
#[derive(Debug, Clone)]
pub struct InsightView {
    pub commodity_distribution: Vec<CommodityAggregate>,
    /// Top 10 regions by total area, with shares of the grand total.
    pub region_distribution: Vec<RegionShare>,
    pub year_distribution: Vec<YearAggregate>,
    pub commodity_probabilities: Vec<CommodityAggregate>,
    pub forecast: Option<Forecast>,
    pub detailed: Option<DetailedForecasts>,
}

pub fn compute_insights(records: &[HarvestRecord]) -> InsightView {
    let grand_total = aggregate::total_area(records);
    let region_distribution: Vec<RegionShare> = aggregate::by_region(records)
        .into_iter()
        .take(10)
        .map(|r| RegionShare {
            share_percent: if grand_total > 0.0 {
                r.total_area / grand_total * 100.0
            } else {
                0.0
            },
            region_name: r.region_name,
            total_area: r.total_area,
        })
        .collect();

    let year_distribution = aggregate::by_year(records);
    let forecast_result = forecast::forecast(&year_distribution);
    let detailed = forecast_result.as_ref().map(|f| DetailedForecasts {
        region_productivity: forecast::region_productivity_series(records, &year_distribution, f),
        top_commodity: forecast::top_commodity_series(records, &year_distribution, f),
        productivity_change: forecast::productivity_change_series(&year_distribution, f),
    });

    InsightView {
        commodity_distribution: aggregate::by_commodity(records),
        region_distribution,
        year_distribution,
        commodity_probabilities: aggregate::commodity_probabilities(records),
        forecast: forecast_result,
        detailed,
    }
}

/// Region aggregates keyed by geometry label, joined via the reconciler.
/// Geometry labels without a reconciled fact label are absent; consumers
/// render those as "no data".
pub fn compute_map_view(
    records: &[HarvestRecord],
    selection: &FilterSelection,
    geometry: &FeatureCollection,
) -> IndexMap<String, RegionProfile> {
    let filtered = filter_records(records, selection);
    let profiles = aggregate::region_profiles(&filtered);
    let fact_labels: Vec<String> = profiles.keys().cloned().collect();
    let geometry_labels: Vec<String> = geometry
        .features
        .iter()
        .map(|f| f.region_label().to_string())
        .collect();
    let mapping = reconcile::build_mapping(&geometry_labels, &fact_labels, &SubstringMatcher);

    let mut joined = IndexMap::new();
    for (geometry_label, fact_label) in mapping {
        if let Some(profile) = profiles.get(&fact_label) {
            joined.insert(geometry_label, profile.clone());
        }
    }
    joined
}
