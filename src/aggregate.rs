use crate::types::{
    CommodityAggregate, HarvestRecord, RegionAggregate, RegionProfile, YearAggregate,
};
use indexmap::IndexMap;
use std::cmp::Ordering;

pub fn total_area(records: &[HarvestRecord]) -> f64 {
    records.iter().map(|r| r.area).sum()
}

// Insertion-ordered grouping so that equal totals keep a deterministic,
// first-encounter order through the stable sorts below.
fn sum_by<F>(records: &[HarvestRecord], key: F) -> IndexMap<String, f64>
where
    F: Fn(&HarvestRecord) -> &str,
{
    let mut map: IndexMap<String, f64> = IndexMap::new();
    for r in records {
        *map.entry(key(r).to_string()).or_insert(0.0) += r.area;
    }
    map
}

fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Region totals, descending by area. The first element is the top region.
pub fn by_region(records: &[HarvestRecord]) -> Vec<RegionAggregate> {
    let mut rows: Vec<RegionAggregate> = sum_by(records, |r| &r.region_name)
        .into_iter()
        .map(|(region_name, total_area)| RegionAggregate {
            region_name,
            total_area,
        })
        .collect();
    rows.sort_by(|a, b| desc(a.total_area, b.total_area));
    rows
}

/// Commodity totals with shares of the grand total of the same filtered
/// set, descending by area. The first element is the dominant commodity.
pub fn by_commodity(records: &[HarvestRecord]) -> Vec<CommodityAggregate> {
    let grand_total = total_area(records);
    let mut rows: Vec<CommodityAggregate> = sum_by(records, |r| &r.commodity)
        .into_iter()
        .map(|(commodity, total)| CommodityAggregate {
            commodity,
            total_area: total,
            share_percent: if grand_total > 0.0 {
                total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| desc(a.total_area, b.total_area));
    rows
}

/// Commodity shares in first-encounter order, read as the probability of a
/// random sample of harvested area falling on each commodity.
pub fn commodity_probabilities(records: &[HarvestRecord]) -> Vec<CommodityAggregate> {
    let grand_total = total_area(records);
    sum_by(records, |r| &r.commodity)
        .into_iter()
        .map(|(commodity, total)| CommodityAggregate {
            commodity,
            total_area: total,
            share_percent: if grand_total > 0.0 {
                total / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Year totals, ascending by the year token. Ordering is plain string
/// comparison, which is correct for the fixed-width 4-digit years of the
/// source; non-uniform-width tokens would sort lexicographically.
pub fn by_year(records: &[HarvestRecord]) -> Vec<YearAggregate> {
    let mut rows: Vec<YearAggregate> = sum_by(records, |r| &r.year)
        .into_iter()
        .map(|(year, total_area)| YearAggregate { year, total_area })
        .collect();
    rows.sort_by(|a, b| a.year.cmp(&b.year));
    rows
}

/// Per-region profiles with commodity breakdowns, keyed by region name in
/// first-encounter order. The dominant commodity is the one with the
/// largest summed area; only a strictly greater total replaces it, so
/// ties keep the commodity encountered first.
pub fn region_profiles(records: &[HarvestRecord]) -> IndexMap<String, RegionProfile> {
    let mut map: IndexMap<String, RegionProfile> = IndexMap::new();
    for r in records {
        let profile = map
            .entry(r.region_name.clone())
            .or_insert_with(|| RegionProfile {
                region_name: r.region_name.clone(),
                total_area: 0.0,
                commodity_breakdown: IndexMap::new(),
                dominant_commodity: String::new(),
            });
        profile.total_area += r.area;
        *profile
            .commodity_breakdown
            .entry(r.commodity.clone())
            .or_insert(0.0) += r.area;
    }
    for profile in map.values_mut() {
        let mut max = 0.0;
        let mut dominant = String::new();
        for (commodity, total) in &profile.commodity_breakdown {
            if *total > max {
                max = *total;
                dominant = commodity.clone();
            }
        }
        profile.dominant_commodity = dominant;
    }
    map
}

/// Distinct year tokens in ascending order, for the filter prompt.
pub fn distinct_years(records: &[HarvestRecord]) -> Vec<String> {
    let mut years: Vec<String> = Vec::new();
    for r in records {
        if !years.contains(&r.year) {
            years.push(r.year.clone());
        }
    }
    years.sort();
    years
}
