use crate::types::{
    ChangePoint, ChangeRow, CommodityAggregate, CommodityShareRow, DimensionProjection,
    MapCoverageRow, ProjectionRow, RegionAggregate, RegionProfile, RegionRankRow, RegionShare,
    RegionShareRow, YearAggregate, YearTrendRow,
};
use crate::util::format_number;
use indexmap::IndexMap;
use serde::Serialize;
use std::error::Error;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Print the first `max_rows` rows as a Markdown table.
pub fn preview_table<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

fn status(projected: bool) -> String {
    if projected { "Prediksi" } else { "Historis" }.to_string()
}

pub fn region_rank_rows(ranking: &[RegionAggregate]) -> Vec<RegionRankRow> {
    ranking
        .iter()
        .enumerate()
        .map(|(idx, r)| RegionRankRow {
            rank: idx + 1,
            region: r.region_name.clone(),
            total_area: format_number(r.total_area, 1),
        })
        .collect()
}

pub fn commodity_share_rows(distribution: &[CommodityAggregate]) -> Vec<CommodityShareRow> {
    distribution
        .iter()
        .map(|c| CommodityShareRow {
            commodity: c.commodity.clone(),
            total_area: format_number(c.total_area, 1),
            share: format!("{:.1}%", c.share_percent),
        })
        .collect()
}

pub fn region_share_rows(distribution: &[RegionShare]) -> Vec<RegionShareRow> {
    distribution
        .iter()
        .map(|r| RegionShareRow {
            region: r.region_name.clone(),
            total_area: format_number(r.total_area, 1),
            share: format!("{:.1}%", r.share_percent),
        })
        .collect()
}

pub fn year_trend_rows(years: &[YearAggregate]) -> Vec<YearTrendRow> {
    years
        .iter()
        .map(|y| YearTrendRow {
            year: y.year.clone(),
            total_area: format_number(y.total_area, 1),
        })
        .collect()
}

pub fn projection_rows(series: &[DimensionProjection]) -> Vec<ProjectionRow> {
    series
        .iter()
        .map(|p| ProjectionRow {
            year: p.year.clone(),
            label: p.label.clone(),
            total_area: format_number(p.total_area, 1),
            status: status(p.projected),
        })
        .collect()
}

pub fn change_rows(series: &[ChangePoint]) -> Vec<ChangeRow> {
    series
        .iter()
        .map(|c| ChangeRow {
            year: c.year.clone(),
            total_area: format_number(c.total_area, 1),
            change: format_number(c.change, 1),
            change_percent: format!("{:.2}%", c.change_percent),
            status: status(c.projected),
        })
        .collect()
}

pub fn map_coverage_rows(joined: &IndexMap<String, RegionProfile>) -> Vec<MapCoverageRow> {
    joined
        .iter()
        .map(|(geometry_label, profile)| MapCoverageRow {
            geometry_label: geometry_label.clone(),
            region: profile.region_name.clone(),
            total_area: format_number(profile.total_area, 1),
            dominant_commodity: profile.dominant_commodity.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_rank_rows_are_numbered_from_one() {
        let ranking = vec![
            RegionAggregate {
                region_name: "Malang".to_string(),
                total_area: 1234.5,
            },
            RegionAggregate {
                region_name: "Kediri".to_string(),
                total_area: 50.0,
            },
        ];
        let rows = region_rank_rows(&ranking);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].total_area, "1,234.5");
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn projection_rows_tag_predicted_periods() {
        let series = vec![
            DimensionProjection {
                year: "2023".to_string(),
                label: "Malang".to_string(),
                total_area: 100.0,
                projected: false,
            },
            DimensionProjection {
                year: "2024".to_string(),
                label: "Malang".to_string(),
                total_area: 105.0,
                projected: true,
            },
        ];
        let rows = projection_rows(&series);
        assert_eq!(rows[0].status, "Historis");
        assert_eq!(rows[1].status, "Prediksi");
    }
}
