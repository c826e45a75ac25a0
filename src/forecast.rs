// Trend-adjusted moving-average projection over the year aggregates.
//
// The method is deliberately simple: a 3-period simple moving average with
// a fixed ±5% trend multiplier, plus a "naive compounding projection"
// helper used by the per-dimension series. None of it is statistically
// derived; it mirrors the dashboard's original extrapolation exactly.
use crate::aggregate;
use crate::types::{
    ChangePoint, DimensionProjection, Forecast, HarvestRecord, Trend, YearAggregate,
};
use crate::util::{mean, parse_i64_safe};

/// Project two future periods from the year aggregates.
///
/// Returns `None` when fewer than two historical periods exist, or when
/// the final year token does not parse as an integer (no future labels
/// can be synthesized); consumers render both as "not enough data".
/// Equal consecutive totals classify as a downward trend.
pub fn forecast(year_aggregates: &[YearAggregate]) -> Option<Forecast> {
    if year_aggregates.len() < 2 {
        return None;
    }

    let mut sorted = year_aggregates.to_vec();
    sorted.sort_by(|a, b| a.year.cmp(&b.year));

    let n = sorted.len();
    let window: Vec<f64> = sorted[n.saturating_sub(3)..]
        .iter()
        .map(|y| y.total_area)
        .collect();
    let moving_average = mean(&window);

    let last = &sorted[n - 1];
    let second_last = &sorted[n - 2];
    let trend = if last.total_area > second_last.total_area {
        Trend::Up
    } else {
        Trend::Down
    };
    let change_percent = if second_last.total_area != 0.0 {
        ((last.total_area - second_last.total_area) / second_last.total_area * 100.0).abs()
    } else {
        0.0
    };

    let last_year_num = parse_i64_safe(Some(&last.year))?;
    let factor = trend.factor();
    let projected_period1 = moving_average * factor;
    let projected_period2 = projected_period1 * factor;

    Some(Forecast {
        moving_average,
        trend,
        change_percent,
        last_year: last.year.clone(),
        next_year1: (last_year_num + 1).to_string(),
        next_year2: (last_year_num + 2).to_string(),
        projected_period1,
        projected_period2,
    })
}

/// Naive compounding projection for the per-dimension series: step 0
/// scales the base by ±5%, step 1 and beyond by ±10%, always against the
/// same base value. Independent of the moving-average math above.
pub fn naive_step_projection(base: f64, trend: Trend, step: usize) -> f64 {
    let factor = match (trend, step) {
        (Trend::Up, 0) => 1.05,
        (Trend::Up, _) => 1.10,
        (Trend::Down, 0) => 0.95,
        (Trend::Down, _) => 0.90,
    };
    base * factor
}

/// Top region per historical year, then two projected periods carrying the
/// last top region forward through the naive projection.
pub fn region_productivity_series(
    records: &[HarvestRecord],
    years: &[YearAggregate],
    forecast: &Forecast,
) -> Vec<DimensionProjection> {
    dimension_series(records, years, forecast, |rows| {
        aggregate::by_region(rows)
            .into_iter()
            .next()
            .map(|top| (top.region_name, top.total_area))
    })
}

/// Top commodity per historical year, then two projected periods.
pub fn top_commodity_series(
    records: &[HarvestRecord],
    years: &[YearAggregate],
    forecast: &Forecast,
) -> Vec<DimensionProjection> {
    dimension_series(records, years, forecast, |rows| {
        aggregate::by_commodity(rows)
            .into_iter()
            .next()
            .map(|top| (top.commodity, top.total_area))
    })
}

fn dimension_series<F>(
    records: &[HarvestRecord],
    years: &[YearAggregate],
    forecast: &Forecast,
    top_of: F,
) -> Vec<DimensionProjection>
where
    F: Fn(&[HarvestRecord]) -> Option<(String, f64)>,
{
    let mut series = Vec::new();
    for y in years {
        let year_rows: Vec<HarvestRecord> = records
            .iter()
            .filter(|r| r.year == y.year)
            .cloned()
            .collect();
        if let Some((label, total)) = top_of(&year_rows) {
            series.push(DimensionProjection {
                year: y.year.clone(),
                label,
                total_area: total,
                projected: false,
            });
        }
    }

    if let Some(last) = series.last().cloned() {
        series.push(DimensionProjection {
            year: forecast.next_year1.clone(),
            label: last.label.clone(),
            total_area: naive_step_projection(last.total_area, forecast.trend, 0),
            projected: true,
        });
        series.push(DimensionProjection {
            year: forecast.next_year2.clone(),
            label: last.label,
            total_area: naive_step_projection(last.total_area, forecast.trend, 1),
            projected: true,
        });
    }
    series
}

/// Year-over-year change series: historical deltas, then two projected
/// periods whose change is ±5% of the running total, compounding.
pub fn productivity_change_series(
    years: &[YearAggregate],
    forecast: &Forecast,
) -> Vec<ChangePoint> {
    let mut sorted = years.to_vec();
    sorted.sort_by(|a, b| a.year.cmp(&b.year));

    let mut series = Vec::new();
    for (idx, y) in sorted.iter().enumerate() {
        let (change, change_percent) = match idx.checked_sub(1).map(|i| &sorted[i]) {
            Some(prev) => {
                let change = y.total_area - prev.total_area;
                let pct = if prev.total_area != 0.0 {
                    change / prev.total_area * 100.0
                } else {
                    0.0
                };
                (change, pct)
            }
            None => (0.0, 0.0),
        };
        series.push(ChangePoint {
            year: y.year.clone(),
            total_area: y.total_area,
            change,
            change_percent,
            projected: false,
        });
    }

    let Some(last) = series.last().cloned() else {
        return series;
    };
    let step = match forecast.trend {
        Trend::Up => 0.05,
        Trend::Down => -0.05,
    };
    let change1 = last.total_area * step;
    let total1 = last.total_area + change1;
    let change2 = total1 * step;
    let total2 = total1 + change2;
    series.push(ChangePoint {
        year: forecast.next_year1.clone(),
        total_area: total1,
        change: change1,
        change_percent: if last.total_area != 0.0 {
            change1 / last.total_area * 100.0
        } else {
            0.0
        },
        projected: true,
    });
    series.push(ChangePoint {
        year: forecast.next_year2.clone(),
        total_area: total2,
        change: change2,
        change_percent: if total1 != 0.0 {
            change2 / total1 * 100.0
        } else {
            0.0
        },
        projected: true,
    });
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(token: &str, total: f64) -> YearAggregate {
        YearAggregate {
            year: token.to_string(),
            total_area: total,
        }
    }

    fn record(region: &str, commodity: &str, area: f64, year: &str) -> HarvestRecord {
        HarvestRecord {
            id: format!("{}-{}-{}", region, commodity, year),
            region_name: region.to_string(),
            commodity: commodity.to_string(),
            area,
            year: year.to_string(),
        }
    }

    #[test]
    fn downward_trend_example() {
        let years = vec![year("2023", 100.0), year("2024", 90.0), year("2025", 80.0)];
        let f = forecast(&years).unwrap();
        assert_eq!(f.moving_average, 90.0);
        assert_eq!(f.trend, Trend::Down);
        assert!((f.projected_period1 - 85.5).abs() < 1e-9);
        assert!((f.projected_period2 - 81.225).abs() < 1e-9);
        assert_eq!(f.next_year1, "2026");
        assert_eq!(f.next_year2, "2027");
    }

    #[test]
    fn upward_trend_uses_the_larger_factor() {
        let years = vec![year("2022", 80.0), year("2023", 100.0)];
        let f = forecast(&years).unwrap();
        assert_eq!(f.trend, Trend::Up);
        assert_eq!(f.moving_average, 90.0);
        assert!((f.projected_period1 - 94.5).abs() < 1e-9);
        assert!((f.change_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn equal_consecutive_totals_classify_as_down() {
        let years = vec![year("2022", 90.0), year("2023", 90.0)];
        let f = forecast(&years).unwrap();
        assert_eq!(f.trend, Trend::Down);
    }

    #[test]
    fn window_is_capped_at_three_periods() {
        let years = vec![
            year("2020", 1000.0),
            year("2021", 10.0),
            year("2022", 20.0),
            year("2023", 30.0),
        ];
        let f = forecast(&years).unwrap();
        assert_eq!(f.moving_average, 20.0);
    }

    #[test]
    fn unsorted_input_is_reordered_chronologically() {
        let years = vec![year("2025", 80.0), year("2023", 100.0), year("2024", 90.0)];
        let f = forecast(&years).unwrap();
        assert_eq!(f.last_year, "2025");
        assert_eq!(f.trend, Trend::Down);
    }

    #[test]
    fn insufficient_history_is_absent() {
        assert!(forecast(&[]).is_none());
        assert!(forecast(&[year("2023", 100.0)]).is_none());
    }

    #[test]
    fn non_numeric_final_year_is_absent() {
        let years = vec![year("2022", 90.0), year("unknown", 80.0)];
        assert!(forecast(&years).is_none());
    }

    #[test]
    fn naive_projection_steps() {
        assert!((naive_step_projection(100.0, Trend::Up, 0) - 105.0).abs() < 1e-9);
        assert!((naive_step_projection(100.0, Trend::Up, 1) - 110.0).abs() < 1e-9);
        assert!((naive_step_projection(100.0, Trend::Down, 0) - 95.0).abs() < 1e-9);
        assert!((naive_step_projection(100.0, Trend::Down, 1) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn region_series_carries_last_top_region_forward() {
        let records = vec![
            record("Malang", "PADI", 100.0, "2022"),
            record("Kediri", "PADI", 40.0, "2022"),
            record("Kediri", "PADI", 120.0, "2023"),
            record("Malang", "PADI", 90.0, "2023"),
        ];
        let years = aggregate::by_year(&records);
        let f = forecast(&years).unwrap();
        let series = region_productivity_series(&records, &years, &f);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].label, "Malang");
        assert_eq!(series[1].label, "Kediri");
        let projected: Vec<&DimensionProjection> =
            series.iter().filter(|p| p.projected).collect();
        assert_eq!(projected.len(), 2);
        assert_eq!(projected[0].label, "Kediri");
        // 2023 total 210 > 2022 total 140, so the trend is up.
        assert!((projected[0].total_area - 120.0 * 1.05).abs() < 1e-9);
        assert!((projected[1].total_area - 120.0 * 1.10).abs() < 1e-9);
        assert_eq!(projected[0].year, "2024");
        assert_eq!(projected[1].year, "2025");
    }

    #[test]
    fn change_series_compounds_projected_steps() {
        let years = vec![year("2022", 100.0), year("2023", 110.0)];
        let f = forecast(&years).unwrap();
        let series = productivity_change_series(&years, &f);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].change, 0.0);
        assert!((series[1].change - 10.0).abs() < 1e-9);
        assert!((series[1].change_percent - 10.0).abs() < 1e-9);
        assert!((series[2].total_area - 115.5).abs() < 1e-9);
        assert!((series[2].change_percent - 5.0).abs() < 1e-9);
        assert!((series[3].total_area - 121.275).abs() < 1e-9);
        assert!(series[2].projected && series[3].projected);
    }
}
