use crate::types::{FilterSelection, HarvestRecord};

/// Narrow the record set by year and/or commodity. Pure and stable: the
/// relative order of the input is preserved, and an empty input yields an
/// empty output.
pub fn filter_records(records: &[HarvestRecord], selection: &FilterSelection) -> Vec<HarvestRecord> {
    records
        .iter()
        .filter(|r| selection.year.matches(&r.year) && selection.commodity.matches(&r.commodity))
        .cloned()
        .collect()
}
