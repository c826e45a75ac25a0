use crate::types::{FeatureCollection, HarvestRecord};
use crate::util::parse_f64_safe;
use csv::ReaderBuilder;
use thiserror::Error;
use uuid::Uuid;

/// Top-level region constant the geometry source is filtered to.
pub const PROVINCE_NAME: &str = "JawaTimur";

pub const COL_REGION: &str = "nama_kabupaten_kota";
pub const COL_CATEGORY: &str = "kategori";
pub const COL_QUANTITY: &str = "jumlah";
pub const COL_YEAR: &str = "tahun";
pub const COL_ID: &str = "id";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("empty or invalid source")]
    EmptySource,
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("malformed tabular source: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed geometry source: {0}")]
    Json(#[from] serde_json::Error),
}

/// Diagnostics collected during a parse, printed after loading.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub coerced_areas: usize,
    pub generated_ids: usize,
}

/// Parse the raw tabular source into harvest records.
///
/// Column order is not assumed; the four required columns are located by
/// name in the header, plus the optional `id` column. Individually
/// malformed quantity fields coerce to `0.0` and short rows read as empty
/// fields; only a structurally broken source fails the whole parse.
/// Quoted fields are handled by the `csv` reader, an upgrade over the
/// plain comma split of the original exporter.
pub fn parse_records(text: &str) -> Result<(Vec<HarvestRecord>, LoadReport), LoadError> {
    // Header plus at least one data row required.
    let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
    if non_blank < 2 {
        return Err(LoadError::EmptySource);
    }

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = rdr.headers()?.clone();
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);

    let idx_region = position(COL_REGION).ok_or(LoadError::MissingColumn(COL_REGION))?;
    let idx_category = position(COL_CATEGORY).ok_or(LoadError::MissingColumn(COL_CATEGORY))?;
    let idx_quantity = position(COL_QUANTITY).ok_or(LoadError::MissingColumn(COL_QUANTITY))?;
    let idx_year = position(COL_YEAR).ok_or(LoadError::MissingColumn(COL_YEAR))?;
    let idx_id = position(COL_ID);

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.records() {
        let row = result?;
        report.total_rows += 1;

        let field = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();
        let area = match parse_f64_safe(row.get(idx_quantity)) {
            Some(v) => v,
            None => {
                report.coerced_areas += 1;
                0.0
            }
        };
        let id = match idx_id {
            Some(idx) => field(idx),
            None => {
                report.generated_ids += 1;
                Uuid::new_v4().to_string()
            }
        };

        records.push(HarvestRecord {
            id,
            region_name: field(idx_region),
            commodity: field(idx_category),
            area,
            year: field(idx_year),
        });
    }

    Ok((records, report))
}

pub fn load_records(path: &str) -> Result<(Vec<HarvestRecord>, LoadReport), LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_records(&text)
}

/// Parse the geometry source, keeping only features of the province this
/// pipeline covers (`NAME_1` equal to [`PROVINCE_NAME`]).
pub fn parse_geometry(text: &str) -> Result<FeatureCollection, LoadError> {
    let raw: FeatureCollection = serde_json::from_str(text)?;
    let features = raw
        .features
        .into_iter()
        .filter(|f| {
            f.properties
                .as_ref()
                .and_then(|p| p.name_1.as_deref())
                == Some(PROVINCE_NAME)
        })
        .collect();
    Ok(FeatureCollection { features })
}

pub fn load_geometry(path: &str) -> Result<FeatureCollection, LoadError> {
    let text = std::fs::read_to_string(path)?;
    parse_geometry(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "id,nama_kabupaten_kota,kategori,jumlah,tahun\n1,Malang,PADI,100,2023";

    #[test]
    fn minimal_source_round_trips() {
        let (records, report) = parse_records(MINIMAL).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "1");
        assert_eq!(r.region_name, "Malang");
        assert_eq!(r.commodity, "PADI");
        assert_eq!(r.area, 100.0);
        assert_eq!(r.year, "2023");
        assert_eq!(report.total_rows, 1);
        assert_eq!(report.coerced_areas, 0);
        assert_eq!(report.generated_ids, 0);
    }

    #[test]
    fn column_order_does_not_matter() {
        let text = "tahun,jumlah,kategori,nama_kabupaten_kota\n2022,50,JAGUNG,Kediri";
        let (records, _) = parse_records(text).unwrap();
        assert_eq!(records[0].region_name, "Kediri");
        assert_eq!(records[0].commodity, "JAGUNG");
        assert_eq!(records[0].area, 50.0);
        assert_eq!(records[0].year, "2022");
    }

    #[test]
    fn header_only_source_is_rejected() {
        let err = parse_records("id,nama_kabupaten_kota,kategori,jumlah,tahun").unwrap_err();
        assert!(matches!(err, LoadError::EmptySource));
    }

    #[test]
    fn blank_source_is_rejected() {
        assert!(matches!(parse_records(""), Err(LoadError::EmptySource)));
        assert!(matches!(parse_records("\n\n  \n"), Err(LoadError::EmptySource)));
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let text = "id,nama_kabupaten_kota,kategori,tahun\n1,Malang,PADI,2023";
        match parse_records(text) {
            Err(LoadError::MissingColumn(col)) => assert_eq!(col, COL_QUANTITY),
            other => panic!("expected missing-column error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_quantity_coerces_to_zero() {
        let text = "id,nama_kabupaten_kota,kategori,jumlah,tahun\n1,Malang,PADI,abc,2023";
        let (records, report) = parse_records(text).unwrap();
        assert_eq!(records[0].area, 0.0);
        assert_eq!(report.coerced_areas, 1);
    }

    #[test]
    fn short_rows_read_as_empty_fields() {
        let text = "id,nama_kabupaten_kota,kategori,jumlah,tahun\n1,Malang";
        let (records, report) = parse_records(text).unwrap();
        assert_eq!(records[0].region_name, "Malang");
        assert_eq!(records[0].commodity, "");
        assert_eq!(records[0].area, 0.0);
        assert_eq!(records[0].year, "");
        assert_eq!(report.coerced_areas, 1);
    }

    #[test]
    fn quoted_fields_are_read_whole() {
        let text = "id,nama_kabupaten_kota,kategori,jumlah,tahun\n1,\"Malang, Kota\",PADI,100,2023";
        let (records, _) = parse_records(text).unwrap();
        assert_eq!(records[0].region_name, "Malang, Kota");
        assert_eq!(records[0].area, 100.0);
    }

    #[test]
    fn missing_id_column_generates_unique_tokens() {
        let text = "nama_kabupaten_kota,kategori,jumlah,tahun\nMalang,PADI,100,2023\nKediri,PADI,90,2023";
        let (records, report) = parse_records(text).unwrap();
        assert_eq!(report.generated_ids, 2);
        assert!(!records[0].id.is_empty());
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn windows_line_endings_and_blank_lines_are_tolerated() {
        let text = "id,nama_kabupaten_kota,kategori,jumlah,tahun\r\n1,Malang,PADI,100,2023\r\n\r\n2,Kediri,JAGUNG,50,2022\r\n";
        let (records, _) = parse_records(text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].year, "2022");
    }

    #[test]
    fn geometry_is_filtered_to_the_province() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"NAME_1": "JawaTimur", "NAME_2": "Malang"}, "geometry": null},
                {"type": "Feature", "properties": {"NAME_1": "JawaBarat", "NAME_2": "Bogor"}, "geometry": null},
                {"type": "Feature", "properties": {"NAME_1": "JawaTimur", "name": "Kediri"}, "geometry": null}
            ]
        }"#;
        let fc = parse_geometry(text).unwrap();
        assert_eq!(fc.features.len(), 2);
        assert_eq!(fc.features[0].region_label(), "Malang");
        assert_eq!(fc.features[1].region_label(), "Kediri");
    }

    #[test]
    fn geometry_that_is_not_json_fails() {
        assert!(matches!(parse_geometry("not json"), Err(LoadError::Json(_))));
    }
}
