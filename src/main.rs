// Entry point and high-level CLI flow.
//
// The binary wraps the harvest-data pipeline in a small menu:
// - Option [1] loads and parses the harvest CSV and the region geometry,
//   printing diagnostics.
// - Options [2]-[4] generate the dashboard, insight/forecast and map
//   coverage reports over the loaded dataset, each previewed on the
//   console and exported to CSV/JSON files.
// - After generating a report, the user can go back to the menu or exit.
mod aggregate;
mod filter;
mod forecast;
mod loader;
mod output;
mod reconcile;
mod types;
mod util;
mod views;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{FeatureCollection, FilterSelection, HarvestRecord, InsightSummary, Selection};

const DATA_PATH: &str = "dataset-jatim-utf.csv";
const GEOMETRY_PATH: &str = "jawa-timur-gadm.geojson";

// Simple in-memory app state so the dataset is loaded once but reports can
// be generated multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        records: None,
        geometry: None,
    })
});

struct AppState {
    records: Option<Vec<HarvestRecord>>,
    geometry: Option<FeatureCollection>,
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt. Reused for the main menu and simple numeric inputs.
fn read_choice() -> String {
    read_line("Enter choice: ")
}

/// Ask the user whether to go back to the report menu after a report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        let resp = read_line("Back to Report Selection (Y/N): ").to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Prompt for a year/commodity filter. Blank or "ALL" leaves a dimension
/// unrestricted, mirroring the dashboard's filter dropdowns.
fn prompt_selection(records: &[HarvestRecord]) -> FilterSelection {
    let years = aggregate::distinct_years(records);
    println!("Available years: ALL, {}", years.join(", "));
    let year = Selection::parse(&read_line("Year filter: "));
    let commodity = Selection::parse(&read_line("Commodity filter (e.g. PADI, JAGUNG, KEDELAI): "));
    FilterSelection { year, commodity }
}

/// Handle option [1]: load the harvest CSV and the region geometry.
///
/// The CSV is required; a missing or broken geometry source only disables
/// the map coverage report.
fn handle_load() {
    match loader::load_records(DATA_PATH) {
        Ok((records, report)) => {
            println!(
                "Processing dataset... ({} rows parsed)",
                util::format_int(report.total_rows as i64)
            );
            if report.coerced_areas > 0 {
                println!(
                    "Note: {} quantity fields coerced to 0.",
                    util::format_int(report.coerced_areas as i64)
                );
            }
            if report.generated_ids > 0 {
                println!(
                    "Note: {} record ids generated (no id column in source).",
                    util::format_int(report.generated_ids as i64)
                );
            }
            let mut state = APP_STATE.lock().unwrap();
            state.records = Some(records);
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", DATA_PATH, e);
            return;
        }
    }

    match loader::load_geometry(GEOMETRY_PATH) {
        Ok(geometry) => {
            println!(
                "Geometry loaded: {} features for {}.\n",
                util::format_int(geometry.features.len() as i64),
                loader::PROVINCE_NAME
            );
            let mut state = APP_STATE.lock().unwrap();
            state.geometry = Some(geometry);
        }
        Err(e) => {
            eprintln!(
                "Warning: failed to load {}: {} (map report unavailable)\n",
                GEOMETRY_PATH, e
            );
        }
    }
}

fn loaded_records() -> Option<Vec<HarvestRecord>> {
    let state = APP_STATE.lock().unwrap();
    state.records.clone()
}

/// Handle option [2]: KPI summary, region ranking and commodity
/// distribution for one filter selection.
fn handle_dashboard() {
    let Some(records) = loaded_records() else {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    };
    let selection = prompt_selection(&records);
    let view = views::compute_dashboard(&records, &selection);

    println!("\nDashboard: Harvest Explorer Jawa Timur\n");
    println!("Total luas panen: {} ha", util::format_number(view.total_area, 1));
    match &view.top_region {
        Some(top) => println!(
            "Wilayah paling produktif: {} ({} ha)",
            top.region_name,
            util::format_number(top.total_area, 1)
        ),
        None => println!("Wilayah paling produktif: (no data)"),
    }
    match &view.top_commodity {
        Some(top) => println!(
            "Komoditas dominan: {} ({:.1}% dari total)\n",
            top.commodity, top.share_percent
        ),
        None => println!("Komoditas dominan: (no data)\n"),
    }

    let ranking_rows = output::region_rank_rows(&view.region_ranking);
    let file1 = "dashboard_region_ranking.csv";
    if let Err(e) = output::write_csv(file1, &ranking_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Ranking Kabupaten/Kota (top 5 shown)\n");
    output::preview_table(&ranking_rows, 5);
    println!("(Full table exported to {})\n", file1);

    let distribution_rows = output::commodity_share_rows(&view.commodity_distribution);
    let file2 = "dashboard_commodity_distribution.csv";
    if let Err(e) = output::write_csv(file2, &distribution_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Distribusi Komoditas\n");
    output::preview_table(&distribution_rows, 10);
    println!("(Full table exported to {})\n", file2);
}

/// Handle option [3]: distributions, probabilities and the two-period
/// forecast over the full dataset.
fn handle_insights() {
    let Some(records) = loaded_records() else {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    };
    let view = views::compute_insights(&records);

    println!("\nInsight: Distribusi & Prediksi\n");

    let commodity_rows = output::commodity_share_rows(&view.commodity_distribution);
    let file1 = "insight_commodity_distribution.csv";
    if let Err(e) = output::write_csv(file1, &commodity_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Distribusi per Komoditas\n");
    output::preview_table(&commodity_rows, 10);
    println!("(Full table exported to {})\n", file1);

    println!("Distribusi per Kabupaten/Kota (top 10)\n");
    let region_rows = output::region_share_rows(&view.region_distribution);
    output::preview_table(&region_rows, 10);

    println!("Probabilitas Komoditas\n");
    let probability_rows = output::commodity_share_rows(&view.commodity_probabilities);
    output::preview_table(&probability_rows, 10);

    let year_rows = output::year_trend_rows(&view.year_distribution);
    let file2 = "insight_year_distribution.csv";
    if let Err(e) = output::write_csv(file2, &year_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Distribusi per Tahun\n");
    output::preview_table(&year_rows, 10);
    println!("(Full table exported to {})\n", file2);

    match (&view.forecast, &view.detailed) {
        (Some(f), Some(detailed)) => {
            println!(
                "Prediksi: tren {} ({:.1}% dari {}), SMA {} ha",
                f.trend.label(),
                f.change_percent,
                f.last_year,
                util::format_number(f.moving_average, 1)
            );
            println!(
                "  {} -> {} ha, {} -> {} ha\n",
                f.next_year1,
                util::format_number(f.projected_period1, 1),
                f.next_year2,
                util::format_number(f.projected_period2, 1)
            );

            let region_series_rows = output::projection_rows(&detailed.region_productivity);
            let file3 = "insight_region_productivity.csv";
            if let Err(e) = output::write_csv(file3, &region_series_rows) {
                eprintln!("Write error: {}", e);
            }
            println!("Wilayah Paling Produktif per Tahun\n");
            output::preview_table(&region_series_rows, 10);
            println!("(Full table exported to {})\n", file3);

            let commodity_series_rows = output::projection_rows(&detailed.top_commodity);
            let file4 = "insight_top_commodity.csv";
            if let Err(e) = output::write_csv(file4, &commodity_series_rows) {
                eprintln!("Write error: {}", e);
            }
            println!("Komoditas dengan Panen Terluas per Tahun\n");
            output::preview_table(&commodity_series_rows, 10);
            println!("(Full table exported to {})\n", file4);

            let change_series_rows = output::change_rows(&detailed.productivity_change);
            let file5 = "insight_productivity_change.csv";
            if let Err(e) = output::write_csv(file5, &change_series_rows) {
                eprintln!("Write error: {}", e);
            }
            println!("Perubahan Produktivitas Tahun ke Tahun\n");
            output::preview_table(&change_series_rows, 10);
            println!("(Full table exported to {})\n", file5);
        }
        _ => {
            println!("Prediksi: not enough data (need at least 2 historical years).\n");
        }
    }

    let summary = InsightSummary {
        total_records: records.len(),
        total_area: aggregate::total_area(&records),
        regions: aggregate::by_region(&records).len(),
        commodities: view.commodity_distribution.len(),
        years: view.year_distribution.len(),
        trend: view.forecast.as_ref().map(|f| f.trend.label().to_string()),
        projected_period1: view.forecast.as_ref().map(|f| f.projected_period1),
        projected_period2: view.forecast.as_ref().map(|f| f.projected_period2),
    };
    if let Err(e) = output::write_json("insight_summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary stats exported to insight_summary.json\n");
}

/// Handle option [4]: join region aggregates onto the geometry labels.
fn handle_map_coverage() {
    let (records, geometry) = {
        let state = APP_STATE.lock().unwrap();
        (state.records.clone(), state.geometry.clone())
    };
    let Some(records) = records else {
        println!("Error: No data loaded. Please load the dataset first (option 1).\n");
        return;
    };
    let Some(geometry) = geometry else {
        println!("Error: No geometry loaded. Please load the dataset first (option 1).\n");
        return;
    };

    let selection = prompt_selection(&records);
    let joined = views::compute_map_view(&records, &selection, &geometry);
    let unmatched = geometry.features.len().saturating_sub(joined.len());

    println!("\nMap Coverage: Luas Panen per Wilayah\n");
    println!(
        "{} of {} geometry features matched a data region ({} without data).\n",
        util::format_int(joined.len() as i64),
        util::format_int(geometry.features.len() as i64),
        util::format_int(unmatched as i64)
    );

    let coverage_rows = output::map_coverage_rows(&joined);
    let file = "map_coverage.csv";
    if let Err(e) = output::write_csv(file, &coverage_rows) {
        eprintln!("Write error: {}", e);
    }
    output::preview_table(&coverage_rows, 10);
    println!("(Full table exported to {})\n", file);
}

fn main() {
    loop {
        println!("Select an option:");
        println!("[1] Load the dataset");
        println!("[2] Dashboard report");
        println!("[3] Insight & forecast report");
        println!("[4] Map coverage report\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                handle_dashboard();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "3" => {
                handle_insights();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => {
                handle_map_coverage();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1-4.\n");
            }
        }
    }
}
