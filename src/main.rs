// Entry point and high-level CLI flow.
//
// - Option [1] loads the obras snapshot, printing diagnostics.
// - Option [2] shows the cascading filter options and updates one filter.
// - Option [3] writes the chart datasets, the project table and a KPI
//   summary, printing a Markdown preview of each.
use obras_dashboard::cache::SnapshotCache;
use obras_dashboard::config::DashboardConfig;
use obras_dashboard::filters::apply_filters;
use obras_dashboard::kpi::kpis;
use obras_dashboard::options::{clean_dependent_filters, get_filter_options};
use obras_dashboard::{aggregate, loader, logging, output, reports, util};
use obras_dashboard::{FieldMap, FilterKey, Filters};
use std::io::{self, Write};
use tracing::{error, info};

// Everything the menu handlers share, passed down explicitly.
struct AppState {
    config: DashboardConfig,
    fields: FieldMap,
    cache: SnapshotCache,
    filters: Filters,
}

fn prompt(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// Ask whether to go back to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Option [1]: (re)load the snapshot, bypassing the cache.
fn handle_load(state: &mut AppState) {
    state.cache.invalidate();
    let path = state.config.data_path.clone();
    let mut report = None;
    let result = state.cache.get_or_load(|| {
        let (rows, load_report) = loader::load_rows(&path)?;
        report = Some(load_report);
        Ok(rows)
    });
    match result {
        Ok(rows) => {
            println!(
                "Processing dataset... ({} obras loaded from {})",
                util::format_int(rows.len()),
                path.display()
            );
            if let Some(r) = report.filter(|r| r.skipped_rows > 0) {
                println!(
                    "Note: {} records skipped (not objects or unreadable).",
                    util::format_int(r.skipped_rows)
                );
            }
            println!();
        }
        Err(e) => {
            error!(error = %e, "load failed");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn print_options(label: &str, values: &[String]) {
    let shown: Vec<&str> = values.iter().take(8).map(String::as_str).collect();
    let more = values.len().saturating_sub(shown.len());
    if more > 0 {
        println!("  {:<12} {} (+{} more)", label, shown.join(" | "), more);
    } else {
        println!("  {:<12} {}", label, shown.join(" | "));
    }
}

/// Option [2]: show what is still selectable and change one filter.
fn handle_set_filter(state: &mut AppState) {
    let Some(rows) = state.cache.rows() else {
        println!("Error: No data loaded. Please load the file first (option 1).\n");
        return;
    };
    let opts = get_filter_options(&rows, &state.filters, &state.fields);
    println!("Current filters: {:?}", state.filters);
    print_options("proyecto", &opts.proyectos);
    print_options("dependencia", &opts.dependencias);
    print_options("comuna", &opts.comunas);
    print_options("tipo", &opts.tipos);
    print_options("desde/hasta", &opts.anios);

    let name = prompt("Filter to change (proyecto/dependencia/comuna/tipo/desde/hasta): ");
    let Some(key) = FilterKey::parse(&name) else {
        println!("Unknown filter: {}\n", name);
        return;
    };
    let value = prompt("Value (empty to clear): ");
    let updated = state.filters.with(key, value);
    state.filters = clean_dependent_filters(&updated, key);
    info!(filter = key.name(), filters = ?state.filters, "filters updated");
    println!();
}

/// Option [3]: write every report and print previews.
fn handle_generate_reports(state: &mut AppState) {
    let path = state.config.data_path.clone();
    let rows = match state
        .cache
        .get_or_load(|| loader::load_rows(&path).map(|(rows, _)| rows))
    {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Error: No data available ({}). Please load the file first (option 1).\n", e);
            return;
        }
    };
    let fields = &state.fields;
    let config = &state.config;
    let filtered = apply_filters(&rows, &state.filters, fields);
    info!(total = rows.len(), filtered = filtered.len(), "generating reports");

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let r1 = reports::investment_by_comuna(&filtered, fields, config.top_n, &config.others_label);
    let ds1 = aggregate::series_dataset(&r1, "Comuna", "Inversion");
    let file1 = config.output_path("report1_investment_by_comuna.csv");
    if let Err(e) = output::write_dataset_csv(&file1, &ds1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Inversión por Comuna");
    println!("(Top {} + {})\n", config.top_n, config.others_label);
    output::preview_dataset(&ds1, 3);
    println!("(Full table exported to {})\n", file1.display());

    let ds2 = reports::budget_by_dependencia(&filtered, fields, config.top_n);
    let file2 = config.output_path("report2_budget_by_dependencia.csv");
    if let Err(e) = output::write_dataset_csv(&file2, &ds2) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Costo Actualizado vs Presupuesto Ejecutado por Dependencia");
    println!("(Top {} by combined total)\n", config.top_n);
    output::preview_dataset(&ds2, 3);
    println!("(Full table exported to {})\n", file2.display());

    let r3 = reports::works_by_tipo(&filtered, fields);
    let ds3 = aggregate::series_dataset(&r3, "Tipo", "Obras");
    let file3 = config.output_path("report3_works_by_tipo.csv");
    if let Err(e) = output::write_dataset_csv(&file3, &ds3) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Obras por Tipo de Intervención\n");
    output::preview_dataset(&ds3, 3);
    println!("(Full table exported to {})\n", file3.display());

    let r4 = reports::project_table(&filtered, fields);
    let file4 = config.output_path("report4_projects.csv");
    if let Err(e) = output::write_csv(&file4, &r4) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 4: Obras por Costo Final\n");
    output::preview_table_rows(&r4, 3);
    println!("(Full table exported to {})\n", file4.display());

    let summary = kpis(&filtered, fields);
    if let Err(e) = output::write_json(config.output_path("summary.json"), &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    output::preview_table_rows(&[reports::kpi_table(&summary)], 1);
}

fn main() {
    logging::init();
    let config = DashboardConfig::from_env();
    let fields = match config.load_field_map() {
        Ok(f) => f,
        Err(e) => {
            error!(error = %e, "falling back to default field map");
            FieldMap::default()
        }
    };
    let mut state = AppState {
        cache: SnapshotCache::new(config.cache_ttl),
        config,
        fields,
        filters: Filters::default(),
    };

    loop {
        println!("Select Option:");
        println!("[1] Load the file");
        println!("[2] Set Filters");
        println!("[3] Generate Reports\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut state),
            "2" => handle_set_filter(&mut state),
            "3" => {
                println!();
                handle_generate_reports(&mut state);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
}
