#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the ward map dashboard.
//!
//! Drives the same views the dashboard uses, headlessly: load the roads
//! page, apply filters and selection, then export, snapshot, or
//! summarize. Records come from the REST API in the config, or from a
//! directory of JSON fixtures with `--fixtures`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use geo::coord;
use ward_map_api::{FixtureRecordSource, HttpRecordSource, RecordSource};
use ward_map_dashboard::{DashboardConfig, PanelState, RoadsView, summary};
use ward_map_export::{ExportKind, ExportOutcome};
use ward_map_geometry::{Crs, measure};
use ward_map_map::interaction::Sketch;
use ward_map_map::{FeatureKey, MeasureMode};
use ward_map_records_models::{FeatureId, FeatureTag, RoadCondition};

#[derive(Parser)]
#[command(name = "ward_map", about = "Municipal ward and road map toolkit")]
struct Cli {
    /// Config file merged over the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Read records from JSON fixtures in this directory instead of the API
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

/// Filters and selection applied to the roads page before acting on it.
#[derive(clap::Args)]
struct ViewArgs {
    /// Comma-separated condition classes to show (e.g. "Good,Poor")
    #[arg(long, value_delimiter = ',')]
    conditions: Vec<RoadCondition>,
    /// Only show roads with exactly this carriage type
    #[arg(long)]
    carriage: Option<String>,
    /// Comma-separated feature tags to hide (e.g. "zone,ward")
    #[arg(long, value_delimiter = ',')]
    hide: Vec<FeatureTag>,
    /// Comma-separated road ids to select, in order
    #[arg(long, value_delimiter = ',')]
    select: Vec<String>,
    /// Show selected roads only
    #[arg(long)]
    only_selected: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export visible or selected roads to CSV
    Export {
        /// Which set to export: "visible" or "selected"
        #[arg(default_value = "visible")]
        kind: ExportKind,
        /// Output directory (overrides `export.directory`)
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Measure a shape given as "x,y" vertices
    Measure {
        /// "point", "distance", or "area"
        mode: MeasureMode,
        /// Vertices as "x,y"
        #[arg(required = true, allow_hyphen_values = true)]
        vertices: Vec<String>,
        /// CRS the vertices are written in
        #[arg(long, default_value = "EPSG:4326")]
        crs: Crs,
    },
    /// Print per-zone road network statistics
    Summary,
    /// Render the roads page to an SVG file
    Snapshot {
        /// Output file
        #[arg(long, default_value = "ward_map.svg")]
        out: PathBuf,
        /// Base-map provider id ("osm", "topo", "satellite")
        #[arg(long)]
        base_map: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
}

fn record_source(
    cli_fixtures: Option<PathBuf>,
    config: &DashboardConfig,
) -> Result<Box<dyn RecordSource>, Box<dyn std::error::Error>> {
    Ok(match cli_fixtures {
        Some(dir) => {
            log::info!("Reading fixtures from {}", dir.display());
            Box::new(FixtureRecordSource::new(dir))
        }
        None => {
            log::info!("Fetching from {}", config.api.base_url);
            Box::new(HttpRecordSource::new(
                &config.api.base_url,
                config.api.timeout(),
            )?)
        }
    })
}

/// Mounts and loads the roads page, then applies `args`.
async fn open_roads_view(
    config: DashboardConfig,
    source: &dyn RecordSource,
    args: &ViewArgs,
    multi: &ward_map_cli_utils::MultiProgress,
) -> Result<RoadsView, Box<dyn std::error::Error>> {
    let mut view = RoadsView::new(config);
    view.mount()?;

    let bar = ward_map_cli_utils::spinner(multi, "Loading zones, wards, and roads");
    view.load(source).await?;
    let loaded = view.session().features().count();
    ward_map_cli_utils::finish(&bar, format!("Loaded {loaded} feature(s)"));

    for tag in FeatureTag::all() {
        if let Some(PanelState::Failed(message)) = view.session().panel(*tag) {
            log::error!("{tag} panel failed: {message}");
        }
    }

    let session = view.session_mut();
    if !args.conditions.is_empty() {
        session.set_conditions(args.conditions.iter().copied());
    }
    if args.carriage.is_some() {
        session.set_carriage_type(args.carriage.as_deref());
    }
    for tag in &args.hide {
        if session.filter().visible_tags.contains(tag) {
            session.toggle_tag(*tag);
        }
    }
    for id in &args.select {
        let id = FeatureId::from(id.as_str());
        let tag = if session.find(FeatureTag::MultiRoad, &id).is_some() {
            FeatureTag::MultiRoad
        } else {
            FeatureTag::Road
        };
        session.toggle_selection(&FeatureKey { tag, id });
    }
    session.set_only_selected(args.only_selected);

    Ok(view)
}

fn parse_vertex(text: &str) -> Result<geo::Coord<f64>, String> {
    let (x, y) = text
        .split_once(',')
        .ok_or_else(|| format!("Expected \"x,y\", got \"{text}\""))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("Bad coordinate \"{v}\": {e}"))
    };
    Ok(coord! { x: parse(x)?, y: parse(y)? })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = ward_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = DashboardConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            kind,
            out_dir,
            view,
        } => {
            let mut config = config;
            if let Some(dir) = out_dir {
                config.export.directory = dir;
            }
            let source = record_source(cli.fixtures, &config)?;
            let roads = open_roads_view(config, source.as_ref(), &view, &multi).await?;
            match roads.export(kind)? {
                ExportOutcome::Written { path, rows } => {
                    println!("Wrote {rows} row(s) to {}", path.display());
                }
                ExportOutcome::NothingToExport => println!("Nothing to export"),
            }
        }
        Commands::Measure {
            mode,
            vertices,
            crs,
        } => {
            if !mode.is_active() {
                return Err("Pick a measure mode: point, distance, or area".into());
            }
            let mut sketch = Sketch::new(mode);
            for vertex in &vertices {
                sketch.push(parse_vertex(vertex)?);
            }
            let geometry = sketch.geometry().ok_or_else(|| {
                format!(
                    "A {mode} measurement needs at least {} distinct vertices",
                    mode.min_vertices()
                )
            })?;
            println!("{}", measure(&geometry, crs)?);
        }
        Commands::Summary => {
            let source = record_source(cli.fixtures, &config)?;
            let bar = ward_map_cli_utils::spinner(&multi, "Summarizing zones");
            let network = summary::load_summary(source.as_ref()).await?;
            ward_map_cli_utils::finish(&bar, format!("Summarized {} zone(s)", network.zones.len()));

            println!(
                "{:<6} {:<20} {:>6} {:>6} {:>12} {:>10} {:>12}",
                "ZONE", "NAME", "WARDS", "ROADS", "LENGTH (m)", "WARDS/km²", "ROAD m/km²"
            );
            for zone in &network.zones {
                println!(
                    "{:<6} {:<20} {:>6} {:>6} {:>12.2} {:>10.2} {:>12.2}",
                    zone.zone_no,
                    zone.zone_name,
                    zone.ward_count,
                    zone.road_count,
                    zone.total_road_length_m,
                    zone.ward_density,
                    zone.road_density
                );
            }
            println!();
            println!(
                "{} road(s), {:.2} km total",
                network.road_count,
                network.total_road_length_m / 1000.0
            );
            for (condition, count) in &network.condition_breakdown {
                println!("  {condition}: {count}");
            }
        }
        Commands::Snapshot {
            out,
            base_map,
            view,
        } => {
            let source = record_source(cli.fixtures, &config)?;
            let fit = config.selection_fit();
            let mut roads = open_roads_view(config, source.as_ref(), &view, &multi).await?;
            let session = roads.session_mut();
            if let Some(id) = base_map {
                session.set_base_map(&id)?;
            }
            if !session.fit_visible(fit) {
                log::warn!("Nothing visible to fit; keeping the configured view");
            }
            let svg = session.snapshot()?;
            std::fs::write(&out, svg)?;
            println!("Wrote snapshot to {}", out.display());
        }
    }

    Ok(())
}
