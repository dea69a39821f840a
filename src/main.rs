//! Grid clustering tool
//!
//! Reads 2D points (optionally with a shared property A and a unique
//! property B per point) from a CSV file, clusters them on a spatial hash
//! grid and writes the cluster index of every point.

use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use grid_cluster::{
    ClusterMap, ClusteringEngine, ClusteringError, GreedyQt, GridBoundaries, Hierarchical,
    PipelineParams, PointSet, Property, ScaledEuclidean, Strategy, spacing,
};


const UNCLUSTERED_LABEL: i64 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Greedy quality-threshold extraction
    Qt,
    /// Nearest-neighbour merging
    Hierarchical,
}

#[derive(Parser)]
#[command(name = "grid_cluster_tool")]
#[command(about = "Grid-accelerated 2D point clustering tool", long_about = None)]
struct Args {
    /// Input CSV file with x,y[,property_a,property_b] columns
    #[arg(short, long, default_value = "points.csv")]
    input: PathBuf,

    /// Output CSV file with cluster labels (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Clustering strategy
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Qt)]
    strategy: StrategyArg,

    /// Maximum seed-to-member distance (qt strategy)
    #[arg(short, long, default_value_t = 1.0)]
    threshold: f64,

    /// Number of neighbouring cell rings searched
    #[arg(short, long, default_value_t = 1)]
    radius: usize,

    /// Grid step in x
    #[arg(long, default_value_t = 1.0)]
    x_step: f64,

    /// Relative grid step in x (ppm), overrides --x-step
    #[arg(long)]
    x_ppm: Option<f64>,

    /// Grid step in y
    #[arg(long, default_value_t = 1.0)]
    y_step: f64,

    /// Factor applied to y differences by the distance metric
    #[arg(long, default_value_t = 1.0)]
    y_scaling: f64,

    /// Merge clusters adjacent in y after clustering
    #[arg(long)]
    extend_y: bool,

    /// Drop clusters whose y-extent is below this value
    #[arg(long)]
    min_extent_y: Option<f64>,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let input = match read_points(&args.input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error reading CSV: {}", e);
            std::process::exit(1);
        }
    };
    info!(points = input.xs.len(), file = ?args.input, "read points");

    let labels = match cluster_points(&args, &input) {
        Ok(labels) => labels,
        Err(e) => {
            eprintln!("Error clustering points: {}", e);
            std::process::exit(1);
        }
    };

    let written = match &args.output {
        None => write_labels(io::stdout(), &input, &labels),
        Some(output_file) => match File::create(output_file) {
            Ok(f) => write_labels(f, &input, &labels),
            Err(e) => Err(e.into()),
        },
    };
    if let Err(e) = written {
        eprintln!("Error writing CSV: {}", e);
        std::process::exit(1);
    }
    if let Some(output_file) = &args.output {
        debug!(file = ?output_file, "labels written");
    }
}

/// Parsed input columns
#[derive(Debug, Default)]
struct InputPoints {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Present only if every row carries both properties
    properties: Option<(Vec<i32>, Vec<i32>)>,
}

/// Reads points from a CSV file
///
/// Expected format: `x,y[,property_a,property_b]` (header row is optional).
/// Rows whose coordinates do not parse are skipped with a warning. Either
/// every row carries both properties or none does.
fn read_points(filename: &PathBuf) -> Result<InputPoints, Box<dyn std::error::Error>> {
    let file = File::open(filename)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result?);
    }

    // Determine if first row is header
    let has_header = records
        .first()
        .is_some_and(|r| r.get(0).is_none_or(|v| v.trim().parse::<f64>().is_err()));
    let start_idx = if has_header { 1 } else { 0 };

    let mut input = InputPoints::default();
    let mut props_a = Vec::new();
    let mut props_b = Vec::new();
    // first line with and first line without both properties
    let mut with_properties: Option<u64> = None;
    let mut without_properties: Option<u64> = None;

    for (i, record) in records.iter().enumerate().skip(start_idx) {
        let line = record.position().map_or(i as u64 + 1, |p| p.line());
        let x = record.get(0).map(|v| v.trim().parse::<f64>());
        let y = record.get(1).map(|v| v.trim().parse::<f64>());
        let (Some(Ok(x)), Some(Ok(y))) = (x, y) else {
            warn!(line, "skipping row without valid x,y coordinates");
            continue;
        };
        input.xs.push(x);
        input.ys.push(y);

        let a = record.get(2).and_then(|v| v.trim().parse::<i32>().ok());
        let b = record.get(3).and_then(|v| v.trim().parse::<i32>().ok());
        match (a, b) {
            (Some(a), Some(b)) => {
                props_a.push(a);
                props_b.push(b);
                with_properties.get_or_insert(line);
            }
            _ => {
                without_properties.get_or_insert(line);
            }
        }
    }

    match (with_properties, without_properties) {
        (Some(first), Some(missing)) => {
            return Err(format!(
                "line {} has no valid property_a,property_b columns, but line {} has",
                missing, first
            )
            .into());
        }
        (Some(_), None) => input.properties = Some((props_a, props_b)),
        _ => {}
    }
    Ok(input)
}

/// Builds the grid from the arguments and clusters the input
///
/// Returns one label per point: the cluster index, or -1 if unclustered.
fn cluster_points(args: &Args, input: &InputPoints) -> grid_cluster::Result<Vec<i64>> {
    if input.xs.len() < 2 {
        return Err(ClusteringError::InsufficientInput {
            required: 2,
            provided: input.xs.len(),
        });
    }
    let x_lines = match args.x_ppm {
        Some(tolerance) => {
            let (min, max) = min_max(&input.xs);
            // last line must lie strictly above the largest value
            spacing::ppm(min, max * (1.0 + tolerance * 1e-6), tolerance)?
        }
        None => spacing::covering(&input.xs, args.x_step)?,
    };
    let y_lines = spacing::covering(&input.ys, args.y_step)?;
    let boundaries = GridBoundaries::new(x_lines, y_lines)?;

    let strategy: Strategy = match args.strategy {
        StrategyArg::Qt => GreedyQt::new(args.threshold)?
            .with_radius(args.radius)
            .into(),
        StrategyArg::Hierarchical => Hierarchical::new().with_radius(args.radius).into(),
    };
    let metric = ScaledEuclidean::new(args.y_scaling)?;
    let params = PipelineParams {
        extend_y: args.extend_y,
        min_extent_y: args.min_extent_y,
    };

    let points = match &input.properties {
        Some((a, b)) => PointSet::with_properties(&input.xs, &input.ys, a, b)?,
        None => PointSet::new(&input.xs, &input.ys)?,
    };
    let mut engine = ClusteringEngine::new(metric, strategy, points, boundaries)?;
    let clusters = engine.run(&params)?;
    info!(clusters = clusters.len(), "clustering finished");

    Ok(build_labels(clusters, input.xs.len()))
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Creates a labels array from clusters
///
/// `labels[i]` = cluster index for point i, or -1 if unclustered
fn build_labels<A: Property, B: Property>(
    clusters: &ClusterMap<A, B>,
    num_points: usize,
) -> Vec<i64> {
    let mut labels = vec![UNCLUSTERED_LABEL; num_points];

    for (&id, cluster) in clusters {
        for &idx in cluster.points() {
            labels[idx] = id as i64;
        }
    }

    labels
}

/// Writes `index,x,y,cluster` rows
fn write_labels<W: io::Write>(
    out: W,
    input: &InputPoints,
    labels: &[i64],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(["index", "x", "y", "cluster"])?;

    for (i, label) in labels.iter().enumerate() {
        writer.write_record([
            i.to_string(),
            input.xs[i].to_string(),
            input.ys[i].to_string(),
            label.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
