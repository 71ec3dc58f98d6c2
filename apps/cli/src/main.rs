// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! SHP-Terrain CLI - build terrain mesh chunks from a shapefile.
//!
//! Decodes a `.shp` file, triangulates it (earcut for rings, Delaunay for
//! point sets) and writes the resulting chunks as JSON (`{header, stats, chunks}`), or prints a
//! summary when no output is given.
//!
//! Defaults come from `SHP_TERRAIN_*` environment variables; flags override
//! them. Logging goes to stderr and is controlled by `RUST_LOG`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use shp_terrain_core::{RecordSelection, ShapefileDataset};
use shp_terrain_geometry::{
    AutoTriangulator, DelaunayTriangulator, EarcutTriangulator, Triangulator,
};
use shp_terrain_processing::{process_file, PipelineConfig, TerrainOutput};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SelectionArg {
    /// Multi-part records expanded into one record per ring
    Split,
    /// Records as stored
    Original,
}

impl From<SelectionArg> for RecordSelection {
    fn from(arg: SelectionArg) -> Self {
        match arg {
            SelectionArg::Split => RecordSelection::Split,
            SelectionArg::Original => RecordSelection::Original,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TriangulatorArg {
    /// Earcut when the selection has rings, Delaunay otherwise
    Auto,
    /// Fill every ring with earcut
    Earcut,
    /// Delaunay surface over all points
    Delaunay,
}

impl TriangulatorArg {
    fn triangulator(self) -> &'static dyn Triangulator {
        match self {
            TriangulatorArg::Auto => &AutoTriangulator,
            TriangulatorArg::Earcut => &EarcutTriangulator,
            TriangulatorArg::Delaunay => &DelaunayTriangulator,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "shp-terrain", about = "Build terrain mesh chunks from an ESRI shapefile")]
struct Args {
    /// Input .shp file
    input: PathBuf,

    /// Write the JSON export here ("-" for stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON export
    #[arg(long)]
    pretty: bool,

    /// Maximum triangles per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Triangulation engine
    #[arg(long, value_enum, default_value = "auto")]
    triangulator: TriangulatorArg,

    /// Record collection to triangulate
    #[arg(long, value_enum)]
    selection: Option<SelectionArg>,

    /// Elevation for points without a stored z
    #[arg(long, allow_hyphen_values = true)]
    fallback_elevation: Option<f64>,

    /// Build chunks on the calling thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads for parallel chunk building (default: all cores)
    #[arg(long)]
    threads: Option<usize>,
}

impl Args {
    /// Environment configuration with command line overrides applied
    fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::from_env();
        if let Some(chunk_size) = self.chunk_size {
            config.chunk = config.chunk.with_chunk_size(chunk_size);
        }
        if let Some(selection) = self.selection {
            config.selection = selection.into();
        }
        if let Some(fallback) = self.fallback_elevation {
            config.fallback_elevation = fallback;
        }
        if self.sequential {
            config.chunk = config.chunk.with_parallel(false);
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,shp_terrain_core=debug,shp_terrain_processing=debug".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.pipeline_config();

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to initialize rayon thread pool")?;
    }

    tracing::info!(
        input = %args.input.display(),
        selection = %config.selection,
        triangulator = ?args.triangulator,
        chunk_size = config.chunk.chunk_size,
        parallel = config.chunk.parallel,
        fallback_elevation = config.fallback_elevation,
        "Building terrain"
    );

    let (dataset, output) = process_file(&args.input, args.triangulator.triangulator(), &config)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    match &args.output {
        Some(path) if path.as_os_str() == "-" => {
            let stdout = io::stdout();
            write_export(&output, &dataset, stdout.lock(), args.pretty)?;
        }
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_export(&output, &dataset, BufWriter::new(file), args.pretty)?;
            tracing::info!(path = %path.display(), chunks = output.chunks.len(), "Wrote export");
        }
        None => print_summary(&dataset, &output),
    }

    Ok(())
}

fn write_export<W: Write>(
    output: &TerrainOutput,
    dataset: &ShapefileDataset,
    mut writer: W,
    pretty: bool,
) -> Result<()> {
    output
        .write_json(&dataset.header, &mut writer, pretty)
        .context("Failed to serialize export")?;
    writer.flush().context("Failed to flush export")?;
    Ok(())
}

fn print_summary(dataset: &ShapefileDataset, output: &TerrainOutput) {
    let stats = &output.stats;
    println!("{}", dataset.header);
    println!(
        "records: {} ({} after splitting, {} selected)",
        stats.record_count, stats.split_record_count, stats.selection
    );
    println!(
        "triangulation: {} vertices, {} rings, {} triangles",
        stats.vertex_count, stats.ring_count, stats.triangle_count
    );
    println!("chunks: {}", stats.chunk_count);
    for (index, chunk) in output.chunks.iter().enumerate() {
        let (min, max) = chunk.bounds();
        println!(
            "  #{:<4} {:>6} triangles  bounds [{:.2}, {:.2}, {:.2}] .. [{:.2}, {:.2}, {:.2}]",
            index,
            chunk.triangle_count(),
            min.x,
            min.y,
            min.z,
            max.x,
            max.y,
            max.z
        );
    }
    println!(
        "time: parse {} ms, triangulate {} ms, chunk {} ms, total {} ms",
        stats.parse_time_ms, stats.triangulate_time_ms, stats.chunk_time_ms, stats.total_time_ms
    );
}
