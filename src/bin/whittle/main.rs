//! Whittle CLI - mesh decimation command-line tool.
//!
//! Usage: whittle <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `whittle --help` for available commands.

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};

use whittle::algo::decimate::{qem_decimate_with_progress, DecimateOptions};
use whittle::algo::{Cancel, Progress};
use whittle::io;
use whittle::mesh::measure::{surface_area, volume};
use whittle::mesh::TriMesh;

#[derive(Parser)]
#[command(name = "whittle")]
#[command(author, version, about = "Mesh decimation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Decimate (simplify) a mesh
    Decimate {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Target number of triangles
        #[arg(short = 't', long, conflicts_with = "ratio")]
        triangles: Option<usize>,

        /// Target ratio of triangles to keep (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        ratio: f64,

        /// Stop once the cheapest collapse would exceed this error
        #[arg(short = 'e', long)]
        max_error: Option<f32>,

        /// Use single-threaded initialization (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,

        Commands::Decimate {
            input,
            output,
            triangles,
            ratio,
            max_error,
            sequential,
        } => {
            cmd_decimate(&input, &output, triangles, ratio, max_error, sequential)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicU32::new(0)); // Track highest percent seen (monotonic)

    Progress::new(move |percent| {
        // Only move forward; estimates can bounce around phase changes
        let previous = max_percent.fetch_max(percent, Ordering::Relaxed);
        if percent <= previous && percent != 100 {
            return;
        }
        let percent = percent.min(100);

        let bar_width = 30;
        let filled = (percent as usize * bar_width) / 100;
        let bar: String = std::iter::repeat('=').take(filled).collect();
        let space: String = std::iter::repeat(' ').take(bar_width - filled).collect();

        // Use carriage return to overwrite the line
        eprint!("\r[{}{}] {:3}%", bar, space, percent);
        let _ = std::io::stderr().flush();

        if percent == 100 {
            eprintln!();
        }
    })
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: TriMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());
    println!("Surface area: {:.6}", surface_area(&mesh));
    println!("Signed volume: {:.6}", volume(&mesh));

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    Ok(())
}

fn cmd_decimate(
    input: &PathBuf,
    output: &PathBuf,
    triangles: Option<usize>,
    ratio: f64,
    max_error: Option<f32>,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: TriMesh = io::load(input)?;

    println!(
        "Loaded: {} vertices, {} triangles",
        mesh.num_vertices(),
        mesh.num_triangles()
    );

    let mode = if sequential { "sequential" } else { "parallel" };
    let mut options = if let Some(target) = triangles {
        println!("Decimating to {} triangles ({})...", target, mode);
        DecimateOptions::with_target_triangles(target)
    } else {
        println!("Decimating to {:.0}% of triangles ({})...", ratio * 100.0, mode);
        DecimateOptions::with_target_ratio(ratio)
    };
    if let Some(max_error) = max_error {
        options = options.with_max_error(max_error);
    }
    if sequential {
        options = options.sequential();
    }

    let progress = create_progress();

    let start = Instant::now();
    let summary = qem_decimate_with_progress(&mut mesh, &options, &progress, &Cancel::never());
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices, {} triangles (last collapse error {:.6})",
        mesh.num_vertices(),
        mesh.num_triangles(),
        summary.last_error
    );
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
