//! Register image pairs from the command line
//!
//! # Usage
//!
//! ```bash
//! # Register two image files
//! cargo run --release --bin register_pair -- register reference.png moving.png
//!
//! # Use a saved configuration and dump every intermediate array as PNG
//! cargo run --release --bin register_pair -- register a.png b.png --config fm.json --dump-dir out/
//!
//! # Generate a synthetic pair with a known transform and check the recovery
//! cargo run --release --bin register_pair -- synthetic --angle 25 --scale 1.1 --tx 6 --ty -4
//! ```
//!
//! Set `RUST_LOG=debug` to see per-stage correlation scores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use ndarray::Array2;

use fourier_mellin::image_proc::image::{array2_to_gray_image, dynamic_image_to_array2};
use fourier_mellin::image_proc::test_patterns::blob_field;
use fourier_mellin::{
    register, register_with_diagnostics, RegistrationConfig, RegistrationResult, Transform4Dof,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register two image files of the same size
    Register {
        /// Reference image
        reference: PathBuf,

        /// Image to align against the reference
        moving: PathBuf,

        #[command(flatten)]
        tuning: TuningArgs,

        /// Directory to write intermediate arrays as PNG files
        #[arg(long)]
        dump_dir: Option<PathBuf>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register a synthetic scene against a transformed copy of itself
    Synthetic {
        /// Square image size in pixels
        #[arg(long, default_value_t = 256)]
        size: usize,

        /// Rotation in degrees
        #[arg(long, default_value_t = 20.0, allow_hyphen_values = true)]
        angle: f64,

        /// Uniform scale factor
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Translation along x in pixels
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        tx: f64,

        /// Translation along y in pixels
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        ty: f64,

        /// Seed for the blob field
        #[arg(long, default_value_t = 7)]
        seed: u64,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[derive(Args)]
struct TuningArgs {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the lower band limit
    #[arg(long)]
    lpmin_tuning: Option<f64>,

    /// Override the upper band limit
    #[arg(long)]
    lpmax_tuning: Option<f64>,
}

impl TuningArgs {
    fn resolve(&self) -> Result<RegistrationConfig> {
        let mut config = match &self.config {
            Some(path) => RegistrationConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RegistrationConfig::default(),
        };
        if let Some(v) = self.lpmin_tuning {
            config.lpmin_tuning = v;
        }
        if let Some(v) = self.lpmax_tuning {
            config.lpmax_tuning = v;
        }
        config.validate().context("Invalid tuning")?;
        Ok(config)
    }
}

fn load_gray(path: &Path) -> Result<Array2<f64>> {
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(dynamic_image_to_array2(&img))
}

fn print_result(result: &RegistrationResult) {
    let t = &result.transform;
    println!("Translation: ({:.3}, {:.3}) px", t.tx, t.ty);
    println!("Rotation:    {:.3} deg", t.theta_degrees);
    println!("Scale:       {:.5}", t.scale);
    println!(
        "Confidence:  {:.4} ({:?} hypothesis, rejected peak {:.4})",
        result.confidence,
        result.chosen,
        result.rejected_hypothesis().translation.peak
    );
}

fn run_register(
    reference: &Path,
    moving: &Path,
    config: &RegistrationConfig,
    dump_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let reference = load_gray(reference)?;
    let moving = load_gray(moving)?;

    let result = match dump_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let mut write_errors = Vec::new();
            let result = register_with_diagnostics(
                &reference.view(),
                &moving.view(),
                config,
                |stage, data| {
                    let path = dir.join(format!("{}.png", stage.name()));
                    if let Err(e) = array2_to_gray_image(&data.to_owned()).save(&path) {
                        write_errors.push(format!("{}: {e}", path.display()));
                    }
                },
            )?;
            for err in &write_errors {
                log::warn!("Failed to write intermediate {err}");
            }
            result
        }
        None => register(&reference.view(), &moving.view(), config)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn run_synthetic(
    truth: Transform4Dof,
    size: usize,
    seed: u64,
    config: &RegistrationConfig,
) -> Result<()> {
    let reference = blob_field(size, size, size / 4, seed);
    let moving = truth.apply(&reference.view(), config.border_value)?;

    println!(
        "Applied:     ({:.3}, {:.3}) px, {:.3} deg, scale {:.5}",
        truth.tx, truth.ty, truth.theta_degrees, truth.scale
    );
    let result = register(&reference.view(), &moving.view(), config)?;
    print_result(&result);

    let found = &result.transform;
    println!(
        "Error:       ({:+.3}, {:+.3}) px, {:+.3} deg, {:+.3}% scale",
        found.tx - truth.tx,
        found.ty - truth.ty,
        found.theta_degrees - truth.theta_degrees,
        100.0 * (found.scale / truth.scale - 1.0)
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Register {
            reference,
            moving,
            tuning,
            dump_dir,
            json,
        } => {
            let config = tuning.resolve()?;
            run_register(&reference, &moving, &config, dump_dir.as_deref(), json)
        }
        Commands::Synthetic {
            size,
            angle,
            scale,
            tx,
            ty,
            seed,
            tuning,
        } => {
            let config = tuning.resolve()?;
            run_synthetic(Transform4Dof::new(tx, ty, angle, scale), size, seed, &config)
        }
    }
}
