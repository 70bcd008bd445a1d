use clap::{Parser, Subcommand};
use rust_omr::detector::metrics::MetricKind;
use rust_omr::tools::{
    binarize, dataset_root_from_env, grayscale_stats, ink_stats, load_binary, load_gray,
    page_paths, save_raster,
};
use rust_omr::{ScanConfig, StaffDetection, StaffDetector};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "stafftool", version, about = "RustOMR staff detection tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect staffs on a single page and list their bounds
    Detect {
        #[arg(long)]
        image: PathBuf,
        /// Also print the treble pitch at this column and row
        #[arg(long, num_args = 2, value_names = ["X", "Y"])]
        pitch: Option<Vec<f64>>,
    },
    /// Print grayscale/ink stats and the run-length metrics of a page
    Metrics {
        #[arg(long)]
        image: PathBuf,
    },
    /// Write an image holding only the fitted staff lines
    Render {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Write the page with staff lines erased
    Strip {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Keep pixels whose diagonal neighbours continue past the line
        #[arg(long)]
        eight_way: bool,
    },
    /// Run detection on every page of a directory
    Batch {
        #[arg(long)]
        root: Option<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let detector = StaffDetector::with_config(ScanConfig::from_env());

    let outcome = match cli.command {
        Command::Detect { image, pitch } => detect_cmd(&detector, &image, pitch.as_deref()),
        Command::Metrics { image } => metrics_cmd(&detector, &image),
        Command::Render { image, out } => render_cmd(&detector, &image, &out),
        Command::Strip {
            image,
            out,
            eight_way,
        } => strip_cmd(&detector, &image, &out, eight_way),
        Command::Batch { root, limit } => batch_cmd(&detector, root, limit),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("stafftool: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn detect_page(detector: &StaffDetector, image: &Path) -> rust_omr::Result<StaffDetection> {
    let raster = load_binary(image)?;
    detector.detect(&raster)
}

fn detect_cmd(detector: &StaffDetector, image: &Path, pitch: Option<&[f64]>) -> rust_omr::Result<()> {
    let detection = detect_page(detector, image)?;
    println!(
        "Image: {} ({}x{})",
        image.display(),
        detection.width(),
        detection.height()
    );
    println!("Found {} staffs", detection.staffs().len());
    for (i, staff) in detection.staffs().iter().enumerate() {
        println!(
            "  Staff {}: top={} bottom={} left={} right={} coverage={}",
            i,
            staff.top_bound(),
            staff.bottom_bound(),
            staff.left_bound(),
            staff.right_bound(),
            staff.horizontal_coverage()
        );
    }

    if let Some(&[x, y]) = pitch {
        match detection.nearest_staff(y.round() as i32) {
            Some(index) => match detection.pitch_at(index, x, y) {
                Some(Ok(pitch)) => println!("Pitch at ({}, {}): {} (staff {})", x, y, pitch, index),
                Some(Err(err)) => println!("Pitch at ({}, {}): {}", x, y, err),
                None => println!("Pitch at ({}, {}): no tolerances", x, y),
            },
            None => println!("Pitch at ({}, {}): no staff on page", x, y),
        }
    }
    Ok(())
}

fn metrics_cmd(detector: &StaffDetector, image: &Path) -> rust_omr::Result<()> {
    let (gray, width, height) = load_gray(image)?;
    println!("Image: {} ({}x{})", image.display(), width, height);

    let gray_stats = grayscale_stats(&gray);
    println!(
        "Grayscale range: {}-{}, average: {}",
        gray_stats.min, gray_stats.max, gray_stats.avg
    );

    let raster = binarize(&gray, width, height);
    let stats = ink_stats(&raster);
    println!(
        "Binary: ink_pixels={} total={} ink_ratio={:.2}%",
        stats.ink_pixels,
        stats.total_pixels,
        stats.ink_ratio * 100.0
    );

    let detection = detector.detect(&raster)?;
    let metrics = detection.metrics();
    let threshold = detector.config().mode_threshold;
    for kind in [
        MetricKind::LineHeight,
        MetricKind::LineDistance,
        MetricKind::StaffHeight,
    ] {
        match (metrics.mode(kind), metrics.mode_range(kind, threshold)) {
            (Ok(mode), Ok(range)) => println!(
                "  {}: mode={} range=[{}, {}] observations={}",
                kind,
                mode,
                range.lower(),
                range.upper(),
                metrics.observation_count(kind)
            ),
            _ => println!("  {}: no observations", kind),
        }
    }
    if let Some(tol) = detection.tolerances() {
        println!(
            "Margins: thickness={} line={} staff={} pitch={:.2}",
            tol.line_thickness,
            tol.line_margin,
            tol.staff_margin,
            tol.pitch_margin()
        );
    }
    Ok(())
}

fn render_cmd(detector: &StaffDetector, image: &Path, out: &Path) -> rust_omr::Result<()> {
    let detection = detect_page(detector, image)?;
    save_raster(&detection.staff_line_raster(), out)?;
    println!(
        "Rendered {} staffs to {}",
        detection.staffs().len(),
        out.display()
    );
    Ok(())
}

fn strip_cmd(
    detector: &StaffDetector,
    image: &Path,
    out: &Path,
    eight_way: bool,
) -> rust_omr::Result<()> {
    let raster = load_binary(image)?;
    let detection = detector.detect(&raster)?;
    let stripped = detection.remove_staff_lines(&raster, eight_way);
    println!(
        "Removed {} staff-line pixels ({} staffs)",
        raster.count_foreground() - stripped.count_foreground(),
        detection.staffs().len()
    );
    save_raster(&stripped, out)?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn batch_cmd(
    detector: &StaffDetector,
    root: Option<PathBuf>,
    limit: Option<usize>,
) -> rust_omr::Result<()> {
    let Some(root) = root.or_else(dataset_root_from_env) else {
        eprintln!("No dataset root given (use --root or OMR_DATASET)");
        return Ok(());
    };

    let pages = page_paths(&root, limit);
    let started = Instant::now();
    let mut total_staffs = 0usize;
    let mut failures = 0usize;
    for path in &pages {
        match detect_page(detector, path) {
            Ok(detection) => {
                total_staffs += detection.staffs().len();
                println!("{}: {} staffs", path.display(), detection.staffs().len());
            }
            Err(err) => {
                failures += 1;
                eprintln!("{}: {}", path.display(), err);
            }
        }
    }

    let elapsed = started.elapsed();
    println!(
        "Pages: {} staffs: {} failures: {} elapsed: {:.2?}",
        pages.len(),
        total_staffs,
        failures,
        elapsed
    );
    Ok(())
}
