//! CLI application for region color extraction.
//!
//! Usage:
//!   face-colors                          # ../image/sample2.png with the bundled models
//!   face-colors portrait.jpg             # Another image
//!   face-colors portrait.jpg -v          # Debug diagnostics on stderr

use clap::Parser;
use face_colors::{extract_colors, infer, register_ort, FaceLandmarker, SelfieSegmenter};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "face-colors")]
#[command(author, version, about = "Average hair, skin, clothes, iris, eyebrow and lip colors", long_about = None)]
struct Args {
    /// Input image file
    #[arg(default_value = "../image/sample2.png")]
    image: PathBuf,

    /// Multiclass selfie segmentation model path
    #[arg(long, default_value = "../models/selfie_multiclass_256x256.onnx")]
    segmenter: PathBuf,

    /// Face detector model path
    #[arg(long, default_value = "../models/face_detector.onnx")]
    face_detector: PathBuf,

    /// Face mesh model path
    #[arg(long, default_value = "../models/face_landmarks_detector.onnx")]
    face_mesh: PathBuf,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> face_colors::Result<()> {
    register_ort()?;

    tracing::debug!(path = ?args.image, "loading image");
    let image = image::open(&args.image)?.to_rgb8();

    let segmenter = SelfieSegmenter::new(args.segmenter.clone())?;
    let landmarker = FaceLandmarker::from_files(args.face_detector.clone(), args.face_mesh.clone())?;
    let inference = infer(segmenter, landmarker, &image)?;

    let report = extract_colors(&image, &inference.categories, &inference.faces)?;
    println!("{}", report);

    Ok(())
}
