use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use img2mlog::{decode, output, packer, scan, Mapper, Mode, PackerConfig};

#[derive(Parser)]
#[command(name = "img2mlog", version, about = "Convert an image into logic display draw programs")]
struct Args {
    /// Image to convert
    input: PathBuf,

    /// Directory for the numbered program files (default: <input>_mlog next to the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Display size in pixels, 80 for a logic display or 176 for a large one
    #[arg(short, long, default_value_t = 176)]
    resolution: u32,

    /// How the image is fitted onto the display
    #[arg(short, long, value_enum, default_value_t = Mode::Scale)]
    mode: Mode,

    /// Instructions allowed per program
    #[arg(short, long, default_value_t = packer::DEFAULT_BUDGET)]
    budget: usize,

    /// Display block to flush to
    #[arg(short, long, default_value = packer::DEFAULT_DISPLAY)]
    display: String,

    /// Keep the image top-down instead of flipping it for the display's bottom-left origin
    #[arg(long)]
    no_flip: bool,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .target(env_logger::Target::Stderr)
        .init();

    let config = PackerConfig {
        budget: args.budget,
        display: args.display.clone(),
    };
    config.validate().context("Invalid options")?;

    let mut grid = decode::load(&args.input)
        .with_context(|| format!("Error reading {}", args.input.display()))?;
    if !args.no_flip {
        grid.flip_vertical();
    }

    let mapper = Mapper::new(args.mode, grid.width(), grid.height(), args.resolution)
        .context("Invalid options")?;
    let groups = scan(&grid);
    let programs = packer::pack(&groups, &mapper, &config)?;
    info!(
        "{}x{} image -> {} rectangles in {} colors -> {} programs.",
        grid.width(),
        grid.height(),
        groups.rect_count(),
        groups.color_count(),
        programs.len()
    );

    let out_dir = args.output.unwrap_or_else(|| default_output_dir(&args.input));
    output::write_programs(&out_dir, &programs)
        .with_context(|| format!("Error writing programs to {}", out_dir.display()))?;
    info!("Result saved to {}", out_dir.display());
    Ok(())
}

// Sits next to the input and is named after it.
fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{stem}_mlog"))
}
