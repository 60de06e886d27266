use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use engine::{CanvasHistory, Region, SequencePlan};
use ingest::place2017;

mod gif_sink;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PackFormat {
    /// Raw fixed-width binary edit log plus a base PNG
    Raw,
    /// Public CSV export (no base image)
    Csv,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Repack source data into an archive of palette, base image and edits
    Pack {
        in_file: PathBuf,
        out_file: PathBuf,
        #[clap(long, value_enum, default_value = "raw")]
        format: PackFormat,
        /// Base PNG, required for raw logs
        #[clap(long)]
        base: Option<PathBuf>,
        #[clap(long, default_value_t = place2017::DATA_START_SECONDS)]
        data_start: u32,
        /// Canvas width for CSV input (raw input takes it from the base PNG)
        #[clap(long, default_value_t = place2017::CANVAS_WIDTH)]
        width: u16,
        #[clap(long, default_value_t = place2017::CANVAS_HEIGHT)]
        height: u16,
    },
    /// Render a region of the canvas at one instant to an image
    Render {
        archive_path: PathBuf,
        out_file: PathBuf,
        /// Seconds since epoch; if 0, render the state after the last edit
        #[clap(short, long, default_value = "0")]
        at: u32,
        /// Region corners as X1 Y1 X2 Y2 (inclusive); defaults to the full canvas
        #[clap(long, num_args = 4)]
        region: Option<Vec<u16>>,
        /// Fail loading when the edit stream is not in timestamp order
        #[clap(long)]
        strict: bool,
    },
    /// Assemble a timelapse GIF across a span of instants
    Timelapse {
        archive_path: PathBuf,
        out_file: PathBuf,
        /// First frame's instant; defaults to the archive's data start
        #[clap(long)]
        start: Option<u32>,
        #[clap(long, default_value = "120")]
        frames: u32,
        /// Seconds between frames
        #[clap(long, default_value = "600")]
        step: u32,
        #[clap(long, default_value = "30")]
        fps: u16,
        #[clap(long, num_args = 4)]
        region: Option<Vec<u16>>,
        #[clap(long)]
        strict: bool,
    },
}

fn parse_region(values: Option<&[u16]>, history: &CanvasHistory) -> Result<Region, Box<dyn Error>> {
    Ok(match values {
        Some([x1, y1, x2, y2]) => Region::new(*x1, *y1, *x2, *y2)?,
        Some(_) => unreachable!("clap enforces four region values"),
        None => Region::full(history.width(), history.height())?,
    })
}

fn load_history(path: &Path, strict: bool) -> Result<CanvasHistory, Box<dyn Error>> {
    log::info!("loading archive {}", path.display());
    Ok(ingest::load_history_from_archive(File::open(path)?, strict)?)
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Pack {
            in_file,
            out_file,
            format,
            base,
            data_start,
            width,
            height,
        } => {
            let packed = match format {
                PackFormat::Raw => {
                    let base = base.ok_or("--base is required for raw logs")?;
                    ingest::pack_raw(
                        &in_file,
                        &base,
                        &out_file,
                        &engine::Palette::place_2017(),
                        data_start,
                    )?
                }
                PackFormat::Csv => ingest::pack_csv(&in_file, &out_file, width, height)?,
            };
            log::info!("wrote {} ({packed} edits)", out_file.display());
        }
        Commands::Render {
            archive_path,
            out_file,
            at,
            region,
            strict,
        } => {
            let history = load_history(&archive_path, strict)?;
            let region = parse_region(region.as_deref(), &history)?;
            let at = if at == 0 {
                history.index().last_edit_seconds()
            } else {
                at
            };

            let snapshot = history.render(region, at)?;
            snapshot.to_image(history.palette())?.save(&out_file)?;
            log::info!("wrote {}", out_file.display());
        }
        Commands::Timelapse {
            archive_path,
            out_file,
            start,
            frames,
            step,
            fps,
            region,
            strict,
        } => {
            let history = load_history(&archive_path, strict)?;
            let region = parse_region(region.as_deref(), &history)?;
            let plan = SequencePlan {
                start_seconds: start.unwrap_or_else(|| history.data_start_seconds()),
                frame_count: frames,
                step_seconds: step,
                region,
            };

            let mut sink = gif_sink::GifFrameSink::new(File::create(&out_file)?, history.palette());
            history.render_animation(&plan, fps, None, &mut sink)?;
            log::info!("wrote {} ({} frames)", out_file.display(), frames);
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()) {
        log::error!("{err}");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
