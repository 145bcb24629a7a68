use std::process::ExitCode;

use clap::Parser;
use log::{ error, info };

use gridtrace::consts::{ DEFAULT_OUT_FILE, DEFAULT_TILE_SIZE };
use gridtrace::error::Result;
use gridtrace::parallel::{ default_thread_count, render_parallel };
use gridtrace::scene_file::load_scene;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Path to the JSON scene description.
    scene: String,

    /// Where to write the rendered PPM image.
    #[clap(short, long, default_value = DEFAULT_OUT_FILE)]
    output: String,

    /// Render thread count; defaults to every core but one.
    #[clap(short, long)]
    threads: Option<usize>,

    /// Tile edge length in pixels.
    #[clap(long, default_value_t = DEFAULT_TILE_SIZE)]
    tile_size: usize,
}

fn run(args: &Args) -> Result<()> {
    let scene = load_scene(&args.scene)?;
    let threads = args.threads.unwrap_or_else(default_thread_count);

    info!("rendering {} ({}x{}) with {} threads",
        args.scene, scene.camera().width(), scene.camera().height(),
        threads);

    let canvas = render_parallel(scene, threads, args.tile_size)?;
    canvas.save(&args.output)?;

    info!("wrote {}", args.output);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
