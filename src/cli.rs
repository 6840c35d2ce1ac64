// ============================================================================
// UVMapEdit CLI — headless remap / bake via command-line arguments
// ============================================================================
//
// Usage examples:
//   uvmapedit --map map.png --texture tex.png --output preview.png
//   uvmapedit -m map.png -e 3,4=10,12 -e 0,0=1,1 --bake edited-map.png
//   uvmapedit -m map.png -t tex.png -e 5,5=0,0 -o out.png -b baked.png -v
//
// No GUI is opened in CLI mode. Edits are applied in argument order, so a
// later edit of the same map pixel wins.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgGroup, Parser};

use crate::canvas::ImageCoordinate;
use crate::error::{ImageSlot, RemapError};
use crate::io::{load_png_file, write_png_file};
use crate::session::Session;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// One `--edit X,Y=U,V`: point map pixel (X, Y) at texture pixel (U, V).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditArg {
    pub target: ImageCoordinate,
    pub source: ImageCoordinate,
}

/// UVMapEdit headless UV-map processor.
#[derive(Parser, Debug)]
#[command(
    name = "uvmapedit",
    about = "UVMapEdit headless UV-map remapper",
    long_about = "Apply pixel edits to a UV map, render the remapped texture, and bake\n\
                  the edited map without opening the GUI. Inputs and outputs are PNG.\n\n\
                  Example:\n  \
                  uvmapedit --map map.png --texture tex.png --edit 3,4=10,12 --output out.png",
    group(ArgGroup::new("action").required(true).multiple(true).args(["output", "bake"]))
)]
pub struct CliArgs {
    /// UV map PNG. Each pixel's R is U and max(G, B) is V.
    #[arg(short, long, value_name = "MAP.png")]
    pub map: PathBuf,

    /// Texture PNG sampled through the map. Required for --output.
    #[arg(short, long, value_name = "TEXTURE.png")]
    pub texture: Option<PathBuf>,

    /// Map edit `X,Y=U,V`. Repeatable.
    #[arg(short, long = "edit", value_name = "X,Y=U,V", value_parser = parse_edit)]
    pub edits: Vec<EditArg>,

    /// Write the remapped output image here.
    #[arg(short, long, value_name = "FILE", requires = "texture")]
    pub output: Option<PathBuf>,

    /// Write the edited map here.
    #[arg(short, long, value_name = "FILE")]
    pub bake: Option<PathBuf>,

    /// Print each applied edit and per-step timing.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process arguments.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--map" || a == "-m")
    }
}

fn parse_pair(s: &str) -> Result<ImageCoordinate, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `X,Y`, got `{}`", s))?;
    let x = x.trim().parse::<u32>().map_err(|e| format!("bad x `{}`: {}", x.trim(), e))?;
    let y = y.trim().parse::<u32>().map_err(|e| format!("bad y `{}`: {}", y.trim(), e))?;
    Ok(ImageCoordinate::new(x, y))
}

/// Parse `X,Y=U,V`.
pub fn parse_edit(s: &str) -> Result<EditArg, String> {
    let (target, source) = s
        .split_once('=')
        .ok_or_else(|| format!("expected `X,Y=U,V`, got `{}`", s))?;
    Ok(EditArg {
        target: parse_pair(target)?,
        source: parse_pair(source)?,
    })
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the headless pipeline and return an OS exit code.
/// `0` = every requested file written, `1` = anything failed.
pub fn run(args: CliArgs) -> ExitCode {
    match run_session(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_session(args: &CliArgs) -> Result<(), RemapError> {
    crate::logger::mirror_to_stderr(args.verbose);
    let start = Instant::now();
    let mut session = Session::new();

    // -- Step 1: Load ----------------------------------------------------
    session.install(ImageSlot::Map, load_png_file(&args.map)?);
    if let Some(texture) = &args.texture {
        session.install(ImageSlot::Texture, load_png_file(texture)?);
    }
    if args.verbose {
        println!("loaded inputs in {:.1?}", start.elapsed());
    }

    // -- Step 2: Edits ---------------------------------------------------
    for edit in &args.edits {
        session.commit_edit(edit.target, edit.source)?;
        if args.verbose {
            println!(
                "  edit ({}, {}) -> uv ({}, {})",
                edit.target.x, edit.target.y, edit.source.x, edit.source.y
            );
        }
    }

    // -- Step 3: Write ---------------------------------------------------
    if let Some(path) = &args.output {
        let t = Instant::now();
        let output = session.recomposite()?;
        write_png_file(output, path)?;
        if args.verbose {
            println!("wrote {} in {:.1?}", path.display(), t.elapsed());
        }
    }

    if let Some(path) = &args.bake {
        let baked = session
            .export()
            .ok_or(RemapError::CompositorInputMissing(ImageSlot::Map))?;
        write_png_file(&baked, path)?;
        if args.verbose {
            println!("baked {} edit(s) into {}", session.ledger().len(), path.display());
        }
    }

    Ok(())
}
