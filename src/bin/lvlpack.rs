//! Repack an LDtk export into the runtime's binary level-pack format.
//!
//! Run with: cargo run --bin lvlpack -- levels.ldtk

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

use lvlpack::{
    decode_pack, ldtk, read_pack, resolve_tile_types, write_pack, EntityMode, Error, Level,
};

/// Default tileset whose enum tags define the tile-type mapping.
const DEFAULT_TILESET: &str = "Items_spritesheet";
const OUTPUT_EXTENSION: &str = "lvldata";

#[derive(Parser)]
#[command(name = "lvlpack")]
#[command(about = "Repack an LDtk export into a binary level pack")]
struct Cli {
    /// LDtk export to convert
    input: PathBuf,

    /// Tileset whose enum tags define the tile-type mapping
    #[arg(long, default_value = DEFAULT_TILESET)]
    tileset: String,

    /// How entity placements land on the grid
    #[arg(long, value_enum, default_value_t = EntityMode::Overlay)]
    entity_mode: EntityMode,

    /// Output path (default: input with the extension replaced by
    /// .lvldata, plus .zst when compressing)
    #[arg(long)]
    output: Option<PathBuf>,

    /// zstd-compress the pack
    #[arg(long)]
    compress: bool,

    /// Re-read the written pack and compare it against the decoded levels
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let raw = fs::read_to_string(&cli.input)?;
    let doc: ldtk::Document = serde_json::from_str(&raw)?;

    let tile_types = resolve_tile_types(&doc.defs, &cli.tileset)?;
    let decoded = decode_pack(&doc, &tile_types, cli.entity_mode)?;

    println!("{}: {} levels", cli.input.display(), decoded.len());
    for (level, unresolved) in &decoded {
        println!(
            "  {:<31} {}x{}  chests: {}  unresolved tiles: {}",
            level.meta.name,
            level.width,
            level.height,
            level.meta.chest_count,
            unresolved.len(),
        );
        for miss in unresolved {
            warn!(
                level = %level.meta.name,
                tile_id = miss.tile_id,
                cell = miss.cell_index,
                "tile has no type mapping, cell left empty"
            );
        }
    }

    let levels: Vec<Level> = decoded.into_iter().map(|(level, _)| level).collect();

    let output = output_path(cli);
    let file = fs::File::create(&output)?;
    write_pack(&levels, file, cli.compress)?;
    println!("wrote {}", output.display());

    if cli.verify {
        verify(&levels, &output, cli.compress)?;
        println!("verified {} levels", levels.len());
    }
    Ok(())
}

fn output_path(cli: &Cli) -> PathBuf {
    if let Some(out) = &cli.output {
        return out.clone();
    }
    let mut path = cli.input.with_extension(OUTPUT_EXTENSION);
    if cli.compress {
        path.as_mut_os_string().push(".zst");
    }
    path
}

fn verify(levels: &[Level], path: &Path, compressed: bool) -> Result<(), Error> {
    let raw = fs::read(path)?;
    let data = if compressed {
        zstd::stream::decode_all(&raw[..])?
    } else {
        raw
    };

    let reread = read_pack(&data)?;
    if reread.len() != levels.len() {
        return Err(Error::InvalidPack(format!(
            "wrote {} levels, read back {}",
            levels.len(),
            reread.len()
        )));
    }
    for (written, read) in levels.iter().zip(&reread) {
        if written.width != read.width
            || written.height != read.height
            || written.cells != read.cells
            || written.meta.name != read.meta.name
            || written.meta.chest_count != read.meta.chest_count
            || written.meta.tileset_selector != read.meta.tileset_selector
        {
            return Err(Error::InvalidPack(format!(
                "level {:?} did not round-trip",
                written.meta.name
            )));
        }
    }
    Ok(())
}
