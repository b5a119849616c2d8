mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use serde::de::DeserializeOwned;
use shipgen::campaign::CampaignDifficulty;
use shipgen::mapgen::{TileAssembly, TileDefinition, ascii, standard_tiles};
use shipgen::{
    MapDefinition, MapFactory, MapGenerationConfig, MapGenerator, MapGeneratorType,
    SectorMapGenerator, validate,
};

use crate::config::{MapOverrides, SectorOverrides, ToolConfig};

#[derive(Parser)]
#[command(author, version, about = "Generate and inspect procedural ship maps", long_about = None)]
struct Args {
    /// Optional TOML config; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one floor plan
    Map {
        #[arg(short, long)]
        seed: Option<u64>,
        #[arg(long)]
        width: Option<usize>,
        #[arg(long)]
        height: Option<usize>,
        /// TreeShip, DenseShip or Procedural
        #[arg(short = 't', long = "type")]
        kind: Option<MapGeneratorType>,
        #[arg(long)]
        spawns: Option<usize>,
        #[arg(long)]
        loot: Option<usize>,
        #[arg(short, long, value_enum, default_value_t = Format::Ascii)]
        format: Format,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a campaign sector map
    Sector {
        #[arg(short, long)]
        seed: Option<u64>,
        /// Simulation, Clone, Standard or Ironman
        #[arg(short, long)]
        difficulty: Option<CampaignDifficulty>,
        #[arg(short, long)]
        growth: Option<f64>,
        /// Generator type recorded for the sector's missions
        #[arg(short = 't', long = "type")]
        kind: Option<MapGeneratorType>,
        /// Fixed rank count instead of the growth-derived one
        #[arg(short, long)]
        ranks: Option<usize>,
        #[arg(short, long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Sanitize and validate a map file (JSON, or an ASCII drawing)
    Check {
        path: PathBuf,
    },
    /// Build a map from a JSON tile assembly
    Assemble {
        path: PathBuf,
        /// JSON array of extra tile definitions; same ids replace built-ins
        #[arg(long)]
        tiles: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Ascii)]
        format: Format,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Ascii,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = ToolConfig::load_optional(args.config.as_deref())?;

    match args.command {
        Command::Map { seed, width, height, kind, spawns, loot, format, output } => {
            let overrides = MapOverrides {
                seed,
                width,
                height,
                kind,
                spawn_point_count: spawns,
                bonus_loot_count: loot,
            };
            run_map(config.map_config(&overrides), format, output.as_deref())
        }
        Command::Sector { seed, difficulty, growth, kind, ranks, format } => {
            let overrides = SectorOverrides { seed, difficulty, growth_rate: growth, kind, ranks };
            run_sector(&config, &overrides, format)
        }
        Command::Check { path } => run_check(&path),
        Command::Assemble { path, tiles, format } => run_assemble(&path, tiles.as_deref(), format),
    }
}

fn run_map(config: MapGenerationConfig, format: Format, output: Option<&Path>) -> Result<()> {
    info!(
        "generating {} {}x{} map from seed {}",
        config.kind, config.width, config.height, config.seed
    );
    let map = MapFactory::new(config).generate().context("Map generation failed")?;

    let rendered = match format {
        Format::Ascii => ascii::render(&map) + "\n",
        Format::Json => serde_json::to_string_pretty(&map)? + "\n",
    };
    match output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write map file: {}", path.display()))?,
        None => print!("{rendered}"),
    }

    let report = validate(&map);
    for issue in &report.issues {
        warn!("{issue}");
    }
    eprintln!(
        "{} floor cells, {} doors, fill {:.2}, fingerprint {:016x}",
        map.cells.len(),
        map.doors.len(),
        map.fill_rate(),
        map.fingerprint()
    );
    Ok(())
}

fn run_sector(config: &ToolConfig, overrides: &SectorOverrides, format: Format) -> Result<()> {
    let (seed, rules) = config.sector_setup(overrides);
    let options = config.sector_options(overrides);
    let nodes = SectorMapGenerator::with_options(seed, options).generate(&rules);

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&nodes)?),
        Format::Ascii => {
            let mut rank = usize::MAX;
            for node in &nodes {
                if node.rank != rank {
                    rank = node.rank;
                    println!("rank {rank}");
                }
                let mission =
                    node.mission_type.map(|mission| format!(" {mission:?}")).unwrap_or_default();
                println!(
                    "  {:<10} {:<7}{} -> [{}]",
                    node.id,
                    format!("{:?}", node.node_type),
                    mission,
                    node.connections.join(", ")
                );
            }
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to deserialize {what} JSON"))
}

fn run_assemble(path: &Path, tiles: Option<&Path>, format: Format) -> Result<()> {
    let assembly: TileAssembly = read_json(path, "tile assembly")?;
    let mut library = standard_tiles();
    if let Some(tiles) = tiles {
        let extra: Vec<TileDefinition> = read_json(tiles, "tile library")?;
        library.extend(extra.into_iter().map(|tile| (tile.id.clone(), tile)));
    }
    info!("assembling {} tiles from {}", assembly.tiles.len(), path.display());
    let map = MapGenerator::new(0)
        .assemble(&assembly, &library)
        .with_context(|| format!("Failed to assemble {}", path.display()))?;

    match format {
        Format::Ascii => println!("{}", ascii::render(&map)),
        Format::Json => println!("{}", serde_json::to_string_pretty(&map)?),
    }
    let report = validate(&map);
    for issue in &report.issues {
        warn!("{issue}");
    }
    Ok(())
}

fn read_map(path: &Path) -> Result<MapDefinition> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file: {}", path.display()))?;
    if path.extension().is_some_and(|extension| extension == "json") {
        serde_json::from_str(&text).with_context(|| "Failed to deserialize map JSON")
    } else {
        ascii::parse(&text).with_context(|| "Failed to parse ASCII map")
    }
}

fn run_check(path: &Path) -> Result<()> {
    let layout = read_map(path)?;
    let map = MapGenerator::new(layout.fingerprint()).load(&layout);

    let dropped = layout.cells.len().saturating_sub(map.cells.len());
    if dropped > 0 {
        println!("Sanitizer dropped {dropped} unreachable or void cell(s).");
    }

    let report = validate(&map);
    if !report.is_valid {
        for issue in &report.issues {
            println!("- {issue}");
        }
        bail!("{} has {} validation issue(s)", path.display(), report.issues.len());
    }
    println!("{} is valid ({} floor cells).", path.display(), map.cells.len());
    Ok(())
}
