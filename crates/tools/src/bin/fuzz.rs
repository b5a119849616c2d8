use anyhow::{Result, bail};
use clap::Parser;
use log::debug;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use shipgen::{MapFactory, MapGenerationConfig, MapGeneratorType, validate};

/// Sweeps many seeds, sizes and generator types, collecting every
/// validation issue before reporting.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 300)]
    maps: u32,
    #[arg(long, default_value_t = 6)]
    min_side: usize,
    #[arg(long, default_value_t = 16)]
    max_side: usize,
}

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn side(rng: &mut ChaCha8Rng, min: usize, max: usize) -> usize {
    min + (rng.next_u64() % (max - min + 1) as u64) as usize
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.min_side > args.max_side {
        bail!("--min-side {} exceeds --max-side {}", args.min_side, args.max_side);
    }

    println!(
        "Starting map fuzz sweep on seed {} for {} maps ({}..={} per side)...",
        args.seed, args.maps, args.min_side, args.max_side
    );
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut issues = Vec::new();
    let mut digest = 0_u64;

    for _ in 0..args.maps {
        let kind = choose(&mut rng, &MapGeneratorType::GENERATIVE);
        let width = side(&mut rng, args.min_side, args.max_side);
        let height = side(&mut rng, args.min_side, args.max_side);
        let map_seed = rng.next_u64();
        let mut config = MapGenerationConfig::new(map_seed, width, height, kind);
        config.bonus_loot_count = Some((rng.next_u64() % 6) as usize);
        let context = format!("{kind} {width}x{height} seed {map_seed}");

        let map = match MapFactory::new(config).generate() {
            Ok(map) => map,
            Err(err) => {
                issues.push(format!("{context}: {err}"));
                continue;
            }
        };
        digest = digest.rotate_left(5) ^ map.fingerprint();
        debug!("{context}: fill {:.2}", map.fill_rate());

        let report = validate(&map);
        issues.extend(report.issues.into_iter().map(|issue| format!("{context}: {issue}")));
    }

    println!("Sweep digest: {digest:016x}");
    if !issues.is_empty() {
        for issue in &issues {
            println!("- {issue}");
        }
        bail!("{} issue(s) across {} maps", issues.len(), args.maps);
    }
    println!("Fuzzing completed successfully.");
    Ok(())
}
