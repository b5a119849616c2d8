use std::collections::BTreeSet;

use proptest::{
    arbitrary::any,
    test_runner::{Config as ProptestConfig, TestCaseError, TestRunner},
};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use shipgen::mapgen::ascii;
use shipgen::{MapFactory, MapGenerationConfig, MapGeneratorType, Vector2, sanitize, validate};

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p]
}

fn run_fuzz_generation(map_seed: u64, shape_seed: u64) -> Result<(), String> {
    let mut rng = ChaCha8Rng::seed_from_u64(shape_seed);
    let kind = choose(&mut rng, &MapGeneratorType::GENERATIVE);
    let width = 6 + (rng.next_u64() % 11) as usize;
    let height = 6 + (rng.next_u64() % 11) as usize;
    let loot = (rng.next_u64() % 8) as usize;

    let mut config = MapGenerationConfig::new(map_seed, width, height, kind);
    config.bonus_loot_count = Some(loot);
    let context = format!("{kind} {width}x{height} map_seed {map_seed}");

    let factory = MapFactory::new(config);
    let map = factory.generate().map_err(|err| format!("{context}: {err}"))?;

    let report = validate(&map);
    if !report.is_valid {
        return Err(format!("Invariant failed: {context} is invalid: {:?}", report.issues));
    }
    if map.spawn_points.len() != factory.spawn_point_count() {
        return Err(format!("Invariant failed: {context} has the wrong spawn count"));
    }
    if map.bonus_loot.len() > loot {
        return Err(format!("Invariant failed: {context} placed more loot than requested"));
    }

    let floor: BTreeSet<Vector2> = map.cells.iter().map(|cell| cell.pos()).collect();
    for door in &map.doors {
        let [a, b] = door.segment;
        if !a.is_adjacent(b) || !floor.contains(&a) || !floor.contains(&b) {
            return Err(format!("Invariant failed: {context} door {} is not interior", door.id));
        }
    }

    if sanitize(&map) != map {
        return Err(format!("Invariant failed: {context} changes when sanitized again"));
    }

    let text = ascii::render(&map);
    let reparsed = ascii::parse(&text).map_err(|err| format!("{context}: {err}"))?;
    if ascii::render(&reparsed) != text {
        return Err(format!("Invariant failed: {context} ASCII does not survive a round trip"));
    }

    Ok(())
}

#[test]
fn test_fuzz_map_generation() {
    let mut runner = TestRunner::new(ProptestConfig::with_cases(96));
    let seeds = (any::<u64>(), any::<u64>());

    runner
        .run(&seeds, |(map_seed, shape_seed)| {
            run_fuzz_generation(map_seed, shape_seed).map_err(TestCaseError::fail)?;
            Ok(())
        })
        .expect("semantic fuzz generation should preserve invariants");
}

#[test]
fn test_fuzz_consecutive_seed_sweep() {
    let mut issues = Vec::new();
    for kind in MapGeneratorType::GENERATIVE {
        for seed in 0..100 {
            let side = 6 + (seed % 5) as usize;
            let config = MapGenerationConfig::new(seed, side, side + 1, kind);
            match MapFactory::new(config).generate() {
                Ok(map) => issues.extend(
                    validate(&map)
                        .issues
                        .into_iter()
                        .map(|issue| format!("{kind} seed {seed}: {issue}")),
                ),
                Err(err) => issues.push(format!("{kind} seed {seed}: {err}")),
            }
        }
    }
    assert!(issues.is_empty(), "{} issue(s):\n{}", issues.len(), issues.join("\n"));
}
