use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use shipgen::campaign::{CampaignDifficulty, EconomyMode, NodeType};
use shipgen::{GameRules, MapFactory, SectorMapGenerator, SectorNode, mission_config, validate};

fn ranks(nodes: &[SectorNode]) -> BTreeSet<usize> {
    nodes.iter().map(|node| node.rank).collect()
}

#[test]
fn growth_rate_controls_campaign_length() {
    let generator = SectorMapGenerator::new(123);
    let standard = GameRules { map_growth_rate: 1.0, ..GameRules::default() };
    assert_eq!(ranks(&generator.generate(&standard)), (0..=6).collect());

    let slow = GameRules { map_growth_rate: 0.5, ..GameRules::default() };
    assert_eq!(ranks(&generator.generate(&slow)), (0..=12).collect());
}

#[test]
fn sector_nodes_serialize_with_campaign_field_names() {
    let nodes = SectorMapGenerator::new(5).generate(&GameRules::default());
    let json = serde_json::to_value(&nodes[0]).expect("serialize");
    assert_eq!(json["id"], nodes[0].id.as_str());
    assert_eq!(json["type"], "Combat");
    assert_eq!(json["status"], "Accessible");
    assert!(json["mapSeed"].is_u64());
    assert!(json["bonusLootCount"].is_u64());
    assert!(json["position"]["x"].is_f64());

    let decoded: SectorNode = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, nodes[0]);
}

#[test]
fn every_mission_node_yields_a_playable_map() {
    let rules = GameRules::default();
    for node in SectorMapGenerator::new(31).generate(&rules) {
        if !node.node_type.is_combat() {
            continue;
        }
        let config = mission_config(&node, &rules);
        let map = MapFactory::new(config).generate().expect("mission map generates");
        let report = validate(&map);
        assert!(report.is_valid, "{}: {:?}", node.id, report.issues);
    }
}

#[test]
fn harsher_rules_skew_the_node_mix() {
    let count = |rules: &GameRules, kind: NodeType| -> usize {
        (0..200)
            .flat_map(|seed| SectorMapGenerator::new(seed).generate(rules))
            .filter(|node| node.node_type == kind)
            .count()
    };
    let standard = GameRules::default();
    let ironman = GameRules::for_difficulty(CampaignDifficulty::Ironman);
    let limited = GameRules { economy_mode: EconomyMode::Limited, ..GameRules::default() };

    assert!(count(&ironman, NodeType::Elite) > count(&standard, NodeType::Elite));
    assert!(count(&limited, NodeType::Shop) < count(&standard, NodeType::Shop));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]
    #[test]
    fn sector_links_respect_lanes_and_reachability(
        seed in any::<u64>(),
        growth in prop::sample::select(vec![0.5_f64, 0.75, 1.0, 1.5, 2.0, 3.0]),
    ) {
        let rules = GameRules { map_growth_rate: growth, ..GameRules::default() };
        let nodes = SectorMapGenerator::new(seed).generate(&rules);
        let last = SectorMapGenerator::rank_count(&rules) - 1;
        prop_assert_eq!(ranks(&nodes), (0..=last).collect::<BTreeSet<_>>());

        let by_id: BTreeMap<&str, &SectorNode> =
            nodes.iter().map(|node| (node.id.as_str(), node)).collect();
        prop_assert_eq!(by_id.len(), nodes.len());

        let mut incoming: BTreeSet<&str> = BTreeSet::new();
        let mut links: Vec<(usize, usize, usize)> = Vec::new();
        for node in &nodes {
            if node.rank < last {
                prop_assert!(!node.connections.is_empty(), "{} has no way forward", node.id);
            }
            for id in &node.connections {
                let target = by_id.get(id.as_str());
                prop_assert!(target.is_some(), "{} links to unknown {}", node.id, id);
                let target = target.copied().expect("checked above");
                prop_assert_eq!(target.rank, node.rank + 1);
                prop_assert!(target.lane.abs_diff(node.lane) <= 1);
                incoming.insert(id.as_str());
                links.push((node.rank, node.lane, target.lane));
            }
        }
        for node in nodes.iter().filter(|node| node.rank > 0) {
            prop_assert!(incoming.contains(node.id.as_str()), "{} is unreachable", node.id);
        }
        for &(rank, from_a, to_a) in &links {
            for &(other, from_b, to_b) in &links {
                prop_assert!(
                    !(rank == other && from_a < from_b && to_a > to_b),
                    "links cross at rank {}", rank
                );
            }
        }
        let bosses = nodes.iter().filter(|node| node.node_type == NodeType::Boss).count();
        prop_assert_eq!(bosses, 1);
    }
}
