//! Campaign ramp checks for level resolution.

use sock_match::core::{resolve_level, LevelConfigResolver, ObjectiveGenerator};

#[test]
fn test_campaign_gets_harder_monotonically() {
    let mut prev = resolve_level(1);
    for level in 2..=30 {
        let c = resolve_level(level);
        assert!(c.cell_count() >= prev.cell_count(), "level {level} grid shrank");
        assert!(c.num_colors >= prev.num_colors, "level {level} lost a color");
        assert!(c.target_matches >= prev.target_matches, "level {level}");
        assert!(c.move_limit <= prev.move_limit, "level {level}");
        assert!(
            c.stall_shuffle_interval_ms <= prev.stall_shuffle_interval_ms,
            "level {level}"
        );
        prev = c;
    }
}

#[test]
fn test_levels_past_the_campaign_clamp_to_the_last() {
    assert_eq!(resolve_level(31), resolve_level(30));
    assert_eq!(resolve_level(1_000), resolve_level(30));
    assert_eq!(resolve_level(0), resolve_level(1));
    assert_eq!(resolve_level(0).level, 1);
}

#[test]
fn test_target_color_cycles_within_the_palette() {
    for level in 1..=30 {
        let c = resolve_level(level);
        assert_eq!(u32::from(c.target_color), (level - 1) % u32::from(c.num_colors));
    }
}

#[test]
fn test_config_objective_matches_the_generator() {
    let resolver = LevelConfigResolver::default();
    for level in [1, 9, 22, 30] {
        let c = resolver.resolve(level);
        let generated = ObjectiveGenerator {
            num_colors: c.num_colors,
            base_point_per_match: resolver.base_point_per_match,
            max_levels: resolver.max_levels,
        }
        .objective(level);
        assert_eq!(c.objective(), generated);
    }
}

#[test]
fn test_custom_resolver_settings_flow_into_configs() {
    let resolver = LevelConfigResolver {
        max_levels: 10,
        base_point_per_match: 100,
        extra_spawn_rate: 1.0,
    };
    let first = resolver.resolve(1);
    assert_eq!(first.extra_spawn_rate, 1.0);
    assert_eq!(first.stars.two, first.target_matches * 100 + first.target_matches * 20);

    let last = resolver.resolve(10);
    assert_eq!(last.target_matches, 20);
    assert_eq!(last.move_limit, 10);
    assert_eq!(resolver.resolve(11), last);
}
