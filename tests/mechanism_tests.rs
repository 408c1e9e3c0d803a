use ordnance::mechanisms::{MechanismDefinition, MechanismError, MechanismKind};
use ordnance::pipeline::{keys, PlayerInput};
use ordnance::turn::{resolve_turn, Armament, EquippedMechanism};

fn loadout() -> Vec<MechanismDefinition> {
    vec![
        MechanismDefinition::new(1, "Dial", MechanismKind::ElevationDial)
            .with_modifier("degrees_per_click", 1.0)
            .with_modifier("min_angle", 5.0)
            .with_modifier("max_angle", 60.0)
            .with_modifier("variance", 0.02),
        MechanismDefinition::new(2, "Cartridge", MechanismKind::Cartridge)
            .with_modifier("base_velocity", 300.0)
            .with_modifier("velocity_per_charge", 60.0)
            .with_modifier("shell_weight", 20.0)
            .with_modifier("caliber", 0.105),
        MechanismDefinition::new(3, "Barrel", MechanismKind::Barrel)
            .with_modifier("quality", 0.97),
        MechanismDefinition::new(4, "Recoil", MechanismKind::Recoil)
            .with_modifier("recovery_time", 1.5)
            .with_modifier("noise_per_velocity", 0.0005),
        MechanismDefinition::new(5, "Breech", MechanismKind::Breech)
            .with_modifier("load_time", 4.0),
        MechanismDefinition::new(6, "Sight", MechanismKind::Sight)
            .with_modifier("accuracy", 1.5),
    ]
}

fn player_input() -> PlayerInput {
    [
        (keys::ELEVATION_CLICKS.to_string(), 35.0),
        (keys::POWDER_CHARGES.to_string(), 2.0),
    ]
    .into_iter()
    .collect()
}

fn equipped(seed: u64) -> Vec<EquippedMechanism> {
    loadout()
        .into_iter()
        .map(|definition| EquippedMechanism::new(definition, seed))
        .collect()
}

#[test]
fn same_seed_resolves_bit_identically() {
    let a = resolve_turn(&equipped(77), &player_input()).unwrap();
    let b = resolve_turn(&equipped(77), &player_input()).unwrap();
    assert_eq!(a.ballistic_attributes, b.ballistic_attributes);
    assert_eq!(a.turn_order_delay.to_bits(), b.turn_order_delay.to_bits());
    assert_eq!(
        serde_json::to_string(&a.assistance_data).unwrap(),
        serde_json::to_string(&b.assistance_data).unwrap()
    );
}

#[test]
fn different_seeds_produce_different_calibrations() {
    let a = resolve_turn(&equipped(1), &player_input()).unwrap();
    let b = resolve_turn(&equipped(2), &player_input()).unwrap();
    assert_ne!(
        a.ballistic_attributes.initial_velocity,
        b.ballistic_attributes.initial_velocity
    );
    assert_ne!(a.turn_order_delay, b.turn_order_delay);
}

#[test]
fn every_turn_of_a_match_reuses_the_same_calibration() {
    let armament = Armament::from_definitions(&loadout(), 9).unwrap();
    let first = armament.resolve_turn(&player_input()).unwrap();
    let second = armament.resolve_turn(&player_input()).unwrap();
    assert_eq!(first.ballistic_attributes, second.ballistic_attributes);
}

#[test]
fn runtimes_with_same_seed_but_different_ids_diverge() {
    let make = |id| {
        MechanismDefinition::new(id, "Cartridge", MechanismKind::Cartridge)
            .with_modifier("base_velocity", 300.0)
            .with_modifier("velocity_per_charge", 60.0)
            .with_modifier("shell_weight", 20.0)
            .with_modifier("caliber", 0.105)
    };
    let a = resolve_turn(&[EquippedMechanism::new(make(10), 5)], &player_input()).unwrap();
    let b = resolve_turn(&[EquippedMechanism::new(make(11), 5)], &player_input()).unwrap();
    assert_ne!(
        a.ballistic_attributes.initial_velocity,
        b.ballistic_attributes.initial_velocity
    );
}

#[test]
fn every_kind_fails_fast_without_modifiers() {
    for kind in MechanismKind::ALL {
        let bare = MechanismDefinition::new(1, format!("bare {kind}"), kind);
        let err = bare.to_runtime(0).unwrap_err();
        assert!(
            matches!(err, MechanismError::MissingModifier { .. }),
            "{kind}: {err}"
        );
    }
}

#[test]
fn every_kind_reports_its_tier_and_keys() {
    for kind in MechanismKind::ALL {
        let priority = kind.default_priority();
        assert!(kind.tier().contains(priority));
        for key in kind.output_keys() {
            assert!(ordnance::pipeline::is_symbolic_key(key), "{kind}: {key}");
        }
    }
}

#[test]
fn turn_resolution_carries_delay_ui_and_assistance() {
    let resolution = resolve_turn(&equipped(3), &player_input()).unwrap();
    assert!((4.3..=6.4).contains(&resolution.turn_order_delay));
    assert_eq!(resolution.ui_metadata.len(), 6);
    assert!(resolution.assistance_data.contains_key("estimated_range"));
    let angle = resolution.ballistic_attributes.angle_deg;
    assert!((30.0..=40.0).contains(&angle), "{angle}");
}
