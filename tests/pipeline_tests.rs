use ordnance::mechanisms::{
    AssistanceProvider, MechanismDefinition, MechanismKind, MechanismRuntime, Metadata,
};
use ordnance::pipeline::{
    keys, MechanismOrderer, PipelineContext, PipelineError, PipelineResolver, PipelineTransform,
    PlayerInput, TransformError, TransformOperation,
};
use serde_json::json;

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

/// Test double: emits fixed transforms, optional assistance, or fails.
#[derive(Debug)]
struct Scripted {
    definition: MechanismDefinition,
    transforms: Vec<(String, f64, TransformOperation)>,
    assistance: Option<Metadata>,
    fail: bool,
}

impl Scripted {
    fn new(id: u64, name: &str, priority: i32) -> Self {
        Self {
            definition: MechanismDefinition::new(id, name, MechanismKind::Breech)
                .with_priority(priority),
            transforms: Vec::new(),
            assistance: None,
            fail: false,
        }
    }

    fn emit(mut self, key: &str, value: f64, operation: TransformOperation) -> Self {
        self.transforms.push((key.to_string(), value, operation));
        self
    }

    fn assist(mut self, data: serde_json::Value) -> Self {
        self.assistance = data.as_object().cloned();
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn boxed(self) -> Box<dyn MechanismRuntime> {
        Box::new(self)
    }
}

impl MechanismRuntime for Scripted {
    fn definition(&self) -> &MechanismDefinition {
        &self.definition
    }

    fn resolve(&self, _context: &PipelineContext) -> Result<Vec<PipelineTransform>, PipelineError> {
        if self.fail {
            return Err(PipelineError::runtime(self.name(), "jammed"));
        }
        self.transforms
            .iter()
            .map(|(key, value, operation)| {
                PipelineTransform::new(key.clone(), *value, *operation).map_err(PipelineError::from)
            })
            .collect()
    }

    fn assistance(&self) -> Option<&dyn AssistanceProvider> {
        self.assistance.as_ref().map(|_| self as &dyn AssistanceProvider)
    }
}

impl AssistanceProvider for Scripted {
    fn assistance_data(&self, _context: &PipelineContext) -> Metadata {
        self.assistance.clone().unwrap_or_default()
    }
}

fn input(pairs: &[(&str, f64)]) -> PlayerInput {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn multiply_on_missing_key_yields_zero() {
    let mut context = PipelineContext::default();
    let stored = context
        .set_or_update(&PipelineTransform::multiply("initial_velocity", 1.5).unwrap())
        .unwrap();
    assert_eq!(stored, 0.0);
}

#[test]
fn increment_on_missing_key_yields_operand() {
    let mut context = PipelineContext::default();
    let stored = context
        .set_or_update(&PipelineTransform::increment("angle_deg", 2.5).unwrap())
        .unwrap();
    assert_eq!(stored, 2.5);
}

#[test]
fn set_ignores_player_input() {
    let mut context = PipelineContext::new(input(&[("angle_deg", 70.0)]));
    context
        .set_or_update(&PipelineTransform::set("angle_deg", 12.0).unwrap())
        .unwrap();
    assert_eq!(context.get("angle_deg"), Some(12.0));
}

#[test]
fn set_increment_multiply_chain() {
    let mut context = PipelineContext::default();
    for transform in [
        PipelineTransform::set("initial_velocity", 100.0).unwrap(),
        PipelineTransform::increment("initial_velocity", 20.0).unwrap(),
        PipelineTransform::multiply("initial_velocity", 1.5).unwrap(),
    ] {
        context.set_or_update(&transform).unwrap();
    }
    assert_eq!(context.get("initial_velocity"), Some(180.0));
}

#[test]
fn malformed_transforms_are_rejected_at_construction() {
    assert!(matches!(
        PipelineTransform::set("initial velocity", 1.0),
        Err(TransformError::InvalidKey(_))
    ));
    assert!(matches!(
        PipelineTransform::set("", 1.0),
        Err(TransformError::InvalidKey(_))
    ));
    assert!(matches!(
        PipelineTransform::parse("angle_deg", 1.0, "divide"),
        Err(TransformError::UnknownOperation(_))
    ));
    assert!(PipelineTransform::parse("angle_deg", 1.0, "increment").is_ok());
}

#[test]
fn orderer_sorts_by_priority_and_keeps_ties_stable() {
    let runtimes = vec![
        Scripted::new(1, "sight", 95).boxed(),
        Scripted::new(2, "dial", 5).boxed(),
        Scripted::new(3, "barrel", 25).boxed(),
        Scripted::new(4, "cartridge", 10).boxed(),
        Scripted::new(5, "second barrel", 25).boxed(),
    ];
    let names: Vec<&str> = MechanismOrderer::ordered(&runtimes)
        .into_iter()
        .map(|r| r.name())
        .collect();
    assert_eq!(names, vec!["dial", "cartridge", "barrel", "second barrel", "sight"]);
}

#[test]
fn later_mechanisms_see_earlier_transforms() {
    let runtimes = vec![
        Scripted::new(2, "modifier", 25)
            .emit("initial_velocity", 1.5, TransformOperation::Multiply)
            .boxed(),
        Scripted::new(1, "base", 10)
            .emit("initial_velocity", 100.0, TransformOperation::Set)
            .emit("initial_velocity", 20.0, TransformOperation::Increment)
            .boxed(),
    ];
    let player_input = PlayerInput::new();
    let resolver = PipelineResolver::new(&runtimes, &player_input);
    let attributes = resolver.ballistic_attributes().unwrap();
    approx_eq(attributes.initial_velocity, 180.0, 1e-12);
    assert_eq!(attributes.angle_deg, 45.0);
}

#[test]
fn runtime_error_aborts_the_turn() {
    let runtimes = vec![
        Scripted::new(1, "base", 10)
            .emit("initial_velocity", 100.0, TransformOperation::Set)
            .boxed(),
        Scripted::new(2, "jammed breech", 50).failing().boxed(),
    ];
    let player_input = PlayerInput::new();
    let err = PipelineResolver::new(&runtimes, &player_input)
        .resolve()
        .unwrap_err();
    match err {
        PipelineError::Aborted { mechanism, source } => {
            assert_eq!(mechanism, "jammed breech");
            assert!(matches!(*source, PipelineError::Runtime { .. }));
        }
        other => panic!("expected abort, got {other:?}"),
    }
}

#[test]
fn assistance_merges_in_order_last_writer_wins() {
    let runtimes = vec![
        Scripted::new(1, "late", 98)
            .assist(json!({"estimated_range": 900.0}))
            .boxed(),
        Scripted::new(2, "early", 91)
            .assist(json!({"estimated_range": 800.0, "estimated_bearing": 3.0}))
            .boxed(),
        Scripted::new(3, "silent", 50).boxed(),
    ];
    let player_input = PlayerInput::new();
    let data = PipelineResolver::new(&runtimes, &player_input)
        .assistance_data()
        .unwrap();
    assert_eq!(data["estimated_range"], json!(900.0));
    assert_eq!(data["estimated_bearing"], json!(3.0));
}

#[test]
fn ui_metadata_drops_empty_entries() {
    let breech = MechanismDefinition::new(7, "Breech", MechanismKind::Breech)
        .with_modifier("load_time", 5.0)
        .to_runtime(3)
        .unwrap();
    let runtimes = vec![breech, Scripted::new(8, "blank", 40).boxed()];
    let player_input = PlayerInput::new();
    let entries = PipelineResolver::new(&runtimes, &player_input).ui_metadata();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].mechanism_id, 7);
    assert_eq!(entries[0].slot_key, "breech");
    assert!(entries[0].metadata.contains_key("load_time"));
}

#[test]
fn dial_feeds_barrel_angle_offset() {
    let dial = MechanismDefinition::new(1, "Dial", MechanismKind::ElevationDial)
        .with_modifier("degrees_per_click", 1.0)
        .with_modifier("min_angle", 0.0)
        .with_modifier("max_angle", 80.0);
    let barrel = MechanismDefinition::new(2, "Barrel", MechanismKind::Barrel)
        .with_modifier("quality", 1.0)
        .with_modifier("accuracy_spread", 1.0);
    let runtimes = vec![barrel.to_runtime(11).unwrap(), dial.to_runtime(11).unwrap()];
    let player_input = input(&[(keys::ELEVATION_CLICKS, 40.0)]);
    let context = PipelineResolver::new(&runtimes, &player_input)
        .resolve()
        .unwrap();
    let angle = context.get(keys::ANGLE_DEG).unwrap();
    assert!((39.0..=41.0).contains(&angle), "{angle}");
    // Barrel multiplied a velocity nobody set.
    assert_eq!(context.get(keys::INITIAL_VELOCITY), Some(0.0));
}
