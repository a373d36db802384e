//! Property tests for stage commits and navigation

use proptest::prelude::*;
use versionflow::*;

fn ctx() -> StageContext {
    StageContext::new().with_loaders(["fabric", "forge", "quilt", "neoforge"])
}

fn valid_inputs() -> Vec<StageInput> {
    vec![
        StageInput::Files(vec![VersionFile::new("mod.jar", 1024, "abc")]),
        StageInput::Details(VersionDetails::new("1.0.0", "1.0.0", ReleaseChannel::Release)),
        StageInput::loaders(["fabric"]),
        StageInput::targets(["1.20.1"]),
        StageInput::Environment(Environment::Both),
        StageInput::Dependencies(vec![]),
        StageInput::Changelog(String::new()),
    ]
}

fn arb_input_for(key: StageKey) -> BoxedStrategy<StageInput> {
    match key {
        StageKey::Files => ("[a-z]{1,12}\\.jar", 1u64..1_000_000, "[0-9a-f]{40}")
            .prop_map(|(name, size, hash)| {
                StageInput::Files(vec![VersionFile::new(name, size, hash)])
            })
            .boxed(),
        StageKey::Details => (
            "[A-Za-z][A-Za-z0-9 ]{0,30}",
            "[0-9]{1,2}\\.[0-9]{1,2}\\.[0-9]{1,2}",
            prop_oneof![
                Just(ReleaseChannel::Release),
                Just(ReleaseChannel::Beta),
                Just(ReleaseChannel::Alpha)
            ],
        )
            .prop_map(|(name, number, channel)| {
                StageInput::Details(VersionDetails::new(name, number, channel))
            })
            .boxed(),
        StageKey::Loaders => {
            proptest::sample::subsequence(vec!["fabric", "forge", "quilt", "neoforge"], 1..=4)
                .prop_map(StageInput::loaders)
                .boxed()
        }
        StageKey::Targets => prop::collection::btree_set("1\\.(1[6-9]|20)\\.[0-4]", 1..4)
            .prop_map(StageInput::Targets)
            .boxed(),
        StageKey::Environment => prop_oneof![
            Just(Environment::ClientOnly),
            Just(Environment::ServerOnly),
            Just(Environment::Both),
            Just(Environment::Neither)
        ]
        .prop_map(StageInput::Environment)
        .boxed(),
        StageKey::Dependencies => prop::collection::btree_set("[A-Za-z0-9]{8}", 0..4)
            .prop_map(|ids| {
                StageInput::Dependencies(
                    ids.into_iter()
                        .map(|id| Dependency::project(id, DependencyKind::Required))
                        .collect(),
                )
            })
            .boxed(),
        StageKey::Changelog => ".{0,200}".prop_map(StageInput::Changelog).boxed(),
    }
}

fn arb_stage_and_input() -> impl Strategy<Value = StageInput> {
    prop::sample::select(StageRegistry::global().ordered_stages()).prop_flat_map(arb_input_for)
}

fn completed_session() -> PipelineSession<'static> {
    let mut session =
        PipelineSession::start(StageRegistry::global(), StartMode::Wizard, None).unwrap();
    for input in valid_inputs() {
        session.submit_stage(input, &ctx()).unwrap();
    }
    session
}

/// Serialize every field except the one owned by `key`
fn fields_except(draft: &DraftVersion, key: StageKey) -> serde_json::Value {
    let mut value = serde_json::to_value(draft).unwrap();
    value.as_object_mut().unwrap().remove(key.as_str());
    value
}

proptest! {
    #[test]
    fn prop_resubmit_has_no_cross_stage_leakage(input in arb_stage_and_input()) {
        let mut session = completed_session();
        let before = session.draft().clone();
        let key = input.key();

        session.enter(key).unwrap();
        session.submit_stage(input, &ctx()).unwrap();

        prop_assert_eq!(fields_except(session.draft(), key), fields_except(&before, key));
    }

    #[test]
    fn prop_back_and_resubmit_is_identity(steps in 1usize..=7) {
        let registry = StageRegistry::global();
        let mut straight = PipelineSession::start(registry, StartMode::Wizard, None).unwrap();
        let mut with_back = PipelineSession::start(registry, StartMode::Wizard, None).unwrap();

        let inputs = valid_inputs();
        for input in inputs.iter().take(steps) {
            straight.submit_stage(input.clone(), &ctx()).unwrap();
            with_back.submit_stage(input.clone(), &ctx()).unwrap();
        }

        let reopened = with_back.back().unwrap();
        with_back.submit_stage(inputs[steps - 1].clone(), &ctx()).unwrap();

        prop_assert_eq!(reopened, inputs[steps - 1].key());
        prop_assert_eq!(straight.draft(), with_back.draft());
        prop_assert_eq!(straight.is_complete(), with_back.is_complete());
    }

    #[test]
    fn prop_complete_only_after_last_stage(steps in 0usize..=7) {
        let mut session =
            PipelineSession::start(StageRegistry::global(), StartMode::Wizard, None).unwrap();
        for input in valid_inputs().into_iter().take(steps) {
            session.submit_stage(input, &ctx()).unwrap();
        }
        prop_assert_eq!(session.is_complete(), steps == 7);
        prop_assert_eq!(session.progress(), (steps, 7));
    }
}
