#![cfg(not(target_arch = "wasm32"))]

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    use scenario_explorer::catalog;
    use scenario_explorer::format::MetricFormat;
    use scenario_explorer::*;

    fn abc_definition() -> ScenarioDefinition {
        ScenarioDefinition {
            id: "abc".into(),
            title: "A to C".into(),
            summary: String::new(),
            stages: vec![
                StageNode::new("A", "A", StageCategory::Research, Position::new(0.0, 0.0)),
                StageNode::new("B", "B", StageCategory::Design, Position::new(200.0, 0.0)),
                StageNode::new("C", "C", StageCategory::Outcome, Position::new(400.0, 0.0)),
            ],
            edges: vec![StageEdge::new("A", "B"), StageEdge::new("B", "C")],
            details: vec![
                DetailRecord { stage: "A".into(), title: "About A".into(), ..Default::default() },
                DetailRecord { stage: "B".into(), title: "About B".into(), ..Default::default() },
            ],
            controls: vec![ControlSpec::boolean("X", "X", false)],
            metrics: vec![MetricSpec::new(
                "M",
                "M",
                20.0,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::number(0),
            )],
            formula: LinearFormula::new(vec![Term::flag("X", "M", 10.0)]).into(),
            thresholds: vec![Threshold::at_least("M", 30.0)],
            success_message: "M reached 30.".into(),
            guidance_message: "Turn X on.".into(),
        }
    }

    /// Random walk over a screen's controls. Returns nothing; the screen's
    /// final state is the only thing that should matter.
    fn random_walk(screen: &mut ScenarioScreen, rng: &mut ChaCha8Rng, steps: usize) {
        let controls = screen.simulator().controls().to_vec();
        for _ in 0..steps {
            let spec = &controls[rng.gen_range(0..controls.len())];
            match spec.kind {
                ControlKind::Continuous { min, max, .. } => {
                    // Deliberately overshoot the range now and then.
                    let span = max - min;
                    let v = rng.gen_range((min - span * 0.5)..=(max + span * 0.5));
                    screen.set_control(&spec.name, v).expect("slider accepts finite input");
                }
                ControlKind::Boolean { .. } => {
                    screen.toggle(&spec.name).expect("toggle exists");
                }
            }
        }
    }

    fn metric_values(screen: &ScenarioScreen) -> Vec<f64> {
        screen.simulator().metrics().iter().map(|r| r.value).collect()
    }

    // ========== Catalog ==========

    #[test]
    fn test_catalog_scenarios_mount_and_serialize() {
        let ids = catalog::scenario_ids();
        assert_eq!(ids.len(), catalog::all().len());
        for id in ids {
            let def = catalog::definition(id).expect("registered id");
            let screen = ScenarioScreen::try_new(def).expect("no fatal definition issues");
            let json = serde_json::to_string(&screen.render()).expect("view serializes");
            assert!(json.contains(id));
        }
    }

    // ========== Stage Graph + Detail Lookup ==========

    #[test]
    fn test_missing_detail_renders_placeholder() {
        let mut screen = ScenarioScreen::new(abc_definition());

        let a = screen.dispatch(ScreenEvent::SelectStage { stage: "A".into() });
        assert_eq!(a.detail.record().map(|r| r.title.as_str()), Some("About A"));

        let b = screen.dispatch(ScreenEvent::SelectStage { stage: "B".into() });
        assert_eq!(b.detail.record().map(|r| r.title.as_str()), Some("About B"));

        let c = screen.dispatch(ScreenEvent::SelectStage { stage: "C".into() });
        assert_eq!(
            c.detail,
            DetailPanel::Placeholder { stage: "C".into(), message: detail::NO_DETAIL_MESSAGE }
        );
    }

    #[test]
    fn test_every_catalog_stage_yields_record_or_placeholder() {
        for def in catalog::all() {
            let mut screen = ScenarioScreen::new(def);
            let ids: Vec<StageId> = screen.graph().nodes().iter().map(|n| n.id.clone()).collect();
            for id in ids {
                screen.select_stage(&id);
                match screen.detail_panel() {
                    DetailPanel::Record(r) => assert_eq!(r.stage, id),
                    DetailPanel::Placeholder { stage, .. } => assert_eq!(stage, id),
                    DetailPanel::Empty => panic!("selected stage {} rendered empty", id),
                }
            }
        }
    }

    #[test]
    fn test_unknown_selection_keeps_current() {
        let mut screen = ScenarioScreen::new(abc_definition());
        screen.select_stage(&"B".into());
        let change = screen.select_stage(&"Z".into());
        assert_eq!(change, SelectionChange::Ignored("Z".into()));
        assert_eq!(screen.graph().selection(), Some(&StageId::from("B")));
    }

    #[test]
    fn test_selection_only_touches_graph_half() {
        let mut screen = ScenarioScreen::new(abc_definition());
        screen.toggle("X").expect("toggle exists");
        let before = metric_values(&screen);
        let recomputations = screen.simulator().recomputations();

        screen.select_stage(&"A".into());
        screen.select_stage(&"C".into());
        screen.clear_selection();

        assert_eq!(metric_values(&screen), before);
        assert_eq!(screen.simulator().recomputations(), recomputations);
    }

    // ========== Simulator ==========

    #[test]
    fn test_toggle_twenty_thirty_twenty() {
        let mut screen = ScenarioScreen::new(abc_definition());
        assert_eq!(screen.simulator().metric("M"), Some(20.0));
        screen.toggle("X").expect("toggle exists");
        assert_eq!(screen.simulator().metric("M"), Some(30.0));
        screen.toggle("X").expect("toggle exists");
        assert_eq!(screen.simulator().metric("M"), Some(20.0));
    }

    #[test]
    fn test_sum_past_upper_bound_renders_exactly_bound() {
        let mut def = abc_definition();
        def.controls.push(ControlSpec::continuous("boost", "Boost", 0.0, 100.0, 1.0, 0.0));
        def.formula = LinearFormula::new(vec![
            Term::flag("X", "M", 20.0),
            Term::scaled("boost", "M", 1.0, 0.0),
        ])
        .into();
        let mut screen = ScenarioScreen::new(def);
        screen.toggle("X").expect("toggle exists");
        screen.set_control("boost", 100.0).expect("slider exists");

        // 20 + 20 + 100 = 140
        let reading = &screen.simulator().metrics()[0];
        assert_eq!(reading.raw, 140.0);
        assert_eq!(reading.value, 100.0);
        assert_eq!(screen.render().metrics[0].display, "100");
    }

    #[test]
    fn test_metrics_stay_within_bounds_under_random_walks() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for def in catalog::all() {
            let mut screen = ScenarioScreen::new(def);
            for _ in 0..25 {
                random_walk(&mut screen, &mut rng, 8);
                for (spec, reading) in
                    screen.simulator().metric_specs().iter().zip(screen.simulator().metrics())
                {
                    assert!(
                        spec.bounds.contains(reading.value),
                        "{} = {} escaped its bounds",
                        spec.name,
                        reading.value
                    );
                }
            }
        }
    }

    #[test]
    fn test_final_metrics_independent_of_path() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for def in catalog::all() {
            for _ in 0..10 {
                let mut walked = ScenarioScreen::new(def.clone());
                let steps = rng.gen_range(1..40);
                random_walk(&mut walked, &mut rng, steps);

                // Jump straight to the walk's final control values.
                let mut direct = ScenarioScreen::new(def.clone());
                let finals: Vec<(String, ControlValue)> = walked
                    .simulator()
                    .controls()
                    .iter()
                    .zip(walked.simulator().state().values())
                    .map(|(c, v)| (c.name.clone(), *v))
                    .collect();
                for (name, value) in finals {
                    let applied = match value {
                        ControlValue::Continuous(v) => direct.set_control(&name, v),
                        ControlValue::Boolean(on) => direct.set_flag(&name, on),
                    };
                    applied.expect("control exists");
                }

                assert_eq!(metric_values(&walked), metric_values(&direct), "{}", def.id);
                assert_eq!(walked.verdict(), direct.verdict());
            }
        }
    }

    #[test]
    fn test_reset_reproduces_baseline_exactly() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for def in catalog::all() {
            let id = def.id.clone();
            let mut screen = ScenarioScreen::new(def);
            let defaults = screen.simulator().state().clone();

            random_walk(&mut screen, &mut rng, 30);
            screen.dispatch(ScreenEvent::Reset);

            let sim = screen.simulator();
            assert_eq!(sim.state(), &defaults);
            for (spec, reading) in sim.metric_specs().iter().zip(sim.metrics()) {
                assert_eq!(
                    reading.value,
                    spec.bounds.clamp(spec.baseline),
                    "{}.{}: declared {} after reset {}",
                    id,
                    spec.name,
                    spec.baseline,
                    reading.value
                );
            }
        }
    }

    // ========== Threshold Evaluator ==========

    #[test]
    fn test_flipping_one_comparison_flips_verdict() {
        let def = catalog::definition("mobile-checkout").expect("registered id");
        let mut screen = ScenarioScreen::new(def);
        screen.set_control("form_fields", 6.0).expect("slider exists");
        screen.set_flag("wallet_pay", true).expect("toggle exists");
        assert!(screen.verdict().passed);

        // Completion drops to 63%, under the 65% target.
        screen.set_flag("wallet_pay", false).expect("toggle exists");
        let verdict = screen.verdict();
        assert!(!verdict.passed);
        assert_eq!(verdict.message, screen.evaluator().evaluate(screen.simulator().metrics()).message);

        screen.set_flag("wallet_pay", true).expect("toggle exists");
        assert!(screen.verdict().passed);
    }

    #[test]
    fn test_verdict_recomputed_on_every_render() {
        let mut screen = ScenarioScreen::new(abc_definition());
        assert!(!screen.render().verdict.passed);
        assert!(screen.dispatch(ScreenEvent::SetFlag { name: "X".into(), value: true }).verdict.passed);
        assert!(!screen.dispatch(ScreenEvent::Reset).verdict.passed);
    }

    // ========== JSON Definitions ==========

    const JSON_SCENARIO: &str = r#"{
        "id": "json-demo",
        "title": "JSON Demo",
        "stages": [
            { "id": "a", "label": "Ask", "category": "research", "position": { "x": 0, "y": 0 } },
            { "id": "b", "label": "Build", "category": "implementation" }
        ],
        "edges": [ { "from": "a", "to": "b" }, { "from": "b", "to": "ghost" } ],
        "details": [ { "stage": "a", "title": "Ask users", "tools": ["Survey"] } ],
        "controls": [
            { "name": "budget", "label": "Budget", "kind": "continuous", "min": 0, "max": 10, "step": 1, "default": 2 },
            { "name": "beta", "label": "Beta", "kind": "boolean", "default": false }
        ],
        "metrics": [
            {
                "name": "reach",
                "label": "Reach",
                "baseline": 10,
                "bounds": { "lower": 0, "upper": 50 },
                "format": { "style": "percent", "decimals": 1 }
            }
        ],
        "formula": {
            "type": "linear",
            "terms": [
                { "term": "scaled", "control": "budget", "metric": "reach", "per_unit": 3, "pivot": 2 },
                { "term": "flag", "control": "beta", "metric": "reach", "delta": 5 }
            ]
        },
        "thresholds": [ { "metric": "reach", "comparison": "at_least", "target": 30 } ],
        "success_message": "Reach hit 30%.",
        "guidance_message": "Spend more or open the beta."
    }"#;

    #[test]
    fn test_json_definition_mounts_and_reports_issues() {
        let def = ScenarioDefinition::from_json(JSON_SCENARIO).expect("valid json");
        let issues = def.validate();
        assert!(issues.iter().any(|i| matches!(i, DefinitionError::DanglingEdge { .. })));
        assert!(issues.contains(&DefinitionError::MissingDetail("b".into())));

        let mut screen = ScenarioScreen::new(def);
        assert_eq!(screen.graph().edges().len(), 1);
        assert_eq!(screen.simulator().metric("reach"), Some(10.0));

        // 10 + 3 * (9 - 2) + 5 = 36
        screen.set_control("budget", 9.0).expect("slider exists");
        let view = screen.dispatch(ScreenEvent::Toggle { name: "beta".into() });
        assert_eq!(view.metrics[0].display, "36.0%");
        assert!(view.verdict.passed);
        assert_eq!(view.verdict.message, "Reach hit 30%.");

        // 10 + 3 * 8 + 5 = 39, still inside the upper bound of 50.
        screen.set_control("budget", 250.0).expect("slider exists");
        assert_eq!(screen.simulator().metric("reach"), Some(39.0));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = ScenarioDefinition::from_json("{ \"id\": 3 }").err();
        assert!(matches!(err, Some(DefinitionError::Parse(_))));
    }

    #[test]
    fn test_event_stream_from_json() {
        let mut screen = ScenarioScreen::new(abc_definition());
        let events: Vec<ScreenEvent> = serde_json::from_str(
            r#"[
                { "type": "select_stage", "stage": "B" },
                { "type": "toggle", "name": "X" },
                { "type": "set_control", "name": "missing", "value": 1 },
                { "type": "select_next" }
            ]"#,
        )
        .expect("valid events");

        let mut last = None;
        for event in events {
            last = Some(screen.dispatch(event));
        }
        let view = last.expect("at least one event");
        assert_eq!(view.graph.selected, Some("C".into()));
        assert!(view.detail.is_placeholder());
        assert_eq!(view.metrics[0].value, 30.0);
    }
}
