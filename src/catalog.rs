// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Scenario Explorer - Built-in Case Studies
// Each case study is one definition bundle; the engine has no per-screen code.

use crate::error::DefinitionError;
use crate::format::MetricFormat;
use crate::formula::{ControlValues, FnFormula, LinearFormula, RawMetrics, Term};
use crate::scenario::ScenarioDefinition;
use crate::threshold::Threshold;
use crate::types::{
    ControlSpec, DetailRecord, MetricBounds, MetricSpec, Position, StageCategory, StageEdge,
    StageNode,
};

// ─── Registry ───────────────────────────────────────────────────────────────

const SCENARIOS: &[(&str, fn() -> ScenarioDefinition)] = &[
    ("onboarding-activation", onboarding_activation),
    ("pricing-tier-experiment", pricing_tier_experiment),
    ("churn-reduction", churn_reduction),
    ("mobile-checkout", mobile_checkout),
    ("feature-prioritization", feature_prioritization),
];

pub fn scenario_ids() -> Vec<&'static str> {
    SCENARIOS.iter().map(|(id, _)| *id).collect()
}

pub fn definition(id: &str) -> Result<ScenarioDefinition, DefinitionError> {
    SCENARIOS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, build)| build())
        .ok_or_else(|| DefinitionError::UnknownScenario(id.to_string()))
}

pub fn all() -> Vec<ScenarioDefinition> {
    SCENARIOS.iter().map(|(_, build)| build()).collect()
}

// ─── Builders ───────────────────────────────────────────────────────────────

const COLUMN: f64 = 220.0;
const ROW: f64 = 120.0;

fn stage(id: &str, label: &str, category: StageCategory, col: u32, row: u32) -> StageNode {
    StageNode::new(id, label, category, Position::new(col as f64 * COLUMN, row as f64 * ROW))
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Narrative record. Optional sections are filled in with struct update.
fn detail(stage: &str, title: &str, description: &str, tools: &[&str]) -> DetailRecord {
    DetailRecord {
        stage: stage.into(),
        title: title.to_string(),
        description: description.to_string(),
        tools: strings(tools),
        ..DetailRecord::default()
    }
}

// ─── Onboarding Activation ──────────────────────────────────────────────────

fn onboarding_activation() -> ScenarioDefinition {
    ScenarioDefinition {
        id: "onboarding-activation".into(),
        title: "Onboarding Activation".into(),
        summary: "New sign-ups stalled before their first project. The team traced the drop \
                  to an empty first screen and rebuilt onboarding around a guided first win."
            .into(),
        stages: vec![
            stage("interviews", "User Interviews", StageCategory::Research, 0, 1),
            stage("funnel", "Funnel Analysis", StageCategory::Discovery, 1, 0),
            stage("hypothesis", "Activation Hypothesis", StageCategory::Strategy, 2, 1),
            stage("checklist", "Setup Checklist", StageCategory::Design, 3, 0),
            stage("tour", "Guided Tour", StageCategory::Design, 3, 2),
            stage("experiment", "A/B Build", StageCategory::Implementation, 4, 1),
            stage("rollout", "Staged Rollout", StageCategory::Launch, 5, 1),
            stage("activation", "Activation Lift", StageCategory::Outcome, 6, 1),
        ],
        edges: vec![
            StageEdge::new("interviews", "hypothesis"),
            StageEdge::new("funnel", "hypothesis"),
            StageEdge::new("hypothesis", "checklist"),
            StageEdge::new("hypothesis", "tour"),
            StageEdge::new("checklist", "experiment"),
            StageEdge::new("tour", "experiment"),
            StageEdge::new("experiment", "rollout").labelled("winner"),
            StageEdge::new("rollout", "activation"),
        ],
        details: vec![
            DetailRecord {
                rationale: "Quantitative data showed where users left, not why.".into(),
                feedback: "\"I didn't know what to do after signing up.\"".into(),
                outgoing_data: "Top five confusion points, ranked by frequency.".into(),
                ..detail(
                    "interviews",
                    "Twelve new-user interviews",
                    "Recorded sessions with users who signed up but never created a project.",
                    &["Zoom", "Dovetail"],
                )
            },
            DetailRecord {
                obstacles: "Event names were inconsistent between web and desktop.".into(),
                resolution: strings(&["Unified the tracking plan", "Backfilled two weeks of events"]),
                outgoing_data: "61% of sign-ups never reached the project editor.".into(),
                ..detail(
                    "funnel",
                    "Sign-up to first project funnel",
                    "Step-by-step conversion from account creation to the first saved project.",
                    &["Amplitude", "SQL"],
                )
            },
            DetailRecord {
                rationale: "Users who finish one project in week one retain at twice the rate.".into(),
                outcome: "Success metric: activation within seven days.".into(),
                ..detail(
                    "hypothesis",
                    "Activation hypothesis",
                    "A visible path to a first finished project lifts seven-day activation.",
                    &["Opportunity tree"],
                )
            },
            detail(
                "checklist",
                "Setup checklist",
                "A four-item checklist pinned to the empty dashboard.",
                &["Figma"],
            ),
            DetailRecord {
                obstacles: "The first prototype had nine steps and testers skipped it.".into(),
                resolution: strings(&["Cut to four steps", "Made every step skippable"]),
                ..detail(
                    "tour",
                    "Guided tour",
                    "An overlay tour that walks through creating and sharing a project.",
                    &["Figma", "Maze"],
                )
            },
            detail(
                "experiment",
                "A/B build",
                "Both variants shipped behind flags with a 50/50 split for new accounts.",
                &["LaunchDarkly"],
            ),
            DetailRecord {
                feedback: "Support volume dropped during the 25% stage.".into(),
                ..detail(
                    "rollout",
                    "Staged rollout",
                    "The winning variant went to 10%, 25%, then 100% of new accounts.",
                    &["LaunchDarkly", "Datadog"],
                )
            },
            DetailRecord {
                outcome: "Seven-day activation rose from 22% to 38%.".into(),
                ..detail(
                    "activation",
                    "Activation lift",
                    "Checklist and tour together beat either alone.",
                    &[],
                )
            },
        ],
        controls: vec![
            ControlSpec::boolean("checklist", "Setup checklist", false),
            ControlSpec::boolean("tour", "Guided tour", false),
            ControlSpec::continuous("email_nudges", "Nudge emails (first week)", 0.0, 6.0, 1.0, 0.0),
        ],
        metrics: vec![
            MetricSpec::new(
                "activation_rate",
                "7-day activation",
                22.0,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(1),
            ),
            MetricSpec::new(
                "time_to_value",
                "Days to first project",
                5.0,
                MetricBounds::at_least(0.5),
                MetricFormat::number(1),
            )
            .lower_is_better(),
            MetricSpec::new(
                "support_tickets",
                "Onboarding tickets / week",
                120.0,
                MetricBounds::at_least(0.0),
                MetricFormat::number(0),
            )
            .lower_is_better(),
        ],
        formula: LinearFormula::new(vec![
            Term::flag("checklist", "activation_rate", 8.0),
            Term::flag("checklist", "time_to_value", -1.0),
            Term::flag("tour", "activation_rate", 6.0),
            Term::flag("tour", "time_to_value", -1.5),
            Term::flag("tour", "support_tickets", -25.0),
            Term::scaled("email_nudges", "activation_rate", 1.5, 0.0),
            // Five or more nudges a week start drawing complaints.
            Term::step_above("email_nudges", "support_tickets", 5.0, 30.0),
        ])
        .into(),
        thresholds: vec![
            Threshold::at_least("activation_rate", 35.0),
            Threshold::equal_or_better("time_to_value", 3.5),
        ],
        success_message: "Activation target met: users reach a first project fast.".into(),
        guidance_message: "Activation is still short of 35% within 3.5 days. Combine the \
                           onboarding aids."
            .into(),
    }
}

// ─── Pricing Tier Experiment ────────────────────────────────────────────────

const PRICING_VISITORS: f64 = 10_000.0;
const PRICING_REFERENCE_PRICE: f64 = 19.0;
const PRICING_REFERENCE_TRIAL: f64 = 14.0;

/// Price elasticity is not additive, so this one is a closure.
fn pricing_formula(c: &ControlValues<'_>, raw: &mut RawMetrics<'_>) {
    let price = c.value("price");
    let annual = c.flag("annual_plan");
    let trial_days = c.value("trial_days");

    let elasticity = (PRICING_REFERENCE_PRICE / price).powf(1.3);
    let trial_lift = 1.0 + 0.01 * (trial_days - PRICING_REFERENCE_TRIAL);
    let annual_lift = if annual { 1.1 } else { 1.0 };
    let conversion = raw.baseline("conversion") * elasticity * trial_lift * annual_lift;

    let arpu = if annual { price * 0.85 } else { price };
    let mrr = PRICING_VISITORS * conversion / 100.0 * arpu;
    let churn = raw.baseline("churn") + (price - PRICING_REFERENCE_PRICE) * 0.08
        - if annual { 2.0 } else { 0.0 };

    raw.set("conversion", conversion);
    raw.set("arpu", arpu);
    raw.set("mrr", mrr);
    raw.set("churn", churn);
}

fn pricing_tier_experiment() -> ScenarioDefinition {
    ScenarioDefinition {
        id: "pricing-tier-experiment".into(),
        title: "Pricing Tier Experiment".into(),
        summary: "A single $19 plan left money on the table with teams and scared off \
                  individuals. The team tested price points, trials and annual billing."
            .into(),
        stages: vec![
            stage("win-loss", "Win/Loss Review", StageCategory::Research, 0, 0),
            stage("wtp", "Willingness-to-Pay Survey", StageCategory::Discovery, 1, 0),
            stage("packaging", "Tier Packaging", StageCategory::Strategy, 2, 0),
            stage("paywall", "Paywall Redesign", StageCategory::Design, 3, 0),
            stage("price-test", "Price Test", StageCategory::Implementation, 4, 0),
            stage("launch", "New Plans Live", StageCategory::Launch, 5, 0),
            stage("revenue", "MRR Impact", StageCategory::Outcome, 6, 0),
        ],
        edges: vec![
            StageEdge::new("win-loss", "wtp"),
            StageEdge::new("wtp", "packaging"),
            StageEdge::new("packaging", "paywall"),
            StageEdge::new("paywall", "price-test"),
            StageEdge::new("price-test", "packaging").labelled("iterate"),
            StageEdge::new("price-test", "launch"),
            StageEdge::new("launch", "revenue"),
        ],
        details: vec![
            DetailRecord {
                outgoing_data: "Price was the top loss reason for solo users only.".into(),
                ..detail(
                    "win-loss",
                    "Win/loss review",
                    "Sixty closed deals from the last two quarters, tagged by reason.",
                    &["Salesforce", "Gong"],
                )
            },
            DetailRecord {
                obstacles: "Respondents anchored on the current price.".into(),
                resolution: strings(&["Switched to a Van Westendorp question set"]),
                outgoing_data: "Acceptable range: $12 to $29 per seat.".into(),
                ..detail(
                    "wtp",
                    "Willingness-to-pay survey",
                    "In-product survey to active trial users.",
                    &["Typeform"],
                )
            },
            DetailRecord {
                rationale: "Teams valued admin controls, individuals valued price.".into(),
                ..detail(
                    "packaging",
                    "Tier packaging",
                    "Split features into Starter and Team tiers.",
                    &["Feature matrix"],
                )
            },
            detail(
                "paywall",
                "Paywall redesign",
                "Side-by-side tiers with annual savings shown up front.",
                &["Figma"],
            ),
            DetailRecord {
                obstacles: "Low weekly volume made the test slow to converge.".into(),
                resolution: strings(&["Ran for six weeks", "Dropped one arm halfway"]),
                ..detail(
                    "price-test",
                    "Price test",
                    "Three price arms on new visitors, sticky per account.",
                    &["Stripe", "Statsig"],
                )
            },
            detail("launch", "New plans live", "Existing customers kept their price for a year.", &[]),
            DetailRecord {
                outcome: "MRR from new sign-ups rose 14% with churn flat.".into(),
                ..detail("revenue", "MRR impact", "Measured over the first full quarter.", &["ChartMogul"])
            },
        ],
        controls: vec![
            ControlSpec::continuous(
                "price",
                "Monthly price ($)",
                9.0,
                49.0,
                1.0,
                PRICING_REFERENCE_PRICE,
            ),
            ControlSpec::boolean("annual_plan", "Annual billing option", false),
            ControlSpec::continuous(
                "trial_days",
                "Free trial (days)",
                0.0,
                30.0,
                1.0,
                PRICING_REFERENCE_TRIAL,
            ),
        ],
        metrics: vec![
            MetricSpec::new(
                "conversion",
                "Visitor to paid",
                4.0,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(2),
            ),
            MetricSpec::new(
                "arpu",
                "ARPU",
                19.0,
                MetricBounds::at_least(0.0),
                MetricFormat::usd(2),
            ),
            MetricSpec::new(
                "mrr",
                "New MRR",
                7_600.0,
                MetricBounds::at_least(0.0),
                MetricFormat::usd(0),
            ),
            MetricSpec::new(
                "churn",
                "Monthly churn",
                6.0,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(1),
            )
            .lower_is_better(),
        ],
        formula: FnFormula::new("pricing", pricing_formula).into(),
        thresholds: vec![
            Threshold::at_least("mrr", 9_000.0),
            Threshold::at_most("churn", 6.0),
        ],
        success_message: "New MRR clears $9,000 without raising churn.".into(),
        guidance_message: "Either MRR is under $9,000 or churn has crept above 6%.".into(),
    }
}

// ─── Churn Reduction ────────────────────────────────────────────────────────

fn churn_reduction() -> ScenarioDefinition {
    ScenarioDefinition {
        id: "churn-reduction".into(),
        title: "Churn Reduction".into(),
        summary: "Mid-market accounts churned quietly after onboarding. Customer success \
                  moved from reactive tickets to health-score driven outreach."
            .into(),
        stages: vec![
            stage("cohorts", "Cohort Analysis", StageCategory::Research, 0, 1),
            stage("exit-survey", "Exit Survey", StageCategory::Discovery, 1, 0),
            stage("health-score", "Health Score Model", StageCategory::Strategy, 2, 1),
            stage("playbook", "Outreach Playbook", StageCategory::Design, 3, 1),
            stage("alerts", "Alerting Pipeline", StageCategory::Implementation, 4, 1),
            stage("pilot", "CSM Pilot", StageCategory::Launch, 5, 1),
            stage("retention", "Retention", StageCategory::Outcome, 6, 1),
        ],
        edges: vec![
            StageEdge::new("cohorts", "exit-survey"),
            StageEdge::new("cohorts", "health-score"),
            StageEdge::new("exit-survey", "health-score"),
            StageEdge::new("health-score", "playbook"),
            StageEdge::new("playbook", "alerts"),
            StageEdge::new("alerts", "pilot"),
            StageEdge::new("pilot", "retention"),
        ],
        details: vec![
            DetailRecord {
                outgoing_data: "Churn concentrated in months 4 to 6.".into(),
                ..detail("cohorts", "Cohort analysis", "Monthly cohorts by plan and segment.", &["Looker"])
            },
            DetailRecord {
                feedback: "\"Nobody checked in after the kickoff call.\"".into(),
                ..detail("exit-survey", "Exit survey", "Three questions at cancellation.", &["Intercom"])
            },
            DetailRecord {
                obstacles: "Usage data lagged by a day.".into(),
                resolution: strings(&["Accepted daily granularity", "Weighted recent weeks higher"]),
                ..detail(
                    "health-score",
                    "Health score model",
                    "Seats used, weekly actives and support sentiment combined into one score.",
                    &["dbt", "Python"],
                )
            },
            detail(
                "playbook",
                "Outreach playbook",
                "Scripts and cadences per health band.",
                &["Notion"],
            ),
            detail(
                "alerts",
                "Alerting pipeline",
                "Score drops open a task for the account's CSM.",
                &["Gainsight", "Slack"],
            ),
            DetailRecord {
                rationale: "Testing cadence on a subset kept cost visible.".into(),
                ..detail("pilot", "CSM pilot", "Two CSMs ran the playbook on 80 accounts.", &[])
            },
            DetailRecord {
                outcome: "Monthly churn fell from 5.5% to 3.1%; NRR passed 100%.".into(),
                ..detail("retention", "Retention", "Compared against a holdout of 80 accounts.", &[])
            },
        ],
        controls: vec![
            ControlSpec::boolean("health_alerts", "Health-score alerts", false),
            ControlSpec::continuous("csm_touches", "CSM touches / quarter", 0.0, 8.0, 1.0, 0.0),
            ControlSpec::continuous("save_discount", "Save-offer discount (%)", 0.0, 30.0, 5.0, 0.0),
        ],
        metrics: vec![
            MetricSpec::new(
                "monthly_churn",
                "Monthly churn",
                5.5,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(1),
            )
            .lower_is_better(),
            MetricSpec::new(
                "nrr",
                "Net revenue retention",
                98.0,
                MetricBounds::at_least(0.0),
                MetricFormat::percent(0),
            ),
            MetricSpec::new(
                "cs_cost",
                "CS cost / quarter",
                0.0,
                MetricBounds::at_least(0.0),
                MetricFormat::usd(0),
            )
            .lower_is_better(),
        ],
        formula: LinearFormula::new(vec![
            Term::flag("health_alerts", "monthly_churn", -1.2),
            Term::flag("health_alerts", "nrr", 2.0),
            Term::scaled("csm_touches", "monthly_churn", -0.3, 0.0),
            Term::scaled("csm_touches", "nrr", 0.8, 0.0),
            Term::scaled("csm_touches", "cs_cost", 1_500.0, 0.0),
            // Over-contact reads as pressure.
            Term::step_above("csm_touches", "monthly_churn", 7.0, 0.4),
            Term::scaled("save_discount", "monthly_churn", -0.05, 0.0),
            Term::scaled("save_discount", "nrr", -0.3, 0.0),
            Term::step_above("save_discount", "nrr", 25.0, -4.0),
        ])
        .into(),
        thresholds: vec![
            Threshold::at_most("monthly_churn", 3.5),
            Threshold::at_least("nrr", 100.0),
            Threshold::at_most("cs_cost", 9_000.0),
        ],
        success_message: "Churn is under 3.5% with NRR above 100% inside the CS budget.".into(),
        guidance_message: "Discounts buy churn at the cost of NRR. Lean on outreach.".into(),
    }
}

// ─── Mobile Checkout ────────────────────────────────────────────────────────

fn mobile_checkout() -> ScenarioDefinition {
    ScenarioDefinition {
        id: "mobile-checkout".into(),
        title: "Mobile Checkout".into(),
        summary: "Mobile shoppers abandoned a twelve-field checkout at twice the desktop rate."
            .into(),
        stages: vec![
            stage("session-replays", "Session Replays", StageCategory::Research, 0, 0),
            stage("drop-off", "Field Drop-off", StageCategory::Discovery, 1, 0),
            stage("scope", "Checkout Scope", StageCategory::Strategy, 2, 0),
            stage("form", "Form Redesign", StageCategory::Design, 3, 0),
            stage("wallets", "Wallet Payments", StageCategory::Implementation, 4, 0),
            stage("release", "App Release", StageCategory::Launch, 5, 0),
            stage("completion", "Completion Rate", StageCategory::Outcome, 6, 0),
        ],
        edges: vec![
            StageEdge::new("session-replays", "drop-off"),
            StageEdge::new("drop-off", "scope"),
            StageEdge::new("scope", "form"),
            StageEdge::new("scope", "wallets"),
            StageEdge::new("form", "release"),
            StageEdge::new("wallets", "release"),
            StageEdge::new("release", "completion"),
        ],
        details: vec![
            detail(
                "session-replays",
                "Session replays",
                "Two hundred abandoned mobile checkouts, watched end to end.",
                &["FullStory"],
            ),
            DetailRecord {
                outgoing_data: "Address and phone fields caused 40% of exits.".into(),
                ..detail("drop-off", "Field drop-off", "Exit rate per form field.", &["Mixpanel"])
            },
            DetailRecord {
                rationale: "Fraud asked to keep phone capture for new accounts.".into(),
                ..detail("scope", "Checkout scope", "Which fields are required, and for whom.", &[])
            },
            DetailRecord {
                obstacles: "Address autocomplete failed for rural addresses.".into(),
                resolution: strings(&["Fallback to manual entry after one failed lookup"]),
                ..detail("form", "Form redesign", "Single-column form with autocomplete.", &["Figma"])
            },
            detail("wallets", "Wallet payments", "Apple Pay and Google Pay buttons above the form.", &["Stripe"]),
            detail("release", "App release", "Shipped in the 4.12 release for iOS and Android.", &[]),
            DetailRecord {
                outcome: "Mobile completion went from 48% to 71%.".into(),
                ..detail("completion", "Completion rate", "Four weeks after release.", &[])
            },
        ],
        controls: vec![
            ControlSpec::continuous("form_fields", "Form fields", 3.0, 15.0, 1.0, 12.0),
            ControlSpec::boolean("wallet_pay", "Wallet payments", false),
            ControlSpec::boolean("guest_checkout", "Guest checkout", false),
        ],
        metrics: vec![
            MetricSpec::new(
                "completion",
                "Checkout completion",
                48.0,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(1),
            ),
            MetricSpec::new(
                "checkout_seconds",
                "Median checkout time (s)",
                95.0,
                MetricBounds::at_least(10.0),
                MetricFormat::number(0),
            )
            .lower_is_better(),
            MetricSpec::new(
                "fraud_rate",
                "Fraud rate",
                0.4,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(2),
            )
            .lower_is_better(),
        ],
        formula: LinearFormula::new(vec![
            // Pivot at the current twelve fields.
            Term::scaled("form_fields", "completion", -2.5, 12.0),
            Term::scaled("form_fields", "checkout_seconds", 6.0, 12.0),
            Term::flag("wallet_pay", "completion", 9.0),
            Term::flag("wallet_pay", "checkout_seconds", -25.0),
            Term::flag("guest_checkout", "completion", 7.0),
            Term::flag("guest_checkout", "fraud_rate", 0.15),
        ])
        .into(),
        thresholds: vec![
            Threshold::at_least("completion", 65.0),
            Threshold::at_most("checkout_seconds", 60.0),
            Threshold::at_most("fraud_rate", 0.6),
        ],
        success_message: "Checkout is fast and completes without a fraud spike.".into(),
        guidance_message: "Completion below 65% or checkout over a minute. Trim the form.".into(),
    }
}

// ─── Feature Prioritization ─────────────────────────────────────────────────

const POINTS_PER_ENGINEER_SPRINT: f64 = 10.0;
const COST_PER_ENGINEER_SPRINT: f64 = 12_000.0;
const CORE_DEMAND: f64 = 240.0;
const DEFAULT_ENGINEERS: f64 = 6.0;
const DEFAULT_SPRINTS: f64 = 3.0;
/// Risk of a plan with no shortfall; every 30 points short adds one.
const BASE_RISK: f64 = 3.0;
const SHORTFALL_PER_RISK_POINT: f64 = 30.0;

/// Outputs of one roadmap plan. The declared baselines are the plan at the
/// control defaults, so a reset lands on them exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RoadmapPlan {
    scope: f64,
    risk: f64,
    value_multiple: f64,
    burn: f64,
}

impl RoadmapPlan {
    fn new(engineers: f64, sprints: f64, ai_assist: bool, cut_reporting: bool) -> Self {
        let capacity = engineers * sprints * POINTS_PER_ENGINEER_SPRINT;
        let mut demand = CORE_DEMAND;
        if ai_assist {
            demand += 80.0;
        }
        if cut_reporting {
            demand -= 60.0;
        }
        let scope = 100.0 * capacity / demand;
        let shortfall = (demand - capacity).max(0.0);
        // Thousandths of a multiple per percent of scope, kept integral so
        // the product is exact.
        let value_weight = if ai_assist { 24.0 } else { 16.0 };

        Self {
            scope,
            risk: BASE_RISK + shortfall / SHORTFALL_PER_RISK_POINT,
            value_multiple: scope.min(100.0) * value_weight / 1000.0,
            burn: capacity / POINTS_PER_ENGINEER_SPRINT * COST_PER_ENGINEER_SPRINT,
        }
    }

    fn at_defaults() -> Self {
        Self::new(DEFAULT_ENGINEERS, DEFAULT_SPRINTS, false, false)
    }
}

fn prioritization_formula(c: &ControlValues<'_>, raw: &mut RawMetrics<'_>) {
    let plan = RoadmapPlan::new(
        c.value("engineers"),
        c.value("sprints"),
        c.flag("ai_assist"),
        c.flag("cut_reporting"),
    );
    raw.set("scope_delivered", plan.scope);
    raw.set("roadmap_risk", plan.risk);
    raw.set("value_multiple", plan.value_multiple);
    raw.set("burn", plan.burn);
}

fn feature_prioritization() -> ScenarioDefinition {
    let baseline = RoadmapPlan::at_defaults();
    ScenarioDefinition {
        id: "feature-prioritization".into(),
        title: "Feature Prioritization".into(),
        summary: "Too many roadmap bets for one quarter. The team scored candidates and cut \
                  scope until the plan fit the team."
            .into(),
        stages: vec![
            stage("requests", "Request Backlog", StageCategory::Research, 0, 1),
            stage("scoring", "RICE Scoring", StageCategory::Discovery, 1, 1),
            stage("bets", "Quarterly Bets", StageCategory::Strategy, 2, 1),
            stage("specs", "Lean Specs", StageCategory::Design, 3, 1),
            stage("delivery", "Sprint Delivery", StageCategory::Implementation, 4, 1),
            stage("release-train", "Release Train", StageCategory::Launch, 5, 1),
            stage("review", "Quarter Review", StageCategory::Outcome, 6, 1),
        ],
        edges: vec![
            StageEdge::new("requests", "scoring"),
            StageEdge::new("scoring", "bets"),
            StageEdge::new("bets", "specs"),
            StageEdge::new("specs", "delivery"),
            StageEdge::new("delivery", "release-train"),
            StageEdge::new("release-train", "review"),
            StageEdge::new("review", "requests").labelled("next quarter"),
        ],
        // The quarter review has no write-up yet.
        details: vec![
            DetailRecord {
                outgoing_data: "143 open requests, 38 after de-duplication.".into(),
                ..detail(
                    "requests",
                    "Request backlog",
                    "Sales, support and customer requests pooled in one board.",
                    &["Productboard"],
                )
            },
            DetailRecord {
                obstacles: "Effort estimates varied threefold between teams.".into(),
                resolution: strings(&["Used t-shirt sizes", "Calibrated against last quarter"]),
                ..detail("scoring", "RICE scoring", "Reach, impact, confidence and effort per item.", &["Sheets"])
            },
            DetailRecord {
                rationale: "AI assist had the highest value per point but the widest estimate.".into(),
                ..detail("bets", "Quarterly bets", "Three bets plus a reporting refresh.", &[])
            },
            detail("specs", "Lean specs", "One-page specs with explicit non-goals.", &["Notion"]),
            detail("delivery", "Sprint delivery", "Two-week sprints, scope reviewed at each demo.", &["Linear"]),
            detail("release-train", "Release train", "Fortnightly releases behind flags.", &[]),
        ],
        controls: vec![
            ControlSpec::continuous("engineers", "Engineers", 2.0, 12.0, 1.0, DEFAULT_ENGINEERS),
            ControlSpec::continuous("sprints", "Sprints", 1.0, 6.0, 1.0, DEFAULT_SPRINTS),
            ControlSpec::boolean("ai_assist", "Include AI assist", false),
            ControlSpec::boolean("cut_reporting", "Cut reporting refresh", false),
        ],
        metrics: vec![
            MetricSpec::new(
                "scope_delivered",
                "Committed scope delivered",
                baseline.scope,
                MetricBounds::between(0.0, 100.0),
                MetricFormat::percent(0),
            ),
            MetricSpec::new(
                "roadmap_risk",
                "Roadmap risk (0-10)",
                baseline.risk,
                MetricBounds::at_most(10.0),
                MetricFormat::number(1),
            )
            .lower_is_better(),
            MetricSpec::new(
                "value_multiple",
                "Value delivered",
                baseline.value_multiple,
                MetricBounds::at_least(0.0),
                MetricFormat::multiplier(1),
            ),
            MetricSpec::new(
                "burn",
                "Engineering cost",
                baseline.burn,
                MetricBounds::at_least(0.0),
                MetricFormat::usd(0),
            )
            .lower_is_better(),
        ],
        formula: FnFormula::new("prioritization", prioritization_formula).into(),
        thresholds: vec![
            Threshold::at_least("scope_delivered", 90.0),
            Threshold::equal_or_better("roadmap_risk", 5.0),
            Threshold::at_least("value_multiple", 1.5),
            Threshold::at_most("burn", 300_000.0),
        ],
        success_message: "The plan fits the team and still delivers 1.5x value.".into(),
        guidance_message: "Commitments exceed capacity. Cut scope or add sprints within budget."
            .into(),
    }
}
