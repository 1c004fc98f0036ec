// Scenario Explorer CLI - drive case-study screens from the terminal
// Seedable lever sampling with a JSON report per run
//
// Usage:
//   cargo run --bin explore -- --list                           # List built-in scenarios
//   cargo run --bin explore                                     # Render every scenario at defaults
//   cargo run --bin explore -- churn                            # Filter by id or title
//   cargo run --bin explore -- pricing --set price=15 --set annual_plan=on
//   cargo run --bin explore -- onboarding --select tour         # Show a stage's detail panel
//   cargo run --bin explore -- --samples 500 --seed 42 --json   # Sample levers, write report

mod report;
mod sampling;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use report::*;
use scenario_explorer::{catalog, ControlValue, DetailPanel, ScenarioScreen, ScreenView, StageId};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    list: bool,
    filter: Option<String>,
    select: Option<String>,
    sets: Vec<(String, String)>,
    samples: usize,
    seed: u64,
    json: bool,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        list: false,
        filter: None,
        select: None,
        sets: Vec::new(),
        samples: 0,
        seed: 0,
        json: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--list" => cli.list = true,
            "--json" => cli.json = true,
            "--select" => {
                i += 1;
                if i < args.len() {
                    cli.select = Some(args[i].clone());
                }
            }
            "--set" => {
                i += 1;
                match args.get(i).and_then(|kv| kv.split_once('=')) {
                    Some((name, value)) => cli.sets.push((name.to_string(), value.to_string())),
                    None => eprintln!("--set expects name=value"),
                }
            }
            "--samples" => {
                i += 1;
                if i < args.len() {
                    cli.samples = args[i].parse().unwrap_or(0);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Interaction ────────────────────────────────────────────────────────────

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Apply `--set` pairs that name a control of this screen. Pairs for other
/// scenarios are skipped silently so one command line can drive several.
fn apply_sets(screen: &mut ScenarioScreen, sets: &[(String, String)]) {
    for (name, value) in sets {
        if screen.simulator().control_value(name).is_none() {
            continue;
        }
        let result = match (parse_flag(value), value.parse::<f64>()) {
            (Some(on), _) => screen.set_flag(name, on),
            (None, Ok(v)) => screen.set_control(name, v),
            (None, Err(_)) => {
                eprintln!("  cannot parse value `{}` for `{}`", value, name);
                continue;
            }
        };
        if let Err(e) = result {
            warn!(scenario = screen.id(), error = %e, "--set rejected");
            eprintln!("  {}", e);
        }
    }
}

// ─── Printing ───────────────────────────────────────────────────────────────

fn print_view(view: &ScreenView) {
    println!("\n  {} [{}]", view.title, view.id);
    println!("  {}", "-".repeat(72));

    for control in &view.controls {
        println!("  {:<36} {:>12}", control.label, format_control(control.value));
    }
    println!();
    for metric in &view.metrics {
        let bound = |b: Option<f64>| b.map_or_else(|| "-".to_string(), |v| v.to_string());
        println!(
            "  {:<36} {:>12}   [{}, {}]",
            metric.label,
            metric.display,
            bound(metric.lower),
            bound(metric.upper)
        );
    }

    match &view.detail {
        DetailPanel::Empty => {}
        DetailPanel::Record(record) => {
            println!("\n  > {}", record.title);
            if !record.description.is_empty() {
                println!("    {}", record.description);
            }
            if !record.tools.is_empty() {
                println!("    Tools: {}", record.tools.join(", "));
            }
            if !record.outcome.is_empty() {
                println!("    Outcome: {}", record.outcome);
            }
        }
        DetailPanel::Placeholder { stage, message } => println!("\n  > {}: {}", stage, message),
    }

    let status = if view.verdict.passed { "PASS" } else { "FAIL" };
    println!("\n  {}  {}", status, view.verdict.message);
}

fn format_control(value: ControlValue) -> String {
    match value {
        ControlValue::Boolean(true) => "on".to_string(),
        ControlValue::Boolean(false) => "off".to_string(),
        ControlValue::Continuous(v) => format!("{}", v),
    }
}

fn print_sampling(report: &SamplingReport) {
    println!(
        "  Sampled {} lever settings (seed {}): {:.1}% pass",
        report.samples,
        report.seed,
        report.pass_rate * 100.0
    );
    for m in &report.metrics {
        println!(
            "    {:<34} mean {:>12.2} ±{:<8.2} range [{:.2}, {:.2}] clamped {:.0}%",
            m.label,
            m.mean,
            m.ci95,
            m.min,
            m.max,
            m.clamp_rate * 100.0
        );
    }
}

// ─── Report Output ──────────────────────────────────────────────────────────

fn write_report(report: &ExploreReport) -> std::io::Result<PathBuf> {
    let dir = Path::new("explore-results");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("explore-{}.json", report.timestamp));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();

    if cli.list {
        for def in catalog::all() {
            println!("  {:<28} {}", def.id, def.title);
        }
        return;
    }

    let to_run: Vec<_> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            catalog::all()
                .into_iter()
                .filter(|d| d.id.contains(&f_lower) || d.title.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => catalog::all(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    let mut reports = Vec::with_capacity(to_run.len());

    for def in to_run {
        let mut screen = ScenarioScreen::new(def);
        let issues: Vec<String> = screen.issues().iter().map(|e| e.to_string()).collect();
        for issue in &issues {
            println!("  note: {}", issue);
        }

        let sampling = (cli.samples > 0).then(|| {
            let report = sampling::sample_levers(&mut screen, cli.samples, cli.seed);
            print_sampling(&report);
            report
        });

        if let Some(stage) = &cli.select {
            screen.select_stage(&StageId::from(stage.as_str()));
        }
        apply_sets(&mut screen, &cli.sets);

        let view = screen.render();
        print_view(&view);

        reports.push(ScenarioReport {
            id: screen.id().to_string(),
            title: screen.title().to_string(),
            issues,
            view,
            sampling,
        });
    }
    println!();

    if cli.json {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let report = ExploreReport {
            timestamp: ts.to_string(),
            version: env!("CARGO_PKG_VERSION"),
            prng: "ChaCha8Rng",
            scenarios: reports,
        };
        match write_report(&report) {
            Ok(path) => println!("  Results saved to: {}\n", path.display()),
            Err(e) => {
                eprintln!("Failed to write report: {}", e);
                std::process::exit(1);
            }
        }
    }
}
