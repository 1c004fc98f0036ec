// Lever Sampling - seedable random exploration of a scenario's control space
// Each sample resets the screen, draws every control independently, and
// records the verdict and the clamped metrics.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use scenario_explorer::{ControlKind, ScenarioScreen};

use crate::report::{MetricTally, SamplingReport};

/// Draw one value per control. Sliders are uniform over their range; the
/// simulator snaps the draw onto the step grid.
fn draw(screen: &mut ScenarioScreen, rng: &mut ChaCha8Rng) {
    let controls: Vec<_> = screen
        .simulator()
        .controls()
        .iter()
        .map(|c| (c.name.clone(), c.kind))
        .collect();

    for (name, kind) in controls {
        let accepted = match kind {
            ControlKind::Continuous { min, max, .. } => {
                let value = if max > min { rng.gen_range(min..=max) } else { min };
                screen.set_control(&name, value)
            }
            ControlKind::Boolean { .. } => screen.set_flag(&name, rng.gen_bool(0.5)),
        };
        if let Err(e) = accepted {
            debug!(control = %name, error = %e, "sampled value rejected");
        }
    }
}

/// Run `samples` draws against `screen`, leaving it reset afterwards.
pub fn sample_levers(screen: &mut ScenarioScreen, samples: usize, seed: u64) -> SamplingReport {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tallies = vec![MetricTally::default(); screen.simulator().metric_specs().len()];
    let mut passed = 0usize;

    for _ in 0..samples {
        screen.reset();
        draw(screen, &mut rng);
        if screen.verdict().passed {
            passed += 1;
        }
        for (tally, reading) in tallies.iter_mut().zip(screen.simulator().metrics()) {
            tally.push(reading.value, reading.clamped);
        }
    }
    screen.reset();

    let metrics = screen
        .simulator()
        .metric_specs()
        .iter()
        .zip(&tallies)
        .map(|(spec, tally)| tally.summarize(&spec.name, &spec.label))
        .collect();

    SamplingReport {
        seed,
        samples,
        pass_rate: passed as f64 / samples.max(1) as f64,
        metrics,
    }
}
