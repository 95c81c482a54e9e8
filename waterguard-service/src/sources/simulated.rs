use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use time::{macros::datetime, Duration, PrimitiveDateTime};
use waterguard_client::domain::{UsageRecord, UsageSeries};

use crate::pipeline::{DataOrigin, PipelineError, Source};

pub const SIMULATED_DAYS: usize = 90;
pub const SIMULATED_HOURS: usize = SIMULATED_DAYS * 24;
pub const SIMULATION_START: PrimitiveDateTime = datetime!(2025-05-01 00:00);

const BASE_MEAN_LITERS: f64 = 12.0;
const BASE_STD_LITERS: f64 = 3.0;
pub const BASE_MIN_LITERS: f64 = 5.0;
pub const BASE_MAX_LITERS: f64 = 25.0;

pub const INJECTED_SPIKES: usize = 15;
pub const SPIKE_FACTOR_MIN: f64 = 2.0;
pub const SPIKE_FACTOR_MAX: f64 = 4.0;

/// A leak/spike planted into the simulated series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InjectedSpike {
    pub index: usize,
    pub base_liters: f64,
    pub factor: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub series: UsageSeries,
    pub spikes: Vec<InjectedSpike>,
}

/// Deterministic 90-day hourly usage scenario.
///
/// The same seed drives the base draw, the spike positions and the spike
/// factors, so a seed always yields the same series.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    seed: u64,
}

impl Simulator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn generate(&self) -> Result<Simulation, PipelineError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let base = Normal::new(BASE_MEAN_LITERS, BASE_STD_LITERS)
            .map_err(|e| PipelineError::InvalidInput(format!("invalid base usage distribution: {e}")))?;

        let mut usage: Vec<f64> = (0..SIMULATED_HOURS)
            .map(|_| base.sample(&mut rng).clamp(BASE_MIN_LITERS, BASE_MAX_LITERS))
            .collect();

        let mut spikes = Vec::with_capacity(INJECTED_SPIKES);
        for idx in index::sample(&mut rng, SIMULATED_HOURS, INJECTED_SPIKES).iter() {
            let factor = rng.gen_range(SPIKE_FACTOR_MIN..SPIKE_FACTOR_MAX);
            let base_liters = usage[idx];
            usage[idx] = base_liters * factor;
            spikes.push(InjectedSpike {
                index: idx,
                base_liters,
                factor,
            });
        }
        spikes.sort_by_key(|s| s.index);

        let records = usage
            .into_iter()
            .enumerate()
            .map(|(i, liters)| UsageRecord::new(SIMULATION_START + Duration::hours(i as i64), liters))
            .collect();

        Ok(Simulation {
            series: UsageSeries::from_records(records),
            spikes,
        })
    }
}

impl Source for Simulator {
    fn load(&self) -> Result<UsageSeries, PipelineError> {
        let sim = self.generate()?;
        tracing::info!(
            seed = self.seed,
            records = sim.series.len(),
            spikes = sim.spikes.len(),
            "using simulated usage data"
        );
        for spike in &sim.spikes {
            tracing::debug!(index = spike.index, factor = spike.factor, "injected spike");
        }
        Ok(sim.series)
    }

    fn origin(&self) -> DataOrigin {
        DataOrigin::Simulated
    }
}
