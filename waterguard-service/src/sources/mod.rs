pub mod simulated;
pub mod usage_csv_file;

pub use simulated::{InjectedSpike, Simulation, Simulator};
pub use usage_csv_file::UsageCsvSource;

use waterguard_client::domain::UsageSeries;

use crate::pipeline::{DataOrigin, PipelineError, Source};

/// Where the dashboard's series comes from: an upload when one is given,
/// otherwise the seeded simulation.
pub enum DataSource {
    Upload(UsageCsvSource),
    Simulated(Simulator),
}

impl DataSource {
    pub fn resolve(upload: Option<UsageCsvSource>, seed: u64) -> Self {
        match upload {
            Some(csv) => Self::Upload(csv),
            None => Self::Simulated(Simulator::new(seed)),
        }
    }
}

impl Source for DataSource {
    fn load(&self) -> Result<UsageSeries, PipelineError> {
        match self {
            Self::Upload(s) => s.load(),
            Self::Simulated(s) => s.load(),
        }
    }

    fn origin(&self) -> DataOrigin {
        match self {
            Self::Upload(s) => s.origin(),
            Self::Simulated(s) => s.origin(),
        }
    }
}
