use serde::Deserialize;

/// Top-level Ergosim configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ErgosimConfig {
    /// Global RNG seed.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Queue model settings.
    #[serde(default)]
    pub queue: QueueToml,

    /// Simulation settings.
    #[serde(default)]
    pub simulation: SimulationToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueueToml {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_rate")]
    pub arrival_rate: f64,
    #[serde(default = "default_rate")]
    pub service_rate: f64,
    #[serde(default)]
    pub threshold: usize,
}

impl Default for QueueToml {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            arrival_rate: default_rate(),
            service_rate: default_rate(),
            threshold: 0,
        }
    }
}

fn default_capacity() -> usize {
    10
}
fn default_rate() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationToml {
    #[serde(default = "default_events_per_generation")]
    pub events_per_generation: u32,
    #[serde(default = "default_max_generations")]
    pub max_generations: u32,
    /// Tolerance in percent.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub trace: bool,
}

impl Default for SimulationToml {
    fn default() -> Self {
        Self {
            events_per_generation: default_events_per_generation(),
            max_generations: default_max_generations(),
            tolerance: default_tolerance(),
            trace: false,
        }
    }
}

fn default_events_per_generation() -> u32 {
    1000
}
fn default_max_generations() -> u32 {
    100
}
fn default_tolerance() -> f64 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg: ErgosimConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.queue.capacity, 10);
        assert_eq!(cfg.queue.threshold, 0);
        assert_eq!(cfg.simulation.events_per_generation, 1000);
        assert_eq!(cfg.simulation.max_generations, 100);
        assert_eq!(cfg.simulation.tolerance, 1.0);
        assert!(!cfg.simulation.trace);
    }

    #[test]
    fn full_document() {
        let cfg: ErgosimConfig = toml::from_str(
            r#"
            seed = 7

            [queue]
            capacity = 20
            arrival_rate = 4.5
            service_rate = 5.0
            threshold = 6

            [simulation]
            events_per_generation = 10000
            max_generations = 500
            tolerance = 0.1
            trace = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.queue.capacity, 20);
        assert_eq!(cfg.queue.arrival_rate, 4.5);
        assert_eq!(cfg.queue.service_rate, 5.0);
        assert_eq!(cfg.queue.threshold, 6);
        assert_eq!(cfg.simulation.events_per_generation, 10000);
        assert_eq!(cfg.simulation.max_generations, 500);
        assert_eq!(cfg.simulation.tolerance, 0.1);
        assert!(cfg.simulation.trace);
    }

    #[test]
    fn unknown_field_rejected() {
        let res: Result<ErgosimConfig, _> = toml::from_str("[queue]\nbuffer = 3\n");
        assert!(res.is_err());
    }
}
