//! Simulation configuration with documented constants
//!
//! All tuning numbers are collected here with explanations of their purpose
//! and how they interact with each other.

use serde::{Deserialize, Serialize};

/// Configuration for the faction simulation
///
/// These values have been tuned to produce good emergent behavior.
/// Changing them affects pacing and how quickly relations polarize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    // === TIME ===
    /// Simulated milliseconds added per tick
    ///
    /// One tick is one atomic unit of faction decision-making. The default
    /// (60_000) treats a tick as one simulated minute.
    pub tick_interval_ms: u64,

    // === RANDOM EVENTS ===
    /// Multiplier on the per-tick random event chance
    ///
    /// The raw chance is 0.1 per tick; this scales it. At 1.0 a world sees
    /// roughly one spontaneous event every ten ticks. Set to 0.0 for fully
    /// quiet worlds in tests.
    pub random_event_frequency: f64,

    // === ACTION POINTS ===
    /// Power above this grants a bonus action point per tick
    pub power_action_bonus: f64,

    /// Cohesion above this grants a bonus action point per tick
    pub cohesion_action_bonus: f64,

    /// Corruption above this costs an action point per tick
    pub corruption_action_penalty: f64,

    /// Isolation above this costs an action point per tick
    pub isolation_action_penalty: f64,

    // === FOCUS SELECTION ===
    /// Power below this pushes a faction toward military buildup
    pub low_power_threshold: f64,

    /// Wealth below this pushes a faction toward economic focus
    pub low_wealth_threshold: f64,

    /// Influence below this pushes a faction toward diplomacy
    pub low_influence_threshold: f64,

    /// Cohesion below this pushes a faction toward internal development
    pub low_cohesion_threshold: f64,

    /// Corruption above this pushes a faction toward internal development
    pub high_corruption_threshold: f64,

    /// Isolation above this suppresses the diplomatic focus area
    pub diplomacy_isolation_cutoff: f64,

    /// Weight given to goal pursuit when goals exist
    ///
    /// At 0.5 or above, factions with goals always consider pursuing them;
    /// below that, goal pursuit only happens as a fallback.
    pub goal_focus: f64,

    /// When true, every faction considers a diplomatic move each tick
    /// regardless of its influence level
    pub advanced_diplomacy: bool,

    /// Expansion appetite gate
    ///
    /// Factions only attempt territorial expansion when this exceeds 0.8
    /// and their power is above 60. Kept configurable since it is a tuning
    /// choice, not an invariant.
    pub aggressiveness: f64,

    // === ACTION OUTCOMES ===
    /// Scales the success chance of territorial expansion
    ///
    /// Expansion succeeds when a uniform draw lands under
    /// (power / 100) * volatility, so 0.8 means even a maximally powerful
    /// faction fails one attempt in five.
    pub volatility: f64,

    /// Wealth cost of a military buildup action
    ///
    /// Buildup is skipped entirely when the faction cannot pay this.
    pub military_cost: f64,

    /// How many tick intervals an event stays fresh enough to react to
    pub event_freshness_ticks: u64,

    // === RELATIONSHIP DRIFT ===
    /// Isolation above this excludes a faction from the natural
    /// relationship drift pass
    ///
    /// Withdrawn factions neither warm to ideological kin nor sour over
    /// competing claims.
    pub drift_isolation_cutoff: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 60_000,
            random_event_frequency: 1.0,

            // Action points
            power_action_bonus: 70.0,
            cohesion_action_bonus: 60.0,
            corruption_action_penalty: 70.0,
            isolation_action_penalty: 80.0,

            // Focus selection
            low_power_threshold: 40.0,
            low_wealth_threshold: 30.0,
            low_influence_threshold: 50.0,
            low_cohesion_threshold: 40.0,
            high_corruption_threshold: 60.0,
            diplomacy_isolation_cutoff: 70.0,
            goal_focus: 0.7,
            advanced_diplomacy: true,
            aggressiveness: 0.5,

            // Outcomes
            volatility: 0.8,
            military_cost: 10.0,
            event_freshness_ticks: 2,

            // Drift
            drift_isolation_cutoff: 70.0,
        }
    }
}

impl SimulationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &std::path::Path) -> crate::core::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config
            .validate()
            .map_err(crate::core::error::DominionError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.volatility) {
            return Err(format!("volatility ({}) must be in [0, 1]", self.volatility));
        }

        if self.random_event_frequency < 0.0 {
            return Err("random_event_frequency must be non-negative".into());
        }

        // All state-scalar thresholds live on the [0, 100] scale
        let thresholds = [
            ("power_action_bonus", self.power_action_bonus),
            ("cohesion_action_bonus", self.cohesion_action_bonus),
            ("corruption_action_penalty", self.corruption_action_penalty),
            ("isolation_action_penalty", self.isolation_action_penalty),
            ("low_power_threshold", self.low_power_threshold),
            ("low_wealth_threshold", self.low_wealth_threshold),
            ("low_influence_threshold", self.low_influence_threshold),
            ("low_cohesion_threshold", self.low_cohesion_threshold),
            ("high_corruption_threshold", self.high_corruption_threshold),
            ("diplomacy_isolation_cutoff", self.diplomacy_isolation_cutoff),
            ("drift_isolation_cutoff", self.drift_isolation_cutoff),
        ];
        for (name, value) in thresholds {
            if !(0.0..=100.0).contains(&value) {
                return Err(format!("{} ({}) must be in [0, 100]", name, value));
            }
        }

        if self.military_cost < 0.0 {
            return Err("military_cost must be non-negative".into());
        }

        Ok(())
    }
}
