//! Tunable constants for intersection tracing.
//!
//! The defaults were tuned for editor scenes measured in single units; scenes at
//! a very different scale should scale the distance tolerances accordingly.

use serde::{Deserialize, Serialize};

use crate::error::{McadError, Result};
use crate::traits::Validate;

/// Side length of the square trimming masks produced for the renderer.
pub const DEFAULT_TRIM_RESOLUTION: usize = 8192;

/// Settings for seeding, local refinement and curve continuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceSettings {
    /// Samples per parameter axis of the coarse seeding grid.
    pub seed_samples: usize,
    /// Upper bound on the number of ranked candidates refined while seeding.
    pub seed_attempts: usize,
    /// Distance below which a refined candidate is accepted as a seed.
    pub seed_tolerance: f64,
    /// Minimal parameter distance between the two halves of a self-intersection seed.
    pub distinct_parameters: f64,
    /// Conjugate-gradient iteration cap.
    pub cg_max_iterations: usize,
    /// A line-search step below this value ends the descent as converged.
    pub cg_min_step: f64,
    /// Upper end of the golden-section search interval.
    pub line_search_max: f64,
    /// Relative tolerance of the golden-section search.
    pub line_search_tolerance: f64,
    /// Newton iteration cap per continuation step.
    pub newton_max_iterations: usize,
    /// Residual norm below which a Newton step counts as converged.
    pub newton_tolerance: f64,
    /// Safety cap on points traced in one direction.
    pub max_points: usize,
}

impl TraceSettings {
    pub const DEFAULT_SEED_SAMPLES: usize = 5;
    pub const DEFAULT_SEED_TOLERANCE: f64 = 0.01;
    pub const DEFAULT_NEWTON_TOLERANCE: f64 = 1e-4;

    /// Golden-section iterations needed to shrink the search interval to the
    /// requested relative tolerance.
    pub fn line_search_steps(&self) -> usize {
        let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
        (self.line_search_tolerance.ln() / ratio.ln()).ceil().max(1.0) as usize
    }
}

impl Default for TraceSettings {
    fn default() -> Self {
        Self {
            seed_samples: Self::DEFAULT_SEED_SAMPLES,
            seed_attempts: 100,
            seed_tolerance: Self::DEFAULT_SEED_TOLERANCE,
            distinct_parameters: 0.01,
            cg_max_iterations: 200,
            cg_min_step: 1e-6,
            line_search_max: 0.2,
            line_search_tolerance: 1e-5,
            newton_max_iterations: 20,
            newton_tolerance: Self::DEFAULT_NEWTON_TOLERANCE,
            max_points: 10_000,
        }
    }
}

impl Validate for TraceSettings {
    fn validate(&self) -> Result<()> {
        let counts = [
            ("seed_samples", self.seed_samples),
            ("seed_attempts", self.seed_attempts),
            ("cg_max_iterations", self.cg_max_iterations),
            ("newton_max_iterations", self.newton_max_iterations),
            ("max_points", self.max_points),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(McadError::Config(format!("{name} must be positive")));
            }
        }

        let values = [
            ("seed_tolerance", self.seed_tolerance),
            ("distinct_parameters", self.distinct_parameters),
            ("cg_min_step", self.cg_min_step),
            ("line_search_max", self.line_search_max),
            ("line_search_tolerance", self.line_search_tolerance),
            ("newton_tolerance", self.newton_tolerance),
        ];
        for (name, value) in values {
            if !(value.is_finite() && value > 0.0) {
                return Err(McadError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.line_search_tolerance >= 1.0 {
            return Err(McadError::Config(
                "line_search_tolerance must be below 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        TraceSettings::default().validate().unwrap();
    }

    #[test]
    fn test_line_search_steps() {
        // 0.618^24 is just below 1e-5
        assert_eq!(TraceSettings::default().line_search_steps(), 24);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: TraceSettings =
            serde_json::from_str(r#"{ "seed_samples": 7, "newton_tolerance": 1e-6 }"#).unwrap();
        assert_eq!(settings.seed_samples, 7);
        assert_eq!(settings.newton_tolerance, 1e-6);
        assert_eq!(settings.cg_max_iterations, 200);
        assert_eq!(settings.seed_tolerance, 0.01);
    }

    #[test]
    fn test_rejects_zero_and_negative() {
        let settings = TraceSettings {
            seed_samples: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(McadError::Config(_))));

        let settings = TraceSettings {
            cg_min_step: -1.0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(McadError::Config(_))));
    }
}
