use crate::error::{Error, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::env;

/// Tolerance for the semantic/keyword weight-sum invariant.
pub const WEIGHT_SUM_TOLERANCE: f32 = 0.001;

/// Hybrid retrieval tuning. Immutable once constructed; every constructor
/// and loader path validates before handing the value out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub semantic_weight: f32,
    pub keyword_weight: f32,
    pub max_results: usize,
    pub days_back: u32,
    pub min_score_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.7,
            keyword_weight: 0.3,
            max_results: 10,
            days_back: 365,
            min_score_threshold: 0.0,
        }
    }
}

impl RetrievalConfig {
    pub fn new(
        semantic_weight: f32,
        keyword_weight: f32,
        max_results: usize,
        days_back: u32,
        min_score_threshold: f32,
    ) -> Result<Self> {
        let config = Self {
            semantic_weight,
            keyword_weight,
            max_results,
            days_back,
            min_score_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default limits with custom fusion weights.
    pub fn with_weights(semantic_weight: f32, keyword_weight: f32) -> Result<Self> {
        let config = Self {
            semantic_weight,
            keyword_weight,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let total = self.semantic_weight + self.keyword_weight;
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::InvalidConfig(format!(
                "retrieval weights must sum to 1.0, got {total}"
            )));
        }
        if self.max_results == 0 {
            return Err(Error::InvalidConfig(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Thresholds driving the PROCEED/REDUCE/VETO decision.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SafetyThresholds {
    pub veto_risk_score: f32,
    pub reduce_risk_score: f32,
    /// Informational; event detection itself is presence-based.
    pub critical_event_severity: f32,
    pub earnings_warning_days: u32,
    pub high_allocation_pct: f32,
}

impl Default for SafetyThresholds {
    fn default() -> Self {
        Self {
            veto_risk_score: 8.0,
            reduce_risk_score: 6.0,
            critical_event_severity: 9.0,
            earnings_warning_days: 3,
            high_allocation_pct: 15.0,
        }
    }
}

impl SafetyThresholds {
    pub fn new(
        veto_risk_score: f32,
        reduce_risk_score: f32,
        earnings_warning_days: u32,
        high_allocation_pct: f32,
    ) -> Result<Self> {
        let thresholds = Self {
            veto_risk_score,
            reduce_risk_score,
            earnings_warning_days,
            high_allocation_pct,
            ..Self::default()
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if self.veto_risk_score <= self.reduce_risk_score {
            return Err(Error::InvalidConfig(format!(
                "VETO threshold ({}) must be higher than REDUCE threshold ({})",
                self.veto_risk_score, self.reduce_risk_score
            )));
        }
        if self.high_allocation_pct <= 0.0 || self.high_allocation_pct > 100.0 {
            return Err(Error::InvalidConfig(format!(
                "high allocation percentage must be in (0, 100], got {}",
                self.high_allocation_pct
            )));
        }
        Ok(())
    }
}

/// Application configuration merged from `config.toml`, a `RUST_ENV`-selected
/// overlay, and `APP_*` environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub retrieval: RetrievalConfig,
    pub safety: SafetyThresholds,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_"));

        Self::load_from(figment)
    }

    /// Extract and validate from a prepared figment (test seam).
    pub fn load_from(figment: Figment) -> anyhow::Result<Self> {
        let config: Self = figment.extract()?;
        config.retrieval.validate()?;
        config.safety.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = RetrievalConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.semantic_weight + config.keyword_weight - 1.0).abs() <= 0.001);
        let thresholds = SafetyThresholds::default();
        assert!(thresholds.validate().is_ok());
        assert!(thresholds.veto_risk_score > thresholds.reduce_risk_score);
    }

    #[test]
    fn weights_must_sum_to_one() {
        let err = RetrievalConfig::with_weights(0.8, 0.3).unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
        // Within tolerance passes.
        assert!(RetrievalConfig::with_weights(0.7005, 0.2999).is_ok());
    }

    #[test]
    fn max_results_must_be_positive() {
        let err = RetrievalConfig::new(0.7, 0.3, 0, 365, 0.0).unwrap_err();
        assert!(err.to_string().contains("max_results"));
    }

    #[test]
    fn veto_threshold_must_exceed_reduce() {
        let err = SafetyThresholds::new(6.0, 6.0, 3, 15.0).unwrap_err();
        assert!(err.to_string().contains("VETO threshold"));
        assert!(SafetyThresholds::new(9.0, 7.0, 5, 20.0).is_ok());
    }

    #[test]
    fn allocation_threshold_must_be_a_percentage() {
        assert!(SafetyThresholds::new(8.0, 6.0, 3, 0.0).is_err());
        assert!(SafetyThresholds::new(8.0, 6.0, 3, 120.0).is_err());
        assert!(SafetyThresholds::new(8.0, 6.0, 3, 100.0).is_ok());
    }

    #[test]
    fn loads_overrides_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[retrieval]\nsemantic_weight = 0.6\nkeyword_weight = 0.4\nmax_results = 5\n\n[safety]\nveto_risk_score = 9.0\n",
        )
        .unwrap();
        let figment = Figment::new().merge(Toml::file(&path));
        let config = AppConfig::load_from(figment).unwrap();
        assert!((config.retrieval.semantic_weight - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.retrieval.max_results, 5);
        assert!((config.safety.veto_risk_score - 9.0).abs() < f32::EPSILON);
        // Unset fields keep defaults.
        assert!((config.safety.reduce_risk_score - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn invalid_file_config_fails_fast() {
        let figment = Figment::new().merge(Toml::string(
            "[retrieval]\nsemantic_weight = 0.9\nkeyword_weight = 0.3\n",
        ));
        assert!(AppConfig::load_from(figment).is_err());
    }
}
