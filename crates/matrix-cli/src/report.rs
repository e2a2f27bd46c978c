//! Report commands
//!
//! Each report first resets the premium gate against the key of the report
//! about to be shown, then computes points and renders spheres.

use crate::config::MatrixConfig;
use chrono::NaiveDate;
use matrix_gate::{ClientStore, MatrixKey, PremiumGate, ServiceType};
use matrix_points::{
    resolve_forecast, BirthInput, Forecast, HealthChart, PointCalculator, PointSet,
};
use matrix_render::{CorpusError, Renderer, ReportView, TextCorpus};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Rendered report with the data behind it
#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    /// Identity of the report
    pub matrix_key: MatrixKey,
    /// Whether premium spheres are shown
    pub unlocked: bool,
    /// Every computed point
    pub points: PointSet,
    /// Year point lookup (personal only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<Forecast>,
    /// Health chart (personal only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<HealthChart>,
    /// Spheres
    pub report: ReportView,
}

impl fmt::Display for ReportOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let access = if self.unlocked { "full report" } else { "free preview" };
        writeln!(f, "# {} ({access})", self.matrix_key)?;
        writeln!(f)?;
        writeln!(f, "{}", self.report)?;
        if let Some(health) = &self.health {
            writeln!(f)?;
            writeln!(f, "## Health chart")?;
            for row in health.rows.iter().chain(std::iter::once(&health.total)) {
                writeln!(
                    f,
                    "{:<14} {:>2} {:>2} {:>2}",
                    format!("{:?}", row.chakra),
                    row.physics.value(),
                    row.energy.value(),
                    row.emotions.value()
                )?;
            }
        }
        Ok(())
    }
}

/// Calculator plus one renderer per service
#[derive(Debug, Clone)]
pub struct Reporter {
    calculator: PointCalculator,
    personal: Renderer,
    compatibility: Renderer,
}

impl Reporter {
    /// Build from configuration, loading the configured corpora
    ///
    /// # Errors
    /// `CorpusError` when a configured corpus cannot be read.
    pub fn from_config(config: &MatrixConfig) -> Result<Self, CorpusError> {
        let load = |service: ServiceType, path: Option<&Path>| -> Result<Renderer, CorpusError> {
            let corpus = match path {
                Some(path) => TextCorpus::load(service, path)?.corpus,
                None => {
                    tracing::warn!(%service, "no corpus configured, texts will be unavailable");
                    TextCorpus::empty()
                }
            };
            Ok(Renderer::new(corpus).with_forecast_fallback(config.forecast.fallback_point))
        };
        Ok(Self {
            calculator: config.calculator(),
            personal: load(ServiceType::Personal, config.corpus.personal.as_deref())?,
            compatibility: load(ServiceType::Compatibility, config.corpus.compatibility.as_deref())?,
        })
    }

    /// Assemble from parts
    #[must_use]
    pub fn new(calculator: PointCalculator, personal: Renderer, compatibility: Renderer) -> Self {
        Self {
            calculator,
            personal,
            compatibility,
        }
    }

    /// Personal report
    ///
    /// # Errors
    /// `ValidationError` for bad input, `StoreError` when the gate cannot be
    /// reset.
    pub fn personal<S: ClientStore>(
        &self,
        gate: &mut PremiumGate<S>,
        date: &str,
        name: &str,
        today: NaiveDate,
    ) -> anyhow::Result<ReportOutput> {
        let input = BirthInput::parse(date, Some(name), today)?;
        let key = MatrixKey::personal(&input);
        let unlocked = gate.reset_if_key_mismatch(&key)?.allows(&key);

        let points = self.calculator.compute(&input);
        let forecast = resolve_forecast(input.date(), today, &points);
        let health = self.calculator.health_chart(&points);
        let report = self
            .personal
            .render(ServiceType::Personal, &points, Some(&forecast), unlocked);

        tracing::info!(matrix_key = %key, unlocked, "personal report rendered");
        Ok(ReportOutput {
            matrix_key: key,
            unlocked,
            points,
            forecast: Some(forecast),
            health: Some(health),
            report,
        })
    }

    /// Compatibility report
    ///
    /// # Errors
    /// `ValidationError` for bad input, `StoreError` when the gate cannot be
    /// reset.
    pub fn compatibility<S: ClientStore>(
        &self,
        gate: &mut PremiumGate<S>,
        first: &str,
        second: &str,
        today: NaiveDate,
    ) -> anyhow::Result<ReportOutput> {
        let first = BirthInput::parse(first, None, today)?;
        let second = BirthInput::parse(second, None, today)?;
        let key = MatrixKey::compatibility(&first, &second);
        let unlocked = gate.reset_if_key_mismatch(&key)?.allows(&key);

        let points = self.calculator.compute_compatibility(&first, &second);
        let report = self
            .compatibility
            .render(ServiceType::Compatibility, &points, None, unlocked);

        tracing::info!(matrix_key = %key, unlocked, "compatibility report rendered");
        Ok(ReportOutput {
            matrix_key: key,
            unlocked,
            points,
            forecast: None,
            health: None,
            report,
        })
    }
}
