//! Report rendering
//!
//! Binds a point set to a sphere layout. Every sphere gets its number; free
//! spheres (and all spheres once unlocked) also get their text. A missing
//! text never fails the report: the sphere shows a placeholder instead.

use crate::corpus::TextCorpus;
use crate::format::{fallback_title, format_description, FormattedText};
use crate::sphere::{layout, PointSource, SphereSpec};
use matrix_gate::ServiceType;
use matrix_points::{Arcana, Forecast, MainPoint, PointKey, PointSet};
use serde::Serialize;
use std::fmt;

/// Shown when the corpus has no text for a sphere
pub const NO_DATA_PLACEHOLDER: &str = "Данные для этой сферы пока недоступны";

/// Point used for the year sphere when no forecast band matches
pub const DEFAULT_FORECAST_FALLBACK: PointKey = PointKey::Main(MainPoint::V);

/// Body of one sphere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum SphereContent {
    /// Formatted description
    Text(FormattedText),
    /// Premium sphere, not paid for
    Locked,
    /// No text available
    NoData,
}

impl SphereContent {
    /// Check if the sphere is still behind the gate
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// One rendered sphere
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedSphere {
    /// Block id
    pub id: &'static str,
    /// Block title
    pub title: &'static str,
    /// Displayed number; `None` when the point could not be resolved
    pub arcana: Option<Arcana>,
    /// Text state
    pub content: SphereContent,
}

/// Rendered report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportView {
    /// Service the report was rendered for
    pub service: ServiceType,
    /// Spheres in layout order
    pub spheres: Vec<RenderedSphere>,
    /// Whether premium spheres are shown
    pub unlocked: bool,
}

impl ReportView {
    /// Sphere by id
    #[must_use]
    pub fn sphere(&self, id: &str) -> Option<&RenderedSphere> {
        self.spheres.iter().find(|s| s.id == id)
    }

    /// Resolve text for every sphere that was locked
    ///
    /// Numbers are not recomputed; already resolved spheres are left alone.
    pub fn unlock(&mut self, renderer: &Renderer) {
        if self.unlocked {
            return;
        }
        let mut resolved = 0usize;
        for sphere in &mut self.spheres {
            if sphere.content.is_locked() {
                sphere.content = renderer.resolve_text(sphere.id, sphere.arcana);
                resolved += 1;
            }
        }
        self.unlocked = true;
        tracing::debug!(service = %self.service, resolved, "report unlocked");
    }
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sphere) in self.spheres.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            match sphere.arcana {
                Some(arcana) => writeln!(f, "## {} [{arcana}]", sphere.title)?,
                None => writeln!(f, "## {} [-]", sphere.title)?,
            }
            match &sphere.content {
                SphereContent::Text(text) => write!(f, "{text}")?,
                SphereContent::Locked => f.write_str("(locked)")?,
                SphereContent::NoData => f.write_str(NO_DATA_PLACEHOLDER)?,
            }
        }
        Ok(())
    }
}

/// Renderer bound to a text corpus
#[derive(Debug, Clone)]
pub struct Renderer {
    corpus: TextCorpus,
    forecast_fallback: PointKey,
}

impl Renderer {
    /// Create a renderer over `corpus`
    #[must_use]
    pub fn new(corpus: TextCorpus) -> Self {
        Self {
            corpus,
            forecast_fallback: DEFAULT_FORECAST_FALLBACK,
        }
    }

    /// Use a different point when no forecast band matches
    #[must_use]
    pub fn with_forecast_fallback(mut self, key: PointKey) -> Self {
        self.forecast_fallback = key;
        self
    }

    /// Corpus in use
    #[must_use]
    pub fn corpus(&self) -> &TextCorpus {
        &self.corpus
    }

    /// Render a report
    ///
    /// `forecast` feeds the year sphere; without one the fallback point is
    /// shown.
    #[must_use]
    pub fn render(
        &self,
        service: ServiceType,
        points: &PointSet,
        forecast: Option<&Forecast>,
        unlocked: bool,
    ) -> ReportView {
        let spheres = layout(service)
            .iter()
            .map(|spec| self.render_sphere(spec, points, forecast, unlocked))
            .collect();
        ReportView {
            service,
            spheres,
            unlocked,
        }
    }

    fn render_sphere(
        &self,
        spec: &SphereSpec,
        points: &PointSet,
        forecast: Option<&Forecast>,
        unlocked: bool,
    ) -> RenderedSphere {
        let arcana = match spec.source {
            PointSource::Point(key) => points.get(key),
            PointSource::Forecast => match forecast {
                Some(f) => f.arcana_or(points, self.forecast_fallback),
                None => points.get(self.forecast_fallback),
            },
        };

        let content = if spec.free || unlocked {
            self.resolve_text(spec.id, arcana)
        } else {
            SphereContent::Locked
        };

        RenderedSphere {
            id: spec.id,
            title: spec.title,
            arcana,
            content,
        }
    }

    /// Text for a sphere, or `NoData`
    #[must_use]
    pub fn resolve_text(&self, sphere_id: &str, arcana: Option<Arcana>) -> SphereContent {
        let Some(arcana) = arcana else {
            return SphereContent::NoData;
        };
        let title = self
            .corpus
            .title(arcana)
            .map_or_else(|| fallback_title(arcana.value()), str::to_string);
        match self
            .corpus
            .text(arcana, sphere_id)
            .map(|text| format_description(text, &title))
        {
            Some(formatted) if !formatted.paragraphs.is_empty() => SphereContent::Text(formatted),
            _ => {
                tracing::debug!(sphere = sphere_id, %arcana, "no text for sphere");
                SphereContent::NoData
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_points::compute_points;

    fn corpus() -> TextCorpus {
        let json = r#"{
            "15": {"title": "15 аркан: Дьявол", "spheres": {"ЛИЧНЫЕ КАЧЕСТВА": "Харизма."}},
            "6": {"spheres": {"ТАЛАНТЫ": "Выбор."}}
        }"#;
        TextCorpus::from_json(ServiceType::Personal, json).unwrap().corpus
    }

    #[test]
    fn free_spheres_get_text_and_premium_are_locked() {
        let renderer = Renderer::new(corpus());
        let points = compute_points(15, 5, 1990);
        let view = renderer.render(ServiceType::Personal, &points, None, false);

        let qualities = view.sphere("qualities").unwrap();
        assert_eq!(qualities.arcana.map(Arcana::value), Some(15));
        match &qualities.content {
            SphereContent::Text(t) => assert_eq!(t.title, "15 аркан: Дьявол"),
            other => panic!("unexpected {other:?}"),
        }

        // c = 19, no text in corpus
        assert_eq!(view.sphere("pastlife").unwrap().content, SphereContent::NoData);

        let talents = view.sphere("talents").unwrap();
        assert_eq!(talents.content, SphereContent::Locked);
        assert_eq!(talents.arcana.map(Arcana::value), Some(6));

        let text = view.to_string();
        assert!(text.starts_with("## Личные качества [15]\n15 аркан: Дьявол\n\nХаризма."));
        assert!(text.contains("## Таланты [6]\n(locked)"));
        assert!(text.contains(NO_DATA_PLACEHOLDER));
    }

    #[test]
    fn blank_text_renders_placeholder() {
        let json = r#"{"15": {"title": "15 аркан", "spheres": {"ЛИЧНЫЕ КАЧЕСТВА": "   "}}}"#;
        let corpus = TextCorpus::from_json(ServiceType::Personal, json).unwrap().corpus;
        let renderer = Renderer::new(corpus);
        let points = compute_points(15, 5, 1990);
        let view = renderer.render(ServiceType::Personal, &points, None, false);

        let qualities = view.sphere("qualities").unwrap();
        assert_eq!(qualities.arcana.map(Arcana::value), Some(15));
        assert_eq!(qualities.content, SphereContent::NoData);
        assert!(view.to_string().contains(NO_DATA_PLACEHOLDER));
    }

    #[test]
    fn unlock_resolves_locked_spheres() {
        let renderer = Renderer::new(corpus());
        let points = compute_points(15, 5, 1990);
        let mut view = renderer.render(ServiceType::Personal, &points, None, false);
        view.unlock(&renderer);

        assert!(view.unlocked);
        assert!(view.spheres.iter().all(|s| !s.content.is_locked()));
        match &view.sphere("talents").unwrap().content {
            SphereContent::Text(t) => assert_eq!(t.title, "Аркан 6"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn year_sphere_falls_back_without_forecast() {
        let renderer = Renderer::new(TextCorpus::empty());
        let points = compute_points(15, 5, 1990);
        let view = renderer.render(ServiceType::Personal, &points, None, true);
        assert_eq!(
            view.sphere("year").unwrap().arcana,
            Some(points.main(MainPoint::V))
        );

        let gap = Forecast::NoMatch { cycle_age: 5.75 };
        let renderer = renderer.with_forecast_fallback(PointKey::Main(MainPoint::A));
        let view = renderer.render(ServiceType::Personal, &points, Some(&gap), true);
        assert_eq!(
            view.sphere("year").unwrap().arcana,
            Some(points.main(MainPoint::A))
        );
    }

    #[test]
    fn union_missing_on_personal_points_is_no_data() {
        let renderer = Renderer::new(TextCorpus::empty());
        let points = compute_points(15, 5, 1990);
        let view = renderer.render(ServiceType::Compatibility, &points, None, true);
        let union = view.sphere("sphere-10").unwrap();
        assert_eq!(union.arcana, None);
        assert_eq!(union.content, SphereContent::NoData);
    }
}
