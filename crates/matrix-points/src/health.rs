//! Health chart
//!
//! Seven chakra rows read off the octagram, each with a physical and an
//! energy number and their reduced sum.

use crate::arcana::{Arcana, ReductionRules};
use crate::calculator::{PointCalculator, PointSet};
use crate::point_key::MainPoint;
use serde::Serialize;

/// Chakra rows, crown first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Chakra {
    Sahasrara,
    Ajna,
    Vishuddha,
    Anahata,
    Manipura,
    Svadhisthana,
    Muladhara,
}

impl Chakra {
    /// Rows in chart order
    pub const ALL: [Chakra; 7] = [
        Self::Sahasrara,
        Self::Ajna,
        Self::Vishuddha,
        Self::Anahata,
        Self::Manipura,
        Self::Svadhisthana,
        Self::Muladhara,
    ];

    /// Points feeding the (physics, energy) columns
    #[must_use]
    pub fn sources(self) -> (MainPoint, MainPoint) {
        match self {
            Self::Sahasrara => (MainPoint::A, MainPoint::B),
            Self::Ajna => (MainPoint::O, MainPoint::P),
            Self::Vishuddha => (MainPoint::S, MainPoint::T),
            Self::Anahata => (MainPoint::W, MainPoint::X),
            Self::Manipura => (MainPoint::E, MainPoint::E),
            Self::Svadhisthana => (MainPoint::N, MainPoint::J),
            Self::Muladhara => (MainPoint::C, MainPoint::D),
        }
    }
}

/// One chart row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthRow {
    /// Row label
    pub chakra: Chakra,
    /// Physical column
    pub physics: Arcana,
    /// Energy column
    pub energy: Arcana,
    /// Reduced sum of both columns
    pub emotions: Arcana,
}

/// Full chart with a totals row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthChart {
    /// Chakra rows, crown first
    pub rows: Vec<HealthRow>,
    /// Reduced column sums
    pub total: HealthRow,
}

impl HealthChart {
    /// Derive the chart from a point set
    #[must_use]
    pub fn from_points(points: &PointSet, rules: &ReductionRules) -> Self {
        let rows: Vec<HealthRow> = Chakra::ALL
            .into_iter()
            .map(|chakra| {
                let (p, e) = chakra.sources();
                let physics = points.main(p);
                let energy = points.main(e);
                HealthRow {
                    chakra,
                    physics,
                    energy,
                    emotions: rules.reduce_sum(&[physics, energy]),
                }
            })
            .collect();

        let physics = rules.reduce(rows.iter().map(|r| r.physics.value()).sum());
        let energy = rules.reduce(rows.iter().map(|r| r.energy.value()).sum());
        let total = HealthRow {
            chakra: Chakra::Muladhara,
            physics,
            energy,
            emotions: rules.reduce_sum(&[physics, energy]),
        };

        Self { rows, total }
    }
}

impl PointCalculator {
    /// Health chart for a computed point set
    #[must_use]
    pub fn health_chart(&self, points: &PointSet) -> HealthChart {
        HealthChart::from_points(points, self.rules())
    }
}
