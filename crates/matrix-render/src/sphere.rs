//! Sphere layouts
//!
//! A layout is the fixed list of report blocks for one service: which point
//! feeds each block, and whether the block is free or premium.

use matrix_gate::ServiceType;
use matrix_points::{MainPoint, PointKey, Purpose};

/// Where a sphere takes its number from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSource {
    /// A fixed point of the matrix
    Point(PointKey),
    /// The year point resolved from the current age
    Forecast,
}

/// One report block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SphereSpec {
    /// Stable block id, also the corpus lookup key
    pub id: &'static str,
    /// Display title
    pub title: &'static str,
    /// Point feeding the block
    pub source: PointSource,
    /// Shown without payment
    pub free: bool,
}

const fn point_sphere(id: &'static str, title: &'static str, point: MainPoint, free: bool) -> SphereSpec {
    SphereSpec {
        id,
        title,
        source: PointSource::Point(PointKey::Main(point)),
        free,
    }
}

const fn purpose_sphere(id: &'static str, title: &'static str, point: Purpose) -> SphereSpec {
    SphereSpec {
        id,
        title,
        source: PointSource::Point(PointKey::Purpose(point)),
        free: false,
    }
}

/// Blocks of the personal report
pub static PERSONAL_SPHERES: [SphereSpec; 14] = [
    point_sphere("qualities", "Личные качества", MainPoint::A, true),
    point_sphere("pastlife", "Прошлая жизнь", MainPoint::C, true),
    point_sphere("talents", "Таланты", MainPoint::E, false),
    purpose_sphere("purpose", "Предназначение", Purpose::Personal),
    point_sphere("money", "Деньги", MainPoint::F, false),
    point_sphere("programs", "Программы", MainPoint::D, false),
    point_sphere("sexuality", "Сексуальность", MainPoint::U, false),
    point_sphere("parents", "Родители", MainPoint::G, false),
    point_sphere("children", "Дети", MainPoint::J, false),
    point_sphere("relationships", "Отношения", MainPoint::W, false),
    purpose_sphere("leadership", "Руководство", Purpose::Social),
    SphereSpec {
        id: "year",
        title: "Прогноз на год",
        source: PointSource::Forecast,
        free: false,
    },
    point_sphere("brand", "Личный бренд", MainPoint::S, false),
    point_sphere("health", "Здоровье", MainPoint::H, false),
];

/// Blocks of the compatibility report; titles are the corpus headings
pub static COMPATIBILITY_SPHERES: [SphereSpec; 14] = [
    point_sphere("sphere-1", "Фундамент отношений / базовая энергия пары", MainPoint::A, true),
    point_sphere("sphere-2", "Эмоциональная гармония / поддержка", MainPoint::S, true),
    point_sphere("sphere-3", "Сексуальная совместимость / интим", MainPoint::J, false),
    point_sphere("sphere-4", "Бытовая совместимость / домашний комфорт", MainPoint::D, false),
    point_sphere("sphere-5", "Финансовая гармония / ресурсы", MainPoint::C, false),
    point_sphere("sphere-6", "Социальная совместимость / статус", MainPoint::B, false),
    point_sphere("sphere-7", "Совместные цели и амбиции", MainPoint::M, false),
    point_sphere("sphere-8", "Мужская энергия / инициатива мужчины", MainPoint::F, false),
    point_sphere(
        "sphere-9",
        "Женская энергия / эмоциональная поддержка женщины",
        MainPoint::G,
        false,
    ),
    SphereSpec {
        id: "sphere-10",
        title: "Сила союза / баланс ролей",
        source: PointSource::Point(PointKey::Union),
        free: false,
    },
    point_sphere("sphere-11", "Кармическая суть / центр отношений", MainPoint::E, false),
    point_sphere("sphere-12", "Стабильность и долговечность", MainPoint::H, false),
    point_sphere("sphere-13", "Общие дела и проекты", MainPoint::N, false),
    point_sphere(
        "sphere-14",
        "Привязанность и забота / эмоциональный союз",
        MainPoint::V,
        false,
    ),
];

/// Block list for a service
#[must_use]
pub fn layout(service: ServiceType) -> &'static [SphereSpec] {
    match service {
        ServiceType::Personal => &PERSONAL_SPHERES,
        ServiceType::Compatibility => &COMPATIBILITY_SPHERES,
    }
}

/// Find a block by id
#[must_use]
pub fn sphere(service: ServiceType, id: &str) -> Option<&'static SphereSpec> {
    layout(service).iter().find(|s| s.id == id)
}
