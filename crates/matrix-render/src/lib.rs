//! Matrix Render - report content
//!
//! Turns a computed point set into a report:
//! - Sphere layouts for the personal and compatibility services
//! - Text corpus loading, with headings resolved to spheres at load time
//! - Description formatting
//! - Rendering with locked, free and no-data spheres
//!
//! # Example
//!
//! ```rust
//! use matrix_gate::ServiceType;
//! use matrix_points::compute_points;
//! use matrix_render::{Renderer, SphereContent, TextCorpus};
//!
//! let renderer = Renderer::new(TextCorpus::empty());
//! let view = renderer.render(ServiceType::Personal, &compute_points(15, 5, 1990), None, false);
//!
//! assert_eq!(view.spheres.len(), 14);
//! assert_eq!(view.sphere("talents").unwrap().content, SphereContent::Locked);
//! ```

#![warn(unreachable_pub)]

pub mod corpus;
pub mod error;
pub mod format;
pub mod renderer;
pub mod sphere;

pub use corpus::{CorpusLoad, TextCorpus, PERSONAL_KEYWORDS};
pub use error::{CorpusError, LoadWarning};
pub use format::{fallback_title, format_description, FormattedText, Paragraph};
pub use renderer::{
    RenderedSphere, Renderer, ReportView, SphereContent, DEFAULT_FORECAST_FALLBACK,
    NO_DATA_PLACEHOLDER,
};
pub use sphere::{layout, sphere, PointSource, SphereSpec, COMPATIBILITY_SPHERES, PERSONAL_SPHERES};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
