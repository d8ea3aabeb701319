//! # metsavara
//!
//! Moteur de jointure spatiale et d'agrégation pour les données
//! d'inventaire forestier finlandais (peuplements Metsäkeskus, parcelles
//! cadastrales MML).
//!
//! ## Features
//!
//! - Primitives géométriques planes (aire shoelace, centroïde, test
//!   d'appartenance par lancer de rayon, boîtes englobantes)
//! - Appariement peuplement ↔ parcelle, parcelles multi-parties comprises
//! - Statistiques pondérées par la surface (moyennes, extrêmes,
//!   répartition d'essences normalisée, recommandations groupées)
//! - Cache de parcelles lié à la vue courante
//! - Types `geo` pour l'interopérabilité avec l'écosystème Rust géospatial
//!
//! Le crate est pur : pas d'I/O, pas de réseau, pas de reprojection. Les
//! coordonnées arrivent déjà dans un référentiel métrique plan unique
//! (EPSG:3067 en pratique) et les géométries reçues ne sont jamais
//! modifiées.
//!
//! ## Usage
//!
//! ```rust
//! use metsavara::{aggregate, filter_stands_for_parcels, CodeTables};
//!
//! # fn demo(stands: &[metsavara::StandFeature], parcels: &[metsavara::ParcelFeature])
//! # -> Result<(), metsavara::MetsavaraError> {
//! let codes = CodeTables::finnish()?;
//! let matched = filter_stands_for_parcels(stands, parcels);
//! let stats = aggregate(&matched, &codes);
//! println!("{} stands, {:.1} ha", stats.count, stats.total_area);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod codes;
pub mod error;
pub mod geometry;
pub mod matching;
pub mod reference;
pub mod stats;
pub mod types;

pub use cache::ParcelCache;
pub use codes::{CodeTables, SpeciesGroup};
pub use error::MetsavaraError;
pub use geometry::{geometry_bounds, point_in_polygon, polygon_area, ring_centroid};
pub use matching::{
    filter_stands_for_parcels, group_parcel_parts, stand_belongs_to_parcel,
    stand_belongs_to_parcels,
};
pub use reference::PropertyReference;
pub use stats::{aggregate, AggregateStatistics, FieldSummary, ProposalGroup, SpeciesShare};
pub use types::{Bounds, ParcelFeature, StandAttributes, StandFeature};
