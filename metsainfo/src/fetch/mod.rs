//! Récupération de features (peuplements, parcelles)
//!
//! Le cœur ne parle jamais au réseau : il consomme un `FeatureSource`. Une
//! implémentation HTTP vit chez l'hôte ; ce crate fournit la construction
//! des requêtes WFS (`wfs`) et une source fichier GeoJSON (`file`) pour la
//! CLI et les tests.

pub mod file;
pub mod wfs;

use async_trait::async_trait;
use thiserror::Error;

use metsavara::{Bounds, ParcelFeature, PropertyReference, StandFeature};

/// Échec de récupération : propagé tel quel à l'appelant, sans fabriquer
/// de résultat partiel — l'état antérieur (cache, statistiques affichées)
/// reste intact
#[derive(Debug, Error)]
pub enum FetchError {
    /// Lecture impossible de la source
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Document renvoyé illisible
    #[error("Invalid feature document: {0}")]
    InvalidDocument(String),

    /// Échec du service distant
    #[error("Feature service failure: {0}")]
    Service(String),
}

/// Collaborateur de récupération : fournit des collections de features déjà
/// exprimées dans le référentiel métrique plan partagé (la reprojection se
/// fait côté service ou à l'ingestion, jamais dans le cœur)
#[async_trait]
pub trait FeatureSource {
    /// Peuplements forestiers intersectant la boîte donnée
    async fn stands_in_bounds(&self, bounds: &Bounds) -> Result<Vec<StandFeature>, FetchError>;

    /// Parcelles cadastrales intersectant la boîte donnée
    async fn parcels_in_bounds(&self, bounds: &Bounds) -> Result<Vec<ParcelFeature>, FetchError>;

    /// Toutes les parties de la parcelle logique portant cette référence
    async fn parcels_by_reference(
        &self,
        reference: &PropertyReference,
    ) -> Result<Vec<ParcelFeature>, FetchError>;
}
