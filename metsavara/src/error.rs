//! Types d'erreurs pour le crate metsavara

use thiserror::Error;

/// Erreurs pouvant survenir dans le moteur de jointure spatiale
#[derive(Debug, Error)]
pub enum MetsavaraError {
    /// Anneau vide (aucun sommet)
    #[error("Empty ring: no vertices to compute a centroid from")]
    EmptyRing,

    /// Géométrie sans aucune coordonnée
    #[error("Empty geometry: no coordinates found")]
    EmptyGeometry,

    /// Géométrie d'un type non surfacique là où un polygone est attendu
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(&'static str),

    /// Identifiant cadastral (kiinteistötunnus) invalide
    #[error("Invalid property reference '{input}': {reason}")]
    InvalidReference { input: String, reason: String },

    /// Table de codes illisible
    #[error("Invalid code table: {0}")]
    InvalidCodeTable(#[from] serde_json::Error),
}

impl MetsavaraError {
    /// Crée une erreur de référence cadastrale invalide avec contexte
    pub fn invalid_reference(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.into(),
            reason: reason.into(),
        }
    }
}
