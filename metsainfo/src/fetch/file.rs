//! Source de features adossée à des fichiers GeoJSON
//!
//! Joue le rôle du service distant pour la CLI et les tests : les
//! documents sont relus à chaque requête et filtrés par emprise ou par
//! référence, comme le ferait un WFS.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use metsavara::{
    geometry_bounds, Bounds, ParcelFeature, PropertyReference, StandFeature,
};

use super::{FeatureSource, FetchError};
use crate::ingest;

/// Source fichier : un document de peuplements, un document de parcelles
/// optionnel
#[derive(Debug, Clone)]
pub struct FileSource {
    stands_path: PathBuf,
    parcels_path: Option<PathBuf>,
}

impl FileSource {
    pub fn new(stands_path: impl Into<PathBuf>, parcels_path: Option<PathBuf>) -> Self {
        Self {
            stands_path: stands_path.into(),
            parcels_path,
        }
    }

    async fn read_document(path: &Path) -> Result<String, FetchError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.display().to_string(),
                source,
            })
    }

    async fn load_parcels(&self) -> Result<Vec<ParcelFeature>, FetchError> {
        let Some(path) = &self.parcels_path else {
            return Err(FetchError::Service(
                "no parcel dataset configured".to_string(),
            ));
        };
        let document = Self::read_document(path).await?;
        ingest::parse_parcels(&document).map_err(|e| FetchError::InvalidDocument(format!("{:#}", e)))
    }
}

/// Vrai si la géométrie de la feature intersecte l'emprise demandée ;
/// une feature sans emprise calculable est hors réponse, comme pour un
/// service bbox
fn within(geometry: Option<&geo::Geometry>, bounds: &Bounds) -> bool {
    geometry
        .and_then(|g| geometry_bounds(g).ok())
        .map(|b| b.intersects(bounds))
        .unwrap_or(false)
}

#[async_trait]
impl FeatureSource for FileSource {
    async fn stands_in_bounds(&self, bounds: &Bounds) -> Result<Vec<StandFeature>, FetchError> {
        let document = Self::read_document(&self.stands_path).await?;
        let mut stands = ingest::parse_stands(&document)
            .map_err(|e| FetchError::InvalidDocument(format!("{:#}", e)))?;

        stands.retain(|stand| within(stand.geometry.as_ref(), bounds));
        debug!(stands = stands.len(), "File source bbox query (stands)");
        Ok(stands)
    }

    async fn parcels_in_bounds(&self, bounds: &Bounds) -> Result<Vec<ParcelFeature>, FetchError> {
        let mut parcels = self.load_parcels().await?;
        parcels.retain(|parcel| within(parcel.geometry.as_ref(), bounds));
        debug!(parcels = parcels.len(), "File source bbox query (parcels)");
        Ok(parcels)
    }

    async fn parcels_by_reference(
        &self,
        reference: &PropertyReference,
    ) -> Result<Vec<ParcelFeature>, FetchError> {
        let mut parcels = self.load_parcels().await?;
        parcels.retain(|parcel| {
            parcel
                .reference
                .as_ref()
                .map(|r| r == reference)
                .unwrap_or(false)
        });
        debug!(parts = parcels.len(), reference = %reference, "File source reference query");
        Ok(parcels)
    }
}
