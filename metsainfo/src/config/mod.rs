//! Configuration de l'application
//!
//! Un preset embarqué couvre les services ouverts finlandais ; un fichier
//! JSON peut le remplacer (autres services, autre référentiel de codes).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use metsavara::CodeTables;

use crate::fetch::wfs::WfsEndpoint;

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Service WFS des peuplements forestiers
    pub stand_service: ServiceConfig,

    /// Service WFS des parcelles cadastrales
    pub parcel_service: ServiceConfig,

    /// Système de référence métrique partagé
    #[serde(default = "default_srs")]
    pub srs_name: String,

    /// Demi-côté de la boîte de recherche autour d'un clic, en mètres
    #[serde(default = "default_search_radius")]
    pub search_radius_m: f64,

    /// Zoom minimal en dessous duquel les parcelles n'ont pas de sens :
    /// le cache est vidé sans requête
    #[serde(default = "default_min_parcel_zoom")]
    pub min_parcel_zoom: u8,

    /// Chemin d'une table de codes JSON, preset finlandais embarqué sinon
    #[serde(default)]
    pub code_tables: Option<String>,
}

/// Un service WFS configuré
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub type_name: String,

    /// Propriété portant la référence cadastrale (parcelles uniquement)
    #[serde(default)]
    pub reference_property: Option<String>,
}

fn default_srs() -> String {
    "EPSG:3067".to_string()
}

fn default_search_radius() -> f64 {
    200.0
}

fn default_min_parcel_zoom() -> u8 {
    12
}

impl Config {
    /// Charge une configuration depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Preset embarqué : services ouverts Metsäkeskus + MML
    pub fn default_preset() -> Result<Self> {
        serde_json::from_str(include_str!("presets/default.json"))
            .context("Failed to parse embedded config")
    }

    /// Endpoint WFS des peuplements
    pub fn stand_endpoint(&self) -> WfsEndpoint {
        WfsEndpoint::new(
            &self.stand_service.base_url,
            &self.stand_service.type_name,
            &self.srs_name,
        )
    }

    /// Endpoint WFS des parcelles
    pub fn parcel_endpoint(&self) -> WfsEndpoint {
        WfsEndpoint::new(
            &self.parcel_service.base_url,
            &self.parcel_service.type_name,
            &self.srs_name,
        )
    }

    /// Tables de codes : fichier configuré, preset finlandais sinon
    pub fn code_tables(&self) -> Result<CodeTables> {
        match &self.code_tables {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .context(format!("Failed to read code tables: {}", path))?;
                CodeTables::from_json(&content).context("Failed to parse code tables JSON")
            }
            None => CodeTables::finnish().context("Failed to parse embedded code tables"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preset() {
        let config = Config::default_preset().unwrap();

        assert_eq!(config.srs_name, "EPSG:3067");
        assert_eq!(config.search_radius_m, 200.0);
        assert_eq!(config.min_parcel_zoom, 12);
        assert_eq!(config.stand_service.type_name, "v1:stand");
        assert_eq!(
            config.parcel_service.reference_property.as_deref(),
            Some("kiinteistotunnus")
        );
    }

    #[test]
    fn test_defaults_applied_on_partial_config() {
        let config: Config = serde_json::from_str(
            r#"{
                "stand_service": {"base_url": "http://localhost/wfs", "type_name": "t:stand"},
                "parcel_service": {"base_url": "http://localhost/wfs", "type_name": "t:parcel"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.srs_name, "EPSG:3067");
        assert_eq!(config.search_radius_m, 200.0);
        assert!(config.code_tables.is_none());
    }

    #[test]
    fn test_code_tables_embedded_default() {
        let config = Config::default_preset().unwrap();
        let codes = config.code_tables().unwrap();
        assert_eq!(codes.cutting_label(1), "Avohakkuu");
    }
}
