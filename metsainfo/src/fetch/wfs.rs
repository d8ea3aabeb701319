//! Construction de requêtes WFS 2.0 GetFeature
//!
//! Construction pure d'URLs — aucun client HTTP ici. L'hôte qui implémente
//! `FeatureSource` au-dessus du réseau s'en sert pour interroger les
//! services Metsäkeskus (peuplements) et MML (parcelles).

use metsavara::Bounds;

/// Un service WFS et sa couche
#[derive(Debug, Clone)]
pub struct WfsEndpoint {
    /// URL de base du service (ex: `https://avoin.metsakeskus.fi/rajapinnat/v1/stand/ows`)
    pub base_url: String,

    /// Nom de la couche (ex: `v1:stand`)
    pub type_name: String,

    /// Système de référence demandé (ex: `EPSG:3067`)
    pub srs_name: String,
}

impl WfsEndpoint {
    pub fn new(
        base_url: impl Into<String>,
        type_name: impl Into<String>,
        srs_name: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            type_name: type_name.into(),
            srs_name: srs_name.into(),
        }
    }

    fn base_params(&self) -> String {
        format!(
            "service=WFS&version=2.0.0&request=GetFeature&typeName={}&outputFormat={}&srsName={}",
            encode_component(&self.type_name),
            encode_component("application/json"),
            encode_component(&self.srs_name),
        )
    }

    /// URL GetFeature pour une emprise : `bbox=minx,miny,maxx,maxy,CRS`
    pub fn get_feature_bbox(&self, bounds: &Bounds) -> String {
        format!(
            "{}?{}&bbox={},{},{},{},{}",
            self.base_url,
            self.base_params(),
            bounds.min_x,
            bounds.min_y,
            bounds.max_x,
            bounds.max_y,
            encode_component(&self.srs_name),
        )
    }

    /// URL GetFeature filtrée sur l'égalité d'une propriété (filtre CQL)
    pub fn get_feature_by_property(&self, property: &str, value: &str) -> String {
        let filter = format!("{}='{}'", property, value.replace('\'', "''"));
        format!(
            "{}?{}&CQL_FILTER={}",
            self.base_url,
            self.base_params(),
            encode_component(&filter),
        )
    }
}

/// Encodage percent minimal pour un composant de query string
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b':' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
