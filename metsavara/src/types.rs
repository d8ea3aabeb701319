//! Types de données pour le crate metsavara
//!
//! Les géométries utilisent les types `geo` et sont exprimées dans un
//! référentiel métrique plan unique (EPSG:3067 en pratique). La reprojection
//! se fait en amont, jamais ici.

use geo::{Coord, Geometry};

use crate::reference::PropertyReference;

/// Un peuplement forestier (kuvio) avec sa géométrie et ses attributs
///
/// Immutable une fois construit : le moteur ne modifie jamais une géométrie
/// reçue, toutes les structures dérivées sont de nouvelles allocations.
#[derive(Debug, Clone)]
pub struct StandFeature {
    /// Identifiant attribué par le service source
    pub id: String,

    /// Géométrie (Polygon ou MultiPolygon), absente si le service n'en
    /// fournit pas — un peuplement sans géométrie est exclu du matching,
    /// jamais une erreur
    pub geometry: Option<Geometry>,

    /// Attributs d'inventaire forestier
    pub attributes: StandAttributes,
}

/// Attributs d'un peuplement, champs nommés optionnels
///
/// Remplace le sac de propriétés dynamiques du service WFS par un
/// enregistrement figé : l'agrégateur ne dépend plus de clés textuelles.
#[derive(Debug, Clone, Default)]
pub struct StandAttributes {
    /// Numéro du peuplement (STANDNUMBER)
    pub stand_number: Option<u32>,

    /// Surface en hectares (AREA)
    pub area: Option<f64>,

    /// Volume sur pied en m³/ha (VOLUME)
    pub volume: Option<f64>,

    /// Âge moyen en années (MEANAGE)
    pub mean_age: Option<f64>,

    /// Hauteur moyenne en mètres (MEANHEIGHT)
    pub mean_height: Option<f64>,

    /// Diamètre moyen en centimètres (MEANDIAMETER)
    pub mean_diameter: Option<f64>,

    /// Croissance annuelle en m³/ha/an (VOLUMEGROWTH)
    pub volume_growth: Option<f64>,

    /// Volume de bois d'œuvre en m³/ha (SAWLOGVOLUME)
    pub sawlog_volume: Option<f64>,

    /// Volume de bois de trituration en m³/ha (PULPWOODVOLUME)
    pub pulpwood_volume: Option<f64>,

    /// Surface terrière en m²/ha (BASALAREA)
    pub basal_area: Option<f64>,

    /// Nombre de tiges par hectare (STEMCOUNT)
    pub stem_count: Option<f64>,

    /// Proportion de pin en % (PROPORTIONPINE)
    pub proportion_pine: Option<f64>,

    /// Proportion d'épicéa en % (PROPORTIONSPRUCE)
    pub proportion_spruce: Option<f64>,

    /// Proportion d'autres essences (feuillus) en % (PROPORTIONOTHER)
    pub proportion_other: Option<f64>,

    /// Code de l'essence principale (MAINTREESPECIES)
    pub main_tree_species: Option<u16>,

    /// Classe de développement (DEVELOPMENTCLASS, code alphanumérique)
    pub development_class: Option<String>,

    /// Classe de fertilité (FERTILITYCLASS)
    pub fertility_class: Option<u8>,

    /// Type de sol (SOILTYPE)
    pub soil_type: Option<u8>,

    /// Coupe recommandée (CUTTINGTYPE)
    pub cutting_type: Option<u8>,

    /// Année proposée pour la coupe (CUTTINGYEAR)
    pub cutting_year: Option<i32>,

    /// Travail sylvicole recommandé (SILVICULTURETYPE)
    pub silviculture_type: Option<u8>,

    /// Année proposée pour le travail sylvicole (SILVICULTUREYEAR)
    pub silviculture_year: Option<i32>,

    /// Date de mesure (DATASOURCEDATE, texte ISO tel que fourni)
    pub measurement_date: Option<String>,
}

/// Une parcelle cadastrale (kiinteistö), éventuellement une partie d'une
/// parcelle logique multi-parties
///
/// Plusieurs `ParcelFeature` disjointes peuvent partager le même
/// kiinteistötunnus : elles forment alors une seule parcelle logique pour
/// le matching (sémantique d'union).
#[derive(Debug, Clone)]
pub struct ParcelFeature {
    /// Identifiant attribué par le service source
    pub id: String,

    /// Référence cadastrale normalisée, absente pour certaines couches
    pub reference: Option<PropertyReference>,

    /// Libellé d'affichage optionnel
    pub label: Option<String>,

    /// Géométrie (Polygon ou MultiPolygon)
    pub geometry: Option<Geometry>,
}

impl ParcelFeature {
    /// Clé d'identité pour le cache et le regroupement multi-parties :
    /// la référence cadastrale normalisée, sinon l'identifiant du service
    pub fn cache_key(&self) -> &str {
        match &self.reference {
            Some(r) => r.normalized(),
            None => &self.id,
        }
    }
}

/// Boîte englobante dans le référentiel métrique plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Boîte sentinelle vide (±infini), invalide tant qu'aucun point
    /// n'a été ajouté
    pub fn empty() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// Étend la boîte pour couvrir un point
    pub fn extend(&mut self, coord: Coord) {
        self.min_x = self.min_x.min(coord.x);
        self.min_y = self.min_y.min(coord.y);
        self.max_x = self.max_x.max(coord.x);
        self.max_y = self.max_y.max(coord.y);
    }

    /// Étend la boîte pour couvrir une autre boîte
    pub fn extend_bounds(&mut self, other: &Bounds) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Vraie si au moins un point a été couvert
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Boîte élargie d'une marge en mètres de chaque côté
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min_x: self.min_x - margin,
            min_y: self.min_y - margin,
            max_x: self.max_x + margin,
            max_y: self.max_y + margin,
        }
    }

    /// Boîte carrée centrée sur un point, demi-côté `radius`
    pub fn around(center: Coord, radius: f64) -> Self {
        Self {
            min_x: center.x - radius,
            min_y: center.y - radius,
            max_x: center.x + radius,
            max_y: center.y + radius,
        }
    }

    /// Test d'intersection (bords inclus)
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Vraie si le point est dans la boîte (bords inclus)
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= self.min_x
            && coord.x <= self.max_x
            && coord.y >= self.min_y
            && coord.y <= self.max_y
    }
}
