//! Tables de codes de l'inventaire forestier
//!
//! Les codes (essences, classes de fertilité, coupes, travaux sylvicoles,
//! classes de développement, types de sol) sont injectés plutôt que câblés
//! dans l'agrégateur : un preset finlandais est embarqué, une table
//! alternative peut être chargée depuis un JSON pour la localisation ou
//! une autre version du référentiel.

use std::collections::HashMap;

use serde::Deserialize;

use crate::MetsavaraError;

/// Regroupement d'essences utilisé pour la répartition pin/épicéa/autres
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeciesGroup {
    /// Pin sylvestre (code essence 1)
    Pine,
    /// Épicéa commun (code essence 2)
    Spruce,
    /// Toutes les autres essences, feuillus compris
    OtherDeciduous,
}

impl SpeciesGroup {
    /// Groupe correspondant à un code d'essence principale
    pub fn from_species_code(code: u16) -> Self {
        match code {
            1 => Self::Pine,
            2 => Self::Spruce,
            _ => Self::OtherDeciduous,
        }
    }
}

/// Tables de correspondance code → libellé d'affichage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeTables {
    /// Essences (MAINTREESPECIES)
    #[serde(default)]
    pub tree_species: HashMap<u16, String>,

    /// Classes de fertilité (FERTILITYCLASS)
    #[serde(default)]
    pub fertility_class: HashMap<u8, String>,

    /// Types de sol (SOILTYPE)
    #[serde(default)]
    pub soil_type: HashMap<u8, String>,

    /// Coupes recommandées (CUTTINGTYPE)
    #[serde(default)]
    pub cutting_type: HashMap<u8, String>,

    /// Travaux sylvicoles recommandés (SILVICULTURETYPE)
    #[serde(default)]
    pub silviculture_type: HashMap<u8, String>,

    /// Classes de développement (DEVELOPMENTCLASS, codes alphanumériques)
    #[serde(default)]
    pub development_class: HashMap<String, String>,
}

impl CodeTables {
    /// Charge le preset finlandais embarqué (référentiel Metsäkeskus)
    pub fn finnish() -> Result<Self, MetsavaraError> {
        Self::from_json(include_str!("presets/fi.json"))
    }

    /// Charge des tables depuis un document JSON
    pub fn from_json(json: &str) -> Result<Self, MetsavaraError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Libellé d'une coupe recommandée, `#<code>` si inconnue
    pub fn cutting_label(&self, code: u8) -> String {
        label_or_code(self.cutting_type.get(&code), code)
    }

    /// Libellé d'un travail sylvicole recommandé, `#<code>` si inconnu
    pub fn silviculture_label(&self, code: u8) -> String {
        label_or_code(self.silviculture_type.get(&code), code)
    }

    /// Libellé d'une classe de fertilité, `#<code>` si inconnue
    pub fn fertility_label(&self, code: u8) -> String {
        label_or_code(self.fertility_class.get(&code), code)
    }

    /// Libellé d'un type de sol, `#<code>` si inconnu
    pub fn soil_label(&self, code: u8) -> String {
        label_or_code(self.soil_type.get(&code), code)
    }

    /// Libellé d'une essence, `#<code>` si inconnue
    pub fn species_label(&self, code: u16) -> String {
        label_or_code(self.tree_species.get(&code), code)
    }

    /// Libellé d'une classe de développement, `#<code>` si inconnue
    pub fn development_label(&self, code: &str) -> String {
        match self.development_class.get(code) {
            Some(label) => label.clone(),
            None => format!("#{}", code),
        }
    }
}

fn label_or_code<C: std::fmt::Display>(label: Option<&String>, code: C) -> String {
    match label {
        Some(label) => label.clone(),
        None => format!("#{}", code),
    }
}
