//! Cache des parcelles de la vue courante
//!
//! Le cache associe une identité cadastrale (ou l'identifiant du service à
//! défaut) à la dernière `ParcelFeature` vue. Il n'a aucune notion de
//! fraîcheur : sa validité est entièrement liée à « la vue a-t-elle
//! changé », décision qui appartient à la couche d'orchestration. À chaque
//! changement de vue, le contenu est remplacé en bloc — jamais fusionné —
//! si bien qu'aucune entrée ne survit à la vue qui l'a produite.

use std::collections::HashMap;

use tracing::debug;

use crate::types::ParcelFeature;

/// Cache de parcelles, propriété d'un objet explicite (pas d'état global)
#[derive(Debug, Default)]
pub struct ParcelCache {
    entries: HashMap<String, ParcelFeature>,
}

impl ParcelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace tout le contenu par le jeu de parcelles de la vue courante
    ///
    /// Les entrées sont indexées par `cache_key()` ; deux parties portant
    /// la même clé ne produisent qu'une entrée (la dernière gagne), le
    /// cache ne contient jamais deux entrées pour une même clé.
    pub fn replace(&mut self, features: Vec<ParcelFeature>) {
        self.entries.clear();
        for feature in features {
            let key = feature.cache_key().to_string();
            self.entries.insert(key, feature);
        }
        debug!(parcels = self.entries.len(), "Parcel cache replaced");
    }

    /// Parcelle connue pour cette clé, utilisée pour dédupliquer
    /// l'affichage
    pub fn get(&self, key: &str) -> Option<&ParcelFeature> {
        self.entries.get(key)
    }

    /// Vraie si la clé est déjà connue de la vue courante
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Vide le cache, notamment quand le zoom passe sous le seuil où les
    /// parcelles ont un sens
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!(parcels = self.entries.len(), "Parcel cache cleared");
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Itère sur les parcelles de la vue courante, ordre non spécifié
    pub fn iter(&self) -> impl Iterator<Item = &ParcelFeature> {
        self.entries.values()
    }
}
