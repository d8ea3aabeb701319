//! Agrégation statistique des peuplements appariés
//!
//! Tout est recalculé de zéro à chaque requête : le résultat est un
//! instantané dérivé, jamais mis à jour incrémentalement. Une entrée vide
//! produit un enregistrement à zéro, jamais une erreur ni une division
//! par zéro.

use std::collections::HashMap;

use serde::Serialize;

use crate::codes::{CodeTables, SpeciesGroup};
use crate::types::StandFeature;

/// Statistiques agrégées sur un ensemble de peuplements
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStatistics {
    /// Nombre de peuplements
    pub count: usize,

    /// Surface totale en hectares
    pub total_area: f64,

    /// Volume total pondéré par la surface, en m³ (Σ volume × surface)
    pub total_volume: f64,

    /// Moyenne simple du volume en m³/ha — délibérément distincte du
    /// volume total pondéré ci-dessus
    pub avg_volume: f64,

    /// Âge moyen (années)
    pub age: FieldSummary,

    /// Hauteur moyenne (m)
    pub height: FieldSummary,

    /// Diamètre moyen (cm)
    pub diameter: FieldSummary,

    /// Croissance annuelle (m³/ha/an)
    pub growth: FieldSummary,

    /// Bois d'œuvre (m³/ha)
    pub sawlog: FieldSummary,

    /// Bois de trituration (m³/ha)
    pub pulpwood: FieldSummary,

    /// Surface terrière (m²/ha)
    pub basal_area: FieldSummary,

    /// Tiges par hectare
    pub stem_count: FieldSummary,

    /// Répartition pin/épicéa/autres en pourcentages entiers
    pub species: SpeciesShare,

    /// Coupes recommandées, triées par occurrences décroissantes
    pub cutting_proposals: Vec<ProposalGroup>,

    /// Travaux sylvicoles recommandés, triés par occurrences décroissantes
    pub silviculture_proposals: Vec<ProposalGroup>,

    /// Répartition des classes de fertilité par surface cumulée décroissante
    pub fertility_distribution: Vec<FertilityShare>,

    /// Répartition des classes de développement par nombre de peuplements
    /// décroissant
    pub development_distribution: Vec<DevelopmentShare>,
}

/// Résumé d'un champ numérique : moyenne, extrêmes et effectif
///
/// Seules les valeurs présentes et non nulles participent — un peuplement
/// sans hauteur contribue quand même à la moyenne d'âge, les champs sont
/// indépendants.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct FieldSummary {
    pub mean: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
}

/// Répartition pin/épicéa/autres, en pourcentages entiers sommant à 100
/// dès que la surface totale est positive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpeciesShare {
    pub pine: i32,
    pub spruce: i32,
    pub other: i32,
}

impl SpeciesShare {
    pub fn total(&self) -> i32 {
        self.pine + self.spruce + self.other
    }
}

/// Groupe de recommandations partageant un code de proposition
#[derive(Debug, Clone, Serialize)]
pub struct ProposalGroup {
    /// Code de la proposition
    pub code: u8,
    /// Libellé résolu via les tables de codes injectées
    pub name: String,
    /// Nombre de peuplements portant ce code
    pub count: usize,
    /// Année proposée la plus proche (minimum des années vues), absente si
    /// aucun peuplement du groupe ne porte d'année
    pub earliest_year: Option<i32>,
}

/// Part d'une classe de fertilité, en surface cumulée
#[derive(Debug, Clone, Serialize)]
pub struct FertilityShare {
    pub code: u8,
    pub name: String,
    pub area: f64,
}

/// Part d'une classe de développement, en nombre de peuplements
#[derive(Debug, Clone, Serialize)]
pub struct DevelopmentShare {
    pub code: String,
    pub name: String,
    pub count: usize,
}

/// Accumulateur d'un champ : somme, effectif, extrêmes
#[derive(Debug, Default)]
struct FieldAcc {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl FieldAcc {
    /// Une valeur absente ou nulle exclut le peuplement de ce champ
    fn add(&mut self, value: Option<f64>) {
        let Some(v) = value else { return };
        if v == 0.0 {
            return;
        }
        self.sum += v;
        self.count += 1;
        self.min = Some(self.min.map_or(v, |m| m.min(v)));
        self.max = Some(self.max.map_or(v, |m| m.max(v)));
    }

    fn finish(&self) -> FieldSummary {
        FieldSummary {
            mean: if self.count > 0 {
                self.sum / self.count as f64
            } else {
                0.0
            },
            min: self.min,
            max: self.max,
            count: self.count,
        }
    }
}

/// Accumulateur de propositions groupées par code
#[derive(Debug, Default)]
struct ProposalAcc {
    groups: HashMap<u8, (usize, Option<i32>)>,
}

impl ProposalAcc {
    fn add(&mut self, code: Option<u8>, year: Option<i32>) {
        // Un peuplement sans code est exclu du regroupement, il ne compte
        // pas comme « sans recommandation »
        let Some(code) = code else { return };
        let entry = self.groups.entry(code).or_insert((0, None));
        entry.0 += 1;
        if let Some(year) = year {
            entry.1 = Some(entry.1.map_or(year, |y: i32| y.min(year)));
        }
    }

    fn finish(&self, label: impl Fn(u8) -> String) -> Vec<ProposalGroup> {
        let mut groups: Vec<ProposalGroup> = self
            .groups
            .iter()
            .map(|(&code, &(count, earliest_year))| ProposalGroup {
                code,
                name: label(code),
                count,
                earliest_year,
            })
            .collect();
        // Occurrences décroissantes, code croissant à égalité pour un
        // ordre déterministe
        groups.sort_by(|a, b| b.count.cmp(&a.count).then(a.code.cmp(&b.code)));
        groups
    }
}

/// Agrège un ensemble de peuplements en statistiques de synthèse
///
/// Les libellés sont résolus via les tables de codes injectées. L'entrée
/// n'est jamais modifiée, le résultat est une nouvelle allocation.
pub fn aggregate(stands: &[StandFeature], codes: &CodeTables) -> AggregateStatistics {
    let mut stats = AggregateStatistics {
        count: stands.len(),
        ..Default::default()
    };

    if stands.is_empty() {
        return stats;
    }

    let mut volume_sum = 0.0;
    let mut age = FieldAcc::default();
    let mut height = FieldAcc::default();
    let mut diameter = FieldAcc::default();
    let mut growth = FieldAcc::default();
    let mut sawlog = FieldAcc::default();
    let mut pulpwood = FieldAcc::default();
    let mut basal_area = FieldAcc::default();
    let mut stem_count = FieldAcc::default();

    let mut weighted_pine = 0.0;
    let mut weighted_spruce = 0.0;
    let mut weighted_other = 0.0;

    let mut cutting = ProposalAcc::default();
    let mut silviculture = ProposalAcc::default();

    let mut fertility_area: HashMap<u8, f64> = HashMap::new();
    let mut development_count: HashMap<String, usize> = HashMap::new();

    for stand in stands {
        let attrs = &stand.attributes;
        let area = attrs.area.unwrap_or(0.0);

        stats.total_area += area;
        stats.total_volume += attrs.volume.unwrap_or(0.0) * area;
        volume_sum += attrs.volume.unwrap_or(0.0);

        age.add(attrs.mean_age);
        height.add(attrs.mean_height);
        diameter.add(attrs.mean_diameter);
        growth.add(attrs.volume_growth);
        sawlog.add(attrs.sawlog_volume);
        pulpwood.add(attrs.pulpwood_volume);
        basal_area.add(attrs.basal_area);
        stem_count.add(attrs.stem_count);

        // Proportions d'essences : explicites si présentes, sinon 100 % au
        // groupe de l'essence principale
        let mut pine = attrs.proportion_pine.unwrap_or(0.0);
        let mut spruce = attrs.proportion_spruce.unwrap_or(0.0);
        let mut other = attrs.proportion_other.unwrap_or(0.0);

        if pine + spruce + other == 0.0 {
            if let Some(species) = attrs.main_tree_species {
                match SpeciesGroup::from_species_code(species) {
                    SpeciesGroup::Pine => pine = 100.0,
                    SpeciesGroup::Spruce => spruce = 100.0,
                    SpeciesGroup::OtherDeciduous => other = 100.0,
                }
            }
        }

        weighted_pine += pine * area;
        weighted_spruce += spruce * area;
        weighted_other += other * area;

        cutting.add(attrs.cutting_type, attrs.cutting_year);
        silviculture.add(attrs.silviculture_type, attrs.silviculture_year);

        if let Some(class) = attrs.fertility_class {
            *fertility_area.entry(class).or_insert(0.0) += area;
        }
        if let Some(class) = &attrs.development_class {
            *development_count.entry(class.clone()).or_insert(0) += 1;
        }
    }

    stats.avg_volume = volume_sum / stands.len() as f64;
    stats.age = age.finish();
    stats.height = height.finish();
    stats.diameter = diameter.finish();
    stats.growth = growth.finish();
    stats.sawlog = sawlog.finish();
    stats.pulpwood = pulpwood.finish();
    stats.basal_area = basal_area.finish();
    stats.stem_count = stem_count.finish();

    // Pondération par la surface, PUIS arrondi, PUIS correction pour que le
    // total fasse exactement 100 — cet ordre change le résultat et doit
    // être préservé. Le reste d'arrondi part dans « autres ».
    if stats.total_area > 0.0 {
        let pine = (weighted_pine / stats.total_area).round() as i32;
        let spruce = (weighted_spruce / stats.total_area).round() as i32;
        let other = (weighted_other / stats.total_area).round() as i32;
        stats.species = SpeciesShare {
            pine,
            spruce,
            other: other + (100 - pine - spruce - other),
        };
    }

    stats.cutting_proposals = cutting.finish(|code| codes.cutting_label(code));
    stats.silviculture_proposals = silviculture.finish(|code| codes.silviculture_label(code));

    let mut fertility: Vec<FertilityShare> = fertility_area
        .into_iter()
        .map(|(code, area)| FertilityShare {
            code,
            name: codes.fertility_label(code),
            area,
        })
        .collect();
    fertility.sort_by(|a, b| {
        b.area
            .partial_cmp(&a.area)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.code.cmp(&b.code))
    });
    stats.fertility_distribution = fertility;

    let mut development: Vec<DevelopmentShare> = development_count
        .into_iter()
        .map(|(code, count)| DevelopmentShare {
            name: codes.development_label(&code),
            code,
            count,
        })
        .collect();
    development.sort_by(|a, b| b.count.cmp(&a.count).then(a.code.cmp(&b.code)));
    stats.development_distribution = development;

    stats
}
