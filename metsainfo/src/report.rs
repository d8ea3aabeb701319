//! Rapport de synthèse
//!
//! Mise en forme du résultat d'une requête : sections console lisibles et
//! export JSON. Les libellés arrivent déjà résolus dans les statistiques.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use metsavara::{AggregateStatistics, FieldSummary};

/// Rapport sérialisable d'une requête de synthèse
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    /// Référence cadastrale normalisée, absente pour une synthèse globale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Nombre de parties de la parcelle logique, absent sans parcelle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parcel_parts: Option<usize>,

    pub statistics: AggregateStatistics,
}

impl SummaryReport {
    pub fn global(statistics: AggregateStatistics) -> Self {
        Self {
            reference: None,
            parcel_parts: None,
            statistics,
        }
    }

    pub fn for_reference(
        reference: String,
        parcel_parts: usize,
        statistics: AggregateStatistics,
    ) -> Self {
        Self {
            reference: Some(reference),
            parcel_parts: Some(parcel_parts),
            statistics,
        }
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        let stats = &self.statistics;

        println!("\n{}", "=".repeat(60));
        match &self.reference {
            Some(reference) => println!("FOREST SUMMARY — PARCEL {}", reference),
            None => println!("FOREST SUMMARY"),
        }
        println!("{}", "=".repeat(60));

        if let Some(parts) = self.parcel_parts {
            println!("  Parcel parts:       {}", parts);
        }
        println!("  Stands:             {}", stats.count);
        println!("  Total area:         {:.1} ha", stats.total_area);
        println!("  Total volume:       {:.0} m³", stats.total_volume);
        println!("  Mean volume:        {:.0} m³/ha", stats.avg_volume);

        if stats.count == 0 {
            println!("{}", "=".repeat(60));
            return;
        }

        println!("\n  Mean values (stands with data)");
        print_field("Age", &stats.age, "y");
        print_field("Height", &stats.height, "m");
        print_field("Diameter", &stats.diameter, "cm");
        print_field("Growth", &stats.growth, "m³/ha/y");
        print_field("Sawlog", &stats.sawlog, "m³/ha");
        print_field("Pulpwood", &stats.pulpwood, "m³/ha");
        print_field("Basal area", &stats.basal_area, "m²/ha");
        print_field("Stems", &stats.stem_count, "/ha");

        println!("\n  Species distribution");
        println!("    Pine:             {} %", stats.species.pine);
        println!("    Spruce:           {} %", stats.species.spruce);
        println!("    Other:            {} %", stats.species.other);

        if !stats.cutting_proposals.is_empty() {
            println!("\n  Cutting proposals");
            for group in &stats.cutting_proposals {
                println!(
                    "    {:<24} {:>3} stand(s){}",
                    group.name,
                    group.count,
                    year_suffix(group.earliest_year)
                );
            }
        }
        if !stats.silviculture_proposals.is_empty() {
            println!("\n  Silviculture proposals");
            for group in &stats.silviculture_proposals {
                println!(
                    "    {:<24} {:>3} stand(s){}",
                    group.name,
                    group.count,
                    year_suffix(group.earliest_year)
                );
            }
        }

        if !stats.fertility_distribution.is_empty() {
            println!("\n  Fertility classes");
            for share in &stats.fertility_distribution {
                println!("    {:<24} {:>7.1} ha", share.name, share.area);
            }
        }
        if !stats.development_distribution.is_empty() {
            println!("\n  Development classes");
            for share in &stats.development_distribution {
                println!("    {:<24} {:>3} stand(s)", share.name, share.count);
            }
        }

        println!("{}", "=".repeat(60));
    }

    /// Écrit le rapport en JSON indenté
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }
}

fn print_field(label: &str, field: &FieldSummary, unit: &str) {
    if field.count == 0 {
        return;
    }
    println!(
        "    {:<10} {:>8.1} {} ({} stand(s))",
        format!("{}:", label),
        field.mean,
        unit,
        field.count
    );
}

fn year_suffix(year: Option<i32>) -> String {
    match year {
        Some(year) => format!(", earliest {}", year),
        None => String::new(),
    }
}
