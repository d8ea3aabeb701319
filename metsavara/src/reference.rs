//! Référence cadastrale finlandaise (kiinteistötunnus)
//!
//! Une référence identifie une parcelle logique : code commune (3 chiffres),
//! zone (3 chiffres), groupe (4 chiffres), unité (4 chiffres), soit 14
//! chiffres une fois normalisée. La saisie utilisateur arrive le plus
//! souvent sous forme abrégée avec tirets (`92-416-11-123`).

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::MetsavaraError;

fn hyphenated_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,3})-(\d{1,3})-(\d{1,4})-(\d{1,4})$").unwrap())
}

fn plain_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{14}$").unwrap())
}

/// Référence cadastrale normalisée (14 chiffres)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyReference(String);

impl PropertyReference {
    /// Parse une référence cadastrale, abrégée avec tirets ou déjà sous
    /// forme 14 chiffres.
    ///
    /// La validation se fait ici, avant toute requête réseau : une saisie
    /// invalide est une erreur de validation, jamais un échec de fetch.
    pub fn parse(input: &str) -> Result<Self, MetsavaraError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(MetsavaraError::invalid_reference(input, "empty input"));
        }

        if plain_pattern().is_match(trimmed) {
            return Ok(Self(trimmed.to_string()));
        }

        if let Some(caps) = hyphenated_pattern().captures(trimmed) {
            let normalized = format!(
                "{:0>3}{:0>3}{:0>4}{:0>4}",
                &caps[1], &caps[2], &caps[3], &caps[4]
            );
            return Ok(Self(normalized));
        }

        Err(MetsavaraError::invalid_reference(
            input,
            "expected 14 digits or the hyphenated form like 92-416-11-123",
        ))
    }

    /// Forme normalisée sur 14 chiffres, clé d'identité pour le cache et
    /// le regroupement multi-parties
    pub fn normalized(&self) -> &str {
        &self.0
    }

    /// Code commune (3 premiers chiffres)
    pub fn municipality(&self) -> &str {
        &self.0[0..3]
    }
}

impl fmt::Display for PropertyReference {
    /// Forme d'affichage abrégée avec tirets, sans zéros de tête
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = [&self.0[0..3], &self.0[3..6], &self.0[6..10], &self.0[10..14]];
        let mut first = true;
        for part in parts {
            if !first {
                write!(f, "-")?;
            }
            first = false;
            let trimmed = part.trim_start_matches('0');
            write!(f, "{}", if trimmed.is_empty() { "0" } else { trimmed })?;
        }
        Ok(())
    }
}

impl FromStr for PropertyReference {
    type Err = MetsavaraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
