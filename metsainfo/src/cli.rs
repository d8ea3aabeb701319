//! Définition et implémentation des commandes CLI
//!
//! CLI simplifiée:
//! - `summary`: statistiques forestières depuis des fichiers GeoJSON
//! - `check-reference`: validation et normalisation d'une référence
//!   cadastrale
//! - `wfs-urls`: URLs GetFeature qu'un hôte réseau émettrait pour une
//!   requête donnée

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use geo::Coord;
use tracing::info;

use metsavara::{aggregate, filter_stands_for_parcels, Bounds, PropertyReference};

use crate::config::Config;
use crate::fetch::file::FileSource;
use crate::ingest;
use crate::report::SummaryReport;
use crate::session::Session;

#[derive(Subcommand)]
pub enum Commands {
    /// Compute forest statistics from GeoJSON stand and parcel documents
    Summary {
        /// Path to a GeoJSON FeatureCollection of forest stands
        #[arg(short, long)]
        stands: PathBuf,

        /// Path to a GeoJSON FeatureCollection of cadastral parcels
        #[arg(short, long)]
        parcels: Option<PathBuf>,

        /// Restrict to one logical parcel (kiinteistötunnus, hyphenated or
        /// 14-digit form)
        #[arg(short, long)]
        reference: Option<String>,

        /// Write the report as JSON to this path
        #[arg(short, long)]
        json: Option<PathBuf>,

        /// Path to a JSON config file (embedded Finnish preset by default)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a cadastral property reference and show its normalized form
    CheckReference {
        /// Reference to check (ex: 92-416-11-123 or 09241600110123)
        reference: String,
    },

    /// Print the WFS GetFeature URLs a network host would issue
    WfsUrls {
        /// Planar metric point "x,y" to build bbox queries around
        #[arg(short = 'P', long)]
        point: Option<String>,

        /// Cadastral reference to build the parcel filter query for
        #[arg(short, long)]
        reference: Option<String>,

        /// Path to a JSON config file (embedded Finnish preset by default)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::default_preset(),
    }
}

/// Exécute la commande summary
pub async fn cmd_summary(
    stands_path: &Path,
    parcels_path: Option<&Path>,
    reference: Option<&str>,
    json_path: Option<&Path>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let codes = config.code_tables()?;

    let report = match reference {
        Some(reference) => {
            // Le chemin par référence passe par la session : même code que
            // pour un service distant, la source fichier en tient lieu
            let source = FileSource::new(stands_path, parcels_path.map(PathBuf::from));
            let session = Session::new(
                source,
                codes,
                config.search_radius_m,
                config.min_parcel_zoom,
            );
            let summary = session.query_reference(reference).await?;
            SummaryReport::for_reference(
                summary.reference.normalized().to_string(),
                summary.parts.len(),
                summary.stats,
            )
        }
        None => {
            let document = std::fs::read_to_string(stands_path)
                .context(format!("Failed to read stands: {}", stands_path.display()))?;
            let stands = ingest::parse_stands(&document)?;

            let stands = match parcels_path {
                Some(parcels_path) => {
                    let document = std::fs::read_to_string(parcels_path).context(format!(
                        "Failed to read parcels: {}",
                        parcels_path.display()
                    ))?;
                    let parcels = ingest::parse_parcels(&document)?;
                    info!(
                        stands = stands.len(),
                        parcels = parcels.len(),
                        "Matching stands against all parcels"
                    );
                    filter_stands_for_parcels(&stands, &parcels)
                }
                None => stands,
            };

            SummaryReport::global(aggregate(&stands, &codes))
        }
    };

    report.display();
    if let Some(path) = json_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report written");
    }

    Ok(())
}

/// Exécute la commande wfs-urls
pub fn cmd_wfs_urls(
    point: Option<&str>,
    reference: Option<&str>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path)?;
    for url in wfs_urls(&config, point, reference)? {
        println!("{}", url);
    }
    Ok(())
}

/// URLs GetFeature pour un point (bbox peuplements + parcelles) et/ou une
/// référence cadastrale (filtre d'égalité sur la propriété configurée)
fn wfs_urls(config: &Config, point: Option<&str>, reference: Option<&str>) -> Result<Vec<String>> {
    if point.is_none() && reference.is_none() {
        bail!("Provide --point and/or --reference");
    }

    let mut urls = Vec::new();

    if let Some(point) = point {
        let center = parse_point(point)?;
        let bounds = Bounds::around(center, config.search_radius_m);
        urls.push(config.stand_endpoint().get_feature_bbox(&bounds));
        urls.push(config.parcel_endpoint().get_feature_bbox(&bounds));
    }

    if let Some(reference) = reference {
        let parsed = PropertyReference::parse(reference)?;
        let property = config
            .parcel_service
            .reference_property
            .as_deref()
            .context("No reference_property configured for the parcel service")?;
        urls.push(
            config
                .parcel_endpoint()
                .get_feature_by_property(property, parsed.normalized()),
        );
    }

    Ok(urls)
}

fn parse_point(input: &str) -> Result<Coord> {
    let (x, y) = input
        .split_once(',')
        .context("Expected a point like 430000,6930000")?;
    let x: f64 = x.trim().parse().context("Invalid x coordinate")?;
    let y: f64 = y.trim().parse().context("Invalid y coordinate")?;
    Ok(Coord { x, y })
}

/// Exécute la commande check-reference
pub fn cmd_check_reference(reference: &str) -> Result<()> {
    let parsed = PropertyReference::parse(reference)?;

    println!("Input:        {}", reference);
    println!("Normalized:   {}", parsed.normalized());
    println!("Display form: {}", parsed);
    println!("Municipality: {}", parsed.municipality());

    Ok(())
}
