//! Ingestion GeoJSON → types du cœur
//!
//! Les réponses WFS (FeatureCollection GeoJSON) sont converties en
//! `StandFeature` / `ParcelFeature`. Les coordonnées sont supposées déjà
//! dans le référentiel métrique plan demandé au service (EPSG:3067) — la
//! reprojection n'appartient pas à ce dépôt. Une géométrie illisible
//! n'est jamais fatale : la feature est conservée sans géométrie et sera
//! exclue de l'appariement.

use anyhow::{Context, Result};
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;
use tracing::warn;

use metsavara::{ParcelFeature, PropertyReference, StandAttributes, StandFeature};

/// Parse une FeatureCollection de peuplements forestiers (couche
/// Metsäkeskus `v1:stand`)
pub fn parse_stands(document: &str) -> Result<Vec<StandFeature>> {
    let collection = parse_collection(document)?;

    let mut stands = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let id = feature_id(&feature, index);
        let geometry = convert_geometry(&id, feature.geometry.as_ref());
        let props = feature.properties.unwrap_or_default();

        stands.push(StandFeature {
            geometry,
            attributes: StandAttributes {
                stand_number: prop_u32(&props, "STANDNUMBER"),
                area: prop_f64(&props, "AREA"),
                volume: prop_f64(&props, "VOLUME"),
                mean_age: prop_f64(&props, "MEANAGE"),
                mean_height: prop_f64(&props, "MEANHEIGHT"),
                mean_diameter: prop_f64(&props, "MEANDIAMETER"),
                volume_growth: prop_f64(&props, "VOLUMEGROWTH"),
                sawlog_volume: prop_f64(&props, "SAWLOGVOLUME"),
                pulpwood_volume: prop_f64(&props, "PULPWOODVOLUME"),
                basal_area: prop_f64(&props, "BASALAREA"),
                stem_count: prop_f64(&props, "STEMCOUNT"),
                proportion_pine: prop_f64(&props, "PROPORTIONPINE"),
                proportion_spruce: prop_f64(&props, "PROPORTIONSPRUCE"),
                proportion_other: prop_f64(&props, "PROPORTIONOTHER"),
                main_tree_species: prop_u16(&props, "MAINTREESPECIES"),
                development_class: prop_string(&props, "DEVELOPMENTCLASS"),
                fertility_class: prop_u8(&props, "FERTILITYCLASS"),
                soil_type: prop_u8(&props, "SOILTYPE"),
                cutting_type: prop_u8(&props, "CUTTINGTYPE"),
                cutting_year: prop_i32(&props, "CUTTINGYEAR"),
                silviculture_type: prop_u8(&props, "SILVICULTURETYPE"),
                silviculture_year: prop_i32(&props, "SILVICULTUREYEAR"),
                measurement_date: prop_string(&props, "DATASOURCEDATE"),
            },
            id,
        });
    }

    Ok(stands)
}

/// Parse une FeatureCollection de parcelles cadastrales (couche MML)
pub fn parse_parcels(document: &str) -> Result<Vec<ParcelFeature>> {
    let collection = parse_collection(document)?;

    let mut parcels = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let id = feature_id(&feature, index);
        let geometry = convert_geometry(&id, feature.geometry.as_ref());
        let props = feature.properties.unwrap_or_default();

        let raw_reference = prop_string(&props, "KIINTEISTOTUNNUS")
            .or_else(|| prop_string(&props, "kiinteistotunnus"));
        let reference = match raw_reference {
            Some(raw) => match PropertyReference::parse(&raw) {
                Ok(reference) => Some(reference),
                Err(e) => {
                    // La feature reste utilisable, indexée par son id
                    warn!(parcel = %id, "Unparseable property reference: {}", e);
                    None
                }
            },
            None => None,
        };

        parcels.push(ParcelFeature {
            reference,
            label: prop_string(&props, "NIMI").or_else(|| prop_string(&props, "name")),
            geometry,
            id,
        });
    }

    Ok(parcels)
}

fn parse_collection(document: &str) -> Result<FeatureCollection> {
    let geojson: GeoJson = document
        .parse()
        .context("Failed to parse GeoJSON document")?;

    FeatureCollection::try_from(geojson).context("Expected a GeoJSON FeatureCollection")
}

fn feature_id(feature: &geojson::Feature, index: usize) -> String {
    match &feature.id {
        Some(geojson::feature::Id::String(s)) => s.clone(),
        Some(geojson::feature::Id::Number(n)) => n.to_string(),
        None => format!("feature.{}", index),
    }
}

/// Convertit la géométrie GeoJSON en `geo::Geometry`, `None` si absente ou
/// illisible (exclusion, pas d'erreur)
fn convert_geometry(id: &str, geometry: Option<&geojson::Geometry>) -> Option<geo::Geometry> {
    let geometry = geometry?;
    match geo::Geometry::try_from(&geometry.value) {
        Ok(converted) => Some(converted),
        Err(e) => {
            warn!(feature = %id, "Invalid geometry, feature kept without one: {}", e);
            None
        }
    }
}

/// Lecture tolérante d'un nombre : les services renvoient tantôt un nombre
/// JSON, tantôt une chaîne
fn prop_f64(props: &geojson::JsonObject, key: &str) -> Option<f64> {
    match props.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn prop_u32(props: &geojson::JsonObject, key: &str) -> Option<u32> {
    prop_f64(props, key).map(|v| v as u32)
}

fn prop_u16(props: &geojson::JsonObject, key: &str) -> Option<u16> {
    prop_f64(props, key).map(|v| v as u16)
}

fn prop_u8(props: &geojson::JsonObject, key: &str) -> Option<u8> {
    prop_f64(props, key).map(|v| v as u8)
}

fn prop_i32(props: &geojson::JsonObject, key: &str) -> Option<i32> {
    prop_f64(props, key).map(|v| v as i32)
}

fn prop_string(props: &geojson::JsonObject, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
