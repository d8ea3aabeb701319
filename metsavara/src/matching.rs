//! Appariement peuplement ↔ parcelle
//!
//! Règle : le centroïde (moyenne des sommets) du seul anneau extérieur du
//! peuplement est testé contre la géométrie de la parcelle. Pour une
//! parcelle logique en plusieurs parties (même kiinteistötunnus), le
//! peuplement appartient à la parcelle dès qu'une partie contient le
//! centroïde. Un échec d'appariement n'est jamais fatal : une géométrie
//! absente ou vide exclut simplement le peuplement.

use geo::{Coord, Geometry, LineString};
use tracing::debug;

use crate::geometry::{point_in_polygon, ring_centroid};
use crate::types::{ParcelFeature, StandFeature};

/// Anneau extérieur de référence d'une géométrie surfacique
///
/// Premier anneau d'un Polygon, ou premier anneau du premier membre d'un
/// MultiPolygon — les autres membres sont délibérément ignorés.
fn outer_ring(geometry: &Geometry) -> Option<&LineString> {
    match geometry {
        Geometry::Polygon(polygon) => Some(polygon.exterior()),
        Geometry::MultiPolygon(multi) => multi.0.first().map(|polygon| polygon.exterior()),
        _ => None,
    }
}

/// Point représentatif d'un peuplement : centroïde de son anneau extérieur
///
/// `None` si la géométrie est absente, non surfacique ou sans sommet.
pub fn stand_centroid(stand: &StandFeature) -> Option<Coord> {
    let geometry = stand.geometry.as_ref()?;
    let ring = outer_ring(geometry)?;
    ring_centroid(ring).ok()
}

/// Vrai si le centroïde du peuplement tombe dans la géométrie de la parcelle
pub fn stand_belongs_to_parcel(stand: &StandFeature, parcel: &ParcelFeature) -> bool {
    let Some(centroid) = stand_centroid(stand) else {
        debug!(stand = %stand.id, "Stand without usable geometry, excluded from matching");
        return false;
    };
    let Some(geometry) = parcel.geometry.as_ref() else {
        return false;
    };
    point_in_polygon(centroid, geometry)
}

/// Vrai si le peuplement appartient à l'une des parties de la parcelle
/// logique (sémantique d'union, court-circuit à la première partie trouvée)
pub fn stand_belongs_to_parcels(stand: &StandFeature, parts: &[ParcelFeature]) -> bool {
    let Some(centroid) = stand_centroid(stand) else {
        debug!(stand = %stand.id, "Stand without usable geometry, excluded from matching");
        return false;
    };
    parts.iter().any(|part| {
        part.geometry
            .as_ref()
            .map(|geometry| point_in_polygon(centroid, geometry))
            .unwrap_or(false)
    })
}

/// Filtre les peuplements appartenant à l'ensemble de parcelles donné,
/// en préservant l'ordre d'entrée
pub fn filter_stands_for_parcels(
    stands: &[StandFeature],
    parcels: &[ParcelFeature],
) -> Vec<StandFeature> {
    stands
        .iter()
        .filter(|stand| stand_belongs_to_parcels(stand, parcels))
        .cloned()
        .collect()
}

/// Regroupe les parties de parcelles par identité cadastrale, dans l'ordre
/// de première apparition
pub fn group_parcel_parts(parcels: &[ParcelFeature]) -> Vec<(String, Vec<&ParcelFeature>)> {
    let mut groups: Vec<(String, Vec<&ParcelFeature>)> = Vec::new();

    for parcel in parcels {
        let key = parcel.cache_key();
        match groups.iter_mut().find(|(k, _)| k == key) {
            Some((_, parts)) => parts.push(parcel),
            None => groups.push((key.to_string(), vec![parcel])),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::PropertyReference;
    use crate::types::StandAttributes;
    use geo::{MultiPolygon, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> Geometry {
        Geometry::Polygon(Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
            ]),
            vec![],
        ))
    }

    fn stand_at(id: &str, x0: f64, y0: f64) -> StandFeature {
        StandFeature {
            id: id.to_string(),
            geometry: Some(square(x0, y0, 10.0)),
            attributes: StandAttributes::default(),
        }
    }

    fn parcel(id: &str, reference: &str, geometry: Option<Geometry>) -> ParcelFeature {
        ParcelFeature {
            id: id.to_string(),
            reference: Some(PropertyReference::parse(reference).unwrap()),
            label: None,
            geometry,
        }
    }

    #[test]
    fn test_stand_centroid_uses_first_outer_ring() {
        let multi = Geometry::MultiPolygon(MultiPolygon::new(vec![
            Polygon::new(
                LineString::from(vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]),
                vec![],
            ),
            Polygon::new(
                LineString::from(vec![
                    (100.0, 100.0),
                    (102.0, 100.0),
                    (102.0, 102.0),
                    (100.0, 102.0),
                ]),
                vec![],
            ),
        ]));
        let stand = StandFeature {
            id: "s1".to_string(),
            geometry: Some(multi),
            attributes: StandAttributes::default(),
        };

        // Seule la première partie compte
        let centroid = stand_centroid(&stand).unwrap();
        assert!((centroid.x - 1.0).abs() < 1e-12);
        assert!((centroid.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_stand_without_geometry_never_matches() {
        let stand = StandFeature {
            id: "s1".to_string(),
            geometry: None,
            attributes: StandAttributes::default(),
        };
        let p = parcel("p1", "92-416-11-123", Some(square(0.0, 0.0, 100.0)));

        assert!(!stand_belongs_to_parcel(&stand, &p));
        assert!(!stand_belongs_to_parcels(&stand, &[p]));
    }

    #[test]
    fn test_stand_with_empty_ring_never_matches() {
        let empty = Geometry::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        let stand = StandFeature {
            id: "s1".to_string(),
            geometry: Some(empty),
            attributes: StandAttributes::default(),
        };
        let p = parcel("p1", "92-416-11-123", Some(square(0.0, 0.0, 100.0)));

        assert!(!stand_belongs_to_parcel(&stand, &p));
    }

    #[test]
    fn test_membership_single_parcel() {
        let p = parcel("p1", "92-416-11-123", Some(square(0.0, 0.0, 100.0)));

        assert!(stand_belongs_to_parcel(&stand_at("inside", 40.0, 40.0), &p));
        assert!(!stand_belongs_to_parcel(
            &stand_at("outside", 200.0, 200.0),
            &p
        ));
    }

    #[test]
    fn test_multi_part_parcel_union() {
        // Deux parties disjointes partageant la même référence
        let part_a = parcel("p1.1", "92-416-11-123", Some(square(0.0, 0.0, 50.0)));
        let part_b = parcel("p1.2", "92-416-11-123", Some(square(500.0, 500.0, 50.0)));
        let parts = vec![part_a, part_b];

        // Centroïde dans la seconde partie seulement
        let stand = stand_at("s1", 520.0, 520.0);
        assert!(stand_belongs_to_parcels(&stand, &parts));

        // Dans aucune partie
        let far = stand_at("s2", 5000.0, 5000.0);
        assert!(!stand_belongs_to_parcels(&far, &parts));
    }

    #[test]
    fn test_filter_preserves_input_order() {
        let p = parcel("p1", "92-416-11-123", Some(square(0.0, 0.0, 100.0)));
        let stands = vec![
            stand_at("a", 10.0, 10.0),
            stand_at("out", 300.0, 300.0),
            stand_at("b", 60.0, 60.0),
            stand_at("c", 30.0, 70.0),
        ];

        let matched = filter_stands_for_parcels(&stands, &[p]);
        let ids: Vec<&str> = matched.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_group_parcel_parts() {
        let parcels = vec![
            parcel("p1.1", "92-416-11-123", None),
            parcel("p2", "92-416-11-999", None),
            parcel("p1.2", "92-416-11-123", None),
        ];

        let groups = group_parcel_parts(&parcels);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "09241600110123");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].1.len(), 1);
    }
}
