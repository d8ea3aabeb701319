//! Test d'intégration : scène complète parcelle multi-parties + peuplements

use geo::{Geometry, LineString, Polygon};
use metsavara::{
    aggregate, filter_stands_for_parcels, CodeTables, ParcelCache, ParcelFeature,
    PropertyReference, StandAttributes, StandFeature,
};

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

fn stand(id: &str, x0: f64, y0: f64, attributes: StandAttributes) -> StandFeature {
    StandFeature {
        id: id.to_string(),
        geometry: Some(square(x0, y0, 100.0)),
        attributes,
    }
}

fn parcel_part(id: &str, reference: &str, x0: f64, y0: f64, size: f64) -> ParcelFeature {
    ParcelFeature {
        id: id.to_string(),
        reference: Some(PropertyReference::parse(reference).unwrap()),
        label: Some(format!("Tila {}", reference)),
        geometry: Some(square(x0, y0, size)),
    }
}

/// Scène : une parcelle logique en deux parties disjointes, trois
/// peuplements dedans (dont un dans la seconde partie seulement), un
/// peuplement dehors et un peuplement sans géométrie.
#[test]
fn test_full_scene_matching_and_aggregation() {
    let parcels = vec![
        parcel_part("p1.1", "92-416-11-123", 0.0, 0.0, 1000.0),
        parcel_part("p1.2", "92-416-11-123", 5000.0, 5000.0, 1000.0),
    ];

    let stands = vec![
        stand(
            "inside-a",
            100.0,
            100.0,
            StandAttributes {
                area: Some(2.0),
                volume: Some(150.0),
                mean_age: Some(45.0),
                main_tree_species: Some(1),
                cutting_type: Some(6),
                cutting_year: Some(2027),
                fertility_class: Some(3),
                development_class: Some("03".to_string()),
                ..Default::default()
            },
        ),
        stand(
            "inside-b",
            700.0,
            700.0,
            StandAttributes {
                area: Some(2.0),
                volume: Some(250.0),
                mean_age: Some(80.0),
                main_tree_species: Some(2),
                cutting_type: Some(6),
                cutting_year: Some(2025),
                fertility_class: Some(3),
                development_class: Some("04".to_string()),
                ..Default::default()
            },
        ),
        // Dans la seconde partie de la parcelle logique
        stand(
            "inside-second-part",
            5400.0,
            5400.0,
            StandAttributes {
                area: Some(4.0),
                volume: Some(100.0),
                main_tree_species: Some(4),
                ..Default::default()
            },
        ),
        stand(
            "outside",
            20000.0,
            20000.0,
            StandAttributes {
                area: Some(99.0),
                volume: Some(999.0),
                ..Default::default()
            },
        ),
        StandFeature {
            id: "no-geometry".to_string(),
            geometry: None,
            attributes: StandAttributes {
                area: Some(50.0),
                ..Default::default()
            },
        },
    ];

    let matched = filter_stands_for_parcels(&stands, &parcels);
    let ids: Vec<&str> = matched.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["inside-a", "inside-b", "inside-second-part"]);

    let codes = CodeTables::finnish().unwrap();
    let stats = aggregate(&matched, &codes);
    println!("Matched: {} stands, {:.1} ha", stats.count, stats.total_area);

    assert_eq!(stats.count, 3);
    assert!((stats.total_area - 8.0).abs() < 1e-9);
    // 150×2 + 250×2 + 100×4
    assert!((stats.total_volume - 1200.0).abs() < 1e-9);
    // (150 + 250 + 100) / 3
    assert!((stats.avg_volume - 500.0 / 3.0).abs() < 1e-9);

    // Âge : seuls inside-a et inside-b portent une valeur
    assert_eq!(stats.age.count, 2);
    assert!((stats.age.mean - 62.5).abs() < 1e-9);
    assert_eq!(stats.age.min, Some(45.0));
    assert_eq!(stats.age.max, Some(80.0));

    // Essences : 2 ha pin, 2 ha épicéa, 4 ha feuillus → 25/25/50
    assert_eq!(stats.species.pine, 25);
    assert_eq!(stats.species.spruce, 25);
    assert_eq!(stats.species.other, 50);
    assert_eq!(stats.species.total(), 100);

    // Harvennushakkuu ×2, année la plus proche 2025
    assert_eq!(stats.cutting_proposals.len(), 1);
    assert_eq!(stats.cutting_proposals[0].name, "Harvennushakkuu");
    assert_eq!(stats.cutting_proposals[0].count, 2);
    assert_eq!(stats.cutting_proposals[0].earliest_year, Some(2025));

    assert_eq!(stats.fertility_distribution.len(), 1);
    assert!((stats.fertility_distribution[0].area - 4.0).abs() < 1e-9);
    assert_eq!(stats.development_distribution.len(), 2);
}

/// Le cache ne conserve jamais d'entrées d'une vue précédente.
#[test]
fn test_cache_view_replacement() {
    let mut cache = ParcelCache::new();

    cache.replace(vec![
        parcel_part("p1", "92-416-11-123", 0.0, 0.0, 100.0),
        parcel_part("p2", "92-416-11-999", 200.0, 0.0, 100.0),
    ]);
    assert_eq!(cache.len(), 2);

    cache.replace(vec![parcel_part("p3", "49-88-2-15", 0.0, 0.0, 100.0)]);
    assert_eq!(cache.len(), 1);
    assert!(cache.get("09241600110123").is_none());
    assert!(cache.get("09241600110999").is_none());
    assert!(cache.get("04908800020015").is_some());
}

/// L'agrégat d'une entrée vide reste entièrement à zéro.
#[test]
fn test_empty_aggregate_is_total_zero() {
    let codes = CodeTables::finnish().unwrap();
    let stats = aggregate(&[], &codes);

    assert_eq!(stats.count, 0);
    assert_eq!(stats.avg_volume, 0.0);
    assert_eq!(stats.species.total(), 0);
    assert!(stats.cutting_proposals.is_empty());
    assert!(stats.silviculture_proposals.is_empty());
}
