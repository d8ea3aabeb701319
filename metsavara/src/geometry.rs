//! Primitives géométriques planes
//!
//! Fonctions pures sur les types `geo`, sans conscience du système de
//! coordonnées : l'appelant fournit des coordonnées métriques cohérentes
//! (EPSG:3067 en pratique) et obtient des surfaces en unités au carré.

use geo::{Coord, Geometry, LineString, Polygon};

use crate::types::Bounds;
use crate::MetsavaraError;

/// Aire signée d'un anneau par la formule du lacet (shoelace), divisée par 2
///
/// La fermeture de l'anneau est implicite : le dernier sommet est relié au
/// premier, qu'il soit dupliqué ou non. Un anneau dégénéré (<3 sommets)
/// vaut zéro.
fn ring_signed_area(ring: &LineString) -> f64 {
    let coords = &ring.0;
    if coords.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..coords.len() {
        let a = coords[i];
        let b = coords[(i + 1) % coords.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

fn single_polygon_area(polygon: &Polygon) -> f64 {
    let outer = ring_signed_area(polygon.exterior()).abs();
    let holes: f64 = polygon
        .interiors()
        .iter()
        .map(|ring| ring_signed_area(ring).abs())
        .sum();
    (outer - holes).abs()
}

/// Aire d'une géométrie surfacique : anneau extérieur moins les trous,
/// valeur absolue prise à la fin
///
/// Pour un MultiPolygon, les aires des polygones constituants sont sommées
/// indépendamment (un trou ne soustrait que de son propre polygone). Les
/// géométries non surfaciques valent zéro.
pub fn polygon_area(geometry: &Geometry) -> f64 {
    match geometry {
        Geometry::Polygon(polygon) => single_polygon_area(polygon),
        Geometry::MultiPolygon(multi) => multi.0.iter().map(single_polygon_area).sum(),
        _ => 0.0,
    }
}

/// Centroïde approché d'un anneau : moyenne arithmétique des sommets
///
/// Ce n'est pas le centroïde pondéré par l'aire — l'approximation suffit
/// comme point représentatif pour le test d'appartenance, pas pour un
/// affichage précis. Le sommet de fermeture dupliqué (les anneaux `geo` et
/// GeoJSON arrivent fermés) ne compte qu'une fois, sinon la moyenne serait
/// biaisée vers le premier sommet.
pub fn ring_centroid(ring: &LineString) -> Result<Coord, MetsavaraError> {
    let mut coords = &ring.0[..];
    if coords.is_empty() {
        return Err(MetsavaraError::EmptyRing);
    }
    if coords.len() > 1 && coords[0] == coords[coords.len() - 1] {
        coords = &coords[..coords.len() - 1];
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for coord in coords {
        sum_x += coord.x;
        sum_y += coord.y;
    }

    let n = coords.len() as f64;
    Ok(Coord {
        x: sum_x / n,
        y: sum_y / n,
    })
}

/// Test de parité par lancer de rayon contre un seul anneau
fn ring_contains(ring: &LineString, point: Coord) -> bool {
    let coords = &ring.0;
    if coords.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = coords.len();
    for i in 0..n {
        let vi = coords[i];
        let vj = coords[(i + n - 1) % n];

        if (vi.y > point.y) != (vj.y > point.y) {
            let intercept = vi.x + (point.y - vi.y) / (vj.y - vi.y) * (vj.x - vi.x);
            if point.x < intercept {
                inside = !inside;
            }
        }
    }
    inside
}

/// Test d'appartenance d'un point à une géométrie surfacique
///
/// Seuls les anneaux extérieurs sont testés : les trous sont délibérément
/// ignorés (simplification héritée, suffisante pour apparier peuplements et
/// parcelles — un test correct vis-à-vis des trous changerait les
/// appariements en bordure). Pour un MultiPolygon, vrai si un anneau
/// extérieur quelconque contient le point. Le comportement sur un point
/// exactement en bordure n'est pas spécifié.
pub fn point_in_polygon(point: Coord, geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Polygon(polygon) => ring_contains(polygon.exterior(), point),
        Geometry::MultiPolygon(multi) => multi
            .0
            .iter()
            .any(|polygon| ring_contains(polygon.exterior(), point)),
        _ => false,
    }
}

/// Boîte englobante d'une géométrie surfacique : balayage min/max de toutes
/// les coordonnées (anneaux, trous et parties confondus)
///
/// # Errors
///
/// `EmptyGeometry` si aucune coordonnée n'est trouvée,
/// `UnsupportedGeometry` pour un type non surfacique.
pub fn geometry_bounds(geometry: &Geometry) -> Result<Bounds, MetsavaraError> {
    let mut bounds = Bounds::empty();

    match geometry {
        Geometry::Polygon(polygon) => extend_polygon(&mut bounds, polygon),
        Geometry::MultiPolygon(multi) => {
            for polygon in &multi.0 {
                extend_polygon(&mut bounds, polygon);
            }
        }
        other => {
            return Err(MetsavaraError::UnsupportedGeometry(geometry_kind(other)));
        }
    }

    if bounds.is_valid() {
        Ok(bounds)
    } else {
        Err(MetsavaraError::EmptyGeometry)
    }
}

fn extend_polygon(bounds: &mut Bounds, polygon: &Polygon) {
    for coord in &polygon.exterior().0 {
        bounds.extend(*coord);
    }
    for ring in polygon.interiors() {
        for coord in &ring.0 {
            bounds.extend(*coord);
        }
    }
}

fn geometry_kind(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}
