//! Session de consultation
//!
//! Orchestration autour du cœur `metsavara` : cache de parcelles suivant
//! la vue courante, requêtes ponctuelles et par référence cadastrale. Les
//! réponses de fetch pouvant arriver dans le désordre, chaque changement
//! de vue prend un ticket de génération : seule la réponse portant le
//! ticket le plus récent est appliquée, les autres sont ignorées sans
//! toucher au cache.

use anyhow::{bail, Context, Result};
use geo::Coord;
use tracing::{debug, info};

use metsavara::{
    aggregate, filter_stands_for_parcels, AggregateStatistics, Bounds, CodeTables, ParcelCache,
    ParcelFeature, PropertyReference, StandFeature,
};

use crate::fetch::FeatureSource;

/// Vue courante : emprise affichée et niveau de zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub bounds: Bounds,
    pub zoom: u8,
}

/// Ticket remis par `begin_view_change` : identifie la génération de vue
/// pour laquelle une réponse a été demandée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Résultat d'une requête par référence cadastrale
#[derive(Debug)]
pub struct ReferenceSummary {
    /// Référence normalisée ayant servi à la requête
    pub reference: PropertyReference,

    /// Parties (palstat) de la parcelle logique
    pub parts: Vec<ParcelFeature>,

    /// Peuplements retenus, dans l'ordre de la réponse du service
    pub matched: Vec<StandFeature>,

    pub stats: AggregateStatistics,
}

/// Résultat d'une requête ponctuelle
#[derive(Debug)]
pub struct PointSummary {
    /// Boîte de recherche effectivement interrogée
    pub bounds: Bounds,

    pub stands: Vec<StandFeature>,

    pub stats: AggregateStatistics,
}

pub struct Session<S: FeatureSource> {
    source: S,
    cache: ParcelCache,
    codes: CodeTables,
    search_radius_m: f64,
    min_parcel_zoom: u8,
    generation: u64,
}

impl<S: FeatureSource> Session<S> {
    pub fn new(source: S, codes: CodeTables, search_radius_m: f64, min_parcel_zoom: u8) -> Self {
        Self {
            source,
            cache: ParcelCache::new(),
            codes,
            search_radius_m,
            min_parcel_zoom,
            generation: 0,
        }
    }

    pub fn cache(&self) -> &ParcelCache {
        &self.cache
    }

    /// Enregistre un changement de vue. En dessous du zoom minimal les
    /// parcelles n'ont pas de sens : le cache est vidé et aucun fetch
    /// n'est demandé. Sinon, remet un ticket pour la nouvelle génération,
    /// ce qui périme tous les tickets antérieurs.
    pub fn begin_view_change(&mut self, view: &ViewState) -> Option<FetchTicket> {
        self.generation += 1;
        if view.zoom < self.min_parcel_zoom {
            debug!(zoom = view.zoom, "Below parcel zoom, cache cleared");
            self.cache.clear();
            return None;
        }
        Some(FetchTicket(self.generation))
    }

    /// Applique une réponse de parcelles si son ticket est toujours le
    /// plus récent. Une réponse périmée est ignorée, cache intact.
    pub fn apply_parcels(&mut self, ticket: FetchTicket, parcels: Vec<ParcelFeature>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Stale parcel response discarded"
            );
            return false;
        }
        self.cache.replace(parcels);
        debug!(parcels = self.cache.len(), "Parcel cache refreshed");
        true
    }

    /// Changement de vue complet : fetch immédiat puis application. Le
    /// découpage ticket/application reste disponible pour un hôte dont
    /// les réponses arrivent dans le désordre.
    pub async fn refresh_view(&mut self, view: &ViewState) -> Result<bool> {
        let Some(ticket) = self.begin_view_change(view) else {
            return Ok(false);
        };
        let parcels = self
            .source
            .parcels_in_bounds(&view.bounds)
            .await
            .context("Parcel fetch failed")?;
        Ok(self.apply_parcels(ticket, parcels))
    }

    /// Peuplements autour d'un point : boîte carrée de demi-côté
    /// `search_radius_m` centrée sur le point
    pub async fn query_point(&self, x: f64, y: f64) -> Result<PointSummary> {
        let bounds = Bounds::around(Coord { x, y }, self.search_radius_m);
        let stands = self
            .source
            .stands_in_bounds(&bounds)
            .await
            .context("Stand fetch failed")?;

        info!(stands = stands.len(), x, y, "Point query");
        let stats = aggregate(&stands, &self.codes);
        Ok(PointSummary {
            bounds,
            stands,
            stats,
        })
    }

    /// Statistiques d'une parcelle logique entière. La référence est
    /// validée avant tout appel au service.
    pub async fn query_reference(&self, raw_reference: &str) -> Result<ReferenceSummary> {
        let reference = PropertyReference::parse(raw_reference)?;

        let parts = self
            .source
            .parcels_by_reference(&reference)
            .await
            .context("Parcel fetch failed")?;
        if parts.is_empty() {
            bail!("No parcel found for reference {}", reference);
        }

        // Union des emprises des parties, élargie du rayon de recherche
        // pour couvrir les peuplements à cheval sur la limite
        let mut union = Bounds::empty();
        for part in &parts {
            if let Some(geometry) = &part.geometry {
                union.extend_bounds(&metsavara::geometry_bounds(geometry)?);
            }
        }
        if !union.is_valid() {
            bail!("No usable geometry on parcel {}", reference);
        }
        let search = union.expanded(self.search_radius_m);

        let stands = self
            .source
            .stands_in_bounds(&search)
            .await
            .context("Stand fetch failed")?;
        let matched = filter_stands_for_parcels(&stands, &parts);
        info!(
            reference = %reference,
            parts = parts.len(),
            candidates = stands.len(),
            matched = matched.len(),
            "Reference query"
        );

        let stats = aggregate(&matched, &self.codes);
        Ok(ReferenceSummary {
            reference,
            parts,
            matched,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use geo::{polygon, Geometry};

    use metsavara::StandAttributes;

    use super::*;
    use crate::fetch::FetchError;

    /// Source en mémoire comptant les appels
    struct MockSource {
        stands: Vec<StandFeature>,
        parcels: Vec<ParcelFeature>,
        stand_calls: AtomicUsize,
        parcel_calls: AtomicUsize,
    }

    impl MockSource {
        fn new(stands: Vec<StandFeature>, parcels: Vec<ParcelFeature>) -> Self {
            Self {
                stands,
                parcels,
                stand_calls: AtomicUsize::new(0),
                parcel_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl FeatureSource for MockSource {
        async fn stands_in_bounds(
            &self,
            _bounds: &Bounds,
        ) -> Result<Vec<StandFeature>, FetchError> {
            self.stand_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.stands.clone())
        }

        async fn parcels_in_bounds(
            &self,
            _bounds: &Bounds,
        ) -> Result<Vec<ParcelFeature>, FetchError> {
            self.parcel_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.parcels.clone())
        }

        async fn parcels_by_reference(
            &self,
            reference: &PropertyReference,
        ) -> Result<Vec<ParcelFeature>, FetchError> {
            self.parcel_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .parcels
                .iter()
                .filter(|p| p.reference.as_ref() == Some(reference))
                .cloned()
                .collect())
        }
    }

    fn square(x0: f64, y0: f64, side: f64) -> Geometry {
        Geometry::Polygon(polygon![
            (x: x0, y: y0),
            (x: x0 + side, y: y0),
            (x: x0 + side, y: y0 + side),
            (x: x0, y: y0 + side),
            (x: x0, y: y0),
        ])
    }

    fn stand(id: &str, x0: f64, y0: f64, area: f64, volume: f64) -> StandFeature {
        StandFeature {
            id: id.to_string(),
            geometry: Some(square(x0, y0, 50.0)),
            attributes: StandAttributes {
                area: Some(area),
                volume: Some(volume),
                ..Default::default()
            },
        }
    }

    fn parcel(id: &str, reference: &str, x0: f64, y0: f64) -> ParcelFeature {
        ParcelFeature {
            id: id.to_string(),
            reference: PropertyReference::parse(reference).ok(),
            label: None,
            geometry: Some(square(x0, y0, 100.0)),
        }
    }

    fn view(zoom: u8) -> ViewState {
        ViewState {
            bounds: Bounds {
                min_x: 0.0,
                min_y: 0.0,
                max_x: 1000.0,
                max_y: 1000.0,
            },
            zoom,
        }
    }

    #[tokio::test]
    async fn test_below_min_zoom_clears_cache_without_fetch() {
        let source = MockSource::new(vec![], vec![parcel("p1", "92-416-11-123", 0.0, 0.0)]);
        let mut session = Session::new(source, CodeTables::finnish().unwrap(), 200.0, 12);

        assert!(session.refresh_view(&view(14)).await.unwrap());
        assert_eq!(session.cache().len(), 1);

        // Dézoom : cache vidé, pas de requête supplémentaire
        assert!(!session.refresh_view(&view(8)).await.unwrap());
        assert!(session.cache().is_empty());
        assert_eq!(session.source.parcel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_ticket_is_discarded() {
        let source = MockSource::new(vec![], vec![]);
        let mut session = Session::new(source, CodeTables::finnish().unwrap(), 200.0, 12);

        let old = session.begin_view_change(&view(13)).unwrap();
        let fresh = session.begin_view_change(&view(14)).unwrap();

        let stale_payload = vec![parcel("old", "92-416-11-123", 0.0, 0.0)];
        let fresh_payload = vec![parcel("new", "49-88-2-15", 500.0, 500.0)];

        // La réponse fraîche arrive d'abord ; la périmée ne doit rien écraser
        assert!(session.apply_parcels(fresh, fresh_payload));
        assert!(!session.apply_parcels(old, stale_payload));

        assert_eq!(session.cache().len(), 1);
        assert!(session.cache().get("04908800020015").is_some());
    }

    #[tokio::test]
    async fn test_query_reference_validates_before_fetch() {
        let source = MockSource::new(vec![], vec![]);
        let session = Session::new(source, CodeTables::finnish().unwrap(), 200.0, 12);

        assert!(session.query_reference("not-a-reference").await.is_err());
        assert_eq!(session.source.parcel_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_reference_matches_multi_part_parcel() {
        let stands = vec![
            stand("in-first", 10.0, 10.0, 2.0, 100.0),
            stand("in-second", 5010.0, 5010.0, 3.0, 200.0),
            stand("outside", 2000.0, 2000.0, 1.0, 50.0),
        ];
        let parcels = vec![
            parcel("part1", "92-416-11-123", 0.0, 0.0),
            parcel("part2", "92-416-11-123", 5000.0, 5000.0),
        ];
        let source = MockSource::new(stands, parcels);
        let session = Session::new(source, CodeTables::finnish().unwrap(), 200.0, 12);

        let summary = session.query_reference("92-416-11-123").await.unwrap();

        assert_eq!(summary.parts.len(), 2);
        assert_eq!(summary.matched.len(), 2);
        assert_eq!(summary.stats.count, 2);
        assert_eq!(summary.stats.total_area, 5.0);
    }

    #[tokio::test]
    async fn test_query_reference_unknown_is_error() {
        let source = MockSource::new(vec![], vec![parcel("p1", "92-416-11-123", 0.0, 0.0)]);
        let session = Session::new(source, CodeTables::finnish().unwrap(), 200.0, 12);

        assert!(session.query_reference("1-1-1-1").await.is_err());
    }

    #[tokio::test]
    async fn test_query_point_uses_search_radius() {
        let source = MockSource::new(vec![stand("s", 0.0, 0.0, 1.0, 10.0)], vec![]);
        let session = Session::new(source, CodeTables::finnish().unwrap(), 200.0, 12);

        let summary = session.query_point(430000.0, 6930000.0).await.unwrap();

        assert_eq!(summary.bounds.min_x, 429800.0);
        assert_eq!(summary.bounds.max_x, 430200.0);
        assert_eq!(summary.bounds.min_y, 6929800.0);
        assert_eq!(summary.bounds.max_y, 6930200.0);
        assert_eq!(summary.stats.count, 1);
    }
}
