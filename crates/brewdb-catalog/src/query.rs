//! Pure query evaluation over a [`Snapshot`]: filter, project, sort, paginate.

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use brewdb_core::Brewery;

use crate::distance::haversine_km;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    City,
    Distance,
}

impl SortKey {
    /// Parses a sort key, case-insensitively. Returns `None` for unknown
    /// values so the caller can apply the name-ascending default.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(Self::Name),
            "city" => Some(Self::City),
            "distance" => Some(Self::Distance),
            _ => None,
        }
    }
}

/// Filter, sort, and pagination parameters for one query request.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub search_term: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub sort_by: SortKey,
    pub ascending: bool,
    pub page: usize,
    pub page_size: usize,
    pub user_latitude: Option<f64>,
    pub user_longitude: Option<f64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("page must be at least 1")]
    PageOutOfRange,

    #[error("page_size must be at least 1")]
    PageSizeOutOfRange,

    #[error("user_latitude and user_longitude must be supplied together")]
    UnpairedCoordinates,
}

impl QuerySpec {
    /// Rejects malformed client input before the engine runs.
    ///
    /// # Errors
    ///
    /// - [`QueryError::PageOutOfRange`] if `page` is 0.
    /// - [`QueryError::PageSizeOutOfRange`] if `page_size` is 0.
    /// - [`QueryError::UnpairedCoordinates`] if exactly one of the requester
    ///   coordinates is supplied.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.page < 1 {
            return Err(QueryError::PageOutOfRange);
        }
        if self.page_size < 1 {
            return Err(QueryError::PageSizeOutOfRange);
        }
        if self.user_latitude.is_some() != self.user_longitude.is_some() {
            return Err(QueryError::UnpairedCoordinates);
        }
        Ok(())
    }
}

/// Outward-facing projection of a [`Brewery`], with the computed distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreweryDto {
    pub id: String,
    pub name: String,
    pub city: String,
    pub phone: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub website_url: Option<String>,
    pub brewery_type: Option<String>,
    pub distance_km: Option<f64>,
}

/// One page of results plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

/// Lightweight autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
    pub city: String,
    pub display_text: String,
}

/// Evaluates `spec` against `snapshot`.
///
/// Pure function of its inputs. `spec` must already have passed
/// [`QuerySpec::validate`]; a zero `page_size` would panic in the pagination
/// arithmetic.
#[must_use]
pub fn query(spec: &QuerySpec, snapshot: &Snapshot) -> ResultPage<BreweryDto> {
    let search = active_filter(spec.search_term.as_deref()).map(str::to_lowercase);
    let city = active_filter(spec.city.as_deref());
    let state = active_filter(spec.state.as_deref());

    let mut dtos: Vec<BreweryDto> = snapshot
        .breweries()
        .iter()
        .filter(|b| {
            search
                .as_deref()
                .is_none_or(|needle| matches_search(b, needle))
        })
        .filter(|b| city.is_none_or(|c| b.city.eq_ignore_ascii_case(c)))
        .filter(|b| {
            state.is_none_or(|s| {
                b.state
                    .as_deref()
                    .is_some_and(|bs| bs.eq_ignore_ascii_case(s))
            })
        })
        .map(|b| project(b, spec.user_latitude, spec.user_longitude))
        .collect();

    sort_dtos(&mut dtos, spec.sort_by, spec.ascending);
    paginate(dtos, spec.page, spec.page_size)
}

/// Looks up a single brewery and projects it without distance annotation.
#[must_use]
pub fn get_by_id(id: &str, snapshot: &Snapshot) -> Option<BreweryDto> {
    snapshot.get_by_id(id).map(|b| project(b, None, None))
}

/// Substring-matches name and city, capped at `limit`. A blank term yields
/// an empty list.
#[must_use]
pub fn autocomplete(term: &str, limit: usize, snapshot: &Snapshot) -> Vec<Suggestion> {
    let term = term.trim();
    if term.is_empty() {
        return Vec::new();
    }

    snapshot
        .search_substring(term)
        .take(limit)
        .map(|b| Suggestion {
            id: b.id.clone(),
            name: b.name.clone(),
            city: b.city.clone(),
            display_text: format!(
                "{} - {}, {}",
                b.name,
                b.city,
                b.state.as_deref().unwrap_or_default()
            ),
        })
        .collect()
}

/// Treats blank filter values as "no filter".
fn active_filter(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Search term matches name, city, or state. `needle` must already be
/// lowercased; entity fields are lowercased per comparison.
fn matches_search(brewery: &Brewery, needle: &str) -> bool {
    brewery.name.to_lowercase().contains(needle)
        || brewery.city.to_lowercase().contains(needle)
        || brewery
            .state
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

fn project(brewery: &Brewery, user_lat: Option<f64>, user_lon: Option<f64>) -> BreweryDto {
    let distance_km = match (user_lat, user_lon, brewery.latitude, brewery.longitude) {
        (Some(ulat), Some(ulon), Some(blat), Some(blon)) => {
            Some(haversine_km(ulat, ulon, blat, blon))
        }
        _ => None,
    };

    BreweryDto {
        id: brewery.id.clone(),
        name: brewery.name.clone(),
        city: brewery.city.clone(),
        phone: brewery.phone.clone(),
        state: brewery.state.clone(),
        country: brewery.country.clone(),
        website_url: brewery.website_url.clone(),
        brewery_type: brewery.brewery_type.clone(),
        distance_km,
    }
}

fn sort_dtos(dtos: &mut [BreweryDto], key: SortKey, ascending: bool) {
    match key {
        SortKey::Name => dtos.sort_by(|a, b| directed(a.name.cmp(&b.name), ascending)),
        SortKey::City => dtos.sort_by(|a, b| directed(a.city.cmp(&b.city), ascending)),
        SortKey::Distance => {
            dtos.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km, ascending));
        }
    }
}

fn directed(ord: Ordering, ascending: bool) -> Ordering {
    if ascending {
        ord
    } else {
        ord.reverse()
    }
}

/// Distance ordering with absent values pinned to the end under both
/// directions. Ties among absent-distance entries stay in filtered order
/// because the sort is stable.
fn compare_distance(a: Option<f64>, b: Option<f64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(x.total_cmp(&y), ascending),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> ResultPage<T> {
    let total_count = items.len();
    let total_pages = total_count.div_ceil(page_size);
    let offset = (page - 1) * page_size;

    let data: Vec<T> = if offset >= total_count {
        Vec::new()
    } else {
        items.into_iter().skip(offset).take(page_size).collect()
    };

    ResultPage {
        data,
        page,
        page_size,
        total_count,
        total_pages,
        has_previous_page: page > 1,
        has_next_page: page < total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_brewery(
        id: &str,
        name: &str,
        city: &str,
        state: Option<&str>,
        coords: Option<(f64, f64)>,
    ) -> Brewery {
        Brewery {
            id: id.to_owned(),
            name: name.to_owned(),
            city: city.to_owned(),
            state: state.map(ToOwned::to_owned),
            country: None,
            postal_code: None,
            phone: None,
            website_url: None,
            brewery_type: None,
            latitude: coords.map(|(lat, _)| lat),
            longitude: coords.map(|(_, lon)| lon),
            last_updated: Utc::now(),
        }
    }

    /// The three-entity snapshot used by the ordering scenarios:
    /// A(Zeta, Austin, 30/-97), B(Alpha, Austin, 30.1/-97.1), C(Beta, Dallas, no coords).
    fn scenario_snapshot() -> std::sync::Arc<Snapshot> {
        let store = crate::SnapshotStore::new();
        store.replace(vec![
            make_brewery("a", "Zeta", "Austin", Some("Texas"), Some((30.0, -97.0))),
            make_brewery("b", "Alpha", "Austin", Some("Texas"), Some((30.1, -97.1))),
            make_brewery("c", "Beta", "Dallas", Some("Texas"), None),
        ]);
        store.current()
    }

    fn base_spec() -> QuerySpec {
        QuerySpec {
            search_term: None,
            city: None,
            state: None,
            sort_by: SortKey::Name,
            ascending: true,
            page: 1,
            page_size: 10,
            user_latitude: None,
            user_longitude: None,
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn validate_rejects_page_zero() {
        let spec = QuerySpec {
            page: 0,
            ..base_spec()
        };
        assert_eq!(spec.validate(), Err(QueryError::PageOutOfRange));
    }

    #[test]
    fn validate_rejects_page_size_zero() {
        let spec = QuerySpec {
            page_size: 0,
            ..base_spec()
        };
        assert_eq!(spec.validate(), Err(QueryError::PageSizeOutOfRange));
    }

    #[test]
    fn validate_rejects_unpaired_coordinates() {
        let spec = QuerySpec {
            user_latitude: Some(30.0),
            ..base_spec()
        };
        assert_eq!(spec.validate(), Err(QueryError::UnpairedCoordinates));
    }

    #[test]
    fn validate_accepts_paired_coordinates() {
        let spec = QuerySpec {
            user_latitude: Some(30.0),
            user_longitude: Some(-97.0),
            ..base_spec()
        };
        assert_eq!(spec.validate(), Ok(()));
    }

    // -----------------------------------------------------------------------
    // Filtering
    // -----------------------------------------------------------------------

    #[test]
    fn city_filter_with_name_sort_matches_scenario() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            city: Some("Austin".to_owned()),
            ..base_spec()
        };

        let page = query(&spec, &snapshot);
        let names: Vec<&str> = page.data.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn search_term_is_case_insensitive_over_name_city_and_state() {
        let store = crate::SnapshotStore::new();
        store.replace(vec![
            make_brewery("n", "River Ale House", "Portland", None, None),
            make_brewery("c", "Hop Corner", "aleford", None, None),
            make_brewery("s", "Hilltop", "Reno", Some("Upper Aleshire"), None),
            make_brewery("x", "Lager Only", "Denver", Some("Colorado"), None),
        ]);
        let snapshot = store.current();

        let spec = QuerySpec {
            search_term: Some("ALE".to_owned()),
            ..base_spec()
        };
        let page = query(&spec, &snapshot);
        let ids: Vec<&str> = page.data.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["s", "c", "n"], "sorted by name after filtering");
    }

    #[test]
    fn search_and_city_filters_are_additive() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            search_term: Some("Zeta".to_owned()),
            city: Some("austin".to_owned()),
            ..base_spec()
        };
        let page = query(&spec, &snapshot);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].name, "Zeta");

        // Same search term with a non-matching city excludes everything.
        let spec = QuerySpec {
            search_term: Some("Zeta".to_owned()),
            city: Some("Dallas".to_owned()),
            ..base_spec()
        };
        assert_eq!(query(&spec, &snapshot).total_count, 0);
    }

    #[test]
    fn state_filter_is_exact_and_skips_absent_state() {
        let store = crate::SnapshotStore::new();
        store.replace(vec![
            make_brewery("t", "Texan", "Austin", Some("Texas"), None),
            make_brewery("u", "Stateless", "Nowhere", None, None),
        ]);
        let snapshot = store.current();

        let spec = QuerySpec {
            state: Some("texas".to_owned()),
            ..base_spec()
        };
        let page = query(&spec, &snapshot);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].id, "t");

        // Substring of the state is not enough — the match is exact.
        let spec = QuerySpec {
            state: Some("Tex".to_owned()),
            ..base_spec()
        };
        assert_eq!(query(&spec, &snapshot).total_count, 0);
    }

    #[test]
    fn blank_filters_are_ignored() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            search_term: Some("   ".to_owned()),
            city: Some(String::new()),
            ..base_spec()
        };
        assert_eq!(query(&spec, &snapshot).total_count, 3);
    }

    // -----------------------------------------------------------------------
    // Distance + sorting
    // -----------------------------------------------------------------------

    #[test]
    fn distance_sort_ascending_puts_absent_last() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            sort_by: SortKey::Distance,
            user_latitude: Some(30.0),
            user_longitude: Some(-97.0),
            ..base_spec()
        };

        let page = query(&spec, &snapshot);
        let ids: Vec<&str> = page.data.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        assert!(page.data[0].distance_km.unwrap().abs() < 0.01, "A is at the origin");
        let b_km = page.data[1].distance_km.unwrap();
        assert!((13.0..17.0).contains(&b_km), "B is ~15 km away, got {b_km}");
        assert!(page.data[2].distance_km.is_none(), "C has no coordinates");
    }

    #[test]
    fn distance_sort_descending_still_puts_absent_last() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            sort_by: SortKey::Distance,
            ascending: false,
            user_latitude: Some(30.0),
            user_longitude: Some(-97.0),
            ..base_spec()
        };

        let page = query(&spec, &snapshot);
        let ids: Vec<&str> = page.data.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn distance_is_absent_without_requester_coordinates() {
        let snapshot = scenario_snapshot();
        let page = query(&base_spec(), &snapshot);
        assert!(page.data.iter().all(|d| d.distance_km.is_none()));
    }

    #[test]
    fn absent_distance_ties_keep_filtered_order() {
        let store = crate::SnapshotStore::new();
        store.replace(vec![
            make_brewery("1", "First", "X", None, None),
            make_brewery("2", "Second", "X", None, None),
            make_brewery("3", "Third", "X", None, Some((30.0, -97.0))),
        ]);
        let snapshot = store.current();

        let spec = QuerySpec {
            sort_by: SortKey::Distance,
            user_latitude: Some(30.0),
            user_longitude: Some(-97.0),
            ..base_spec()
        };
        let page = query(&spec, &snapshot);
        let ids: Vec<&str> = page.data.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }

    #[test]
    fn name_sort_descending_reverses_order() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            ascending: false,
            ..base_spec()
        };
        let names: Vec<String> = query(&spec, &snapshot)
            .data
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Zeta", "Beta", "Alpha"]);
    }

    #[test]
    fn city_sort_ascending_orders_by_city() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            sort_by: SortKey::City,
            ..base_spec()
        };
        let cities: Vec<String> = query(&spec, &snapshot)
            .data
            .into_iter()
            .map(|d| d.city)
            .collect();
        assert_eq!(cities, vec!["Austin", "Austin", "Dallas"]);
    }

    #[test]
    fn sort_key_parse_accepts_known_keys_case_insensitively() {
        assert_eq!(SortKey::parse("name"), Some(SortKey::Name));
        assert_eq!(SortKey::parse("CITY"), Some(SortKey::City));
        assert_eq!(SortKey::parse("Distance"), Some(SortKey::Distance));
        assert_eq!(SortKey::parse("relevance"), None);
    }

    // -----------------------------------------------------------------------
    // Pagination
    // -----------------------------------------------------------------------

    #[test]
    fn pages_concatenate_to_the_full_sorted_sequence() {
        let store = crate::SnapshotStore::new();
        store.replace(
            (0..5)
                .map(|n| make_brewery(&format!("b-{n}"), &format!("Name {n}"), "X", None, None))
                .collect(),
        );
        let snapshot = store.current();

        let mut seen: Vec<String> = Vec::new();
        for page_no in 1..=3 {
            let spec = QuerySpec {
                page: page_no,
                page_size: 2,
                ..base_spec()
            };
            let page = query(&spec, &snapshot);
            assert_eq!(page.total_count, 5);
            assert_eq!(page.total_pages, 3);
            assert_eq!(page.has_previous_page, page_no > 1);
            assert_eq!(page.has_next_page, page_no < 3);
            seen.extend(page.data.into_iter().map(|d| d.id));
        }

        assert_eq!(seen, vec!["b-0", "b-1", "b-2", "b-3", "b-4"]);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let snapshot = scenario_snapshot();
        let spec = QuerySpec {
            page: 9,
            page_size: 2,
            ..base_spec()
        };
        let page = query(&spec, &snapshot);
        assert!(page.data.is_empty());
        assert_eq!(page.total_count, 3);
        assert_eq!(page.total_pages, 2);
        assert!(page.has_previous_page);
        assert!(!page.has_next_page);
    }

    #[test]
    fn empty_snapshot_yields_zero_totals() {
        let store = crate::SnapshotStore::new();
        let page = query(&base_spec(), &store.current());
        assert!(page.data.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_previous_page);
        assert!(!page.has_next_page);
    }

    // -----------------------------------------------------------------------
    // Lookup + autocomplete
    // -----------------------------------------------------------------------

    #[test]
    fn get_by_id_is_idempotent() {
        let snapshot = scenario_snapshot();
        let first = get_by_id("a", &snapshot).expect("brewery a");
        let second = get_by_id("a", &snapshot).expect("brewery a");
        assert_eq!(first, second);
        assert!(first.distance_km.is_none(), "lookup never computes distance");
    }

    #[test]
    fn get_by_id_returns_none_for_unknown() {
        let snapshot = scenario_snapshot();
        assert!(get_by_id("nope", &snapshot).is_none());
    }

    #[test]
    fn autocomplete_blank_term_is_empty() {
        let snapshot = scenario_snapshot();
        assert!(autocomplete("", 10, &snapshot).is_empty());
        assert!(autocomplete("   ", 10, &snapshot).is_empty());
    }

    #[test]
    fn autocomplete_caps_results_at_limit() {
        let store = crate::SnapshotStore::new();
        store.replace(
            (0..6)
                .map(|n| make_brewery(&format!("b-{n}"), &format!("Ale {n}"), "X", None, None))
                .collect(),
        );
        let suggestions = autocomplete("ale", 4, &store.current());
        assert_eq!(suggestions.len(), 4);
    }

    #[test]
    fn autocomplete_composes_display_text() {
        let snapshot = scenario_snapshot();
        let suggestions = autocomplete("zeta", 10, &snapshot);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].display_text, "Zeta - Austin, Texas");
    }

    #[test]
    fn result_page_is_serializable() {
        // Proves the wire shape: absent distance serializes as null.
        let snapshot = scenario_snapshot();
        let page = query(&base_spec(), &snapshot);
        let json = serde_json::to_value(&page).expect("serialize ResultPage");
        assert_eq!(json["total_count"].as_u64(), Some(3));
        assert_eq!(json["has_next_page"].as_bool(), Some(false));
        assert!(json["data"][0]["distance_km"].is_null());
        assert_eq!(json["data"][0]["name"].as_str(), Some("Alpha"));
    }

    #[test]
    fn autocomplete_renders_absent_state_as_empty() {
        let store = crate::SnapshotStore::new();
        store.replace(vec![make_brewery("s", "Stateless Ale", "Reno", None, None)]);
        let suggestions = autocomplete("stateless", 10, &store.current());
        assert_eq!(suggestions[0].display_text, "Stateless Ale - Reno, ");
    }
}
