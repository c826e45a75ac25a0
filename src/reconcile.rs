// Joining geometry region labels to fact-table region labels.
//
// The two naming sources disagree on spelling and on administrative-type
// prefixes ("Kabupaten Malang" vs "Malang"), so labels are normalized and
// matched fuzzily. Matching is a pluggable strategy; the default uses
// equality or substring containment over the normalized forms.
use indexmap::IndexMap;

/// Normalize an administrative region name for matching: lowercase, strip
/// all whitespace, drop the literal "kabupaten"/"kota" type words.
pub fn normalize_region_name(name: &str) -> String {
    let collapsed: String = name.to_lowercase().split_whitespace().collect();
    collapsed.replace("kabupaten", "").replace("kota", "")
}

/// Decides whether two normalized region names refer to the same region.
pub trait RegionMatcher {
    fn is_match(&self, geometry_norm: &str, fact_norm: &str) -> bool;
}

/// Default matcher: equal normalized forms, or one containing the other.
pub struct SubstringMatcher;

impl RegionMatcher for SubstringMatcher {
    fn is_match(&self, geometry_norm: &str, fact_norm: &str) -> bool {
        geometry_norm == fact_norm
            || fact_norm.contains(geometry_norm)
            || geometry_norm.contains(fact_norm)
    }
}

/// Best-effort association from geometry labels to fact-table labels.
///
/// When several fact labels satisfy the matcher for one geometry label,
/// the first one in fact-label iteration order wins; geometry labels with
/// no match are simply absent from the output. Deterministic for a fixed
/// input order.
pub fn build_mapping<M: RegionMatcher>(
    geometry_labels: &[String],
    fact_labels: &[String],
    matcher: &M,
) -> IndexMap<String, String> {
    let mut mapping = IndexMap::new();
    for geo in geometry_labels {
        let geo_norm = normalize_region_name(geo);
        let matched = fact_labels
            .iter()
            .find(|fact| matcher.is_match(&geo_norm, &normalize_region_name(fact)));
        if let Some(fact) = matched {
            mapping.insert(geo.clone(), fact.clone());
        }
    }
    mapping
}
