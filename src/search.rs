//! Candidate search and ranking.
//!
//! A pure function over a pool snapshot: the same inputs always give the
//! same ordered output.

use tracing::debug;

/// Default maximum number of results.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Options controlling how candidates are matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Hard cap on the number of results.
    pub limit: usize,
    /// Match the query anywhere in a search string, not only at the start.
    pub containment: bool,
    /// Compare without lowercasing.
    pub case_sensitive: bool,
    /// Strip whitespace from both sides before comparing.
    pub ignore_whitespace: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            containment: true,
            case_sensitive: false,
            ignore_whitespace: false,
        }
    }
}

/// Ordered search hits, best first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<T> {
    /// Query the result was computed for.
    pub query: String,
    /// Matching items, never more than the configured limit.
    pub items: Vec<T>,
}

impl<T> SearchResult<T> {
    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Best match, if any.
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }
}

/// How well a candidate matched. Lower sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Prefix,
    Contains,
}

fn normalize(s: &str, options: &SearchOptions) -> String {
    let s = if options.case_sensitive {
        s.to_string()
    } else {
        s.to_lowercase()
    };
    if options.ignore_whitespace {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    } else {
        s
    }
}

fn rank(candidate: &str, query: &str, options: &SearchOptions) -> Option<MatchRank> {
    if candidate.starts_with(query) {
        Some(MatchRank::Prefix)
    } else if options.containment && candidate.contains(query) {
        Some(MatchRank::Contains)
    } else {
        None
    }
}

/// Search `pool` for `query`.
///
/// `project` returns the strings an item is matched against; it also gets
/// the raw query so it can choose different strings for different queries.
/// An item's rank is the best rank of any of its strings. Prefix matches
/// come before containment matches; ties keep pool order.
///
/// An empty query returns the first `limit` items of the pool unranked.
pub fn search<T, F>(pool: &[T], project: F, query: &str, options: &SearchOptions) -> SearchResult<T>
where
    T: Clone,
    F: Fn(&T, &str) -> Vec<String>,
{
    if query.is_empty() {
        return SearchResult {
            query: String::new(),
            items: pool.iter().take(options.limit).cloned().collect(),
        };
    }

    let needle = normalize(query, options);
    let mut hits: Vec<(MatchRank, &T)> = pool
        .iter()
        .filter_map(|item| {
            project(item, query)
                .iter()
                .filter_map(|s| rank(&normalize(s, options), &needle, options))
                .min()
                .map(|r| (r, item))
        })
        .collect();

    // Stable: equal ranks keep pool order.
    hits.sort_by_key(|(r, _)| *r);
    hits.truncate(options.limit);

    debug!(query, pool = pool.len(), hits = hits.len(), "search");

    SearchResult {
        query: query.to_string(),
        items: hits.into_iter().map(|(_, item)| item.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(item: &&str, _query: &str) -> Vec<String> {
        vec![item.to_string()]
    }

    const POOL: &[&str] = &["Alice", "Malcolm", "Bob", "Alan", "Sally", "albert"];

    #[test]
    fn test_prefix_before_containment() {
        let result = search(POOL, words, "al", &SearchOptions::default());
        assert_eq!(result.items, vec!["Alice", "Alan", "albert", "Malcolm", "Sally"]);
    }

    #[test]
    fn test_prefix_only_without_containment() {
        let options = SearchOptions {
            containment: false,
            ..Default::default()
        };
        let result = search(POOL, words, "al", &options);
        assert_eq!(result.items, vec!["Alice", "Alan", "albert"]);
    }

    #[test]
    fn test_case_sensitive() {
        let options = SearchOptions {
            case_sensitive: true,
            ..Default::default()
        };
        let result = search(POOL, words, "al", &options);
        assert_eq!(result.items, vec!["albert", "Malcolm", "Sally"]);
    }

    #[test]
    fn test_ignore_whitespace() {
        let pool = ["Mary Ann", "Maryanne", "Mark"];
        let options = SearchOptions {
            ignore_whitespace: true,
            ..Default::default()
        };
        let result = search(&pool, words, "mary a", &options);
        assert_eq!(result.items, vec!["Mary Ann", "Maryanne"]);
    }

    #[test]
    fn test_limit() {
        for limit in 0..=POOL.len() + 1 {
            let options = SearchOptions {
                limit,
                ..Default::default()
            };
            assert!(search(POOL, words, "a", &options).items.len() <= limit);
            assert!(search(POOL, words, "", &options).items.len() <= limit);
        }
    }

    #[test]
    fn test_empty_query_returns_pool_prefix() {
        let options = SearchOptions {
            limit: 3,
            ..Default::default()
        };
        let result = search(POOL, words, "", &options);
        assert_eq!(result.items, vec!["Alice", "Malcolm", "Bob"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let result = search(POOL, words, "zed", &SearchOptions::default());
        assert!(result.is_empty());
        assert_eq!(result.first(), None);
        assert_eq!(result.query, "zed");
    }

    #[test]
    fn test_empty_pool() {
        let pool: [&str; 0] = [];
        assert!(search(&pool, words, "a", &SearchOptions::default()).is_empty());
        assert!(search(&pool, words, "", &SearchOptions::default()).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let options = SearchOptions::default();
        let first = search(POOL, words, "l", &options);
        let second = search(POOL, words, "l", &options);
        assert_eq!(first, second);
    }

    #[test]
    fn test_best_rank_across_strings() {
        let pool = [("Zed", "al"), ("Alma", "zz"), ("Hal", "hal")];
        let project = |item: &(&str, &str), _q: &str| vec![item.0.to_string(), item.1.to_string()];
        let result = search(&pool, project, "al", &SearchOptions::default());
        let names: Vec<&str> = result.items.iter().map(|i| i.0).collect();
        assert_eq!(names, vec!["Zed", "Alma", "Hal"]);
    }
}
