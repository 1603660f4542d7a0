//! Parameterized Cypher queries and a clause builder for dynamic ones.
//!
//! Fixed access patterns use [`Query::new`] with a constant text. Queries
//! whose shape depends on which criteria were supplied are assembled with
//! [`QueryBuilder`]: an ordered list of typed clauses rendered once at the
//! end. User values are always bound parameters; only clause structure is
//! chosen at runtime.

use crate::value::{GraphValue, Params};

/// A Cypher text plus its bound parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    text: String,
    params: Params,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Params::new(),
        }
    }

    /// Bind a parameter referenced as `$key` in the text.
    pub fn param(mut self, key: &str, value: impl Into<GraphValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// Bind every entry of an existing parameter map.
    pub fn params_from(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn get_param(&self, key: &str) -> Option<&GraphValue> {
        self.params.get(key)
    }

    pub fn into_parts(self) -> (String, Params) {
        (self.text, self.params)
    }
}

/// Case-insensitive "contains" regex for use with `=~`.
///
/// The text is regex-escaped, so titles like `Alien (1979)` match literally.
pub fn contains_pattern(text: &str) -> String {
    format!("(?i).*{}.*", regex::escape(text))
}

// ── Builder ──────────────────────────────────────────────────────

/// Sort direction for an ORDER BY key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
    /// Descending, with rows where the key is null after all others.
    DescNullsLast,
}

#[derive(Debug, Clone, PartialEq)]
enum Clause {
    Match {
        pattern: String,
        predicates: Vec<String>,
    },
    Where(String),
    Return {
        distinct: bool,
        items: Vec<String>,
    },
    OrderBy(Vec<(String, Direction)>),
    Limit(String),
}

/// Builds a read query clause by clause.
///
/// Clauses render in the order they were added. A WHERE binds to the closest
/// preceding MATCH, so [`filter`](Self::filter) predicates merge with that
/// MATCH's own predicates into a single conjunction.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    clauses: Vec<Clause>,
    params: Params,
}

impl QueryBuilder {
    /// Start a query with its base MATCH pattern.
    pub fn matching(pattern: &str) -> Self {
        Self::default().match_pattern(pattern)
    }

    /// Add a MATCH pattern with no predicates of its own.
    pub fn match_pattern(mut self, pattern: &str) -> Self {
        self.clauses.push(Clause::Match {
            pattern: pattern.to_string(),
            predicates: Vec::new(),
        });
        self
    }

    /// Add a MATCH pattern whose traversal is constrained by `predicate`.
    pub fn match_where(mut self, pattern: &str, predicate: &str) -> Self {
        self.clauses.push(Clause::Match {
            pattern: pattern.to_string(),
            predicates: vec![predicate.to_string()],
        });
        self
    }

    /// Add a scalar predicate to the conjunctive filter.
    pub fn filter(mut self, predicate: &str) -> Self {
        self.clauses.push(Clause::Where(predicate.to_string()));
        self
    }

    pub fn bind(mut self, key: &str, value: impl Into<GraphValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn returns(mut self, items: &[&str]) -> Self {
        self.clauses.push(Clause::Return {
            distinct: false,
            items: items.iter().map(|s| (*s).to_string()).collect(),
        });
        self
    }

    pub fn returns_distinct(mut self, items: &[&str]) -> Self {
        self.clauses.push(Clause::Return {
            distinct: true,
            items: items.iter().map(|s| (*s).to_string()).collect(),
        });
        self
    }

    pub fn order_by(mut self, keys: &[(&str, Direction)]) -> Self {
        self.clauses.push(Clause::OrderBy(
            keys.iter().map(|(k, d)| ((*k).to_string(), *d)).collect(),
        ));
        self
    }

    /// LIMIT bound to the parameter `key`.
    pub fn limit(mut self, key: &str, value: impl Into<GraphValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self.clauses.push(Clause::Limit(key.to_string()));
        self
    }

    /// Render the clauses into a [`Query`].
    pub fn build(self) -> Query {
        let mut lines: Vec<String> = Vec::with_capacity(self.clauses.len());
        // Open MATCH line and the predicates collected for it so far.
        let mut open: Option<(String, Vec<String>)> = None;

        for clause in self.clauses {
            match clause {
                Clause::Where(predicate) => match open.as_mut() {
                    Some((_, predicates)) => predicates.push(predicate),
                    None => lines.push(format!("WHERE {predicate}")),
                },
                Clause::Match {
                    pattern,
                    predicates,
                } => {
                    flush_match(&mut lines, open.take());
                    open = Some((format!("MATCH {pattern}"), predicates));
                }
                Clause::Return { distinct, items } => {
                    flush_match(&mut lines, open.take());
                    let keyword = if distinct { "RETURN DISTINCT" } else { "RETURN" };
                    lines.push(format!("{keyword} {}", items.join(", ")));
                }
                Clause::OrderBy(keys) => {
                    flush_match(&mut lines, open.take());
                    let rendered: Vec<String> = keys
                        .into_iter()
                        .map(|(key, dir)| match dir {
                            Direction::Asc => key,
                            Direction::Desc => format!("{key} DESC"),
                            Direction::DescNullsLast => format!("{key} IS NULL, {key} DESC"),
                        })
                        .collect();
                    lines.push(format!("ORDER BY {}", rendered.join(", ")));
                }
                Clause::Limit(key) => {
                    flush_match(&mut lines, open.take());
                    lines.push(format!("LIMIT ${key}"));
                }
            }
        }
        flush_match(&mut lines, open);

        Query {
            text: lines.join("\n"),
            params: self.params,
        }
    }
}

fn flush_match(lines: &mut Vec<String>, open: Option<(String, Vec<String>)>) {
    if let Some((line, predicates)) = open {
        if predicates.is_empty() {
            lines.push(line);
        } else {
            lines.push(format!("{line} WHERE {}", predicates.join(" AND ")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let q = Query::new("MATCH (m:Movie {id: $id}) RETURN m").param("id", 603_i64);
        assert_eq!(q.get_param("id"), Some(&GraphValue::Integer(603)));
        assert_eq!(q.text(), "MATCH (m:Movie {id: $id}) RETURN m");
    }

    #[test]
    fn test_contains_pattern_escapes() {
        assert_eq!(contains_pattern("matrix"), "(?i).*matrix.*");
        assert_eq!(contains_pattern("Alien (1979)"), r"(?i).*Alien \(1979\).*");

        let re = regex::Regex::new(&contains_pattern("Se7en?")).unwrap();
        assert!(re.is_match("Se7en?"));
        assert!(!re.is_match("Se7e"));
    }

    #[test]
    fn test_builder_minimal() {
        let q = QueryBuilder::matching("(movie:Movie)")
            .returns(&["movie"])
            .limit("limit", 5_i64)
            .build();
        assert_eq!(q.text(), "MATCH (movie:Movie)\nRETURN movie\nLIMIT $limit");
        assert_eq!(q.get_param("limit"), Some(&GraphValue::Integer(5)));
    }

    #[test]
    fn test_filters_merge_into_last_match() {
        let q = QueryBuilder::matching("(movie:Movie)")
            .match_where(
                "(movie)-[:BELONGS_TO_GENRE]->(genre:Genre)",
                "genre.name =~ $genrePattern",
            )
            .filter("movie.year = $year")
            .filter("movie.original_language = $language")
            .returns_distinct(&["movie"])
            .order_by(&[
                ("movie.vote_average", Direction::Desc),
                ("movie.title", Direction::Asc),
            ])
            .build();

        assert_eq!(
            q.text(),
            "MATCH (movie:Movie)\n\
             MATCH (movie)-[:BELONGS_TO_GENRE]->(genre:Genre) WHERE genre.name =~ $genrePattern AND movie.year = $year AND movie.original_language = $language\n\
             RETURN DISTINCT movie\n\
             ORDER BY movie.vote_average DESC, movie.title"
        );
    }

    #[test]
    fn test_desc_nulls_last_sorts_missing_keys_after() {
        let q = QueryBuilder::matching("(movie:Movie)")
            .returns(&["movie"])
            .order_by(&[
                ("movie.vote_average", Direction::DescNullsLast),
                ("movie.title", Direction::Asc),
            ])
            .build();
        assert_eq!(
            q.text(),
            "MATCH (movie:Movie)\n\
             RETURN movie\n\
             ORDER BY movie.vote_average IS NULL, movie.vote_average DESC, movie.title"
        );
    }

    #[test]
    fn test_no_where_without_predicates() {
        let q = QueryBuilder::matching("(movie:Movie)")
            .match_pattern("(actor:Actor {name: $actorName})-[:ACTED_IN]->(movie)")
            .bind("actorName", "Keanu Reeves")
            .returns_distinct(&["movie"])
            .build();
        assert!(!q.text().contains("WHERE"));
        assert_eq!(
            q.get_param("actorName"),
            Some(&GraphValue::String("Keanu Reeves".to_string()))
        );
    }
}
