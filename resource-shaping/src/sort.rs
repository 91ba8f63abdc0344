//! Sort compilation
//!
//! An `orderBy` expression is a comma-separated list of public field names,
//! each optionally followed by `asc` or `desc`. Compilation validates each
//! field against a [`PropertyMapping`] and expands it into backing-property
//! [`SortStep`]s that a storage collaborator applies as successive keys.
//!
//! # Example
//!
//! ```rust
//! use resource_shaping::mapping::{MappedProperty, PropertyMapping};
//! use resource_shaping::sort::{compile_sort, SortDirection};
//!
//! let mapping = PropertyMapping::builder()
//!     .field("title")
//!     .map("freshness", [MappedProperty::reversed("last_modified")])
//!     .build();
//!
//! let steps = compile_sort(Some("title desc, freshness"), &mapping).unwrap();
//! assert_eq!(steps[0].property, "title");
//! assert_eq!(steps[0].direction, SortDirection::Descending);
//! assert_eq!(steps[1].property, "last_modified");
//! assert_eq!(steps[1].direction, SortDirection::Descending);
//! ```

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mapping::PropertyMapping;
use crate::repository::{RepositoryError, RepositoryResult};

/// Sort direction of a compiled step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// Ascending order (A-Z, 0-9, oldest first)
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    /// Descending order (Z-A, 9-0, newest first)
    #[serde(rename = "desc")]
    Descending,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

impl SortDirection {
    /// The opposite direction
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Whether this is [`SortDirection::Descending`]
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Descending)
    }
}

/// One compiled key of a multi-key sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortStep {
    /// Backing entity property
    pub property: String,
    /// Direction after applying the property's reversal flag
    pub direction: SortDirection,
    /// Whether this is the primary key (`ORDER BY` rather than `THEN BY`)
    pub first: bool,
}

impl SortStep {
    /// Whether this step sorts descending
    #[must_use]
    pub fn is_descending(&self) -> bool {
        self.direction.is_descending()
    }
}

/// A parsed `orderBy` token before mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortToken<'a> {
    /// Public field name as written by the client
    pub field: &'a str,
    /// Requested direction
    pub direction: SortDirection,
}

/// Split an `orderBy` expression into tokens
///
/// Empty tokens are dropped. A token may carry one trailing `asc`/`desc`
/// keyword, matched case-insensitively.
///
/// # Errors
///
/// Returns [`Error::UnknownSortField`] for a token with any other suffix.
pub fn parse_order_by(order_by: &str) -> Result<Vec<SortToken<'_>>> {
    order_by
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Result<SortToken<'_>> {
    let mut parts = token.split_whitespace();
    let field = parts
        .next()
        .ok_or_else(|| Error::UnknownSortField(token.to_string()))?;

    let direction = match parts.next() {
        None => SortDirection::Ascending,
        Some(keyword) if keyword.eq_ignore_ascii_case("desc") => SortDirection::Descending,
        Some(keyword) if keyword.eq_ignore_ascii_case("asc") => SortDirection::Ascending,
        Some(_) => return Err(Error::UnknownSortField(token.to_string())),
    };

    if parts.next().is_some() {
        return Err(Error::UnknownSortField(token.to_string()));
    }

    Ok(SortToken { field, direction })
}

/// Compile an `orderBy` expression into backing-property sort steps
///
/// Token order is preserved and each public field expands into all of its
/// mapped properties. A reversed property flips the requested direction. An
/// empty or absent expression sorts by the identity field ascending.
///
/// # Errors
///
/// Returns [`Error::UnknownSortField`] if a token names an unmapped field or
/// carries an unrecognized suffix. Callers validate client input first with
/// [`MappingRegistry::validate_mapping_exists`](crate::mapping::MappingRegistry::validate_mapping_exists),
/// so this indicates a broken invariant rather than bad input.
pub fn compile_sort(order_by: Option<&str>, mapping: &PropertyMapping) -> Result<Vec<SortStep>> {
    let mut tokens = parse_order_by(order_by.unwrap_or_default())?;
    if tokens.is_empty() {
        tokens.push(SortToken {
            field: mapping.identity(),
            direction: SortDirection::Ascending,
        });
    }

    let mut steps = Vec::new();
    for token in &tokens {
        let properties = mapping
            .get(token.field)
            .ok_or_else(|| Error::UnknownSortField(token.field.to_string()))?;

        for property in properties {
            let direction = if property.reversed {
                token.direction.reverse()
            } else {
                token.direction
            };
            steps.push(SortStep {
                property: property.name.clone(),
                direction,
                first: steps.is_empty(),
            });
        }
    }

    tracing::debug!(
        order_by = order_by.unwrap_or_default(),
        steps = steps.len(),
        "Compiled sort expression"
    );
    Ok(steps)
}

/// Per-property comparison for entities sorted in memory
pub trait PropertyOrdering {
    /// Compare two entities by a backing property, `None` if the property is unknown
    fn compare_property(&self, other: &Self, property: &str) -> Option<Ordering>;
}

/// Apply compiled sort steps to entities held in memory
///
/// Performs a stable multi-key sort. Ties remaining after the last step are
/// broken by `identity` ascending unless a step already sorts by it.
///
/// # Errors
///
/// Returns a [`RepositoryError`] if a step names a property the entity
/// cannot compare.
pub fn apply_sort<E: PropertyOrdering>(
    items: &mut [E],
    steps: &[SortStep],
    identity: &str,
) -> RepositoryResult<()> {
    if let Some(probe) = items.first() {
        for property in steps.iter().map(|s| s.property.as_str()).chain([identity]) {
            if probe.compare_property(probe, property).is_none() {
                return Err(RepositoryError::invalid_sort(property));
            }
        }
    }

    let tie_break = !steps.iter().any(|step| step.property == identity);
    items.sort_by(|a, b| {
        for step in steps {
            let ordering = a
                .compare_property(b, &step.property)
                .unwrap_or(Ordering::Equal);
            let ordering = if step.is_descending() {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        if tie_break {
            a.compare_property(b, identity).unwrap_or(Ordering::Equal)
        } else {
            Ordering::Equal
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappedProperty;

    fn mapping(author_reversed: bool) -> PropertyMapping {
        let author = if author_reversed {
            MappedProperty::reversed("author_name")
        } else {
            MappedProperty::new("author_name")
        };
        PropertyMapping::builder()
            .map("title", [MappedProperty::new("title_text")])
            .map("author", [author])
            .map(
                "name",
                [
                    MappedProperty::new("first_name"),
                    MappedProperty::reversed("last_name"),
                ],
            )
            .build()
    }

    #[test]
    fn test_sort_direction_display() {
        assert_eq!(format!("{}", SortDirection::Ascending), "asc");
        assert_eq!(format!("{}", SortDirection::Descending), "desc");
        assert_eq!(SortDirection::Descending.reverse(), SortDirection::Ascending);
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }

    #[test]
    fn test_sort_direction_serde() {
        let desc: SortDirection = serde_json::from_str("\"desc\"").unwrap();
        assert_eq!(desc, SortDirection::Descending);
        assert_eq!(
            serde_json::to_string(&SortDirection::Ascending).unwrap(),
            "\"asc\""
        );
    }

    #[test]
    fn test_parse_order_by_tokens() {
        let tokens = parse_order_by(" title DESC , ,author asc,id").unwrap();
        assert_eq!(
            tokens,
            vec![
                SortToken {
                    field: "title",
                    direction: SortDirection::Descending
                },
                SortToken {
                    field: "author",
                    direction: SortDirection::Ascending
                },
                SortToken {
                    field: "id",
                    direction: SortDirection::Ascending
                },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_suffix() {
        assert!(matches!(
            parse_order_by("title downwards"),
            Err(Error::UnknownSortField(_))
        ));
        assert!(parse_order_by("title desc extra").is_err());
    }

    #[test]
    fn test_compile_two_fields() {
        let steps = compile_sort(Some("title desc, author"), &mapping(false)).unwrap();
        assert_eq!(
            steps,
            vec![
                SortStep {
                    property: "title_text".into(),
                    direction: SortDirection::Descending,
                    first: true,
                },
                SortStep {
                    property: "author_name".into(),
                    direction: SortDirection::Ascending,
                    first: false,
                },
            ]
        );
    }

    #[test]
    fn test_reversed_property_flips_direction() {
        let steps = compile_sort(Some("title desc, author"), &mapping(true)).unwrap();
        assert_eq!(steps[0].direction, SortDirection::Descending);
        assert_eq!(steps[1].direction, SortDirection::Descending);

        let steps = compile_sort(Some("author desc"), &mapping(true)).unwrap();
        assert_eq!(steps[0].direction, SortDirection::Ascending);
    }

    #[test]
    fn test_many_to_one_expansion_keeps_order() {
        let steps = compile_sort(Some("name desc, title"), &mapping(false)).unwrap();
        let summary: Vec<_> = steps
            .iter()
            .map(|s| (s.property.as_str(), s.direction, s.first))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("first_name", SortDirection::Descending, true),
                ("last_name", SortDirection::Ascending, false),
                ("title_text", SortDirection::Ascending, false),
            ]
        );
    }

    #[test]
    fn test_empty_expression_sorts_by_identity() {
        for order_by in [None, Some(""), Some(" , ")] {
            let steps = compile_sort(order_by, &mapping(false)).unwrap();
            assert_eq!(
                steps,
                vec![SortStep {
                    property: "id".into(),
                    direction: SortDirection::Ascending,
                    first: true,
                }]
            );
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let steps = compile_sort(Some("TITLE Desc"), &mapping(false)).unwrap();
        assert_eq!(steps[0].property, "title_text");
        assert!(steps[0].is_descending());
    }

    #[test]
    fn test_unknown_field_fails_whole_compile() {
        let err = compile_sort(Some("title, colour"), &mapping(false)).unwrap_err();
        assert!(matches!(err, Error::UnknownSortField(field) if field == "colour"));
    }

    #[derive(Debug, Clone)]
    struct Row {
        id: u32,
        group: &'static str,
        score: i32,
    }

    impl PropertyOrdering for Row {
        fn compare_property(&self, other: &Self, property: &str) -> Option<Ordering> {
            match property {
                "id" => Some(self.id.cmp(&other.id)),
                "group" => Some(self.group.cmp(other.group)),
                "score" => Some(self.score.cmp(&other.score)),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 4,
                group: "b",
                score: 1,
            },
            Row {
                id: 2,
                group: "a",
                score: 5,
            },
            Row {
                id: 3,
                group: "b",
                score: 1,
            },
            Row {
                id: 1,
                group: "a",
                score: 7,
            },
        ]
    }

    fn ids(rows: &[Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_apply_sort_multi_key_with_identity_tie_break() {
        let mut rows = rows();
        let steps = vec![
            SortStep {
                property: "group".into(),
                direction: SortDirection::Descending,
                first: true,
            },
            SortStep {
                property: "score".into(),
                direction: SortDirection::Ascending,
                first: false,
            },
        ];
        apply_sort(&mut rows, &steps, "id").unwrap();
        assert_eq!(ids(&rows), vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_apply_sort_respects_explicit_identity_direction() {
        let mut rows = rows();
        let steps = vec![SortStep {
            property: "id".into(),
            direction: SortDirection::Descending,
            first: true,
        }];
        apply_sort(&mut rows, &steps, "id").unwrap();
        assert_eq!(ids(&rows), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_apply_sort_unknown_property() {
        let mut rows = rows();
        let steps = vec![SortStep {
            property: "colour".into(),
            direction: SortDirection::Ascending,
            first: true,
        }];
        assert!(apply_sort(&mut rows, &steps, "id").is_err());

        let mut empty: Vec<Row> = Vec::new();
        assert!(apply_sort(&mut empty, &steps, "id").is_ok());
    }
}
