//! Mind Map List Queries
//!
//! Filtering, sorting and pagination over the caller's mind maps: free-text
//! search over title/description, any-membership tag filter, caller-chosen
//! sort field and direction, 1-based page/limit pagination.

use serde::{Deserialize, Serialize};

use crate::shared::envelope::Pagination;
use crate::shared::model::MindMap;

/// Sortable mind map fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    LastModified,
    CreatedAt,
    Title,
    Version,
}

impl SortField {
    /// Parse the query-string form; unknown values fall back to the default.
    pub fn parse(value: &str) -> Self {
        match value {
            "created_at" | "createdAt" => Self::CreatedAt,
            "title" => Self::Title,
            "version" => Self::Version,
            _ => Self::LastModified,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        match value {
            "asc" => Self::Asc,
            _ => Self::Desc,
        }
    }
}

/// A list query over the caller's mind maps
#[derive(Debug, Clone)]
pub struct MindMapQuery {
    /// 1-based page number
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Case-insensitive substring over title and description
    pub search: Option<String>,
    /// Any-membership tag filter
    pub tags: Option<Vec<String>>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for MindMapQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
            tags: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl MindMapQuery {
    /// Whether `map` passes the search and tag filters.
    pub fn matches(&self, map: &MindMap) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = map.title.to_lowercase().contains(&needle)
                || map.description.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(tags) = &self.tags {
            if !tags.iter().any(|t| map.tags.iter().any(|mt| mt == t)) {
                return false;
            }
        }
        true
    }

    /// Sort, then slice out the requested page.
    pub fn paginate(&self, mut maps: Vec<MindMap>) -> (Vec<MindMap>, Pagination) {
        maps.sort_by(|a, b| {
            let ordering = match self.sort_by {
                SortField::LastModified => a.last_modified.cmp(&b.last_modified),
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SortField::Version => a.version.cmp(&b.version),
            };
            match self.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = maps.len() as u64;
        let limit = self.limit.max(1) as usize;
        let page = self.page.max(1) as usize;
        let pages = ((total as usize + limit - 1) / limit).max(1) as u32;

        let start = (page - 1) * limit;
        let items = if start >= maps.len() {
            Vec::new()
        } else {
            maps.into_iter().skip(start).take(limit).collect()
        };

        (
            items,
            Pagination {
                current: page as u32,
                pages,
                total,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::model::MapSettings;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn map_titled(title: &str, tags: Vec<&str>, age_minutes: i64) -> MindMap {
        let now = Utc::now() - Duration::minutes(age_minutes);
        MindMap {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("about {}", title),
            owner: Uuid::new_v4(),
            collaborators: Vec::new(),
            is_public: false,
            settings: MapSettings::default(),
            tags: tags.into_iter().map(String::from).collect(),
            created_at: now,
            last_modified: now,
            version: 1,
        }
    }

    #[test]
    fn test_search_matches_title_and_description() {
        let query = MindMapQuery {
            search: Some("plan".to_string()),
            ..MindMapQuery::default()
        };
        assert!(query.matches(&map_titled("Project Plan", vec![], 0)));
        assert!(!query.matches(&map_titled("Roadmap", vec![], 0)));

        let mut by_description = map_titled("Roadmap", vec![], 0);
        by_description.description = "quarterly planning".to_string();
        assert!(query.matches(&by_description));
    }

    #[test]
    fn test_tag_filter_any_membership() {
        let query = MindMapQuery {
            tags: Some(vec!["work".to_string(), "urgent".to_string()]),
            ..MindMapQuery::default()
        };
        assert!(query.matches(&map_titled("A", vec!["work"], 0)));
        assert!(query.matches(&map_titled("B", vec!["urgent", "home"], 0)));
        assert!(!query.matches(&map_titled("C", vec!["home"], 0)));
    }

    #[test]
    fn test_default_sort_is_last_modified_desc() {
        let old = map_titled("old", vec![], 60);
        let fresh = map_titled("fresh", vec![], 0);
        let (items, _) = MindMapQuery::default().paginate(vec![old, fresh]);
        assert_eq!(items[0].title, "fresh");
        assert_eq!(items[1].title, "old");
    }

    #[test]
    fn test_title_sort_asc() {
        let query = MindMapQuery {
            sort_by: SortField::Title,
            sort_order: SortOrder::Asc,
            ..MindMapQuery::default()
        };
        let (items, _) = query.paginate(vec![
            map_titled("beta", vec![], 0),
            map_titled("Alpha", vec![], 0),
        ]);
        assert_eq!(items[0].title, "Alpha");
    }

    #[test]
    fn test_pagination_slices_and_counts() {
        let maps: Vec<MindMap> = (0..25).map(|i| map_titled(&format!("m{}", i), vec![], i)).collect();
        let query = MindMapQuery {
            page: 2,
            limit: 10,
            ..MindMapQuery::default()
        };
        let (items, pagination) = query.paginate(maps);
        assert_eq!(items.len(), 10);
        assert_eq!(pagination.current, 2);
        assert_eq!(pagination.pages, 3);
        assert_eq!(pagination.total, 25);
    }

    #[test]
    fn test_page_beyond_end_is_empty() {
        let query = MindMapQuery {
            page: 9,
            limit: 10,
            ..MindMapQuery::default()
        };
        let (items, pagination) = query.paginate(vec![map_titled("only", vec![], 0)]);
        assert!(items.is_empty());
        assert_eq!(pagination.total, 1);
    }
}
