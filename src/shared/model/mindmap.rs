//! Mind Map Model
//!
//! A mind map is a titled document containing a node graph, owned by one
//! user and optionally shared with collaborators (viewer or editor role).
//! The `version` counter strictly increases on every successful mutation
//! and is updated together with `last_modified`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::model::node::Point;

/// Maximum mind map title length
pub const MAP_TITLE_MAX_LEN: usize = 100;
/// Maximum mind map description length
pub const MAP_DESCRIPTION_MAX_LEN: usize = 500;
/// Maximum tag length
pub const TAG_MAX_LEN: usize = 20;

/// Access role granted to a collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorRole {
    #[default]
    Viewer,
    Editor,
}

/// A user granted access to a mind map they do not own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub user: Uuid,
    #[serde(default)]
    pub role: CollaboratorRole,
    pub added_at: DateTime<Utc>,
}

/// Canvas layout algorithm hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    #[default]
    Radial,
    Hierarchical,
    Freeform,
}

/// Theme colors stored with the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub primary_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary_color: "#3b82f6".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#1f2937".to_string(),
        }
    }
}

/// Per-map canvas settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSettings {
    #[serde(default)]
    pub layout: LayoutKind,
    #[serde(default)]
    pub theme: ThemeColors,
    pub zoom: f64,
    pub pan: Point,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Radial,
            theme: ThemeColors::default(),
            zoom: 1.0,
            pan: Point::new(0.0, 0.0),
        }
    }
}

/// A titled document containing a node graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMap {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub owner: Uuid,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub settings: MapSettings,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// Strictly increases on every mutating save; starts at 1
    pub version: u64,
}

impl MindMap {
    pub fn is_owner(&self, user: Uuid) -> bool {
        self.owner == user
    }

    /// Role of `user` among the collaborators, if listed.
    pub fn collaborator_role(&self, user: Uuid) -> Option<CollaboratorRole> {
        self.collaborators
            .iter()
            .find(|c| c.user == user)
            .map(|c| c.role)
    }

    /// Owner and any listed collaborator can view.
    pub fn can_view(&self, user: Uuid) -> bool {
        self.is_owner(user) || self.collaborator_role(user).is_some()
    }

    /// Owner and editor-role collaborators can mutate.
    pub fn can_edit(&self, user: Uuid) -> bool {
        self.is_owner(user) || self.collaborator_role(user) == Some(CollaboratorRole::Editor)
    }

    /// Bump version and last_modified together; called on every mutation.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.last_modified = now;
    }

    /// Validate title/description/tags for create and update requests.
    pub fn validate_fields(
        title: Option<&str>,
        description: Option<&str>,
        tags: Option<&[String]>,
    ) -> Result<(), SharedError> {
        if let Some(title) = title {
            let trimmed = title.trim();
            if trimmed.is_empty() || trimmed.len() > MAP_TITLE_MAX_LEN {
                return Err(SharedError::validation(
                    "title",
                    format!("Title must be between 1 and {} characters", MAP_TITLE_MAX_LEN),
                ));
            }
        }
        if let Some(description) = description {
            if description.len() > MAP_DESCRIPTION_MAX_LEN {
                return Err(SharedError::validation(
                    "description",
                    format!(
                        "Description must be less than {} characters",
                        MAP_DESCRIPTION_MAX_LEN
                    ),
                ));
            }
        }
        if let Some(tags) = tags {
            if tags.iter().any(|t| t.trim().len() > TAG_MAX_LEN) {
                return Err(SharedError::validation(
                    "tags",
                    format!("Tags must be at most {} characters", TAG_MAX_LEN),
                ));
            }
        }
        Ok(())
    }
}

/// Request body for creating a mind map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMindMap {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<MapSettings>,
}

/// Partial update for a mind map; settings are shallow-merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MindMapUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsUpdate>,
}

/// Partial update for map settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeColors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<Point>,
}

impl SettingsUpdate {
    pub fn merged_into(&self, base: &MapSettings) -> MapSettings {
        MapSettings {
            layout: self.layout.unwrap_or(base.layout),
            theme: self.theme.clone().unwrap_or_else(|| base.theme.clone()),
            zoom: self.zoom.unwrap_or(base.zoom).clamp(0.1, 3.0),
            pan: self.pan.unwrap_or(base.pan),
        }
    }
}

/// Request body for adding a collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCollaborator {
    pub user_id: Uuid,
    pub role: CollaboratorRole,
}
