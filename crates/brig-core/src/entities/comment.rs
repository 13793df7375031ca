use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{impl_tracked, require_text};
use crate::enums::EntityKind;
use crate::errors::CoreError;

/// A comment on a project or material, or a reply to another comment.
///
/// Only top-level comments (no `parent_id`) carry a scope. Replies belong to
/// the thread of their root ancestor.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<i64>,
    pub project_id: Option<i64>,
    pub material_id: Option<i64>,
}

/// Create payload. The author is never part of it: it comes from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewComment {
    pub content: String,
    #[serde(default, alias = "parent")]
    pub parent_id: Option<i64>,
    #[serde(default, alias = "project")]
    pub project_id: Option<i64>,
    #[serde(default, alias = "material")]
    pub material_id: Option<i64>,
}

impl NewComment {
    #[must_use]
    pub fn on_project(project_id: i64, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn on_material(material_id: i64, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            material_id: Some(material_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reply(parent_id: i64, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` for blank content, a top-level comment
    /// without exactly one of project/material, or a reply carrying a scope.
    pub fn validate(&self) -> Result<(), CoreError> {
        require_text("content", &self.content)?;
        let scopes = usize::from(self.project_id.is_some()) + usize::from(self.material_id.is_some());
        match (self.parent_id, scopes) {
            (None, 1) | (Some(_), 0) => Ok(()),
            (None, _) => Err(CoreError::validation(
                "top-level comment must reference exactly one of project or material",
            )),
            (Some(_), _) => Err(CoreError::validation(
                "reply must not carry a project or material; it inherits its thread",
            )),
        }
    }
}

/// A comment rendered with its reply subtree.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CommentNode {
    pub id: i64,
    pub author_id: i64,
    /// Author's username.
    pub user: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<i64>,
    pub project_id: Option<i64>,
    pub material_id: Option<i64>,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    #[must_use]
    pub fn from_comment(comment: Comment, user: String) -> Self {
        Self {
            id: comment.id,
            author_id: comment.author_id,
            user,
            content: comment.content,
            created_at: comment.created_at,
            parent_id: comment.parent_id,
            project_id: comment.project_id,
            material_id: comment.material_id,
            replies: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    #[must_use]
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(Self::subtree_len).sum::<usize>()
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Comment #{}", self.id)
    }
}

impl_tracked!(Comment, EntityKind::Comment);
