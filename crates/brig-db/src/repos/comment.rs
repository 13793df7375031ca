//! Comment thread engine.
//!
//! Comments form trees: top-level comments are scoped to a project or a
//! material, replies point at their parent. Threads are read breadth-first
//! with one fetch-by-parent query per level and assembled in memory, so
//! the depth of a thread never turns into recursion in SQL or on the stack
//! beyond the configured cap.

use std::collections::HashMap;

use brig_core::actor::Actor;
use brig_core::entities::{Comment, CommentNode, NewComment};
use brig_core::enums::EntityKind;
use brig_core::events::{DomainEvent, Mutation};

use crate::error::DatabaseError;
use crate::helpers::{in_list, now_timestamp, opt_int, parse_datetime};
use crate::repos::ensure_exists;
use crate::service::{BrigService, settle};

const COMMENT_COLUMNS: &str = "c.id, c.author_id, c.content, c.created_at, c.parent_id, \
     c.project_id, c.material_id, u.username \
     FROM comments c JOIN users u ON u.id = c.author_id";

/// Parent ids per adjacency query.
const PARENT_BATCH: usize = 500;

/// Equality filters on top-level comments; set fields are AND-combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentFilter {
    pub project_id: Option<i64>,
    pub material_id: Option<i64>,
}

fn row_to_comment(row: &libsql::Row) -> Result<(Comment, String), DatabaseError> {
    Ok((
        Comment {
            id: row.get::<i64>(0)?,
            author_id: row.get::<i64>(1)?,
            content: row.get::<String>(2)?,
            created_at: parse_datetime(&row.get::<String>(3)?)?,
            parent_id: row.get::<Option<i64>>(4)?,
            project_id: row.get::<Option<i64>>(5)?,
            material_id: row.get::<Option<i64>>(6)?,
        },
        row.get::<String>(7)?,
    ))
}

async fn fetch_comment(conn: &libsql::Connection, id: i64) -> Result<Comment, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {COMMENT_COLUMNS} WHERE c.id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found(EntityKind::Comment, id))?;
    Ok(row_to_comment(&row)?.0)
}

/// Depth of comment `id` (top-level = 0), or `None` if it does not exist.
async fn comment_depth(conn: &libsql::Connection, id: i64) -> Result<Option<usize>, DatabaseError> {
    let mut rows = conn
        .query(
            "WITH RECURSIVE chain(id, parent_id, depth) AS (
                 SELECT id, parent_id, 0 FROM comments WHERE id = ?1
                 UNION ALL
                 SELECT c.id, c.parent_id, chain.depth + 1
                 FROM comments c JOIN chain ON c.id = chain.parent_id
             )
             SELECT MAX(depth) FROM chain",
            [id],
        )
        .await?;
    let depth = match rows.next().await? {
        Some(row) => row.get::<Option<i64>>(0)?,
        None => None,
    };
    depth
        .map(|d| usize::try_from(d).map_err(|_| DatabaseError::InvalidState(format!("comment depth {d}"))))
        .transpose()
}

/// Children of `parents`, grouped by parent, each group in id order.
async fn fetch_replies(
    conn: &libsql::Connection,
    parents: &[i64],
) -> Result<Vec<(Comment, String)>, DatabaseError> {
    let mut replies = Vec::new();
    for batch in parents.chunks(PARENT_BATCH) {
        let (placeholders, params) = in_list(batch, 1);
        let mut rows = conn
            .query(
                &format!("SELECT {COMMENT_COLUMNS} WHERE c.parent_id IN ({placeholders}) ORDER BY c.id"),
                libsql::params_from_iter(params),
            )
            .await?;
        while let Some(row) = rows.next().await? {
            replies.push(row_to_comment(&row)?);
        }
    }
    Ok(replies)
}

fn assemble(
    comment: Comment,
    user: String,
    children: &mut HashMap<i64, Vec<(Comment, String)>>,
) -> CommentNode {
    let mut node = CommentNode::from_comment(comment, user);
    if let Some(replies) = children.remove(&node.id) {
        node.replies = replies
            .into_iter()
            .map(|(comment, user)| assemble(comment, user, children))
            .collect();
    }
    node
}

impl BrigService {
    /// Top-level comments matching `filter`, each with its reply subtree
    /// in insertion order. Levels deeper than the configured cap are
    /// left out.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_comment_threads(
        &self,
        filter: CommentFilter,
    ) -> Result<Vec<CommentNode>, DatabaseError> {
        let conn = self.db().conn();

        let mut conditions = vec!["c.parent_id IS NULL".to_string()];
        let mut params: Vec<libsql::Value> = Vec::new();
        if let Some(project_id) = filter.project_id {
            params.push(libsql::Value::Integer(project_id));
            conditions.push(format!("c.project_id = ?{}", params.len()));
        }
        if let Some(material_id) = filter.material_id {
            params.push(libsql::Value::Integer(material_id));
            conditions.push(format!("c.material_id = ?{}", params.len()));
        }
        let sql = format!(
            "SELECT {COMMENT_COLUMNS} WHERE {} ORDER BY c.id",
            conditions.join(" AND ")
        );
        let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
        let mut top = Vec::new();
        while let Some(row) = rows.next().await? {
            top.push(row_to_comment(&row)?);
        }

        let mut children: HashMap<i64, Vec<(Comment, String)>> = HashMap::new();
        let mut frontier: Vec<i64> = top.iter().map(|(c, _)| c.id).collect();
        let mut depth = 0;
        while !frontier.is_empty() {
            if depth >= self.max_comment_depth() {
                tracing::debug!(depth, pending = frontier.len(), "comment threads truncated at depth cap");
                break;
            }
            let replies = fetch_replies(conn, &frontier).await?;
            frontier = replies.iter().map(|(c, _)| c.id).collect();
            for (comment, user) in replies {
                if let Some(parent_id) = comment.parent_id {
                    children.entry(parent_id).or_default().push((comment, user));
                }
            }
            depth += 1;
        }

        Ok(top
            .into_iter()
            .map(|(comment, user)| assemble(comment, user, &mut children))
            .collect())
    }

    /// Post a comment as `author`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for invalid input, an unknown
    /// parent, project, or material, or a reply deeper than the cap.
    pub async fn create_comment(
        &self,
        author: &Actor,
        new: NewComment,
    ) -> Result<Comment, DatabaseError> {
        new.validate()?;
        let tx = self.begin().await?;
        let result: Result<Comment, DatabaseError> = async {
            if let Some(parent_id) = new.parent_id {
                let parent_depth = comment_depth(&tx, parent_id).await?.ok_or_else(|| {
                    DatabaseError::validation(format!("parent: Comment {parent_id} does not exist"))
                })?;
                if parent_depth + 1 > self.max_comment_depth() {
                    return Err(DatabaseError::validation(format!(
                        "reply would be at depth {}, the limit is {}",
                        parent_depth + 1,
                        self.max_comment_depth()
                    )));
                }
            }
            if let Some(project_id) = new.project_id {
                ensure_exists(&tx, EntityKind::Project, project_id, "project").await?;
            }
            if let Some(material_id) = new.material_id {
                ensure_exists(&tx, EntityKind::Material, material_id, "material").await?;
            }

            let created_at = now_timestamp();
            tx.execute(
                "INSERT INTO comments (author_id, content, created_at, parent_id, project_id, material_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![
                    author.user_id,
                    new.content.as_str(),
                    created_at.as_str(),
                    opt_int(new.parent_id),
                    opt_int(new.project_id),
                    opt_int(new.material_id)
                ],
            )
            .await?;
            let comment = Comment {
                id: tx.last_insert_rowid(),
                author_id: author.user_id,
                content: new.content.clone(),
                created_at: parse_datetime(&created_at)?,
                parent_id: new.parent_id,
                project_id: new.project_id,
                material_id: new.material_id,
            };
            let event = DomainEvent::created(&comment);
            self.commit_mutation(&tx, Some(author), Mutation::new(comment, event))
                .await
        }
        .await;
        settle(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no comment has this id.
    pub async fn get_comment(&self, id: i64) -> Result<Comment, DatabaseError> {
        fetch_comment(self.db().conn(), id).await
    }

    /// Delete a comment and every reply under it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no comment has this id.
    pub async fn delete_comment(&self, actor: Option<&Actor>, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin().await?;
        let result = async {
            let comment = fetch_comment(&tx, id).await?;
            self.delete_tracked(&tx, actor, &comment).await
        }
        .await;
        settle(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_config::BrigConfig;
    use brig_core::entities::NewMaterial;
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{count_rows, seed_actor, seed_project, test_service, test_service_with};

    fn ids(nodes: &[CommentNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.id).collect()
    }

    #[tokio::test]
    async fn replies_nest_under_their_parents() {
        let svc = test_service().await;
        let (_, actor) = seed_actor(&svc, "ivan").await;
        let project = seed_project(&svc, None, "Tower").await;

        let a = svc.create_comment(&actor, NewComment::on_project(project.id, "A")).await.unwrap();
        let b = svc.create_comment(&actor, NewComment::reply(a.id, "B")).await.unwrap();
        let c = svc.create_comment(&actor, NewComment::reply(a.id, "C")).await.unwrap();
        let d = svc.create_comment(&actor, NewComment::reply(b.id, "D")).await.unwrap();

        let threads = svc.list_comment_threads(CommentFilter::default()).await.unwrap();
        assert_eq!(ids(&threads), vec![a.id]);
        assert_eq!(threads[0].user, "ivan");
        assert_eq!(ids(&threads[0].replies), vec![b.id, c.id]);
        assert_eq!(ids(&threads[0].replies[0].replies), vec![d.id]);
        assert!(threads[0].replies[1].replies.is_empty());
        assert_eq!(threads[0].subtree_len(), 4);
    }

    #[tokio::test]
    async fn filters_combine_on_top_level_only() {
        let svc = test_service().await;
        let (_, actor) = seed_actor(&svc, "ivan").await;
        let p1 = seed_project(&svc, None, "One").await;
        let p2 = seed_project(&svc, None, "Two").await;
        let sand = svc
            .create_material(None, NewMaterial::new("Песок", 1.0, "т"))
            .await
            .unwrap();

        let on_p1 = svc.create_comment(&actor, NewComment::on_project(p1.id, "p1")).await.unwrap();
        svc.create_comment(&actor, NewComment::reply(on_p1.id, "reply")).await.unwrap();
        svc.create_comment(&actor, NewComment::on_project(p2.id, "p2")).await.unwrap();
        svc.create_comment(&actor, NewComment::on_material(sand.id, "sand")).await.unwrap();

        let threads = svc
            .list_comment_threads(CommentFilter {
                project_id: Some(p1.id),
                material_id: None,
            })
            .await
            .unwrap();
        assert_eq!(ids(&threads), vec![on_p1.id]);
        assert_eq!(threads[0].replies.len(), 1);

        let none = svc
            .list_comment_threads(CommentFilter {
                project_id: Some(p1.id),
                material_id: Some(sand.id),
            })
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn replies_beyond_the_cap_are_rejected() {
        let mut config = BrigConfig::default();
        config.comments.max_depth = 2;
        let svc = test_service_with(&config).await;
        let (_, actor) = seed_actor(&svc, "ivan").await;
        let project = seed_project(&svc, None, "Tower").await;

        let root = svc.create_comment(&actor, NewComment::on_project(project.id, "0")).await.unwrap();
        let one = svc.create_comment(&actor, NewComment::reply(root.id, "1")).await.unwrap();
        let two = svc.create_comment(&actor, NewComment::reply(one.id, "2")).await.unwrap();
        let three = svc.create_comment(&actor, NewComment::reply(two.id, "3")).await;

        assert!(matches!(three, Err(DatabaseError::Validation(_))));
        assert_eq!(count_rows(&svc, "comments").await, 3);
    }

    #[tokio::test]
    async fn reads_stop_at_the_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brig.db");
        let path = path.to_str().unwrap();

        let svc = BrigService::new_local(path, &BrigConfig::default()).await.unwrap();
        let (_, actor) = seed_actor(&svc, "ivan").await;
        let project = seed_project(&svc, None, "Tower").await;
        let root = svc.create_comment(&actor, NewComment::on_project(project.id, "0")).await.unwrap();
        let one = svc.create_comment(&actor, NewComment::reply(root.id, "1")).await.unwrap();
        svc.create_comment(&actor, NewComment::reply(one.id, "2")).await.unwrap();
        drop(svc);

        let mut config = BrigConfig::default();
        config.comments.max_depth = 1;
        let capped = BrigService::new_local(path, &config).await.unwrap();
        let threads = capped.list_comment_threads(CommentFilter::default()).await.unwrap();
        assert_eq!(threads[0].subtree_len(), 2);
        assert!(threads[0].replies[0].replies.is_empty());
    }

    #[tokio::test]
    async fn unknown_parent_is_a_validation_error() {
        let svc = test_service().await;
        let (_, actor) = seed_actor(&svc, "ivan").await;
        let result = svc.create_comment(&actor, NewComment::reply(404, "?")).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn deleting_a_comment_removes_its_subtree() {
        let svc = test_service().await;
        let (_, actor) = seed_actor(&svc, "ivan").await;
        let project = seed_project(&svc, None, "Tower").await;
        let a = svc.create_comment(&actor, NewComment::on_project(project.id, "A")).await.unwrap();
        let b = svc.create_comment(&actor, NewComment::reply(a.id, "B")).await.unwrap();
        svc.create_comment(&actor, NewComment::reply(b.id, "C")).await.unwrap();
        let other = svc.create_comment(&actor, NewComment::on_project(project.id, "X")).await.unwrap();

        svc.delete_comment(Some(&actor), a.id).await.unwrap();
        let threads = svc.list_comment_threads(CommentFilter::default()).await.unwrap();
        assert_eq!(ids(&threads), vec![other.id]);
    }
}
