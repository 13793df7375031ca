//! JSON-lines export of the audit log.

use std::io::Write;

use brig_core::actor::Actor;
use brig_core::audit_detail::ExportDetail;
use brig_core::entities::NewAuditLog;
use brig_core::enums::{AuditAction, EntityKind};
use serde_jsonlines::JsonLinesWriter;

use crate::error::DatabaseError;
use crate::repos::audit::AuditFilter;
use crate::service::BrigService;

/// Format tag recorded in the export audit entry.
pub const EXPORT_FORMAT: &str = "jsonl";

impl BrigService {
    /// Write the audit entries matching `filter` to `writer`, one JSON object
    /// per line, newest first, then record the export itself in the log.
    ///
    /// Unlike `query_audit`, an unset `limit` exports every matching entry.
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Io` if writing fails, or `DatabaseError` if
    /// the query or the audit INSERT fails.
    pub async fn export_audit<W: Write>(
        &self,
        actor: Option<&Actor>,
        filter: &AuditFilter,
        writer: W,
    ) -> Result<usize, DatabaseError> {
        let filter = AuditFilter {
            limit: filter.limit.or(Some(u32::MAX)),
            ..filter.clone()
        };
        let entries = self.query_audit(&filter).await?;

        let mut out = JsonLinesWriter::new(writer);
        out.write_all(&entries)?;
        out.flush()?;

        let detail = ExportDetail {
            rows: entries.len(),
            format: EXPORT_FORMAT.to_string(),
            search: filter.search.clone(),
        };
        self.append_audit(&NewAuditLog {
            actor_id: actor.map(|a| a.user_id),
            action: AuditAction::Export,
            object_type: EntityKind::AuditLog.type_name().to_string(),
            object_id: String::new(),
            object_repr: "audit log export".to_string(),
            changes: None,
            extra: Some(serde_json::to_value(&detail)?),
        })
        .await?;

        tracing::info!(rows = detail.rows, "audit log exported");
        Ok(detail.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brig_core::entities::AuditLog;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use crate::test_support::helpers::{seed_actor, seed_project, test_service};

    #[tokio::test]
    async fn writes_one_line_per_entry_and_audits_the_export() {
        let svc = test_service().await;
        let (_, actor) = seed_actor(&svc, "auditor").await;
        seed_project(&svc, Some(&actor), "Tower").await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let file = std::fs::File::create(&path).unwrap();
        let written = svc
            .export_audit(Some(&actor), &AuditFilter::default(), file)
            .await
            .unwrap();

        let lines: Vec<AuditLog> = serde_jsonlines::json_lines(&path)
            .unwrap()
            .collect::<std::io::Result<_>>()
            .unwrap();
        assert_eq!(lines.len(), written);
        assert!(lines.iter().any(|e| e.object_type == "Project"));

        let exports = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Export),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(exports.len(), 1);
        let extra = exports[0].extra.clone().unwrap();
        assert_eq!(extra["rows"], Value::from(written));
        assert_eq!(extra["format"], "jsonl");
        assert_eq!(exports[0].actor_id, Some(actor.user_id));
    }

    #[tokio::test]
    async fn search_narrows_the_export() {
        let svc = test_service().await;
        let (_, actor) = seed_actor(&svc, "auditor").await;
        seed_project(&svc, Some(&actor), "Tower").await;

        let mut buf = Vec::new();
        let filter = AuditFilter {
            search: Some("nothing-matches-this".into()),
            ..AuditFilter::default()
        };
        let written = svc.export_audit(None, &filter, &mut buf).await.unwrap();
        assert_eq!(written, 0);
        assert!(buf.is_empty());
    }
}
