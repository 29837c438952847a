//! Document export — collects the edited draft, asks the service to render
//! it, and writes the returned document to disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use tempfile::NamedTempFile;
use tracing::info;

use crate::api_client::{Document, GrantService};
use crate::errors::ClientError;
use crate::models::Section;
use crate::review::ReviewSession;

/// Builds the export body from what is currently on screen: displayed
/// organization fields, editor markup and the budget as edited.
pub fn build_export(session: &ReviewSession) -> Value {
    let org = session.organization();
    let mut content = Map::new();

    content.insert(
        "title".to_string(),
        json!(format!("Grant Application for {}", org.display_name())),
    );
    content.insert(
        "organization_info".to_string(),
        json!({
            "name": org.display_name(),
            "mission": org.display_mission(),
            "website": org.display_website(),
        }),
    );
    for section in Section::ALL {
        content.insert(
            section.canonical_key().to_string(),
            Value::String(session.editor(section).html().to_string()),
        );
    }
    content.insert(
        "budget".to_string(),
        serde_json::to_value(session.budget().items()).unwrap_or(Value::Array(Vec::new())),
    );

    Value::Object(content)
}

/// Sends the draft for rendering and saves the document into `output_dir`.
/// Returns the path written.
pub async fn export_document(
    service: &dyn GrantService,
    session: &ReviewSession,
    output_dir: &Path,
) -> Result<PathBuf, ClientError> {
    let content = build_export(session);
    let document = service.save(&content).await?;
    let path = write_document(&document, output_dir)?;

    info!("Saved {} bytes to {}", document.bytes.len(), path.display());
    Ok(path)
}

/// Writes through a temporary file in the target directory so a failed
/// write never leaves a partial document behind.
fn write_document(document: &Document, output_dir: &Path) -> Result<PathBuf, ClientError> {
    std::fs::create_dir_all(output_dir)?;
    let target = output_dir.join(&document.filename);

    let mut temp = NamedTempFile::new_in(output_dir)?;
    temp.write_all(&document.bytes)?;
    temp.flush()?;
    temp.persist(&target).map_err(|e| ClientError::Io(e.error))?;

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::fake::FakeGrantService;
    use crate::models::GrantContent;
    use crate::review::budget::BudgetItemDraft;

    fn loaded_session() -> ReviewSession {
        let mut session = ReviewSession::new();
        session.load(&GrantContent::from_value(json!({
            "organization_info": {"name": "Helping Hands", "website": "helpinghands.org"},
            "executive_summary": "<p>We feed families.</p>",
            "Conclusion": ["Thank you."],
            "budget": {"Printing": 150}
        })));
        session
    }

    #[test]
    fn test_export_captures_edits_and_budget() {
        let mut session = loaded_session();
        session
            .editor_mut(Section::ProblemStatement)
            .set_html("<p>Edited <em>by hand</em></p>");
        session
            .budget_mut()
            .add(BudgetItemDraft {
                item: "Travel".to_string(),
                description: "Mileage".to_string(),
                amount: "75.5".to_string(),
            })
            .unwrap();

        let export = build_export(&session);

        assert_eq!(export["title"], "Grant Application for Helping Hands");
        assert_eq!(
            export["organization_info"],
            json!({"name": "Helping Hands", "mission": "N/A", "website": "helpinghands.org"})
        );
        assert_eq!(export["executive_summary"], "<p>We feed families.</p>");
        assert_eq!(export["problem_statement"], "<p>Edited <em>by hand</em></p>");
        assert_eq!(export["conclusion"], "<p>Thank you.</p>");
        assert_eq!(export["sustainability"], "");
        assert_eq!(
            export["budget"],
            json!([
                {"item": "Printing", "description": "", "amount": 150},
                {"item": "Travel", "description": "Mileage", "amount": "75.5"}
            ])
        );
    }

    #[tokio::test]
    async fn test_export_writes_document_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeGrantService::default();
        let session = loaded_session();

        let path = export_document(&fake, &session, dir.path()).await.unwrap();

        assert_eq!(path, dir.path().join("grant_application.docx"));
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04docx");
        assert_eq!(fake.saved_content().len(), 1);
        // No temporary files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_export_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeGrantService::default();
        fake.push_save_failure(500);

        let result = export_document(&fake, &loaded_session(), dir.path()).await;

        assert!(matches!(result, Err(ClientError::Api { status: 500, .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
