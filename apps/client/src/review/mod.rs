// Review flow: wait for the draft, load it into editors and the budget
// table, let the user edit, then export.
// All page state lives in `ReviewSession`; only the poller runs in the background.

pub mod budget;
pub mod editor;
pub mod export;
pub mod normalizer;
pub mod poller;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::api_client::GrantService;
use crate::errors::ClientError;
use crate::models::{is_truthy, GrantContent, OrganizationInfo, Section};

use budget::BudgetTable;
use editor::RichTextEditor;
use poller::{spawn_poller, PollEvent, PollOutcome, PollSettings};

/// What the review screen is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewView {
    /// Loading message, optionally replaced by the service's own message.
    Waiting { message: Option<String> },
    /// Editors revealed.
    Completed,
    Failed(String),
}

/// Explicit state of the review screen.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    view: ReviewView,
    organization: OrganizationInfo,
    editors: BTreeMap<Section, RichTextEditor>,
    budget: BudgetTable,
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewSession {
    pub fn new() -> Self {
        let editors = Section::ALL
            .iter()
            .map(|&section| {
                (
                    section,
                    RichTextEditor::new(format!("{} content...", section.title())),
                )
            })
            .collect();

        Self {
            view: ReviewView::Waiting { message: None },
            organization: OrganizationInfo::default(),
            editors,
            budget: BudgetTable::default(),
        }
    }

    pub fn view(&self) -> &ReviewView {
        &self.view
    }

    pub fn is_editor_visible(&self) -> bool {
        self.view == ReviewView::Completed
    }

    pub fn organization(&self) -> &OrganizationInfo {
        &self.organization
    }

    pub fn editor(&self, section: Section) -> &RichTextEditor {
        &self.editors[&section]
    }

    pub fn editor_mut(&mut self, section: Section) -> &mut RichTextEditor {
        self.editors
            .entry(section)
            .or_insert_with(|| RichTextEditor::new(format!("{} content...", section.title())))
    }

    pub fn budget(&self) -> &BudgetTable {
        &self.budget
    }

    pub fn budget_mut(&mut self) -> &mut BudgetTable {
        &mut self.budget
    }

    /// Applies one poller event to the view.
    pub fn apply(&mut self, event: PollEvent) {
        match event {
            PollEvent::Waiting { message, .. } => {
                // A declared error replaces the loading text but polling goes on.
                if message.is_some() {
                    self.view = ReviewView::Waiting { message };
                }
            }
            PollEvent::RequestFailed { .. } => {}
            PollEvent::Completed(content) => {
                self.load(&content);
                self.view = ReviewView::Completed;
            }
            PollEvent::Failed(message) => self.view = ReviewView::Failed(message),
        }
    }

    /// Fills organization fields, editors and budget from service content.
    pub fn load(&mut self, content: &GrantContent) {
        self.organization = content.organization_info();

        for section in Section::ALL {
            let markup = normalizer::format_section(content.section(section));
            self.editor_mut(section).set_html(&markup);
        }

        if let Some(budget) = content.budget().filter(|b| is_truthy(b)) {
            self.budget.load(budget);
        }

        info!(
            "Loaded grant draft for {} ({} budget items)",
            self.organization.display_name(),
            self.budget.len()
        );
    }
}

/// Owns the review session and its connection to the service.
pub struct ReviewController {
    service: Arc<dyn GrantService>,
    settings: PollSettings,
    session: ReviewSession,
}

impl ReviewController {
    pub fn new(service: Arc<dyn GrantService>, settings: PollSettings) -> Self {
        Self {
            service,
            settings,
            session: ReviewSession::new(),
        }
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ReviewSession {
        &mut self.session
    }

    /// Polls until the draft is ready or polling gives up. `on_event` sees
    /// each event after it has been applied to the session. Dropping the
    /// returned future cancels the poller.
    pub async fn wait_for_draft(
        &mut self,
        mut on_event: impl FnMut(&PollEvent, &ReviewSession),
    ) -> PollOutcome {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_poller(self.service.clone(), self.settings, tx);

        while let Some(event) = rx.recv().await {
            self.session.apply(event.clone());
            on_event(&event, &self.session);
        }

        let outcome = handle.finished().await;
        if outcome != PollOutcome::Completed {
            warn!("Review stopped before the draft was loaded: {outcome:?}");
        }
        outcome
    }

    pub async fn export(&self, output_dir: &Path) -> Result<PathBuf, ClientError> {
        export::export_document(self.service.as_ref(), &self.session, output_dir).await
    }
}
