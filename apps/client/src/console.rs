//! Terminal front end: form prompts, the review menu and table rendering.
//!
//! Prompts block the current task; there is only ever one interaction at a time.

use std::path::Path;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use dialoguer::{Confirm, Editor, Input, Select};

use crate::errors::GENERIC_SAVE_ERROR;
use crate::models::{GenerationRequest, OrganizationInfo, Section};
use crate::review::budget::{BudgetItemDraft, RenderedBudget};
use crate::review::poller::PollEvent;
use crate::review::{ReviewController, ReviewSession, ReviewView};

const LOADING_MESSAGE: &str = "Waiting for the grant application to be generated...";

/// Asks for every blank field. With `edit_all`, every field is offered
/// again pre-filled with its current value.
pub fn prompt_request(mut request: GenerationRequest, edit_all: bool) -> Result<GenerationRequest> {
    let fields: [(&str, &mut String); 4] = [
        ("Organization name", &mut request.nonprofit_name),
        ("Organization mission", &mut request.nonprofit_mission),
        ("Organization website", &mut request.nonprofit_website),
        ("Grant URL", &mut request.grant_url),
    ];
    for (label, value) in fields {
        if edit_all || value.trim().is_empty() {
            *value = Input::<String>::new()
                .with_prompt(label)
                .with_initial_text(value.clone())
                .interact_text()?;
        }
    }
    Ok(request)
}

pub fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(true).interact()?)
}

/// Progress output while the poller runs.
pub fn report_poll_event(event: &PollEvent, session: &ReviewSession) {
    match (event, session.view()) {
        (PollEvent::Waiting { attempt: 1, .. }, ReviewView::Waiting { message: None }) => {
            eprintln!("{LOADING_MESSAGE}");
        }
        (PollEvent::Waiting { .. }, ReviewView::Waiting { message: Some(m) }) => {
            eprintln!("{m}");
        }
        (PollEvent::Completed(_), _) => eprintln!("Your draft is ready."),
        (_, ReviewView::Failed(message)) => eprintln!("{message}"),
        _ => {}
    }
}

pub fn organization_summary(org: &OrganizationInfo) -> String {
    format!(
        "Organization: {}\nMission:      {}\nWebsite:      {} <{}>",
        org.display_name(),
        org.display_mission(),
        org.display_website(),
        org.website_href()
    )
}

pub fn budget_table(rendered: &RenderedBudget) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["#", "Item", "Description", "Amount"]);
    for row in &rendered.rows {
        table.add_row(vec![
            (row.index + 1).to_string(),
            row.item.clone(),
            row.description.clone(),
            row.amount.clone(),
        ]);
    }
    table.add_row(vec![
        String::new(),
        "Total".to_string(),
        String::new(),
        rendered.total.clone(),
    ]);
    table
}

fn pick_section(prompt: &str) -> Result<Option<Section>> {
    let titles: Vec<&str> = Section::ALL.iter().map(|s| s.title()).collect();
    let choice = Select::new()
        .with_prompt(prompt)
        .items(&titles)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|i| Section::ALL[i]))
}

fn prompt_budget_item() -> Result<BudgetItemDraft> {
    let ask = |label: &str| -> Result<String> {
        Ok(Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()?)
    };
    Ok(BudgetItemDraft {
        item: ask("Item")?,
        description: ask("Description")?,
        amount: ask("Amount")?,
    })
}

#[derive(Clone, Copy)]
enum MenuAction {
    ViewSection,
    EditSection,
    ShowBudget,
    AddBudgetItem,
    RemoveBudgetItem,
    SaveDocument,
    Quit,
}

const MENU: &[(&str, MenuAction)] = &[
    ("View a section", MenuAction::ViewSection),
    ("Edit a section", MenuAction::EditSection),
    ("Show budget", MenuAction::ShowBudget),
    ("Add budget item", MenuAction::AddBudgetItem),
    ("Remove budget item", MenuAction::RemoveBudgetItem),
    ("Save as document", MenuAction::SaveDocument),
    ("Quit", MenuAction::Quit),
];

/// Interactive editing loop over a loaded draft.
pub async fn review_loop(controller: &mut ReviewController, output_dir: &Path) -> Result<()> {
    println!("{}", organization_summary(controller.session().organization()));
    println!("{}", budget_table(&controller.session().budget().render()));

    let labels: Vec<&str> = MENU.iter().map(|(label, _)| *label).collect();
    loop {
        let choice = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact_opt()?;
        let action = choice.map(|i| MENU[i].1).unwrap_or(MenuAction::Quit);

        match action {
            MenuAction::ViewSection => {
                if let Some(section) = pick_section("Section")? {
                    let editor = controller.session().editor(section);
                    println!("── {} ──", section.title());
                    if editor.is_empty() {
                        println!("({})", editor.placeholder());
                    } else {
                        println!("{}", editor.plain_text());
                    }
                }
            }
            MenuAction::EditSection => {
                if let Some(section) = pick_section("Section to edit")? {
                    let current = controller.session().editor(section).html().to_string();
                    if let Some(edited) = Editor::new().extension(".html").edit(&current)? {
                        controller.session_mut().editor_mut(section).set_html(edited.trim());
                    }
                }
            }
            MenuAction::ShowBudget => {
                println!("{}", budget_table(&controller.session().budget().render()));
            }
            MenuAction::AddBudgetItem => {
                let draft = prompt_budget_item()?;
                match controller.session_mut().budget_mut().add(draft) {
                    Ok(()) => {
                        println!("{}", budget_table(&controller.session().budget().render()))
                    }
                    Err(e) => eprintln!("{}", e.user_message(GENERIC_SAVE_ERROR)),
                }
            }
            MenuAction::RemoveBudgetItem => {
                let rendered = controller.session().budget().render();
                if rendered.rows.is_empty() {
                    println!("The budget is empty.");
                    continue;
                }
                let rows: Vec<String> = rendered
                    .rows
                    .iter()
                    .map(|r| format!("{} ({})", r.item, r.amount))
                    .collect();
                if let Some(index) = Select::new()
                    .with_prompt("Remove which item?")
                    .items(&rows)
                    .interact_opt()?
                {
                    controller.session_mut().budget_mut().remove(index);
                    println!("{}", budget_table(&controller.session().budget().render()));
                }
            }
            MenuAction::SaveDocument => match controller.export(output_dir).await {
                Ok(path) => println!("Saved {}", path.display()),
                Err(e) => eprintln!("{}", e.user_message(GENERIC_SAVE_ERROR)),
            },
            MenuAction::Quit => return Ok(()),
        }
    }
}
