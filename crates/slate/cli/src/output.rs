//! Output formatting utilities

use colored::*;
use serde::Serialize;
use slate_engine::selectors::{select_manifest_items, select_slate};
use slate_engine::AssignmentStore;
use slate_types::{ManifestCategory, Mode, UserId};
use std::collections::BTreeMap;
use tabled::{Table, Tabled};

use crate::script::StepResult;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table format.
    #[default]
    Table,
    /// JSON format.
    Json,
}

/// One live application on the slate.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SlateRow {
    #[tabled(rename = "Rank")]
    pub rank: u32,
    #[tabled(rename = "Billet")]
    pub billet: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Command")]
    pub command: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Application")]
    pub application: String,
}

/// One billet in a manifest category.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct ManifestRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Billet")]
    pub billet: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Location")]
    pub location: String,
}

/// Snapshot of a user's session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub user_id: UserId,
    pub mode: Mode,
    pub slate: Vec<SlateRow>,
    pub manifest: BTreeMap<String, Vec<ManifestRow>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepResult>,
}

impl SessionReport {
    pub fn capture(store: &AssignmentStore, user_id: &UserId, steps: Vec<StepResult>) -> Self {
        let state = store.state();

        let slate = select_slate(state, user_id)
            .into_iter()
            .map(|entry| SlateRow {
                rank: entry.application.preference_rank,
                billet: entry.application.billet_id.to_string(),
                title: entry.billet.map(|b| b.title.clone()).unwrap_or_default(),
                command: entry.billet.map(|b| b.command.clone()).unwrap_or_default(),
                status: entry.application.status.to_string(),
                application: entry.application.id.short(),
            })
            .collect();

        let manifest = ManifestCategory::ALL
            .into_iter()
            .map(|category| {
                let rows = select_manifest_items(state, category)
                    .into_iter()
                    .map(|item| ManifestRow {
                        category: category_name(category).to_string(),
                        billet: item.billet.id.to_string(),
                        title: item.billet.title.clone(),
                        location: item.billet.location.clone(),
                    })
                    .collect();
                (category_name(category).to_string(), rows)
            })
            .collect();

        Self {
            user_id: user_id.clone(),
            mode: store.mode(),
            slate,
            manifest,
            steps,
        }
    }
}

fn category_name(category: ManifestCategory) -> &'static str {
    match category {
        ManifestCategory::Candidates => "candidates",
        ManifestCategory::Favorites => "favorites",
        ManifestCategory::Passed => "passed",
        ManifestCategory::Remaining => "remaining",
    }
}

pub fn print_report(report: &SessionReport, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Table => {
            for step in &report.steps {
                let marker = if step.ok { "✓".green() } else { "✗".red() };
                println!("{} {:>3} {}", marker, step.step, step.result);
            }
            if !report.steps.is_empty() {
                println!();
            }

            println!(
                "{} {} ({} mode)",
                "Slate for".bold(),
                report.user_id.to_string().bold(),
                report.mode
            );
            if report.slate.is_empty() {
                println!("{}", "No applications".dimmed());
            } else {
                println!("{}", Table::new(&report.slate));
            }

            let rows: Vec<&ManifestRow> = report.manifest.values().flatten().collect();
            println!();
            println!("{}", "Manifest".bold());
            if rows.is_empty() {
                println!("{}", "No billets".dimmed());
            } else {
                println!("{}", Table::new(rows));
            }
        }
    }
    Ok(())
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_engine::SlateConfig;
    use slate_types::{Billet, BilletId, SwipeDirection};

    #[test]
    fn test_report_partitions_billets() {
        let mut store = AssignmentStore::new(SlateConfig::default());
        store.load_billets(vec![
            Billet::new(BilletId::new("B1"), "ET1", "USS Example", "Norfolk, VA"),
            Billet::new(BilletId::new("B2"), "ET2", "USS Example", "Norfolk, VA"),
        ]);
        let user = UserId::new("sailor");
        store.swipe(&BilletId::new("B1"), SwipeDirection::Up, &user);

        let report = SessionReport::capture(&store, &user, Vec::new());
        assert_eq!(report.slate.len(), 1);
        assert_eq!(report.slate[0].billet, "B1");
        assert_eq!(report.manifest["remaining"].len(), 1);
        assert!(report.manifest["favorites"].is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("steps").is_none());
        assert_eq!(json["mode"], "real");
    }
}
