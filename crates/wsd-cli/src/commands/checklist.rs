use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wsd_core::entities::{ChecklistItem, NewChecklistItem};
use wsd_core::enums::ItemStatus;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ChecklistCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// `[[items]]` in TOML, or `{"items": [...]}` in JSON.
#[derive(Debug, Deserialize)]
struct ChecklistFile {
    items: Vec<NewChecklistItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonChecklist {
    Bare(Vec<NewChecklistItem>),
    Wrapped(ChecklistFile),
}

#[derive(Debug, Serialize)]
struct ChecklistResponse {
    session_id: String,
    obtained: usize,
    missing: usize,
    items: Vec<ChecklistItem>,
}

impl ChecklistResponse {
    fn new(session_id: &str, items: Vec<ChecklistItem>) -> Self {
        let obtained = items.iter().filter(|item| item.is_obtained()).count();
        Self {
            session_id: session_id.to_string(),
            obtained,
            missing: items.len() - obtained,
            items,
        }
    }
}

/// Handle `wsd checklist`.
pub async fn handle(
    action: &ChecklistCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ChecklistCommands::Generate { session, file } => {
            let items = read_checklist(Path::new(file))?;
            let created = ctx.store().replace_checklist(session, &items).await?;
            output(&ChecklistResponse::new(session, created), flags.format)
        }
        ChecklistCommands::List { session, status } => {
            let status = status
                .as_deref()
                .map(|raw| parse_enum::<ItemStatus>(raw, "status"))
                .transpose()?;
            let items = ctx.store().list_items(session, status).await?;
            output(&ChecklistResponse::new(session, items), flags.format)
        }
    }
}

fn read_checklist(path: &Path) -> anyhow::Result<Vec<NewChecklistItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read checklist file {}", path.display()))?;
    parse_checklist(path, &raw).with_context(|| format!("invalid checklist file {}", path.display()))
}

fn parse_checklist(path: &Path, raw: &str) -> anyhow::Result<Vec<NewChecklistItem>> {
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        return Ok(toml::from_str::<ChecklistFile>(raw)?.items);
    }
    Ok(match serde_json::from_str::<JsonChecklist>(raw)? {
        JsonChecklist::Bare(items) => items,
        JsonChecklist::Wrapped(file) => file.items,
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use wsd_core::enums::Importance;

    use super::{parse_checklist, read_checklist};

    #[test]
    fn parses_toml_item_tables() {
        let raw = r#"
[[items]]
text = "Number and location of warehouses"
importance = "critical"
category = "logistics"
suggested_question = "How many warehouses do you run?"

[[items]]
text = "Peak season volume"
importance = "nice_to_have"
"#;
        let items = parse_checklist(Path::new("items.toml"), raw).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].category, "logistics");
        assert_eq!(items[1].importance, Importance::NiceToHave);
    }

    #[test]
    fn parses_bare_and_wrapped_json() {
        let bare = r#"[{"text":"Fleet size","importance":"important"}]"#;
        let wrapped = r#"{"items":[{"text":"Fleet size","importance":"important"}]}"#;
        let a = parse_checklist(Path::new("items.json"), bare).unwrap();
        let b = parse_checklist(Path::new("items.json"), wrapped).unwrap();
        assert_eq!(a[0].text, "Fleet size");
        assert_eq!(b[0].text, "Fleet size");
    }

    #[test]
    fn rejects_unknown_importance() {
        let raw = r#"[{"text":"Fleet size","importance":"urgent"}]"#;
        assert!(parse_checklist(Path::new("items.json"), raw).is_err());
    }

    #[test]
    fn reads_checklist_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.toml");
        std::fs::write(&path, "[[items]]\ntext = \"Fleet size\"\nimportance = \"critical\"\n").unwrap();
        let items = read_checklist(&path).unwrap();
        assert_eq!(items.len(), 1);

        let missing = read_checklist(&dir.path().join("absent.json")).unwrap_err();
        assert!(missing.to_string().contains("failed to read checklist file"));
    }
}
