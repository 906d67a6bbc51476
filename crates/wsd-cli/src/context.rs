use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use wsd_config::WsdConfig;
use wsd_db::service::WsdService;
use wsd_engine::{ChecklistStateMachine, EngineSettings, ReanalysisCoordinator};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: WsdConfig,
    pub machine: Arc<ChecklistStateMachine>,
    pub coordinator: ReanalysisCoordinator,
}

impl AppContext {
    /// Open the store at `db_override` (or the configured path) and wire the engine.
    pub async fn init(config: WsdConfig, db_override: Option<&str>) -> anyhow::Result<Self> {
        let db_path = db_override.map_or_else(|| config.database.path.clone(), str::to_string);
        ensure_parent_dir(&db_path)?;

        let store = WsdService::new_local(&db_path, &config.lock)
            .await
            .with_context(|| format!("failed to open discovery database at {db_path}"))?;

        let settings = EngineSettings::from(&config.analysis);
        let interpreter = wsd_interpreter::from_config(&config.interpreter, settings.interpreter_timeout)
            .context("failed to initialize evidence interpreter")?;
        tracing::debug!(db_path, interpreter = interpreter.name(), "application context ready");

        let machine = Arc::new(ChecklistStateMachine::new(Arc::new(store), interpreter, settings));
        let coordinator = ReanalysisCoordinator::new(Arc::clone(&machine));
        Ok(Self {
            config,
            machine,
            coordinator,
        })
    }

    pub fn store(&self) -> &WsdService {
        self.machine.store()
    }
}

fn ensure_parent_dir(db_path: &str) -> anyhow::Result<()> {
    if db_path == ":memory:" {
        return Ok(());
    }
    match Path::new(db_path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::ensure_parent_dir;

    #[test]
    fn creates_missing_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/.wsd/discovery.db");
        ensure_parent_dir(db.to_str().unwrap()).unwrap();
        assert!(dir.path().join("nested/.wsd").is_dir());
    }

    #[test]
    fn in_memory_and_bare_names_need_no_directory() {
        ensure_parent_dir(":memory:").unwrap();
        ensure_parent_dir("discovery.db").unwrap();
    }
}
