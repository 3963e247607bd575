//! Reading and writing plan JSON files.

use std::path::Path;

use anyhow::{Context, Result};

use atelier_core::model::CookingPlan;

/// Load a plan file and check it is structurally sound.
pub fn load_plan(path: &Path) -> Result<CookingPlan> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file {}", path.display()))?;
    let plan: CookingPlan = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid plan file", path.display()))?;
    plan.validate()
        .with_context(|| format!("plan in {} failed validation", path.display()))?;
    Ok(plan)
}

/// Write a plan as pretty-printed JSON.
pub fn save_plan(path: &Path, plan: &CookingPlan) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(plan).context("failed to serialize plan")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write plan file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::synthesis::mock_plan;

    #[test]
    fn save_then_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("plan.json");
        save_plan(&path, &mock_plan()).unwrap();
        assert_eq!(load_plan(&path).unwrap(), mock_plan());
    }

    #[test]
    fn load_rejects_short_week() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plan.json");
        let mut plan = mock_plan();
        plan.days.truncate(3);
        std::fs::write(&path, serde_json::to_string(&plan).unwrap()).unwrap();
        let err = load_plan(&path).unwrap_err();
        assert!(format!("{err:#}").contains("exactly 7 days"), "{err:#}");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load_plan(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read plan file"));
    }
}
