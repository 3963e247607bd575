use std::path::{Path, PathBuf};

use anyhow::Context;

use atelier_core::calendar::{DtEnd, export_filename, generate_ics};

use crate::plan_io::load_plan;

/// Export a saved plan's schedule as an `.ics` file.
///
/// Writes to `output`, or to `atelier-plan-<id>.ics` in the current
/// directory. Returns the path written.
pub fn run_export_ics(
    file: &Path,
    output: Option<&Path>,
    day: Option<u32>,
    same_start_end: bool,
) -> anyhow::Result<PathBuf> {
    let plan = load_plan(file)?;

    let events = match day {
        Some(n) => plan
            .day(n)
            .with_context(|| format!("day {n} is not in this plan"))?
            .schedule
            .clone(),
        None => plan.all_events(),
    };

    let end = if same_start_end {
        DtEnd::SameAsStart
    } else {
        DtEnd::ApplyDuration
    };
    let ics = generate_ics(&events, end).context("cannot build calendar from plan schedule")?;

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(export_filename(&plan.id)));
    std::fs::write(&path, ics)
        .with_context(|| format!("cannot write calendar file: {}", path.display()))?;

    println!("Exported {} events to {}", events.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan_io::save_plan;
    use atelier_core::synthesis::mock_plan;

    #[test]
    fn writes_calendar_next_to_requested_path() {
        let tmp = tempfile::TempDir::new().unwrap();
        let plan_path = tmp.path().join("plan.json");
        save_plan(&plan_path, &mock_plan()).unwrap();

        let out = tmp.path().join("week.ics");
        let written = run_export_ics(&plan_path, Some(&out), None, false).unwrap();
        assert_eq!(written, out);
        let ics = std::fs::read_to_string(&out).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 14);
        assert!(ics.contains("DTEND:20260117T074000"));
    }

    #[test]
    fn single_day_and_same_start_end() {
        let tmp = tempfile::TempDir::new().unwrap();
        let plan_path = tmp.path().join("plan.json");
        save_plan(&plan_path, &mock_plan()).unwrap();

        let out = tmp.path().join("day2.ics");
        run_export_ics(&plan_path, Some(&out), Some(2), true).unwrap();
        let ics = std::fs::read_to_string(&out).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert!(ics.contains("DTSTART:20260118T073000\r\nDTEND:20260118T073000"));
    }

    #[test]
    fn unknown_day_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let plan_path = tmp.path().join("plan.json");
        save_plan(&plan_path, &mock_plan()).unwrap();
        let err = run_export_ics(&plan_path, Some(&tmp.path().join("x.ics")), Some(9), false)
            .unwrap_err();
        assert!(err.to_string().contains("day 9"));
    }
}
