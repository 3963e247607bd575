//! `atelier show`: print a saved plan.

use std::path::Path;

use anyhow::{Result, bail};

use crate::plan_io::load_plan;
use crate::render::{render_day, render_grocery, render_overview};

/// Run the show command.
///
/// With `day` prints that day's meals and schedule; with `grocery` prints the
/// grouped shopping list; otherwise prints the overview.
pub fn run_show(file: &Path, day: Option<u32>, grocery: bool) -> Result<()> {
    let plan = load_plan(file)?;

    if let Some(number) = day {
        let Some(day_plan) = plan.day(number) else {
            bail!("day {number} is not in this plan (expected 1-{})", plan.days.len());
        };
        print!("{}", render_day(day_plan));
    } else if grocery {
        print!("{}", render_grocery(&plan));
    } else {
        print!("{}", render_overview(&plan));
    }

    Ok(())
}
