use std::fs;
use std::path::Path;

use cg_core::Transform;
use cg_layout::{DropOutcome, DropResolution, Point, SessionConfig, geometry};
use colored::Colorize;

pub fn run(
    file: &Path,
    entity: &str,
    to: Point,
    config: Option<&Path>,
    dry_run: bool,
) -> Result<(), String> {
    let config = match config {
        Some(path) => {
            let body = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            SessionConfig::from_json(&body).map_err(|e| e.to_string())?
        }
        None => SessionConfig::default(),
    };

    let mut session = super::load_session(file, config)?;
    let id = super::find_entity(session.store(), entity)?;
    let start = session
        .store()
        .get_component::<Transform>(id)
        .map(geometry::center)
        .ok_or_else(|| format!("entity {id} has no transform"))?;

    if !session.press(id, start) {
        return Err(format!("entity {id} cannot be dragged"));
    }
    session.drag_to(to);

    let resolution = match session.release() {
        DropOutcome::Placed { resolution, .. } => resolution,
        DropOutcome::Click { .. } => {
            println!("  {} already at {to}", id.to_string().bold());
            return Ok(());
        }
        other => return Err(format!("drag did not complete: {other:?}")),
    };

    print_resolution(&id.to_string(), &resolution);

    if dry_run {
        println!("  {}", "(dry run, not saved)".dimmed());
        return Ok(());
    }
    super::save_session(file, &mut session)
}

fn print_resolution(id: &str, resolution: &DropResolution) {
    match resolution {
        DropResolution::Free { position } => {
            println!("  {} {} placed freely at {position}", "free".cyan(), id.bold());
        }
        DropResolution::Snap { slot, position } => {
            println!(
                "  {} {} snapped into slot {slot} at {position}",
                "snap".green(),
                id.bold()
            );
        }
        DropResolution::Swap {
            slot,
            position,
            occupant,
            occupant_position,
        } => {
            println!(
                "  {} {} snapped into slot {slot} at {position}",
                "swap".yellow(),
                id.bold()
            );
            println!("       {occupant} moved to {occupant_position}");
        }
    }
}
