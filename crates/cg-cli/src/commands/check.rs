use std::path::Path;

use cg_core::ComponentKind;
use cg_layout::SessionConfig;
use colored::Colorize;

pub fn run(file: &Path) -> Result<(), String> {
    let session = super::load_session(file, SessionConfig::default())?;
    let store = session.store();

    store
        .check_invariants()
        .map_err(|e| format!("invariant check failed: {e}"))?;

    let components: usize = ComponentKind::ALL
        .into_iter()
        .filter_map(|kind| store.index(kind))
        .map(|index| index.len())
        .sum();

    println!("  {} '{}'", "All checks passed for".green(), file.display());
    println!(
        "  {} entities, {} components, {} slots",
        store.entity_count(),
        components,
        cg_layout::slots(store).len()
    );

    Ok(())
}
