use std::fs;
use std::path::Path;

use cg_core::{Interaction, LayoutConfig, Meta, Store, Transform, Visual};

const SIZE: f64 = 80.0;
const GAP: f64 = 40.0;
const MARGIN: f64 = 40.0;

pub fn run(file: &Path, slots: u32, items: u32, force: bool) -> Result<(), String> {
    if file.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            file.display()
        ));
    }

    let store = demo_board(slots, items);
    let payload = store
        .serialize()
        .map_err(|e| format!("cannot serialize board: {e}"))?;
    fs::write(file, payload).map_err(|e| format!("cannot write {}: {e}", file.display()))?;

    println!(
        "  Created board {} with {slots} slot{} and {items} card{}",
        file.display(),
        if slots == 1 { "" } else { "s" },
        if items == 1 { "" } else { "s" },
    );
    Ok(())
}

/// A row of slots with cards sitting in the first ones. Cards beyond the
/// slot count go in a second row below.
fn demo_board(slots: u32, items: u32) -> Store {
    let mut store = Store::new();
    let column_x = |i: u32| MARGIN + f64::from(i) * (SIZE + GAP);

    store.batch(|store| {
        for i in 0..slots {
            let id = store.create_entity(None);
            store.add_component(id, Transform::new(column_x(i), MARGIN, SIZE, SIZE));
            store.add_component(id, LayoutConfig::slot(i));
            store.add_component(id, Interaction::fixed());
            store.add_component(id, Visual::filled("#e0e0e0"));
            store.add_component(id, Meta::new(format!("slot-{}", i + 1)));
        }

        for i in 0..items {
            let (x, y) = if i < slots {
                (column_x(i), MARGIN)
            } else {
                (column_x(i - slots), MARGIN + 2.0 * (SIZE + GAP))
            };
            let id = store.create_entity(None);
            let mut transform = Transform::new(x, y, SIZE, SIZE);
            transform.z_index = 1;
            store.add_component(id, transform);
            store.add_component(id, Interaction::default());
            store.add_component(id, Visual::filled("#ffcc00"));
            store.add_component(id, Meta::new(format!("card-{}", i + 1)));
        }
    });

    store
}
