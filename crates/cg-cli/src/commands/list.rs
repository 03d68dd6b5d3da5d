use std::path::Path;

use cg_core::{ComponentKind, EntityId, Interaction, LayoutConfig, Meta, Store, Transform};
use cg_layout::SessionConfig;
use comfy_table::{ContentArrangement, Table};

pub fn run(file: &Path, kind: Option<&str>) -> Result<(), String> {
    let session = super::load_session(file, SessionConfig::default())?;
    let store = session.store();

    let ids: Vec<EntityId> = match kind {
        Some(name) => {
            let kind = super::parse_kind(name)?;
            store.query(&[kind]).iter().copied().collect()
        }
        None => store.entities().collect(),
    };

    if ids.is_empty() {
        println!("  No entities found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Role", "Position", "Size", "Components"]);

    for id in &ids {
        table.add_row(row(store, *id));
    }

    println!("{table}");
    println!();
    println!("  {} entities", ids.len());

    Ok(())
}

fn row(store: &Store, id: EntityId) -> Vec<String> {
    let name = store
        .get_component::<Meta>(id)
        .map_or_else(|| "—".to_string(), |m| m.name.clone());

    let role = if store
        .get_component::<LayoutConfig>(id)
        .is_some_and(LayoutConfig::is_slot)
    {
        "slot"
    } else if store
        .get_component::<Interaction>(id)
        .is_some_and(Interaction::can_drag)
    {
        "movable"
    } else {
        "fixed"
    };

    let (position, size) = match store.get_component::<Transform>(id) {
        Some(t) => (
            format!("{}, {}", t.x, t.y),
            format!("{}×{}", t.width, t.height),
        ),
        None => ("—".to_string(), "—".to_string()),
    };

    let kinds: Vec<&str> = ComponentKind::ALL
        .into_iter()
        .filter(|kind| store.has_component(id, *kind))
        .map(ComponentKind::as_str)
        .collect();

    vec![
        id.to_string(),
        name,
        role.to_string(),
        position,
        size,
        kinds.join(", "),
    ]
}
