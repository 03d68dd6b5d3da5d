pub mod check;
pub mod drag;
pub mod list;
pub mod new;
pub mod query;
pub mod set;

use std::fs;
use std::path::Path;

use cg_core::{ComponentKind, EntityId, Store};
use cg_layout::{Session, SessionConfig};

/// Read a snapshot file into a fresh session.
fn load_session(file: &Path, config: SessionConfig) -> Result<Session, String> {
    let payload =
        fs::read_to_string(file).map_err(|e| format!("cannot read {}: {e}", file.display()))?;
    Session::from_snapshot(&payload, config)
        .map_err(|e| format!("cannot load {}: {e}", file.display()))
}

/// Serialize the session back to its file.
fn save_session(file: &Path, session: &mut Session) -> Result<(), String> {
    let payload = session
        .save()
        .map_err(|e| format!("cannot serialize board: {e}"))?;
    fs::write(file, payload).map_err(|e| format!("cannot write {}: {e}", file.display()))
}

/// Resolve a full ID or a unique prefix of its hex form.
fn find_entity(store: &Store, needle: &str) -> Result<EntityId, String> {
    if let Ok(id) = needle.parse::<EntityId>() {
        return if store.contains_entity(id) {
            Ok(id)
        } else {
            Err(format!("no entity {needle}"))
        };
    }

    let prefix = needle.to_lowercase().replace('-', "");
    let matches: Vec<EntityId> = store
        .entities()
        .filter(|id| id.matches_prefix(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(format!("no entity matches '{needle}'")),
        _ => Err(format!(
            "'{needle}' is ambiguous ({} entities match)",
            matches.len()
        )),
    }
}

fn parse_kind(name: &str) -> Result<ComponentKind, String> {
    ComponentKind::parse(name).ok_or_else(|| {
        let known: Vec<&str> = ComponentKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown component kind '{name}' (known: {})", known.join(", "))
    })
}
