use std::path::Path;

use cg_core::ComponentKind;
use cg_layout::SessionConfig;

pub fn run(file: &Path, kinds: &[String]) -> Result<(), String> {
    let kinds = kinds
        .iter()
        .map(|name| super::parse_kind(name))
        .collect::<Result<Vec<ComponentKind>, String>>()?;

    let session = super::load_session(file, SessionConfig::default())?;
    let result = session.store().query(&kinds);

    for id in result.iter() {
        println!("{}", id.0);
    }
    eprintln!("  {} match{}", result.len(), if result.len() == 1 { "" } else { "es" });

    Ok(())
}
