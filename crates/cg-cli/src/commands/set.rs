use std::fs;
use std::path::Path;

use cg_history::Intake;
use cg_layout::SessionConfig;

pub fn run(file: &Path, request: &Path) -> Result<(), String> {
    let body = fs::read_to_string(request)
        .map_err(|e| format!("cannot read {}: {e}", request.display()))?;
    let intake = Intake::from_json(&body).map_err(|e| e.to_string())?;
    let writes = match &intake {
        Intake::Single(_) => 1,
        Intake::Batch(requests) => requests.len(),
    };

    let mut session = super::load_session(file, SessionConfig::default())?;
    session.submit(intake).map_err(|e| e.to_string())?;
    super::save_session(file, &mut session)?;

    println!(
        "  Applied {writes} write{} to {}",
        if writes == 1 { "" } else { "s" },
        file.display()
    );
    Ok(())
}
