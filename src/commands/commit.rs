use crate::commands::open_workbench;
use crate::core::{
    error::Result,
    output::{pluralize, print_success},
};

pub fn execute_commit(message: &str) -> Result<()> {
    let workbench = open_workbench()?;
    let staged = workbench.get_status_snapshot().staged.len();

    let id = workbench.commit(message)?;
    let short_id: String = id.to_string().chars().take(7).collect();
    print_success(&format!(
        "Committed {short_id} ({}).",
        pluralize(staged, "staged change")
    ));
    Ok(())
}
