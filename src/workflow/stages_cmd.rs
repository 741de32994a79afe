//! The `xvrun stages` command: list the stage table.

use anyhow::Result;

use crate::stage::STAGES;

pub fn run_stage_list() -> Result<()> {
    println!("stages run in order; --stage N skips everything before N\n");
    for stage in STAGES {
        println!("{:>2}  {:<14} {}", stage.index(), stage.name(), stage.summary());
        println!("{:>2}  {:<14} re-run: {}", "", "", stage.resume_note());
    }
    Ok(())
}
