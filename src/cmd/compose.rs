use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::domain::composer::TaskComposer;
use crate::domain::submission::RawSubmission;
use crate::domain::task::TaskCommand;
use crate::error::AppResult;

/// Composes the task for a submission without contacting the tracker.
pub fn run(composer: &TaskComposer, input: Option<PathBuf>) -> AppResult<String> {
    let contents = match input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let command = compose_json(composer, &contents)?;
    Ok(serde_json::to_string_pretty(&command)?)
}

fn compose_json(composer: &TaskComposer, contents: &str) -> AppResult<TaskCommand> {
    let raw: RawSubmission = serde_json::from_str(contents)?;
    Ok(composer.compose_raw(raw))
}
