//! The static tree of `kubectl` creation commands offered by the form.

use std::sync::LazyLock;

use kreate_core::{CommandDetails, CommandTree};

use crate::error::{Error, Result};

static COMMANDS: LazyLock<Result<CommandTree, serde_json::Error>> =
    LazyLock::new(|| serde_json::from_str(include_str!("../assets/commands.json")));

/// The embedded command tree.
pub fn command_tree() -> Result<&'static CommandTree> {
    COMMANDS
        .as_ref()
        .map_err(|err| Error::CommandTree(err.to_string()))
}

fn names(commands: &[CommandDetails]) -> Vec<String> {
    commands.iter().map(|cmd| cmd.name.clone()).collect()
}

/// Names of the top level commands, or of the subcommands of `parent`.
pub fn command_names(tree: &CommandTree, parent: Option<&str>) -> Result<Vec<String>> {
    let Some(parent) = parent.filter(|parent| !parent.is_empty()) else {
        return Ok(names(&tree.commands));
    };
    let command = tree
        .commands
        .iter()
        .find(|cmd| cmd.name == parent)
        .ok_or_else(|| Error::ParentCommandNotFound(parent.to_string()))?;
    Ok(command.commands.as_deref().map(names).unwrap_or_default())
}

/// Follow `path` through the tree down to the first command without subcommands.
pub fn command_details<'a>(tree: &'a CommandTree, path: &[String]) -> Result<&'a CommandDetails> {
    let not_found = || Error::CommandNotFound {
        path: path.to_vec(),
    };
    let mut candidates = tree.commands.as_slice();
    for name in path {
        let command = candidates
            .iter()
            .find(|cmd| &cmd.name == name)
            .ok_or_else(not_found)?;
        match &command.commands {
            None => return Ok(command),
            Some(children) => candidates = children,
        }
    }
    Err(not_found())
}
