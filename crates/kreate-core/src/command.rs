use serde::{Deserialize, Serialize};

/// A positional argument of a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandArg {
    pub name: String,
    pub label: String,
    pub description: String,
    pub required: bool,
}

/// Default value of a typed option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionDefault {
    Boolean(bool),
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOption {
    pub flag: String,
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub option_type: String,
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_flag: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<OptionDefault>,
}

/// A command or command group driving the creation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<CommandArg>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<CommandOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<CommandDetails>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli: Option<Vec<String>>,
}

/// Root of the static command tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandTree {
    pub commands: Vec<CommandDetails>,
}
