//! Parsing of terminal input lines.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("usage: activate <module> [phase]")]
    MissingModule,

    #[error("action payload is not valid JSON")]
    InvalidPayload(#[source] serde_json::Error),
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Help,
    Modules,
    Activate {
        module: String,
        phase: Option<String>,
    },
    Screen,
    State,
    Deactivate,
    Quit,
    /// Anything else: an action for the active module.
    Dispatch {
        action: String,
        payload: Option<Value>,
    },
}

impl ReplCommand {
    /// Parses `line`. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head {
            "help" | "?" => Self::Help,
            "modules" => Self::Modules,
            "activate" => {
                let mut args = rest.split_whitespace();
                let module = args.next().ok_or(ParseError::MissingModule)?;
                Self::Activate {
                    module: module.to_owned(),
                    phase: args.next().map(str::to_owned),
                }
            }
            "screen" => Self::Screen,
            "state" => Self::State,
            "deactivate" => Self::Deactivate,
            "quit" | "exit" => Self::Quit,
            action => Self::Dispatch {
                action: action.to_owned(),
                payload: if rest.is_empty() {
                    None
                } else {
                    Some(serde_json::from_str(rest).map_err(ParseError::InvalidPayload)?)
                },
            },
        };

        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_commands() {
        assert_eq!(ReplCommand::parse("  modules ").unwrap(), Some(ReplCommand::Modules));
        assert_eq!(ReplCommand::parse("quit").unwrap(), Some(ReplCommand::Quit));
        assert_eq!(ReplCommand::parse("").unwrap(), None);
        assert_eq!(
            ReplCommand::parse("activate blamegame setup").unwrap(),
            Some(ReplCommand::Activate {
                module: "blamegame".into(),
                phase: Some("setup".into()),
            })
        );
        assert!(matches!(
            ReplCommand::parse("activate"),
            Err(ParseError::MissingModule)
        ));
    }

    #[test]
    fn other_words_are_actions_with_optional_json() {
        assert_eq!(
            ReplCommand::parse(r#"add_player {"name": "Ana"}"#).unwrap(),
            Some(ReplCommand::Dispatch {
                action: "add_player".into(),
                payload: Some(json!({ "name": "Ana" })),
            })
        );
        assert_eq!(
            ReplCommand::parse("next").unwrap(),
            Some(ReplCommand::Dispatch {
                action: "next".into(),
                payload: None,
            })
        );
        assert!(matches!(
            ReplCommand::parse("add_player {name"),
            Err(ParseError::InvalidPayload(_))
        ));
    }
}
