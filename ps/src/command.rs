//! Command-line splitting
//!
//! Commands are executed directly rather than through `sh -c` so that a
//! missing executable surfaces as a spawn failure instead of exit code 127.

use tracing::debug;

use crate::SupervisorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    None,
    Single,
    Double,
}

/// Split a command string into program and arguments
///
/// Words are separated by unquoted whitespace. Single quotes preserve their
/// contents literally, double quotes allow `\"` and `\\` escapes, and a
/// backslash outside quotes escapes the next character.
pub fn split_command(command: &str) -> Result<Vec<String>, SupervisorError> {
    debug!(%command, "split_command: called");
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => current.push('\\'),
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    match quote {
        Quote::Single => {
            return Err(SupervisorError::UnbalancedQuote {
                quote: '\'',
                command: command.to_string(),
            });
        }
        Quote::Double => {
            return Err(SupervisorError::UnbalancedQuote {
                quote: '"',
                command: command.to_string(),
            });
        }
        Quote::None => {}
    }

    if in_word {
        words.push(current);
    }

    if words.is_empty() {
        debug!("split_command: no words found");
        return Err(SupervisorError::EmptyCommand);
    }

    debug!(count = words.len(), "split_command: returning words");
    Ok(words)
}
