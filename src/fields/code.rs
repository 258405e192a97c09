//! Field code parsing.
//!
//! A field code is the instruction text between a field's start and separator,
//! e.g. ` DATE \@ "MMMM d, yyyy" ` or ` QUOTE "Real value" \* Upper `. It is a
//! field name followed by positional arguments and backslash switches.
use super::types::FieldType;
use smallvec::SmallVec;

/// A backslash switch such as `\@ "HH:mm"` or `\h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSwitch {
    /// Switch name without the backslash (`@`, `*`, `h`, ...)
    pub name: String,
    pub argument: Option<String>,
}

/// Parsed field code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCode {
    field_type: FieldType,
    name: String,
    arguments: SmallVec<[String; 2]>,
    switches: SmallVec<[FieldSwitch; 4]>,
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Switch(String),
}

/// Switches that always consume the following token.
const VALUE_SWITCHES: [&str; 3] = ["@", "*", "#"];

impl FieldCode {
    /// Parse a field code. Parsing never fails; unrecognised names yield
    /// [`FieldType::Unknown`].
    pub fn parse(code: &str) -> Self {
        let mut tokens = tokenize(code).into_iter().peekable();

        let name = match tokens.next() {
            Some(Token::Word(word)) | Some(Token::Quoted(word)) => word,
            Some(Token::Switch(_)) | None => String::new(),
        };

        let mut arguments = SmallVec::new();
        let mut switches = SmallVec::new();
        while let Some(token) = tokens.next() {
            match token {
                Token::Word(word) | Token::Quoted(word) => arguments.push(word),
                Token::Switch(switch_name) => {
                    let takes_value = VALUE_SWITCHES.contains(&switch_name.as_str());
                    let argument = match tokens.peek() {
                        Some(Token::Quoted(_)) => match tokens.next() {
                            Some(Token::Quoted(value)) => Some(value),
                            _ => None,
                        },
                        Some(Token::Word(_)) if takes_value => match tokens.next() {
                            Some(Token::Word(value)) => Some(value),
                            _ => None,
                        },
                        _ => None,
                    };
                    switches.push(FieldSwitch {
                        name: switch_name,
                        argument,
                    });
                },
            }
        }

        Self {
            field_type: FieldType::from_name(&name),
            name,
            arguments,
            switches,
        }
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Field name as written in the code.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    #[inline]
    pub fn switches(&self) -> &[FieldSwitch] {
        &self.switches
    }

    /// Find a switch by name (without the backslash).
    pub fn switch(&self, name: &str) -> Option<&FieldSwitch> {
        self.switches.iter().find(|s| s.name == name)
    }

    /// Date-time picture from the `\@` switch.
    pub fn date_picture(&self) -> Option<&str> {
        self.switch("@").and_then(|s| s.argument.as_deref())
    }

    /// General formatting from the `\*` switch (`Upper`, `Lower`, ...).
    pub fn general_format(&self) -> Option<&str> {
        self.switch("*").and_then(|s| s.argument.as_deref())
    }
}

fn tokenize(code: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = code.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            },
            '"' => {
                chars.next();
                let mut value = String::new();
                while let Some(next) = chars.next() {
                    match next {
                        '"' => break,
                        '\\' if matches!(chars.peek(), Some('"') | Some('\\')) => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        },
                        _ => value.push(next),
                    }
                }
                tokens.push(Token::Quoted(value));
            },
            '\\' => {
                chars.next();
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || next == '"' {
                        break;
                    }
                    name.push(next);
                    chars.next();
                    // Symbol switches are a single character: `\@"HH"`, `\*Upper`
                    if name.len() == 1 && !next.is_alphanumeric() {
                        break;
                    }
                }
                tokens.push(Token::Switch(name));
            },
            _ => {
                let mut word = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() || next == '"' || next == '\\' {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            },
        }
    }

    tokens
}
