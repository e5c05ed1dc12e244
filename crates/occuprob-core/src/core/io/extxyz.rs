use super::isomers::{AtomRecord, IsomerRecord};
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtXyzError {
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: ExtXyzParseErrorKind,
    },
    #[error("Frame {frame} is missing the required '{key}' property")]
    MissingProperty { frame: usize, key: &'static str },
    #[error("Frame {frame} has an invalid value for '{key}': '{value}'")]
    InvalidProperty {
        frame: usize,
        key: &'static str,
        value: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtXyzParseErrorKind {
    #[error("Expected an atom count, found '{0}'")]
    InvalidAtomCount(String),
    #[error("File ends inside a frame")]
    UnexpectedEnd,
    #[error("Unterminated '{0}' in comment line")]
    UnterminatedValue(char),
    #[error("Properties must declare 'species' and a three-column 'pos' ({0})")]
    InvalidColumns(String),
    #[error("Atom line has {found} columns, expected at least {expected}")]
    MissingColumns { expected: usize, found: usize },
    #[error("Invalid float format for coordinate (value: '{0}')")]
    InvalidFloat(String),
}

/// Column layout of the atom lines of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AtomColumns {
    species: usize,
    position: usize,
}

impl Default for AtomColumns {
    fn default() -> Self {
        Self {
            species: 0,
            position: 1,
        }
    }
}

impl AtomColumns {
    /// Reads a `Properties=name:type:count:...` declaration.
    fn from_properties(declaration: &str) -> Option<Self> {
        let fields: Vec<&str> = declaration.split(':').collect();
        if fields.len() % 3 != 0 {
            return None;
        }
        let mut offset = 0;
        let (mut species, mut position) = (None, None);
        for property in fields.chunks(3) {
            let count: usize = property[2].parse().ok()?;
            match (property[0], count) {
                ("species", 1) => species = Some(offset),
                ("pos", 3) => position = Some(offset),
                _ => {}
            }
            offset += count;
        }
        Some(Self {
            species: species?,
            position: position?,
        })
    }

    fn width(&self) -> usize {
        self.species.max(self.position + 2) + 1
    }

    fn parse_atom(&self, line: &str, line_num: usize) -> Result<AtomRecord, ExtXyzError> {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < self.width() {
            return Err(ExtXyzError::Parse {
                line: line_num,
                kind: ExtXyzParseErrorKind::MissingColumns {
                    expected: self.width(),
                    found: columns.len(),
                },
            });
        }
        let mut position = [0.0; 3];
        for (axis, value) in position.iter_mut().enumerate() {
            let text = columns[self.position + axis];
            *value = text.parse().map_err(|_| ExtXyzError::Parse {
                line: line_num,
                kind: ExtXyzParseErrorKind::InvalidFloat(text.to_string()),
            })?;
        }
        Ok(AtomRecord {
            element: columns[self.species].to_string(),
            position,
        })
    }
}

/// Reads every frame of an extended XYZ document as an isomer record.
///
/// Each frame is an atom count, a comment line of `key=value` pairs and one
/// line per atom. `energy` (eV) is required; `multiplicity`, `frequencies`
/// (THz, whitespace- or comma-separated), `name` and `symmetry_order` are
/// optional. Moments of inertia are always derived from the atoms.
pub fn read_records(content: &str) -> Result<Vec<IsomerRecord>, ExtXyzError> {
    let end_line = content.lines().count() + 1;
    let unexpected_end = ExtXyzError::Parse {
        line: end_line,
        kind: ExtXyzParseErrorKind::UnexpectedEnd,
    };

    let mut lines = content.lines().enumerate().map(|(i, l)| (i + 1, l));
    let mut records = Vec::new();

    while let Some((line_num, line)) = lines.next() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let count: usize = trimmed.parse().map_err(|_| ExtXyzError::Parse {
            line: line_num,
            kind: ExtXyzParseErrorKind::InvalidAtomCount(trimmed.to_string()),
        })?;

        let (comment_num, comment) = lines.next().ok_or_else(|| unexpected_end.clone())?;
        let info = parse_comment(comment, comment_num)?;
        let columns = match info.get("properties") {
            Some(declaration) => {
                AtomColumns::from_properties(declaration).ok_or_else(|| ExtXyzError::Parse {
                    line: comment_num,
                    kind: ExtXyzParseErrorKind::InvalidColumns(declaration.clone()),
                })?
            }
            None => AtomColumns::default(),
        };

        let mut atoms = Vec::with_capacity(count);
        for _ in 0..count {
            let (atom_num, atom_line) = lines.next().ok_or_else(|| unexpected_end.clone())?;
            atoms.push(columns.parse_atom(atom_line, atom_num)?);
        }

        records.push(frame_record(records.len(), &info, atoms)?);
    }
    Ok(records)
}

fn frame_record(
    frame: usize,
    info: &HashMap<String, String>,
    atoms: Vec<AtomRecord>,
) -> Result<IsomerRecord, ExtXyzError> {
    let energy = info
        .get("energy")
        .ok_or(ExtXyzError::MissingProperty {
            frame,
            key: "energy",
        })
        .and_then(|value| parse_property(frame, "energy", value))?;
    let multiplicity = match info.get("multiplicity") {
        Some(value) => parse_property(frame, "multiplicity", value)?,
        None => 1.0,
    };
    let frequencies = match info.get("frequencies") {
        Some(value) => value
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
            .map(|token| parse_property(frame, "frequencies", token))
            .collect::<Result<Vec<f64>, _>>()?,
        None => Vec::new(),
    };
    let symmetry_order = info
        .get("symmetry_order")
        .map(|value| parse_property(frame, "symmetry_order", value))
        .transpose()?;

    Ok(IsomerRecord {
        name: info.get("name").cloned(),
        energy,
        multiplicity,
        frequencies,
        symmetry_order,
        moments: None,
        atoms,
    })
}

fn parse_property<T: FromStr>(
    frame: usize,
    key: &'static str,
    value: &str,
) -> Result<T, ExtXyzError> {
    value.parse().map_err(|_| ExtXyzError::InvalidProperty {
        frame,
        key,
        value: value.to_string(),
    })
}

/// Splits a comment line into lowercase keys and raw values. Values may be
/// quoted with `"…"`, `{…}` or `[…]`; a bare key is a `T` flag.
fn parse_comment(line: &str, line_num: usize) -> Result<HashMap<String, String>, ExtXyzError> {
    let mut info = HashMap::new();
    let mut chars = line.chars().peekable();
    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }
        let key = read_token(&mut chars, line_num, |c| c == '=' || c.is_whitespace())?;
        let value = if chars.next_if_eq(&'=').is_some() {
            read_token(&mut chars, line_num, char::is_whitespace)?
        } else {
            "T".to_string()
        };
        info.insert(key.to_lowercase(), value);
    }
    Ok(info)
}

fn read_token(
    chars: &mut Peekable<Chars<'_>>,
    line_num: usize,
    stop: impl Fn(char) -> bool,
) -> Result<String, ExtXyzError> {
    let close = match chars.peek() {
        Some('"') => Some('"'),
        Some('{') => Some('}'),
        Some('[') => Some(']'),
        _ => None,
    };
    let mut token = String::new();
    let Some(close) = close else {
        while let Some(c) = chars.next_if(|&c| !stop(c)) {
            token.push(c);
        }
        return Ok(token);
    };

    chars.next();
    for c in chars.by_ref() {
        if c == close {
            return Ok(token);
        }
        token.push(c);
    }
    Err(ExtXyzError::Parse {
        line: line_num,
        kind: ExtXyzParseErrorKind::UnterminatedValue(close),
    })
}
