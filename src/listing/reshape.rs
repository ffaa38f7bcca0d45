// src/listing/reshape.rs
use crate::listing::normalize::Token;
use crate::models::layout::{Layout, PlayerColumns};
use crate::models::server::ServerRecord;
use crate::utils::ListingError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    Players { current: u32, max: u32 },
    Count(u32),
    Flag(bool),
}

impl Field {
    fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Players { current, max } => format!("{}/{}", current, max),
            Self::Count(n) => n.to_string(),
            Self::Flag(true) => "True".to_string(),
            Self::Flag(false) => "False".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub fields: Vec<Field>,
}

impl Row {
    /// The cells this row was built from.
    pub fn tokens(&self) -> Vec<String> {
        self.fields.iter().map(Field::render).collect()
    }

    fn text(&self, index: usize) -> String {
        match &self.fields[index] {
            Field::Text(s) => s.clone(),
            other => other.render(),
        }
    }
}

/// Splits `tokens` into rows of `layout.width()` cells and types the player
/// and password cells. Fails without output on the first bad cell.
pub fn reshape(tokens: &[Token], layout: Layout) -> Result<Vec<Row>, ListingError> {
    let width = layout.width();
    if tokens.len() % width != 0 {
        return Err(ListingError::Layout {
            tokens: tokens.len(),
            width,
        });
    }

    let columns = layout.columns();
    tokens
        .chunks(width)
        .map(|cells| {
            let fields = cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let value = cell.as_str();
                    if i == columns.password {
                        return parse_flag(value).map(Field::Flag);
                    }
                    match columns.players {
                        PlayerColumns::Combined(at) if i == at => parse_players(value),
                        PlayerColumns::Split { current, max } if i == current || i == max => {
                            parse_count(value).map(Field::Count)
                        }
                        _ => Ok(Field::Text(value.to_string())),
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Row { fields })
        })
        .collect()
}

/// Rows must come from `reshape` with the same layout; a row typed for another
/// layout is rejected.
pub fn records_from_rows(rows: &[Row], layout: Layout) -> Result<Vec<ServerRecord>, ListingError> {
    let columns = layout.columns();
    rows.iter()
        .map(|row| {
            if row.fields.len() != layout.width() {
                return Err(ListingError::Layout {
                    tokens: row.fields.len(),
                    width: layout.width(),
                });
            }
            let (current, max) = match columns.players {
                PlayerColumns::Combined(at) => match &row.fields[at] {
                    Field::Players { current, max } => (*current, *max),
                    other => return Err(mistyped("players", other)),
                },
                PlayerColumns::Split { current, max } => {
                    (count_at(row, current)?, count_at(row, max)?)
                }
            };
            let password = match &row.fields[columns.password] {
                Field::Flag(flag) => *flag,
                other => return Err(mistyped("password", other)),
            };
            Ok(ServerRecord::new(
                current,
                max,
                password,
                row.text(columns.host),
                row.text(columns.name),
                row.text(columns.terrain),
            ))
        })
        .collect()
}

fn count_at(row: &Row, index: usize) -> Result<u32, ListingError> {
    match &row.fields[index] {
        Field::Count(n) => Ok(*n),
        other => Err(mistyped("player count", other)),
    }
}

fn mistyped(field: &'static str, found: &Field) -> ListingError {
    ListingError::FieldType {
        field,
        value: found.render(),
    }
}

/// Counts are plain decimal with no sign, padding or leading zeros, so a
/// typed cell renders back to the exact source text.
fn parse_decimal(value: &str) -> Option<u32> {
    let canonical = !value.is_empty()
        && value.bytes().all(|b| b.is_ascii_digit())
        && (value == "0" || !value.starts_with('0'));
    if canonical {
        value.parse().ok()
    } else {
        None
    }
}

fn parse_players(value: &str) -> Result<Field, ListingError> {
    let invalid = || ListingError::FieldType {
        field: "players",
        value: value.to_string(),
    };
    let (current, max) = value.split_once('/').ok_or_else(invalid)?;
    Ok(Field::Players {
        current: parse_decimal(current).ok_or_else(invalid)?,
        max: parse_decimal(max).ok_or_else(invalid)?,
    })
}

fn parse_count(value: &str) -> Result<u32, ListingError> {
    parse_decimal(value).ok_or_else(|| ListingError::FieldType {
        field: "player count",
        value: value.to_string(),
    })
}

fn parse_flag(value: &str) -> Result<bool, ListingError> {
    match value {
        "True" => Ok(true),
        "False" => Ok(false),
        _ => Err(ListingError::FieldType {
            field: "password",
            value: value.to_string(),
        }),
    }
}
