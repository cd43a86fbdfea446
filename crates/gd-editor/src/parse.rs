//! Parser for the parameter text a user types next to a command.
//!
//! | kind     | text            | operation                    |
//! |----------|-----------------|------------------------------|
//! | `move`   | `dx,dy`         | `Operation::Move`            |
//! | `rotate` | `degrees`       | `Operation::Rotate`          |
//! | `mirror` | `x`, `y`, `xy`  | `Operation::Mirror`          |
//! | `scale`  | `fx,fy`         | `Operation::Scale`           |
//! | `fill`   | `attribute: v`  | `Operation::Fill`            |
//!
//! Numbers are optionally signed decimals. Blanks around the comma and at
//! either end are ignored. An unknown mirror axis is not an error: it
//! becomes `Mirror(None)`, which leaves positions unchanged.

use crate::commands::Operation;
use gd_core::{Attribute, Axis, Point};
use thiserror::Error;
use winnow::ascii::space0;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected a number in {0:?}")]
    InvalidNumber(String),
    #[error("unexpected input {0:?}")]
    UnexpectedInput(String),
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),
    #[error("unknown attribute {0:?}")]
    UnknownAttribute(String),
}

/// Build an operation from its kind and the user's parameter text.
pub fn parse_operation(kind: &str, text: &str) -> Result<Operation, ParseError> {
    match kind.trim() {
        "move" => parse_pair_text(text).map(|(dx, dy)| Operation::Move { dx, dy }),
        "rotate" => parse_number_text(text).map(|degrees| Operation::Rotate { degrees }),
        "mirror" => {
            let name = text.trim();
            let axis = Axis::from_name(name);
            if axis.is_none() {
                log::warn!("unknown mirror axis {name:?}; mirroring will not move anything");
            }
            Ok(Operation::Mirror(axis))
        }
        "scale" => parse_pair_text(text).map(|(fx, fy)| Operation::Scale { fx, fy }),
        "fill" => parse_fill_text(text),
        other => Err(ParseError::UnknownOperation(other.to_string())),
    }
}

/// Parse a grid cell typed as `x,y`, as used for the reference point.
pub fn parse_point(text: &str) -> Result<Point, ParseError> {
    parse_pair_text(text).map(|(x, y)| Point::new(x, y))
}

fn parse_pair_text(text: &str) -> Result<(f64, f64), ParseError> {
    let mut rest = text;
    let pair = parse_pair
        .parse_next(&mut rest)
        .map_err(|_| ParseError::InvalidNumber(text.trim().to_string()))?;
    expect_end(rest)?;
    Ok(pair)
}

fn parse_number_text(text: &str) -> Result<f64, ParseError> {
    let mut rest = text;
    skip_space(&mut rest);
    let value = parse_number
        .parse_next(&mut rest)
        .map_err(|_| ParseError::InvalidNumber(text.trim().to_string()))?;
    expect_end(rest)?;
    Ok(value)
}

fn parse_fill_text(text: &str) -> Result<Operation, ParseError> {
    let Some((name, value)) = text.split_once(':') else {
        return Err(ParseError::UnexpectedInput(text.trim().to_string()));
    };
    let name = name.trim();
    let attribute =
        Attribute::from_name(name).ok_or_else(|| ParseError::UnknownAttribute(name.to_string()))?;
    Ok(Operation::Fill {
        attribute,
        value: value.trim().to_string(),
    })
}

fn expect_end(rest: &str) -> Result<(), ParseError> {
    let rest = rest.trim();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(ParseError::UnexpectedInput(rest.to_string()))
    }
}

// ─── Token parsers ──────────────────────────────────────────────────────

fn skip_space(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = space0.parse_next(input);
}

fn parse_pair(input: &mut &str) -> ModalResult<(f64, f64)> {
    skip_space(input);
    let x = parse_number(input)?;
    skip_space(input);
    let _ = ','.parse_next(input)?;
    skip_space(input);
    let y = parse_number(input)?;
    skip_space(input);
    Ok((x, y))
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') || input.starts_with('+') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f64>()
        .map_err(|_| ErrMode::Backtrack(ContextError::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn move_pair_with_spaces() {
        assert_eq!(
            parse_operation("move", "  -3 , 4.5 "),
            Ok(Operation::Move { dx: -3.0, dy: 4.5 })
        );
        assert_eq!(
            parse_operation("move", "+1,2"),
            Ok(Operation::Move { dx: 1.0, dy: 2.0 })
        );
    }

    #[test]
    fn rotate_single_number() {
        assert_eq!(
            parse_operation("rotate", "-90"),
            Ok(Operation::Rotate { degrees: -90.0 })
        );
        assert_eq!(
            parse_operation("rotate", "12.5 "),
            Ok(Operation::Rotate { degrees: 12.5 })
        );
    }

    #[test]
    fn mirror_axis_names() {
        assert_eq!(
            parse_operation("mirror", "xy"),
            Ok(Operation::Mirror(Some(Axis::Both)))
        );
        assert_eq!(
            parse_operation("mirror", " y"),
            Ok(Operation::Mirror(Some(Axis::Y)))
        );
        assert_eq!(parse_operation("mirror", "z"), Ok(Operation::Mirror(None)));
    }

    #[test]
    fn scale_accepts_zero_and_negative_factors() {
        assert_eq!(
            parse_operation("scale", "0,-2"),
            Ok(Operation::Scale { fx: 0.0, fy: -2.0 })
        );
    }

    #[test]
    fn fill_attribute_and_value() {
        assert_eq!(
            parse_operation("fill", "symbol color: red"),
            Ok(Operation::Fill {
                attribute: Attribute::SymbolColor,
                value: "red".to_string()
            })
        );
        assert_eq!(
            parse_operation("fill", "colour: red"),
            Err(ParseError::UnknownAttribute("colour".to_string()))
        );
        assert_eq!(
            parse_operation("fill", "red"),
            Err(ParseError::UnexpectedInput("red".to_string()))
        );
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(
            parse_operation("move", "1;2"),
            Err(ParseError::InvalidNumber("1;2".to_string()))
        );
        assert_eq!(
            parse_operation("rotate", "ninety"),
            Err(ParseError::InvalidNumber("ninety".to_string()))
        );
        assert_eq!(
            parse_operation("scale", "2,2,2"),
            Err(ParseError::UnexpectedInput(",2".to_string()))
        );
        assert_eq!(
            parse_operation("rotate", "45 deg"),
            Err(ParseError::UnexpectedInput("deg".to_string()))
        );
    }

    #[test]
    fn unknown_kind() {
        assert_eq!(
            parse_operation("shear", "1,1"),
            Err(ParseError::UnknownOperation("shear".to_string()))
        );
    }

    #[test]
    fn reference_point() {
        assert_eq!(parse_point("8, 8"), Ok(Point::new(8.0, 8.0)));
        assert!(parse_point("8").is_err());
    }
}
