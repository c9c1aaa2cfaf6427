// Style DSL: `command(arg: value, ...) | command(...)`
//
//   preset("ocean")
//   | modules(shape: "dots", color: "#1e40af")
//   | finder(square: "extra-rounded", dot: "dot", color: "#111111")
//   | frame(text: "Scan me", pattern: "dashed", color: "#0f172a")
//   | background("#ffffff")

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{eof, map, opt},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, separated_pair, terminated},
    IResult,
};

use super::lexer::{bool_literal, identifier, string_literal, ws};
use crate::error::StyleError;
use crate::presets::get_preset;
use crate::style::{
    FinderDotShape, FinderSquareShape, FramePattern, ModuleShape, Rgb, StyleOverrides,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arg<'a> {
    Named(&'a str, ArgValue),
    Positional(ArgValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call<'a> {
    pub name: &'a str,
    pub args: Vec<Arg<'a>>,
}

/// Result of a style expression: an optional preset to rebase onto, then
/// overrides layered on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleEdit {
    pub preset: Option<String>,
    pub overrides: StyleOverrides,
}

// === Grammar ===

fn arg_value(input: &str) -> IResult<&str, ArgValue> {
    alt((
        map(string_literal, ArgValue::Str),
        map(bool_literal, ArgValue::Bool),
    ))(input)
}

fn arg(input: &str) -> IResult<&str, Arg<'_>> {
    alt((
        map(
            separated_pair(ws(identifier), char(':'), ws(arg_value)),
            |(name, v)| Arg::Named(name, v),
        ),
        map(ws(arg_value), Arg::Positional),
    ))(input)
}

fn call(input: &str) -> IResult<&str, Call<'_>> {
    let (input, name) = ws(identifier)(input)?;
    let (input, args) = delimited(
        ws(char('(')),
        terminated(separated_list0(ws(char(',')), arg), opt(ws(char(',')))),
        ws(char(')')),
    )(input)?;
    Ok((input, Call { name, args }))
}

/// Parse `call | call | ...` up to end of input.
pub fn parse_pipeline(input: &str) -> IResult<&str, Vec<Call<'_>>> {
    let (input, _) = opt(ws(tag("|")))(input)?;
    let (input, calls) = separated_list1(ws(tag("|")), call)(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, calls))
}

// === Semantics ===

fn parse_error(input: &str, err: nom::Err<nom::error::Error<&str>>) -> StyleError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = input.len() - e.input.len();
            let near: String = e.input.chars().take(20).collect();
            StyleError::Parse(format!("unexpected input at offset {}: '{}'", offset, near))
        }
        nom::Err::Incomplete(_) => StyleError::Parse("incomplete style expression".to_string()),
    }
}

fn expect_str<'v>(command: &str, key: &str, value: &'v ArgValue) -> Result<&'v str, StyleError> {
    match value {
        ArgValue::Str(s) => Ok(s),
        other => Err(StyleError::Parse(format!(
            "{}({}) expects a string, got {:?}",
            command, key, other
        ))),
    }
}

fn expect_bool(command: &str, key: &str, value: &ArgValue) -> Result<bool, StyleError> {
    match value {
        ArgValue::Bool(b) => Ok(*b),
        other => Err(StyleError::Parse(format!(
            "{}({}) expects true or false, got {:?}",
            command, key, other
        ))),
    }
}

fn unknown_arg(command: &str, key: &str) -> StyleError {
    StyleError::Parse(format!("unknown argument '{}' for {}()", key, command))
}

/// Positional arguments are only accepted as the single value of a
/// one-argument command; they are keyed as `default_key`.
fn keyed<'a>(
    call: &'a Call<'a>,
    default_key: &'a str,
) -> Result<Vec<(&'a str, &'a ArgValue)>, StyleError> {
    call.args
        .iter()
        .map(|arg| match arg {
            Arg::Named(k, v) => Ok((*k, v)),
            Arg::Positional(v) if call.args.len() == 1 => Ok((default_key, v)),
            Arg::Positional(_) => Err(StyleError::Parse(format!(
                "{}() takes named arguments",
                call.name
            ))),
        })
        .collect()
}

fn apply_call(call: &Call<'_>, edit: &mut StyleEdit) -> Result<(), StyleError> {
    let o = &mut edit.overrides;
    match call.name {
        "preset" => {
            for (key, value) in keyed(call, "name")? {
                match key {
                    "name" => {
                        let name = expect_str(call.name, key, value)?;
                        let preset = get_preset(name)
                            .ok_or_else(|| StyleError::UnknownPreset(name.to_string()))?;
                        edit.preset = Some(preset.name.to_string());
                    }
                    _ => return Err(unknown_arg(call.name, key)),
                }
            }
        }
        "background" => {
            for (key, value) in keyed(call, "color")? {
                match key {
                    "color" => {
                        o.background = Some(expect_str(call.name, key, value)?.parse::<Rgb>()?)
                    }
                    _ => return Err(unknown_arg(call.name, key)),
                }
            }
        }
        "modules" => {
            for (key, value) in keyed(call, "shape")? {
                let s = expect_str(call.name, key, value)?;
                match key {
                    "shape" => o.module.shape = Some(s.parse::<ModuleShape>()?),
                    "color" => o.module.color = Some(s.parse::<Rgb>()?),
                    _ => return Err(unknown_arg(call.name, key)),
                }
            }
        }
        "finder" => {
            for (key, value) in keyed(call, "square")? {
                let s = expect_str(call.name, key, value)?;
                match key {
                    "square" | "square_shape" => {
                        o.finder.square_shape = Some(s.parse::<FinderSquareShape>()?)
                    }
                    "dot" | "dot_shape" => o.finder.dot_shape = Some(s.parse::<FinderDotShape>()?),
                    "square_color" => o.finder.square_color = Some(s.parse::<Rgb>()?),
                    "dot_color" => o.finder.dot_color = Some(s.parse::<Rgb>()?),
                    "color" => {
                        let c = s.parse::<Rgb>()?;
                        o.finder.square_color = Some(c);
                        o.finder.dot_color = Some(c);
                    }
                    _ => return Err(unknown_arg(call.name, key)),
                }
            }
        }
        "frame" => {
            // Mentioning the frame turns it on unless told otherwise.
            o.frame.enabled = Some(true);
            for (key, value) in keyed(call, "text")? {
                match key {
                    "enabled" => o.frame.enabled = Some(expect_bool(call.name, key, value)?),
                    "text" => o.frame.text = Some(expect_str(call.name, key, value)?.to_string()),
                    "font" => o.frame.font = Some(expect_str(call.name, key, value)?.to_string()),
                    "color" | "border_color" => {
                        let s = expect_str(call.name, key, value)?;
                        o.frame.border_color = Some(s.parse::<Rgb>()?);
                    }
                    "text_color" => {
                        let s = expect_str(call.name, key, value)?;
                        o.frame.text_color = Some(s.parse::<Rgb>()?);
                    }
                    "pattern" => {
                        let s = expect_str(call.name, key, value)?;
                        o.frame.pattern = Some(s.parse::<FramePattern>()?);
                    }
                    _ => return Err(unknown_arg(call.name, key)),
                }
            }
        }
        other => return Err(StyleError::Parse(format!("unknown command '{}'", other))),
    }
    Ok(())
}

/// Parse a full style expression. Later commands win over earlier ones.
pub fn parse_style(input: &str) -> Result<StyleEdit, StyleError> {
    let (_, calls) = parse_pipeline(input).map_err(|e| parse_error(input, e))?;
    let mut edit = StyleEdit::default();
    for call in &calls {
        apply_call(call, &mut edit)?;
    }
    Ok(edit)
}
