//! DOT-subset reader.
//!
//! Accepts `digraph <id> { ... }` with node statements (`B1 [k="v", ...]`)
//! and edge statements (`B1 -> B2 [k="v", ...]`). The attribute
//! `label="entry"` designates the entry node and is lifted into the entry
//! flag rather than stored; everything else is preserved verbatim for
//! round-trip rendering.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::{opt, recognize};
use nom::multi::{many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

use crate::error::CfgError;
use crate::graph::{Cfg, Edge};

enum RawStmt<'a> {
    Node {
        name: &'a str,
        attrs: Vec<(&'a str, &'a str)>,
    },
    Edge {
        from: &'a str,
        to: &'a str,
        attrs: Vec<(&'a str, &'a str)>,
    },
}

fn bare(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '.')(input)
}

/// A quoted identifier, quotes included: quoting is part of node identity.
fn quoted_raw(input: &str) -> IResult<&str, &str> {
    recognize(delimited(char('"'), take_while(|c| c != '"'), char('"')))(input)
}

fn ident(input: &str) -> IResult<&str, &str> {
    alt((quoted_raw, bare))(input)
}

/// An attribute value; quotes are stripped here and re-applied on render.
fn value(input: &str) -> IResult<&str, &str> {
    alt((delimited(char('"'), take_while(|c| c != '"'), char('"')), bare))(input)
}

fn kv(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = bare(input)?;
    let (input, _) = tuple((multispace0, char('='), multispace0))(input)?;
    let (input, val) = value(input)?;
    Ok((input, (key, val)))
}

fn attr_list(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    delimited(
        pair(char('['), multispace0),
        separated_list0(tuple((multispace0, char(','), multispace0)), kv),
        pair(multispace0, char(']')),
    )(input)
}

fn stmt(input: &str) -> IResult<&str, RawStmt<'_>> {
    let (input, from) = ident(input)?;
    let (input, to) = opt(preceded(
        tuple((multispace0, tag("->"), multispace0)),
        ident,
    ))(input)?;
    let (input, attrs) = opt(preceded(multispace0, attr_list))(input)?;
    let (input, _) = opt(preceded(multispace0, char(';')))(input)?;
    let attrs = attrs.unwrap_or_default();
    let stmt = match to {
        Some(to) => RawStmt::Edge { from, to, attrs },
        None => RawStmt::Node { name: from, attrs },
    };
    Ok((input, stmt))
}

fn graph_file(input: &str) -> IResult<&str, (&str, Vec<RawStmt<'_>>)> {
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("digraph")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, id) = ident(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('{')(input)?;
    let (input, stmts) = many0(preceded(multispace0, stmt))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('}')(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, (id, stmts)))
}

fn snippet(s: &str) -> String {
    s.chars().take(24).collect()
}

/// Parse a control flow graph from its DOT text.
pub fn parse(input: &str) -> Result<Cfg, CfgError> {
    let (id, stmts) = match graph_file(input) {
        Ok(("", parsed)) => parsed,
        Ok((rest, _)) => {
            return Err(CfgError::Parse(format!(
                "trailing input near {:?}",
                snippet(rest)
            )))
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            return Err(CfgError::Parse(format!(
                "unexpected input near {:?}",
                snippet(e.input)
            )))
        }
        Err(nom::Err::Incomplete(_)) => {
            return Err(CfgError::Parse("incomplete input".to_owned()))
        }
    };

    let mut g = Cfg::new(id);
    for s in stmts {
        match s {
            RawStmt::Node { name, attrs } => {
                let ix = g.ensure_node(name);
                for (k, v) in attrs {
                    if k == "label" && v == "entry" {
                        g.set_entry(ix)?;
                    } else {
                        g.node_mut(ix).set_attr(k, v);
                    }
                }
            }
            RawStmt::Edge { from, to, attrs } => {
                let mut edge = Edge::new();
                for (k, v) in attrs {
                    edge.set_attr(k, v);
                }
                g.set_edge_named(from, to, edge);
            }
        }
    }

    g.entry()?;
    for ix in g.nodes_by_name() {
        let node = g.node(ix);
        if node.is_entry() {
            if let Some(label) = node.attr("label") {
                if label != "entry" {
                    return Err(CfgError::EntryLabelClash {
                        node: node.name().to_owned(),
                        got: label.to_owned(),
                    });
                }
            }
        }
    }
    Ok(g)
}
