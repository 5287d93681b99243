use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ParseError, ParseErrorKind};
use crate::motion;
use crate::reader::{Line, LineReader};
use crate::skeleton::{Bone, Skeleton};
use crate::types::*;

static RE_JOINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:(ROOT|JOINT))\s+(\S.*)$").expect("valid regex"));
static RE_END_SITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:END\s+SITE)$").expect("valid regex"));
static RE_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^OFFSET(\s+.*)?$").expect("valid regex"));
static RE_CHANNELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CHANNELS\s+(\S+)(.*)$").expect("valid regex"));

/////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Reject motion rows that carry more values than the hierarchy declares channels for.
    /// When off, surplus values are logged and ignored.
    pub strict_trailing_values: bool,
}

/// Parsed first line of a node block.
#[derive(Debug, PartialEq)]
enum Declaration<'a> {
    Root(&'a str),
    Joint(&'a str),
    EndSite,
}

fn parse_declaration<'a>(line: &Line<'a>) -> Result<Declaration<'a>, ParseError> {
    if RE_END_SITE.is_match(line.text) {
        return Ok(Declaration::EndSite);
    }
    let captures = RE_JOINT
        .captures(line.text)
        .ok_or_else(|| line.error(ParseErrorKind::UnknownNodeType))?;
    let name = captures.get(2).map_or("", |m| m.as_str().trim());
    match captures.get(1).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("ROOT") => Ok(Declaration::Root(name)),
        _ => Ok(Declaration::Joint(name)),
    }
}

fn parse_offset(line: &Line) -> Result<Position, ParseError> {
    let invalid = || line.error(ParseErrorKind::InvalidOffset);
    let captures = RE_OFFSET.captures(line.text).ok_or_else(invalid)?;
    let values = captures
        .get(1)
        .map_or("", |m| m.as_str())
        .split_whitespace()
        .map(|s| s.parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()
        .ok_or_else(invalid)?;
    match values.as_slice() {
        &[x, y, z] => Ok(Position::new(x, y, z)),
        _ => Err(invalid()),
    }
}

fn parse_channels(line: &Line) -> Result<Vec<ChannelKind>, ParseError> {
    let captures = RE_CHANNELS
        .captures(line.text)
        .ok_or_else(|| line.error(ParseErrorKind::InvalidChannelSpec))?;
    let declared = captures
        .get(1)
        .and_then(|m| m.as_str().parse::<usize>().ok())
        .ok_or_else(|| line.error(ParseErrorKind::InvalidChannelSpec))?;
    let names: Vec<&str> = captures
        .get(2)
        .map_or("", |m| m.as_str())
        .split_whitespace()
        .collect();
    if names.len() != declared {
        return Err(line.error(ParseErrorKind::InvalidChannelSpec));
    }
    names
        .into_iter()
        .map(|name| {
            ChannelKind::from_name(name).ok_or_else(|| line.error(ParseErrorKind::UnknownChannel))
        })
        .collect()
}

/// Reads one `{ ... }` node block whose declaration line has already been consumed, pushing
/// the node and then its subtree onto `nodes` (pre-order). Returns the node's index.
fn read_node(
    reader: &mut LineReader,
    declaration: Declaration,
    kind: NodeKind,
    parent: Option<Index>,
    depth: Depth,
    nodes: &mut Vec<Bone>,
) -> Result<Index, ParseError> {
    let index = nodes.len();
    let name = match declaration {
        Declaration::Root(name) | Declaration::Joint(name) => name.to_string(),
        // end sites are nameless in .bvh
        Declaration::EndSite => match parent {
            Some(parent) => format!("{}_end", nodes[parent].name),
            None => String::from("end"),
        },
    };

    let line = reader.expect_line()?;
    if line.text != "{" {
        return Err(line.error(ParseErrorKind::MissingBraceOpen));
    }

    let offset = parse_offset(&reader.expect_line()?)?;

    let channels = if kind == NodeKind::EndSite {
        Vec::new()
    } else {
        parse_channels(&reader.expect_line()?)?
    };

    nodes.push(Bone {
        name,
        kind,
        index,
        parent,
        children: Vec::new(),
        depth,
        offset,
        channels,
        frames: Vec::new(),
    });

    loop {
        let line = reader.expect_line()?;
        if line.text == "}" {
            return Ok(index);
        }
        if kind == NodeKind::EndSite {
            return Err(line.error(ParseErrorKind::EndSiteChildren));
        }
        let (declaration, child_kind) = match parse_declaration(&line)? {
            Declaration::Root(_) => return Err(line.error(ParseErrorKind::MultipleRoots)),
            declaration @ Declaration::Joint(_) => (declaration, NodeKind::Joint),
            Declaration::EndSite => (Declaration::EndSite, NodeKind::EndSite),
        };
        let child = read_node(reader, declaration, child_kind, Some(index), depth + 1, nodes)?;
        nodes[index].children.push(child);
    }
}

/// Parses the HIERARCHY section into a pre-order node list, root first.
pub(crate) fn parse_hierarchy(reader: &mut LineReader) -> Result<Vec<Bone>, ParseError> {
    let line = reader.expect_line()?;
    if line.text != "HIERARCHY" {
        return Err(line.error(ParseErrorKind::MalformedHeader));
    }

    // the top node is the root whether it is spelled ROOT or JOINT
    let line = reader.expect_line()?;
    let declaration = match parse_declaration(&line)? {
        Declaration::EndSite => return Err(line.error(ParseErrorKind::UnknownNodeType)),
        declaration => declaration,
    };

    let mut nodes: Vec<Bone> = Vec::new();
    read_node(reader, declaration, NodeKind::Root, None, 0, &mut nodes)?;

    log::debug!(
        "Parsed hierarchy: {} nodes, {} bones, {} channels",
        nodes.len(),
        nodes.iter().filter(|n| !n.is_end_site()).count(),
        nodes.iter().map(|n| n.channels.len()).sum::<usize>()
    );
    Ok(nodes)
}

//////////////////////////////////////////////////////////////// PUBLIC ////////////////////////////////////////////////////////////////

/// Parse a whole .bvh document.
pub fn parse(text: &str) -> Result<Skeleton, ParseError> {
    parse_with_options(text, &ParseOptions::default())
}

pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Skeleton, ParseError> {
    let mut reader = LineReader::new(text);
    let mut nodes = parse_hierarchy(&mut reader)?;

    let line = reader.expect_line()?;
    if line.text != "MOTION" {
        let kind = match parse_declaration(&line) {
            Ok(Declaration::Root(_)) => ParseErrorKind::MultipleRoots,
            _ => ParseErrorKind::MalformedHeader,
        };
        return Err(line.error(kind));
    }

    let header = motion::decode_motion(&mut reader, &mut nodes, options)?;
    Ok(Skeleton::new(nodes, header.frame_count, header.frame_time))
}

/// Load and parse a .bvh file from disk.
pub fn load_bvh_from_file(path: impl AsRef<Path>) -> crate::Result<Skeleton> {
    let contents = std::fs::read_to_string(path)?;
    Ok(parse(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hierarchy(text: &str) -> Result<Vec<Bone>, ParseError> {
        parse_hierarchy(&mut LineReader::new(text))
    }

    fn kind_of(text: &str) -> ParseErrorKind {
        hierarchy(text).unwrap_err().kind
    }

    const ARM: &str = "HIERARCHY
ROOT Hips
{
    OFFSET 0.0 10.0 0.0
    CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation

    JOINT Shoulder
    {
        OFFSET 1.5 0 0
        CHANNELS 3 Zrotation Xrotation Yrotation
        JOINT Elbow
        {
            OFFSET 2 0 0
            CHANNELS 1 Zrotation
            End Site
            {
                OFFSET 1.0 0.0 0.0
            }
        }
    }
    JOINT Neck
    {
        OFFSET 0 3 0
        CHANNELS 3 Zrotation Xrotation Yrotation
        END SITE
        {
            OFFSET 0 1 0
        }
    }
}
";

    #[test]
    fn builds_pre_order_arena() {
        let nodes = hierarchy(ARM).unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
        assert_eq!(
            names,
            vec!["Hips", "Shoulder", "Elbow", "Elbow_end", "Neck", "Neck_end"]
        );
        let parents: Vec<Option<Index>> = nodes.iter().map(|n| n.parent()).collect();
        assert_eq!(parents, vec![None, Some(0), Some(1), Some(2), Some(0), Some(4)]);
        assert_eq!(nodes[0].children(), &[1, 4]);
        assert_eq!(nodes[3].depth(), 3);
        assert_eq!(nodes[0].kind(), NodeKind::Root);
        assert_eq!(nodes[5].kind(), NodeKind::EndSite);
        assert!(nodes[5].channels().is_empty());
        assert_eq!(nodes[1].offset(), Position::new(1.5, 0.0, 0.0));
        assert_eq!(nodes[2].channels(), &[ChannelKind::Zrotation]);
    }

    #[test]
    fn joint_keyword_is_accepted_for_root() {
        let nodes = hierarchy("HIERARCHY\nJOINT hip\n{\nOFFSET 0 0 0\nCHANNELS 0\n}\n").unwrap();
        assert_eq!(nodes[0].kind(), NodeKind::Root);
        assert_eq!(nodes[0].name(), "hip");
    }

    #[test]
    fn two_offset_values_is_invalid_offset() {
        let err = hierarchy("HIERARCHY\nJOINT hip\n{\nOFFSET 0 0\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidOffset);
        assert_eq!(err.line, 4);
        assert_eq!(err.text, "OFFSET 0 0");
    }

    #[test]
    fn header_errors() {
        assert_eq!(kind_of("MOTION\n"), ParseErrorKind::MalformedHeader);
        assert_eq!(kind_of(""), ParseErrorKind::UnexpectedEof);
        assert_eq!(kind_of("HIERARCHY\nBONE hip\n"), ParseErrorKind::UnknownNodeType);
        assert_eq!(kind_of("HIERARCHY\nROOT\n"), ParseErrorKind::UnknownNodeType);
        assert_eq!(kind_of("HIERARCHY\nEnd Site\n"), ParseErrorKind::UnknownNodeType);
        assert_eq!(kind_of("HIERARCHY\nROOT hip\nOFFSET 0 0 0\n"), ParseErrorKind::MissingBraceOpen);
    }

    #[test]
    fn offset_errors() {
        let bad = [
            "OFFSET 0 0 0 0",
            "OFFSET 0 zero 0",
            "OFFSET 0 NaN 0",
            "OFFSET 0 inf 0",
            "OFFSET",
            "CHANNELS 0",
        ];
        for offset in bad {
            let text = format!("HIERARCHY\nROOT hip\n{{\n{offset}\n");
            assert_eq!(kind_of(&text), ParseErrorKind::InvalidOffset, "{offset}");
        }
    }

    #[test]
    fn channel_errors() {
        let cases = [
            ("CHANNELS 2 Xrotation", ParseErrorKind::InvalidChannelSpec),
            ("CHANNELS two Xrotation Yrotation", ParseErrorKind::InvalidChannelSpec),
            ("OFFSET 0 0 0", ParseErrorKind::InvalidChannelSpec),
            ("CHANNELS 1 Wrotation", ParseErrorKind::UnknownChannel),
        ];
        for (channels, kind) in cases {
            let text = format!("HIERARCHY\nROOT hip\n{{\nOFFSET 0 0 0\n{channels}\n}}\n");
            assert_eq!(kind_of(&text), kind, "{channels}");
        }
    }

    #[test]
    fn structural_errors() {
        let nested_root = "HIERARCHY\nROOT a\n{\nOFFSET 0 0 0\nCHANNELS 0\nROOT b\n";
        assert_eq!(kind_of(nested_root), ParseErrorKind::MultipleRoots);

        let end_site_child =
            "HIERARCHY\nROOT a\n{\nOFFSET 0 0 0\nCHANNELS 0\nEnd Site\n{\nOFFSET 0 0 0\nJOINT b\n";
        assert_eq!(kind_of(end_site_child), ParseErrorKind::EndSiteChildren);

        let unclosed = "HIERARCHY\nROOT a\n{\nOFFSET 0 0 0\nCHANNELS 0\n";
        assert_eq!(kind_of(unclosed), ParseErrorKind::UnexpectedEof);

        let junk_child = "HIERARCHY\nROOT a\n{\nOFFSET 0 0 0\nCHANNELS 0\n{\n";
        assert_eq!(kind_of(junk_child), ParseErrorKind::UnknownNodeType);
    }

    #[test]
    fn only_node_keywords_ignore_case() {
        let nodes = hierarchy(
            "HIERARCHY\nroot hip\n{\nOFFSET 0 0 0\nCHANNELS 0\nend site\n{\nOFFSET 0 1 0\n}\n}\n",
        )
        .unwrap();
        assert_eq!(nodes[0].name(), "hip");
        assert_eq!(nodes[1].kind(), NodeKind::EndSite);

        assert_eq!(kind_of("hierarchy\n"), ParseErrorKind::MalformedHeader);
        assert_eq!(
            kind_of("HIERARCHY\nROOT hip\n{\noffset 0 0 0\n"),
            ParseErrorKind::InvalidOffset
        );
        assert_eq!(
            kind_of("HIERARCHY\nROOT hip\n{\nOFFSET 0 0 0\nchannels 0\n"),
            ParseErrorKind::InvalidChannelSpec
        );
        let text = "HIERARCHY\nROOT a\n{\nOFFSET 0 0 0\nCHANNELS 0\n}\nmotion\n";
        assert_eq!(parse(text).unwrap_err().kind, ParseErrorKind::MalformedHeader);
    }

    #[test]
    fn second_root_after_first_is_rejected() {
        let text = "HIERARCHY\nROOT a\n{\nOFFSET 0 0 0\nCHANNELS 0\n}\nROOT b\n{\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MultipleRoots);
        assert_eq!(err.line, 7);
    }

    #[test]
    fn missing_motion_header() {
        let text = "HIERARCHY\nROOT a\n{\nOFFSET 0 0 0\nCHANNELS 0\n}\nMOTIONS\n";
        assert_eq!(parse(text).unwrap_err().kind, ParseErrorKind::MalformedHeader);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_bvh_from_file("/definitely/not/here.bvh").unwrap_err();
        assert!(matches!(err, crate::BvhError::Io(_)));
    }
}
