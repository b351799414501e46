//! Parser for trial files in a small subset of dreadnaut syntax:
//!
//! ```text
//! d
//! n=4 g
//! 0:1 2;
//! 2:3;
//! 3:0.
//! f=[0|1,2]
//! ```
//!
//! The `d` line is optional and marks the graph as directed, otherwise
//! every arc is read as an undirected edge. The `f=[...]` line is
//! optional as well. Vertices it doesn't mention form a last block.

use custom_debug_derive::Debug;
use std::{io::BufRead, os::raw::c_int};

use crate::{
    colouring::encode_blocks,
    debug::len_fmt,
    get_line,
    graph::{symmetrized, TrialInput, VertexIndex},
    parse_single_line, Error,
};

pub type Input<'a> = &'a str;
pub type ParseError<'a> = nom::error::VerboseError<Input<'a>>;
pub type ParseResult<'a, O> = nom::IResult<Input<'a>, O, ParseError<'a>>;

/// Graph and colouring read from a trial file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialFile {
    pub directed: bool,
    #[debug(with = "len_fmt")]
    pub adjacency: Vec<Vec<VertexIndex>>,
    pub colouring: Option<Vec<VertexIndex>>,
}

impl TrialFile {
    pub fn input(&self) -> TrialInput<'_> {
        TrialInput::from_adjacency(&self.adjacency, self.colouring.as_deref())
    }
}

/// Parse the start line for the graph that contains the size.
/// nauty indexes vertices with `int`, larger sizes are rejected.
fn parse_graph_size(input: Input<'_>) -> ParseResult<'_, usize> {
    use nom::{
        bytes::complete::tag,
        character::complete::{space0, space1, u64},
        combinator::verify,
        error::context,
        sequence::tuple,
    };

    let vertex_count = context(
        "Graph size fits a C int",
        verify(u64, |size: &u64| *size <= c_int::MAX as u64),
    );
    let mut size_header = context(
        "Graph size header",
        tuple((space0, tag("n="), vertex_count, space1, tag("g"), space0)),
    );
    let (rest, (_, _, graph_size, _, _, _)) = size_header(input)?;
    Ok((rest, graph_size as usize))
}

/// Parse a single vertex index.
fn parse_vertex_index(input: Input<'_>) -> ParseResult<'_, VertexIndex> {
    use nom::character::complete::i32;
    i32(input)
}

/// Parse a vertex index that has to lie within the graph.
fn parse_vertex(graph_size: usize, input: Input<'_>) -> ParseResult<'_, VertexIndex> {
    use nom::{combinator::verify, error::context};

    context(
        "Vertex within the graph",
        verify(parse_vertex_index, |index: &VertexIndex| {
            *index >= 0 && (*index as usize) < graph_size
        }),
    )(input)
}

/// Parse the arcs from vertex s from `s:t1 t2 ... tk`.
fn parse_vertex_arcs(
    graph_size: usize,
    input: Input<'_>,
) -> ParseResult<'_, (VertexIndex, Vec<VertexIndex>)> {
    use nom::{
        bytes::complete::tag,
        character::complete::{space0, space1},
        error::context,
        multi::separated_list0,
        sequence::tuple,
    };

    let (input, index) = context("Line starts with vertex index", |input| {
        parse_vertex(graph_size, input)
    })(input)?;
    let (input, _) = tuple((space0, tag(":"), space0))(input)?;

    let (rest, ends) = context(
        "List of arcs from this vertex",
        separated_list0(space1, |input| parse_vertex(graph_size, input)),
    )(input)?;

    Ok((rest, (index, ends)))
}

/// Parse the end of an arc line which determines
/// if the arc lines stop (`.`) or continue (`;`).
fn parse_continue_after_arc_line(input: Input<'_>) -> ParseResult<'_, bool> {
    use nom::{
        branch::alt,
        bytes::complete::tag,
        character::complete::space0,
        combinator::map,
        sequence::delimited,
    };

    let arc_list_end = delimited(space0, alt((tag(";"), tag("."))), space0);
    let mut should_continue_after_line = map(arc_list_end, |end: &str| end == ";");

    should_continue_after_line(input)
}

/// Parse the blocks of the colouring:
/// `f=[b11,b12,...,b1n|b21,...,b2m|...|bp1,...,bpk]`
fn parse_blocks(graph_size: usize, input: Input<'_>) -> ParseResult<'_, Vec<Vec<VertexIndex>>> {
    use nom::{
        bytes::complete::tag,
        character::complete::space0,
        error::context,
        multi::{separated_list0, separated_list1},
        sequence::{terminated, tuple},
    };

    let sep = |sep_tag| tuple((space0, tag(sep_tag), space0));

    let block = separated_list1(sep(","), |input| parse_vertex(graph_size, input));
    let block_list = separated_list0(sep("|"), block);

    let (input, _) = tuple((space0, tag("f=["), space0))(input)?;
    context(
        "Colouring blocks",
        terminated(block_list, tuple((space0, tag("]"), space0))),
    )(input)
}

/// Collect every vertex not mentioned in `blocks` into a last block.
fn with_remaining_block(mut blocks: Vec<Vec<VertexIndex>>, graph_size: usize) -> Vec<Vec<VertexIndex>> {
    let mut mentioned = vec![false; graph_size];
    for vertex in blocks.iter().flatten() {
        mentioned[*vertex as usize] = true;
    }

    let remaining = (0..graph_size)
        .filter(|vertex| !mentioned[*vertex])
        .map(|vertex| vertex as VertexIndex)
        .collect::<Vec<_>>();
    if !remaining.is_empty() {
        blocks.push(remaining);
    }
    blocks
}

pub fn parse_trial_file<B: BufRead>(input: B) -> Result<TrialFile, Error> {
    use nom::combinator::eof;

    let mut lines = input.lines().peekable();

    let directed = lines
        .next_if(|line| matches!(line, Ok(line) if line.trim() == "d"))
        .is_some();

    get_line!(size_line, lines);
    parse_single_line!(graph_size, parse_graph_size(&size_line));
    let mut adjacency = Vec::new();
    adjacency
        .try_reserve_exact(graph_size)
        .map_err(|_| Error::Allocation {
            what: "adjacency lists",
            requested: graph_size,
        })?;
    adjacency.resize(graph_size, Vec::new());

    while graph_size > 0 {
        get_line!(line, lines);
        let (rest, (vertex, ends)) = parse_vertex_arcs(graph_size, &line)?;
        adjacency[vertex as usize].extend(ends);

        parse_single_line!(should_continue, parse_continue_after_arc_line(rest));
        if !should_continue || vertex as usize + 1 >= graph_size {
            break;
        }
    }

    let colour_line = lines.find(|line| !matches!(line, Ok(line) if line.trim().is_empty()));
    let colouring = match colour_line {
        Some(line) => {
            let line = line?;
            parse_single_line!(blocks, parse_blocks(graph_size, &line));
            Some(encode_blocks(&with_remaining_block(blocks, graph_size)))
        }
        None => None,
    };

    let adjacency = if directed {
        for ends in adjacency.iter_mut() {
            ends.sort_unstable();
            ends.dedup();
        }
        adjacency
    } else {
        symmetrized(&adjacency)?
    };
    tracing::debug!(
        vertices = graph_size,
        directed,
        coloured = colouring.is_some(),
        "parsed trial file"
    );

    Ok(TrialFile {
        directed,
        adjacency,
        colouring,
    })
}

#[cfg(test)]
mod test {
    use std::io::BufReader;

    use super::*;

    #[test]
    fn test_parse_graph_size() -> Result<(), Error> {
        let test_size = 128;

        let valid_input = format!("n={} g", test_size);
        let (_, parsed_size) = parse_graph_size(&valid_input)?;
        assert_eq!(test_size, parsed_size);

        let non_decimal_input = "n=0xfa g";
        assert!(parse_graph_size(non_decimal_input).is_err());

        let leading_zeros_input = format!("n=0000{} g", test_size);
        let (_, parsed_size) = parse_graph_size(&leading_zeros_input)?;
        assert_eq!(test_size, parsed_size);

        let largest_input = format!("n={} g", c_int::MAX);
        let (_, parsed_size) = parse_graph_size(&largest_input)?;
        assert_eq!(c_int::MAX as usize, parsed_size);

        let oversize_input = format!("n={} g", c_int::MAX as u64 + 1);
        assert!(parse_graph_size(&oversize_input).is_err());

        Ok(())
    }

    #[test]
    fn test_parse_vertex_arcs() -> Result<(), Error> {
        let test_input = "12345:12 2 0 12 34235 88 23 ;";
        let test_size = i32::MAX;

        let (rest, (vertex, ends)) = parse_vertex_arcs(test_size as usize, test_input)?;
        assert_eq!(12345, vertex);
        assert_eq!(vec![12, 2, 0, 12, 34235, 88, 23], ends);
        assert_eq!(" ;", rest);

        let (_, (vertex, ends)) = parse_vertex_arcs(3, "2:;")?;
        assert_eq!(2, vertex);
        assert!(ends.is_empty());

        assert!(parse_vertex_arcs(3, "1:0 3;").is_ok());
        assert!(parse_vertex_arcs(3, "3:0;").is_err());
        assert!(parse_vertex_arcs(3, "-1:0;").is_err());

        Ok(())
    }

    #[test]
    fn test_parse_continue_after_arc_line() -> Result<(), Error> {
        let continue_input = "      ;";
        let (_, parsed_flag) = parse_continue_after_arc_line(continue_input)?;
        assert!(parsed_flag);

        let quit_input = " . ";
        let (_, parsed_flag) = parse_continue_after_arc_line(quit_input)?;
        assert!(!parsed_flag);

        Ok(())
    }

    #[test]
    fn test_parse_blocks() -> Result<(), Error> {
        let test_input = "f=[1|  0  ,  3 | 2]";
        let (_, blocks) = parse_blocks(5, test_input)?;
        assert_eq!(vec![vec![1], vec![0, 3], vec![2]], blocks);
        assert_eq!(
            vec![vec![1], vec![0, 3], vec![2], vec![4]],
            with_remaining_block(blocks, 5)
        );

        assert!(parse_blocks(5, "f=[1|5]").is_err());
        Ok(())
    }

    #[test]
    fn test_parse_undirected_trial_file() -> Result<(), Error> {
        let test_file = "n=4 g
0:1 2 ;
2:3;
3:0.
f=[0|1, 2]

        ";
        let parsed = parse_trial_file(BufReader::new(test_file.as_bytes()))?;

        assert!(!parsed.directed);
        assert_eq!(
            vec![vec![1, 2, 3], vec![0], vec![0, 3], vec![0, 2]],
            parsed.adjacency
        );
        assert_eq!(Some(vec![-1, -2, 3, -4]), parsed.colouring);
        assert_eq!(4, parsed.input().vertex_count());

        Ok(())
    }

    #[test]
    fn test_parse_directed_trial_file() -> Result<(), Error> {
        let test_file = "d
n=3 g
0:1 1;
1:2.
";
        let parsed = parse_trial_file(BufReader::new(test_file.as_bytes()))?;

        assert!(parsed.directed);
        assert_eq!(vec![vec![1], vec![2], vec![]], parsed.adjacency);
        assert_eq!(None, parsed.colouring);

        Ok(())
    }

    #[test]
    fn test_oversize_trial_file() {
        let test_file = "n=1000000000000000000 g
0:1.
";
        assert!(matches!(
            parse_trial_file(BufReader::new(test_file.as_bytes())),
            Err(Error::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_truncated_trial_file() {
        let test_file = "n=3 g
0:1;
";
        assert!(matches!(
            parse_trial_file(BufReader::new(test_file.as_bytes())),
            Err(Error::IoError(_))
        ));

        let test_file = "n=3 g
0:1 x.
";
        assert!(matches!(
            parse_trial_file(BufReader::new(test_file.as_bytes())),
            Err(Error::ParseError(_))
        ));
    }
}
