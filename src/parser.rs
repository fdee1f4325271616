// Inline data parser for the command line
//
// Formats:
//   red:3, green:2     ordered category counts
//   5, 2               flat values
//   5, 2; 3, 4         groups of values (grouped bars)

use crate::data::{CategoryDatum, ChartData};
use crate::error::{GraphError, Result};
use nom::{
    bytes::complete::take_while1,
    character::complete::{char, i64 as signed, multispace0},
    combinator::{all_consuming, map, verify},
    multi::separated_list1,
    number::complete::double,
    sequence::{delimited, separated_pair},
    IResult,
};

/// Wrap a parser to skip surrounding whitespace
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Category label: anything up to a separator, trimmed
fn label(input: &str) -> IResult<&str, &str> {
    verify(
        map(take_while1(|c: char| c != ':' && c != ',' && c != ';'), str::trim),
        |s: &str| !s.is_empty(),
    )(input)
}

/// Parse one `label:count` entry
fn count_entry(input: &str) -> IResult<&str, (&str, i64)> {
    separated_pair(ws(label), char(':'), ws(signed))(input)
}

fn count_list(input: &str) -> IResult<&str, Vec<(&str, i64)>> {
    separated_list1(char(','), count_entry)(input)
}

fn value_list(input: &str) -> IResult<&str, Vec<f64>> {
    separated_list1(char(','), ws(double))(input)
}

fn group_list(input: &str) -> IResult<&str, Vec<Vec<f64>>> {
    separated_list1(char(';'), value_list)(input)
}

/// Parse an inline data expression into chart data
pub fn parse_data(input: &str) -> Result<ChartData> {
    let input = input.trim();

    if let Ok((_, entries)) = all_consuming(count_list)(input) {
        let mut data = Vec::with_capacity(entries.len());
        for (label, count) in entries {
            if count < 0 {
                return Err(GraphError::InvalidData(format!(
                    "count for '{}' is negative: {}",
                    label, count
                )));
            }
            data.push(CategoryDatum::new(label, count as u64));
        }
        return Ok(ChartData::Counts(data));
    }

    if let Ok((_, mut groups)) = all_consuming(group_list)(input) {
        let data = if groups.len() == 1 {
            ChartData::Values(groups.remove(0))
        } else {
            ChartData::Groups(groups)
        };
        data.validate()?;
        return Ok(data);
    }

    Err(GraphError::InvalidData(format!(
        "cannot parse data '{}' (expected 'label:count, ...', 'n, n, ...' or 'n, n; n, n')",
        input
    )))
}
