//! Judge drivers. Each reads a complete problem input and writes one answer per line.

use std::io::Write;

use anyhow::{Context, Result, bail};
use range_query::{LazySegmentTree, Min, RangeAddSum, RangeAssignMin, SegmentTree, SplaySequence, Sum};

use crate::scanner::Scanner;

/// Initial value of every element in the DSL_2_A / DSL_2_F problems.
const UNSET: i64 = (1 << 31) - 1;

/// Converts a 1-indexed inclusive pair into a 0-indexed half-open range.
fn one_indexed(s: usize, t: usize) -> Result<std::ops::Range<usize>> {
    if s == 0 {
        bail!("1-indexed position must be positive");
    }
    Ok(s - 1..t)
}

pub fn point_min(input: &str, out: &mut dyn Write) -> Result<()> {
    let mut sc = Scanner::new(input);
    let n: usize = sc.value()?;
    let q: usize = sc.value()?;
    let mut seg = SegmentTree::from_values(Min, vec![UNSET; n]);

    for query in 0..q {
        let com: u8 = sc.value()?;
        let (x, y): (usize, usize) = (sc.value()?, sc.value()?);
        match com {
            0 => seg
                .set(x, y as i64)
                .with_context(|| format!("query {query}: update"))?,
            1 => {
                let min = seg.prod(x..=y).with_context(|| format!("query {query}: find"))?;
                writeln!(out, "{min}")?;
            }
            _ => bail!("query {query}: unknown command {com}"),
        }
    }
    Ok(())
}

pub fn point_add_sum(input: &str, out: &mut dyn Write) -> Result<()> {
    let mut sc = Scanner::new(input);
    let n: usize = sc.value()?;
    let q: usize = sc.value()?;
    let mut seg = SegmentTree::<Sum>::new(n);

    for query in 0..q {
        let com: u8 = sc.value()?;
        match com {
            0 => {
                let i: usize = sc.value()?;
                let x: i64 = sc.value()?;
                let index = one_indexed(i, i)?.start;
                seg.apply(index, &x)
                    .with_context(|| format!("query {query}: add"))?;
            }
            1 => {
                let (s, t): (usize, usize) = (sc.value()?, sc.value()?);
                let sum = seg
                    .prod(one_indexed(s, t)?)
                    .with_context(|| format!("query {query}: get sum"))?;
                writeln!(out, "{sum}")?;
            }
            _ => bail!("query {query}: unknown command {com}"),
        }
    }
    Ok(())
}

pub fn range_add_sum(input: &str, out: &mut dyn Write) -> Result<()> {
    let mut sc = Scanner::new(input);
    let n: usize = sc.value()?;
    let q: usize = sc.value()?;
    let mut seg = LazySegmentTree::<RangeAddSum>::new(n);

    for query in 0..q {
        let com: u8 = sc.value()?;
        let (s, t): (usize, usize) = (sc.value()?, sc.value()?);
        match com {
            0 => {
                let x: i64 = sc.value()?;
                seg.apply_range(one_indexed(s, t)?, &x)
                    .with_context(|| format!("query {query}: add"))?;
            }
            1 => {
                let sum = seg
                    .prod(one_indexed(s, t)?)
                    .with_context(|| format!("query {query}: get sum"))?;
                writeln!(out, "{sum}")?;
            }
            _ => bail!("query {query}: unknown command {com}"),
        }
    }
    Ok(())
}

pub fn range_assign_min(input: &str, out: &mut dyn Write) -> Result<()> {
    let mut sc = Scanner::new(input);
    let n: usize = sc.value()?;
    let q: usize = sc.value()?;
    let mut seg = LazySegmentTree::from_values(RangeAssignMin, vec![UNSET; n]);

    for query in 0..q {
        let com: u8 = sc.value()?;
        let (s, t): (usize, usize) = (sc.value()?, sc.value()?);
        match com {
            0 => {
                let x: i64 = sc.value()?;
                seg.apply_range(s..=t, &Some(x))
                    .with_context(|| format!("query {query}: update"))?;
            }
            1 => {
                let min = seg.prod(s..=t).with_context(|| format!("query {query}: find"))?;
                writeln!(out, "{min}")?;
            }
            _ => bail!("query {query}: unknown command {com}"),
        }
    }
    Ok(())
}

pub fn vector(input: &str, out: &mut dyn Write) -> Result<()> {
    let mut sc = Scanner::new(input);
    let q: usize = sc.value()?;
    let mut seq = SplaySequence::with_capacity(Sum, q);

    for query in 0..q {
        let com: u8 = sc.value()?;
        match com {
            0 => seq.push(sc.value()?),
            1 => {
                let p: usize = sc.value()?;
                let value = seq.get(p).with_context(|| format!("query {query}: randomAccess"))?;
                writeln!(out, "{value}")?;
            }
            2 => {
                if seq.pop().is_none() {
                    bail!("query {query}: popBack on an empty vector");
                }
            }
            _ => bail!("query {query}: unknown command {com}"),
        }
    }
    Ok(())
}

pub fn shift_min(input: &str, out: &mut dyn Write) -> Result<()> {
    let mut sc = Scanner::new(input);
    let n: usize = sc.value()?;
    let q: usize = sc.value()?;
    let values = (0..n).map(|_| sc.value()).collect::<Result<Vec<i64>>>()?;
    let mut seq = SplaySequence::from_values(Min, values);

    for query in 0..q {
        let com: u8 = sc.value()?;
        let (x, y): (usize, i64) = (sc.value()?, sc.value()?);
        match com {
            0 => {
                let r = usize::try_from(y).context("shift end must be non-negative")?;
                seq.shift(x, r).with_context(|| format!("query {query}: shift"))?;
            }
            1 => {
                let r = usize::try_from(y).context("range end must be non-negative")?;
                let min = seq.prod(x..=r).with_context(|| format!("query {query}: min"))?;
                writeln!(out, "{min}")?;
            }
            2 => seq.set(x, y).with_context(|| format!("query {query}: update"))?,
            _ => bail!("query {query}: unknown command {com}"),
        }
    }
    log::debug!("shift_min: {} elements after {q} queries", seq.len());
    Ok(())
}
