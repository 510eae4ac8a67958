//! Plain-text bookkeeping files: the level entry-count catalog and the
//! per-level dictionary sidecars. Unlike the mapped key/value/tombstone
//! arrays, these are small and read/written wholesale on open/close, so a
//! human-readable format costs nothing and makes the on-disk state easy to
//! inspect by hand.

use std::fs;
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed catalog entry: {0}")]
    Parse(String),
}

pub fn catalog_path(dir: &Path) -> std::path::PathBuf {
    dir.join("catalog.data")
}

fn dict_path(dir: &Path, level: usize) -> std::path::PathBuf {
    dir.join(format!("dict{level}.data"))
}

fn dict_reverse_path(dir: &Path, level: usize) -> std::path::PathBuf {
    dir.join(format!("dictreverse{level}.data"))
}

/// One decimal `n(l)` per line, line index `l` is the level index.
pub fn read_counts(dir: &Path) -> Result<Option<Vec<usize>>, CatalogError> {
    let path = catalog_path(dir);
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)?;
    let mut counts = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let n: usize = line
            .parse()
            .map_err(|_| CatalogError::Parse(format!("not a number: {line:?}")))?;
        counts.push(n);
    }
    Ok(Some(counts))
}

pub fn write_counts(dir: &Path, counts: &[usize]) -> Result<(), CatalogError> {
    let mut text = String::new();
    for n in counts {
        text.push_str(&n.to_string());
        text.push('\n');
    }
    fs::write(catalog_path(dir), text)?;
    Ok(())
}

/// Reads `dict<l>.data` (`<value> <id>` per line) and `dictreverse<l>.data`
/// (`<value>` per line, line index is the id), returning empty collections
/// when neither file exists yet.
pub fn read_dict(dir: &Path, level: usize) -> Result<(Vec<(i64, u8)>, Vec<i64>), CatalogError> {
    let fwd_path = dict_path(dir, level);
    let rev_path = dict_reverse_path(dir, level);

    let forward = if fwd_path.exists() {
        let text = fs::read_to_string(&fwd_path)?;
        let mut pairs = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let value: i64 = parts
                .next()
                .ok_or_else(|| CatalogError::Parse(format!("missing value in {line:?}")))?
                .parse()
                .map_err(|_| CatalogError::Parse(format!("bad value in {line:?}")))?;
            let id: u8 = parts
                .next()
                .ok_or_else(|| CatalogError::Parse(format!("missing id in {line:?}")))?
                .parse()
                .map_err(|_| CatalogError::Parse(format!("bad id in {line:?}")))?;
            pairs.push((value, id));
        }
        pairs
    } else {
        Vec::new()
    };

    let reverse = if rev_path.exists() {
        let text = fs::read_to_string(&rev_path)?;
        let mut values = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: i64 = line
                .parse()
                .map_err(|_| CatalogError::Parse(format!("bad value in {line:?}")))?;
            values.push(value);
        }
        values
    } else {
        Vec::new()
    };

    Ok((forward, reverse))
}

pub fn write_dict(
    dir: &Path,
    level: usize,
    forward: &[(i64, u8)],
    reverse: &[i64],
) -> Result<(), CatalogError> {
    let mut fwd_text = String::new();
    for (value, id) in forward {
        fwd_text.push_str(&format!("{value} {id}\n"));
    }
    fs::write(dict_path(dir, level), fwd_text)?;

    let mut rev_text = String::new();
    for value in reverse {
        rev_text.push_str(&format!("{value}\n"));
    }
    fs::write(dict_reverse_path(dir, level), rev_text)?;
    Ok(())
}
