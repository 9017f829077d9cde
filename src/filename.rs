use crate::util::{Error, Result};

/// Shard files have the form:
///    base-00003-of-00010
pub fn sharded_file_name(base: &str, index: usize, count: usize) -> String {
    assert!(index < count);
    format!("{}-{:05}-of-{:05}", base, index, count)
}

/// Returns (base, index, count) for a name built by `sharded_file_name`.
pub fn parse_sharded_file_name(filename: &str) -> Option<(&str, usize, usize)> {
    let (rest, count) = filename.rsplit_once("-of-")?;
    let (base, index) = rest.rsplit_once('-')?;
    if base.is_empty() || !is_shard_number(index) || !is_shard_number(count) {
        return None;
    }
    let index = index.parse::<usize>().ok()?;
    let count = count.parse::<usize>().ok()?;
    if index < count {
        Some((base, index, count))
    } else {
        None
    }
}

fn is_shard_number(text: &str) -> bool {
    text.len() >= 5 && text.bytes().all(|ch| ch.is_ascii_digit())
}

/// Expands a comma separated list of paths into the ordered list of files
/// to read. An item `base@N` stands for the N files
/// `sharded_file_name(base, 0..N, N)`; any other item is a single file.
pub fn expand_sharded_path(sharded_path: &str) -> Result<Vec<String>> {
    let mut paths = vec![];
    for item in sharded_path.split(',') {
        if item.is_empty() {
            return Err(Error::invalid_argument(&format!(
                "empty path in \"{}\"",
                sharded_path
            )));
        }
        match item.rsplit_once('@') {
            Some((base, count)) if !count.is_empty() && count.bytes().all(|ch| ch.is_ascii_digit()) => {
                let count = count.parse::<usize>().map_err(|_| {
                    Error::invalid_argument(&format!("bad shard count in \"{}\"", item))
                })?;
                if count == 0 || base.is_empty() {
                    return Err(Error::invalid_argument(&format!(
                        "\"{}\" does not name any shard",
                        item
                    )));
                }
                paths.extend((0..count).map(|index| sharded_file_name(base, index, count)));
            }
            _ => paths.push(item.to_owned()),
        }
    }
    Ok(paths)
}
