//! Numbered raw-data dumps: `{dir}/patterns_{i}.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ravelry_client::PatternRecord;
use tracing::{debug, info, trace};

use crate::errors::StoreError;

/// Base name of pattern dump files.
pub const DUMP_BASE: &str = "patterns";

/// `{dir}/{base}_{i}.{ext}` for the lowest `i` not yet taken.
///
/// Creates `dir` when missing.
pub fn next_dump_path(dir: impl AsRef<Path>, base: &str, ext: &str) -> Result<PathBuf, StoreError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut i = 0usize;
    loop {
        let candidate = dir.join(format!("{base}_{i}.{ext}"));
        if !candidate.exists() {
            trace!("dump::next_dump_path -> {:?}", candidate);
            return Ok(candidate);
        }
        i += 1;
    }
}

/// Writes `records` as a pretty JSON array to the next free dump path.
pub fn write_dump(dir: impl AsRef<Path>, records: &[PatternRecord]) -> Result<PathBuf, StoreError> {
    let path = next_dump_path(dir, DUMP_BASE, "json")?;
    fs::write(&path, serde_json::to_string_pretty(records)?)?;
    info!("Wrote {} patterns to {:?}", records.len(), path);
    Ok(path)
}

/// Reads a dump written by [`write_dump`].
pub fn read_dump(path: impl AsRef<Path>) -> Result<Vec<PatternRecord>, StoreError> {
    let data = fs::read_to_string(path.as_ref())?;
    let records: Vec<PatternRecord> = serde_json::from_str(&data)?;
    debug!("Read {} patterns from {:?}", records.len(), path.as_ref());
    Ok(records)
}

/// Most recently written `patterns_{i}.json` in `dir`.
///
/// [`next_dump_path`] refills gaps, so the highest index is not always the
/// newest dump; modification time decides, the index breaks ties.
///
/// # Errors
/// [`StoreError::NoDump`] when the directory holds no dump.
pub fn latest_dump(dir: impl AsRef<Path>) -> Result<PathBuf, StoreError> {
    let dir = dir.as_ref();
    let no_dump = || StoreError::NoDump(dir.display().to_string());
    if !dir.exists() {
        return Err(no_dump());
    }

    let mut best: Option<((SystemTime, usize), PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(index) = dump_index(&name.to_string_lossy()) else {
            continue;
        };
        let key = (meta.modified()?, index);
        if best.as_ref().is_none_or(|(b, _)| key > *b) {
            best = Some((key, entry.path()));
        }
    }

    let (_, path) = best.ok_or_else(no_dump)?;
    debug!("dump::latest_dump -> {:?}", path);
    Ok(path)
}

fn dump_index(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix(DUMP_BASE)?
        .strip_prefix('_')?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn record(id: u64) -> PatternRecord {
        PatternRecord {
            id,
            name: format!("Sock {id}"),
            designer: "Unknown".into(),
            difficulty: 0.0,
            yarn_weight: "Fingering".into(),
            notes: String::new(),
            url: format!("https://www.ravelry.com/patterns/library/sock-{id}"),
            category: "socks".into(),
            downloadable: false,
            free: true,
        }
    }

    #[test]
    fn naming_picks_the_lowest_free_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("patterns_0.json"), "[]").unwrap();
        fs::write(dir.path().join("patterns_2.json"), "[]").unwrap();

        let p = next_dump_path(dir.path(), "patterns", "json").unwrap();
        assert_eq!(p, dir.path().join("patterns_1.json"));
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data/raw");
        let p = next_dump_path(&nested, "patterns", "json").unwrap();
        assert!(nested.is_dir());
        assert_eq!(p, nested.join("patterns_0.json"));
    }

    #[test]
    fn written_dump_reads_back_and_is_latest() {
        let dir = tempfile::tempdir().unwrap();
        write_dump(dir.path(), &[record(1)]).unwrap();
        let second = write_dump(dir.path(), &[record(2), record(3)]).unwrap();
        fs::write(dir.path().join("patterns_x.json"), "[]").unwrap();

        assert_eq!(latest_dump(dir.path()).unwrap(), second);
        assert_eq!(read_dump(&second).unwrap(), vec![record(2), record(3)]);
    }

    #[test]
    fn refilled_gap_is_the_latest_dump() {
        let dir = tempfile::tempdir().unwrap();
        let old = SystemTime::now() - Duration::from_secs(3600);
        for name in ["patterns_0.json", "patterns_2.json"] {
            let path = dir.path().join(name);
            fs::write(&path, "[]").unwrap();
            fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(old)
                .unwrap();
        }

        let fresh = write_dump(dir.path(), &[record(7)]).unwrap();
        assert_eq!(fresh, dir.path().join("patterns_1.json"));
        assert_eq!(latest_dump(dir.path()).unwrap(), fresh);
        assert_eq!(read_dump(latest_dump(dir.path()).unwrap()).unwrap(), vec![record(7)]);
    }

    #[test]
    fn empty_directory_has_no_dump() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            latest_dump(dir.path()),
            Err(StoreError::NoDump(_))
        ));
    }
}
