pub mod directory;
pub mod levels;
pub mod orgs;
pub mod projects;
pub mod users;
pub mod xdmod;

use om_core::config::OrgmapConfig;
use om_core::error::OrgmapError;
use om_core::orgmap::{Orgmap, RequestContext};
use om_db::schema;
use om_db::store::DbStore;
use om_events::bus::EventBus;
use om_events::types::EventSource;
use std::fs;
use std::path::Path;

pub fn cli_ctx() -> RequestContext {
    RequestContext::new(EventSource::Cli, None)
}

pub fn open_orgmap(config: &OrgmapConfig) -> Result<Orgmap<DbStore>, OrgmapError> {
    if let Some(parent) = Path::new(&config.db_path).parent() {
        let _ = fs::create_dir_all(parent);
    }
    let conn = schema::open_and_migrate(&config.db_path).map_err(|err| OrgmapError::Internal {
        message: err.to_string(),
    })?;
    Ok(
        Orgmap::new(DbStore::new(conn), EventBus::new(64)).with_placeholder(
            config.placeholder_code.clone(),
            config.placeholder_longname.clone(),
        ),
    )
}

/// Read a delimited import file: one record per line, blank lines and
/// `#` comments skipped. Returns (line number, fields) pairs.
pub fn read_records(path: &Path, delimiter: char) -> Result<Vec<(usize, Vec<String>)>, OrgmapError> {
    let content = fs::read_to_string(path).map_err(|err| OrgmapError::Internal {
        message: format!("cannot read {}: {err}", path.display()),
    })?;
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields = line
            .split(delimiter)
            .map(|field| field.trim().to_string())
            .collect();
        records.push((index + 1, fields));
    }
    Ok(records)
}

pub fn expect_fields(
    record: &(usize, Vec<String>),
    count: usize,
    path: &Path,
) -> Result<(), OrgmapError> {
    let (line, fields) = record;
    if fields.len() < count {
        return Err(OrgmapError::Internal {
            message: format!(
                "expected {count} fields but got {}, line {line} of {}",
                fields.len(),
                path.display()
            ),
        });
    }
    Ok(())
}

pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_records_skips_comments_and_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# header comment").unwrap();
        writeln!(file, "University|40|").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  College | 30 | University ").unwrap();
        let records = read_records(file.path(), '|').unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, 2);
        assert_eq!(records[0].1, vec!["University", "40", ""]);
        assert_eq!(records[1].1, vec!["College", "30", "University"]);
    }

    #[test]
    fn expect_fields_reports_line_numbers() {
        let record = (7, vec!["only".to_string()]);
        let err = expect_fields(&record, 3, Path::new("orgs.csv")).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn parse_flag_accepts_common_truthy_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag("True"));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("no"));
    }
}
