use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::FIGURES;
use crate::figure::spec::FigureSpec;
use crate::figure::table::{FigureTable, builtin};

/// Figure table overrides read from `--config`.
///
/// ```json
/// { "figures": { "6": { "dir": "learning_power", "series": [ ... ] } } }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FigureConfig {
    #[serde(default)]
    pub figures: BTreeMap<u32, FigureSpec>,
}

impl FigureConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// The built-in table with any configured entries layered on top.
pub fn figure_table(config: Option<&Path>) -> Result<FigureTable> {
    let mut table = builtin();
    if let Some(path) = config {
        let overrides = FigureConfig::load(path)?;
        for (number, spec) in overrides.figures {
            if !selectable(number) {
                log::warn!(
                    "Config entry for figure {number} is outside {}..={} and cannot be selected",
                    FIGURES.start(),
                    FIGURES.end()
                );
            }
            if table.insert(number, spec).is_some() {
                log::info!("Config replaces built-in settings for figure {number}");
            } else {
                log::info!("Config adds figure {number}");
            }
        }
    }
    Ok(table)
}

fn selectable(number: u32) -> bool {
    FIGURES.contains(&i64::from(number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::figure::spec::Curve;

    #[test]
    fn no_config_is_builtin_table() {
        let table = figure_table(None).unwrap();
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn config_adds_and_replaces_entries() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{ "figures": {{
                "5": {{ "dir": "ris", "curve": "raw",
                        "x_ticks": [1, 2], "series": [{{ "file": "r.npy", "label": "R" }}] }},
                "7": {{ "dir": "learning", "series": [
                        {{ "file": "a.npy", "label": "a", "color": "{}" }} ] }}
            }} }}"##,
            crate::color::GREEN
        )
        .unwrap();

        let table = figure_table(Some(file.path())).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[&5].dir, "ris");
        assert_eq!(table[&5].curve, Curve::Raw);
        assert_eq!(table[&7].curve, Curve::Average);
        assert_eq!(table[&7].series[0].color.as_deref(), Some("#2ca02c"));
    }

    #[test]
    fn out_of_range_entries_load_but_are_not_selectable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "figures": {{ "13": {{ "series": [{{ "file": "a.npy", "label": "a" }}] }} }} }}"#
        )
        .unwrap();

        let table = figure_table(Some(file.path())).unwrap();
        assert!(table.contains_key(&13));
        assert!(!selectable(13));
        assert!(!selectable(3));
        assert!(selectable(4) && selectable(12));
    }

    #[test]
    fn malformed_config_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = format!("{:#}", figure_table(Some(file.path())).unwrap_err());
        assert!(err.contains("parsing config"), "{err}");
    }
}
