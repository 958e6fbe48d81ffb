//! Layer naming strategies.
//!
//! Some services renamed their layers over time, so the layer to request for
//! a given year depends on the dataset. The strategy is chosen when the
//! dataset is loaded and resolved once into a concrete layer name; fetch code
//! never sees it.

use super::DatasetError;

/// Placeholder replaced by the dataset year in templates.
pub const YEAR_PLACEHOLDER: &str = "{year}";

/// How the layer name is derived from the dataset year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerNaming {
    /// A single template, possibly containing `{year}`.
    Template(String),

    /// Different templates before and from a cutoff year onward.
    YearCutoff {
        /// First year served under the `after` template.
        cutoff_year: u16,
        before: String,
        after: String,
    },
}

impl LayerNaming {
    /// Resolves the layer name for `year`.
    ///
    /// `YearCutoff` needs a year to choose a template.
    pub fn resolve(&self, year: Option<u16>) -> Result<String, DatasetError> {
        match self {
            LayerNaming::Template(template) => substitute_year(template, year, "layer"),
            LayerNaming::YearCutoff {
                cutoff_year,
                before,
                after,
            } => {
                let year = year.ok_or(DatasetError::MissingYear { field: "layer" })?;
                let template = if year >= *cutoff_year { after } else { before };
                substitute_year(template, Some(year), "layer")
            }
        }
    }
}

/// Replaces every `{year}` in `template`.
///
/// Returns `MissingYear` when the template has a placeholder but no year was
/// configured. `field` names the setting for the error message.
pub fn substitute_year(
    template: &str,
    year: Option<u16>,
    field: &'static str,
) -> Result<String, DatasetError> {
    if !template.contains(YEAR_PLACEHOLDER) {
        return Ok(template.to_string());
    }
    match year {
        Some(year) => Ok(template.replace(YEAR_PLACEHOLDER, &year.to_string())),
        None => Err(DatasetError::MissingYear { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_without_placeholder() {
        let naming = LayerNaming::Template("landcover".to_string());
        assert_eq!(naming.resolve(None).unwrap(), "landcover");
        assert_eq!(naming.resolve(Some(2020)).unwrap(), "landcover");
    }

    #[test]
    fn test_template_with_placeholder() {
        let naming = LayerNaming::Template("crops_{year}".to_string());
        assert_eq!(naming.resolve(Some(2021)).unwrap(), "crops_2021");
        assert!(matches!(
            naming.resolve(None),
            Err(DatasetError::MissingYear { field: "layer" })
        ));
    }

    #[test]
    fn test_year_cutoff_selects_template() {
        let naming = LayerNaming::YearCutoff {
            cutoff_year: 2018,
            before: "legacy:crops{year}".to_string(),
            after: "crops:{year}".to_string(),
        };
        assert_eq!(naming.resolve(Some(2017)).unwrap(), "legacy:crops2017");
        assert_eq!(naming.resolve(Some(2018)).unwrap(), "crops:2018");
        assert_eq!(naming.resolve(Some(2023)).unwrap(), "crops:2023");
    }

    #[test]
    fn test_year_cutoff_requires_year() {
        let naming = LayerNaming::YearCutoff {
            cutoff_year: 2018,
            before: "a".to_string(),
            after: "b".to_string(),
        };
        assert!(naming.resolve(None).is_err());
    }

    #[test]
    fn test_substitute_multiple_placeholders() {
        let value = substitute_year("{year}-01-01/{year}-12-31", Some(2019), "time").unwrap();
        assert_eq!(value, "2019-01-01/2019-12-31");
    }
}
