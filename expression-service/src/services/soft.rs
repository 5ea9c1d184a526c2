//! Minimal reader for GEO SOFT text documents.
//!
//! Only the series header is interpreted: `^SERIES`, the title, summary and
//! platform attributes, and sample identifiers (from `!Series_sample_id` and
//! `^SAMPLE` entity lines). Everything else is skipped.

use crate::models::GeoSeries;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoftParseError {
    #[error("no series record found for {0}")]
    MissingSeries(String),

    #[error("series {accession} is missing metadata field '{field}'")]
    MissingField {
        accession: String,
        field: &'static str,
    },
}

/// Parse the series block of a SOFT document.
///
/// `requested` is only used for error messages when the document carries no
/// `^SERIES` line (GEO answers unknown accessions with a plain-text notice).
pub fn parse_series(requested: &str, text: &str) -> Result<GeoSeries, SoftParseError> {
    let mut accession = None;
    let mut title = None;
    let mut summary = None;
    let mut platform_id = None;
    let mut sample_ids: Vec<String> = Vec::new();

    for line in text.lines() {
        let Some((key, value)) = split_line(line) else {
            continue;
        };

        match key {
            "^SERIES" => {
                accession.get_or_insert_with(|| value.to_string());
            }
            "!Series_title" => {
                title.get_or_insert_with(|| value.to_string());
            }
            "!Series_summary" => {
                summary.get_or_insert_with(|| value.to_string());
            }
            "!Series_platform_id" => {
                platform_id.get_or_insert_with(|| value.to_string());
            }
            "!Series_sample_id" | "^SAMPLE" => {
                if !value.is_empty() && !sample_ids.iter().any(|id| id == value) {
                    sample_ids.push(value.to_string());
                }
            }
            _ => {}
        }
    }

    let accession = accession.ok_or_else(|| SoftParseError::MissingSeries(requested.to_string()))?;
    let missing = |field| SoftParseError::MissingField {
        accession: accession.clone(),
        field,
    };

    Ok(GeoSeries {
        title: title.ok_or_else(|| missing("title"))?,
        summary: summary.ok_or_else(|| missing("summary"))?,
        platform_id: platform_id.ok_or_else(|| missing("platform_id"))?,
        sample_ids,
        accession,
    })
}

/// Split `key = value`, keeping only entity (`^`) and attribute (`!`) lines.
fn split_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches('\r');
    if !(line.starts_with('^') || line.starts_with('!')) {
        return None;
    }
    match line.split_once('=') {
        Some((key, value)) => Some((key.trim(), value.trim())),
        None => Some((line.trim(), "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES: &str = "^SERIES = GSE2034\r\n\
!Series_title = Breast cancer relapse free survival\r\n\
!Series_geo_accession = GSE2034\r\n\
!Series_summary = Genome-wide measures of gene expression.\r\n\
!Series_summary = Keywords: time-course\r\n\
!Series_platform_id = GPL96\r\n\
!Series_sample_id = GSM36777\r\n\
!Series_sample_id = GSM36778\r\n\
^SAMPLE = GSM36778\r\n\
!Sample_title = relapse\r\n\
^SAMPLE = GSM36779\r\n\
ID_REF\tVALUE\r\n\
1007_s_at\t3848.1\r\n";

    #[test]
    fn parses_series_header() {
        let series = parse_series("GSE2034", SERIES).unwrap();
        assert_eq!(series.accession, "GSE2034");
        assert_eq!(series.title, "Breast cancer relapse free survival");
        assert_eq!(series.summary, "Genome-wide measures of gene expression.");
        assert_eq!(series.platform_id, "GPL96");
        assert_eq!(series.sample_ids, vec!["GSM36777", "GSM36778", "GSM36779"]);
    }

    #[test]
    fn unknown_accession_notice_is_rejected() {
        let err = parse_series(
            "GSE_UNKNOWN",
            "Could not find a public or private accession \"GSE_UNKNOWN\"",
        )
        .unwrap_err();
        assert_eq!(err, SoftParseError::MissingSeries("GSE_UNKNOWN".to_string()));
    }

    #[test]
    fn missing_platform_is_reported() {
        let err = parse_series(
            "GSE1",
            "^SERIES = GSE1\n!Series_title = t\n!Series_summary = s\n",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "series GSE1 is missing metadata field 'platform_id'"
        );
    }

    #[test]
    fn values_may_contain_equals_signs() {
        let series = parse_series(
            "GSE2",
            "^SERIES = GSE2\n!Series_title = a = b\n!Series_summary = s\n!Series_platform_id = GPL1\n",
        )
        .unwrap();
        assert_eq!(series.title, "a = b");
        assert!(series.sample_ids.is_empty());
    }
}
