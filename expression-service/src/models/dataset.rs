use serde::{Deserialize, Serialize};

/// Search result entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub id: String,
    pub title: String,
    pub organism: String,
    #[serde(rename = "samples")]
    pub sample_count: u32,
}

impl DatasetRecord {
    fn new(id: &str, title: &str, organism: &str, sample_count: u32) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            organism: organism.to_string(),
            sample_count,
        }
    }
}

/// Datasets offered by the search endpoint.
pub fn featured_datasets() -> Vec<DatasetRecord> {
    vec![
        DatasetRecord::new("GSE123456", "Breast Cancer Study", "Homo sapiens", 50),
        DatasetRecord::new("GSE789012", "Lung Cancer Analysis", "Homo sapiens", 40),
    ]
}

/// A GEO series parsed from its SOFT representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoSeries {
    pub accession: String,
    pub title: String,
    pub summary: String,
    pub platform_id: String,
    pub sample_ids: Vec<String>,
}

impl GeoSeries {
    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            title: self.title.clone(),
            summary: self.summary.clone(),
            samples: self.sample_ids.len(),
            platform: self.platform_id.clone(),
        }
    }
}

/// Projection of a [`GeoSeries`] returned by `GET /dataset/:dataset_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub title: String,
    pub summary: String,
    pub samples: usize,
    pub platform: String,
}
