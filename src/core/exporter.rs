use crate::domain::model::BatchOutcome;
use crate::domain::ports::Storage;
use crate::utils::error::{LeadError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const CSV_FILENAME: &str = "leads.csv";
const SUMMARY_FILENAME: &str = "summary.json";
const BUNDLE_FILENAME: &str = "leads_bundle.zip";

/// Serializes a batch (complete or partial) to the tabular sink.
/// Writes `leads.csv` plus a JSON run summary, or a single ZIP bundle
/// containing both when `archive` is set. A partial batch exports
/// without error; only the storage write itself can fail.
pub struct Exporter {
    archive: bool,
}

impl Exporter {
    pub fn new(archive: bool) -> Self {
        Self { archive }
    }

    pub async fn export<S: Storage>(
        &self,
        storage: &S,
        outcome: &BatchOutcome,
        output_path: &str,
    ) -> Result<String> {
        let csv_data = render_csv(outcome)?;
        let summary_data = render_summary(outcome)?;

        if self.archive {
            let bundle = build_bundle(&csv_data, &summary_data)?;
            storage.write_file(BUNDLE_FILENAME, &bundle).await?;
            tracing::debug!(bytes = bundle.len(), "wrote export bundle");
            Ok(format!("{}/{}", output_path, BUNDLE_FILENAME))
        } else {
            storage.write_file(CSV_FILENAME, csv_data.as_bytes()).await?;
            storage
                .write_file(SUMMARY_FILENAME, summary_data.as_bytes())
                .await?;
            Ok(format!("{}/{}", output_path, CSV_FILENAME))
        }
    }
}

fn render_csv(outcome: &BatchOutcome) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "company",
        "domain",
        "website",
        "decision_maker",
        "title",
        "profile_url",
        "email",
        "message",
        "status",
    ])?;

    for o in &outcome.outcomes {
        writer.write_record([
            o.record.company.as_str(),
            o.record.domain.as_deref().unwrap_or(""),
            o.record.website.as_deref().unwrap_or(""),
            o.fields.decision_maker.as_deref().unwrap_or(""),
            o.fields.title.as_deref().unwrap_or(""),
            o.fields.profile_url.as_deref().unwrap_or(""),
            o.fields.email.as_deref().unwrap_or(""),
            o.fields.message.as_deref().unwrap_or(""),
            o.status.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| LeadError::Processing {
        message: format!("CSV buffer flush failed: {e}"),
    })?;
    String::from_utf8(bytes).map_err(|e| LeadError::Processing {
        message: format!("CSV output was not valid UTF-8: {e}"),
    })
}

fn render_summary(outcome: &BatchOutcome) -> Result<String> {
    let summary = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "interrupted": outcome.interrupted,
        "summary": outcome.summary,
        "exported_records": outcome.outcomes.len(),
    });
    Ok(serde_json::to_string_pretty(&summary)?)
}

fn build_bundle(csv_data: &str, summary_data: &str) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(CSV_FILENAME, FileOptions::default())?;
    zip.write_all(csv_data.as_bytes())?;

    zip.start_file::<_, ()>(SUMMARY_FILENAME, FileOptions::default())?;
    zip.write_all(summary_data.as_bytes())?;

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
