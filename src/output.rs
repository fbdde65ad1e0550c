use anyhow::{Context, Result};
use chrono::Local;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::compatibility::format_label;
use crate::locations::MapReport;
use crate::matching::{DonorReport, MatchReport};

/// Supported report formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Html,
    Csv,
    Json,
    Tsv,
    All,
}

/// A report that can be laid out as a single table
pub trait TabularReport: Serialize {
    /// File name prefix, e.g. `matching_requests`
    fn file_stem(&self) -> &'static str;
    fn title(&self) -> String;
    fn headers(&self) -> Vec<&'static str>;
    fn rows(&self) -> Vec<Vec<String>>;
}

impl TabularReport for MatchReport {
    fn file_stem(&self) -> &'static str {
        "matching_requests"
    }

    fn title(&self) -> String {
        format!(
            "Requests donor {} ({}) can serve",
            self.donor_principal,
            format_label(self.donor_blood_group)
        )
    }

    fn headers(&self) -> Vec<&'static str> {
        vec![
            "id",
            "blood_group",
            "urgency",
            "requester",
            "location",
            "created_at",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.requests
            .iter()
            .map(|r| {
                vec![
                    r.id.clone(),
                    format_label(r.blood_group),
                    r.urgency.display_name().to_string(),
                    r.requester.clone(),
                    r.display_location().to_string(),
                    r.created_at_utc().to_rfc3339(),
                ]
            })
            .collect()
    }
}

impl TabularReport for DonorReport {
    fn file_stem(&self) -> &'static str {
        "donors"
    }

    fn title(&self) -> String {
        format!(
            "Available donors for {}",
            format_label(self.recipient_blood_group)
        )
    }

    fn headers(&self) -> Vec<&'static str> {
        vec!["principal", "name", "blood_group", "exact_match", "city"]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.donors
            .iter()
            .map(|d| {
                vec![
                    d.principal.clone(),
                    d.name.clone(),
                    format_label(d.blood_group),
                    d.exact_match.to_string(),
                    d.city.clone(),
                ]
            })
            .collect()
    }
}

impl TabularReport for MapReport {
    fn file_stem(&self) -> &'static str {
        "active_locations"
    }

    fn title(&self) -> String {
        format!(
            "Active locations: {} donors, {} requests",
            self.summary.donors, self.summary.requests
        )
    }

    fn headers(&self) -> Vec<&'static str> {
        vec![
            "title",
            "blood_group",
            "latitude",
            "longitude",
            "urgency",
            "status",
            "color",
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.markers
            .iter()
            .map(|m| {
                vec![
                    m.title.to_string(),
                    m.blood_group.clone(),
                    format!("{:.6}", m.latitude),
                    format!("{:.6}", m.longitude),
                    m.urgency.clone().unwrap_or_default(),
                    m.status.unwrap_or_default().to_string(),
                    m.color.to_string(),
                ]
            })
            .collect()
    }
}

/// Report generator for matching results
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: &Path) -> Result<Self> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
        }

        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Generate reports in the requested format(s), returning the written files
    pub fn generate<R: TabularReport>(&self, report: &R, format: ReportFormat) -> Result<Vec<PathBuf>> {
        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let base = format!("{}_{}", report.file_stem(), timestamp);

        let written = match format {
            ReportFormat::Html => vec![self.write_html(report, &base)?],
            ReportFormat::Csv => vec![self.write_delimited(report, &base, b',', "csv")?],
            ReportFormat::Tsv => vec![self.write_delimited(report, &base, b'\t', "tsv")?],
            ReportFormat::Json => vec![self.write_json(report, &base)?],
            ReportFormat::All => vec![
                self.write_html(report, &base)?,
                self.write_delimited(report, &base, b',', "csv")?,
                self.write_delimited(report, &base, b'\t', "tsv")?,
                self.write_json(report, &base)?,
            ],
        };

        for path in &written {
            info!("Wrote report {}", path.display());
        }

        Ok(written)
    }

    fn write_json<R: TabularReport>(&self, report: &R, base: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.json", base));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write JSON report to {}", path.display()))?;
        Ok(path)
    }

    fn write_delimited<R: TabularReport>(
        &self,
        report: &R,
        base: &str,
        delimiter: u8,
        extension: &str,
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.{}", base, extension));
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(&path)
            .with_context(|| format!("Failed to create writer for {}", path.display()))?;

        wtr.write_record(report.headers())?;
        for row in report.rows() {
            wtr.write_record(&row)?;
        }

        wtr.flush()?;
        Ok(path)
    }

    fn write_html<R: TabularReport>(&self, report: &R, base: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(format!("{}.html", base));
        fs::write(&path, render_html(report))
            .with_context(|| format!("Failed to write HTML report to {}", path.display()))?;
        Ok(path)
    }
}

fn render_html<R: TabularReport>(report: &R) -> String {
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let rows = report.rows();

    let header_cells: String = report
        .headers()
        .iter()
        .map(|h| format!("<th>{}</th>", escape_html(h)))
        .collect();

    let body = if rows.is_empty() {
        "<p>No results available.</p>".to_string()
    } else {
        let body_rows: String = rows
            .iter()
            .map(|row| {
                let cells: String = row
                    .iter()
                    .map(|c| format!("<td>{}</td>", escape_html(c)))
                    .collect();
                format!("<tr>{}</tr>\n", cells)
            })
            .collect();
        format!(
            "<table>\n<tr>{}</tr>\n{}</table>",
            header_cells, body_rows
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 40px; background-color: #f5f5f5; }}
        .container {{ max-width: 1200px; margin: 0 auto; background-color: white; padding: 30px; border-radius: 10px; }}
        table {{ width: 100%; border-collapse: collapse; margin: 20px 0; }}
        th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; }}
        th {{ background-color: #ef4444; color: white; }}
        tr:nth-child(even) {{ background-color: #f2f2f2; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>{title}</h1>
        <p>Generated on: {generated}</p>
        <p>{count} rows</p>
        {body}
    </div>
</body>
</html>"#,
        title = escape_html(&report.title()),
        generated = generated,
        count = rows.len(),
        body = body
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{DonorMatch, DonorReport};
    use crate::types::BloodGroup;
    use tempfile::TempDir;

    fn donor_report() -> DonorReport {
        DonorReport {
            recipient_blood_group: BloodGroup::BPositive,
            profiles_considered: 3,
            donors: vec![DonorMatch {
                principal: "p1".to_string(),
                name: "Tobi <admin>".to_string(),
                blood_group: BloodGroup::ONegative,
                exact_match: false,
                city: "Jos".to_string(),
            }],
        }
    }

    #[test]
    fn test_generate_all_formats() -> Result<()> {
        let dir = TempDir::new()?;
        let generator = ReportGenerator::new(&dir.path().join("reports"))?;

        let written = generator.generate(&donor_report(), ReportFormat::All)?;
        assert_eq!(written.len(), 4);
        for path in &written {
            assert!(path.exists());
        }

        let csv = fs::read_to_string(&written[1])?;
        assert!(csv.starts_with("principal,name,blood_group,exact_match,city"));
        assert!(csv.contains("p1,Tobi <admin>,O-,false,Jos"));

        let tsv = fs::read_to_string(&written[2])?;
        assert!(tsv.contains("p1\tTobi <admin>\tO-"));

        let html = fs::read_to_string(&written[0])?;
        assert!(html.contains("Available donors for B+"));
        assert!(html.contains("Tobi &lt;admin&gt;"));

        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&written[3])?)?;
        assert_eq!(json["recipient_blood_group"], "bPositive");
        Ok(())
    }

    #[test]
    fn test_format_from_config_text() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: ReportFormat,
        }
        let parsed: Wrapper = toml::from_str("format = \"tsv\"").unwrap();
        assert_eq!(parsed.format, ReportFormat::Tsv);
    }
}
