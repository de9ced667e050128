//! Markdown assembly of classified Q&A records

use crate::config::DocumentConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use report_types::{Category, ClassifiedReport, QaRecord, ReportDocument};

const RULE: &str = "---";

static ANCHOR_SEPARATORS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\x{4e00}-\x{9fff}]+").expect("valid anchor regex")
});

static REPEATED_DASHES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-+").expect("valid dash regex")
});

/// Builds numbered Markdown documents from classified records
pub struct DocumentAssembler {
    config: DocumentConfig,
}

impl DocumentAssembler {
    pub fn new(config: DocumentConfig) -> Self {
        Self { config }
    }

    /// Document title for a period, with the company name when one is given
    pub fn title(&self, year: i64, quarter: i64, company_name: Option<&str>) -> String {
        match company_name.filter(|name| !name.is_empty()) {
            Some(company) => format!(
                "{} {} ({}Q{})",
                company, self.config.report_label, year, quarter
            ),
            None => format!("{} ({}Q{})", self.config.report_label, year, quarter),
        }
    }

    /// Render the document.
    ///
    /// Financial records come first as flat `## N.` sections. Every other
    /// non-empty category follows in fixed order as one `## N.` section
    /// with `### N.M` subsections. Empty categories take no number.
    pub fn assemble(
        &self,
        year: i64,
        quarter: i64,
        company_name: Option<&str>,
        classified: &ClassifiedReport,
    ) -> ReportDocument {
        let title = self.title(year, quarter, company_name);

        let mut lines: Vec<String> = vec![format!("# {}", title)];
        push_separator(&mut lines);

        if self.config.include_toc {
            lines.extend(self.table_of_contents(classified));
        }

        let mut section_number = 1;

        let financial = classified.get(Category::Financial);
        if !financial.is_empty() {
            for record in financial {
                push_entry(&mut lines, format!("## {}. {}", section_number, record.question), record);
                section_number += 1;
            }
            push_separator(&mut lines);
        }

        for (category, records) in sectioned(classified) {
            lines.push(format!("## {}. {}", section_number, category.section_title()));
            lines.push(String::new());

            for (index, record) in records.iter().enumerate() {
                let heading = format!("### {}.{} {}", section_number, index + 1, record.question);
                push_entry(&mut lines, heading, record);
            }

            section_number += 1;
        }

        push_separator(&mut lines);

        ReportDocument {
            title,
            body: lines.join("\n"),
        }
    }

    /// Table of contents lines, numbered exactly like the document body
    pub fn table_of_contents(&self, classified: &ClassifiedReport) -> Vec<String> {
        let mut lines = vec![format!("## {}", self.config.toc_title), String::new()];

        let mut section_number = 1;

        let financial = classified.get(Category::Financial);
        if !financial.is_empty() {
            for record in financial {
                lines.push(toc_link("", &format!("{}. {}", section_number, record.question)));
                section_number += 1;
            }
            lines.push(String::new());
        }

        for (category, records) in sectioned(classified) {
            lines.push(toc_link("", &format!("{}. {}", section_number, category.section_title())));

            for (index, record) in records.iter().enumerate() {
                let text = format!("{}.{} {}", section_number, index + 1, record.question);
                lines.push(toc_link("  ", &text));
            }

            section_number += 1;
        }

        lines.push(String::new());
        lines.push(RULE.to_string());
        lines.push(String::new());
        lines
    }
}

impl Default for DocumentAssembler {
    fn default() -> Self {
        Self::new(DocumentConfig::default())
    }
}

/// URL fragment for a heading: lowercase, punctuation and spaces folded to `-`
pub fn anchor_link(text: &str) -> String {
    let lowered = text.to_lowercase();
    let dashed = ANCHOR_SEPARATORS.replace_all(&lowered, "-");
    let collapsed = REPEATED_DASHES.replace_all(&dashed, "-");
    collapsed.trim_matches('-').to_string()
}

/// Replace literal `\n` escape sequences with line breaks
pub fn normalize_answer(answer: &str) -> String {
    answer.replace("\\n", "\n")
}

// Non-financial categories that have at least one record, in fixed order
fn sectioned(classified: &ClassifiedReport) -> impl Iterator<Item = (Category, &[QaRecord])> {
    classified
        .iter()
        .filter(|(category, records)| *category != Category::Financial && !records.is_empty())
}

fn push_entry(lines: &mut Vec<String>, heading: String, record: &QaRecord) {
    lines.push(heading);
    lines.push(String::new());
    lines.push(normalize_answer(&record.answer));
    push_separator(lines);
}

fn push_separator(lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(RULE.to_string());
    lines.push(String::new());
}

fn toc_link(indent: &str, text: &str) -> String {
    format!("{}- [{}](#{})", indent, text, anchor_link(text))
}
