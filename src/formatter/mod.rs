//! Output formatting for classification reports
//!
//! This module renders [`ErrorReport`]s and the kind/policy table:
//! - JSON formatting (compact and pretty-printed)
//! - One-line text summaries
//! - A table of every kind with its parent and policy

use colored_json::prelude::*;
use nu_ansi_term::{Color, Style};
use tabled::{Table, Tabled, settings::Style as TableStyle};

use crate::config::{DisplayConfig, OutputFormat};
use crate::error::Result;
use crate::taxonomy::{ErrorKind, ErrorReport, POLICY_TABLE};

/// Formatter for classification output
pub struct Formatter {
    /// Output format type
    format_type: OutputFormat,

    /// Enable colored output
    use_colors: bool,
}

/// One row of the kind table
#[derive(Tabled)]
struct KindRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Parent")]
    parent: String,
    #[tabled(rename = "Root")]
    root: String,
    #[tabled(rename = "Retryable")]
    retryable: bool,
    #[tabled(rename = "Topology refresh")]
    refresh: bool,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format_type` - Output format type
    /// * `use_colors` - Enable colored output
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            use_colors,
        }
    }

    /// Create a formatter from display configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.format, config.color_output)
    }

    /// Render one report
    pub fn format_report(&self, report: &ErrorReport) -> Result<String> {
        match self.format_type {
            OutputFormat::Json => Ok(report.to_json_compact()?),
            OutputFormat::JsonPretty => {
                let json_str = report.to_json()?;
                if self.use_colors {
                    Ok(json_str.to_colored_json_auto().unwrap_or(json_str))
                } else {
                    Ok(json_str)
                }
            }
            OutputFormat::Text => Ok(self.format_text(report)),
        }
    }

    /// Render every kind with its place in the hierarchy and its policy
    pub fn format_kinds(&self) -> String {
        let rows = POLICY_TABLE.iter().map(|(kind, policy)| KindRow {
            kind: indented_name(*kind),
            parent: kind.parent().map(|p| p.to_string()).unwrap_or_default(),
            root: kind.root().to_string(),
            retryable: policy.retryable,
            refresh: policy.triggers_topology_refresh,
        });

        Table::new(rows).with(TableStyle::rounded()).to_string()
    }

    fn format_text(&self, report: &ErrorReport) -> String {
        let line = report.to_string();
        if !self.use_colors {
            return line;
        }

        let kind = report.kind.to_string();
        let style = kind_style(report);
        match line.strip_prefix(kind.as_str()) {
            Some(rest) => format!("{}{rest}", style.paint(kind.as_str())),
            None => line,
        }
    }
}

/// Kind name indented by its depth in the hierarchy
fn indented_name(kind: ErrorKind) -> String {
    let depth = kind.ancestors().count() - 1;
    format!("{}{kind}", "  ".repeat(depth))
}

fn kind_style(report: &ErrorReport) -> Style {
    if report.triggers_topology_refresh {
        Color::Magenta.bold()
    } else if report.retryable {
        Color::Yellow.bold()
    } else {
        Color::Red.bold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{MongoError, ServerFailure};

    fn duplicate_key_report() -> ErrorReport {
        let err = MongoError::DuplicateKey(ServerFailure::new("dup", Some(11000), None));
        ErrorReport::from_error(&err)
    }

    #[test]
    fn test_compact_json_is_single_line() {
        let formatter = Formatter::new(OutputFormat::Json, true);
        let output = formatter.format_report(&duplicate_key_report()).unwrap();

        assert!(!output.contains('\n'));
        assert!(output.contains("\"kind\":\"DuplicateKeyError\""));
    }

    #[test]
    fn test_plain_text() {
        let formatter = Formatter::new(OutputFormat::Text, false);
        let output = formatter.format_report(&duplicate_key_report()).unwrap();

        assert_eq!(
            output,
            "DuplicateKeyError [11000 DuplicateKey]: dup (retryable: false, refresh: false)"
        );
    }

    #[test]
    fn test_colored_text_keeps_content() {
        let formatter = Formatter::new(OutputFormat::Text, true);
        let output = formatter.format_report(&duplicate_key_report()).unwrap();

        assert!(output.contains("DuplicateKeyError"));
        assert!(output.ends_with("(retryable: false, refresh: false)"));
    }

    #[test]
    fn test_kinds_table_lists_every_kind() {
        let table = Formatter::new(OutputFormat::Text, false).format_kinds();

        for kind in ErrorKind::ALL {
            assert!(table.contains(kind.name()), "missing {kind}");
        }
        assert!(table.contains("Topology refresh"));
    }

    #[test]
    fn test_indented_name() {
        assert_eq!(indented_name(ErrorKind::ClientError), "ClientError");
        assert_eq!(
            indented_name(ErrorKind::DuplicateKeyError),
            "    DuplicateKeyError"
        );
    }
}
