use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use crate::cli::OutputFormat;
use crate::scanner::ScanSummary;
use crate::services::ServiceLookup;

const COLUMN_WIDTH: usize = 9;

/// Render the verbose report for a scanned target.
///
/// ```text
/// Open ports for scanme.example (203.0.113.5)
/// PORT     SERVICE
/// 21       ftp
/// 80       http
/// ```
///
/// Without a name the title is just the address. Rows keep the order of
/// `open_ports`, and there is no trailing newline.
pub fn format_report(
    name: Option<&str>,
    ip: IpAddr,
    open_ports: &[u16],
    services: &dyn ServiceLookup,
) -> String {
    let mut report = match name {
        Some(name) if !name.is_empty() => format!("Open ports for {name} ({ip})"),
        _ => format!("Open ports for {ip}"),
    };

    report.push('\n');
    report.push_str(&format!("{:<width$}SERVICE", "PORT", width = COLUMN_WIDTH));

    for port in open_ports {
        report.push('\n');
        report.push_str(&format!(
            "{:<width$}{}",
            port,
            services.service_name(*port),
            width = COLUMN_WIDTH
        ));
    }

    report
}

/// Render a bare port list as `[22, 80]`.
pub fn format_ports(open_ports: &[u16]) -> String {
    format!("{open_ports:?}")
}

pub struct OutputWriter {
    format: OutputFormat,
    file: Option<PathBuf>,
    color: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, file: Option<PathBuf>, color: bool) -> Self {
        Self { format, file, color }
    }

    pub fn write(
        &self,
        summary: &ScanSummary,
        verbose: bool,
        services: &dyn ServiceLookup,
    ) -> Result<()> {
        let mut output = match self.format {
            OutputFormat::Human => self.format_human(summary, verbose, services),
            OutputFormat::Json => serde_json::to_string_pretty(summary)?,
        };
        output.push('\n');

        match &self.file {
            Some(path) => {
                let file = File::create(path)?;
                let mut writer = BufWriter::new(file);
                writer.write_all(output.as_bytes())?;
                writer.flush()?;
            }
            None => {
                print!("{output}");
                io::stdout().flush()?;
            }
        }

        Ok(())
    }

    fn format_human(
        &self,
        summary: &ScanSummary,
        verbose: bool,
        services: &dyn ServiceLookup,
    ) -> String {
        let ports = summary.ports();
        let text = if verbose {
            format_report(summary.resolved.label(), summary.resolved.ip, &ports, services)
        } else {
            format_ports(&ports)
        };

        // Files always get plain text.
        if !self.color || self.file.is_some() {
            return text;
        }

        let mut lines = text.lines();
        let mut colored_text = String::new();
        if let Some(first) = lines.next() {
            colored_text.push_str(&first.bright_green().bold().to_string());
        }
        for line in lines {
            colored_text.push('\n');
            colored_text.push_str(line);
        }
        colored_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::PortRange;
    use crate::services::ServiceTable;
    use crate::target::ResolvedTarget;
    use std::net::Ipv4Addr;

    const SCANME: IpAddr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 5));

    fn services() -> ServiceTable {
        ServiceTable::empty().with_entries([(21, "ftp"), (80, "http")])
    }

    #[test]
    fn test_report_with_name() {
        let report = format_report(Some("scanme.example"), SCANME, &[21, 80], &services());
        assert_eq!(
            report,
            "Open ports for scanme.example (203.0.113.5)\nPORT     SERVICE\n21       ftp\n80       http"
        );
    }

    #[test]
    fn test_report_without_name() {
        let report = format_report(None, SCANME, &[21], &services());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines, vec!["Open ports for 203.0.113.5", "PORT     SERVICE", "21       ftp"]);
    }

    #[test]
    fn test_report_unknown_service_and_no_ports() {
        let report = format_report(None, SCANME, &[31337], &services());
        assert!(report.ends_with("\n31337    "));

        let empty = format_report(Some("scanme.example"), SCANME, &[], &services());
        assert_eq!(empty, "Open ports for scanme.example (203.0.113.5)\nPORT     SERVICE");
    }

    #[test]
    fn test_format_ports() {
        assert_eq!(format_ports(&[22, 25]), "[22, 25]");
        assert_eq!(format_ports(&[]), "[]");
    }

    #[test]
    fn test_write_json_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.json");
        let table = services();
        let summary = ScanSummary::new(
            "scanme.example",
            ResolvedTarget {
                display_url: Some("https://scanme.example".to_string()),
                ip: SCANME,
                hostname: Some("scanme.example".to_string()),
            },
            PortRange::new(20, 90),
            vec![21, 80],
            &table,
            chrono::Utc::now(),
        );

        let writer = OutputWriter::new(OutputFormat::Json, Some(path.clone()), false);
        writer.write(&summary, false, &table).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["resolved"]["ip"], "203.0.113.5");
        assert_eq!(written["open_ports"][1]["port"], 80);
        assert_eq!(written["open_ports"][1]["service"], "http");
    }

    #[test]
    fn test_write_human_report_to_file_is_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.txt");
        let table = services();
        let summary = ScanSummary::new(
            "203.0.113.5",
            ResolvedTarget {
                display_url: None,
                ip: SCANME,
                hostname: None,
            },
            PortRange::new(20, 25),
            vec![21],
            &table,
            chrono::Utc::now(),
        );

        OutputWriter::new(OutputFormat::Human, Some(path.clone()), true)
            .write(&summary, true, &table)
            .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Open ports for 203.0.113.5\nPORT     SERVICE\n21       ftp\n"
        );
    }
}
