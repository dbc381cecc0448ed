//! Terminal summary of a generation run
//!
//! # Example
//!
//! ```no_run
//! use bridgegen::{printer::ReportPrinter, GeneratorBuilder};
//!
//! let output = GeneratorBuilder::new("bridge").build().unwrap();
//! ReportPrinter::new(&output, true).print_to_stdout();
//! ```

use crate::builder::BuildOutput;
use crate::diagnostics::{codes, Diagnostic, DiagnosticSeverity};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Prints file counts, skipped items, stubs, warnings and errors
pub struct ReportPrinter<'a> {
    output: &'a BuildOutput,
    use_color: bool,
}

impl<'a> ReportPrinter<'a> {
    pub fn new(output: &'a BuildOutput, use_color: bool) -> Self {
        Self { output, use_color }
    }

    /// Print directly to stdout with colors
    pub fn print_to_stdout(&self) {
        let choice = if self.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        let mut stdout = StandardStream::stdout(choice);
        if let Err(e) = self.write_colored(&mut stdout) {
            eprintln!("Error printing summary: {}", e);
        }
    }

    /// Write with colors to a WriteColor implementor
    pub fn write_colored<W: WriteColor>(&self, w: &mut W) -> io::Result<()> {
        let output = self.output;
        let report = &output.report;

        w.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(w, "Generated")?;
        w.reset()?;
        writeln!(
            w,
            " {} API(s), {} type(s)",
            report.api_count, report.type_count
        )?;
        writeln!(
            w,
            "  {} C# file(s) in {}",
            output.csharp_files.len(),
            output.output_dir.display()
        )?;
        if !output.jslib_files.is_empty() {
            writeln!(
                w,
                "  {} jslib file(s) in {}",
                output.jslib_files.len(),
                output.jslib_dir.display()
            )?;
        }

        let skips = report.skip_counts();
        if !skips.is_empty() {
            w.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
            writeln!(w, "Skipped")?;
            w.reset()?;
            for (reason, count) in &skips {
                writeln!(w, "  {:>4}  {}", count, reason)?;
            }
        }

        let stubs = report.count_code(codes::STUB);
        if stubs > 0 {
            w.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(w, "Stubs")?;
            w.reset()?;
            writeln!(w, " {} unresolved type(s) emitted as empty classes", stubs)?;
        }

        for diagnostic in &report.diagnostics {
            self.write_diagnostic_colored(w, diagnostic)?;
        }

        if report.warning_count() > 0 || report.error_count() > 0 {
            writeln!(
                w,
                "{} warning(s), {} error(s)",
                report.warning_count(),
                report.error_count()
            )?;
        }
        Ok(())
    }

    fn write_diagnostic_colored<W: WriteColor>(
        &self,
        w: &mut W,
        diagnostic: &Diagnostic,
    ) -> io::Result<()> {
        let color = match diagnostic.severity {
            DiagnosticSeverity::Error => Color::Red,
            DiagnosticSeverity::Warning => Color::Yellow,
            // Stub infos are already summarized above
            DiagnosticSeverity::Info => return Ok(()),
        };
        w.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(w, "{}", diagnostic.severity.display())?;
        w.reset()?;
        writeln!(w, ": {}", self.location_suffix(diagnostic))
    }

    fn location_suffix(&self, diagnostic: &Diagnostic) -> String {
        match &diagnostic.file {
            Some(file) => format!("{} ({})", diagnostic.message, file.display()),
            None => diagnostic.message.clone(),
        }
    }
}

impl Display for ReportPrinter<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut buffer = termcolor::Buffer::no_color();
        self.write_colored(&mut buffer).map_err(|_| std::fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(buffer.as_slice()))
    }
}
