use crate::cli::args::OutputFormat;
use crate::rpc::daemon::StatusReport;
use serde_json::{json, Map, Value};
use std::io::{self, Write};
use tabled::{Table, Tabled};

/// Column the status variable names are padded to
pub const STATUS_PADDING: usize = 36;

/// What the daemon said, in a shape the writers can render
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A return code, rendered as text after `Server returned:`
    Code { code: i64, text: String },
    /// Sensor values; `text` is the human-readable summary
    Reading {
        text: String,
        values: Vec<(&'static str, f64)>,
    },
    Status(StatusReport),
}

/// Result of dispatching one action
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Action label, e.g. `relay`
    pub action: &'static str,
    /// Human-readable description of the request
    pub request: String,
    pub reply: Reply,
    pub success: bool,
}

impl Outcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        if self.success {
            0
        } else {
            1
        }
    }

    /// Flattened name/value pairs for table and JSON output
    pub fn fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("action".to_string(), self.action.to_string()),
            ("request".to_string(), self.request.clone()),
            ("success".to_string(), self.success.to_string()),
        ];
        match &self.reply {
            Reply::Code { code, text } => {
                fields.push(("code".to_string(), code.to_string()));
                fields.push(("result".to_string(), text.clone()));
            }
            Reply::Reading { values, .. } => {
                fields.extend(values.iter().map(|(name, value)| (name.to_string(), value.to_string())));
            }
            Reply::Status(report) => {
                fields.extend(report.variables.iter().cloned());
            }
        }
        fields
    }
}

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_outcome(&mut self, outcome: &Outcome) -> Result<(), OutputError>;
    fn write_usage(&mut self, usage: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::ClientError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Local time in the format the daemon's own logs use
pub fn local_timestamp() -> String {
    chrono::Local::now().format("%Y %m %d %H %M %S").to_string()
}

/// Text lines for an outcome, each prefixed with `timestamp`
pub fn render_text(outcome: &Outcome, timestamp: &str) -> Vec<String> {
    match &outcome.reply {
        Reply::Code { text, .. } => vec![format!(
            "{} [Remote command] {}: Server returned: {}",
            timestamp, outcome.request, text
        )],
        Reply::Reading { text, .. } => vec![
            format!("{} [Remote command] {}", timestamp, outcome.request),
            format!("{} [Remote Command] Daemon Returned: {}", timestamp, text),
        ],
        Reply::Status(report) => {
            let mut lines = vec![format!(
                "{} [Remote command] {}: Daemon is active: {}",
                timestamp,
                outcome.request,
                if report.active { "Yes" } else { "No" }
            )];
            if report.active {
                lines.push("Parsing global variables...".to_string());
            }
            lines.extend(
                report
                    .variables
                    .iter()
                    .map(|(name, value)| format!("{:<width$} {}", name, value, width = STATUS_PADDING)),
            );
            lines
        }
    }
}

/// JSON document for an outcome
pub fn render_json(outcome: &Outcome) -> Value {
    let mut doc = Map::new();
    doc.insert("action".to_string(), json!(outcome.action));
    doc.insert("request".to_string(), json!(outcome.request));
    doc.insert("success".to_string(), json!(outcome.success));

    match &outcome.reply {
        Reply::Code { code, text } => {
            doc.insert("code".to_string(), json!(code));
            doc.insert("result".to_string(), json!(text));
        }
        Reply::Reading { values, .. } => {
            let readings: Map<String, Value> = values
                .iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect();
            doc.insert("result".to_string(), Value::Object(readings));
        }
        Reply::Status(report) => {
            doc.insert("active".to_string(), json!(report.active));
            let variables: Map<String, Value> = report
                .variables
                .iter()
                .map(|(name, value)| (name.clone(), json!(value)))
                .collect();
            doc.insert("variables".to_string(), Value::Object(variables));
        }
    }

    Value::Object(doc)
}

/// Console output writer
pub struct ConsoleWriter<W: Write = io::Stdout> {
    format: OutputFormat,
    quiet: bool,
    out: W,
    clock: fn() -> String,
}

impl ConsoleWriter {
    pub fn stdout(format: OutputFormat, quiet: bool) -> Self {
        Self::new(format, quiet, io::stdout())
    }
}

impl<W: Write> ConsoleWriter<W> {
    pub fn new(format: OutputFormat, quiet: bool, out: W) -> Self {
        Self {
            format,
            quiet,
            out,
            clock: local_timestamp,
        }
    }

    /// Replace the timestamp source
    pub fn with_clock(mut self, clock: fn() -> String) -> Self {
        self.clock = clock;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputWriter for ConsoleWriter<W> {
    fn write_outcome(&mut self, outcome: &Outcome) -> Result<(), OutputError> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            OutputFormat::Text => {
                let timestamp = (self.clock)();
                for line in render_text(outcome, &timestamp) {
                    writeln!(self.out, "{}", line)?;
                }
            }
            OutputFormat::Json => {
                let output = serde_json::to_string_pretty(&render_json(outcome))?;
                writeln!(self.out, "{}", output)?;
            }
            OutputFormat::Table => {
                let rows: Vec<FieldRow> = outcome
                    .fields()
                    .into_iter()
                    .map(|(field, value)| FieldRow { field, value })
                    .collect();
                writeln!(self.out, "{}", Table::new(rows))?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_usage(&mut self, usage: &str) -> Result<(), OutputError> {
        writeln!(self.out, "{}", usage.trim_end())?;
        self.out.flush()?;
        Ok(())
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}
