use std::io::{self, Write};

use clap::ValueEnum;
use padwire_cipher::Text;
use padwire_peer::Role;
use serde::Serialize;

#[derive(Clone, Debug, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The result text and a newline.
    #[default]
    Raw,
    /// One `key=value` summary line.
    Pretty,
    Json,
}

#[derive(Serialize)]
struct ExchangeOutput<'a> {
    role: Role,
    responder: &'a str,
    message_len: usize,
    key_len: usize,
    result: &'a str,
}

/// What a finished `send` prints.
pub struct ExchangeReport<'a> {
    pub role: Role,
    pub responder: &'a str,
    pub message: &'a Text,
    pub key: &'a Text,
    pub result: &'a Text,
}

pub fn print_exchange(report: &ExchangeReport<'_>, format: OutputFormat) -> io::Result<()> {
    let mut out = io::stdout().lock();
    write_exchange(&mut out, report, format)?;
    out.flush()
}

pub fn write_exchange(
    out: &mut impl Write,
    report: &ExchangeReport<'_>,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Raw => writeln!(out, "{}", report.result),
        OutputFormat::Pretty => writeln!(
            out,
            "role={} responder={} message={} key={} result={}",
            report.role,
            report.responder,
            report.message.len(),
            report.key.len(),
            report.result
        ),
        OutputFormat::Json => {
            let body = ExchangeOutput {
                role: report.role,
                responder: report.responder,
                message_len: report.message.len(),
                key_len: report.key.len(),
                result: report.result.as_str(),
            };
            serde_json::to_writer(&mut *out, &body).map_err(io::Error::other)?;
            writeln!(out)
        }
    }
}

/// Write raw symbols followed by a newline.
pub fn print_line(text: &Text) -> io::Result<()> {
    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    out.write_all(b"\n")?;
    out.flush()
}
