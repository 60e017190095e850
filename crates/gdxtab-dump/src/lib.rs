//! External dump-tool fallback for gdxtab
//!
//! Large sparse symbols can be pulled out of an exchange file by an external
//! dump utility (a black-box command that prints delimited text for one
//! symbol) instead of the in-process reader. This crate wraps that
//! invocation:
//!
//! - blocking subprocess with an explicit timeout (the tool has none itself)
//! - non-zero exit, nonempty error stream, timeout, or non-csv output all
//!   surface as recoverable [`GdxError::ExternalToolFailure`]
//! - unsupported hosts surface as [`GdxError::PlatformUnsupported`]
//!
//! The output is raw sparse rows only; densification always goes through
//! `gdxtab-core`, so fill and axis disambiguation stay uniform across paths.

use gdxtab_core::error::{GdxError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// One sparse row from the dump output: key tuple plus a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub keys: Vec<String>,
    pub value: f64,
}

/// Handle on the external dump utility.
#[derive(Debug, Clone)]
pub struct DumpTool {
    program: PathBuf,
}

impl DumpTool {
    /// Create a handle, gating on host support up front.
    pub fn new(program: impl Into<PathBuf>) -> Result<Self> {
        let os = std::env::consts::OS;
        if !matches!(os, "linux" | "macos" | "windows") {
            return Err(GdxError::PlatformUnsupported(os.to_string()));
        }
        Ok(DumpTool {
            program: program.into(),
        })
    }

    /// Dump one symbol from `exchange_file` as sparse rows.
    ///
    /// Blocking; the child is killed once `timeout` elapses.
    pub fn dump_symbol(
        &self,
        exchange_file: &Path,
        symbol: &str,
        timeout: Duration,
    ) -> Result<Vec<RawRow>> {
        tracing::debug!(program = %self.program.display(), symbol, "invoking dump tool");
        let mut child = Command::new(&self.program)
            .arg(exchange_file)
            .arg(format!("symb={symbol}"))
            .arg("format=csv")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain both pipes on reader threads while polling for exit. A child
        // emitting more than the OS pipe buffer would otherwise block on
        // write, never exit, and be killed at the deadline.
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(GdxError::ExternalToolFailure(format!(
                        "`{}` timed out after {timeout:?}",
                        self.program.display()
                    )));
                }
                None => std::thread::sleep(Duration::from_millis(10)),
            }
        };

        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;
        let stderr = String::from_utf8_lossy(&stderr);
        if !status.success() {
            return Err(GdxError::ExternalToolFailure(format!(
                "`{}` exited with {}: {}",
                self.program.display(),
                status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            return Err(GdxError::ExternalToolFailure(format!(
                "`{}` wrote to stderr: {}",
                self.program.display(),
                stderr.trim()
            )));
        }

        parse_rows(&String::from_utf8_lossy(&stdout))
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_reader(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    let buf = handle
        .join()
        .map_err(|_| GdxError::ExternalToolFailure("output reader thread panicked".to_string()))??;
    Ok(buf)
}

/// Parse the tool's delimited output into sparse rows.
///
/// The first line may be a header (no numeric final field); every other line
/// must end in a numeric value. Inconsistent key arity or a non-numeric data
/// line is a tool failure, not a panic.
pub fn parse_rows(text: &str) -> Result<Vec<RawRow>> {
    let mut rows: Vec<RawRow> = Vec::new();
    let mut arity: Option<usize> = None;

    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = split_fields(line);
        let value = fields.last().and_then(|f| f.trim().parse::<f64>().ok());
        let value = match value {
            Some(v) => v,
            None if lineno == 0 => continue, // header
            None => {
                return Err(GdxError::ExternalToolFailure(format!(
                    "non-csv output at line {}: {line:?}",
                    lineno + 1
                )))
            }
        };
        fields.pop();
        match arity {
            None => arity = Some(fields.len()),
            Some(expected) if expected != fields.len() => {
                return Err(GdxError::ExternalToolFailure(format!(
                    "inconsistent key arity at line {} (expected {expected}, got {})",
                    lineno + 1,
                    fields.len()
                )))
            }
            Some(_) => {}
        }
        rows.push(RawRow {
            keys: fields,
            value,
        });
    }

    Ok(rows)
}

/// Split one delimited line, honoring double quotes with `""` escapes.
fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
