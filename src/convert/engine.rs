//! External conversion engines.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::detect::SourceFormat;
use crate::error::{Error, Result};

/// Default timeout for one engine run.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One source-to-DOCX conversion job.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Source file to convert
    pub input: PathBuf,

    /// DOCX file to produce
    pub output: PathBuf,

    /// Source format
    pub format: SourceFormat,

    /// Directory figures are resolved against
    pub resource_dir: PathBuf,

    /// Optional reference document supplying base styles
    pub reference_doc: Option<PathBuf>,

    /// Wall-clock limit
    pub timeout: Duration,
}

impl EngineRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, format: SourceFormat) -> Self {
        let input = input.into();
        let resource_dir = input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            input,
            output: output.into(),
            format,
            resource_dir,
            reference_doc: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resource_dir = dir.into();
        self
    }

    pub fn with_reference_doc(mut self, path: Option<PathBuf>) -> Self {
        self.reference_doc = path;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What an engine reports back besides the output file.
#[derive(Debug, Clone, Default)]
pub struct EngineOutput {
    /// Non-empty stderr lines
    pub warnings: Vec<String>,
}

/// A tool that turns a source file into a DOCX package.
///
/// Implementations must fail when the tool exits unsuccessfully, times out,
/// or leaves no (or an empty) output file.
pub trait ConversionEngine {
    /// Short name for log messages.
    fn name(&self) -> &str;

    /// Fail with [`Error::MissingDependency`] if the engine cannot run.
    fn check_available(&self) -> Result<()>;

    /// Run one conversion.
    fn convert(&self, request: &EngineRequest) -> Result<EngineOutput>;
}

/// Engine backed by the `pandoc` executable.
#[derive(Debug, Clone)]
pub struct PandocEngine {
    program: PathBuf,
}

impl PandocEngine {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("pandoc"),
        }
    }

    /// Builder: use a specific executable.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Command-line arguments for a request.
    pub fn arguments(&self, request: &EngineRequest) -> Vec<String> {
        let mut args = vec![
            request.input.display().to_string(),
            "-o".to_string(),
            request.output.display().to_string(),
            "-f".to_string(),
            request.format.as_pandoc_format().to_string(),
            "-t".to_string(),
            "docx".to_string(),
            "--wrap=none".to_string(),
            "--resource-path".to_string(),
            request.resource_dir.display().to_string(),
        ];
        if let Some(reference) = &request.reference_doc {
            args.push("--reference-doc".to_string());
            args.push(reference.display().to_string());
        }
        args
    }
}

impl Default for PandocEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionEngine for PandocEngine {
    fn name(&self) -> &str {
        "pandoc"
    }

    fn check_available(&self) -> Result<()> {
        which::which(&self.program)
            .map(|_| ())
            .map_err(|_| Error::MissingDependency(format!("{} is not installed", self.program.display())))
    }

    fn convert(&self, request: &EngineRequest) -> Result<EngineOutput> {
        let args = self.arguments(request);
        log::debug!("Running {} {}", self.program.display(), args.join(" "));

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    Error::MissingDependency(format!("{} is not installed", self.program.display()))
                }
                _ => Error::Io(e),
            })?;

        let (status, stderr) = wait_with_timeout(child, request.timeout)?;
        if !status.success() {
            return Err(Error::ConverterFailed {
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        check_output(&request.output)?;
        Ok(EngineOutput {
            warnings: stderr
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect(),
        })
    }
}

/// Fail with [`Error::MissingOutput`] unless `path` is a non-empty file.
pub fn check_output(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(Error::MissingOutput(path.to_path_buf())),
    }
}

/// Wait for `child`, killing it once `timeout` elapses.
///
/// Stderr is drained on a separate thread so a chatty child cannot block on
/// a full pipe.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<(ExitStatus, String)> {
    let reader = child.stderr.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(Error::ConverterTimeout(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::Io(e));
            }
        }
    };

    let stderr = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok((status, stderr))
}
