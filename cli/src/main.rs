//! texword CLI - LaTeX/Markdown to house-styled DOCX

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use texword::{
    assemble_json, restyle_docx, ConvertOptions, ConvertResult, Converter, Diagnostics,
    ReferenceLayout, RestyleOptions, StyleConfig,
};

#[derive(Parser)]
#[command(name = "texword")]
#[command(author = "texword contributors")]
#[command(version)]
#[command(about = "Convert LaTeX and Markdown manuscripts to house-styled Word documents", long_about = None)]
struct Cli {
    /// Input .tex or .md file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output .docx file (defaults to the input with a .docx extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,

    #[command(flatten)]
    convert: ConvertArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a manuscript to DOCX
    Convert {
        /// Input .tex or .md file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output .docx file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,

        #[command(flatten)]
        convert: ConvertArgs,
    },

    /// Apply house style to an existing DOCX
    Restyle {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output .docx file (defaults to <stem>_styled.docx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Build a DOCX from extracted content blocks (JSON)
    Assemble {
        /// JSON array of content blocks
        #[arg(value_name = "BLOCKS")]
        input: PathBuf,

        /// Output .docx file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Print the default style configuration as JSON
    Style,

    /// Show version information
    Version,
}

/// House-style overrides.
#[derive(Args, Clone, Default)]
struct StyleArgs {
    /// Style configuration JSON file (partial files override defaults)
    #[arg(long, value_name = "FILE")]
    style: Option<PathBuf>,

    /// Body font family
    #[arg(long)]
    font: Option<String>,

    /// Body font size in points
    #[arg(long, value_name = "PT")]
    font_size: Option<f32>,

    /// Line spacing multiplier
    #[arg(long, value_name = "N")]
    line_spacing: Option<f32>,

    /// Reference list spacing
    #[arg(long, value_enum)]
    reference_layout: Option<Layout>,
}

/// Conversion pipeline switches.
#[derive(Args, Clone, Default)]
struct ConvertArgs {
    /// Reference DOCX supplying base styles to the converter
    #[arg(long, value_name = "FILE")]
    reference_doc: Option<PathBuf>,

    /// Keep the working directory for inspection
    #[arg(long)]
    no_cleanup: bool,

    /// Page number footer instead of a running head
    #[arg(long)]
    no_running_head: bool,

    /// Leave display equations unnumbered
    #[arg(long)]
    no_equation_numbers: bool,

    /// Converter timeout in seconds
    #[arg(long, value_name = "SECS", default_value = "120")]
    timeout: u64,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// 1.5 line spacing, 3 pt after each entry
    Compact,
    /// Document line spacing, no extra space
    Document,
}

impl From<Layout> for ReferenceLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Compact => ReferenceLayout::Compact,
            Layout::Document => ReferenceLayout::Document,
        }
    }
}

impl StyleArgs {
    fn build(&self) -> texword::Result<StyleConfig> {
        let mut style = match &self.style {
            Some(path) => StyleConfig::from_json_file(path)?,
            None => StyleConfig::default(),
        };
        if let Some(font) = &self.font {
            style = style.with_font(font.clone());
        }
        if let Some(size) = self.font_size {
            style = style.with_font_size(size);
        }
        if let Some(spacing) = self.line_spacing {
            style = style.with_line_spacing(spacing);
        }
        if let Some(layout) = self.reference_layout {
            style = style.with_reference_layout(layout.into());
        }
        style.validate()?;
        Ok(style)
    }
}

impl ConvertArgs {
    fn options(&self, style: StyleConfig) -> ConvertOptions {
        let mut options = ConvertOptions::new()
            .with_style(style)
            .with_keep_work_dir(self.no_cleanup)
            .with_running_head(!self.no_running_head)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_restyle_options(
                RestyleOptions::new().with_equation_numbers(!self.no_equation_numbers),
            );
        if let Some(reference) = &self.reference_doc {
            options = options.with_reference_doc(reference.clone());
        }
        options
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            style,
            convert,
        }) => cmd_convert(&input, output.as_deref(), &style, &convert),
        Some(Commands::Restyle {
            input,
            output,
            style,
        }) => cmd_restyle(&input, output.as_deref(), &style),
        Some(Commands::Assemble {
            input,
            output,
            style,
        }) => cmd_assemble(&input, output.as_deref(), &style),
        Some(Commands::Style) => cmd_style(),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &cli.style, &cli.convert)
            } else {
                println!("{}", "Usage: texword <FILE> [-o OUTPUT]".yellow());
                println!("       texword --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    style: &StyleArgs,
    convert: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = convert.options(style.build()?);
    let converter = Converter::new();

    let pb = spinner(&format!("Converting {} with {}...", input.display(), converter.engine_name()));
    let result = converter.convert(input, output, &options);
    pb.finish_and_clear();
    let result = result?;

    print_summary(&result);
    print_diagnostics(&result.diagnostics);
    Ok(())
}

fn print_summary(result: &ConvertResult) {
    println!("{}", "Conversion complete".green().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Output".bold(), result.output.display());
    println!("{}: {:.1} KB", "Size".bold(), result.size_bytes as f64 / 1024.0);
    println!("{}: {}", "Source".bold(), result.format);
    if let Some(title) = &result.title {
        println!("{}: {}", "Running head".bold(), title);
    }

    let report = &result.report;
    println!(
        "{}: {} paragraphs, {} captions, {} tables, {} equations",
        "Styled".bold(),
        report.paragraphs_styled,
        report.captions_styled,
        report.tables_styled,
        report.equations_numbered
    );
    println!(
        "{}: {} figures, {} citations",
        "Normalized".bold(),
        result.figures_converted,
        result.citations_resolved
    );
    if let Some(dir) = &result.retained_work_dir {
        println!("{}: {}", "Work dir".bold(), dir.display());
    }
}

fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    println!("\n{} ({})", "Warnings".yellow().bold(), diagnostics.len());
    for diagnostic in diagnostics {
        println!("  {} {}", "•".dimmed(), diagnostic);
    }
}

fn cmd_restyle(
    input: &Path,
    output: Option<&Path>,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let style = style.build()?;
    let output = output.map(Path::to_path_buf).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        input.with_file_name(format!("{}_styled.docx", stem))
    });

    let report = restyle_docx(input, &output, &style, RestyleOptions::new())?;
    println!("{} {}", "Saved to".green(), output.display());
    println!(
        "  {} paragraphs, {} tables, {} residue removed",
        report.paragraphs_styled, report.tables_styled, report.residue_removed
    );
    print_diagnostics(&report.diagnostics);
    Ok(())
}

fn cmd_assemble(
    input: &Path,
    output: Option<&Path>,
    style: &StyleArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let style = style.build()?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("docx"));

    let json = fs::read_to_string(input)?;
    let assembled = assemble_json(&json, &output, &style)?;
    println!("{} {}", "Saved to".green(), output.display());
    println!(
        "  {} blocks placed, {} skipped",
        assembled.blocks_placed, assembled.blocks_skipped
    );
    print_diagnostics(&assembled.diagnostics);
    Ok(())
}

fn cmd_style() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&StyleConfig::default())?);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "texword".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Academic manuscript to DOCX converter");
    println!();
    println!("Requires: {} (conversion), {} (PDF figures)", "pandoc".bold(), "pdftoppm".bold());
    println!("License: MIT");
}
