use std::{io::Write as _, path::PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "skinforge", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a design JSON into a skin directory.
    Compile(CompileArgs),
    /// List the measure catalog.
    Measures(MeasuresArgs),
    /// List the fonts found in a directory.
    Fonts(FontsArgs),
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Input design JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory the skin folder is created in.
    #[arg(long, required_unless_present = "print")]
    out_dir: Option<PathBuf>,

    /// Font directory used to resolve text layer fonts.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Emit mouse-wheel resize actions regardless of the design setting.
    #[arg(long)]
    scroll_resize: bool,

    /// Print the compiled skin text to stdout.
    #[arg(long)]
    print: bool,
}

#[derive(Parser, Debug)]
struct MeasuresArgs {
    /// Only list measures for this layer kind.
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
}

#[derive(Parser, Debug)]
struct FontsArgs {
    /// Directory to scan for .ttf/.otf files.
    #[arg(long)]
    dir: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Text,
    Image,
    Rotator,
    Bar,
    Shape,
}

impl From<KindArg> for skinforge::LayerKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Text => Self::Text,
            KindArg::Image => Self::Image,
            KindArg::Rotator => Self::Rotator,
            KindArg::Bar => Self::Bar,
            KindArg::Shape => Self::Shape,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Measures(args) => cmd_measures(args),
        Command::Fonts(args) => cmd_fonts(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let doc = skinforge::DesignDocument::from_path(&args.in_path)
        .with_context(|| format!("load design '{}'", args.in_path.display()))?;

    let fonts = match &args.fonts {
        Some(dir) => skinforge::FontCache::scan_dir(dir),
        None => skinforge::FontCache::default(),
    };
    let mut options = doc.export_options();
    options.allow_scroll_resize |= args.scroll_resize;
    let snapshot = doc.snapshot();

    if args.print {
        let compiled = skinforge::compile(&snapshot, &doc.metadata, &options, &fonts)?;
        std::io::stdout()
            .write_all(compiled.text.as_bytes())
            .context("write skin text to stdout")?;
    }

    if let Some(out_dir) = &args.out_dir {
        let report = skinforge::export_skin(out_dir, &snapshot, &doc.metadata, &options, &fonts)?;
        for name in &report.skipped_layers {
            eprintln!("skipped layer {name}: no usable measure");
        }
        for font in &report.fonts_skipped {
            eprintln!("font {font} not found in font directory");
        }
        eprintln!(
            "wrote {} ({} fonts, {} images)",
            report.ini_path.display(),
            report.fonts_copied.len(),
            report.images_copied.len()
        );
    }
    Ok(())
}

fn cmd_measures(args: MeasuresArgs) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    for entry in skinforge::measures::all_measures() {
        if let Some(kind) = args.kind
            && entry.kind != skinforge::LayerKind::from(kind)
        {
            continue;
        }
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            entry.id,
            entry.kind,
            entry.category.as_str(),
            entry.label,
            entry.preview
        )?;
    }
    Ok(())
}

fn cmd_fonts(args: FontsArgs) -> anyhow::Result<()> {
    let cache = skinforge::FontCache::scan_dir(&args.dir);
    let mut out = std::io::stdout().lock();
    for entry in &cache.entries {
        writeln!(out, "{}\t{}", entry.display_name, entry.file_name)?;
    }
    Ok(())
}
