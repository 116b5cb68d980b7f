//! quizpdf CLI - printable quiz generator

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use quizpdf::{
    export, generate_all, get_available_templates, load_quizzes, BubbleStyle, ExportFormat,
    LayoutOptions, PageSize, Quiz, TemplateKind, TemplateOverrides,
};

#[derive(Parser)]
#[command(name = "quizpdf")]
#[command(version)]
#[command(about = "Generate quiz, answer-key and worksheet PDFs from quiz JSON", long_about = None)]
struct Cli {
    /// Input quiz JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one document
    #[command(alias = "gen")]
    Generate {
        /// Input quiz JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (quiz-YYYY-MM-DD.<ext> if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Template to use
        #[arg(short, long, value_enum, default_value = "student")]
        template: TemplateArg,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pdf")]
        format: FormatArg,

        #[command(flatten)]
        select: QuizSelection,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Generate the student quiz, answer key and practice sheet
    All {
        /// Input quiz JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        select: QuizSelection,
    },

    /// List the available templates
    Templates,

    /// Show quiz information
    Info {
        /// Input quiz JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct QuizSelection {
    /// Index of the quiz in a library file
    #[arg(long, default_value = "0")]
    quiz: usize,

    /// Paper size: a4, letter or WxH in millimetres
    #[arg(long, default_value = "a4", env = "QUIZPDF_PAGE_SIZE")]
    page_size: String,
}

#[derive(Args)]
struct OverrideArgs {
    /// Highlight correct answers
    #[arg(long)]
    show_answers: Option<bool>,

    /// Show points per question and totals
    #[arg(long)]
    show_points: Option<bool>,

    /// Show question difficulty
    #[arg(long)]
    show_difficulty: Option<bool>,

    /// Answer marker style
    #[arg(long, value_enum)]
    bubble: Option<BubbleArg>,

    /// Document subtitle
    #[arg(long)]
    name: Option<String>,

    /// JSON file with template overrides
    #[arg(long, value_name = "FILE")]
    overrides: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TemplateArg {
    /// Student quiz with empty bubbles
    Student,
    /// Teacher answer key
    AnswerKey,
    /// Practice worksheet with answer lines
    Practice,
}

impl From<TemplateArg> for TemplateKind {
    fn from(arg: TemplateArg) -> Self {
        match arg {
            TemplateArg::Student => TemplateKind::StudentQuiz,
            TemplateArg::AnswerKey => TemplateKind::AnswerKey,
            TemplateArg::Practice => TemplateKind::PracticeSheet,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Pdf,
    Json,
    Text,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Pdf => ExportFormat::Pdf,
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Text => ExportFormat::Text,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum BubbleArg {
    Circle,
    Filled,
    None,
}

impl From<BubbleArg> for BubbleStyle {
    fn from(arg: BubbleArg) -> Self {
        match arg {
            BubbleArg::Circle => BubbleStyle::Circle,
            BubbleArg::Filled => BubbleStyle::Filled,
            BubbleArg::None => BubbleStyle::None,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Generate {
            input,
            output,
            template,
            format,
            select,
            overrides,
        }) => cmd_generate(&input, output.as_deref(), template, format, &select, &overrides),
        Some(Commands::All {
            input,
            output,
            select,
        }) => cmd_all(&input, output.as_deref(), &select),
        Some(Commands::Templates) => {
            cmd_templates();
            Ok(())
        }
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: student quiz if input is provided
            if let Some(input) = cli.input {
                let select = QuizSelection {
                    quiz: 0,
                    page_size: "a4".to_string(),
                };
                let overrides = OverrideArgs {
                    show_answers: None,
                    show_points: None,
                    show_difficulty: None,
                    bubble: None,
                    name: None,
                    overrides: None,
                };
                cmd_generate(
                    &input,
                    cli.output.as_deref(),
                    TemplateArg::Student,
                    FormatArg::Pdf,
                    &select,
                    &overrides,
                )
            } else {
                println!("{}", "Usage: quizpdf <FILE> [OUTPUT]".yellow());
                println!("       quizpdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_quiz(input: &Path, index: usize) -> Result<Quiz, Box<dyn std::error::Error>> {
    let mut quizzes = load_quizzes(input)?;
    log::debug!("Loaded {} quizzes from {}", quizzes.len(), input.display());
    if index >= quizzes.len() {
        return Err(format!(
            "quiz index {} out of range ({} quizzes in {})",
            index,
            quizzes.len(),
            input.display()
        )
        .into());
    }
    Ok(quizzes.swap_remove(index))
}

fn layout_options(select: &QuizSelection) -> Result<LayoutOptions, Box<dyn std::error::Error>> {
    let size: PageSize = select.page_size.parse()?;
    Ok(LayoutOptions::new().with_page_size(size))
}

fn build_overrides(args: &OverrideArgs) -> Result<TemplateOverrides, Box<dyn std::error::Error>> {
    let mut overrides = match &args.overrides {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => TemplateOverrides::new(),
    };
    if let Some(show) = args.show_answers {
        overrides = overrides.with_show_answers(show);
    }
    if let Some(show) = args.show_points {
        overrides = overrides.with_show_points(show);
    }
    if let Some(show) = args.show_difficulty {
        overrides = overrides.with_show_difficulty(show);
    }
    if let Some(bubble) = args.bubble {
        overrides = overrides.with_bubble_style(bubble.into());
    }
    if let Some(ref name) = args.name {
        overrides = overrides.with_name(name.clone());
    }
    Ok(overrides)
}

fn cmd_generate(
    input: &Path,
    output: Option<&Path>,
    template: TemplateArg,
    format: FormatArg,
    select: &QuizSelection,
    overrides: &OverrideArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let quiz = load_quiz(input, select.quiz)?;
    for problem in quiz.validate() {
        println!("{} {}", "Warning:".yellow(), problem);
    }

    let builder = quizpdf::QuizPdf::new()
        .with_template(template.into())
        .with_overrides(build_overrides(overrides)?)
        .with_options(layout_options(select)?);
    let result = builder.export(&quiz, format.into())?;

    let path = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(&result.file_name));
    result.save(&path)?;

    println!(
        "{} {} ({} pages, {} questions)",
        "Saved to".green(),
        path.display(),
        result.metadata.page_count,
        result.metadata.question_count
    );
    Ok(())
}

fn cmd_all(
    input: &Path,
    output: Option<&Path>,
    select: &QuizSelection,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(TemplateKind::ALL.len() as u64 + 1);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Laying out documents...");
    let quiz = load_quiz(input, select.quiz)?;
    let results = generate_all(&quiz, &layout_options(select)?);
    pb.inc(1);

    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let mut written = Vec::new();
    for (kind, doc) in results {
        pb.set_message(format!("Writing {}...", kind));
        let doc = doc?;
        let result = export(&doc, ExportFormat::Pdf)?;
        let filename = format!("{}-{}.pdf", stem, kind);
        result.save(output_dir.join(&filename))?;
        written.push((filename, doc.page_count()));
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    let last = written.len().saturating_sub(1);
    for (i, (filename, pages)) in written.iter().enumerate() {
        let branch = if i == last { "└─" } else { "├─" };
        println!("  {} {} ({} pages)", branch.dimmed(), filename, pages);
    }

    Ok(())
}

fn cmd_templates() {
    println!("{}", "Available Templates".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (kind, template) in TemplateKind::ALL.iter().zip(get_available_templates()) {
        println!("{} ({})", template.name.bold(), kind.to_string().dimmed());
        println!("  {}", template.description);
    }
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let quizzes = load_quizzes(input)?;

    println!("{}", "Quiz Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Quizzes".bold(), quizzes.len());

    for (index, quiz) in quizzes.iter().enumerate() {
        let summary = quiz.summary();
        println!();
        println!("{} {}", format!("[{}]", index).dimmed(), quiz.title().bold());
        if let Some(ref id) = quiz.test_id {
            println!("  {}: {}", "ID".bold(), id);
        }
        println!("  {}: {}", "Questions".bold(), summary.question_count);
        println!("  {}: {}", "Total points".bold(), summary.total_points);
        println!("  {}: {}", "Difficulty".bold(), summary.dominant_difficulty);

        let problems = quiz.validate();
        if !problems.is_empty() {
            println!("  {}: {}", "Problems".yellow().bold(), problems.len());
            for problem in problems {
                println!("    {} {}", "-".dimmed(), problem);
            }
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "quizpdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Printable quiz generator");
    println!();
    println!("License: MIT");
}
