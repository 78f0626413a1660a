use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::formats::{LearnerPath, ScriptType};
use crate::outline::DEFAULT_SCRIPT_MINUTES;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// TOC service base URL (default: $COURSEGEN_TOC_URL or http://127.0.0.1:3000).
    #[arg(long, global = true)]
    pub toc_url: Option<String>,

    /// Script service base URL (default: $COURSEGEN_SCRIPT_URL or http://127.0.0.1:3001).
    #[arg(long, global = true)]
    pub script_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Toc {
        #[command(subcommand)]
        command: TocCommand,
    },
    Script {
        #[command(subcommand)]
        command: ScriptCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum TocCommand {
    /// Generate a TOC and wait for it.
    Create(TocCreateArgs),
    /// Start a TOC generation in the background (results go to the callback URL).
    Start(TocStartArgs),
    /// Send a TOC update payload.
    Update(TocUpdateArgs),
    /// Show a saved TOC response as an outline table with a summary.
    Show(TocShowArgs),
    /// List the subtopics of a saved TOC response.
    Subtopics(SelectorListArgs),
    /// List the sub-nodes of a saved TOC response.
    Subnodes(SelectorListArgs),
}

#[derive(Debug, Subcommand)]
pub enum ScriptCommand {
    /// Generate scripts for selected subtopics or sub-nodes of a saved TOC.
    Batch(ScriptBatchArgs),
    /// Generate one script.
    Single(ScriptSingleArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SelectionLevel {
    Subtopic,
    Subnode,
}

#[derive(Debug, Clone, Args)]
pub struct CourseForm {
    #[arg(long, default_value = "proj_001")]
    pub project_id: String,

    #[arg(long, default_value = "q_001")]
    pub question_id: String,

    /// Course topic.
    #[arg(long, default_value = "Python Programming")]
    pub topic: String,

    /// Course duration in hours.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub course_hours: u32,

    #[arg(long, value_enum, default_value_t = LearnerPath::Professional)]
    pub learner_path: LearnerPath,

    #[arg(long, default_value = "Global")]
    pub regionality: String,

    /// Learning objectives, one per line.
    #[arg(
        long,
        default_value = "Master Python fundamentals\nBuild real-world applications"
    )]
    pub objectives: String,

    /// Requested subtopics, one per line.
    #[arg(long, default_value = "")]
    pub subtopics: String,

    #[arg(long, default_value = "No additional notes")]
    pub notes: String,
}

#[derive(Debug, Args)]
pub struct TocCreateArgs {
    #[command(flatten)]
    pub form: CourseForm,

    /// Save the service response (JSON) to this path.
    #[arg(long)]
    pub out: Option<String>,

    /// Overwrite `--out` if it exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct TocStartArgs {
    #[command(flatten)]
    pub form: CourseForm,

    /// Where the TOC service should deliver the result.
    #[arg(long)]
    pub callback_url: Option<String>,
}

#[derive(Debug, Args)]
pub struct TocUpdateArgs {
    /// JSON payload to forward to the update endpoint.
    #[arg(long)]
    pub payload: String,

    /// Save the service response (JSON) to this path.
    #[arg(long)]
    pub out: Option<String>,

    /// Overwrite `--out` if it exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct TocShowArgs {
    /// Saved TOC response (created by `toc create --out`).
    #[arg(long)]
    pub response: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Course length in hours (default: `course_metadata.course_hours`, else summed minutes).
    #[arg(long)]
    pub course_hours: Option<f64>,
}

#[derive(Debug, Args)]
pub struct SelectorListArgs {
    /// Saved TOC response (created by `toc create --out`).
    #[arg(long)]
    pub response: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Minutes used when an entry has no positive duration.
    #[arg(long, default_value_t = DEFAULT_SCRIPT_MINUTES, value_parser = clap::value_parser!(u32).range(1..))]
    pub default_duration: u32,
}

#[derive(Debug, Args)]
pub struct ScriptBatchArgs {
    /// Saved TOC response (created by `toc create --out`).
    #[arg(long)]
    pub response: String,

    /// Entry to generate a script for, by full number (`1.2`) or display name. Repeatable.
    #[arg(long = "select", required = true)]
    pub select: Vec<String>,

    #[arg(long, value_enum, default_value_t = SelectionLevel::Subtopic)]
    pub level: SelectionLevel,

    #[arg(long, default_value = "Pan India")]
    pub region: String,

    /// Learner's path (default: the course's learner path, else Professional).
    #[arg(long, value_enum)]
    pub learners_path: Option<LearnerPath>,

    /// Script type applied to every selected entry.
    #[arg(long, value_enum, default_value_t = ScriptType::SoloNarration)]
    pub script_type: ScriptType,

    /// Minutes used when an entry has no positive duration.
    #[arg(long, default_value_t = DEFAULT_SCRIPT_MINUTES, value_parser = clap::value_parser!(u32).range(1..))]
    pub default_duration: u32,

    /// Print the preview and the request payload without calling the service.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ScriptSingleArgs {
    #[arg(long)]
    pub sub_topic: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Script length in minutes.
    #[arg(long, default_value_t = DEFAULT_SCRIPT_MINUTES, value_parser = clap::value_parser!(u32).range(1..))]
    pub duration: u32,

    #[arg(long, default_value = "Pan India")]
    pub region: String,

    #[arg(long, value_enum, default_value_t = LearnerPath::Professional)]
    pub learners_path: LearnerPath,

    #[arg(long, value_enum, default_value_t = ScriptType::SoloNarration)]
    pub script_type: ScriptType,
}
