use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

use coursegen::cli::{Cli, Command, ScriptCommand, TocCommand};
use coursegen::service::ServiceConfig;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    coursegen::logging::init().context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = ServiceConfig::resolve(cli.toc_url.as_deref(), cli.script_url.as_deref());

    match cli.command {
        Command::Toc { command } => match command {
            TocCommand::Create(args) => {
                coursegen::toc::create(args, config)
                    .await
                    .context("toc create")?;
            }
            TocCommand::Start(args) => {
                coursegen::toc::start(args, config)
                    .await
                    .context("toc start")?;
            }
            TocCommand::Update(args) => {
                coursegen::toc::update(args, config)
                    .await
                    .context("toc update")?;
            }
            TocCommand::Show(args) => {
                coursegen::toc::show(args).context("toc show")?;
            }
            TocCommand::Subtopics(args) => {
                coursegen::toc::subtopics(args).context("toc subtopics")?;
            }
            TocCommand::Subnodes(args) => {
                coursegen::toc::subnodes(args).context("toc subnodes")?;
            }
        },
        Command::Script { command } => match command {
            ScriptCommand::Batch(args) => {
                coursegen::script::batch(args, config)
                    .await
                    .context("script batch")?;
            }
            ScriptCommand::Single(args) => {
                coursegen::script::single(args, config)
                    .await
                    .context("script single")?;
            }
        },
    }

    Ok(())
}
