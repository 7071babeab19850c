//! Minecraft Model Preview CLI
//!
//! Render before/after previews of the entity models changed in a pull request.

use clap::{Parser, Subcommand};
use mc_model_preview::config::pack_prefix;
use mc_model_preview::pipeline::{
    ChangeSource, Commenter, ImageHost, LocalImages, PullRequestChanges, PullRequestCommenter,
    StaticChanges, StdoutCommenter,
};
use mc_model_preview::report::{escape_workflow_data, TracingReporter};
use mc_model_preview::{
    find_affected_entities, load_resource_pack, parse_resource_pack,
    ActionConfig, BlockbenchConfig, BlockbenchRenderer, Collaborators, GitBranchHost,
    GitHubClient, GitRepo, Pipeline, PipelineSettings, RepoSlug,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mc-model-preview")]
#[command(author, version, about = "Render before/after previews of Bedrock entity models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render previews for a pull request and comment them
    Run {
        /// Resource pack directory, relative to the workspace
        #[arg(short, long)]
        resource_pack: Option<PathBuf>,

        /// Repository checkout (defaults to GITHUB_WORKSPACE or the current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Repository as owner/name
        #[arg(long)]
        repo: Option<String>,

        /// Pull request number
        #[arg(long)]
        pr: Option<u64>,

        /// Base branch of the pull request
        #[arg(long)]
        base_ref: Option<String>,

        /// Head branch of the pull request
        #[arg(long)]
        head_ref: Option<String>,

        /// GitHub token
        #[arg(long)]
        token: Option<String>,

        /// Changed file, relative to the repository root (repeatable; skips the API listing)
        #[arg(short, long)]
        changed_file: Vec<String>,

        /// Blockbench release to render with
        #[arg(long, default_value = mc_model_preview::render::blockbench::DEFAULT_VERSION)]
        blockbench_version: String,

        /// Seconds allowed for one Blockbench invocation
        #[arg(long, default_value = "120")]
        render_timeout: u64,

        /// Scratch directory for projects, images and the image branch
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Print the comment instead of uploading images and posting it
        #[arg(long)]
        no_comment: bool,
    },

    /// List the entities of a resource pack
    Scan {
        /// Resource pack directory
        #[arg(short, long)]
        resource_pack: PathBuf,

        /// Only list entities affected by these pack-relative paths
        #[arg(short, long)]
        changed_file: Vec<String>,
    },
}

struct RunArgs {
    resource_pack: Option<PathBuf>,
    workspace: Option<PathBuf>,
    repo: Option<String>,
    pr: Option<u64>,
    base_ref: Option<String>,
    head_ref: Option<String>,
    token: Option<String>,
    changed_file: Vec<String>,
    blockbench_version: String,
    render_timeout: u64,
    work_dir: Option<PathBuf>,
    no_comment: bool,
}

fn setup_logging() {
    use tracing_subscriber::prelude::*;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,mc_model_preview=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .init();
}

fn main() -> ExitCode {
    setup_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            resource_pack,
            workspace,
            repo,
            pr,
            base_ref,
            head_ref,
            token,
            changed_file,
            blockbench_version,
            render_timeout,
            work_dir,
            no_comment,
        } => run(RunArgs {
            resource_pack,
            workspace,
            repo,
            pr,
            base_ref,
            head_ref,
            token,
            changed_file,
            blockbench_version,
            render_timeout,
            work_dir,
            no_comment,
        }),
        Commands::Scan {
            resource_pack,
            changed_file,
        } => scan(&resource_pack, &changed_file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("::error::{}", escape_workflow_data(&err.to_string()));
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> mc_model_preview::Result<()> {
    tracing::info!("Starting Minecraft Model Preview...");
    let reporter = TracingReporter::from_env();

    let mut config = ActionConfig::from_env()?;
    if args.resource_pack.is_some() {
        config.resource_pack = args.resource_pack;
    }
    if args.workspace.is_some() {
        config.workspace = args.workspace;
    }
    if let Some(repo) = args.repo {
        config.repo = Some(repo.parse::<RepoSlug>()?);
    }
    if args.pr.is_some() {
        config.pr_number = args.pr;
    }
    if args.base_ref.is_some() {
        config.base_ref = args.base_ref;
    }
    if args.head_ref.is_some() {
        config.head_ref = args.head_ref;
    }
    if args.token.is_some() {
        config.token = args.token;
    }

    let (base_ref, head_ref) = config.require_refs()?;
    let workspace = config.workspace_dir()?;
    let pack_dir = config.resource_pack_dir(&reporter)?;
    tracing::info!("Using resource pack path: {}", pack_dir.display());

    let work_dir = args
        .work_dir
        .unwrap_or_else(|| std::env::temp_dir().join("mc-model-preview"));
    let pr_number = if args.no_comment {
        config.pr_number.unwrap_or(0)
    } else {
        config.require_pr_number()?
    };

    let renderer = BlockbenchRenderer::new(BlockbenchConfig {
        version: args.blockbench_version,
        tool_dir: work_dir.join("blockbench"),
        work_dir: work_dir.join("render"),
        timeout: Duration::from_secs(args.render_timeout),
        ..Default::default()
    })?;

    let needs_api = args.changed_file.is_empty() || !args.no_comment;
    let client = if needs_api {
        Some(GitHubClient::new(config.require_token()?))
    } else {
        None
    };

    let static_changes = StaticChanges(args.changed_file);
    let pr_changes;
    let changes: &dyn ChangeSource = match &client {
        Some(client) if static_changes.0.is_empty() => {
            pr_changes = PullRequestChanges {
                client,
                repo: config.require_repo()?,
                number: config.require_pr_number()?,
            };
            &pr_changes
        }
        _ => &static_changes,
    };

    let branch_host;
    let pr_commenter;
    let (host, commenter): (&dyn ImageHost, &dyn Commenter) = match &client {
        Some(client) if !args.no_comment => {
            let repo = config.require_repo()?;
            branch_host = GitBranchHost::new(repo.clone(), config.require_token()?, work_dir.join("images-branch"));
            pr_commenter = PullRequestCommenter {
                client,
                repo,
                number: pr_number,
            };
            (&branch_host, &pr_commenter)
        }
        _ => (&LocalImages, &StdoutCommenter),
    };

    let checkout = GitRepo::new(&workspace);
    let settings = PipelineSettings {
        pack_prefix: pack_prefix(&workspace, &pack_dir),
        pack_dir,
        base_ref: base_ref.to_string(),
        head_ref: head_ref.to_string(),
        pr_number,
        work_dir,
    };

    let pipeline = Pipeline::new(
        settings,
        Collaborators {
            changes,
            checkout: &checkout,
            renderer: &renderer,
            host,
            commenter,
            reporter: &reporter,
        },
    );
    let summary = pipeline.run()?;
    tracing::info!(
        "Rendered {} of {} affected entities.",
        summary.rows.len(),
        summary.affected.len()
    );
    Ok(())
}

fn scan(resource_pack_path: &PathBuf, changed: &[String]) -> mc_model_preview::Result<()> {
    let reporter = TracingReporter::new();
    let pack = load_resource_pack(resource_pack_path, &reporter)?;
    println!("Resource pack: {} files", pack.file_count());

    let entities = parse_resource_pack(&pack, &reporter);
    let shown: Vec<_> = if changed.is_empty() {
        entities.iter().collect()
    } else {
        find_affected_entities(&entities, changed)
    };

    for entity in shown {
        println!("\n{} ({})", entity.identifier, entity.definition_path);
        for (label, files) in [
            ("geometry", &entity.geometry_files),
            ("textures", &entity.texture_files),
            ("animations", &entity.animation_files),
            ("materials", &entity.material_files),
        ] {
            if !files.is_empty() {
                println!("  {}: {}", label, files.join(", "));
            }
        }
    }
    Ok(())
}
