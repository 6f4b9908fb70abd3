use clap::{Parser, Subcommand};
use siteforge::compose::{Composition, Runner};
use siteforge::config::{self, Project};
use siteforge::reload::ReloadBus;
use siteforge::serve::DevSettings;
use siteforge::tasks::{self, TaskName};
use siteforge::{output, watch};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "siteforge")]
#[command(about = "Static-asset build pipeline with a live-reloading dev server")]
#[command(long_about = "\
Static-asset build pipeline with a live-reloading dev server

You edit the working tree; siteforge derives minified styles and scripts,
web-ready images, WOFF2 fonts, an SVG sprite and include-expanded pages next
to their sources, and `build` copies the deployable subset to the output tree.

Project structure:

  project/
  ├── siteforge.toml        # Optional config (see 'siteforge gen-config')
  ├── app/
  │   ├── pages/*.html      # Pages with <!--=include header.html -->
  │   ├── components/*      # Include fragments
  │   ├── scss/main.scss    # -> css/style.min.css
  │   ├── js/main.js        # -> js/main.min.js
  │   ├── images/src/*      # -> images/*.webp + optimized copies
  │   └── fonts/src/*.ttf   # -> fonts/*.woff2
  └── dist/                 # Written by 'siteforge build'

Run without a command to start the dev server and watchers.
Set RUST_LOG to adjust log verbosity.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Config file (defaults to <project>/siteforge.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the working tree, serve it and rebuild on change (default)
    Develop,
    /// Clean the output tree, then package the working tree into it
    Build,
    /// Compile, prefix and minify the stylesheet
    Styles,
    /// Concatenate and minify scripts
    Scripts,
    /// Convert and optimize images
    Images,
    /// Convert TrueType fonts to WOFF2
    Fonts,
    /// Combine SVG icons into one sprite
    Sprite,
    /// Expand include directives in pages
    Pages,
    /// Remove the output tree
    Clean,
    /// Copy allow-listed artifacts to the output tree
    Package,
    /// Print a stock siteforge.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let command = cli.command.unwrap_or(Command::Develop);
    if let Command::GenConfig = command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let pipeline = config::load_config(&cli.project, cli.config.as_deref())?;
    init_thread_pool(&pipeline.processing);
    let project = Project::new(&cli.project, pipeline);

    let single = match command {
        Command::Styles => Some(TaskName::Styles),
        Command::Scripts => Some(TaskName::Scripts),
        Command::Images => Some(TaskName::Images),
        Command::Fonts => Some(TaskName::Fonts),
        Command::Sprite => Some(TaskName::Sprite),
        Command::Pages => Some(TaskName::Pages),
        Command::Clean => Some(TaskName::Clean),
        Command::Package => Some(TaskName::Package),
        _ => None,
    };
    if let Some(task) = single {
        let report = tasks::run_task(task, &project)?;
        output::print_task_report(&report, &cli.project);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match command {
        Command::Build => {
            let dist_root = project.dist_root.clone();
            let runner = Arc::new(Runner::new(Arc::new(project)));
            runtime.block_on(Composition::build().run(runner.clone()))?;
            output::print_run(&runner.reports(), &cli.project);
            println!("==> Build complete: {}", dist_root.display());
        }
        _ => {
            let settings = DevSettings {
                root: project.app_root.clone(),
                addr: format!(
                    "{}:{}",
                    project.config.server.host, project.config.server.port
                ),
                bindings: watch::default_bindings(&project.config)?,
            };
            let runner = Arc::new(
                Runner::new(Arc::new(project))
                    .with_reload(ReloadBus::default())
                    .with_dev_server(settings),
            );
            runtime.block_on(Composition::develop().run(runner))?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Size the global rayon pool used by the images task.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
