use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};

use crate::anchors::AnchorSet;

const DEFAULT_TARGET: &str = "index.html";
const DEFAULT_SOURCE: &str = "welcome-temp.html";

#[derive(Debug, Parser)]
#[command(
    name = "welcome-merge",
    version,
    about = "Merge the welcome overlay page into the main index page."
)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Document that receives the welcome overlay. Overwritten unless --output is given.
    #[arg(long, env = "WELCOME_MERGE_TARGET", default_value = DEFAULT_TARGET)]
    pub target: PathBuf,

    /// Standalone welcome page the style, markup and script fragments come from.
    #[arg(long, env = "WELCOME_MERGE_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: PathBuf,

    /// Write the merged document here instead of overwriting the target.
    #[arg(long, env = "WELCOME_MERGE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// TOML file overriding any of the built-in anchors.
    #[arg(long, env = "WELCOME_MERGE_ANCHORS")]
    pub anchors: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every merge step in memory and report, without writing anything.
    Check,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target_path: PathBuf,
    pub source_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub anchors: AnchorSet,
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Apply,
    Check,
}

impl Config {
    pub fn from_cli() -> Result<Self> {
        let cli = Cli::parse();
        Config::from_parts(cli.common, cli.command)
    }

    fn from_parts(common: CommonArgs, command: Option<Command>) -> Result<Self> {
        let source = resolve(&common.source);
        if source == resolve(&common.target) {
            return Err(anyhow!(
                "source and target must be different files (both resolve to {})",
                source.display()
            ));
        }

        if common.output.as_deref().map(resolve) == Some(source) {
            return Err(anyhow!("output must not overwrite the source document"));
        }

        let anchors = match &common.anchors {
            Some(path) => AnchorSet::load(path)
                .with_context(|| format!("invalid anchors: {}", path.display()))?,
            None => AnchorSet::default(),
        };

        let mode = match command {
            Some(Command::Check) => Mode::Check,
            None => Mode::Apply,
        };

        Ok(Self {
            target_path: common.target,
            source_path: common.source,
            output_path: common.output,
            anchors,
            mode,
        })
    }

    /// Where the merged document is written.
    pub fn destination(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(self.target_path.as_path())
    }
}

/// Absolute form of `path` for identity checks. The file itself may not
/// exist yet (an output path), so the parent directory is resolved instead;
/// failing that, `.` components are dropped.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(full) = fs::canonicalize(path) {
        return full;
    }
    if let Some(name) = path.file_name() {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        if let Ok(dir) = fs::canonicalize(parent) {
            return dir.join(name);
        }
    }
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
