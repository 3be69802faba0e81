use std::fmt;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::anchors::AnchorSet;
use crate::config::{Config, Mode};
use crate::fragments::{self, GREETING_MARKUP};
use crate::splice::{Cursor, Document, SpliceError, insert_at};

/// The five edits, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Styles,
    Overlay,
    Greeting,
    Script,
    StartupHook,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::Styles,
        Step::Overlay,
        Step::Greeting,
        Step::Script,
        Step::StartupHook,
    ];

    pub fn done_message(self) -> &'static str {
        match self {
            Step::Styles => "welcome styles integrated",
            Step::Overlay => "welcome overlay markup integrated",
            Step::Greeting => "user greeting added to home screen",
            Step::Script => "welcome script integrated",
            Step::StartupHook => "startup hook now checks for an existing session",
        }
    }

    pub fn apply(
        self,
        content: &str,
        source: &str,
        anchors: &AnchorSet,
    ) -> Result<String, SpliceError> {
        match self {
            Step::Styles => inject_styles(content, source, anchors),
            Step::Overlay => inject_overlay(content, source, anchors),
            Step::Greeting => inject_greeting(content, anchors),
            Step::Script => inject_script(content, source, anchors),
            Step::StartupHook => hook_startup(content, anchors),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Styles => "styles",
            Step::Overlay => "overlay",
            Step::Greeting => "greeting",
            Step::Script => "script",
            Step::StartupHook => "startup hook",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub steps: Vec<Step>,
    pub original_len: usize,
    pub merged_len: usize,
}

#[derive(Debug, Clone)]
pub struct Merged {
    pub content: String,
    pub report: MergeReport,
}

pub fn inject_styles(
    content: &str,
    source: &str,
    anchors: &AnchorSet,
) -> Result<String, SpliceError> {
    let styles = Cursor::new(source, Step::Styles, Document::Source).between(
        &anchors.style_start,
        &anchors.style_end,
        0,
    )?;
    let at =
        Cursor::new(content, Step::Styles, Document::Target).find(&anchors.target_style_end)?;
    debug!("styles: {} bytes inserted at {at}", styles.len());
    Ok(insert_at(content, at, &["\n", styles, "\n"]))
}

pub fn inject_overlay(
    content: &str,
    source: &str,
    anchors: &AnchorSet,
) -> Result<String, SpliceError> {
    let overlay = Cursor::new(source, Step::Overlay, Document::Source).between(
        &anchors.overlay_start,
        &anchors.overlay_end,
        anchors.overlay_retain(),
    )?;
    let at = Cursor::new(content, Step::Overlay, Document::Target).find(&anchors.body_open)?
        + anchors.body_open.len();
    debug!("overlay: {} bytes inserted at {at}", overlay.len());
    Ok(insert_at(content, at, &[overlay, "\n\n"]))
}

pub fn inject_greeting(content: &str, anchors: &AnchorSet) -> Result<String, SpliceError> {
    let target = Cursor::new(content, Step::Greeting, Document::Target);
    let paragraph = target.find(&anchors.greeting_after)?;
    let close =
        target.find_from(&anchors.greeting_close, paragraph + anchors.greeting_after.len())?;
    let at = close + anchors.greeting_close.len();
    debug!("greeting: inserted at {at}");
    Ok(insert_at(content, at, &[GREETING_MARKUP, "\n"]))
}

pub fn inject_script(
    content: &str,
    source: &str,
    anchors: &AnchorSet,
) -> Result<String, SpliceError> {
    let script = Cursor::new(source, Step::Script, Document::Source).between(
        &anchors.script_start,
        &anchors.script_end,
        0,
    )?;
    let (adapted, hits) = fragments::adapt_script(script);
    for (name, count) in hits {
        if count == 0 {
            warn!("script rewrite `{name}` matched nothing; fragment kept as is");
        }
    }
    let at =
        Cursor::new(content, Step::Script, Document::Target).rfind(&anchors.target_script_end)?;
    debug!("script: {} bytes inserted at {at}", adapted.len());
    Ok(insert_at(content, at, &["\n", adapted.as_str(), "\n"]))
}

pub fn hook_startup(content: &str, anchors: &AnchorSet) -> Result<String, SpliceError> {
    let target = Cursor::new(content, Step::StartupHook, Document::Target);
    let hook = target.find(&anchors.startup_hook)?;
    let open = target.find_from(&anchors.startup_open, hook)?;
    let line_end = target.find_from("\n", open + anchors.startup_open.len())?;
    let at = line_end + 1;
    debug!("startup hook: entry call inserted at {at}");
    Ok(insert_at(content, at, &[anchors.entry_call.as_str()]))
}

/// Runs all five steps over `target`, calling `on_step` after each one.
/// Stops at the first missing anchor.
pub fn merge(
    target: &str,
    source: &str,
    anchors: &AnchorSet,
    mut on_step: impl FnMut(Step),
) -> Result<Merged, SpliceError> {
    let mut content = target.to_owned();
    let mut steps = Vec::with_capacity(Step::ALL.len());
    for step in Step::ALL {
        content = step.apply(&content, source, anchors)?;
        steps.push(step);
        on_step(step);
    }
    let report = MergeReport {
        steps,
        original_len: target.len(),
        merged_len: content.len(),
    };
    Ok(Merged { content, report })
}

pub fn run(config: &Config) -> Result<MergeReport> {
    let target = read_document(&config.target_path)?;
    let source = read_document(&config.source_path)?;

    let merged = merge(&target, &source, &config.anchors, |step| {
        println!("✅ {}", step.done_message());
    })
    .with_context(|| {
        format!(
            "failed to merge {} into {}",
            config.source_path.display(),
            config.target_path.display()
        )
    })?;

    match config.mode {
        Mode::Apply => {
            let destination = config.destination();
            write_document(destination, &merged.content)?;
            info!(
                "wrote {} ({} -> {} bytes)",
                destination.display(),
                merged.report.original_len,
                merged.report.merged_len
            );
            println!();
            println!("🎉 Merge completed");
            println!("📄 {} has been updated", destination.display());
            println!(
                "🔍 Open {} in a browser to try the welcome overlay",
                destination.display()
            );
        }
        Mode::Check => {
            println!();
            println!(
                "check passed: all {} steps apply cleanly ({} -> {} bytes), nothing written",
                merged.report.steps.len(),
                merged.report.original_len,
                merged.report.merged_len
            );
        }
    }

    Ok(merged.report)
}

pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Replaces `path` atomically with `content`, keeping the permissions of
/// the file it replaces.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write merged content for {}", path.display()))?;
    if let Ok(existing) = fs::metadata(path) {
        file.as_file()
            .set_permissions(existing.permissions())
            .with_context(|| format!("failed to copy permissions of {}", path.display()))?;
    }
    file.as_file()
        .sync_all()
        .with_context(|| format!("failed to flush merged content for {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}
