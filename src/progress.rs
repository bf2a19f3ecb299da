//! Terminal implementations of the executor callbacks

use anyhow::{Context, Result};
use colored::Colorize;
use declarative::{ApplyResult, ChangeAction, ConfirmCallback, ProgressCallback};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Progress bar over the changes being applied
pub struct BarProgress {
    bar: Option<ProgressBar>,
    verbose: bool,
}

impl BarProgress {
    pub fn new(verbose: bool) -> Self {
        Self { bar: None, verbose }
    }
}

/// Symbol shown next to an instance once it has been applied
pub fn result_symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "○",
        ApplyResult::Created
        | ApplyResult::Modified
        | ApplyResult::Replaced
        | ApplyResult::Removed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

impl ProgressCallback for BarProgress {
    fn on_batch_start(&mut self, count: usize) {
        let bar = ProgressBar::new(count as u64);
        match ProgressStyle::default_bar().template(BAR_TEMPLATE) {
            Ok(style) => bar.set_style(style.progress_chars("=>-")),
            Err(e) => log::debug!("Falling back to default progress style: {}", e),
        }
        self.bar = Some(bar);
    }

    fn on_resource_start(&mut self, address: &str, action: ChangeAction) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("{} {}", action.symbol(), address));
        }
    }

    fn on_resource_complete(&mut self, address: &str, result: &ApplyResult) {
        let Some(bar) = &self.bar else {
            return;
        };
        bar.set_message(format!("{} {}", result_symbol(result), address));
        bar.inc(1);

        match result {
            ApplyResult::Failed { error } => bar.suspend(|| {
                println!("  {} {} ({})", "✗".red(), address, error);
            }),
            other if self.verbose => bar.suspend(|| {
                println!("  {} {}", result_symbol(other).green(), address);
            }),
            _ => {}
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Interactive confirmation on the terminal
pub struct PromptConfirm;

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .context("Failed to read confirmation")
    }
}
