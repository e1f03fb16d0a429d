//! Output formatting for the CLI.

use console::{style, StyledObject};
use indicatif::{ProgressBar, ProgressStyle};
use shop_sdk::commerce::checkout::OrderStatus;
use shop_sdk::commerce::search::Pagination;
use shop_sdk::data::{Notice, NoticeLevel, Notifier};

/// Output handler for CLI messages.
#[derive(Debug, Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Status line on stdout, tagged with a colored marker. Silent in JSON mode.
    fn line(&self, marker: StyledObject<&str>, msg: &str) {
        if !self.json {
            println!("{} {}", marker, msg);
        }
    }

    pub fn info(&self, msg: &str) {
        self.line(style("ℹ").blue(), msg);
    }

    pub fn success(&self, msg: &str) {
        self.line(style("✓").green(), msg);
    }

    /// Warnings go to stderr so `--json` output stays parseable.
    pub fn warn(&self, msg: &str) {
        if !self.json {
            eprintln!("{} {}", style("⚠").yellow(), msg);
        }
    }

    /// Print an error message. In JSON mode this is an `{"error": ...}` object.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// `  key: value`, keys dimmed.
    pub fn kv(&self, key: &str, value: &str) {
        if !self.json {
            println!("  {}: {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        self.line(style("  •").dim(), item);
    }

    pub fn table_row(&self, cols: &[&str], widths: &[usize]) {
        if self.json {
            return;
        }
        let formatted: Vec<String> = cols
            .iter()
            .zip(widths.iter())
            .map(|(col, width)| format!("{:width$}", truncate(col, *width), width = width))
            .collect();
        println!("  {}", formatted.join("  "));
    }

    /// Footer under a paged list, e.g. `Page 2 of 5 (41 items)  1 [2] 3 4 5`.
    pub fn pagination(&self, pagination: &Pagination) {
        if self.json || pagination.total == 0 {
            return;
        }
        let pages: Vec<String> = pagination
            .page_numbers(7)
            .into_iter()
            .map(|n| {
                if n == pagination.page {
                    style(format!("[{}]", n)).bold().to_string()
                } else {
                    n.to_string()
                }
            })
            .collect();
        println!(
            "\n  {} {}",
            style(format!(
                "Page {} of {} ({}-{} of {})",
                pagination.page,
                pagination.total_pages,
                pagination.start_item(),
                pagination.end_item(),
                pagination.total
            ))
            .dim(),
            pages.join(" ")
        );
    }

    /// Spinner shown while a request is in flight.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Notices from the SDK go to the terminal.
///
/// Error notices are only shown in verbose mode: the failed command returns
/// the same error and `main` prints it once.
impl Notifier for Output {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => self.success(&notice.message),
            NoticeLevel::Info => self.info(&notice.message),
            NoticeLevel::Warning => self.warn(&notice.message),
            NoticeLevel::Error => self.debug(&notice.message),
        }
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Colored order status.
pub fn status_badge(status: OrderStatus) -> String {
    let label = status.display_name();
    match status {
        OrderStatus::Completed => style(label).green().to_string(),
        OrderStatus::Pending => style(label).yellow().to_string(),
        OrderStatus::Paid | OrderStatus::Shipped => style(label).cyan().to_string(),
        OrderStatus::Cancelled | OrderStatus::Unknown => style(label).dim().to_string(),
    }
}

pub fn availability_badge(available: bool) -> String {
    if available {
        style("listed").green().to_string()
    } else {
        style("unlisted").dim().to_string()
    }
}
