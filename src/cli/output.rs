// Text rendering of the derived view

use std::io::IsTerminal;

use crate::utils::{format_duration, format_timestamp, DurationFormat};
use crate::view::{ComputedTask, ComputedTimeslot, DerivedView};

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

const INDENT: usize = 2;
const MIN_NAME_WIDTH: usize = 12;
const UNNAMED: &str = "(unnamed)";

#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub show_timeslots: bool,
    pub use_color: bool,
    pub width: usize,
}

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    100
}

fn bold_if(text: &str, bold: bool) -> String {
    if bold {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Cut `text` to at most `width` characters, marking the cut with `..`
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(2);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("..");
    out
}

fn duration_text(secs: i64, format: &DurationFormat) -> String {
    format_duration(secs, format).unwrap_or_default()
}

fn task_label(task: &ComputedTask) -> String {
    let name = task.name.as_deref().unwrap_or(UNNAMED);
    if task.is_active {
        format!("{} (running)", name)
    } else {
        name.to_string()
    }
}

fn timeslot_line(ts: &ComputedTimeslot, format: &DurationFormat) -> String {
    let end = if ts.is_active {
        "now".to_string()
    } else {
        format_timestamp(Some(ts.end), "???")
    };
    format!(
        "[{}] {} - {}  {}",
        ts.id,
        format_timestamp(Some(ts.begin), "???"),
        end,
        duration_text(ts.duration, format)
    )
}

/// Render the task tree with durations and the grand total
pub fn format_task_tree(view: &DerivedView, format: &DurationFormat, options: &ListOptions) -> String {
    let roots = view.root_tasks();
    let unassigned = view.unassigned_timeslots();
    if roots.is_empty() && unassigned.is_empty() {
        return "No tasks.".to_string();
    }

    let rows: Vec<(usize, &ComputedTask)> = roots.iter().flat_map(|root| root.walk()).collect();
    let id_width = rows
        .iter()
        .map(|(_, t)| t.id.to_string().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let widest_label = rows
        .iter()
        .map(|(depth, t)| depth * INDENT + task_label(t).chars().count())
        .max()
        .unwrap_or(0);
    let available = options.width.saturating_sub(id_width + 14).max(MIN_NAME_WIDTH);
    let name_width = widest_label.clamp(4, available);

    let mut output = String::new();
    output.push_str(&format!("{:<id_width$} {:<name_width$} {}\n", "ID", "Task", "Duration"));
    output.push_str(&format!("{}\n", "-".repeat(id_width + name_width + 12)));

    for (depth, task) in &rows {
        let indent = " ".repeat(depth * INDENT);
        let label = truncate(&task_label(task), name_width.saturating_sub(indent.len()));
        let cell = format!("{}{}", indent, label);
        let line = format!(
            "{:<id_width$} {:<name_width$} {}",
            task.id,
            cell,
            duration_text(task.duration, format)
        );
        output.push_str(&bold_if(&line, task.is_active && options.use_color));
        output.push('\n');

        if options.show_timeslots {
            let slot_indent = " ".repeat(id_width + 1 + (depth + 1) * INDENT);
            for ts in &task.timeslots {
                output.push_str(&format!("{}{}\n", slot_indent, timeslot_line(ts, format)));
            }
        }
    }

    if !unassigned.is_empty() {
        output.push_str("\nUnassigned timeslots:\n");
        for ts in &unassigned {
            output.push_str(&format!("  {}\n", timeslot_line(ts, format)));
        }
    }

    output.push_str(&format!("\nTotal: {}", duration_text(view.total_duration(), format)));
    output
}

/// One-line summary of what is running
pub fn format_status(view: &DerivedView, format: &DurationFormat) -> String {
    let total = duration_text(view.total_duration(), format);
    match view.active_task() {
        Some(task) => {
            let ancestry: Vec<String> = view
                .ancestors(task.id)
                .iter()
                .rev()
                .filter_map(|id| view.task_list().iter().find(|t| t.id == *id))
                .map(|t| t.name.clone().unwrap_or_else(|| UNNAMED.to_string()))
                .collect();
            let name = task.name.as_deref().unwrap_or(UNNAMED);
            let path = if ancestry.is_empty() {
                name.to_string()
            } else {
                format!("{} > {}", ancestry.join(" > "), name)
            };
            format!(
                "Running: task {} ({}) for {}\nTotal: {}",
                task.id,
                path,
                duration_text(task.duration, format),
                total
            )
        }
        None => format!("No task is running.\nTotal: {}", total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::{Store, TaskRepo};

    fn options() -> ListOptions {
        ListOptions {
            show_timeslots: false,
            use_color: false,
            width: 100,
        }
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer name", 8), "a long..");
    }

    #[test]
    fn test_empty_tree() {
        let view = DerivedView::compute(&Store::new(), 0);
        assert_eq!(format_task_tree(&view, &DurationFormat::default(), &options()), "No tasks.");
    }

    #[test]
    fn test_tree_rendering() {
        let mut store = Store::new();
        let write = TaskRepo::add(&mut store, Some("Write".to_string()), None, 0);
        TaskRepo::stop(&mut store, write.id, 40_000);
        TaskRepo::add(&mut store, Some("Edit".to_string()), Some(write.id), 40_000);
        TaskRepo::add(&mut store, None, None, 70_000);

        let view = DerivedView::compute(&store, 70_000);
        let out = format_task_tree(&view, &DurationFormat::default(), &options());

        assert!(out.contains("Write"));
        assert!(out.contains("  Edit"));
        assert!(out.contains("(unnamed) (running)"));
        assert!(out.contains("1m10s"));
        assert!(out.ends_with("Total: 1m10s"));
        assert!(!out.contains(ANSI_BOLD));
    }

    #[test]
    fn test_tree_with_timeslots() {
        let mut store = Store::new();
        TaskRepo::add(&mut store, Some("Write".to_string()), None, 0);
        let view = DerivedView::compute(&store, 5_000);
        let opts = ListOptions {
            show_timeslots: true,
            ..options()
        };
        let out = format_task_tree(&view, &DurationFormat::default(), &opts);
        assert!(out.contains("[2]"));
        assert!(out.contains("- now  5s"));
    }

    #[test]
    fn test_status() {
        let mut store = Store::new();
        let a = TaskRepo::add(&mut store, Some("Book".to_string()), None, 0);
        TaskRepo::add(&mut store, Some("Chapter".to_string()), Some(a.id), 10_000);

        let view = DerivedView::compute(&store, 15_000);
        let status = format_status(&view, &DurationFormat::default());
        assert!(status.contains("Running: task 3 (Book > Chapter) for 5s"));
        assert!(status.ends_with("Total: 15s"));

        let view = DerivedView::compute(&Store::new(), 0);
        assert_eq!(format_status(&view, &DurationFormat::default()), "No task is running.\nTotal: 0s");
    }
}
