use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::cli::error::{task_id_or_exit, timeslot_id_or_exit, user_error};
use crate::cli::output::{format_status, format_task_tree, get_terminal_width, is_tty, ListOptions};
use crate::db::{load_snapshot, Config, FileStore, Persister, STORAGE_KEY};
use crate::tracker::Tracker;
use crate::utils::{format_timestamp, seconds_to_display_duration, time_to_timestamp};

#[derive(Parser)]
#[command(name = "tasktimer")]
#[command(about = "Hierarchical task timer - start/stop timers on nested tasks and see accumulated durations")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task and start timing it
    Add {
        /// Nest the new task under this task
        #[arg(long)]
        parent: Option<String>,
        /// Task name (may be empty)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Rename a task
    Rename {
        /// Task ID
        id: String,
        /// New name (empty clears the name)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        name: Vec<String>,
    },
    /// Move a task under another task
    Move {
        /// Task ID to move
        id: String,
        /// New parent task ID
        parent: String,
    },
    /// Move a task to root level
    Root {
        /// Task ID
        id: String,
    },
    /// Start timing a task (stops whatever is running)
    Start {
        /// Task ID
        id: String,
    },
    /// Stop timing a task
    Stop {
        /// Task ID (optional, defaults to the running task)
        id: Option<String>,
    },
    /// Delete a task, its sub-tasks and their timeslots
    Remove {
        /// Task ID
        id: String,
        /// Delete without confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Delete a task's own timeslots
    Reset {
        /// Task ID
        id: String,
    },
    /// Delete all tasks and timeslots
    Clear {
        /// Clear without confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Timeslot commands
    Slot {
        #[command(subcommand)]
        subcommand: SlotCommands,
    },
    /// Show the task tree with durations
    List {
        /// Show each task's timeslots
        #[arg(long)]
        slots: bool,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the running task and the total
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum SlotCommands {
    /// Change when a timeslot began
    Begin {
        /// Timeslot ID
        id: String,
        /// Clock time today, e.g. 09:30
        time: String,
    },
    /// Change when a timeslot ended
    End {
        /// Timeslot ID
        id: String,
        /// Clock time today, e.g. 17:45
        time: String,
    },
    /// Delete a timeslot
    Remove {
        /// Timeslot ID
        id: String,
        /// Delete without confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Hand a timeslot to another task
    Assign {
        /// Timeslot ID
        id: String,
        /// Task ID
        task: String,
    },
    /// Move a timeslot into a new sub-task of its task
    Split {
        /// Timeslot ID
        id: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    handle_command(cli)
}

fn handle_command(cli: Cli) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let mut tracker = open_tracker(&config);

    match cli.command {
        Commands::Add { parent, name } => handle_add(&mut tracker, parent, name),
        Commands::Rename { id, name } => handle_rename(&mut tracker, id, name),
        Commands::Move { id, parent } => handle_move(&mut tracker, id, parent),
        Commands::Root { id } => handle_root(&mut tracker, id),
        Commands::Start { id } => handle_start(&mut tracker, id),
        Commands::Stop { id } => handle_stop(&mut tracker, &config, id),
        Commands::Remove { id, yes } => handle_remove(&mut tracker, id, yes),
        Commands::Reset { id } => handle_reset(&mut tracker, id),
        Commands::Clear { yes } => handle_clear(&mut tracker, yes),
        Commands::Slot { subcommand } => handle_slot(&mut tracker, subcommand),
        Commands::List { slots, json } => handle_list(&mut tracker, &config, slots, json),
        Commands::Status { json } => handle_status(&mut tracker, &config, json),
    }
}

/// Load the stored state and wire up persistence
fn open_tracker(config: &Config) -> Tracker {
    let storage = FileStore::new(&config.data_location);
    let store = load_snapshot(&storage, STORAGE_KEY).unwrap_or_default();
    let mut tracker = Tracker::with_system_clock(store);
    tracker.subscribe(Persister::new(storage, STORAGE_KEY));
    tracker
}

fn join_name(words: Vec<String>) -> Option<String> {
    let name = words.join(" ");
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}

fn task_name(tracker: &Tracker, id: i64) -> String {
    tracker
        .store()
        .task(id)
        .and_then(|t| t.name.clone())
        .unwrap_or_else(|| format!("task {}", id))
}

fn require_task(tracker: &Tracker, id: i64) {
    if !tracker.store().has_task(id) {
        user_error(&format!("Task {} not found", id));
    }
}

fn require_timeslot(tracker: &Tracker, id: i64) {
    if tracker.store().timeslot(id).is_none() {
        user_error(&format!("Timeslot {} not found", id));
    }
}

/// e.g. "Remove 09:00 - 10:30 of Write?"
fn slot_removal_question(tracker: &Tracker, id: i64) -> String {
    let timeslot = tracker.store().timeslot(id);
    let owner = timeslot
        .and_then(|ts| ts.task_id)
        .map(|task_id| task_name(tracker, task_id))
        .unwrap_or_else(|| "unassigned time".to_string());
    format!(
        "Remove {} - {} of {}?",
        format_timestamp(timeslot.map(|ts| ts.begin), "???"),
        format_timestamp(timeslot.map(|ts| ts.effective_end(tracker.now())), "???"),
        owner
    )
}

/// Ask a yes/no question on stderr; anything but y/yes declines
fn confirm(question: &str) -> Result<bool> {
    eprint!("{} [y/N]: ", question);
    io::stderr().flush().context("Failed to flush stderr")?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).context("Failed to read input")?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn handle_add(tracker: &mut Tracker, parent: Option<String>, name: Vec<String>) -> Result<()> {
    let parent_id = parent.as_deref().map(task_id_or_exit);
    if let Some(parent_id) = parent_id {
        require_task(tracker, parent_id);
    }

    let task = tracker.add_task(join_name(name), parent_id)?;
    match &task.name {
        Some(name) => println!("Created task {}: {} (timing started)", task.id, name),
        None => println!("Created task {} (timing started)", task.id),
    }
    Ok(())
}

fn handle_rename(tracker: &mut Tracker, id: String, name: Vec<String>) -> Result<()> {
    let id = task_id_or_exit(&id);
    require_task(tracker, id);
    tracker.rename_task(id, join_name(name))?;
    println!("Renamed task {}", id);
    Ok(())
}

fn handle_move(tracker: &mut Tracker, id: String, parent: String) -> Result<()> {
    let id = task_id_or_exit(&id);
    let parent_id = task_id_or_exit(&parent);
    require_task(tracker, id);
    require_task(tracker, parent_id);

    if tracker.reparent_task(id, parent_id)? {
        println!("Moved task {} under task {}", id, parent_id);
        return Ok(());
    }

    if id == parent_id {
        user_error("A task cannot be its own parent");
    }
    if tracker.store().task(id).and_then(|t| t.parent_id) == Some(parent_id) {
        println!("Task {} is already under task {}", id, parent_id);
        return Ok(());
    }
    log::warn!("Rejected moving task {} under task {}", id, parent_id);
    user_error(&format!(
        "Cannot move task {} under task {}: task {} is nested inside task {}",
        id, parent_id, parent_id, id
    ));
}

fn handle_root(tracker: &mut Tracker, id: String) -> Result<()> {
    let id = task_id_or_exit(&id);
    require_task(tracker, id);
    if tracker.unparent_task(id)? {
        println!("Moved task {} to root level", id);
    } else {
        println!("Task {} is already at root level", id);
    }
    Ok(())
}

fn handle_start(tracker: &mut Tracker, id: String) -> Result<()> {
    let id = task_id_or_exit(&id);
    require_task(tracker, id);
    let previous = tracker.view().active_task().map(|t| t.id);

    if !tracker.start_task(id)? {
        println!("Task {} is already running", id);
        return Ok(());
    }
    if let Some(previous) = previous.filter(|p| *p != id) {
        println!("Stopped timing task {}", previous);
    }
    println!("Started timing task {}: {}", id, task_name(tracker, id));
    Ok(())
}

fn handle_stop(tracker: &mut Tracker, config: &Config, id: Option<String>) -> Result<()> {
    let id = match id {
        Some(id) => task_id_or_exit(&id),
        None => match tracker.view().active_task() {
            Some(task) => task.id,
            None => user_error("No task is currently running"),
        },
    };
    require_task(tracker, id);

    if !tracker.stop_task(id)? {
        user_error(&format!("Task {} is not running", id));
    }
    let duration = tracker.view().task_duration(id);
    println!(
        "Stopped timing task {}: {} (total {})",
        id,
        task_name(tracker, id),
        seconds_to_display_duration(duration, &config.duration_format.parts)
    );
    Ok(())
}

fn handle_remove(tracker: &mut Tracker, id: String, yes: bool) -> Result<()> {
    let id = task_id_or_exit(&id);
    require_task(tracker, id);

    if !yes && !confirm(&format!("Delete {}?", task_name(tracker, id)))? {
        println!("Cancelled.");
        return Ok(());
    }
    tracker.remove_task(id)?;
    println!("Deleted task {}", id);
    Ok(())
}

fn handle_reset(tracker: &mut Tracker, id: String) -> Result<()> {
    let id = task_id_or_exit(&id);
    require_task(tracker, id);
    tracker.reset_task(id)?;
    println!("Reset task {}", id);
    Ok(())
}

fn handle_clear(tracker: &mut Tracker, yes: bool) -> Result<()> {
    if !yes && !confirm("Remove all tasks?")? {
        println!("Cancelled.");
        return Ok(());
    }
    tracker.clear_all()?;
    println!("Removed all tasks.");
    Ok(())
}

fn parse_time_or_exit(time: &str) -> i64 {
    match time_to_timestamp(time) {
        Ok(ts) => ts,
        Err(e) => {
            log::warn!("Rejected time input '{}': {}", time, e);
            user_error(&e.to_string())
        }
    }
}

fn handle_slot(tracker: &mut Tracker, subcommand: SlotCommands) -> Result<()> {
    match subcommand {
        SlotCommands::Begin { id, time } => {
            let id = timeslot_id_or_exit(&id);
            require_timeslot(tracker, id);
            let timestamp = parse_time_or_exit(&time);
            tracker.change_timeslot_begin(id, timestamp)?;
            println!("Timeslot {} now begins at {}", id, format_timestamp(Some(timestamp), "???"));
        }
        SlotCommands::End { id, time } => {
            let id = timeslot_id_or_exit(&id);
            require_timeslot(tracker, id);
            let timestamp = parse_time_or_exit(&time);
            tracker.change_timeslot_end(id, timestamp)?;
            println!("Timeslot {} now ends at {}", id, format_timestamp(Some(timestamp), "???"));
        }
        SlotCommands::Remove { id, yes } => {
            let id = timeslot_id_or_exit(&id);
            require_timeslot(tracker, id);
            if !yes {
                if !confirm(&slot_removal_question(tracker, id))? {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            tracker.remove_timeslot(id)?;
            println!("Removed timeslot {}", id);
        }
        SlotCommands::Assign { id, task } => {
            let id = timeslot_id_or_exit(&id);
            let task_id = task_id_or_exit(&task);
            require_timeslot(tracker, id);
            require_task(tracker, task_id);
            tracker.reassign_timeslot(id, task_id)?;
            println!("Timeslot {} now belongs to task {}", id, task_id);
        }
        SlotCommands::Split { id } => {
            let id = timeslot_id_or_exit(&id);
            require_timeslot(tracker, id);
            if let Some(task) = tracker.timeslot_to_new_task(id)? {
                println!("Moved timeslot {} to new task {}", id, task.id);
            }
        }
    }
    Ok(())
}

fn handle_list(tracker: &mut Tracker, config: &Config, slots: bool, json: bool) -> Result<()> {
    tracker.tick()?;
    let view = tracker.view();

    if json {
        let output = serde_json::json!({
            "tasks": view.root_tasks(),
            "unassigned": view.unassigned_timeslots(),
            "totalDuration": view.total_duration(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let options = ListOptions {
        show_timeslots: slots,
        use_color: is_tty(),
        width: get_terminal_width(),
    };
    println!("{}", format_task_tree(view, &config.duration_format, &options));
    Ok(())
}

fn handle_status(tracker: &mut Tracker, config: &Config, json: bool) -> Result<()> {
    tracker.tick()?;
    let view = tracker.view();

    if json {
        let output = serde_json::json!({
            "activeTask": view.active_task(),
            "title": view.title(&config.duration_format),
            "totalDuration": view.total_duration(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", format_status(view, &config.duration_format));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::Store;
    use crate::tracker::ManualClock;

    #[test]
    fn test_slot_removal_question() {
        let mut store = Store::new();
        let orphan = store.create_timeslot(None, 0);
        let mut tracker = Tracker::new(store, ManualClock::new(60_000));
        let task = tracker.add_task(Some("Write".to_string()), None).unwrap();

        let question = slot_removal_question(&tracker, orphan.id + 2);
        assert!(question.starts_with("Remove "));
        assert!(question.ends_with(" of Write?"));
        assert_eq!(task.id, orphan.id + 1);

        let question = slot_removal_question(&tracker, orphan.id);
        assert!(question.ends_with(" of unassigned time?"));
        assert!(!question.contains("???"));
    }
}
