// SPDX-License-Identifier: MIT
// cli/ui.rs — `taskd ui` terminal client.
//
// Renders the current task list and translates user input into API calls
// against a running backend.
//
// Usage:
//   taskd ui                 # connect to the configured api_base_url
//   TASKD_API_URL=... taskd ui

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write as IoWrite};
use tracing::warn;

use crate::cli::client::ApiClient;
use crate::config::ServerConfig;
use crate::store::{Task, TaskPatch};

/// Entry point for `taskd ui`.
pub async fn run_ui(config: &ServerConfig) -> Result<()> {
    let client = ApiClient::new(&config.api_base_url)?;

    println!("Task Manager — {}", client.base_url());
    println!("Backend status: Checking…");

    // Health and task list are fetched concurrently on startup, joined
    // independently: a failed health check does not block the list.
    let pb = spinner("Loading tasks…");
    let (health, list) = tokio::join!(client.health(), client.list_tasks());
    pb.finish_and_clear();

    let status_line = match health {
        Ok(h) => format!("{} - {}", h.status, h.message),
        Err(e) => {
            warn!(err = %e, "health check failed");
            "Error - Cannot connect to backend".to_string()
        }
    };

    let mut tasks: Vec<Task> = match list {
        Ok(list) => list.data,
        Err(e) => {
            warn!(err = %e, "failed to fetch tasks");
            alert("Failed to connect to backend API");
            Vec::new()
        }
    };

    loop {
        render(&status_line, &tasks);
        let line = prompt("add <title> | toggle <id> | refresh | quit > ")?;
        let input = line.trim();

        if let Some(title) = input.strip_prefix("add ").or_else(|| input.strip_prefix("a ")) {
            // Local guard: empty or whitespace-only input sends no request.
            if title.trim().is_empty() {
                continue;
            }
            add_task(&client, &mut tasks, title).await;
        } else if let Some(arg) = input
            .strip_prefix("toggle ")
            .or_else(|| input.strip_prefix("t "))
        {
            let Ok(id) = arg.trim().parse::<u64>() else {
                println!("not a task id: {arg}");
                continue;
            };
            toggle_task(&client, &mut tasks, id).await;
        } else {
            match input {
                "refresh" | "r" => refresh_tasks(&client, &mut tasks).await,
                "quit" | "q" | "exit" => break,
                "" => {}
                other => println!("unknown command: {other}"),
            }
        }
    }

    Ok(())
}

/// Send a create request and append the returned record to local state.
async fn add_task(client: &ApiClient, tasks: &mut Vec<Task>, title: &str) {
    let pb = spinner("Adding task…");
    let result = client.create_task(title).await;
    pb.finish_and_clear();

    match result {
        Ok(task) => tasks.push(task),
        Err(e) => {
            warn!(err = %e, "failed to add task");
            alert("Failed to add task");
        }
    }
}

/// Flip `completed` on the task with the given id and replace the local
/// record with the server's response.
///
/// Failures here are only logged — the list is left as it was.
async fn toggle_task(client: &ApiClient, tasks: &mut [Task], id: u64) {
    let Some(task) = tasks.iter().find(|t| t.id == id) else {
        println!("no task with id {id}");
        return;
    };
    let patch = TaskPatch {
        completed: Some(!task.completed),
        ..TaskPatch::default()
    };

    let pb = spinner("Updating task…");
    let result = client.update_task(id, &patch).await;
    pb.finish_and_clear();

    match result {
        Ok(updated) => {
            if let Some(slot) = tasks.iter_mut().find(|t| t.id == id) {
                *slot = updated;
            }
        }
        Err(e) => warn!(err = %e, "failed to update task"),
    }
}

/// Re-fetch the full list from the backend.
async fn refresh_tasks(client: &ApiClient, tasks: &mut Vec<Task>) {
    let pb = spinner("Loading tasks…");
    let result = client.list_tasks().await;
    pb.finish_and_clear();

    match result {
        Ok(list) => *tasks = list.data,
        Err(e) => {
            warn!(err = %e, "failed to fetch tasks");
            alert("Failed to connect to backend API");
        }
    }
}

// ─── Rendering helpers ────────────────────────────────────────────────────────

fn render(status_line: &str, tasks: &[Task]) {
    println!();
    println!("Backend status: {status_line}");
    if tasks.is_empty() {
        println!("  (no tasks)");
    } else {
        for task in tasks {
            let mark = if task.completed { "x" } else { " " };
            println!("  [{mark}] {:>3}  {}", task.id, task.title);
        }
    }
}

fn prompt(text: &str) -> Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read input")?;
    Ok(line)
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Terminal analog of the browser's blocking `alert()`: print the message
/// and wait for Enter before returning to the list.
fn alert(message: &str) {
    println!();
    println!("!! {message}");
    print!("Press Enter to continue… ");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}
