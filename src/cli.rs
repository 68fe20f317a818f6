use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::backend;
use crate::board::{BoardManager, Filter, Move, MoveOutcome};
use crate::config;
use crate::model::work_item::{ItemPatch, NewItem, Priority, Status};

async fn open_board() -> Result<BoardManager> {
    let config = config::load_config()?;
    let backend = backend::create_backend(&config)?;
    let actors = backend::create_actor_source(&config);
    let mut board = BoardManager::new(backend, actors);
    board
        .load_all()
        .await
        .context("Failed to load tickets")?;
    Ok(board)
}

/// `board ls`: print every column, optionally narrowed.
pub async fn handle_list(args: &[String]) -> Result<()> {
    let (mut filter, mine) = parse_list_args(args)?;
    let mut board = open_board().await?;

    if mine {
        filter.owner = Some(board.actors().current_actor()?);
    }
    board.apply_filter(filter);

    if board.lists().is_empty() {
        println!("No tickets");
        return Ok(());
    }
    for status in Status::ALL {
        let items = board.filtered(status);
        if items.is_empty() && board.filter().status.is_some() {
            continue;
        }
        println!("{} ({})", status.display_name(), items.len());
        for item in items {
            let assignee = item.assigned_to.as_deref().unwrap_or("-");
            println!(
                "  {:<10} {:<7} {:<12} {}",
                item.id,
                item.priority.as_str(),
                assignee,
                item.title
            );
        }
    }
    Ok(())
}

/// `board add`: create a ticket.
pub async fn handle_add(args: &[String]) -> Result<()> {
    let item = parse_add_args(args)?;
    let mut board = open_board().await?;
    let created = board.create(item).await?;
    println!(
        "Created {} in {}: {}",
        created.id,
        created.status.display_name(),
        created.title
    );
    Ok(())
}

/// `board mv`: move a ticket to another column, with rollback on failure.
pub async fn handle_move(args: &[String]) -> Result<()> {
    let (id, to, index) = parse_move_args(args)?;
    let mut board = open_board().await?;

    let Some((from, _)) = board.lists().locate(&id) else {
        bail!("Ticket {id} is not on the board");
    };
    let mv = Move {
        item_id: id.clone(),
        from,
        to,
        index: index.unwrap_or(0),
    };

    match board.move_item(mv).await? {
        MoveOutcome::Unchanged => println!("{id} is already there"),
        MoveOutcome::Reordered(applied) => {
            println!("{id} reordered in {} (position is not saved remotely)", applied.to.display_name())
        }
        MoveOutcome::Moved(applied) => println!(
            "{id}: {} -> {}",
            applied.from.display_name(),
            applied.to.display_name()
        ),
    }
    Ok(())
}

/// `board edit`: change fields of a ticket.
pub async fn handle_edit(args: &[String]) -> Result<()> {
    let (id, patch) = parse_edit_args(args)?;
    let mut board = open_board().await?;
    let updated = board.update(&id, patch).await?;
    println!(
        "Updated {} ({}): {}",
        updated.id,
        updated.status.display_name(),
        updated.title
    );
    Ok(())
}

/// `board rm`: delete a ticket.
pub async fn handle_remove(args: &[String]) -> Result<()> {
    let [id] = args else {
        bail!("Usage: board rm <id>");
    };
    let mut board = open_board().await?;
    board.delete(id).await?;
    println!("Deleted {id}");
    Ok(())
}

/// `board assign`: hand a ticket to someone.
pub async fn handle_assign(args: &[String]) -> Result<()> {
    let [id, assignee] = args else {
        bail!("Usage: board assign <id> <assignee>");
    };
    let mut board = open_board().await?;
    let updated = board.assign(id, assignee).await?;
    println!(
        "{} assigned to {}",
        updated.id,
        updated.assigned_to.as_deref().unwrap_or(assignee)
    );
    Ok(())
}

fn flag_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(v) => Ok(v.as_str()),
        None => bail!("Missing value for {flag} flag"),
    }
}

/// Parse `board add` arguments.
///
/// Supported forms:
///   board add "My ticket title"
///   board add My ticket title
///   board add "My ticket" -d "The description" -p high -s testing
///   board add "My ticket" --assignee alice --due 2026-11-01
pub fn parse_add_args(args: &[String]) -> Result<NewItem> {
    if args.is_empty() {
        bail!("Usage: board add <title> [-d <description>] [-p <priority>] [-s <status>] [-a <assignee>] [--due <YYYY-MM-DD>]\n\nExamples:\n  board add \"Fix the login bug\"\n  board add \"Fix the login bug\" -d \"Users can't log in with SSO\" -p high");
    }

    let mut title_parts: Vec<String> = Vec::new();
    let mut item = NewItem::new("");
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-d" | "--desc" | "--description" => {
                item.description = Some(flag_value(args, &mut i, arg)?.to_string());
            }
            "-p" | "--priority" => {
                item.priority = parse_priority(flag_value(args, &mut i, arg)?)?;
            }
            "-s" | "--status" => {
                let raw = flag_value(args, &mut i, arg)?;
                item.status = parse_status(raw)?;
            }
            "-a" | "--assignee" => {
                item.assigned_to = Some(flag_value(args, &mut i, arg)?.to_string());
            }
            "--due" => {
                item.due_date = Some(parse_due(flag_value(args, &mut i, arg)?)?);
            }
            _ => {
                title_parts.push(args[i].clone());
            }
        }
        i += 1;
    }

    item.title = title_parts.join(" ");
    if item.title.trim().is_empty() {
        bail!("Ticket title cannot be empty");
    }

    Ok(item)
}

/// Parse `board edit <id> [--title t] [-d desc] [-p prio] [-s status] [-a user] [--due date]`.
pub fn parse_edit_args(args: &[String]) -> Result<(String, ItemPatch)> {
    let Some((id, rest)) = args.split_first() else {
        bail!("Usage: board edit <id> [--title <title>] [-d <description>] [-p <priority>] [-s <status>] [-a <assignee>] [--due <YYYY-MM-DD>]");
    };

    let mut patch = ItemPatch::default();
    let mut i = 0;
    while i < rest.len() {
        let arg = rest[i].as_str();
        match arg {
            "-t" | "--title" => {
                let title = flag_value(rest, &mut i, arg)?.trim();
                if title.is_empty() {
                    bail!("Ticket title cannot be empty");
                }
                patch.title = Some(title.to_string());
            }
            "-d" | "--desc" | "--description" => {
                patch.description = Some(flag_value(rest, &mut i, arg)?.to_string());
            }
            "-p" | "--priority" => {
                let raw = flag_value(rest, &mut i, arg)?;
                patch.priority = Some(parse_priority(raw)?);
            }
            "-s" | "--status" => {
                patch.status = Some(parse_status(flag_value(rest, &mut i, arg)?)?);
            }
            "-a" | "--assignee" => {
                patch.assigned_to = Some(flag_value(rest, &mut i, arg)?.to_string());
            }
            "--due" => {
                patch.due_date = Some(parse_due(flag_value(rest, &mut i, arg)?)?);
            }
            other => bail!("Unexpected argument '{other}'"),
        }
        i += 1;
    }

    if patch == ItemPatch::default() {
        bail!("Nothing to change for {id}");
    }
    Ok((id.clone(), patch))
}

/// Parse `board mv <id> <status> [index]`.
pub fn parse_move_args(args: &[String]) -> Result<(String, Status, Option<usize>)> {
    match args {
        [id, status] => Ok((id.clone(), parse_status(status)?, None)),
        [id, status, index] => {
            let index = index
                .parse()
                .with_context(|| format!("Position '{index}' is not a number"))?;
            Ok((id.clone(), parse_status(status)?, Some(index)))
        }
        _ => bail!("Usage: board mv <id> <status> [position]"),
    }
}

/// Parse `board ls` arguments into a filter and whether to show only the
/// signed-in user's tickets.
pub fn parse_list_args(args: &[String]) -> Result<(Filter, bool)> {
    let mut filter = Filter::default();
    let mut mine = false;
    let mut i = 0;

    while i < args.len() {
        let arg = args[i].as_str();
        match arg {
            "-s" | "--status" => {
                filter.status = Some(parse_status(flag_value(args, &mut i, arg)?)?);
            }
            "-a" | "--assignee" => {
                filter.assignee = Some(flag_value(args, &mut i, arg)?.to_string());
            }
            "-m" | "--mine" => mine = true,
            _ => {
                if !filter.search.is_empty() {
                    filter.search.push(' ');
                }
                filter.search.push_str(arg);
            }
        }
        i += 1;
    }

    Ok((filter, mine))
}

fn parse_status(raw: &str) -> Result<Status> {
    Status::parse(raw).with_context(|| {
        format!("Unknown status '{raw}' (todo, in_progress, resolved, testing, done)")
    })
}

fn parse_priority(raw: &str) -> Result<Priority> {
    Priority::parse(raw)
        .with_context(|| format!("Unknown priority '{raw}' (low, medium, high, urgent)"))
}

fn parse_due(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Due date '{raw}' is not YYYY-MM-DD"))
}

pub fn print_help() {
    println!("board: terminal kanban for tickets\n");
    println!("USAGE:");
    println!("  board                          Launch the board");
    println!("  board ls [query] [-s status] [-a assignee] [-m]");
    println!("                                 Print the board");
    println!("  board add <title> [options]    Create a ticket");
    println!("  board mv <id> <status> [pos]   Move a ticket to another column");
    println!("  board edit <id> [options]      Change a ticket (--title plus the add options)");
    println!("  board assign <id> <assignee>   Reassign a ticket");
    println!("  board rm <id>                  Delete a ticket");
    println!();
    println!("ADD OPTIONS:");
    println!("  -d, --desc <text>      Description");
    println!("  -p, --priority <p>     low, medium (default), high, urgent");
    println!("  -s, --status <s>       todo (default), in_progress, resolved, testing, done");
    println!("  -a, --assignee <user>  Assignee");
    println!("      --due <date>       Due date, YYYY-MM-DD");
    println!();
    println!("CONFIG:");
    println!("  ~/.ticket-board/config.toml, token may come from ${}", config::TOKEN_ENV);
}
