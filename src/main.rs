use anyhow::{anyhow, Result};
use chrono::NaiveDateTime;
use std::path::PathBuf;

use perch::config::Config;
use perch::db::Database;
use perch::query::{FolderSort, ItemSortKey, SortSelection, TagScope};
use perch::{logging, FolderRecord, ItemRecord};

struct Args {
    config_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    library_id: Option<i64>,
    search: String,
    tag_filter: String,
    sort_key: Option<ItemSortKey>,
    ascending: Option<bool>,
    command: Command,
}

enum Command {
    Libraries,
    List,
    Uncategorized,
    Folders(Option<i64>),
    Items(i64),
    Tags,
}

fn parse_args() -> Result<Args> {
    let argv: Vec<String> = std::env::args().collect();
    let mut args = Args {
        config_path: None,
        db_path: None,
        library_id: None,
        search: String::new(),
        tag_filter: String::new(),
        sort_key: None,
        ascending: None,
        command: Command::List,
    };
    let mut command: Option<Command> = None;

    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("perch {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--config" | "-c" => {
                args.config_path = Some(PathBuf::from(take_value(&argv, &mut i, "--config")?));
            }
            "--db" => {
                args.db_path = Some(PathBuf::from(take_value(&argv, &mut i, "--db")?));
            }
            "--library" | "-l" => {
                args.library_id = Some(take_value(&argv, &mut i, "--library")?.parse()?);
            }
            "--search" | "-s" => {
                args.search = take_value(&argv, &mut i, "--search")?;
            }
            "--filter" => {
                args.tag_filter = take_value(&argv, &mut i, "--filter")?;
            }
            "--sort" => {
                let value = take_value(&argv, &mut i, "--sort")?;
                args.sort_key = Some(
                    ItemSortKey::from_str(&value)
                        .ok_or_else(|| anyhow!("unknown sort key: {value}"))?,
                );
            }
            "--asc" => args.ascending = Some(true),
            "--desc" => args.ascending = Some(false),
            "libraries" => command = Some(Command::Libraries),
            "list" => command = Some(Command::List),
            "uncategorized" => command = Some(Command::Uncategorized),
            "folders" => {
                let parent = argv.get(i + 1).and_then(|v| v.parse().ok());
                if parent.is_some() {
                    i += 1;
                }
                command = Some(Command::Folders(parent));
            }
            "items" => {
                let folder_id = take_value(&argv, &mut i, "items")?.parse()?;
                command = Some(Command::Items(folder_id));
            }
            "tags" => command = Some(Command::Tags),
            other => {
                return Err(anyhow!("unknown argument: {other}"));
            }
        }
        i += 1;
    }

    if let Some(command) = command {
        args.command = command;
    }
    Ok(args)
}

fn take_value(argv: &[String], i: &mut usize, flag: &str) -> Result<String> {
    *i += 1;
    argv.get(*i)
        .cloned()
        .ok_or_else(|| anyhow!("{flag} requires a value"))
}

fn print_help() {
    println!(
        "perch - query a personal media library

USAGE:
    perch [OPTIONS] <COMMAND>

COMMANDS:
    libraries            List libraries in the database
    list                 List items (default)
    uncategorized        List items with no folder membership
    folders [PARENT_ID]  List root folders, or children of PARENT_ID
    items FOLDER_ID      List items filed under a folder
    tags                 Suggest tags ranked by frequency

OPTIONS:
    -c, --config PATH    Config file (default: platform config dir)
        --db PATH        Database file (overrides config)
    -l, --library ID     Library to query (default: first library)
    -s, --search TEXT    Free-text search
        --filter TEXT    Tag suggestion filter (tags command)
        --sort KEY       Item sort: name|added_at|file_size|duration|random
        --asc, --desc    Sort direction
    -h, --help           Show this help
    -V, --version        Show version"
    );
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load(args.config_path.clone())?;
    logging::init(None)?;

    let db_path = args.db_path.clone().unwrap_or_else(|| config.db_path.clone());
    let db = Database::open(&db_path)?;
    db.initialize()?;

    if let Command::Libraries = args.command {
        for library in db.libraries()? {
            println!("{:>6}  {}  {}", library.id, format_timestamp(&library.created_at), library.name);
        }
        return Ok(());
    }

    let library_id = match args.library_id {
        Some(id) => id,
        None => db
            .libraries()?
            .first()
            .map(|l| l.id)
            .ok_or_else(|| anyhow!("no libraries in {}", db_path.display()))?,
    };

    let item_sort = SortSelection {
        key: args.sort_key.unwrap_or(config.browse.item_sort),
        ascending: args.ascending.unwrap_or(config.browse.item_sort_ascending),
    };
    let folder_sort: FolderSort = config.browse.folder_sort();

    match args.command {
        Command::Libraries => unreachable!(),
        Command::List => {
            print_items(&db.all_items(library_id, item_sort, &args.search)?);
        }
        Command::Uncategorized => {
            print_items(&db.uncategorized_items(library_id, item_sort, &args.search)?);
        }
        Command::Folders(parent) => {
            let folders = match parent {
                None => db.root_folders(library_id, folder_sort, &args.search)?,
                Some(parent_id) => {
                    db.child_folders(library_id, parent_id, folder_sort, &args.search)?
                }
            };
            print_folders(&db, &folders)?;
        }
        Command::Items(folder_id) => {
            let folder = find_folder(&db, library_id, folder_id)?;
            print_items(&db.folder_items(&folder, item_sort, &args.search)?);
        }
        Command::Tags => {
            let tags = db.suggested_tags(
                library_id,
                TagScope::All,
                &args.search,
                &args.tag_filter,
                config.search.tag_suggestion_limit,
            )?;
            for tc in tags {
                println!("{:>6}  {}", tc.count, tc.tag);
            }
        }
    }

    Ok(())
}

fn find_folder(db: &Database, library_id: i64, folder_id: i64) -> Result<FolderRecord> {
    // The layer exposes folders through listings; walk roots and children.
    let sort = FolderSort { key: perch::query::FolderSortKey::Name, ascending: true };
    let mut frontier = db.root_folders(library_id, sort, "")?;
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for folder in frontier {
            if folder.folder_id == folder_id {
                return Ok(folder);
            }
            next.extend(db.child_folders(library_id, folder.folder_id, sort, "")?);
        }
        frontier = next;
    }
    Err(anyhow!("no folder {folder_id} in library {library_id}"))
}

fn print_items(items: &[ItemRecord]) {
    for item in items {
        let tags = if item.tags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", item.tags.join(", "))
        };
        println!(
            "{:>6}  {}  {}{}",
            item.item_id,
            format_timestamp(&item.added_at),
            item.name,
            tags
        );
    }
}

fn print_folders(db: &Database, folders: &[FolderRecord]) -> Result<()> {
    for folder in folders {
        let cover = db
            .folder_cover_item(folder)?
            .map(|item| format!("  (cover: {})", item.name))
            .unwrap_or_default();
        println!("{:>6}  {}{}", folder.folder_id, folder.name, cover);
    }
    Ok(())
}

/// SQLite's CURRENT_TIMESTAMP format, shortened to the date for display.
fn format_timestamp(ts: &str) -> String {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| ts.to_string())
}
