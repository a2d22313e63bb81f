//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::TreeView;
use crate::cli::args::{Cli, Commands, ConfigCommands, SelectionArgs};
use crate::cli::output;
use crate::cli::render::TreeRender;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{ResolveOrder, Selection, SelectionPath, SelectionReducer, TreeArena};
use crate::infrastructure::di::ServiceContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage("no command given, see --help".into()));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => {
            let settings = load_settings(cli)?;
            cmd_config(&settings, cli.snapshot.as_deref(), command)
        }
        command => {
            let container = ServiceContainer::new(load_settings(cli)?);
            let snapshot = snapshot_path(cli, &container)?;
            run_tree_command(&container, &snapshot, command)
        }
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let snapshot_dir = cli.snapshot.as_deref().and_then(Path::parent);
    Ok(Settings::load(snapshot_dir)?)
}

fn snapshot_path(cli: &Cli, container: &ServiceContainer) -> CliResult<PathBuf> {
    cli.snapshot
        .clone()
        .or_else(|| container.settings.default_snapshot.clone())
        .ok_or_else(|| {
            CliError::Usage("no snapshot given: use --file or set default_snapshot".into())
        })
}

/// Parse label paths like `Group/FileA/D1` into a selection.
pub fn parse_selection(tree: &TreeArena, label_paths: &[String], separator: &str) -> CliResult<Selection> {
    let mut selection = Selection::new();
    for label_path in label_paths {
        let idx = find_node(tree, label_path, separator)?;
        if let Some(path) = SelectionPath::of(tree, idx) {
            selection.push(path);
        }
    }
    Ok(selection)
}

fn find_node(tree: &TreeArena, label_path: &str, separator: &str) -> CliResult<generational_arena::Index> {
    if separator.is_empty() {
        return Err(CliError::InvalidArgs("path separator must not be empty".into()));
    }
    let labels: Vec<&str> = label_path.split(separator).filter(|s| !s.is_empty()).collect();
    Ok(tree.find_by_labels(&labels)?)
}

#[instrument(skip(container))]
fn run_tree_command(container: &ServiceContainer, snapshot: &Path, command: &Commands) -> CliResult<()> {
    let service = container.snapshot_service();
    let loaded = service.load(snapshot)?;
    let mut view = TreeView::from_snapshot(loaded, container.view_options());
    let separator = container.settings.path_separator.as_str();

    let select = |view: &mut TreeView, args: &SelectionArgs| -> CliResult<()> {
        let selection = parse_selection(view.tree(), &args.select, separator)?;
        debug!("selection: {} path(s)", selection.len());
        view.set_selection(selection);
        Ok(())
    };

    match command {
        Commands::Tree => {
            output::info(&view.to_tree_string(&container.settings.glyphs));
        }
        Commands::Resolve {
            selection,
            by_position,
        } => {
            select(&mut view, selection)?;
            let order = if *by_position {
                ResolveOrder::ByPosition
            } else {
                view.options().order
            };
            for payload in view.resolve_selection_with(order) {
                let mut line = payload.id.to_string();
                if let Some(position) = payload.position {
                    line.push_str(&format!("\t@{}", position));
                }
                if let Some(element) = &payload.element {
                    line.push_str(&format!("\t{}", element));
                }
                output::info(&line);
            }
        }
        Commands::Count { selection } => {
            select(&mut view, selection)?;
            output::info(&view.count_selection());
        }
        Commands::Status { path } => {
            let idx = find_node(view.tree(), path, separator)?;
            let status = view.status_of(idx);
            let glyph = container.settings.glyphs.for_status(status);
            let enabled = if view.is_enabled(idx) { "enabled" } else { "disabled" };
            output::info(&format!("{} {} ({})", glyph, status, enabled));
        }
        Commands::Elements { selection } => {
            select(&mut view, selection)?;
            let reducer = SelectionReducer::new(view.tree());
            match reducer.selected_tool(view.selection()) {
                Some(tool) => {
                    output::header(&tool);
                    for element in reducer.selected_elements(view.selection()) {
                        output::detail(element);
                    }
                }
                None => output::warning("selection spans more than one tool"),
            }
        }
        Commands::Include { selection } => {
            select(&mut view, selection)?;
            let changed = view.include_selection();
            persist(container, snapshot, &view, changed, "included")?;
        }
        Commands::Exclude { selection } => {
            select(&mut view, selection)?;
            let changed = view.exclude_selection();
            persist(container, snapshot, &view, changed, "excluded")?;
        }
        Commands::Toggle { selection } => {
            select(&mut view, selection)?;
            let before = view.inclusion().len();
            let included = view.toggle_selection();
            let changed = view.inclusion().len() != before;
            let label = if included { "included" } else { "excluded" };
            persist(container, snapshot, &view, changed, label)?;
        }
        Commands::Config { .. } | Commands::Completion { .. } => {}
    }
    Ok(())
}

fn persist(
    container: &ServiceContainer,
    snapshot: &Path,
    view: &TreeView,
    changed: bool,
    label: &str,
) -> CliResult<()> {
    if !changed {
        output::warning("nothing changed");
        return Ok(());
    }
    container
        .snapshot_service()
        .save_inclusion(snapshot, view.inclusion())?;
    output::action(
        label,
        &format!(
            "{} item(s) now included: {}",
            view.inclusion().len(),
            view.inclusion().items().join(", ")
        ),
    );
    Ok(())
}

fn cmd_config(settings: &Settings, snapshot: Option<&Path>, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Path => {
            output::header("Config files");
            match global_config_path() {
                Some(path) => output::detail(&format!("global: {}", path.display())),
                None => output::detail("global: <no config directory>"),
            }
            if let Some(dir) = snapshot.and_then(Path::parent) {
                output::detail(&format!("local:  {}", local_config_path(dir).display()));
            }
        }
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
