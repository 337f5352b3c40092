//! CLI module for the workdesk application
//!
//! This module turns parsed commands into store operations and prints the
//! results.
use std::{
    fs::{read_to_string, OpenOptions},
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    process::Command,
};

use console::style;
use log::{debug, info};
use shell_words::split;
use tempfile::Builder;

use crate::{
    date_or_today, format_timer, generate_summary, now_millis, render_markdown, BlogCommand,
    BlogStore, BoardCommand, Commands, Config, FileStore, JournalCommand, JournalStore, Project,
    ProjectCommand, ProjectStatus, ProjectStore, Result, TimerCommand, Whiteboard, WorkdeskError,
    UNTITLED,
};

/// CLI Application handler - processes CLI commands against the file backend
pub struct App {
    /// Where every collection is persisted
    store: FileStore,

    /// Application configuration
    config: Config,

    /// Where the configuration was loaded from
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given config
    pub fn new(config: Config, config_path: PathBuf, verbose: bool) -> Result<Self> {
        let store = FileStore::from_config(&config)?;
        Ok(Self {
            store,
            config,
            config_path,
            verbose,
        })
    }

    /// Run the CLI application with the given command
    pub fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Project(command) => self.run_project(command),
            Commands::Timer(command) => self.run_timer(command),
            Commands::Journal(command) => self.run_journal(command),
            Commands::Blog(command) => self.run_blog(command),
            Commands::Board(command) => self.run_board(command),
            Commands::Config { show, reset } => self.handle_config(show, reset),
        }
    }

    fn projects(&self) -> ProjectStore<FileStore> {
        ProjectStore::open(self.store.clone())
    }

    fn run_project(&self, command: ProjectCommand) -> Result<()> {
        let mut store = self.projects();

        match command {
            ProjectCommand::Add { title } => {
                let id = store.add_project(title);
                println!("Project created with ID: {}", id);
            }

            ProjectCommand::List { status, json } => {
                let status = status.map(|s| s.parse::<ProjectStatus>()).transpose()?;
                let projects: Vec<&Project> = store
                    .projects()
                    .iter()
                    .filter(|p| status.is_none_or(|s| p.status == s))
                    .collect();

                if json {
                    println!("{}", serde_json::to_string_pretty(&projects)?);
                } else {
                    self.display_projects(&store, &projects);
                }
            }

            ProjectCommand::Show { id, json } => {
                let project = store
                    .project(id)
                    .ok_or(WorkdeskError::ProjectNotFound { id })?;

                if json {
                    let value = serde_json::json!({
                        "project": project,
                        "timers": store.timers(id),
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                } else {
                    self.display_project(&store, project);
                }
            }

            ProjectCommand::Rename { id, title } => {
                store.update_project_title(id, title)?;
                println!("Project {} renamed.", id);
            }

            ProjectCommand::Status { id, status } => {
                let status: ProjectStatus = status.parse()?;
                store.update_project_status(id, status)?;
                println!("Project {} is now {}.", id, status);
            }

            ProjectCommand::Content { id, content, file } => {
                let content = match (content, file) {
                    (Some(c), _) => c,
                    (None, Some(file_path)) => read_input_file(&file_path)?,
                    (None, None) => {
                        return Err(WorkdeskError::EditorError {
                            message: "Provide --content or --file, or use `project edit`"
                                .to_string(),
                        })
                    }
                };
                store.update_project_content(id, content)?;
                println!("Content of project {} updated.", id);
            }

            ProjectCommand::Edit { id } => {
                let project = store
                    .project(id)
                    .ok_or(WorkdeskError::ProjectNotFound { id })?;
                let content =
                    self.open_editor_for_content(&project.title, &project.content, ".html")?;
                store.update_project_content(id, content)?;
                println!("Content of project {} updated.", id);
            }

            ProjectCommand::Delete { id, force } => {
                let project = store
                    .project(id)
                    .ok_or(WorkdeskError::ProjectNotFound { id })?
                    .clone();

                if !force {
                    println!("You are about to delete the following project:");
                    println!("ID:      {}", project.id);
                    println!("Title:   {}", project.title);
                    println!("Status:  {}", project.status);
                    println!("Timers:  {}", store.timers(id).len());
                    if !confirm("Are you sure you want to delete this project?")? {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                store.delete_project(id);
                println!(
                    "Project '{}' ({}) has been permanently deleted.",
                    project.title, project.id
                );
            }

            ProjectCommand::Active { id, timer } => {
                store.set_active_timer(id, timer)?;
                match timer {
                    Some(timer) => println!("Project {} now shows timer {}.", id, timer),
                    None => println!("Project {} no longer shows a timer.", id),
                }
            }

            ProjectCommand::Find { query, limit } => {
                let results: Vec<&Project> =
                    store.search_projects(&query).into_iter().take(limit).collect();
                if results.is_empty() {
                    println!("No projects matching '{}'.", query);
                } else {
                    self.display_projects(&store, &results);
                }
            }
        }

        Ok(())
    }

    fn run_timer(&self, command: TimerCommand) -> Result<()> {
        let mut store = self.projects();

        match command {
            TimerCommand::Add { project, name } => {
                let id = store.add_timer(project, name)?;
                println!("Timer created with ID: {}", id);
            }

            TimerCommand::Rename {
                project,
                timer,
                name,
            } => {
                store.update_timer_name(project, timer, name)?;
                println!("Timer {} renamed.", timer);
            }

            TimerCommand::Toggle { project, timer } => {
                let now = now_millis();
                let running = store.toggle_timer_at(project, timer, now)?;
                let display = format_timer(store.timer(project, timer), now);
                if running {
                    println!("Timer {} started at {}.", timer, style(display).green());
                } else {
                    println!("Timer {} stopped at {}.", timer, style(display).yellow());
                }
            }

            TimerCommand::Delete { project, timer } => {
                if store.delete_timer(project, timer) {
                    println!("Timer {} deleted.", timer);
                } else {
                    println!("No timer {} in project {}.", timer, project);
                }
            }

            TimerCommand::List { project } => {
                let project = store
                    .project(project)
                    .ok_or(WorkdeskError::ProjectNotFound { id: project })?;
                self.display_timers(&store, project);
            }
        }

        Ok(())
    }

    fn run_journal(&self, command: JournalCommand) -> Result<()> {
        let mut journal = JournalStore::open(self.store.clone());

        match command {
            JournalCommand::Show { date } => {
                let date = date_or_today(date.as_deref())?;
                let record = journal.record(date);

                println!("{}", style(date.format("%A, %Y-%m-%d")).bold());
                if !record.content.is_empty() {
                    println!("\n{}", record.content);
                }
                if !record.todos.is_empty() {
                    println!();
                    for todo in &record.todos {
                        let mark = if todo.done { "[x]" } else { "[ ]" };
                        println!("{} {} {}", mark, style(todo.id).dim(), todo.text);
                    }
                }
            }

            JournalCommand::Days => {
                for date in journal.dates() {
                    let Some(record) = journal.peek(date) else {
                        continue;
                    };
                    let open = record.todos.iter().filter(|t| !t.done).count();
                    println!(
                        "{}  {} open todo{}  {}",
                        date,
                        open,
                        if open == 1 { "" } else { "s" },
                        generate_summary(&record.content)
                    );
                }
            }

            JournalCommand::Write { content, date } => {
                let date = date_or_today(date.as_deref())?;
                journal.update_content(date, content);
                println!("Journal for {} updated.", date);
            }

            JournalCommand::Todo { text, date } => {
                let date = date_or_today(date.as_deref())?;
                let id = journal.add_todo(date, text);
                println!("Todo {} added to {}.", id, date);
            }

            JournalCommand::Done { id, date } => {
                let date = date_or_today(date.as_deref())?;
                let done = journal.toggle_todo(date, id)?;
                println!(
                    "Todo {} is {}.",
                    id,
                    if done { "done" } else { "open again" }
                );
            }
        }

        Ok(())
    }

    fn run_blog(&self, command: BlogCommand) -> Result<()> {
        let mut blog = BlogStore::open(self.store.clone());

        match command {
            BlogCommand::List => {
                if blog.posts().is_empty() {
                    println!("No blog posts yet.");
                }
                for (i, post) in blog.posts().iter().enumerate() {
                    if i > 0 {
                        println!("{}", "-".repeat(separator_width()));
                    }
                    println!("ID: {} | {}", post.id, post.date);
                    println!("{}", style(&post.title).bold());
                    if !post.summary.is_empty() {
                        println!("{}", post.summary);
                    }
                }
            }

            BlogCommand::New { title, file, edit } => {
                let id = blog.add_blog();
                if title.is_some() || file.is_some() || edit {
                    let title = title.unwrap_or_else(|| UNTITLED.to_string());
                    let body = match file {
                        Some(path) => read_input_file(&path)?,
                        None if edit => self.open_editor_for_content(&title, "", ".md")?,
                        None => String::new(),
                    };
                    blog.update_blog(id, title, render_body(&body))?;
                }
                println!("Blog post created with ID: {}", id);
            }

            BlogCommand::Edit { id, title, file } => {
                let post = blog
                    .post(id)
                    .ok_or(WorkdeskError::BlogNotFound { id })?
                    .clone();
                let title = title.unwrap_or(post.title);
                let content = match file {
                    Some(path) => render_body(&read_input_file(&path)?),
                    None => {
                        let body = self.open_editor_for_content(&title, &post.content, ".md")?;
                        render_body(&body)
                    }
                };
                blog.update_blog(id, title, content)?;
                println!("Blog post {} updated.", id);
            }

            BlogCommand::Delete { id, force } => {
                let post = blog
                    .post(id)
                    .ok_or(WorkdeskError::BlogNotFound { id })?
                    .clone();
                if !force {
                    println!("You are about to delete '{}' ({}).", post.title, post.date);
                    if !confirm("Are you sure you want to delete this post?")? {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }
                blog.delete_blog(id);
                println!("Blog post '{}' has been permanently deleted.", post.title);
            }
        }

        Ok(())
    }

    fn run_board(&self, command: BoardCommand) -> Result<()> {
        let mut board = Whiteboard::open(self.store.clone());

        match command {
            BoardCommand::List => {
                if board.items().is_empty() {
                    println!("The whiteboard is empty.");
                }
                for item in board.items() {
                    let marker = if item.is_editing { "*" } else { " " };
                    println!(
                        "{}{:>15} ({:>7.1}, {:>7.1})  {}",
                        marker, item.id, item.x, item.y, item.text
                    );
                }
            }

            BoardCommand::Add { x, y, text } => {
                let id = board.add_item(x, y);
                if let Some(text) = text {
                    board.update_text(id, text)?;
                }
                println!("Whiteboard item created with ID: {}", id);
            }

            BoardCommand::Move { id, x, y } => {
                board.update_position(id, x, y)?;
                println!("Item {} moved to ({}, {}).", id, x, y);
            }

            BoardCommand::Text { id, text } => {
                board.update_text(id, text)?;
                println!("Item {} updated.", id);
            }

            BoardCommand::Remove { id } => {
                if board.remove_item(id) {
                    println!("Item {} removed.", id);
                } else {
                    println!("No item {} on the whiteboard.", id);
                }
            }

            BoardCommand::Clear { force } => {
                if !force && !confirm("Remove every item from the whiteboard?")? {
                    println!("Nothing removed.");
                    return Ok(());
                }
                board.clear_all();
                println!("Whiteboard cleared.");
            }
        }

        Ok(())
    }

    fn handle_config(&self, show: bool, reset: bool) -> Result<()> {
        if reset {
            let defaults = Config::default();
            defaults.save(&self.config_path)?;
            println!(
                "Configuration reset to defaults at {}",
                self.config_path.display()
            );
            return Ok(());
        }

        if show || self.verbose {
            println!("Config file: {}", self.config_path.display());
        }
        println!("{}", serde_json::to_string_pretty(&self.config)?);
        Ok(())
    }

    /// Display projects with their active timer
    fn display_projects(&self, store: &ProjectStore<FileStore>, projects: &[&Project]) {
        if projects.is_empty() {
            println!("No projects found.");
            return;
        }

        let now = now_millis();
        for (i, project) in projects.iter().enumerate() {
            if i > 0 {
                println!("{}", "-".repeat(separator_width()));
            }
            println!(
                "ID: {} | Created: {} | {}",
                project.id,
                project.create_date,
                status_label(project.status)
            );
            println!("Title: {}", style(&project.title).bold());

            if let Some(timer) = store.active_timer(project.id) {
                let display = format_timer(Some(timer), now);
                let display = if timer.is_running {
                    style(display).green()
                } else {
                    style(display)
                };
                println!("Timer: {} {}", timer.name, display);
            }

            let preview = generate_summary(&project.content);
            if !preview.is_empty() {
                println!("{}", preview);
            }
        }

        println!(
            "\nFound {} project{}",
            projects.len(),
            if projects.len() == 1 { "" } else { "s" }
        );
    }

    fn display_project(&self, store: &ProjectStore<FileStore>, project: &Project) {
        println!("ID:      {}", project.id);
        println!("Title:   {}", style(&project.title).bold());
        println!("Created: {}", project.create_date);
        println!("Status:  {}", status_label(project.status));
        if !project.content.is_empty() {
            println!("\n{}\n", project.content);
        }
        self.display_timers(store, project);
    }

    fn display_timers(&self, store: &ProjectStore<FileStore>, project: &Project) {
        let timers = store.timers(project.id);
        if timers.is_empty() {
            println!("No timers for project {}.", project.id);
            return;
        }

        let now = now_millis();
        for timer in timers {
            let active = if project.active_timer_id == Some(timer.id) {
                "*"
            } else {
                " "
            };
            let display = format_timer(Some(timer), now);
            let state = if timer.is_running {
                style("running").green()
            } else {
                style("stopped").dim()
            };
            println!(
                "{}{:>15}  {}  {:<8} {}",
                active, timer.id, display, state, timer.name
            );
        }
    }

    fn open_editor_for_content(&self, title: &str, current: &str, suffix: &str) -> Result<String> {
        let temp_file = Builder::new().suffix(suffix).tempfile()?;
        let temp_path = temp_file.path().to_path_buf();

        let editor_cmd = self.config.get_editor_command();
        self.write_editor_template(&temp_path, title, current)?;

        info!("Opening editor to write content. Save and exit when done...");
        self.launch_editor(&editor_cmd, &temp_path)?;

        let content = read_to_string(&temp_path)?;
        Ok(self.process_editor_content(content))
    }

    fn write_editor_template(&self, path: &Path, title: &str, current: &str) -> Result<()> {
        let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
        write!(file, "{}", editor_template(title, current))?;
        Ok(())
    }

    fn launch_editor(&self, editor_cmd: &str, file_path: &Path) -> Result<()> {
        let path_str = file_path.to_string_lossy();

        let args = split(editor_cmd).map_err(|e| WorkdeskError::EditorError {
            message: format!("Failed to parse editor command: {}", e),
        })?;

        let Some((program, rest)) = args.split_first() else {
            return Err(WorkdeskError::EditorError {
                message: "Empty editor command".to_string(),
            });
        };

        debug!("Launching editor {} on {}", program, path_str);
        let status = Command::new(program)
            .args(rest)
            .arg(path_str.as_ref())
            .status()?;

        if !status.success() {
            return Err(WorkdeskError::EditorError {
                message: "Editor exited with non-zero status".to_string(),
            });
        }

        Ok(())
    }

    fn process_editor_content(&self, content: String) -> String {
        strip_editor_header(&content)
    }
}

/// Marks the one line of the editor buffer that is not part of the content
const EDITOR_HEADER: &str = "<!-- workdesk:";

fn editor_template(title: &str, current: &str) -> String {
    let title = title.replace(['\r', '\n'], " ");
    format!(
        "{} {} | save and exit when done, this line is removed -->\n{}",
        EDITOR_HEADER, title, current
    )
}

/// Drops the header line if it is still first; body lines are never touched.
fn strip_editor_header(content: &str) -> String {
    let body = match content.split_once('\n') {
        Some((first, rest)) if first.trim_start().starts_with(EDITOR_HEADER) => rest,
        None if content.trim_start().starts_with(EDITOR_HEADER) => "",
        _ => content,
    };
    body.trim_end_matches(['\r', '\n']).to_string()
}

fn read_input_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(WorkdeskError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }
    Ok(read_to_string(path)?)
}

/// Bodies that already look like HTML are kept, anything else is Markdown
fn render_body(body: &str) -> String {
    let trimmed = body.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        body.to_string()
    } else {
        render_markdown(body)
    }
}

fn status_label(status: ProjectStatus) -> console::StyledObject<&'static str> {
    match status {
        ProjectStatus::NotStarted => style(status.as_str()).dim(),
        ProjectStatus::InProgress => style(status.as_str()).cyan(),
        ProjectStatus::Completed => style(status.as_str()).green(),
    }
}

fn separator_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
        .min(50)
}

fn confirm(question: &str) -> Result<bool> {
    println!("\nThis action cannot be undone!");
    print!("{} [y/N]: ", question);
    stdout().flush().map_err(WorkdeskError::Io)?;

    let mut input = String::new();
    stdin().read_line(&mut input).map_err(WorkdeskError::Io)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
