use std::error::Error;
use std::io::{BufRead, Write};

use chrono::Utc;
use clap::{Parser, Subcommand};

mod components;
mod pages;

use finish_it::api::{ApiClient, Session, keyring};
use finish_it::config::AppConfig;
use finish_it::core::account::{LoginForm, SignupForm, password_strength};
use finish_it::core::task::{Priority, TaskDraft, TaskId, TaskStatus, parse_timestamp};
use finish_it::core::view::{PriorityFilter, SortKey, StatusFilter, ViewParameters};
use finish_it::store::TaskService;

#[derive(Parser)]
#[command(name = "finish-it")]
#[command(version)]
#[command(about = "Manage your Finish-It tasks from the terminal")]
struct Cli {
    /// API base URL (overrides config and FINISH_IT_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Signup {
        /// Display name
        name: String,
        email: String,
    },
    /// Sign in and remember the session
    Login { email: String },
    /// Forget the stored session
    Logout,
    /// Progress overview, recent tasks and upcoming deadlines
    Dashboard,
    /// List tasks with optional search, filters and sorting
    List {
        /// Case-insensitive text matched against title and description
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, todo, in_progress or completed
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// all, low, medium or high
        #[arg(long, default_value = "all")]
        priority: PriorityFilter,
        /// created_desc, created_asc, title_asc, title_desc, priority or status
        #[arg(long, default_value = "created_desc")]
        sort: SortKey,
    },
    /// Create a task
    Add {
        title: String,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
    },
    /// Edit fields of an existing task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Deadline as YYYY-MM-DD or RFC 3339
        #[arg(long)]
        due: Option<String>,
    },
    /// Change a task's status
    Status { id: String, status: TaskStatus },
    /// Mark a task as completed
    Done { id: String },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

// Journal wrapper: finish_it targets at info/debug (per config), everything else at warn.
struct FilteredJournal {
    inner: systemd_journal_logger::JournalLog,
}

impl log::Log for FilteredJournal {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        if metadata.target().starts_with("finish_it") {
            let max = if finish_it::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
            metadata.level() <= max
        } else {
            metadata.level() <= log::LevelFilter::Warn
        }
    }
    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }
    fn flush(&self) {
        self.inner.flush();
    }
}

/// Log to the systemd user journal (`journalctl --user -t finish-it -f`).
/// Without a journal the CLI runs unlogged.
fn init_logging(config: &AppConfig) {
    finish_it::set_debug_logging(config.debug_logging);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(j) => j.with_syslog_identifier("finish-it".to_string()),
        Err(_) => return,
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

fn confirm(question: &str) -> std::io::Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn signup(client: &ApiClient, name: String, email: String) -> Result<(), Box<dyn Error>> {
    let password = rpassword::prompt_password("Password: ")?;
    println!("{}", pages::account::password_hint(password_strength(&password)));
    let confirm_password = rpassword::prompt_password("Confirm password: ")?;

    let form = SignupForm { name, email, password, confirm_password };
    let message = client.signup(&form).await?;
    println!("{}", message);
    println!("Run `finish-it login {}` to sign in.", form.email);
    Ok(())
}

async fn login(client: &ApiClient, email: String) -> Result<(), Box<dyn Error>> {
    let password = rpassword::prompt_password("Password: ")?;
    let mut session = Session::new();
    client.login(&LoginForm { email, password }, &mut session).await?;
    if let Some(token) = session.token() {
        keyring::store_token(client.base_url(), token).await?;
    }
    println!("Login successful!");
    Ok(())
}

async fn run_task_command(
    service: &mut TaskService,
    command: Commands,
    config: &AppConfig,
) -> Result<(), Box<dyn Error>> {
    let now = Utc::now();
    match command {
        Commands::Dashboard => {
            service.refresh().await?;
            let dash = service.dashboard(now, config.dashboard_limits());
            println!("{}", pages::dashboard::dashboard_view(&dash, now));
        }
        Commands::List { search, status, priority, sort } => {
            service.refresh().await?;
            let params = ViewParameters { search_query: search, status, priority, sort };
            let view = service.view(&params);
            println!(
                "{}",
                pages::tasks::task_list_view(service.tasks().len(), &view, &params, now)
            );
        }
        Commands::Add { title, description, priority, status } => {
            let draft = TaskDraft {
                title,
                description: description.filter(|d| !d.trim().is_empty()),
                priority,
                status: Some(status),
            };
            service.create_task(&draft).await?;
            println!("Task created. You now have {} tasks.", service.tasks().len());
        }
        Commands::Edit { id, title, description, priority, status, due } => {
            service.refresh().await?;
            let id = TaskId::from(id);
            let mut task = service
                .cache()
                .find(&id)
                .cloned()
                .ok_or_else(|| format!("No task with id {}", id))?;
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(description) = description {
                task.description = Some(description).filter(|d| !d.trim().is_empty());
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if let Some(status) = status {
                task.status = status;
            }
            if let Some(due) = due {
                task.due_date = if due.trim().is_empty() {
                    None
                } else {
                    Some(parse_timestamp(&due).ok_or_else(|| format!("Invalid due date '{}'", due))?)
                };
            }
            service.update_task(&task).await?;
            println!("Task {} updated.", id);
        }
        Commands::Status { id, status } => {
            service.refresh().await?;
            let id = TaskId::from(id);
            service.set_status(&id, status).await?;
            println!("Task {} is now {}.", id, status.label());
        }
        Commands::Done { id } => {
            let id = TaskId::from(id);
            service.complete_task(&id).await?;
            println!("Task {} completed.", id);
        }
        Commands::Delete { id, yes } => {
            if !yes && !confirm("Are you sure you want to delete this task?")? {
                return Ok(());
            }
            let id = TaskId::from(id);
            service.delete_task(&id).await?;
            println!("Task {} deleted.", id);
        }
        Commands::Signup { .. } | Commands::Login { .. } | Commands::Logout => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load().with_api_url(cli.api_url);
    init_logging(&config);

    let client = ApiClient::new(&config.api_url)?;

    match cli.command {
        Commands::Signup { name, email } => signup(&client, name, email).await,
        Commands::Login { email } => login(&client, email).await,
        Commands::Logout => {
            keyring::delete_token(&config.api_url).await?;
            println!("Logged out.");
            Ok(())
        }
        command => {
            let Some(token) = keyring::load_token(&config.api_url).await? else {
                return Err("Not logged in. Run `finish-it login <email>` first.".into());
            };
            let mut service = TaskService::new(client, Session::with_token(token));
            let result = run_task_command(&mut service, command, &config).await;
            if !service.session().is_authenticated() {
                keyring::delete_token(&config.api_url).await?;
                return Err("Session expired. Please log in again with `finish-it login <email>`.".into());
            }
            result
        }
    }
}
