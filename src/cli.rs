use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use directories::ProjectDirs;
use flexi_logger::{Duplicate, FileSpec, Logger, LoggerHandle};
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::address::{Address, ListingAddress};
use crate::admin_client::AdminClient;
use crate::bulk::BulkAction;
use crate::config::{Config, CONFIG};
use crate::confirm::{AutoConfirm, Confirmer, StdinConfirmer};
use crate::controller::{AdminController, ControllerSettings, ListingView};
use crate::error::BookDeskError;
use crate::events::AdminEvent;
use crate::format::{format_currency, format_date_str};
use crate::notices::{NoticeBoard, NoticeKind};
use crate::query_state::{QueryState, SortDirection};
use crate::validation::{validate_form, FieldKind, FormField};

const TICK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(
    name = "bookdesk",
    version,
    about = "bookdesk: admin panel client for the bookstore"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the listing address for a pagination/sort/search/filter state
    Url {
        #[command(flatten)]
        state: StateArgs,
    },

    /// Print the export address for a listing state
    Export {
        #[command(flatten)]
        state: StateArgs,

        /// Export format (default from config, normally "excel")
        #[arg(long = "format")]
        format: Option<String>,
    },

    /// Change the status of one item
    Status {
        /// Status endpoint of the item, absolute or relative to the base URL
        url: String,

        /// New status ("active" or anything else for passive)
        status: String,

        /// Skip the confirmation prompt
        #[arg(long = "yes", short = 'y', default_value_t = false)]
        yes: bool,
    },

    /// Apply a bulk action to a set of item ids
    Bulk {
        /// One of: delete, activate, deactivate, export
        action: BulkAction,

        /// Item ids
        ids: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(long = "yes", short = 'y', default_value_t = false)]
        yes: bool,
    },

    /// Validate form fields given as NAME:KIND[:required]=VALUE
    Validate {
        #[arg(long = "field", short = 'f', value_parser = parse_field)]
        fields: Vec<FormField>,
    },

    /// Format a value the way the admin pages display it
    Format {
        #[command(subcommand)]
        value: FormatCommand,
    },

    /// Drive a listing interactively: one command per line on stdin
    Browse {
        #[command(flatten)]
        state: StateArgs,

        /// Answer yes to every confirmation (otherwise they are declined)
        #[arg(long = "yes", short = 'y', default_value_t = false)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum FormatCommand {
    /// Turkish lira amount
    Currency { amount: f64 },
    /// Date or date-time (RFC 3339 or YYYY-MM-DD[THH:MM[:SS]])
    Date { value: String },
}

#[derive(Args, Debug, Default)]
pub struct StateArgs {
    /// Start from an existing query string instead of the defaults
    #[arg(long = "from")]
    from: Option<String>,

    /// Sort as FIELD or FIELD,asc|desc
    #[arg(long = "sort")]
    sort: Option<String>,

    #[arg(long = "size")]
    size: Option<u32>,

    #[arg(long = "search")]
    search: Option<String>,

    /// Filter as NAME=VALUE (repeatable)
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Applied last, so the other options do not reset it
    #[arg(long = "page")]
    page: Option<u32>,
}

impl StateArgs {
    fn build(&self, config: &Config) -> Result<QueryState, BookDeskError> {
        let defaults = config.ui.query_defaults();
        let mut state = match &self.from {
            Some(query) => QueryState::from_query_string(query, &defaults),
            None => QueryState::new(&defaults),
        };

        if let Some(sort) = &self.sort {
            match sort.split_once(',') {
                Some((field, dir)) => {
                    let direction = dir.parse::<SortDirection>().map_err(|_| {
                        BookDeskError::Error(format!("Invalid sort direction: '{}'", dir))
                    })?;
                    state.set_sort(field, direction);
                }
                None => state.toggle_sort(sort),
            }
        }
        if let Some(size) = self.size {
            state.set_page_size(size);
        }
        if let Some(search) = &self.search {
            state.set_search(search);
        }
        for (name, value) in &self.filters {
            state.set_filter(name, value);
        }
        if let Some(page) = self.page {
            state.set_page(page);
        }

        Ok(state)
    }
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

fn parse_field(s: &str) -> Result<FormField, String> {
    let (head, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME:KIND[:required]=VALUE, got '{}'", s))?;

    let mut parts = head.split(':');
    let name = parts.next().filter(|n| !n.is_empty()).ok_or("missing field name")?;
    let kind = parts
        .next()
        .unwrap_or("text")
        .parse::<FieldKind>()
        .map_err(|_| format!("unknown field kind in '{}'", head))?;
    let required = match parts.next() {
        None => false,
        Some("required") => true,
        Some(other) => return Err(format!("unknown field flag '{}'", other)),
    };

    Ok(FormField::new(name, kind, required, value))
}

/// One line typed at the `browse` prompt. A bare `export` uses
/// `export_format`.
pub fn parse_browse_line(line: &str, export_format: &str) -> Result<Option<AdminEvent>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    let number = |what: &str| {
        rest.parse::<u32>()
            .map_err(|_| format!("{} expects a number, got '{}'", what, rest))
    };

    let event = match verb {
        "search" => AdminEvent::SearchInput(rest.to_string()),
        "submit" => AdminEvent::SearchSubmitted(rest.to_string()),
        "filter" => {
            let (name, value) = parse_filter(rest)?;
            AdminEvent::FilterChanged { name, value }
        }
        "clear" => AdminEvent::FiltersCleared,
        "sort" if !rest.is_empty() => AdminEvent::SortClicked(rest.to_string()),
        "size" => AdminEvent::PageSizeChanged(number("size")?),
        "page" => AdminEvent::PageRequested(number("page")?),
        "rows" => AdminEvent::RowsShown(rest.split_whitespace().map(str::to_string).collect()),
        "select" => match rest {
            "all" => AdminEvent::SelectAll(true),
            "none" => AdminEvent::SelectAll(false),
            _ => return Err("select expects 'all' or 'none'".to_string()),
        },
        "toggle" if !rest.is_empty() => AdminEvent::ItemToggled(rest.to_string()),
        "action" => AdminEvent::BulkActionChosen(match rest {
            "" | "none" => None,
            name => Some(
                name.parse::<BulkAction>()
                    .map_err(|_| format!("unknown bulk action '{}'", name))?,
            ),
        }),
        "apply" => AdminEvent::BulkApply,
        "delete" => {
            let mut parts = rest.splitn(3, ' ');
            match (parts.next(), parts.next()) {
                (Some(id), Some(url)) if !id.is_empty() => AdminEvent::DeleteRequested {
                    id: id.to_string(),
                    url: url.to_string(),
                    name: parts.next().map(str::to_string),
                },
                _ => return Err("delete expects: ID URL [NAME]".to_string()),
            }
        }
        "status" => {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            match parts.as_slice() {
                [id, status, url] => AdminEvent::StatusRequested {
                    id: id.to_string(),
                    status: status.to_string(),
                    url: url.to_string(),
                },
                _ => return Err("status expects: ID STATUS URL".to_string()),
            }
        }
        "open" if !rest.is_empty() => AdminEvent::RowClicked {
            href: rest.to_string(),
            on_control: false,
        },
        "export" => AdminEvent::ExportRequested(if rest.is_empty() {
            export_format.to_string()
        } else {
            rest.to_string()
        }),
        "loaded" => AdminEvent::PageLoaded,
        _ => return Err(format!("unknown command '{}'", line)),
    };

    Ok(Some(event))
}

fn print_notices(board: &NoticeBoard) {
    // Board is newest first; print in the order they happened
    for notice in board.notices().iter().rev() {
        println!("[{}] {}", notice.kind, notice.message);
    }
}

/// Danger notices mean the request failed; warnings mean it was rejected
/// before being sent.
fn outcome(board: &NoticeBoard) -> Result<(), BookDeskError> {
    for notice in board.notices() {
        match notice.kind {
            NoticeKind::Danger => return Err(BookDeskError::Error(notice.message.clone())),
            NoticeKind::Warning => return Err(BookDeskError::BulkRejected(notice.message.clone())),
            NoticeKind::Success | NoticeKind::Info => {}
        }
    }
    Ok(())
}

impl Cli {
    pub fn handle_command_line() -> Result<(), BookDeskError> {
        let args = Cli::parse();

        let project_dirs = ProjectDirs::from("", "", "bookdesk").ok_or_else(|| {
            BookDeskError::Error("Could not determine project directories".to_string())
        })?;
        let config = CONFIG.get_or_init(|| Config::load_config(&project_dirs));

        // Browse reports notices as they happen
        let echo = match args.command {
            Command::Browse { .. } => Duplicate::Info,
            _ => Duplicate::Warn,
        };
        let _logger = Self::start_logger(&project_dirs, config, echo)?;

        debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

        match args.command {
            Command::Url { state } => Self::print_url(config, &state, None),
            Command::Export { state, format } => {
                let format = format.unwrap_or_else(|| config.ui.export_format.clone());
                Self::print_url(config, &state, Some(&format))
            }
            Command::Status { url, status, yes } => {
                Self::block_on(Self::change_status(config, url, status, Self::confirmer(yes)))
            }
            Command::Bulk { action, ids, yes } => {
                Self::block_on(Self::bulk_action(config, action, ids, Self::confirmer(yes)))
            }
            Command::Validate { fields } => Self::validate(&fields),
            Command::Format { value } => {
                match value {
                    FormatCommand::Currency { amount } => println!("{}", format_currency(amount)),
                    FormatCommand::Date { value } => match format_date_str(&value) {
                        Some(formatted) => println!("{}", formatted),
                        None => {
                            return Err(BookDeskError::Error(format!(
                                "Unrecognized date: '{}'",
                                value
                            )))
                        }
                    },
                }
                Ok(())
            }
            Command::Browse { state, yes } => Self::block_on(Self::browse(config, state, yes)),
        }
    }

    fn start_logger(
        project_dirs: &ProjectDirs,
        config: &Config,
        echo: Duplicate,
    ) -> Result<LoggerHandle, BookDeskError> {
        let log_dir = project_dirs.data_local_dir().join("logs");

        Logger::try_with_str(format!("bookdesk={}", config.logging.bookdesk))
            .and_then(|logger| {
                logger
                    .log_to_file(FileSpec::default().directory(log_dir))
                    .duplicate_to_stderr(echo)
                    .format_for_files(flexi_logger::detailed_format)
                    .start()
            })
            .map_err(|e| BookDeskError::Error(format!("Failed to start logger: {}", e)))
    }

    fn block_on<F>(future: F) -> Result<(), BookDeskError>
    where
        F: std::future::Future<Output = Result<(), BookDeskError>>,
    {
        let rt = tokio::runtime::Runtime::new()
            .map_err(|e| BookDeskError::Error(format!("Failed to create runtime: {}", e)))?;
        rt.block_on(future)
    }

    fn confirmer(yes: bool) -> Box<dyn Confirmer> {
        if yes {
            Box::new(AutoConfirm(true))
        } else {
            Box::new(StdinConfirmer)
        }
    }

    fn client(config: &Config) -> Result<AdminClient, BookDeskError> {
        AdminClient::new(&config.admin.base_url, &config.admin.bulk_action_path)
    }

    fn settings(config: &Config) -> ControllerSettings {
        ControllerSettings {
            search_debounce: config.ui.search_debounce(),
            reload_delay: config.ui.reload_delay(),
            alert_timeout: config.ui.alert_timeout(),
            toast_timeout: config.ui.toast_timeout(),
            dev_hosts: config.ui.dev_hosts.clone(),
        }
    }

    fn controller<C: Confirmer>(
        config: &Config,
        state: QueryState,
        confirmer: C,
    ) -> Result<AdminController<ListingAddress, C>, BookDeskError> {
        let client = Self::client(config)?;
        let address = ListingAddress::new(client.clone(), &config.admin.listing_path)?;
        Ok(AdminController::new(
            ListingView::new(state),
            address,
            confirmer,
            client,
            Self::settings(config),
        ))
    }

    fn print_url(config: &Config, args: &StateArgs, export: Option<&str>) -> Result<(), BookDeskError> {
        let state = args.build(config)?;
        let mut url = Self::client(config)?.resolve(&config.admin.listing_path)?;
        let query = match export {
            Some(format) => state.export_query_string(format),
            None => state.to_query_string(),
        };
        url.set_query(Some(&query));
        println!("{}", url);
        Ok(())
    }

    async fn change_status(
        config: &Config,
        url: String,
        status: String,
        confirmer: Box<dyn Confirmer>,
    ) -> Result<(), BookDeskError> {
        let state = QueryState::new(&config.ui.query_defaults());
        let mut controller = Self::controller(config, state, confirmer)?;
        controller
            .handle(AdminEvent::StatusRequested {
                id: String::new(),
                status,
                url,
            })
            .await;

        print_notices(controller.notices());
        outcome(controller.notices())
    }

    async fn bulk_action(
        config: &Config,
        action: BulkAction,
        ids: Vec<String>,
        confirmer: Box<dyn Confirmer>,
    ) -> Result<(), BookDeskError> {
        let state = QueryState::new(&config.ui.query_defaults());
        let mut controller = Self::controller(config, state, confirmer)?;
        for event in [
            AdminEvent::RowsShown(ids),
            AdminEvent::SelectAll(true),
            AdminEvent::BulkActionChosen(Some(action)),
            AdminEvent::BulkApply,
        ] {
            controller.handle(event).await;
        }

        print_notices(controller.notices());
        outcome(controller.notices())
    }

    fn validate(fields: &[FormField]) -> Result<(), BookDeskError> {
        let errors = validate_form(fields);
        if errors.is_empty() {
            println!("All {} fields are valid", fields.len());
            return Ok(());
        }
        for error in &errors {
            println!("{}: {}", error.field, error.message);
        }
        Err(BookDeskError::Error(format!(
            "{} of {} fields are invalid",
            errors.len(),
            fields.len()
        )))
    }

    async fn browse(config: &Config, args: StateArgs, yes: bool) -> Result<(), BookDeskError> {
        let state = args.build(config)?;
        let mut controller = Self::controller(config, state, AutoConfirm(yes))?;
        info!("Browsing {}", controller.address().current());

        let (tx, rx) = mpsc::unbounded_channel();
        let export_format = config.ui.export_format.clone();

        let reader = async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut ticks = tokio::time::interval(TICK_INTERVAL);
            loop {
                tokio::select! {
                    line = lines.next_line() => {
                        let line = match line {
                            Ok(Some(line)) => line,
                            Ok(None) => break,
                            Err(e) => {
                                eprintln!("Failed to read input: {}", e);
                                break;
                            }
                        };
                        if matches!(line.trim(), "quit" | "exit") {
                            break;
                        }
                        match parse_browse_line(&line, &export_format) {
                            Ok(Some(event)) => {
                                if tx.send(event).is_err() {
                                    break;
                                }
                            }
                            Ok(None) => {}
                            Err(msg) => eprintln!("{}", msg),
                        }
                    }
                    _ = ticks.tick() => {
                        if tx.send(AdminEvent::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        };

        tokio::join!(controller.run(rx), reader);
        Ok(())
    }
}
