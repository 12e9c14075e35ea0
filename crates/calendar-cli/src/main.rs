//! `calgrid` CLI - render calendar pages from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Current month as a text grid
//! calgrid show
//!
//! # Three months from a configuration file, starting in March 2026
//! calgrid show -c calendar.json --year 2026 --month 3 --columns 3
//!
//! # Week view, Monday first, moved two pages forward, as JSON
//! calgrid show --view weekly --first-day mon --move 2 --format json
//!
//! # List page addresses between two months
//! calgrid pages --from 2026-01 --to 2026-06
//! ```

mod logging;

use anyhow::{bail, Context, Result};
use calendar_engine::grid::Page;
use calendar_engine::page::page_range_to_array;
use calendar_engine::{
    Calendar, CalendarConfig, Locale, LocaleConfig, MoveOptions, MoveTarget, PageAddress,
    PageView,
};
use chrono::{NaiveDate, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::info;

#[derive(Parser)]
#[command(name = "calgrid", version, about = "Render calendar pages as text or JSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum ViewArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<ViewArg> for PageView {
    fn from(view: ViewArg) -> Self {
        match view {
            ViewArg::Daily => PageView::Daily,
            ViewArg::Weekly => PageView::Weekly,
            ViewArg::Monthly => PageView::Monthly,
        }
    }
}

#[derive(clap::Args)]
struct LocaleArgs {
    /// JSON calendar configuration file
    #[arg(short, long)]
    config: Option<String>,
    /// IANA timezone (overrides the configuration)
    #[arg(long)]
    timezone: Option<String>,
    /// First day of the week, e.g. "sun" or "mon"
    #[arg(long)]
    first_day: Option<String>,
    /// Page view (overrides the configuration)
    #[arg(long, value_enum)]
    view: Option<ViewArg>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the displayed pages
    Show {
        #[command(flatten)]
        locale: LocaleArgs,
        /// Year of the first page
        #[arg(long, requires = "month")]
        year: Option<i32>,
        /// Month of the first page (1-12)
        #[arg(long, requires = "year")]
        month: Option<u32>,
        #[arg(long)]
        rows: Option<u32>,
        #[arg(long)]
        columns: Option<u32>,
        /// Date treated as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
        /// Bring the page containing this date into view (YYYY-MM-DD)
        #[arg(long, conflicts_with = "move_by")]
        goto: Option<NaiveDate>,
        /// Pages to move after the initial render (negative moves back)
        #[arg(long = "move", allow_hyphen_values = true)]
        move_by: Option<i32>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List page addresses from one month to another, inclusive
    Pages {
        #[command(flatten)]
        locale: LocaleArgs,
        /// First month (YYYY-MM)
        #[arg(long)]
        from: String,
        /// Last month (YYYY-MM)
        #[arg(long)]
        to: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Show {
            locale,
            year,
            month,
            rows,
            columns,
            today,
            goto,
            move_by,
            format,
        } => {
            let (mut config, locale) = load(&locale)?;
            if let (Some(year), Some(month)) = (year, month) {
                config.initial_page = Some(PageAddress::month(year, month));
            }
            if let Some(rows) = rows {
                config.rows = rows;
            }
            if let Some(columns) = columns {
                config.columns = columns;
            }

            let mut builder = Calendar::builder(config).locale(locale);
            if let Some(today) = today {
                builder = builder.today(today);
            }
            let mut calendar = builder.build().context("Failed to build calendar")?;

            if let Some(pages) = move_by {
                if !calendar.move_by(pages, MoveOptions::default()) {
                    bail!("Cannot move {pages} page(s): outside the allowed page range");
                }
                info!(pages, "moved");
            }
            if let Some(date) = goto {
                if !calendar.move_to(MoveTarget::Date(date), MoveOptions::default()) {
                    bail!("Cannot show {date}: outside the allowed page range");
                }
                info!(%date, "moved to date");
            }

            match format {
                OutputFormat::Text => print!("{}", render_text(&calendar)),
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&render_json(&calendar))?)
                }
            }
        }
        Commands::Pages { locale, from, to } => {
            let (config, locale) = load(&locale)?;
            let from = parse_month(&from)?;
            let to = parse_month(&to)?;
            for page in page_range_to_array(&from, &to, config.view, &locale) {
                println!("{}", serde_json::to_string(&page)?);
            }
        }
    }

    Ok(())
}

/// Read the configuration file (if any) and apply command-line overrides.
fn load(args: &LocaleArgs) -> Result<(CalendarConfig, Locale)> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path))?;
            CalendarConfig::from_json(&json)
                .with_context(|| format!("Invalid calendar configuration: {}", path))?
        }
        None => CalendarConfig::default(),
    };
    if let Some(view) = args.view {
        config.view = view.into();
    }

    let mut locale_config = config.locale.clone().unwrap_or_else(LocaleConfig::default);
    if let Some(timezone) = &args.timezone {
        locale_config.timezone = timezone.clone();
    }
    if let Some(first_day) = &args.first_day {
        locale_config.first_day_of_week = first_day
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("Unknown weekday: '{}'", first_day))?;
    }
    let locale = Locale::new(locale_config).context("Invalid locale")?;
    Ok((config, locale))
}

fn parse_month(text: &str) -> Result<PageAddress> {
    let (year, month) = text
        .split_once('-')
        .with_context(|| format!("Expected YYYY-MM, got '{}'", text))?;
    let page = PageAddress::month(
        year.parse().with_context(|| format!("Invalid year in '{}'", text))?,
        month.parse().with_context(|| format!("Invalid month in '{}'", text))?,
    );
    if !page.is_valid() {
        bail!("Invalid month: '{}'", text);
    }
    Ok(page)
}

/// Text grid: one block per page. Days outside the month are blank on
/// monthly pages; `*` marks days with attribute cells, `x` disabled days.
fn render_text(calendar: &Calendar) -> String {
    let mut out = String::new();
    for page in calendar.pages() {
        out.push_str(&page.title);
        out.push('\n');
        out.push_str(&render_page_grid(calendar, page));
        out.push('\n');
    }
    out
}

fn render_page_grid(calendar: &Calendar, page: &Page) -> String {
    let mut out = String::new();
    let header: Vec<String> = page
        .weekdays
        .iter()
        .map(|weekday| format!("{:>3} ", weekday.short_label.chars().take(2).collect::<String>()))
        .collect();
    out.push_str(header.concat().trim_end());
    out.push('\n');

    for week in page.view_weeks() {
        let mut line = String::new();
        for day in page.week_days(week) {
            let shown = page.view != PageView::Monthly || day.in_month;
            let visible = page.view_days().iter().any(|d| d.day_index == day.day_index);
            if !shown || !visible {
                line.push_str("    ");
                continue;
            }
            let marker = if day.is_disabled {
                'x'
            } else if calendar
                .day_cells(day.date)
                .iter()
                .any(|cell| cell.data.key != calendar_engine::attribute::DISABLED_KEY)
            {
                '*'
            } else {
                ' '
            };
            line.push_str(&format!("{:>3}{}", day.day, marker));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn render_json(calendar: &Calendar) -> serde_json::Value {
    let pages: Vec<serde_json::Value> = calendar
        .pages()
        .iter()
        .map(|page| {
            let days: Vec<serde_json::Value> = page
                .view_days()
                .iter()
                .filter(|day| page.view != PageView::Monthly || day.in_month)
                .map(|day| {
                    let attributes: Vec<&str> = calendar
                        .day_cells(day.date)
                        .iter()
                        .map(|cell| cell.data.key.as_str())
                        .collect();
                    json!({
                        "id": day.id,
                        "weekday": day.weekday.to_string(),
                        "weeknumber": day.weeknumber,
                        "isoWeeknumber": day.iso_weeknumber,
                        "isToday": day.is_today,
                        "isDisabled": day.is_disabled,
                        "isFocusable": day.is_focusable,
                        "attributes": attributes,
                    })
                })
                .collect();
            json!({
                "id": page.id,
                "title": page.title,
                "view": page.view.as_str(),
                "address": page.address,
                "days": days,
            })
        })
        .collect();
    json!({
        "transition": calendar.transition().as_str(),
        "canMovePrev": calendar.can_move_prev(),
        "canMoveNext": calendar.can_move_next(),
        "pages": pages,
    })
}
