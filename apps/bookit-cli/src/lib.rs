//! # bookit-cli
//!
//! Terminal front-end over `bookit-client`. Each subcommand signs in, mounts
//! one view (or runs one mutation), waits for it to settle and prints the
//! outcome. Toasts are rendered as log lines.
//!
//! ```text
//! bookit --email sam@example.com --password ... listings
//! bookit bookings --past
//! bookit search tennis
//! bookit show 12
//! bookit delete booking 9f1c... --yes
//! bookit review 12 5 "Great court"
//! bookit register sam
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use bookit_client::{
    auth, AvailabilityEnricher, ClientConfig, ClientContext, DeleteWorkflow, ListingDetailView,
    MutationOutcome, Mutations, MyBookingsView, MyListingsView, Notifier, SearchView, Severity,
    Toast, ViewBinder,
};
use bookit_core::{
    Booking, BookingTab, CollectionStatus, Listing, PendingDeletion, ResourceId, ResourceKind,
    ReviewDraft,
};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "bookit", version, about = "BookIt booking client")]
pub struct Cli {
    /// Path to bookit.toml (defaults to the platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    #[arg(long, env = "BOOKIT_EMAIL", global = true)]
    pub email: Option<String>,

    #[arg(long, env = "BOOKIT_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// List your own listings with their open slots
    Listings,
    /// List your bookings
    Bookings {
        /// Show past bookings instead of upcoming ones
        #[arg(long)]
        past: bool,
    },
    /// Search everyone's listings
    Search { query: String },
    /// Show one listing
    Show { listing_id: i64 },
    /// Delete a listing, availability, booking or review
    Delete {
        /// listing | availability | booking | review
        kind: String,
        id: String,
        /// Confirm without asking
        #[arg(long)]
        yes: bool,
    },
    /// Rate a listing from 1 to 5
    Review {
        listing_id: i64,
        rating: u8,
        #[arg(default_value = "")]
        comment: String,
    },
    /// Create an account
    Register { username: String },
}

// =============================================================================
// Toasts
// =============================================================================

/// Renders toasts as log lines.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.severity {
            Severity::Error => error!(toast = %toast.id, "{}", toast.message),
            Severity::Success | Severity::Info => info!(toast = %toast.id, "{}", toast.message),
        }
    }
}

// =============================================================================
// Runner
// =============================================================================

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(Some(path.clone()))
            .with_context(|| format!("loading {}", path.display()))?,
        None => ClientConfig::load_or_default(None),
    };
    if let Some(url) = &cli.backend_url {
        config.backend.url = Some(url.clone());
    }

    let ctx = ClientContext::builder(config)
        .notifier(Arc::new(TracingNotifier))
        .build()?;

    let email = cli.email.as_deref().unwrap_or_default();
    let password = cli.password.as_deref().unwrap_or_default();

    if let Command::Register { username } = &cli.command {
        let user = auth::register(&ctx, username, email, password).await?;
        println!("Registered {} (#{})", user.username, user.user_id);
        return Ok(());
    }

    auth::login(&ctx, email, password).await?;
    let binder = ViewBinder::new(ctx.clone());

    match cli.command {
        Command::Listings => {
            let mounted = binder.mount(Arc::new(MyListingsView)).await;
            mounted.settle().await;
            let cached = ctx.store.my_listings().get().await;
            ensure_loaded(cached.status, "your listings")?;

            let cards = AvailabilityEnricher::new(ctx.clone())
                .cards(mounted.scope(), &cached.items)
                .await;
            for card in &cards {
                println!(
                    "{}  [{}/{} open]",
                    format_listing(&card.listing),
                    card.available_count(),
                    card.availabilities.len()
                );
            }
        }
        Command::Bookings { past } => {
            let view = Arc::new(MyBookingsView::new());
            if past {
                view.select(BookingTab::Past);
            }
            let mounted = binder.mount(view).await;
            mounted.settle().await;
            ensure_loaded(ctx.store.bookings().get().await.status, "your bookings")?;

            for booking in mounted.view().visible(&ctx).await {
                println!("{}", format_booking(&booking));
            }
        }
        Command::Search { query } => {
            let mounted = binder.mount(Arc::new(SearchView::new(query))).await;
            mounted.settle().await;
            let cached = ctx.store.search_results().get().await;
            ensure_loaded(cached.status, "search results")?;

            for listing in &cached.items {
                println!("{}", format_listing(listing));
            }
        }
        Command::Show { listing_id } => {
            let mounted = binder.mount(Arc::new(ListingDetailView::new(listing_id))).await;
            mounted.settle().await;
            let cached = ctx.store.listing_detail().get().await;
            ensure_loaded(cached.status, "the listing")?;

            let listing = cached
                .items
                .ok_or_else(|| anyhow!("listing {} not found", listing_id))?;
            println!("{}", format_listing(&listing));
            println!("  {}", listing.address);
            if !listing.description.is_empty() {
                println!("  {}", listing.description);
            }
        }
        Command::Delete { kind, id, yes } => {
            let kind: ResourceKind = kind.parse()?;
            let target = PendingDeletion::new(ResourceId::parse_for(kind, &id)?, kind)?;
            delete(&ctx, target, yes).await?;
        }
        Command::Review {
            listing_id,
            rating,
            comment,
        } => {
            let draft = ReviewDraft {
                listing_id,
                rating,
                comment,
            };
            into_result(Mutations::new(ctx.clone()).create_review(&draft).await)?;
            println!("Review saved");
        }
        Command::Register { .. } => {}
    }

    Ok(())
}

async fn delete(ctx: &ClientContext, target: PendingDeletion, confirmed: bool) -> anyhow::Result<()> {
    let workflow = DeleteWorkflow::new(ctx.clone());
    println!("{}", target.title());
    println!("{}", target.prompt());
    workflow.request(target).await?;

    if !confirmed {
        workflow.cancel().await?;
        println!("Cancelled (pass --yes to confirm)");
        return Ok(());
    }

    let report = workflow.confirm().await?;
    if let Some(path) = report.redirected_to {
        info!(to = path, "Redirected");
    }
    into_result(report.outcome)?;
    println!("Deleted");
    Ok(())
}

fn ensure_loaded(status: CollectionStatus, what: &str) -> anyhow::Result<()> {
    match status {
        CollectionStatus::Success => Ok(()),
        other => bail!("could not load {} ({})", what, other.as_str()),
    }
}

fn into_result(outcome: MutationOutcome) -> anyhow::Result<()> {
    match outcome {
        MutationOutcome::Succeeded => Ok(()),
        MutationOutcome::Failed { message } | MutationOutcome::Rejected { message } => {
            Err(anyhow!(message))
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

pub fn format_listing(listing: &Listing) -> String {
    let rating = listing
        .avg_rating
        .map(|r| format!("{:.1}★", r))
        .unwrap_or_else(|| "unrated".to_string());
    let category = if listing.category.is_empty() {
        "uncategorised"
    } else {
        &listing.category
    };
    format!(
        "#{:<5} {}  ({}, {}, by {})",
        listing.listing_id, listing.listing_name, category, rating, listing.username
    )
}

pub fn format_booking(booking: &Booking) -> String {
    let when = |secs: Option<i64>| {
        secs.and_then(|s| Utc.timestamp_opt(s, 0).single())
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "?".to_string())
    };
    let id = booking
        .booking_uuid
        .clone()
        .unwrap_or_else(|| booking.booking_id.to_string());
    format!(
        "{}  {}  {} → {}",
        id,
        booking.listing_name.as_deref().unwrap_or("(listing)"),
        when(booking.start_time),
        when(booking.end_time)
    )
}
