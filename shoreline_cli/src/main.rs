//! Command line client for the shoreline file sharing platform.
//!
//! All state lives on a remote backend; this binary signs in, uploads and
//! browses files, and exposes the moderation console to the admin account.
//!
//! Expected syntax: `shoreline upload ./myfiles/data/report.pdf`
//!
//! Supported commands:
//! - `init`, first-time configuration of the server address.
//! - `signup` / `login` / `logout` / `status`, session management.
//! - `upload`, `files`, `delete`, share and manage your own files.
//! - `browse`, `view`, follow another user's share links.
//! - `contact`, message the platform admin.
//! - `admin ...`, the moderation console.

#![warn(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    deprecated
)]

mod admin_views;
mod cli;
mod output;
mod views;

use human_panic::setup_panic;
use lazy_static::lazy_static;
use log::error;
use shoreline_api::ApiClient;
use shoreline_config::{Config, Session};

lazy_static! {
    /// The config file for shoreline
    pub static ref CONFIG: Config = Config::load_config().unwrap_or_else(|e| {
        error!("Failed to load config: {}", e);
        panic!("Failed to load config: {}", e);
    });
}

#[tokio::main]
async fn main() {
    setup_panic!();
    pretty_env_logger::init();

    let matches = cli::build_cli().get_matches();

    // `init` must run before a configuration exists
    if let Some(("init", _)) = matches.subcommand() {
        views::run_init().await;
        return;
    }

    if !Config::exists() {
        eprintln!("No configuration found. Run `shoreline init` to set up this machine.");
        std::process::exit(1);
    }

    let client = ApiClient::new(CONFIG.server_address());
    let session = Session::load();

    match matches.subcommand() {
        Some(("signup", sub)) => views::signup(&client, sub).await,
        Some(("login", sub)) => views::login(&client, sub).await,
        Some(("logout", _)) => views::logout(),
        Some(("status", _)) => views::status(&client, &session).await,
        Some(("upload", sub)) => views::upload(&client, &session, sub).await,
        Some(("files", sub)) => views::my_files(&client, &session, sub).await,
        Some(("delete", sub)) => views::delete(&client, &session, sub).await,
        Some(("browse", sub)) => views::browse(&client, &session, sub).await,
        Some(("view", sub)) => views::view(&client, &session, sub).await,
        Some(("contact", sub)) => views::contact(&client, &session, sub).await,
        Some(("admin", sub)) => admin_views::dispatch(&client, &session, sub).await,
        _ => unreachable!("subcommand required"),
    }
}
