//! The end-user views: everything reachable without admin mode.

use std::io::Write;
use std::path::PathBuf;

use clap::ArgMatches;
use log::{error, warn};

use shoreline_api::models::FileMeta;
use shoreline_api::upload::{Privacy, UploadOwner, UploadState, UploadWorkflow};
use shoreline_api::validation::{
    validate_email, validate_message, validate_name, validate_password, validate_username,
};
use shoreline_api::visibility::FileView;
use shoreline_api::ApiClient;
use shoreline_config::{Config, Session, StoredUser};
use shoreline_database::CachedFile;

use crate::output::{date_key, format_bytes, format_date, truncate};
use crate::CONFIG;

/// Read one trimmed line from stdin after showing a prompt.
pub fn prompt(message: &str) -> String {
    print!("{}", message);
    let _ = std::io::stdout().flush();

    let mut input = String::new();
    std::io::stdin()
        .read_line(&mut input)
        .expect("Failed to read line");
    input.trim().to_string()
}

/// Views past this point require a signed-in user.
fn require_login(session: &Session) -> &StoredUser {
    match session.user() {
        Some(user) => user,
        None => {
            eprintln!("You are not logged in. Run `shoreline login` first.");
            std::process::exit(1);
        }
    }
}

fn fail_validation(field: &str, message: &str) -> ! {
    eprintln!("{}: {}", field, message);
    std::process::exit(1);
}

/// First-run setup: pick a server, write the default config, probe it.
pub async fn run_init() {
    println!("Configuring shoreline for this machine.");

    let hostname = loop {
        let input = prompt("Please enter the hostname of the server you want to connect to: ");

        // the scheme is derived from the TLS answer below
        if input.is_empty() {
            eprintln!("Hostname must not be empty");
            continue;
        }
        if input.contains("http") || input.contains("ws") {
            eprintln!("Hostname should not contain http or ws");
            continue;
        }
        if input.contains('/') {
            eprintln!("Hostname should not contain slashes");
            continue;
        }
        if input.contains(' ') {
            eprintln!("Hostname should not contain spaces");
            continue;
        }

        break input;
    };

    let tls = loop {
        match prompt("Is the server using TLS? [y/n] ").to_lowercase().as_str() {
            "y" => break true,
            "n" => break false,
            _ => eprintln!("Please enter y or n"),
        }
    };

    if let Err(e) = Config::reset_config() {
        error!("Failed to reset config: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = Config::set_hostname(&hostname, tls) {
        error!("Failed to set hostname: {}", e);
        std::process::exit(1);
    }

    let address = match Config::load_config() {
        Ok(config) => format!("{}/users", config.server_address()),
        Err(e) => {
            error!("Failed to re-load config: {}", e);
            std::process::exit(1);
        }
    };

    match tokio::task::spawn_blocking(move || shoreline_config::probe_server(&address)).await {
        Ok(Ok(())) => println!("Connected to the server. You're ready to go."),
        Ok(Err(e)) => {
            warn!("Could not reach the server: {}", e);
            println!("Configuration saved, but the server could not be reached yet.");
        }
        Err(e) => error!("Probe task failed: {}", e),
    }
}

pub async fn signup(client: &ApiClient, matches: &ArgMatches) {
    let username = matches.get_one::<String>("username").expect("required");
    let email = matches.get_one::<String>("email").expect("required");
    let password = matches.get_one::<String>("password").expect("required");

    if let Some(e) = validate_username(username) {
        fail_validation("username", e);
    }
    if let Some(e) = validate_email(email) {
        fail_validation("email", e);
    }
    if let Some(e) = validate_password(password) {
        fail_validation("password", e);
    }

    match client.signup(username, email, password).await {
        Ok(user) => {
            let stored = StoredUser {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
            };
            if let Err(e) = Session::start(stored, false).save() {
                error!("Failed to persist session: {}", e);
            }
            println!("Welcome, {}! Your account is ready.", user.username);
        }
        Err(e) => {
            error!("Signup failed: {}", e);
            eprintln!("Signup failed. The username or email may already be taken.");
            std::process::exit(1);
        }
    }
}

pub async fn login(client: &ApiClient, matches: &ArgMatches) {
    let email = matches.get_one::<String>("email").expect("required");
    let password = matches.get_one::<String>("password").expect("required");

    if let Some(e) = validate_email(email) {
        fail_validation("email", e);
    }
    if let Some(e) = validate_password(password) {
        fail_validation("password", e);
    }

    match client.login(email, password).await {
        Ok(user) => {
            let stored = StoredUser {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
            };
            if let Err(e) = Session::start(stored, false).save() {
                error!("Failed to persist session: {}", e);
            }
            println!("Logged in as {} <{}>.", user.username, user.email);
        }
        Err(e) => {
            error!("Login failed: {}", e);
            eprintln!("Login failed. Check your credentials and try again.");
            std::process::exit(1);
        }
    }
}

pub fn logout() {
    match Session::clear() {
        Ok(()) => println!("Logged out."),
        Err(e) => {
            error!("Failed to clear session: {}", e);
            std::process::exit(1);
        }
    }

    // the cached uploads belong to the account that just signed out
    match shoreline_database::establish_connection(CONFIG.database_location()) {
        Ok(mut conn) => {
            if let Err(e) = shoreline_database::remove_all_cached_files(&mut conn) {
                error!("Failed to clear the local upload cache: {}", e);
            }
        }
        Err(e) => error!("Failed to open the local upload cache: {}", e),
    }
}

/// The home view: who is signed in, and what they have stored.
pub async fn status(client: &ApiClient, session: &Session) {
    let user = require_login(session);

    println!(
        "Logged in as {} <{}>{}",
        user.username,
        user.email,
        if session.is_admin() { " [admin]" } else { "" }
    );
    println!("Server: {}", CONFIG.server_address());
    println!(
        "Your files: {}/{}/files",
        CONFIG.server_address(),
        user.username
    );

    match client.fetch_my_files(user.id).await {
        Ok(files) => {
            let total: u64 = files.iter().map(FileMeta::decoded_size).sum();
            let public = files.iter().filter(|f| f.public).count();
            println!(
                "{} file(s) stored, {} ({} public / {} private)",
                files.len(),
                format_bytes(total),
                public,
                files.len() - public
            );
        }
        Err(e) => {
            error!("Error fetching user files: {}", e);
            println!("The server could not be reached to count your files.");
        }
    }
}

pub async fn upload(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    let user = require_login(session);

    let paths: Vec<PathBuf> = matches
        .get_many::<PathBuf>("file")
        .expect("required")
        .cloned()
        .collect();
    let private = matches.is_present("private");
    let allowed: Vec<String> = matches
        .get_many::<String>("allow")
        .map(|v| v.cloned().collect())
        .unwrap_or_default();

    for email in &allowed {
        if let Some(e) = validate_email(email) {
            fail_validation(email, e);
        }
    }

    let mut workflow = UploadWorkflow::new();
    if let Err(e) = workflow.select_files(paths, *CONFIG.size_limit_bytes()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let privacy = if private {
        Privacy::Private
    } else {
        Privacy::Public
    };
    if let Err(e) = workflow.set_privacy(privacy, allowed) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    println!("Uploading {} file(s)...", workflow.selected().len());

    let owner = UploadOwner {
        user_id: user.id,
        username: &user.username,
        email: &user.email,
    };
    let mut render_progress = |name: &str, percent: u8| {
        print!("\r{} {:>3}%", name, percent);
        let _ = std::io::stdout().flush();
        if percent == 100 {
            println!();
        }
    };

    let outcomes = match workflow
        .run(client, &owner, CONFIG.server_address(), &mut render_progress)
        .await
    {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut cache = match shoreline_database::establish_connection(CONFIG.database_location()) {
        Ok(conn) => Some(conn),
        Err(e) => {
            error!("Failed to open the local upload cache: {}", e);
            None
        }
    };

    for outcome in &outcomes {
        match &outcome.result {
            Ok(uploaded) => {
                println!("{} uploaded.", outcome.file_name);
                if let Some(conn) = cache.as_mut() {
                    let cached = CachedFile {
                        id: uploaded.id,
                        file_name: uploaded.file_name.clone(),
                        file_type: uploaded.file_type.clone(),
                        uploaded_at: uploaded.uploaded_at.clone(),
                        size: uploaded.size as i64,
                        is_public: uploaded.public,
                        share_link: uploaded.share_link.clone(),
                    };
                    if let Err(e) = shoreline_database::insert_cached_file(conn, &cached) {
                        error!("Failed to cache upload {}: {}", uploaded.id, e);
                    }
                }
            }
            Err(e) => eprintln!("{} failed: {}", outcome.file_name, e),
        }
    }

    // single-file uploads get the full confirmation block
    if outcomes.len() == 1 {
        if let Ok(uploaded) = &outcomes[0].result {
            println!();
            println!("The file has been shared!");
            println!("The link to your file is {}", uploaded.share_link);
            if !uploaded.public {
                println!("Allowed users:");
                for email in &uploaded.allowed_users {
                    println!("  {}", email);
                }
            }
        }
    }

    if workflow.state() == UploadState::PartialFailure {
        std::process::exit(1);
    }
}

fn print_file_table(files: &[FileMeta]) {
    println!(
        "{0: <8} | {1: <28} | {2: <10} | {3: <8} | {4: <16}",
        "ID", "Name", "Size", "Privacy", "Uploaded"
    );
    println!(
        "{:-<8}-+-{:-<28}-+-{:-<10}-+-{:-<8}-+-{:-<16}",
        "", "", "", "", ""
    );

    for file in files {
        println!(
            "{0: <8} | {1: <28} | {2: <10} | {3: <8} | {4: <16}",
            file.id,
            truncate(&file.file_name, 28),
            format_bytes(file.decoded_size()),
            if file.public { "public" } else { "private" },
            truncate(&format_date(&file.date), 16),
        );
    }
}

/// The personal dashboard: search, sort and filter over the user's uploads.
pub async fn my_files(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    let user = require_login(session);

    let search = matches
        .get_one::<String>("search")
        .map(|s| s.to_lowercase());
    let sort = matches.get_one::<String>("sort").expect("defaulted");
    let order = matches.get_one::<String>("order").expect("defaulted");
    let privacy = matches.get_one::<String>("privacy").expect("defaulted");

    let mut files = match client.fetch_my_files(user.id).await {
        Ok(files) => files,
        Err(e) => {
            error!("Error fetching user files: {}", e);
            return show_cached_files();
        }
    };

    if let Some(term) = &search {
        files.retain(|f| f.file_name.to_lowercase().contains(term));
    }
    match privacy.as_str() {
        "public" => files.retain(|f| f.public),
        "private" => files.retain(|f| !f.public),
        _ => {}
    }

    files.sort_by(|a, b| {
        let ordering = match sort.as_str() {
            "name" => a
                .file_name
                .to_lowercase()
                .cmp(&b.file_name.to_lowercase()),
            "size" => a.decoded_size().cmp(&b.decoded_size()),
            _ => date_key(&a.date)
                .cmp(&date_key(&b.date))
                .then_with(|| a.date.cmp(&b.date)),
        };
        if order == "asc" {
            ordering
        } else {
            ordering.reverse()
        }
    });

    if files.is_empty() {
        println!("No files found.");
        return;
    }

    print_file_table(&files);
    println!(
        "\nShare links look like {}/{}/files/<id>",
        CONFIG.server_address(),
        user.username
    );
}

/// Offline fallback for the dashboard: whatever the local cache still holds.
fn show_cached_files() {
    let mut conn = match shoreline_database::establish_connection(CONFIG.database_location()) {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to open the local upload cache: {}", e);
            println!("The server could not be reached and no local cache is available.");
            return;
        }
    };

    match shoreline_database::get_cached_files(&mut conn) {
        Ok(cached) if cached.is_empty() => {
            println!("The server could not be reached and the local cache is empty.");
        }
        Ok(cached) => {
            println!("The server could not be reached. Showing locally cached uploads:");
            println!(
                "{0: <8} | {1: <28} | {2: <10} | {3: <8} | {4: <16}",
                "ID", "Name", "Size", "Privacy", "Uploaded"
            );
            println!(
                "{:-<8}-+-{:-<28}-+-{:-<10}-+-{:-<8}-+-{:-<16}",
                "", "", "", "", ""
            );
            for file in cached {
                println!(
                    "{0: <8} | {1: <28} | {2: <10} | {3: <8} | {4: <16}",
                    file.id,
                    truncate(&file.file_name, 28),
                    format_bytes(file.size.max(0) as u64),
                    if file.is_public { "public" } else { "private" },
                    truncate(&format_date(&file.uploaded_at), 16),
                );
            }
        }
        Err(e) => {
            error!("Failed to read the local upload cache: {}", e);
            println!("The server could not be reached and no local cache is available.");
        }
    }
}

pub async fn delete(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    let user = require_login(session);
    let file_id = *matches.get_one::<i64>("id").expect("required");

    let mut cache = match shoreline_database::establish_connection(CONFIG.database_location()) {
        Ok(conn) => Some(conn),
        Err(e) => {
            error!("Failed to open the local upload cache: {}", e);
            None
        }
    };

    let question = cache
        .as_mut()
        .and_then(|conn| {
            shoreline_database::get_cached_file(conn, file_id)
                .ok()
                .flatten()
                .map(|f| {
                    format!(
                        "Are you sure you want to delete \"{}\"? This action cannot be undone. (y/n) ",
                        f.file_name
                    )
                })
        })
        .unwrap_or_else(|| {
            "Are you sure you want to delete this file? This action cannot be undone. (y/n) "
                .to_string()
        });

    if prompt(&question).to_lowercase() != "y" {
        println!("Cancelled.");
        return;
    }

    match client.delete_file(file_id, &user.email).await {
        Ok(true) => {
            println!("File deleted successfully");
            if let Some(conn) = cache.as_mut() {
                if let Err(e) = shoreline_database::remove_cached_file(conn, file_id) {
                    error!("Failed to drop file {} from the cache: {}", file_id, e);
                }
            }
        }
        Ok(false) => println!("Error deleting file"),
        Err(e) => {
            error!("Error deleting file {}: {}", file_id, e);
            println!("Error deleting file");
            std::process::exit(1);
        }
    }
}

/// Public files published by a user, as visible to the current viewer.
pub async fn browse(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    let username = matches.get_one::<String>("username").expect("required");
    let viewer_email = session.user().map(|u| u.email.as_str());

    match client.files_by_username(username, viewer_email).await {
        Ok(files) if files.is_empty() => {
            println!("{} has not published any files you can see.", username);
        }
        Ok(files) => {
            println!("{}'s files:", username);
            print_file_table(&files);
            println!(
                "\nUse `shoreline view {} <id>` to inspect or download a file.",
                username
            );
        }
        Err(e) => {
            error!("Error fetching files for {}: {}", username, e);
            println!("Could not fetch {}'s files.", username);
        }
    }
}

fn print_file_details(username: &str, file: &FileMeta) {
    println!("{}'s file", username);
    println!();
    println!("Name:     {}", file.file_name);
    println!("Type:     {}", file.file_type);
    println!("Size:     {}", format_bytes(file.decoded_size()));
    println!("Uploaded: {}", format_date(&file.date));
    if file.public {
        println!("Access:   public - this URL can be shared with anyone");
    } else {
        println!("Access:   private - only authorized users can view this URL");
        if let Some(allowed) = &file.allowed_users {
            println!("Authorized users: {}", allowed.len());
        }
    }
    println!(
        "URL:      {}/{}/files/{}",
        CONFIG.server_address(),
        username,
        file.id
    );
}

/// Resolve one shared file through the visibility workflow, with the
/// request-access prompt on denial and an optional download.
pub async fn view(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    let username = matches.get_one::<String>("username").expect("required");
    let file_id = *matches.get_one::<i64>("id").expect("required");
    let flag_email = matches.get_one::<String>("email").cloned();

    let viewer_is_owner = session
        .user()
        .map(|u| u.username == *username)
        .unwrap_or(false);
    let mut viewer_email = flag_email
        .clone()
        .or_else(|| session.user().map(|u| u.email.clone()));

    println!("Loading file...");
    let mut state = client
        .resolve_file_view(file_id, viewer_email.as_deref(), viewer_is_owner)
        .await;

    if matches!(state, FileView::Denied(_)) {
        if let FileView::Denied(file) = &state {
            println!("This file is private and requires authorization to access.");
            if let Some(allowed) = &file.allowed_users {
                println!("Authorized users: {}", allowed.len());
            }
        }

        let email = match flag_email {
            Some(email) => email,
            None => prompt("Enter your email address: "),
        };
        if let Some(e) = validate_email(&email) {
            fail_validation("email", e);
        }

        state = client.request_access(state, &email).await;
        if matches!(state, FileView::Granted(_)) {
            println!("Access Granted! Your email has been verified.");
            viewer_email = Some(email);
        }
    }

    match state {
        FileView::Granted(file) => {
            print_file_details(username, &file);

            if matches.is_present("save") {
                let bytes = match client.download_file(file_id, viewer_email.as_deref()).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        error!("Download of file {} failed: {}", file_id, e);
                        eprintln!("Download failed.");
                        std::process::exit(1);
                    }
                };

                let dir = CONFIG.download_location();
                if let Err(e) = std::fs::create_dir_all(dir) {
                    error!("Failed to create download directory: {}", e);
                    std::process::exit(1);
                }
                let target = dir.join(&file.file_name);
                match std::fs::write(&target, bytes) {
                    Ok(()) => println!("Downloading {}... saved to {}", file.file_name, target.display()),
                    Err(e) => {
                        error!("Failed to write download: {}", e);
                        std::process::exit(1);
                    }
                }
            }
        }
        FileView::Denied(_) => {
            println!("Your email is not authorized to access this file");
            std::process::exit(1);
        }
        FileView::NotFound => {
            println!(
                "The file \"{}\" doesn't exist or is no longer available.",
                file_id
            );
            std::process::exit(1);
        }
        FileView::Loading => unreachable!("resolution always leaves the loading state"),
    }
}

/// The contact form. Name and email prefill from the OS account and the
/// session; all fields validate before the message is sent.
pub async fn contact(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    let username = session
        .user()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "Guest".to_string());
    let name = matches
        .get_one::<String>("name")
        .cloned()
        .unwrap_or_else(whoami::realname);
    let email = matches
        .get_one::<String>("email")
        .cloned()
        .or_else(|| session.user().map(|u| u.email.clone()))
        .unwrap_or_default();
    let message = matches.get_one::<String>("message").expect("required");

    let mut invalid = false;
    if let Some(e) = validate_name(&name) {
        eprintln!("name: {}", e);
        invalid = true;
    }
    if let Some(e) = validate_email(&email) {
        eprintln!("email: {}", e);
        invalid = true;
    }
    if let Some(e) = validate_message(message) {
        eprintln!("message: {}", e);
        invalid = true;
    }
    if invalid {
        std::process::exit(1);
    }

    match client.send_message(&username, &name, &email, message).await {
        Ok(_) => {
            println!("Your message has been sent to the admin! We'll get back to you soon.");
        }
        Err(e) => {
            error!("Failed to send message: {}", e);
            eprintln!("Your message could not be sent. Please try again later.");
            std::process::exit(1);
        }
    }
}
