//! The moderation console, reachable only with an admin session.

use clap::ArgMatches;
use log::error;

use shoreline_api::admin::AdminConsole;
use shoreline_api::validation::{validate_email, validate_password};
use shoreline_api::ApiClient;
use shoreline_config::{Session, StoredUser};

use crate::output::{format_bytes, format_date, truncate};
use crate::views::prompt;
use crate::CONFIG;

pub async fn dispatch(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    match matches.subcommand() {
        Some(("login", sub)) => login(client, sub).await,
        Some(("overview", _)) => overview(client, session).await,
        Some(("users", sub)) => users(client, session, sub).await,
        Some(("files", sub)) => files(client, session, sub).await,
        Some(("messages", sub)) => messages(client, session, sub).await,
        _ => unreachable!("subcommand required"),
    }
}

fn require_admin(session: &Session) {
    if !session.is_admin() {
        eprintln!("Admin access required. Run `shoreline admin login` first.");
        std::process::exit(1);
    }
}

/// Admin sign-in is the same server-verified credential exchange as a
/// normal login; the admin flag is only set when the authenticated account
/// is the configured admin address. No credentials live in this binary.
async fn login(client: &ApiClient, matches: &ArgMatches) {
    let email = matches.get_one::<String>("email").expect("required");
    let password = matches.get_one::<String>("password").expect("required");

    if let Some(e) = validate_email(email) {
        eprintln!("email: {}", e);
        std::process::exit(1);
    }
    if let Some(e) = validate_password(password) {
        eprintln!("password: {}", e);
        std::process::exit(1);
    }

    match client.login(email, password).await {
        Ok(user) if user.email == *CONFIG.admin_email() => {
            let stored = StoredUser {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
            };
            if let Err(e) = Session::start(stored, true).save() {
                error!("Failed to persist session: {}", e);
            }
            println!("Signed in to the admin dashboard as {}.", user.username);
        }
        Ok(user) => {
            error!("{} authenticated but is not the admin account", user.email);
            eprintln!("Invalid admin credentials");
            std::process::exit(1);
        }
        Err(e) => {
            error!("Admin login failed: {}", e);
            eprintln!("Invalid admin credentials");
            std::process::exit(1);
        }
    }
}

/// The overview tab: platform-wide stats over users, files and messages.
async fn overview(client: &ApiClient, session: &Session) {
    require_admin(session);

    let mut console = AdminConsole::new(client, CONFIG.admin_email());
    console.fetch_all().await;

    let users = &console.user_stats;
    let files = &console.file_stats;

    println!("Platform overview");
    println!();
    println!("Users:          {}", users.total_users);
    println!("Files:          {}", users.total_files);
    println!("Storage used:   {}", format_bytes(users.total_storage));
    println!(
        "Visibility:     {} public / {} private",
        users.public_files, users.private_files
    );
    println!("Average size:   {}", format_bytes(files.average_size));

    if !files.file_types.is_empty() {
        println!();
        println!("Files by type:");
        for (kind, count) in &files.file_types {
            println!("  {0: <12} {1}", kind, count);
        }
    }

    let unread = console.messages.iter().filter(|m| !m.viewed).count();
    println!();
    println!(
        "Messages:       {} total, {} unread",
        console.messages.len(),
        unread
    );
}

async fn users(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    require_admin(session);

    let mut console = AdminConsole::new(client, CONFIG.admin_email());
    console.fetch_all().await;

    if let Some(user_id) = matches.get_one::<i64>("delete") {
        let username = console
            .users
            .iter()
            .find(|u| u.id == *user_id)
            .map(|u| u.username.clone())
            .unwrap_or_else(|| user_id.to_string());

        let answer = prompt(&format!(
            "Are you sure you want to delete user \"{}\"? This will also delete all their files. (y/n) ",
            username
        ));
        if answer.to_lowercase() != "y" {
            println!("Cancelled.");
            return;
        }

        match console.delete_user(*user_id).await {
            Ok(()) => println!(
                "User {} deleted. {} user(s) and {} file(s) remain.",
                username, console.user_stats.total_users, console.user_stats.total_files
            ),
            Err(e) => {
                error!("Failed to delete user {}: {}", user_id, e);
                eprintln!("Failed to delete user {}.", username);
                std::process::exit(1);
            }
        }
        return;
    }

    if console.users.is_empty() {
        println!("No users found.");
        return;
    }

    let counts = console.fetch_user_file_counts().await;

    println!(
        "{0: <8} | {1: <20} | {2: <30} | {3: <6}",
        "ID", "Username", "Email", "Files"
    );
    println!("{:-<8}-+-{:-<20}-+-{:-<30}-+-{:-<6}", "", "", "", "");
    for user in &console.users {
        let count = counts
            .iter()
            .find(|(id, _)| *id == user.id)
            .and_then(|(_, count)| *count)
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{0: <8} | {1: <20} | {2: <30} | {3: <6}",
            user.id,
            truncate(&user.username, 20),
            truncate(&user.email, 30),
            count
        );
    }
}

async fn files(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    require_admin(session);

    let mut console = AdminConsole::new(client, CONFIG.admin_email());
    console.fetch_all().await;

    if let Some(file_id) = matches.get_one::<i64>("delete") {
        let file_name = console
            .files
            .iter()
            .find(|f| f.id == *file_id)
            .map(|f| f.file_name.clone())
            .unwrap_or_else(|| file_id.to_string());

        let answer = prompt(&format!(
            "Are you sure you want to delete file \"{}\"? (y/n) ",
            file_name
        ));
        if answer.to_lowercase() != "y" {
            println!("Cancelled.");
            return;
        }

        match console.delete_file(*file_id).await {
            Ok(()) => println!("File {} deleted.", file_name),
            Err(e) => {
                error!("Failed to delete file {}: {}", file_id, e);
                eprintln!("Failed to delete file {}.", file_name);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut files = console.files.clone();
    if let Some(term) = matches.get_one::<String>("search") {
        let term = term.to_lowercase();
        files.retain(|f| f.file_name.to_lowercase().contains(&term));
    }

    if files.is_empty() {
        println!("No files found.");
        return;
    }

    println!(
        "{0: <8} | {1: <28} | {2: <14} | {3: <10} | {4: <8} | {5: <16}",
        "ID", "Name", "Type", "Size", "Privacy", "Uploaded"
    );
    println!(
        "{:-<8}-+-{:-<28}-+-{:-<14}-+-{:-<10}-+-{:-<8}-+-{:-<16}",
        "", "", "", "", "", ""
    );
    for file in &files {
        println!(
            "{0: <8} | {1: <28} | {2: <14} | {3: <10} | {4: <8} | {5: <16}",
            file.id,
            truncate(&file.file_name, 28),
            truncate(&file.file_type, 14),
            format_bytes(file.decoded_size()),
            if file.public { "public" } else { "private" },
            truncate(&format_date(&file.date), 16),
        );
    }
}

async fn messages(client: &ApiClient, session: &Session, matches: &ArgMatches) {
    require_admin(session);

    let mut console = AdminConsole::new(client, CONFIG.admin_email());
    console.fetch_all().await;

    if let Some(message_id) = matches.get_one::<i64>("view") {
        let message = match console.messages.iter().find(|m| m.id == *message_id) {
            Some(message) => message.clone(),
            None => {
                eprintln!("No message with ID {}.", message_id);
                std::process::exit(1);
            }
        };

        println!("From:    {} ({})", message.name, message.username);
        println!("Contact: {}", message.contact);
        println!();
        println!("{}", message.message);

        if !message.viewed {
            if let Err(e) = console.mark_viewed(*message_id).await {
                error!("Failed to mark message {} viewed: {}", message_id, e);
            }
        }
        return;
    }

    if let Some(message_id) = matches.get_one::<i64>("delete") {
        match console.delete_message(*message_id).await {
            Ok(()) => println!("Message {} deleted.", message_id),
            Err(e) => {
                error!("Failed to delete message {}: {}", message_id, e);
                eprintln!("Failed to delete message {}.", message_id);
                std::process::exit(1);
            }
        }
        return;
    }

    if console.messages.is_empty() {
        println!("No messages.");
        return;
    }

    println!(
        "{0: <8} | {1: <16} | {2: <26} | {3: <7} | {4: <32}",
        "ID", "From", "Contact", "Viewed", "Message"
    );
    println!(
        "{:-<8}-+-{:-<16}-+-{:-<26}-+-{:-<7}-+-{:-<32}",
        "", "", "", "", ""
    );
    for message in &console.messages {
        println!(
            "{0: <8} | {1: <16} | {2: <26} | {3: <7} | {4: <32}",
            message.id,
            truncate(&message.name, 16),
            truncate(&message.contact, 26),
            if message.viewed { "yes" } else { "no" },
            truncate(&message.message, 32),
        );
    }
}
