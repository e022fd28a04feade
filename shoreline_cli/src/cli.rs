use std::path::PathBuf;

use clap::{Arg, Command};

pub fn build_cli() -> Command<'static> {
    Command::new("Shoreline")
        .name("shoreline")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Share and browse files on a shoreline server, through a simple cli.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("init").about("Create or reset the configuration for this machine"),
        )
        .subcommand(
            Command::new("signup")
                .about("Create a new account and sign in")
                .arg(
                    Arg::new("username")
                        .help("The name your share links are published under")
                        .required(true)
                        .index(1),
                )
                .arg(Arg::new("email").required(true).index(2))
                .arg(Arg::new("password").required(true).index(3)),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in to an existing account")
                .arg(Arg::new("email").required(true).index(1))
                .arg(Arg::new("password").required(true).index(2)),
        )
        .subcommand(Command::new("logout").about("Sign out and forget the stored session"))
        .subcommand(Command::new("status").about("Show the current session and storage use"))
        .subcommand(
            Command::new("upload")
                .about("Upload one or more files")
                .arg(
                    Arg::new("file")
                        .help("Files to upload")
                        .required(true)
                        .index(1)
                        .multiple_values(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("private")
                        .help("Restrict access to an allow-list of emails")
                        .long("private")
                        .takes_value(false),
                )
                .arg(
                    Arg::new("allow")
                        .help("Email address allowed to view a private file")
                        .long("allow")
                        .takes_value(true)
                        .value_name("EMAIL")
                        .multiple_occurrences(true),
                ),
        )
        .subcommand(
            Command::new("files")
                .about("List your uploaded files")
                .arg(
                    Arg::new("search")
                        .help("Only show files whose name contains this term")
                        .long("search")
                        .takes_value(true)
                        .value_name("TERM"),
                )
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .takes_value(true)
                        .default_value("date")
                        .value_parser(["name", "date", "size"]),
                )
                .arg(
                    Arg::new("order")
                        .long("order")
                        .takes_value(true)
                        .default_value("desc")
                        .value_parser(["asc", "desc"]),
                )
                .arg(
                    Arg::new("privacy")
                        .long("privacy")
                        .takes_value(true)
                        .default_value("all")
                        .value_parser(["all", "public", "private"]),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete one of your files")
                .arg(
                    Arg::new("id")
                        .help("ID of the file to delete")
                        .required(true)
                        .value_parser(clap::value_parser!(i64)),
                ),
        )
        .subcommand(
            Command::new("browse")
                .about("Browse the files a user has published")
                .arg(Arg::new("username").required(true)),
        )
        .subcommand(
            Command::new("view")
                .about("View a shared file")
                .arg(Arg::new("username").required(true).index(1))
                .arg(
                    Arg::new("id")
                        .required(true)
                        .index(2)
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    Arg::new("email")
                        .help("Email address to request access with")
                        .long("email")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("save")
                        .help("Download the file into the configured downloads directory")
                        .long("save")
                        .takes_value(false),
                ),
        )
        .subcommand(
            Command::new("contact")
                .about("Send a message to the platform admin")
                .arg(Arg::new("name").long("name").takes_value(true))
                .arg(Arg::new("email").long("email").takes_value(true))
                .arg(
                    Arg::new("message")
                        .long("message")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("admin")
                .about("Moderation console")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(
                    Command::new("login")
                        .about("Sign in to the admin dashboard")
                        .arg(Arg::new("email").required(true).index(1))
                        .arg(Arg::new("password").required(true).index(2)),
                )
                .subcommand(Command::new("overview").about("Platform statistics"))
                .subcommand(
                    Command::new("users").about("List or delete accounts").arg(
                        Arg::new("delete")
                            .help("Delete the account with this ID, and its files")
                            .long("delete")
                            .takes_value(true)
                            .value_name("ID")
                            .value_parser(clap::value_parser!(i64)),
                    ),
                )
                .subcommand(
                    Command::new("files")
                        .about("List or delete stored files")
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .takes_value(true)
                                .value_name("TERM"),
                        )
                        .arg(
                            Arg::new("delete")
                                .long("delete")
                                .takes_value(true)
                                .value_name("ID")
                                .value_parser(clap::value_parser!(i64)),
                        ),
                )
                .subcommand(
                    Command::new("messages")
                        .about("Review contact messages")
                        .arg(
                            Arg::new("view")
                                .help("Show this message in full and mark it viewed")
                                .long("view")
                                .takes_value(true)
                                .value_name("ID")
                                .value_parser(clap::value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("delete")
                                .long("delete")
                                .takes_value(true)
                                .value_name("ID")
                                .value_parser(clap::value_parser!(i64)),
                        ),
                ),
        )
}

#[test]
fn verify_cmd() {
    build_cli().debug_assert();
}
