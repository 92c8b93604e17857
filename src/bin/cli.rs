use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, crate_name, value_parser};
use docsign::capture::{SignatureCapture, read_upload};
use docsign::cli_utils::create::handle_config_create;
use docsign::cli_utils::{
    document_details, document_table, link_summary, recipient_table, status_counts,
};
use docsign::config::{Config, DEFAULT_CONFIG_FILENAME, load_config_12factor_optional};
use docsign::document::upload::{UploadSelection, new_document_for_path};
use docsign::error::DocsignError;
use docsign::observability::init_logs;
use docsign::service::SigningService;
use docsign::session::DemoSession;
use docsign::storage::jenv::get_env_var;
use docsign::storage::{KeyValueStore, ObjectStorage};
use docsign::store::linking::parse_recipient_id;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn build_cli() -> Command {
    Command::new(crate_name!())
        .about("Document registry and signing workflow demo")
        .subcommand(
            Command::new("version")
                .about("Prints version and build information")
        )
        .subcommand(
            Command::new("config")
                .about(" work with docsign configuration")
                .subcommand(
                    Command::new("create")
                        .about(" create a config file interactively")
                )
                .subcommand(
                    Command::new("read")
                    .about("read configuration and display to screen. This includes both the config file and the env variables.")
                ),
        )
        .subcommand(
            Command::new("login")
                .about("log in as a demo user")
                .arg(
                    Arg::new("email")
                        .required(true)
                        .value_parser(value_parser!(String)),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .required(true)
                        .help("Demo password")
                        .value_parser(value_parser!(String)),
                ),
        )
        .subcommand(Command::new("logout").about("log out the demo user"))
        .subcommand(Command::new("whoami").about("show the logged in demo user"))
        .subcommand(
            Command::new("document")
                .about(" work with documents (admin)")
                .subcommand(
                    Command::new("upload")
                        .about(" upload PDF files")
                        .arg(
                            Arg::new("files")
                                .required(true)
                                .num_args(1..)
                                .value_parser(value_parser!(PathBuf)),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .about(" list documents")
                        .arg(
                            Arg::new("search")
                                .short('s')
                                .long("search")
                                .help("Only titles containing this text (case-insensitive)")
                                .value_parser(value_parser!(String)),
                        ),
                )
                .subcommand(
                    Command::new("show")
                        .about(" show one document without changing it")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(String))),
                )
                .subcommand(
                    Command::new("view")
                        .about(" open a document as its recipient; sent documents become viewed")
                        .arg(Arg::new("id").required(true).value_parser(value_parser!(String))),
                )
                .subcommand(Command::new("stats").about(" count documents by status")),
        )
        .subcommand(
            Command::new("link")
                .about(" work with recipient signing links")
                .subcommand(
                    Command::new("issue")
                        .about(" send documents to a recipient under one link (admin)")
                        .arg(
                            Arg::new("ids")
                                .required(true)
                                .num_args(1..)
                                .value_parser(value_parser!(String)),
                        )
                        .arg(
                            Arg::new("name")
                                .short('n')
                                .long("name")
                                .required(true)
                                .value_parser(value_parser!(String)),
                        )
                        .arg(
                            Arg::new("email")
                                .short('e')
                                .long("email")
                                .required(true)
                                .value_parser(value_parser!(String)),
                        ),
                )
                .subcommand(
                    Command::new("resend")
                        .about(" re-issue a link to its original recipient (admin)")
                        .arg(
                            Arg::new("recipient-id")
                                .required(true)
                                .value_parser(value_parser!(String)),
                        ),
                )
                .subcommand(
                    Command::new("open")
                        .about(" open a signing link as the recipient")
                        .arg(
                            Arg::new("link")
                                .required(true)
                                .help("Full link, /sign/{id} path or bare recipient id")
                                .value_parser(value_parser!(String)),
                        ),
                ),
        )
        .subcommand(Command::new("recipients").about("list recipients and their progress (admin)"))
        .subcommand(
            Command::new("sign")
                .about("sign a document as its recipient")
                .arg(Arg::new("id").required(true).value_parser(value_parser!(String)))
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .required(true)
                        .help("Signer full name")
                        .value_parser(value_parser!(String)),
                )
                .arg(
                    Arg::new("text")
                        .long("text")
                        .help("Typed signature")
                        .value_parser(value_parser!(String)),
                )
                .arg(
                    Arg::new("draw")
                        .long("draw")
                        .help("Drawn signature as an image data URL")
                        .value_parser(value_parser!(String)),
                )
                .arg(
                    Arg::new("upload")
                        .long("upload")
                        .help("Image or PDF file holding the signature")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("quiet")
                        .short('q')
                        .long("quiet")
                        .action(ArgAction::SetTrue),
                )
                .group(
                    ArgGroup::new("payload")
                        .args(["text", "draw", "upload"])
                        .required(true),
                ),
        )
        .arg_required_else_help(true)
}

fn config_path() -> String {
    match get_env_var("DOCSIGN_CONFIG", false) {
        Ok(Some(path)) if !path.is_empty() => path,
        _ => DEFAULT_CONFIG_FILENAME.to_string(),
    }
}

/// Cancels the returned token on Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a String, DocsignError> {
    matches
        .get_one::<String>(name)
        .ok_or_else(|| DocsignError::ValidationError(format!("missing argument '{}'", name)))
}

async fn run(matches: ArgMatches, config: Config) -> Result<(), DocsignError> {
    let storage: Arc<dyn KeyValueStore> = Arc::new(ObjectStorage::from_config(&config)?);
    let session = DemoSession::new(storage.clone());

    match matches.subcommand() {
        Some(("login", login_matches)) => {
            let user = session.login(
                required(login_matches, "email")?,
                required(login_matches, "password")?,
            )?;
            println!(
                "Logged in as {} <{}>{}",
                user.name,
                user.email,
                if user.is_admin { " (admin)" } else { "" }
            );
            return Ok(());
        }
        Some(("logout", _)) => {
            session.logout()?;
            println!("Logged out.");
            return Ok(());
        }
        Some(("whoami", _)) => {
            match session.current_user()? {
                Some(user) => println!(
                    "{} <{}>{}",
                    user.name,
                    user.email,
                    if user.is_admin { " (admin)" } else { "" }
                ),
                None => println!("Not logged in."),
            }
            return Ok(());
        }
        _ => {}
    }

    let service = SigningService::from_config(&config, storage)?;
    let cancel = cancel_on_ctrl_c();

    match matches.subcommand() {
        Some(("document", document_matches)) => match document_matches.subcommand() {
            Some(("upload", upload_matches)) => {
                session.require_admin()?;
                let paths = upload_matches
                    .get_many::<PathBuf>("files")
                    .map(|v| v.cloned().collect::<Vec<_>>())
                    .unwrap_or_default();
                let selection = UploadSelection::from_paths(paths);
                for rejected in &selection.rejected {
                    eprintln!("Skipping {}: only PDF files are supported.", rejected.display());
                }
                if selection.is_empty() {
                    return Err(DocsignError::ValidationError(
                        "no PDF files to upload".to_string(),
                    ));
                }
                let new_documents = selection
                    .accepted
                    .iter()
                    .map(|p| new_document_for_path(p))
                    .collect::<Result<Vec<_>, _>>()?;
                let created = service.upload(new_documents, &cancel).await?;
                println!(
                    "{} document{} uploaded successfully.",
                    created.len(),
                    if created.len() > 1 { "s" } else { "" }
                );
                print!("{}", document_table(&created));
            }
            Some(("list", list_matches)) => {
                session.require_admin()?;
                let documents = match list_matches.get_one::<String>("search") {
                    Some(term) => service.search(term)?,
                    None => service.documents()?,
                };
                print!("{}", document_table(&documents));
            }
            Some(("show", show_matches)) => {
                session.require_admin()?;
                let doc = service.get(required(show_matches, "id")?)?;
                print!("{}", document_details(&doc));
            }
            Some(("view", view_matches)) => {
                let doc = service
                    .open_document(required(view_matches, "id")?, &cancel)
                    .await?;
                print!("{}", document_details(&doc));
            }
            Some(("stats", _)) => {
                session.require_admin()?;
                print!("{}", status_counts(&service.stats()?));
            }
            _ => println!("please enter subcommand see docsign document --help"),
        },
        Some(("link", link_matches)) => match link_matches.subcommand() {
            Some(("issue", issue_matches)) => {
                session.require_admin()?;
                let ids: Vec<String> = issue_matches
                    .get_many::<String>("ids")
                    .map(|v| v.cloned().collect())
                    .unwrap_or_default();
                let link = service.send_for_signature(
                    &ids,
                    required(issue_matches, "name")?,
                    required(issue_matches, "email")?,
                )?;
                print!("{}", link_summary(&link));
            }
            Some(("resend", resend_matches)) => {
                session.require_admin()?;
                let link = service.resend(required(resend_matches, "recipient-id")?)?;
                print!("{}", link_summary(&link));
            }
            Some(("open", open_matches)) => {
                let raw = required(open_matches, "link")?;
                let recipient_id = parse_recipient_id(raw).ok_or_else(|| {
                    DocsignError::RecipientNotFound {
                        recipient_id: raw.clone(),
                    }
                })?;
                let documents = service.open_recipient_view(&recipient_id, &cancel).await?;
                let signed = documents.iter().filter(|d| d.status.is_signed()).count();
                println!("{} of {} document(s) signed.", signed, documents.len());
                print!("{}", document_table(&documents));
            }
            _ => println!("please enter subcommand see docsign link --help"),
        },
        Some(("recipients", _)) => {
            session.require_admin()?;
            print!("{}", recipient_table(&service.recipients()?));
        }
        Some(("sign", sign_matches)) => {
            let id = required(sign_matches, "id")?;
            let name = required(sign_matches, "name")?;
            let capture = if let Some(text) = sign_matches.get_one::<String>("text") {
                SignatureCapture::Type { text: text.clone() }
            } else if let Some(data_url) = sign_matches.get_one::<String>("draw") {
                SignatureCapture::Draw {
                    data_url: data_url.clone(),
                }
            } else if let Some(path) = sign_matches.get_one::<PathBuf>("upload") {
                read_upload(path, &cancel).await?
            } else {
                return Err(DocsignError::ValidationError(
                    "provide a signature with --text, --draw or --upload".to_string(),
                ));
            };
            let doc = service.submit_signature(id, name, capture, &cancel).await?;
            if sign_matches.get_flag("quiet") {
                println!("{}", doc.id);
            } else {
                println!("Document signed successfully.");
                print!("{}", document_details(&doc));
            }
        }
        _ => {
            eprintln!("Invalid command or no subcommand provided. Use --help for usage.");
            process::exit(1);
        }
    }
    Ok(())
}

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("version", _)) => {
            println!("{}", env!("CARGO_PKG_DESCRIPTION"));
            println!(
                "{} version: {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            );
            return;
        }
        Some(("config", config_matches)) => {
            let result = match config_matches.subcommand() {
                Some(("create", _)) => handle_config_create(),
                Some(("read", _)) => load_config_12factor_optional(Some(config_path().as_str()))
                    .map(|config| println!("{}", config)),
                _ => {
                    println!("please enter subcommand see docsign config --help");
                    Ok(())
                }
            };
            if let Err(e) = result {
                eprintln!("{}", e);
                process::exit(1);
            }
            return;
        }
        _ => {}
    }

    let config = match load_config_12factor_optional(Some(config_path().as_str())) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut log_config = config.log_config();
    if config.observability.is_none() {
        // keep command output readable unless logging was configured
        log_config.level = "warn".to_string();
    }
    let _log_guard = match init_logs(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(matches, config)) {
        eprintln!("{}", e);
        process::exit(1);
    }
}
