use std::path::PathBuf;

use facet::Facet;
use figue as args;
use fnsync::{ApplyMode, FunctionRecord, QualifiedName, ReconcileReport};
use owo_colors::OwoColorize;
use tokio_postgres::{Client, NoTls};

mod config;

/// Reconcile PostgreSQL functions against a declared desired state.
#[derive(Facet, Debug)]
struct Cli {
    /// Show version information
    #[facet(args::named, args::short = 'V')]
    version: bool,

    /// Command to run
    #[facet(default, args::subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Facet, Debug)]
#[repr(u8)]
enum Commands {
    /// Bring one function to the state described by a request file
    Apply {
        /// Path to the JSON request file
        #[facet(args::positional)]
        request: String,

        /// Database connection URL (defaults to $DATABASE_URL)
        #[facet(default, args::named)]
        database_url: Option<String>,

        /// Report what would change, then roll back
        #[facet(default, args::named)]
        check: bool,

        /// Role to SET before reconciling
        #[facet(default, args::named)]
        session_role: Option<String>,
    },
    /// Show a function as the catalog reports it
    Inspect {
        /// Function name, `name` or `schema.name`
        #[facet(args::positional)]
        name: String,

        /// Database connection URL (defaults to $DATABASE_URL)
        #[facet(default, args::named)]
        database_url: Option<String>,
    },
}

fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fnsync=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args_ref: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    let result: Result<Cli, _> = args::from_slice(&args_ref);

    match result {
        Ok(cli) => {
            if let Err(err) = run(cli) {
                eprintln!("{} {}", "error:".red().bold(), err);
                std::process::exit(1);
            }
        }
        Err(err) if err.is_help_request() => {
            print!("{}", err.help_text().unwrap_or(""));
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.version {
        println!("fnsync {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let Some(command) = cli.command else {
        let config = args::HelpConfig {
            program_name: Some("fnsync".to_string()),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
            ..Default::default()
        };
        print!("{}", args::generate_help::<Cli>(&config));
        return Ok(());
    };

    let runtime = tokio::runtime::Runtime::new()?;
    match command {
        Commands::Apply {
            request,
            database_url,
            check,
            session_role,
        } => {
            let request = config::load(&PathBuf::from(request))?;
            if let (false, Some(role)) = (request.trust_input(), &session_role) {
                fnsync::safety::check_input([("session_role", role.as_str())])?;
            }
            let mode = if check {
                ApplyMode::DryRun
            } else {
                ApplyMode::Commit
            };
            runtime.block_on(async {
                let mut client = connect(database_url).await?;
                if let Some(role) = session_role {
                    fnsync::set_session_role(&client, &role).await?;
                }
                let report = fnsync::apply(&mut client, &request, mode).await?;
                print_report(&report, mode);
                Ok::<_, Box<dyn std::error::Error>>(())
            })
        }
        Commands::Inspect { name, database_url } => {
            let name = QualifiedName::parse(&name)?;
            runtime.block_on(async {
                let client = connect(database_url).await?;
                match fnsync::inspect(&client, &name).await? {
                    Some(function) => print_function(&function),
                    None => println!("{} does not exist", name.bold()),
                }
                Ok::<_, Box<dyn std::error::Error>>(())
            })
        }
    }
}

async fn connect(database_url: Option<String>) -> Result<Client, Box<dyn std::error::Error>> {
    let url = match database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL")
            .map_err(|_| "no database URL: pass --database-url or set DATABASE_URL")?,
    };
    tracing::debug!(database = %mask_password(&url), "connecting");

    let (client, connection) = tokio_postgres::connect(&url, NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });
    Ok(client)
}

fn print_report(report: &ReconcileReport, mode: ApplyMode) {
    for notice in &report.notices {
        eprintln!("{} {}", "warning:".yellow().bold(), notice);
    }

    if report.changed {
        let label = match mode {
            ApplyMode::Commit => "changed",
            ApplyMode::DryRun => "would change",
        };
        println!("{}", label.yellow().bold());
        for stmt in &report.statements {
            println!("  {}", stmt.dimmed());
        }
    } else {
        println!("{}", "ok".green().bold());
    }

    match &report.function {
        Some(function) => print_function(function),
        None => println!("(function does not exist)"),
    }
}

fn print_function(function: &FunctionRecord) {
    println!(
        "{}({}) RETURNS {}",
        function.name.bold(),
        function.arguments,
        function.return_type
    );
    if let Some(owner) = &function.owner {
        println!("  owner:            {}", owner);
    }
    println!("  language:         {}", function.language);
    println!("  volatility:       {}", function.volatility.as_sql());
    println!("  strict:           {}", function.strict);
    println!("  security definer: {}", function.security_definer);
    println!("  source:");
    for line in function.source.lines() {
        println!("    {}", line.dimmed());
    }
}

/// Hide the password in a connection string before it is logged.
///
/// Handles both the URL form (`postgres://user:pw@host/db`) and the libpq
/// key/value form (`host=db password=pw`).
fn mask_password(conninfo: &str) -> String {
    if let Some((scheme, rest)) = conninfo.split_once("://") {
        let (userinfo, host) = match rest.rsplit_once('@') {
            Some(parts) => parts,
            None => return conninfo.to_string(),
        };
        return match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => conninfo.to_string(),
        };
    }

    conninfo
        .split(' ')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if key.trim() == "password" => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
