use anyhow::{Context, Error, bail};
use bingo::{
    LocalService, Randomness, ScoreService, ServiceError,
    db::{DatabaseConfig, config::DEFAULT_DATABASE_URL},
};
use bingo_client::{
    api_client::ApiClient,
    app::App,
    commands::parse_command,
};
use pico_args::Arguments;
use std::{
    io::{self, Write},
    sync::Arc,
};

const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

const HELP: &str = "\
Play single-player 75-ball Bingo in the terminal

USAGE:
  bingo_client [OPTIONS]

OPTIONS:
  --server      URL        Score server  [default: env BINGO_SERVER or http://127.0.0.1:5000]
  --db-url      URL        SQLite store for --offline  [default: sqlite://bingo.db]
  --seed        N          Seed the random source for a repeatable game
  --username    NAME       Log in as NAME instead of prompting
  --password    PASSWORD   Password for --username

FLAGS:
  --offline                Keep accounts and scores in a local SQLite file
  -h, --help               Print help information

ENVIRONMENT:
  BINGO_SERVER             Score server URL
  BINGO_PEPPER             Password pepper for --offline accounts
  RUST_LOG                 Log filter [default: warn]
";

struct Args {
    server: String,
    offline: bool,
    db_url: String,
    seed: Option<u64>,
    username: Option<String>,
    password: Option<String>,
}

fn parse_args(mut pargs: Arguments) -> Result<Args, Error> {
    let server = match pargs.opt_value_from_str("--server")? {
        Some(server) => server,
        None => std::env::var("BINGO_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_string()),
    };
    Ok(Args {
        server,
        offline: pargs.contains("--offline"),
        db_url: pargs
            .opt_value_from_str("--db-url")?
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
        seed: pargs
            .opt_value_from_str("--seed")
            .context("--seed must be a non-negative integer")?,
        username: pargs.opt_value_from_str("--username")?,
        password: pargs.opt_value_from_str("--password")?,
    })
}

/// Print `label` and read one trimmed line. `None` at end of input.
fn prompt(label: &str) -> Result<Option<String>, Error> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    let read = io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok((read > 0).then(|| line.trim().to_string()))
}

fn require_input(label: &str) -> Result<String, Error> {
    prompt(label)?.context("Input closed")
}

/// Log in, offering to create the account when the credentials are not
/// recognized. Returns the logged-in username.
async fn sign_in(service: &dyn ScoreService, args: &Args) -> Result<String, Error> {
    let username = match &args.username {
        Some(username) => username.clone(),
        None => require_input("Username: ")?,
    };
    let password = match &args.password {
        Some(password) => password.clone(),
        None => require_input("Password: ")?,
    };

    match service.login(&username, &password).await {
        Ok(name) => return Ok(name),
        Err(ServiceError::InvalidCredentials) => {}
        Err(err) => bail!("Login failed: {err}"),
    }

    println!("Login failed: invalid username or password.");
    let answer = prompt(&format!("Register a new account as '{username}'? [y/N] "))?
        .unwrap_or_default();
    if !answer.eq_ignore_ascii_case("y") && !answer.eq_ignore_ascii_case("yes") {
        bail!("Login required to play");
    }

    service
        .register(&username, &password)
        .await
        .context("Registration failed")?;
    println!("Account created.");
    service
        .login(&username, &password)
        .await
        .context("Login after registration failed")
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = parse_args(pargs)?;

    let service: Arc<dyn ScoreService> = if args.offline {
        let pepper = std::env::var("BINGO_PEPPER").unwrap_or_default();
        // Offline sessions never outlive the process, so the signing secret
        // need not either.
        let jwt_secret = uuid::Uuid::new_v4().to_string();
        let config = DatabaseConfig::development().with_url(args.db_url.clone());
        let local = LocalService::open(&config, pepper, jwt_secret)
            .await
            .with_context(|| format!("Failed to open {}", args.db_url))?;
        Arc::new(local)
    } else {
        Arc::new(ApiClient::new(args.server.clone()))
    };

    let username = sign_in(service.as_ref(), &args).await?;
    println!("Welcome, {username}! Type 'help' for commands.\n");

    let mut app = App::new(service, Randomness::from_seed(args.seed));
    println!("{}", app.start_game());

    loop {
        let Some(line) = prompt("\n> ")? else {
            break;
        };
        if line.is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };

        let reply = app.execute(command).await;
        println!("{}", reply.text);
        if reply.quit {
            break;
        }
    }

    Ok(())
}
