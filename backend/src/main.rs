//! `sso` command-line driver: register accounts, log in and query admin flags
//! against the JSON state file.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ortho_config::OrthoConfig;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Builder;
use tracing::error;
use zeroize::Zeroizing;

use sso::config::SsoSettings;
use sso::domain::ports::{AdminQuery, LoginService, RegistrationService};
use sso::domain::{AppId, AuthError, AuthService, Credentials, RequestContext, UserId};
use sso::outbound::crypto::{Argon2Hasher, JwtTokenIssuer};
use sso::outbound::persistence::JsonFileStore;
use sso::outbound::telemetry::{TracingAuthObserver, init_tracing};

/// `sso` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "sso",
    about = "Register accounts, issue app tokens and query admin flags",
    version
)]
struct Cli {
    /// Abort the request after this many seconds.
    #[arg(long = "timeout-secs", value_name = "secs", default_value_t = 30, global = true)]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and print its id.
    Register {
        /// Account email.
        #[arg(long, value_name = "email")]
        email: String,
        /// Password. Read from stdin when omitted.
        #[arg(long, value_name = "password")]
        password: Option<String>,
    },
    /// Authenticate and print a token scoped to an app.
    Login {
        /// Account email.
        #[arg(long, value_name = "email")]
        email: String,
        /// App the token is issued for.
        #[arg(long = "app-id", value_name = "id")]
        app_id: i32,
        /// Password. Read from stdin when omitted.
        #[arg(long, value_name = "password")]
        password: Option<String>,
    },
    /// Print whether an account holds the admin flag.
    IsAdmin {
        /// Account id.
        #[arg(long = "user-id", value_name = "id")]
        user_id: i64,
    },
}

type Service =
    AuthService<JsonFileStore, JsonFileStore, Argon2Hasher, JwtTokenIssuer, TracingAuthObserver>;

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let cli = Cli::parse();
    let settings = SsoSettings::load_from_iter([OsString::from("sso")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    init_tracing(settings.json_logs);

    let service = build_service(&settings)?;
    let ctx = RequestContext::background().with_timeout(Duration::from_secs(cli.timeout_secs));

    match cli.command {
        Command::Register { email, password } => {
            let credentials = read_credentials(&email, password).await?;
            let user_id = service
                .register(&ctx, &credentials)
                .await
                .map_err(report)?;
            println!("user_id={user_id}");
        }
        Command::Login {
            email,
            app_id,
            password,
        } => {
            let credentials = read_credentials(&email, password).await?;
            let token = service
                .login(&ctx, &credentials, AppId::new(app_id))
                .await
                .map_err(report)?;
            println!("token={}", token.as_str());
        }
        Command::IsAdmin { user_id } => {
            let is_admin = service
                .is_admin(&ctx, UserId::new(user_id))
                .await
                .map_err(report)?;
            println!("is_admin={is_admin}");
        }
    }
    Ok(())
}

fn build_service(settings: &SsoSettings) -> io::Result<Service> {
    let token_ttl = settings
        .token_ttl()
        .map_err(|error| io::Error::other(format!("invalid settings: {error}")))?;
    let state_path = Utf8PathBuf::from_path_buf(settings.state_path()).map_err(|path| {
        io::Error::other(format!("state path '{}' is not UTF-8", path.display()))
    })?;
    let hasher = settings
        .hasher()
        .map_err(|error| io::Error::other(format!("invalid hash settings: {error}")))?;
    let store = Arc::new(
        JsonFileStore::open(&state_path)
            .map_err(|error| io::Error::other(format!("open state file: {error}")))?,
    );

    Ok(AuthService::new(
        Arc::clone(&store),
        store,
        Arc::new(hasher),
        Arc::new(JwtTokenIssuer::new()),
        token_ttl,
    )
    .with_observer(Arc::new(TracingAuthObserver)))
}

async fn read_credentials(email: &str, password: Option<String>) -> io::Result<Credentials> {
    let password = match password {
        Some(value) => Zeroizing::new(value),
        None => read_password_line().await?,
    };
    Credentials::try_from_parts(email, &password)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))
}

async fn read_password_line() -> io::Result<Zeroizing<String>> {
    let mut line = Zeroizing::new(String::new());
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|error| io::Error::other(format!("read password from stdin: {error}")))?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}

fn report(err: AuthError) -> io::Error {
    error!(op = err.operation().as_str(), code = ?err.code(), error = %err, "command failed");
    io::Error::other(format!("{}: {}", err.operation(), err.public_message()))
}
