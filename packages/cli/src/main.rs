//! `ows`: OWS2 session client command-line interface.
//!
//! Offline subcommands work on travel tokens directly:
//!
//! - **`encrypt`** / **`decrypt`**: run the travel token codec.
//! - **`travel-url`**: build a `host:port?ID=<token>` URL from its parts.
//!
//! Online subcommands talk to an OWS2 backend configured through the `OWS_*`
//! environment variables (see `ows_client::ClientConfig`):
//!
//! - **`login`**: log in and, unless `--no-advance`, travel to the first
//!   character's last zone.
//! - **`register`**: register, log in and create a first character.
//! - **`characters`**: list the account's characters as JSON.
//!
//! Exit status is 1 when an operation fails and 2 on usage or configuration
//! errors.

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use ows_client::{ClientConfig, Credentials, LoginOutcome, ReqwestTransport, SessionClient};
use ows_core::{build_travel_url, Coordinates, TravelPayload, ZoneServerLocation};

/// ows: OWS2 session client CLI
#[derive(Parser)]
#[command(name = "ows", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encrypt a travel payload and print the uppercase hex token.
    Encrypt {
        plaintext: String,

        #[arg(short, long, env = "OWS_ENCRYPTION_KEY", hide_env_values = true)]
        key: String,
    },

    /// Decrypt an uppercase hex token and print the payload.
    Decrypt {
        ciphertext: String,

        #[arg(short, long, env = "OWS_ENCRYPTION_KEY", hide_env_values = true)]
        key: String,
    },

    /// Build a travel URL from a server location, a position and an identity.
    ///
    /// Example:
    ///   ows travel-url --host 10.0.0.5 --port 7777 --character Hero \
    ///     --session-id 7f1c2e4a --position 10,20,30 --key mykey
    TravelUrl {
        #[arg(long)]
        host: String,

        #[arg(long)]
        port: String,

        #[arg(long, value_name = "NAME")]
        character: String,

        #[arg(long, value_name = "GUID")]
        session_id: String,

        /// Position as X,Y,Z.
        #[arg(long, value_name = "X,Y,Z", value_delimiter = ',', default_values_t = [0.0, 0.0, 0.0])]
        position: Vec<f32>,

        /// Rotation as RX,RY,RZ.
        #[arg(long, value_name = "RX,RY,RZ", value_delimiter = ',', default_values_t = [0.0, 0.0, 0.0])]
        rotation: Vec<f32>,

        #[arg(short, long, env = "OWS_ENCRYPTION_KEY", hide_env_values = true)]
        key: String,
    },

    /// Log in and print the session id and, if reached, the travel URL.
    Login {
        #[command(flatten)]
        account: Account,

        /// Stop after login instead of travelling to the last zone.
        #[arg(long)]
        no_advance: bool,
    },

    /// Register an account, log in and create its first character.
    Register {
        #[command(flatten)]
        account: Account,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Log in and print the account's characters as JSON.
    Characters {
        #[command(flatten)]
        account: Account,
    },
}

#[derive(clap::Args)]
struct Account {
    #[arg(short, long, env = "OWS_LOGIN_EMAIL")]
    email: String,

    #[arg(short, long, env = "OWS_LOGIN_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ows=info,ows_client=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Encrypt { plaintext, key } => match ows_core::try_encrypt(&plaintext, &key) {
            Ok(token) => println!("{token}"),
            Err(e) => fail(&e),
        },

        Command::Decrypt { ciphertext, key } => match ows_core::try_decrypt(&ciphertext, &key) {
            Ok(payload) => println!("{payload}"),
            Err(e) => fail(&e),
        },

        Command::TravelUrl {
            host,
            port,
            character,
            session_id,
            position,
            rotation,
            key,
        } => {
            let coordinates = match (position.as_slice(), rotation.as_slice()) {
                ([x, y, z], [rx, ry, rz]) => Coordinates::new(*x, *y, *z, *rx, *ry, *rz),
                _ => fatal("--position and --rotation take exactly three values"),
            };
            let payload = TravelPayload::new(coordinates, character, session_id);
            let location = ZoneServerLocation::new(host, port);
            match build_travel_url(&location, &payload, &key) {
                Ok(url) => println!("{url}"),
                Err(e) => fail(&e),
            }
        }

        Command::Login {
            account,
            no_advance,
        } => {
            let mut config = load_config();
            config.auto_advance = !no_advance;
            let mut client = connect(config);
            match client.login(&account.email, &account.password).await {
                Ok(outcome) => print_outcome(&outcome),
                Err(e) => fail(&e),
            }
        }

        Command::Register {
            account,
            first_name,
            last_name,
        } => {
            let mut client = connect(load_config());
            let credentials =
                Credentials::new(account.email, account.password).with_name(first_name, last_name);
            match client.register(&credentials).await {
                Ok(outcome) => print_outcome(&outcome),
                Err(e) => fail(&e),
            }
        }

        Command::Characters { account } => {
            let mut config = load_config();
            config.auto_advance = false;
            let mut client = connect(config);
            let outcome = client
                .login(&account.email, &account.password)
                .await
                .unwrap_or_else(|e| fail(&e));
            let characters = client
                .api()
                .list_characters(&outcome.session_id)
                .await
                .unwrap_or_else(|e| fail(&e));
            match serde_json::to_string_pretty(&characters) {
                Ok(json) => println!("{json}"),
                Err(e) => fail(&e),
            }
        }
    }
}

fn load_config() -> ClientConfig {
    ClientConfig::from_env().unwrap_or_else(|e| fatal(&e.to_string()))
}

fn connect(config: ClientConfig) -> SessionClient {
    let transport = ReqwestTransport::new(config.timeout)
        .unwrap_or_else(|e| fatal(&format!("failed to build HTTP client: {e}")));
    SessionClient::new(config, Arc::new(transport))
}

fn print_outcome(outcome: &LoginOutcome) {
    println!("session: {}", outcome.session_id);
    if let Some(ticket) = &outcome.ticket {
        println!("character: {}", ticket.session.character_name());
        println!("travel: {}", ticket.url);
    }
}

/// Print an operation failure to stderr and exit with code 1.
fn fail(err: &dyn std::fmt::Display) -> ! {
    eprintln!("ows: {err}");
    process::exit(1);
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("ows: {msg}");
    process::exit(2);
}
