//! `session-token` command line tool.
//!
//! ```text
//! session-token encode         < claims.json   # token on stdout
//! session-token decode <token>                 # claims JSON on stdout
//! session-token kid                            # key id of the current secret
//! ```

use anyhow::{bail, Context};
use session_token::observability::init_tracing;
use session_token::{derive_key, thumbprint, Claims, Payload, TokenConfig};
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::info;

const USAGE: &str = "usage: session-token <encode | decode <token> | kid>";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(command) => command.as_str(),
        None => return Ok(usage()),
    };

    let config = TokenConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.tracing);
    info!(command, secrets = config.secrets.len(), "Starting session-token");

    let codec = config.codec();
    match (command, args.get(1)) {
        ("encode", None) => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("Failed to read payload from stdin")?;
            let payload: Payload =
                serde_json::from_str(&input).context("Payload must be a JSON object")?;
            let token = codec.encode_async(&payload, &config.secrets).await?;
            println!("{}", token);
        }
        ("decode", Some(token)) => {
            match codec
                .decode_async::<Payload>(Some(token.as_str()), &config.secrets)
                .await
            {
                Ok(Some(claims)) => println!("{}", render(&claims)?),
                Ok(None) => bail!("No token given"),
                Err(e) => bail!("{} ({})", e.public_message(), e.code().as_str()),
            }
        }
        ("kid", None) => {
            let key = derive_key(
                codec.algorithm().as_str(),
                config.secrets.current(),
                codec.salt(),
            )?;
            println!("{}", thumbprint(&key));
        }
        _ => return Ok(usage()),
    }

    Ok(ExitCode::SUCCESS)
}

fn render(claims: &Claims<Payload>) -> anyhow::Result<String> {
    serde_json::to_string_pretty(claims).context("Failed to render claims")
}

fn usage() -> ExitCode {
    eprintln!("{}", USAGE);
    ExitCode::from(2)
}
