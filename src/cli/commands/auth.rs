use clap::Subcommand;
use serde_json::json;

use crate::auth::{Credentials, Session, TokenStore};
use crate::cli::config::{api_client, auth_service, token_store};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to the backend and store the token")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password().await?,
            };
            let credentials = Credentials { email, password };

            let service = auth_service()?;
            let api = api_client(Session::anonymous())?;
            service.login_with_credentials(&api, &credentials).await?;

            let store = token_store()?;
            let expires_at = store.read_cookie()?.and_then(|c| c.expires_at);
            output_success(
                &output_format,
                &format!("Logged in as {}", credentials.email),
                Some(json!({
                    "email": credentials.email,
                    "token_file": store.path(),
                    "expires_at": expires_at,
                })),
            )?;
            Ok(())
        }
        AuthCommands::Logout => {
            auth_service()?.logout()?;
            output_success(&output_format, "Logged out", None)?;
            Ok(())
        }
        AuthCommands::Status => {
            let store = token_store()?;
            let cookie = store.read_cookie()?;
            let authenticated = store.get()?.is_some();
            let expires_at = cookie.as_ref().and_then(|c| c.expires_at);

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "authenticated": authenticated,
                            "expires_at": expires_at,
                            "token_file": store.path(),
                        }))?
                    );
                }
                OutputFormat::Text => match (authenticated, expires_at) {
                    (true, Some(at)) => println!("Logged in (token expires {})", at.format("%Y-%m-%d %H:%M:%S UTC")),
                    (true, None) => println!("Logged in"),
                    (false, _) if cookie.is_some() => println!("Token expired. Run `admin auth login <email>`"),
                    (false, _) => println!("Not logged in"),
                },
            }
            Ok(())
        }
    }
}

async fn prompt_password() -> anyhow::Result<String> {
    let password = tokio::task::spawn_blocking(|| -> std::io::Result<String> {
        use std::io::Write;
        eprint!("Password: ");
        std::io::stderr().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    })
    .await??;

    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
