//! CLI commands

use anyhow::{Context, Result, anyhow, bail};
use clap::Subcommand;
use portico_core::{ClientConfig, UserInfo};
use portico_http::Method;
use portico_session::{Location, LoginPayload, SessionContext, SessionState};
use serde_json::{Value, json};
use tracing::info;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the issued token
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "PORTICO_PASSWORD", hide_env_values = true)]
        password: String,

        /// Extra login fields as KEY=VALUE (e.g. captcha=x7k2)
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,

        /// Route to land on after login
        #[arg(long)]
        redirect: Option<String>,
    },

    /// Log out on the server and remove the stored token
    Logout,

    /// Show the profile of the stored session
    Whoami,

    /// Send a request through the session client and print the payload
    Request {
        /// HTTP method
        method: String,

        /// Path relative to the base URL
        path: String,

        /// JSON request body
        #[arg(long)]
        data: Option<String>,

        /// Do not attach the stored token
        #[arg(long)]
        no_token: bool,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))
}

impl Commands {
    /// Location the router starts at, which is where `login` reads its
    /// redirect target from
    pub fn start_location(&self, config: &ClientConfig) -> String {
        match self {
            Commands::Login {
                redirect: Some(redirect),
                ..
            } => Location::new(config.login_path.clone())
                .with_query("redirect", redirect.clone())
                .full_path(),
            Commands::Login { .. } => config.login_path.clone(),
            _ => config.home_path.clone(),
        }
    }

    pub async fn execute(self, ctx: &SessionContext) -> Result<()> {
        match self {
            Commands::Login {
                username,
                password,
                fields,
                ..
            } => login(ctx, username, password, fields).await,
            Commands::Logout => logout(ctx).await,
            Commands::Whoami => whoami(ctx).await,
            Commands::Request {
                method,
                path,
                data,
                no_token,
            } => request(ctx, &method, &path, data.as_deref(), no_token).await,
        }
    }
}

fn profile_json(user: &UserInfo) -> Value {
    json!({
        "name": user.name,
        "tokenName": user.token_name,
        "roles": user.roles,
        "codes": user.codes,
    })
}

async fn login(
    ctx: &SessionContext,
    username: String,
    password: String,
    fields: Vec<(String, String)>,
) -> Result<()> {
    let payload = fields
        .into_iter()
        .fold(LoginPayload::new(username, password), |payload, (k, v)| {
            payload.with_field(k, v)
        });

    let user = ctx.store.login(&payload).await?;
    if ctx.store.state() != SessionState::LoggedIn {
        bail!("Login succeeded but the profile could not be loaded");
    }

    println!("{}", serde_json::to_string_pretty(&profile_json(&user))?);
    Ok(())
}

async fn logout(ctx: &SessionContext) -> Result<()> {
    if !ctx.store.is_authenticated() {
        info!("No stored session, clearing anyway");
    }
    ctx.store.logout_with_query_redirect(None).await?;
    println!("Logged out");
    Ok(())
}

async fn whoami(ctx: &SessionContext) -> Result<()> {
    if !ctx.store.is_authenticated() {
        bail!("Not logged in");
    }

    let user = ctx.store.fetch_update_user_info().await;
    if !user.has_token() {
        bail!("Session is no longer valid, log in again");
    }

    println!("{}", serde_json::to_string_pretty(&profile_json(&user))?);
    Ok(())
}

async fn request(
    ctx: &SessionContext,
    method: &str,
    path: &str,
    data: Option<&str>,
    no_token: bool,
) -> Result<()> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method {method:?}"))?;

    let mut request = ctx.client.request(method, path);
    if let Some(data) = data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        request = request.json(&body);
    }
    if no_token {
        request = request.without_token();
    }

    let payload = ctx
        .client
        .execute_raw(request)
        .await
        .map_err(|e| match e.code() {
            Some(code) => anyhow!("{e} (code {code})"),
            None => e.into(),
        })?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("captcha=x7k2"),
            Ok(("captcha".to_string(), "x7k2".to_string()))
        );
        assert!(parse_key_value("captcha").is_err());
    }

    #[test]
    fn test_login_starts_at_login_route_with_redirect() {
        let config = ClientConfig::default();
        let command = Commands::Login {
            username: "alice".into(),
            password: "secret".into(),
            fields: vec![],
            redirect: Some("/reports".into()),
        };
        assert_eq!(command.start_location(&config), "/login?redirect=%2Freports");
        assert_eq!(Commands::Whoami.start_location(&config), "/");
    }
}
