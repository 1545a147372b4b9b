// src/cli/account.rs — Login, sign-up, Google sign-in, logout, incognito

use inquire::PasswordDisplayMode;

use super::Toggle;
use crate::api::HttpBackend;
use crate::auth::forms::{password_strength, LoginForm, SignUpForm};
use crate::auth::oauth::token_from_redirect;
use crate::auth::Credentials;

fn prompt_text(label: &str, given: Option<String>) -> anyhow::Result<String> {
    match given {
        Some(v) => Ok(v),
        None => Ok(inquire::Text::new(label).prompt()?),
    }
}

fn prompt_password(label: &str) -> anyhow::Result<String> {
    Ok(inquire::Password::new(label)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?)
}

pub async fn run_login(
    backend: &HttpBackend,
    credentials: &Credentials,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let email = prompt_text("Email:", email)?;
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password:")?,
    };

    let form = LoginForm { email, password };
    form.validate()?;

    let token = backend.login(form.email.trim(), &form.password).await?;
    credentials.set_token(&token.access_token)?;
    tracing::info!("Logged in as {}", form.email.trim());
    eprintln!("Welcome back!");
    Ok(())
}

pub async fn run_signup(
    backend: &HttpBackend,
    credentials: &Credentials,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let full_name = prompt_text("Full name:", name)?;
    let email = prompt_text("Email:", email)?;
    let (password, confirm_password) = match password {
        Some(p) => (p.clone(), p),
        None => {
            let p = prompt_password("Password:")?;
            let strength = password_strength(&p);
            if !strength.label.is_empty() {
                eprintln!("  Password strength: {} ({}%)", strength.label, strength.score);
            }
            let c = prompt_password("Confirm password:")?;
            (p, c)
        }
    };

    let form = SignUpForm {
        full_name,
        email,
        password,
        confirm_password,
    };
    form.validate()?;

    let token = backend.register(form.email.trim(), &form.password).await?;
    credentials.set_token(&token.access_token)?;
    eprintln!("Account created successfully!");
    Ok(())
}

pub async fn run_google(backend: &HttpBackend) -> anyhow::Result<()> {
    let url = backend.google_login_url().await?;
    println!("{url}");
    eprintln!(
        "Open the URL above to sign in, then run `memchat callback <url>` \
         with the address the browser lands on."
    );
    Ok(())
}

pub fn run_callback(credentials: &Credentials, redirect: &str) -> anyhow::Result<()> {
    let token = token_from_redirect(redirect)?;
    credentials.set_token(&token)?;
    eprintln!("Successfully logged in with Google!");
    Ok(())
}

pub fn run_logout(credentials: &Credentials) -> anyhow::Result<()> {
    credentials.clear_token()?;
    eprintln!("Logged out.");
    Ok(())
}

pub fn run_incognito(credentials: &Credentials, mode: Option<Toggle>) -> anyhow::Result<()> {
    if let Some(mode) = mode {
        credentials.set_incognito(mode.enabled())?;
    }
    let state = if credentials.incognito() { "on" } else { "off" };
    println!("Incognito mode: {state}");
    Ok(())
}
