use anyhow::Result;
use cea_application::Workbench;
use cea_application::session_store::{LOGIN_FAILED, REGISTRATION_FAILED};
use cea_core::route::View;
use cea_core::session::SessionState;
use colored::Colorize;
use std::process::ExitCode;

use super::failure;

pub async fn login(workbench: &Workbench, email: &str, password: &str) -> Result<ExitCode> {
    match workbench.login(email, password).await {
        Ok(session) => {
            println!("{}", format!("Logged in as {}", session.username).green());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            failure(&e.user_message(LOGIN_FAILED));
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn register(
    workbench: &Workbench,
    email: &str,
    password: &str,
    username: Option<&str>,
) -> Result<ExitCode> {
    match workbench
        .register(username.unwrap_or_default(), password, email)
        .await
    {
        Ok(()) => {
            println!("{}", "Registration successful! Please login.".green());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            failure(&e.user_message(REGISTRATION_FAILED));
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn logout(workbench: &Workbench) -> Result<ExitCode> {
    workbench.logout().await?;
    println!("Logged out");
    Ok(ExitCode::SUCCESS)
}

pub fn status(workbench: &Workbench) -> Result<ExitCode> {
    match workbench.session().current() {
        SessionState::Authenticated(session) => {
            println!("{} as {}", "authenticated".green(), session.username.bold());
        }
        state => println!("{}", state.label().yellow()),
    }
    for view in [View::Dashboard, View::History] {
        println!("  {:<12} {:?}", view.path(), workbench.navigate(view));
    }
    Ok(ExitCode::SUCCESS)
}
