pub mod auth;
pub mod history;
pub mod upload;

use cea_application::Workbench;
use cea_core::route::{RouteDecision, View};
use colored::Colorize;

/// Passes the route gate for `view`, printing why when it does not.
pub fn gate(workbench: &Workbench, view: View) -> bool {
    match workbench.navigate(view) {
        RouteDecision::Render(_) => true,
        RouteDecision::Redirect(target) => {
            tracing::debug!("[Cli] {} redirected to {}", view.path(), target.path());
            eprintln!("{}", "Login required. Run `cea login` first.".red());
            false
        }
        RouteDecision::Loading => {
            eprintln!("{}", "Session is still loading.".yellow());
            false
        }
    }
}

pub fn failure(message: &str) {
    eprintln!("{}", message.red());
}
