use anyhow::Result;
use cea_application::Workbench;
use cea_application::history_store::EXPORT_FAILED;
use cea_core::route::View;
use colored::Colorize;
use std::process::ExitCode;

use super::{failure, gate};
use crate::render;

pub async fn list(workbench: &Workbench, show: Option<&str>) -> Result<ExitCode> {
    if !gate(workbench, View::History) {
        return Ok(ExitCode::FAILURE);
    }
    let history = workbench.history();

    let datasets = history.activate().await;
    if datasets.is_empty() {
        println!("No datasets uploaded yet");
        return Ok(ExitCode::SUCCESS);
    }
    println!("{}", "Recent uploads".bold());
    print!("{}", render::dataset_list(&datasets));

    if let Some(id) = show {
        match history.select(id).await {
            Ok(dataset) => {
                println!();
                print!("{}", render::dataset_detail(&dataset));
            }
            Err(_) => {
                failure(&format!("Dataset {} is not in the recent history", id));
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub async fn report(workbench: &Workbench, dataset_id: &str) -> Result<ExitCode> {
    if !gate(workbench, View::History) {
        return Ok(ExitCode::FAILURE);
    }
    let history = workbench.history();

    match history.export_report(dataset_id).await {
        Ok(artifact) => {
            println!(
                "{} {} ({} bytes)",
                "Saved".green(),
                artifact.location.display(),
                artifact.size
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            let text = history
                .take_notice()
                .await
                .map(|notice| notice.text)
                .unwrap_or_else(|| e.user_message(EXPORT_FAILED));
            failure(&text);
            Ok(ExitCode::FAILURE)
        }
    }
}
