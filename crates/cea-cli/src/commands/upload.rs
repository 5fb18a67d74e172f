use anyhow::Result;
use cea_application::Workbench;
use cea_application::upload_pipeline::UPLOAD_FAILED;
use cea_core::route::View;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use super::{failure, gate};
use crate::render;

pub async fn run(workbench: &Workbench, path: &Path) -> Result<ExitCode> {
    if !gate(workbench, View::Dashboard) {
        return Ok(ExitCode::FAILURE);
    }
    let pipeline = workbench.upload();

    if let Err(e) = pipeline.select_path(path).await {
        failure(&e.user_message(UPLOAD_FAILED));
        return Ok(ExitCode::FAILURE);
    }
    if let Some(status) = pipeline.status().await {
        println!("{}", status);
    }

    println!("{}", "Uploading and processing...".cyan());
    let result = match pipeline.submit().await {
        Ok(result) => result,
        Err(e) => {
            failure(&e.user_message(UPLOAD_FAILED));
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(status) = pipeline.status().await {
        println!("{}", status.to_string().green());
    }
    if let Some(id) = &result.dataset_id {
        println!("Dataset ID: {}", id);
    }
    if let Some(view) = pipeline.result_view().await {
        println!();
        print!("{}", render::result_view(&view));
    }
    Ok(ExitCode::SUCCESS)
}
