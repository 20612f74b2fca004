//! Commands that talk to a running scoring server

use anyhow::Result;
use scoring_lib::{HealthStatus, ModelListing, SwitchResponse, MODEL_NAME_KEY};
use serde_json::json;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_status, format_flag, print_json, print_success, print_warning, OutputFormat,
};

/// Row for the models table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Loaded")]
    loaded: String,
    #[tabled(rename = "Current")]
    selected: String,
}

/// Show server health
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health: HealthStatus = client.get("health").await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("Status:        {}", color_status(&health.status));
            println!("Current model: {}", health.current_model);
            println!("Model loaded:  {}", health.model_loaded);
            if !health.model_loaded {
                print_warning("No model is loaded yet; the first prediction will load one");
            }
        }
    }

    Ok(())
}

/// List catalog and on-disk models
pub async fn list_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let listing: ModelListing = client.get("models").await?;

    match format {
        OutputFormat::Json => print_json(&listing)?,
        OutputFormat::Table => {
            let rows: Vec<ModelRow> = listing
                .models
                .iter()
                .map(|m| ModelRow {
                    name: m.name.clone(),
                    display_name: m.display_name.clone(),
                    available: format_flag(m.available),
                    loaded: format_flag(m.loaded),
                    selected: format_flag(m.selected),
                })
                .collect();

            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            println!("{}", table);
            println!(
                "\nCurrent model: {} (feature schema v{})",
                listing.current_model, listing.feature_schema_version
            );
        }
    }

    Ok(())
}

/// Switch the server's default model
pub async fn switch_model(client: &ApiClient, model: &str, format: OutputFormat) -> Result<()> {
    let request = json!({ MODEL_NAME_KEY: model });
    let response: SwitchResponse = client.post("switch", &request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => print_success(&response.message),
    }

    Ok(())
}
