use anyhow::Result;
use duroxide::{Client, OrchestrationStatus};

pub async fn get(db_url: &str, id: &str) -> Result<()> {
    let store = crate::duroxide::connect_store(db_url).await?;
    let client = Client::new(store);

    let status = client.get_orchestration_status(id).await;

    println!("Orchestration: {}", id);
    println!("{}", "=".repeat(60));
    println!();

    match status {
        OrchestrationStatus::Running { .. } => {
            println!("  Status: Running");
        }
        OrchestrationStatus::Completed { output, .. } => {
            println!("  Status: Completed");
            println!();
            print_output(&output);
        }
        OrchestrationStatus::Failed { details, .. } => {
            println!("  Status: Failed");
            println!();
            println!("{:?}", details);
        }
        OrchestrationStatus::NotFound => {
            anyhow::bail!("Orchestration '{}' not found", id);
        }
    }

    Ok(())
}

/// Print an orchestration's JSON output, or the raw text if it is not JSON
pub fn print_output(output: &str) {
    match serde_json::from_str::<serde_json::Value>(output) {
        Ok(value) => {
            let result = &value["result"];
            println!("  Program:  {}", value["program"].as_str().unwrap_or("-"));
            println!("  Status:   {}", result["status"].as_str().unwrap_or("-"));
            println!(
                "  Entity:   {}",
                result["entity_id"].as_str().filter(|id| !id.is_empty()).unwrap_or("-")
            );
            println!("  Elapsed:  {}s", value["elapsed_seconds"].as_u64().unwrap_or(0));
        }
        Err(_) => println!("{}", output),
    }
}
