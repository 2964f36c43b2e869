use super::types::RunReport;
use anyhow::Result;
use std::path::Path;

pub fn render(report: &RunReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Generate JSON report
pub async fn generate(report: &RunReport, output: Option<&Path>) -> Result<()> {
    let json = render(report)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
