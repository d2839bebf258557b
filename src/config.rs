use anyhow::Result;
use dotenvy::dotenv;

fn default_max_rows() -> usize {
    100_000
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Largest dataset the analyze/insights endpoints accept. The analytics
    /// engine itself is bounded by input size, so the cap lives here.
    pub max_rows: usize,
    pub openai_key: String,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let openai_key = std::env::var("OPENAI_API_KEY")
            .map_err(|e| anyhow::anyhow!("Failed to load OPENAI_API_KEY: {}", e))?;

        let max_rows = std::env::var("MAX_ROWS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_rows);

        Ok(Config {
            max_rows,
            openai_key,
        })
    }
}
