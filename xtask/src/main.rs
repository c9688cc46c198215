//! Build automation tasks for the media-ops workspace

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for mops", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate the mops CLI reference in markdown
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    let markdown = clap_markdown::help_markdown::<mops_cli::Cli>();

    let content = format!(
        r#"# mops CLI Reference

Generated from the CLI definitions on {}.

## Configuration

Commands that talk to a service read one JSON configuration document from:

- `--config <path>` or `MOPS_CONFIG` pointing at a local file
- `--config s3://bucket/key`, read with the credentials in `AWS_DETAILS`
- `MOPS_CONFIG_BLOB`, a blob produced by `mops config encode`

```json
{{
  "status_manager": {{
    "type": "chicane",
    "url": "https://chicane.example/api/status",
    "get_agents_url": "https://chicane.example/api/agents",
    "body": {{"id": "transcoder-eu", "type": "transcode"}}
  }},
  "mapsor_details": {{"mapsor_url": "https://mapsor.example", "mapsor_key": "..."}}
}}
```

## Commands

{}

## Environment Variables

- `MOPS_CONFIG` - configuration location
- `MOPS_CONFIG_BLOB` - encoded configuration
- `MOPS_HTTP_TIMEOUT_SECS` - HTTP timeout when the configuration sets none (default: 300)
- `AWS_DETAILS` - JSON AWS credentials for S3 configuration locations
- `LOG_LEVEL`, `LOG_OUTPUT`, `LOG_FORMAT`, `LOG_DIR`, `LOG_FILTER` - logging

---

*To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("Generated CLI documentation at: {}", file_path.display());
    Ok(())
}
