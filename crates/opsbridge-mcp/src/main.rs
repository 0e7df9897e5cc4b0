//! OpsBridge MCP Server — entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use opsbridge::Connectors;
use opsbridge_mcp::config::{resolve_listen_addr, resolve_token};
use opsbridge_mcp::transport::{HttpTransport, StdioTransport};
use opsbridge_mcp::ActionRegistry;

#[derive(Parser)]
#[command(
    name = "opsbridge-mcp",
    about = "MCP server exposing SaaS actions (tickets, invoices, refunds, meetings)",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Start MCP server over HTTP.
    ServeHttp {
        /// Listen address (host:port).
        /// Also reads from OPSBRIDGE_ADDR env var.
        #[arg(long)]
        addr: Option<String>,

        /// Bearer token for authentication.
        /// Also reads from OPSBRIDGE_TOKEN env var.
        #[arg(long)]
        token: Option<String>,
    },

    /// Print server capabilities and the registered action set as JSON.
    Info,

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let transport = StdioTransport::new(Connectors::mock());
            transport.run().await?;
        }

        Commands::ServeHttp { addr, token } => {
            let addr = resolve_listen_addr(addr.as_deref());
            let token = resolve_token(token);
            if token.is_some() {
                tracing::info!("Auth: bearer token required");
            }
            let transport = HttpTransport::new(token, Connectors::mock());
            transport.run(&addr).await?;
        }

        Commands::Info => {
            let capabilities = opsbridge_mcp::types::InitializeResult::default_result();
            let actions = ActionRegistry::with_default_actions(Connectors::mock()).list();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "actions": actions.iter().map(|a| &a.name).collect::<Vec<_>>(),
                "action_count": actions.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "opsbridge-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
