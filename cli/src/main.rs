//! CLI entrypoint for foundry-relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use relay_application::{AgentRuntime, ChatUseCase, RunChatUseCase, RunPipelineUseCase};
use relay_infrastructure::{
    ConfigLoader, EnvConfig, FoundryAgentRuntime, credential_provider, current_time,
};
use relay_presentation::{
    ChatState, Cli, Command, McpState, McpTool, ServiceMode, TimeToolCommand, chat_router,
    mcp_router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env into the process environment before config is read
    dotenv().ok();

    // Initialize logging: -v flags win, otherwise RUST_LOG, otherwise info
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = ConfigLoader::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { mode, port } => serve_chat(&config, mode, port).await,
        Command::TimeTool(TimeToolCommand::Serve { port }) => serve_time_tool(&config, port).await,
        Command::TimeTool(TimeToolCommand::Invoke { context }) => {
            println!("{}", current_time::handle_context(&context));
            Ok(())
        }
    }
}

async fn serve_chat(config: &EnvConfig, mode: ServiceMode, port: Option<u16>) -> Result<()> {
    let settings = Arc::new(config.relay_settings());
    let server = config.server_options()?;

    if settings.project_endpoint.is_none() || settings.model_deployment.is_none() {
        warn!(
            "AZURE_AI_PROJECT_ENDPOINT or AZURE_AI_MODEL_DEPLOYMENT_NAME is not set; chat requests will fail until it is"
        );
    }

    // === Dependency Injection ===
    let foundry = Arc::new(FoundryAgentRuntime::new(config.foundry_options()?)?);
    let credentials = credential_provider(settings.credential, foundry.http_client());
    let runtime: Arc<dyn AgentRuntime> = foundry;

    let use_case: Arc<dyn ChatUseCase> = match mode {
        ServiceMode::Chat => Arc::new(RunChatUseCase::new(settings.clone(), credentials, runtime)),
        ServiceMode::Pipeline => {
            Arc::new(RunPipelineUseCase::new(settings.clone(), credentials, runtime))
        }
    };

    let router = chat_router(ChatState::new(use_case), &server.static_dir);
    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(server.port)));
    info!(
        "Serving {:?} chat on http://{} (credential: {:?}, static: {})",
        mode,
        addr,
        settings.credential,
        server.static_dir.display()
    );
    serve(router, addr).await
}

async fn serve_time_tool(config: &EnvConfig, port: u16) -> Result<()> {
    let tool = McpTool {
        name: current_time::CURRENT_TIME,
        description: current_time::DESCRIPTION,
        input_schema: current_time::input_schema(),
        handler: current_time::handle_context,
    };
    let key = config.relay_settings().tool_key;
    if key.is_some() {
        info!("MCP requests must carry x-functions-key");
    }

    let router = mcp_router(McpState::new(vec![tool]).with_function_key(key));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Serving MCP tools on http://{}/mcp", addr);
    serve(router, addr).await
}

async fn serve(router: axum::Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
