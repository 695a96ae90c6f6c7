// CLI modules
mod cli;

// Process plumbing: logging, config state, clipboard, build info
mod clipboard;
mod process;
mod state;
mod version;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Init, Open, Request, SendSecret, Version};

command_enum! {
    (Request, Request),
    (Send, SendSecret),
    (Open, Open),
    (Init, Init),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Build context - loads config (or defaults) from ~/.hush or --config-path
    let ctx = match cli::op::OpContext::new(args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let level = match args.log_level {
        Some(level) => level,
        None => match ctx.state.config.log_level() {
            Ok(level) => level,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    };
    let guard = process::init_logging(level);

    let result = args.command.execute(&ctx).await;

    // stdout only ever carries a command's product (a payload or a secret)
    match result {
        Ok(output) => {
            let output = output.to_string();
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            drop(guard);
            std::process::exit(1);
        }
    }
}
