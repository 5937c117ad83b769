use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use chatline::command::{compose_message, format_help};
use chatline::{
    parse_input, ClientContext, CommandInput, CommandRegistry, Config, MentionEditor,
    MentionNode, MentionQuery, MentionSession, TextRange, TracingActions,
};

/// Editor that prints inserted mentions as editor elements.
struct StdoutEditor;

impl MentionEditor for StdoutEditor {
    fn replace_range(&mut self, range: &TextRange, node: MentionNode) {
        println!("insert {}..{}: {}", range.start, range.end, node.to_element());
    }

    fn move_cursor_after(&mut self) {}
}

#[tokio::main]
async fn main() {
    let config = match Config::load_with_env("chatline.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load chatline.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = chatline::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        chatline::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    let dry_run = Arc::new(TracingActions::new(
        chatline::identifier::server_name(&config.client.user_id).unwrap_or("localhost"),
    ));
    let client = ClientContext::new(config.client.user_id.clone(), dry_run.clone(), dry_run);
    let room = config.room.context();
    let registry = CommandRegistry::new(client.clone(), room.clone());

    info!(
        user = client.user_id(),
        room = %room.room_id,
        members = config.room.members.len(),
        "chatline dry run, reading stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("stdin: {e}");
                break;
            }
        };

        if let Some(text) = line.strip_prefix('@') {
            let query = MentionQuery::new(text, TextRange::new(0, line.len()));
            let mut session = MentionSession::open(
                &client,
                room.clone(),
                config.room.members.clone(),
                config.mention.search_options(),
                query,
            );
            for item in session.items() {
                println!("  {} ({})", item.label(), item.identifier());
            }
            if let Err(e) = session.force_complete(&mut StdoutEditor) {
                warn!("mention failed: {e}");
            }
            continue;
        }

        match parse_input(&line) {
            CommandInput::Message(text) => {
                if !text.is_empty() {
                    println!("message: {text}");
                }
            }
            CommandInput::Command { command, payload } if command.is_message_style() => {
                if let Some(message) = compose_message(command, &payload) {
                    println!("{:?}: {}", message.kind, message.body);
                }
            }
            CommandInput::Command { command, payload } => {
                if let Err(e) = registry.execute(command, &payload).await {
                    warn!(command = %command, "command failed: {e}");
                }
            }
            CommandInput::Unknown { name, .. } if name == "help" => {
                println!("{}", format_help());
            }
            CommandInput::Unknown { name, .. } => {
                println!("not a command: /{name}, sent as message: {line}");
            }
        }
    }
}
