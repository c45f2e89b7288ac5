use std::env;
use std::io::{self, Write};
use std::process;

use eo_bridge_rs::helpers::load_config_from_env;
use eo_bridge_rs::{ChatMessage, ChatRequest, Completion, MessageContent, Pipe, Role};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let prompt = env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.is_empty() {
        eprintln!("usage: eo-bridge <prompt>");
        process::exit(2);
    }

    let pipe = match Pipe::new(load_config_from_env()) {
        Ok(pipe) => pipe,
        Err(err) => {
            eprintln!("{}", err.user_message());
            process::exit(1);
        }
    };
    let model = match pipe.models().into_iter().next() {
        Some(entry) => entry.id,
        None => {
            eprintln!("Error: no models configured (set EO_AVAILABLE_MODELS)");
            process::exit(1);
        }
    };

    let request = ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: Role::User,
            content: MessageContent::Text(prompt),
        }],
        temperature: None,
        max_tokens: None,
        top_p: None,
        top_k: None,
    };

    match pipe.run(&request) {
        Completion::Text(text) => println!("{text}"),
        Completion::Stream(parts) => {
            let mut stdout = io::stdout();
            for part in parts {
                print!("{part}");
                let _ = stdout.flush();
            }
            println!();
        }
    }
}
