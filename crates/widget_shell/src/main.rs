use std::io;

use chat_widget::logging::init_logging;
use chat_widget::{EnvConfig, ScrollMetrics, WidgetRuntime};
use tokio::io::{AsyncBufReadExt, BufReader};
use widget_shell::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use widget_shell::transcript::TranscriptView;

#[tokio::main]
async fn main() -> io::Result<()> {
    let env = EnvConfig::from_env();
    init_logging(env.log_filter.as_deref());

    let mut runtime = WidgetRuntime::from_env(&env).map_err(io::Error::other)?;
    let mut view = TranscriptView::new();

    runtime.mount().await;
    runtime.open().await;
    print_state(&runtime, &mut view);
    println!("{HELP_TEXT}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_slash_command(&line) {
            Some(SlashCommand::Quit) => break,
            Some(SlashCommand::Help) => println!("{HELP_TEXT}"),
            Some(SlashCommand::More) => {
                if let Err(rejection) = runtime.load_older(ScrollMetrics::default()).await {
                    println!("({rejection})");
                }
            }
            Some(SlashCommand::Reset) => {
                let session_id = runtime.reset_session();
                println!("(session {session_id})");
            }
            Some(SlashCommand::Unknown(command)) => println!("unknown command {command}"),
            None => {
                if runtime.controller().error().is_some() {
                    runtime.retry_initialization().await;
                    runtime.open().await;
                }
                runtime.on_input_replace(line);
                if let Err(rejection) = runtime.submit().await {
                    tracing::debug!(%rejection, "message not sent");
                }
            }
        }
        print_state(&runtime, &mut view);
    }

    Ok(())
}

fn print_state(runtime: &WidgetRuntime, view: &mut TranscriptView) {
    if let Some(banner) = runtime.controller().error() {
        eprintln!("! {banner}");
    }
    for line in view.update(runtime.controller().messages()) {
        println!("{line}");
    }
}
