use super::ui;
use crate::core::currency::{ConversionQuery, CurrencyCode};
use crate::core::error::Language;
use crate::core::rates::RateProvider;
use crate::surface::NoticeId;
use crate::surface::terminal::TerminalSurface;
use crate::widget::{FetchCompletion, FetchRequest, Widget, WidgetEvent};
use anyhow::{Context, Result, anyhow, bail};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

const HELP: &str = "\
Commands:
  from <CODE>     change the source currency (fetches new rates)
  to <CODE>       change the target currency
  amount <VALUE>  change the amount to convert
  list            show the available currencies
  dismiss <ID>    dismiss a notice
  help            show this help
  quit            leave";

#[derive(Debug, PartialEq)]
pub enum Command {
    Event(WidgetEvent),
    List,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let Some(name) = parts.next() else {
        return Ok(Command::Help);
    };
    let arg = parts.collect::<Vec<_>>().join(" ");

    let code = |arg: &str| -> Result<CurrencyCode> {
        arg.parse::<CurrencyCode>()
            .map_err(|e| anyhow!(e))
            .context("Expected a three letter currency code")
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "from" => Command::Event(WidgetEvent::SourceChanged(code(&arg)?)),
        "to" => Command::Event(WidgetEvent::TargetChanged(code(&arg)?)),
        "amount" | "x" => Command::Event(WidgetEvent::MultiplierChanged(arg)),
        "dismiss" => {
            let id = arg
                .parse::<u64>()
                .with_context(|| format!("Invalid notice id: {arg:?}"))?;
            Command::Event(WidgetEvent::DismissNotice(NoticeId(id)))
        }
        "list" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("Unknown command: {other}"),
    };
    Ok(command)
}

fn spawn_fetch(
    request: FetchRequest,
    provider: &Arc<dyn RateProvider>,
    completions: &mpsc::UnboundedSender<FetchCompletion>,
) {
    let provider = Arc::clone(provider);
    let completions = completions.clone();
    tokio::spawn(async move {
        let completion = request.run(provider.as_ref()).await;
        if completions.send(completion).is_err() {
            debug!("Converter closed before fetch completed");
        }
    });
}

/// Runs the converter against stdin until `quit` or end of input.
pub async fn run(
    provider: Arc<dyn RateProvider>,
    query: ConversionQuery,
    language: Language,
) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    session(input, provider, query, language).await?;
    Ok(())
}

/// Reads commands from `input` and applies fetch completions as they arrive.
///
/// On `quit` the session ends right away. At end of input, fetches still in
/// flight are awaited and applied first, so piped input shows its results.
pub async fn session<R: AsyncBufRead + Unpin>(
    input: R,
    provider: Arc<dyn RateProvider>,
    query: ConversionQuery,
    language: Language,
) -> Result<Widget<TerminalSurface>> {
    let mut widget = Widget::new(TerminalSurface::new(), query, language);
    let (tx, mut rx) = mpsc::unbounded_channel::<FetchCompletion>();

    println!("{}\n", ui::style_text(HELP, ui::StyleType::Subtle));
    if let Some(request) = widget.handle(WidgetEvent::Load) {
        spawn_fetch(request, &provider, &tx);
    }

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => return Ok(widget),
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::List) => {
                        let codes: Vec<String> =
                            widget.surface().options().iter().map(|c| c.to_string()).collect();
                        println!("{}", codes.join(" "));
                    }
                    Ok(Command::Event(event)) => {
                        if let Some(request) = widget.handle(event) {
                            spawn_fetch(request, &provider, &tx);
                        }
                        println!("{}", widget.surface().render());
                    }
                    Err(e) => println!("{}", ui::style_text(&format!("{e:#}"), ui::StyleType::Error)),
                }
            }
            Some(completion) = rx.recv() => {
                widget.complete(completion);
                println!("{}", widget.surface().render());
            }
        }
    }

    // Spawned fetches hold the remaining senders
    drop(tx);
    while let Some(completion) = rx.recv().await {
        widget.complete(completion);
        println!("{}", widget.surface().render());
    }
    Ok(widget)
}
