use std::sync::Arc;

use anyhow::Context;
use lens_core::{AnalysisResult, Analyzer};
use lens_scan::{
    CaptureSource, CommandTrigger, LatestFrameSource, ScanEvent, ScanHandle, ScanPolicy,
    ScanState, Scanner, TextFileSource, TracingTrigger, Trigger,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::root_commands::ScanArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::analyze::explain;
use crate::context::AppContext;
use crate::output::{self, verdict::render_verdict};

const SESSION_HELP: &str =
    "commands: persona <id> <sub-option> | clear | pause | resume | quit";

/// A line typed into a running scan session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Persona { id: String, sub_option: Option<String> },
    Clear,
    Pause,
    Resume,
    Quit,
    Help,
}

/// Handle `lens scan`.
pub async fn handle(args: &ScanArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let source = build_source(args)?;
    let sinks = Sinks::from_args(args);
    let context = ctx.initial_context(args.persona.as_deref(), args.sub_option.as_deref());
    let policy = ScanPolicy::from(&ctx.config.scan);
    let analyzer: Arc<dyn Analyzer> = ctx.analyzer.clone();

    tracing::info!(
        tick_ms = policy.tick.as_millis(),
        min_spacing_ms = policy.min_spacing.as_millis(),
        cooldown_ms = policy.cooldown.as_millis(),
        persona = context.as_ref().map(|context| context.persona_id.as_str()),
        "scan starting"
    );
    if flags.format == OutputFormat::Table && !flags.quiet {
        eprintln!("{SESSION_HELP}");
    }

    let mut handle = Scanner::new(analyzer, source, ctx.credential.clone())
        .with_policy(policy)
        .with_context(context)
        .spawn();
    let mut events = handle
        .events()
        .context("scan event stream was already taken")?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut stopping = false;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                report(&event, &sinks, flags.format)?;
            }
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_session_command(&line) {
                    Ok(Some(command)) => stopping |= apply(command, &handle, ctx),
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}\n{SESSION_HELP}"),
                },
                Ok(None) => stdin_open = false,
                Err(error) => {
                    tracing::warn!(%error, "stdin closed");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c, if !stopping => {
                stopping = true;
                handle.stop();
            }
        }
    }

    let summary = handle.join().await.context("scan task ended abnormally")?;
    if !flags.quiet {
        output::output(&summary, flags.format)?;
    }
    if let Some(message) = summary.source_error {
        anyhow::bail!("capture source failed: {message}");
    }
    Ok(())
}

fn build_source(args: &ScanArgs) -> anyhow::Result<Box<dyn CaptureSource>> {
    match (&args.frames, &args.text_file) {
        (Some(dir), _) => Ok(Box::new(LatestFrameSource::new(dir.clone()))),
        (None, Some(path)) => Ok(Box::new(TextFileSource::new(path.clone()))),
        (None, None) => anyhow::bail!("one of --frames or --text-file is required"),
    }
}

/// Where published audio scripts and share blurbs go.
struct Sinks {
    speak: Box<dyn Trigger>,
    share: Box<dyn Trigger>,
}

impl Sinks {
    fn from_args(args: &ScanArgs) -> Self {
        Self {
            speak: sink(args.speak_with.as_deref(), "speak"),
            share: sink(args.share_with.as_deref(), "share"),
        }
    }

    fn publish(&self, result: &AnalysisResult) {
        if !result.audio_script.trim().is_empty() {
            self.speak.trigger(&result.audio_script);
        }
        if !result.share_content.trim().is_empty() {
            self.share.trigger(&result.share_content);
        }
    }
}

fn sink(command_line: Option<&str>, name: &'static str) -> Box<dyn Trigger> {
    match command_line.and_then(CommandTrigger::parse) {
        Some(trigger) => {
            tracing::debug!(sink = name, program = trigger.program(), "command sink");
            Box::new(trigger)
        }
        None => Box::new(TracingTrigger::new(name)),
    }
}

/// Returns `true` when the command asked the scan to stop.
fn apply(command: SessionCommand, handle: &ScanHandle, ctx: &AppContext) -> bool {
    match command {
        SessionCommand::Persona { id, sub_option } => {
            handle.set_context(ctx.resolve(Some(&id), sub_option.as_deref()));
        }
        SessionCommand::Clear => handle.set_context(None),
        SessionCommand::Pause => handle.suspend(),
        SessionCommand::Resume => handle.resume(),
        SessionCommand::Quit => {
            handle.stop();
            return true;
        }
        SessionCommand::Help => eprintln!("{SESSION_HELP}"),
    }
    false
}

fn parse_session_command(line: &str) -> Result<Option<SessionCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest = words.collect::<Vec<_>>();

    let command = match (head.to_ascii_lowercase().as_str(), rest.as_slice()) {
        ("persona", [id]) => SessionCommand::Persona {
            id: (*id).to_string(),
            sub_option: None,
        },
        ("persona", [id, sub_option]) => SessionCommand::Persona {
            id: (*id).to_string(),
            sub_option: Some((*sub_option).to_string()),
        },
        ("persona", _) => return Err("usage: persona <id> <sub-option>".to_string()),
        ("clear", []) => SessionCommand::Clear,
        ("pause", []) => SessionCommand::Pause,
        ("resume", []) => SessionCommand::Resume,
        ("quit" | "exit" | "stop", []) => SessionCommand::Quit,
        ("help" | "?", []) => SessionCommand::Help,
        (other, _) => return Err(format!("unknown command '{other}'")),
    };
    Ok(Some(command))
}

/// One line of machine-readable scan output.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum EventLine<'a> {
    State {
        from: ScanState,
        to: ScanState,
    },
    Verdict {
        seq: u64,
        result: &'a AnalysisResult,
    },
    Error {
        seq: u64,
        kind: &'static str,
        message: String,
    },
    Cleared,
    Discarded {
        seq: u64,
    },
    Cooldown {
        remaining_ms: u64,
    },
    SourceFailed {
        message: &'a str,
    },
}

impl<'a> From<&'a ScanEvent> for EventLine<'a> {
    fn from(event: &'a ScanEvent) -> Self {
        match event {
            ScanEvent::StateChanged { from, to } => Self::State {
                from: *from,
                to: *to,
            },
            ScanEvent::Published { seq, result } => Self::Verdict {
                seq: *seq,
                result: &**result,
            },
            ScanEvent::Failed { seq, error } => Self::Error {
                seq: *seq,
                kind: error.kind().as_str(),
                message: error.to_string(),
            },
            ScanEvent::Cleared => Self::Cleared,
            ScanEvent::Discarded { seq } => Self::Discarded { seq: *seq },
            ScanEvent::CooldownStarted { remaining } => Self::Cooldown {
                remaining_ms: u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            },
            ScanEvent::SourceFailed { message } => Self::SourceFailed {
                message: message.as_str(),
            },
        }
    }
}

fn report(event: &ScanEvent, sinks: &Sinks, format: OutputFormat) -> anyhow::Result<()> {
    if let ScanEvent::Published { result, .. } = event {
        sinks.publish(result);
    }

    if format != OutputFormat::Table {
        println!("{}", serde_json::to_string(&EventLine::from(event))?);
        return Ok(());
    }

    match event {
        ScanEvent::StateChanged { from, to } => tracing::debug!(%from, %to, "scan state"),
        ScanEvent::Published { seq, result } => {
            println!("== verdict #{seq} ==");
            println!("{}\n", render_verdict(result, format)?);
        }
        ScanEvent::Failed { seq, error } => {
            eprintln!("scan #{seq}: {:#}", explain(error.clone()));
        }
        ScanEvent::Cleared => println!("== persona changed; verdict cleared =="),
        ScanEvent::Discarded { seq } => tracing::info!(seq, "stale result discarded"),
        ScanEvent::CooldownStarted { remaining } => {
            eprintln!("quota exceeded; pausing for {}s", remaining.as_secs());
        }
        ScanEvent::SourceFailed { message } => eprintln!("capture source failed: {message}"),
    }
    Ok(())
}
