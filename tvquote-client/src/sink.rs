use std::io::{self, Write};
use std::thread::{self, JoinHandle};

use clap::ValueEnum;
use crossbeam_channel::{Receiver, Sender};
use log::debug;
use tvquote_core::{QuoteSink, QuoteUpdate, SinkClosed};

/// Формат печати котировок
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// `SYMBOL -> price=..., change=..., change_percentage=..., volume=...`
    Text,
    /// одна JSON-строка на котировку
    Json,
}

pub(crate) fn format_quote(quote: &QuoteUpdate, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(quote.to_string()),
        OutputFormat::Json => serde_json::to_string(quote),
    }
}

/// Отдаёт котировки в канал, поток печати забирает их оттуда
pub(crate) struct ChannelSink {
    tx: Sender<QuoteUpdate>,
}

impl ChannelSink {
    pub(crate) fn new(tx: Sender<QuoteUpdate>) -> Self {
        Self { tx }
    }
}

impl QuoteSink for ChannelSink {
    fn emit(&mut self, quote: QuoteUpdate) -> Result<(), SinkClosed> {
        self.tx.send(quote).map_err(|_| SinkClosed)
    }
}

/// Поток печати в stdout. Завершается, когда закрыты все `Sender`-ы.
pub(crate) fn spawn_printer(
    rx: Receiver<QuoteUpdate>,
    format: OutputFormat,
) -> JoinHandle<anyhow::Result<()>> {
    thread::spawn(move || {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run_printer(&rx, format, &mut out)
    })
}

fn run_printer<W: Write>(
    rx: &Receiver<QuoteUpdate>,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    for quote in rx.iter() {
        writeln!(out, "{}", format_quote(&quote, format)?)?;
        out.flush()?;
    }
    debug!("quote channel closed; printer exits");
    Ok(())
}
