//! Точка входа `tvquote-client`.
//!
//! Жизненный цикл:
//! - парсинг CLI и загрузка списка полей
//! - одноразовый HTTP-поиск символа, берём первое совпадение
//! - websocket-сессия: handshake, ответы на ping, разбор котировок
//! - печать котировок в отдельном потоке через канал
//! - корректная остановка по `Ctrl+C` (код 0), ошибки старта и обрыв сессии дают ненулевой код

mod cli;
mod config;
mod fields;
mod search;
mod sink;
mod ws;

use std::sync::{Arc, atomic::AtomicBool, atomic::Ordering};

use anyhow::{Context, anyhow};
use clap::Parser;
use log::{error, info, warn};
use tvquote_core::{ErrorPolicy, QuoteCoreError, StreamLoop};

fn main() -> anyhow::Result<()> {
    // Логи через RUST_LOG=info/debug/trace
    env_logger::init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    let shutdown = Arc::new(AtomicBool::new(false));

    // Ctrl+C => ставим shutdown=true, цикл увидит это между кадрами
    {
        let shutdown = shutdown.clone();
        ctrlc::set_handler(move || {
            shutdown.store(true, Ordering::Relaxed);
            info!("shutting down...");
        })?;
    }

    let args = cli::Args::parse();
    args.validate()?;

    let fields = fields::load_fields(&args)?;
    let query = args.symbol_query();

    info!(
        "Starting tvquote-client: query={}, category={}, fields={}, ws={}",
        query.query,
        query.category,
        fields.join(","),
        args.ws_url
    );

    let symbol = search::resolve_symbol(&args.search_url, &query)
        .with_context(|| format!("failed to resolve {:?} ({})", query.query, query.category))?;
    let symbol_id = symbol.id();
    println!("{symbol_id}\n");

    if shutdown.load(Ordering::Relaxed) {
        println!("Goodbye!");
        return Ok(());
    }

    let (tx, rx) = crossbeam_channel::bounded(config::QUOTE_CHANNEL_CAP);
    let printer = sink::spawn_printer(rx, args.output);
    let mut quote_sink = sink::ChannelSink::new(tx);

    let mut session = StreamLoop::new(args.stream_config(fields), symbol_id);
    let result = session.run(ws::connect, &mut quote_sink, &shutdown);

    // закрываем канал, поток печати дописывает очередь и выходит
    drop(quote_sink);
    match printer.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("quote printer stopped: {e}"),
        Err(panic) => warn!("quote printer panicked: {:?}", panic),
    }

    match result {
        Ok(stats) => {
            info!("received {} quotes", stats.quotes);
            println!("\nGoodbye!");
            Ok(())
        }
        Err(e) => {
            let err = QuoteCoreError::from(e);
            match err.policy() {
                ErrorPolicy::TerminateProcess => error!("fatal: {err}"),
                _ => warn!("session ended: {err}"),
            }
            Err(err.into())
        }
    }
}
