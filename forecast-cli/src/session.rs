//! Interactive session: one city per input line.
//!
//! Each fetch runs on its own task so input stays responsive. Submitting a
//! new query aborts the previous task, and the widget's request-id check
//! drops anything that still slips through. When input ends, the last
//! search is still awaited and shown.

use forecast_core::{CompletedFetch, ForecastProvider, ForecastWidget};
use std::{io::Write, sync::Arc};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt},
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::cli::write_state;

const QUIT_WORDS: &[&str] = &[":q", "quit", "exit"];

pub const INVALID_INPUT: &str = "Could not read that line as text. Please type the city again.";

/// Line reader that keeps partial reads across `select!` cancellation.
struct RawLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> RawLines<R> {
    /// `None` at end of input. Lines are returned as raw bytes so that a
    /// badly encoded line can be skipped instead of ending the session.
    async fn next_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;
        if read == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        Ok(Some(std::mem::take(&mut self.buf)))
    }
}

struct Session {
    widget: ForecastWidget,
    tx: UnboundedSender<CompletedFetch>,
    in_flight: Option<JoinHandle<()>>,
}

impl Session {
    fn dispatch<W: Write>(&mut self, raw: &str, out: &mut W) -> anyhow::Result<()> {
        if let Some(task) = self.in_flight.take() {
            debug!("aborting previous fetch");
            task.abort();
        }

        match self.widget.submit(raw) {
            None => write_state(out, self.widget.state(), false)?,
            Some(pending) => {
                writeln!(out, "Fetching weather for {}...", pending.query())?;
                let provider = self.widget.provider();
                let tx = self.tx.clone();
                self.in_flight = Some(tokio::spawn(async move {
                    let done = pending.run(provider.as_ref()).await;
                    // Receiver gone means the session is over.
                    let _ = tx.send(done);
                }));
            }
        }
        Ok(())
    }

    fn apply<W: Write>(&mut self, done: CompletedFetch, out: &mut W) -> anyhow::Result<()> {
        if self.widget.complete(done) {
            writeln!(out)?;
            write_state(out, self.widget.state(), false)?;
            writeln!(out)?;
        }
        Ok(())
    }

    /// Wait for the last submitted search and show its result.
    async fn finish<W: Write>(
        mut self,
        rx: &mut UnboundedReceiver<CompletedFetch>,
        out: &mut W,
    ) -> anyhow::Result<()> {
        if let Some(task) = self.in_flight.take() {
            if let Err(e) = task.await {
                debug!(error = %e, "last fetch did not finish");
            }
        }
        while let Ok(done) = rx.try_recv() {
            self.apply(done, out)?;
        }
        Ok(())
    }
}

/// Run a session reading cities from `input` and writing the widget to `out`.
/// The default city is requested before any input is read.
pub async fn run<R, W>(
    provider: Arc<dyn ForecastProvider>,
    default_city: &str,
    input: R,
    mut out: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session =
        Session { widget: ForecastWidget::new(provider, default_city), tx, in_flight: None };

    session.dispatch(default_city, &mut out)?;
    writeln!(out, "Enter a city name (or :q to quit).")?;

    let mut lines = RawLines { reader: input, buf: Vec::new() };
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(bytes) = line? else { break };
                let Ok(line) = String::from_utf8(bytes) else {
                    warn!("skipping input line that is not valid UTF-8");
                    writeln!(out, "{INVALID_INPUT}")?;
                    continue;
                };
                if QUIT_WORDS.contains(&line.trim()) {
                    break;
                }
                session.dispatch(&line, &mut out)?;
            }
            Some(done) = rx.recv() => session.apply(done, &mut out)?,
        }
    }

    session.finish(&mut rx, &mut out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forecast_core::{DailyRecord, FetchError, ProviderResponse, Query};
    use std::sync::Mutex;

    /// Answers immediately for every city except those listed in `stalled`,
    /// which never answer.
    #[derive(Debug, Default)]
    struct StubProvider {
        stalled: Vec<&'static str>,
        seen: Mutex<Vec<String>>,
    }

    impl StubProvider {
        fn stalling(cities: &[&'static str]) -> Self {
            Self { stalled: cities.to_vec(), ..Self::default() }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().map(|s| s.clone()).unwrap_or_default()
        }
    }

    fn record() -> DailyRecord {
        serde_json::from_value(serde_json::json!({
            "temp": 27.6,
            "rh": 70,
            "wind_spd": 6.25,
            "valid_date": "2024-06-10",
            "weather": { "description": "Haze", "icon": "a05d" }
        }))
        .expect("record")
    }

    #[async_trait]
    impl ForecastProvider for StubProvider {
        async fn fetch_forecast(&self, query: &Query) -> Result<ProviderResponse, FetchError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(query.to_string());
            }
            if self.stalled.iter().any(|c| *c == query.as_str()) {
                std::future::pending::<()>().await;
            }
            ProviderResponse::new(query.as_str(), vec![record(), record()])
        }
    }

    async fn run_with(stub: &Arc<StubProvider>, input: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        run(Arc::clone(stub) as Arc<dyn ForecastProvider>, "Mumbai", input, &mut out)
            .await
            .expect("session ends cleanly");
        String::from_utf8(out).expect("utf8").lines().map(str::to_owned).collect()
    }

    /// Lines that start a rendered forecast: the city name on its own.
    fn rendered_cities(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .enumerate()
            .filter(|(i, _)| lines.get(i + 1).is_some_and(|next| next.ends_with("°C  Haze")))
            .map(|(_, l)| l.as_str())
            .collect()
    }

    #[tokio::test]
    async fn default_city_is_requested_first() {
        let stub = Arc::new(StubProvider::default());
        let lines = run_with(&stub, b"").await;

        assert_eq!(lines[0], "Fetching weather for Mumbai...");
        assert_eq!(stub.seen().first().map(String::as_str), Some("Mumbai"));
    }

    #[tokio::test]
    async fn end_of_input_still_shows_last_search() {
        let stub = Arc::new(StubProvider::default());
        let lines = run_with(&stub, b"Pune\n").await;

        assert!(rendered_cities(&lines).contains(&"Pune"), "got: {lines:#?}");
        assert!(lines.iter().any(|l| l == "Wind Speed: 6.3 km/hr"));
    }

    #[tokio::test]
    async fn last_line_without_newline_is_a_search() {
        let stub = Arc::new(StubProvider::default());
        let lines = run_with(&stub, b"Pune").await;

        assert!(rendered_cities(&lines).contains(&"Pune"), "got: {lines:#?}");
    }

    #[tokio::test]
    async fn superseded_fetch_is_never_shown() {
        let stub = Arc::new(StubProvider::stalling(&["Mumbai", "Delhi"]));
        let lines = run_with(&stub, b"Delhi\nPune\n").await;

        assert_eq!(rendered_cities(&lines), vec!["Pune"], "got: {lines:#?}");
        assert!(lines.iter().any(|l| l == "Fetching weather for Delhi..."));
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_skipped() {
        let stub = Arc::new(StubProvider::default());
        let lines = run_with(&stub, b"S\xe3o\nPune\n").await;

        assert!(lines.iter().any(|l| l == INVALID_INPUT), "got: {lines:#?}");
        assert!(rendered_cities(&lines).contains(&"Pune"), "got: {lines:#?}");
        assert!(!stub.seen().iter().any(|c| c.starts_with('S')));
    }

    #[tokio::test]
    async fn blank_line_shows_validation_message() {
        let stub = Arc::new(StubProvider::stalling(&["Mumbai"]));
        let lines = run_with(&stub, b"   \n").await;

        assert!(lines.iter().any(|l| l == "Please enter a valid city name."));
        assert!(stub.seen().iter().all(|c| c == "Mumbai"));
        assert!(rendered_cities(&lines).is_empty(), "got: {lines:#?}");
    }

    #[tokio::test]
    async fn quit_word_stops_reading_but_shows_pending_result() {
        let stub = Arc::new(StubProvider::default());
        let lines = run_with(&stub, b"Pune\n:q\nDelhi\n").await;

        assert!(rendered_cities(&lines).contains(&"Pune"), "got: {lines:#?}");
        assert!(!stub.seen().contains(&"Delhi".to_string()));
    }
}
