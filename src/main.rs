use anyhow::Result;
use censo_dash::artifacts::{self, markup::TrustedMarkup, ArtifactClient};
use censo_dash::binder::{self, ContentCell};
use censo_dash::config::Config;
use censo_dash::graph::{self, svg::SvgSurface};
use censo_dash::tui::{self, state::AppState, TuiCommand};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Convert trusted artifact markup to text the terminal can show.
fn markup_text(markup: &TrustedMarkup) -> String {
    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec!["script", "style"])
        .build();
    converter
        .convert(markup.as_str())
        .unwrap_or_else(|_| markup.as_str().to_string())
}

/// Forward a bound artifact cell into the shared view state.
fn spawn_markup_forward(
    mut cell: ContentCell<TrustedMarkup>,
    state_tx: watch::Sender<AppState>,
    apply: fn(&mut AppState, String),
) {
    tokio::spawn(async move {
        while cell.changed().await.is_ok() {
            let markup = cell.borrow_and_update().clone();
            if let Some(markup) = markup {
                let text = markup_text(&markup);
                state_tx.send_modify(|s| apply(s, text));
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_file = std::fs::File::create("censo-dash.log")?;
    tracing_subscriber::fmt()
        .with_env_filter("censo_dash=info")
        .with_writer(log_file)
        .init();

    let config = Config::load(Path::new("config.toml"))?;
    let client = Arc::new(ArtifactClient::new(&config.artifacts));

    // Reactive cells: the year selection, and the artifacts derived from it.
    let (selection_tx, selection_rx) = watch::channel(String::new());
    let dictionary_cell = artifacts::bind_dictionary(selection_rx.clone(), client.clone());
    let duplicates_cell = artifacts::bind_duplicates(selection_rx.clone(), client.clone());

    let (state_tx, state_rx) = watch::channel(AppState::new());
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<TuiCommand>(16);

    spawn_markup_forward(dictionary_cell, state_tx.clone(), |s, text| {
        s.dictionary = Some(text);
    });
    spawn_markup_forward(duplicates_cell, state_tx.clone(), |s, text| {
        s.duplicates = Some(text);
    });

    // --- Startup: discover years, then load the one-shot artifacts ---
    let startup_client = client.clone();
    let startup_state = state_tx.clone();
    let startup_selection = selection_tx.clone();
    let fallback_years = config.selections.fallback_years.clone();
    let pipeline_svg = config.export.pipeline_svg.clone();
    tokio::spawn(async move {
        let years = binder::discover(
            || async { startup_client.available_years().await },
            &fallback_years,
            &startup_selection,
        )
        .await;
        let default_year = startup_selection.borrow().clone();
        startup_state.send_modify(|s| {
            s.push_log("INFO", format!("years available: {}", years.join(", ")));
            s.years = years;
            s.selected_year = default_year;
        });

        match startup_client.summary_stats().await {
            Ok(stats) => {
                startup_state.send_modify(|s| {
                    s.push_log("INFO", format!("summary stats loaded ({} years)", stats.len()));
                    s.summary = stats;
                });
            }
            Err(e) => {
                tracing::error!("failed to load summary stats: {:#}", e);
                startup_state
                    .send_modify(|s| s.push_log("ERROR", "summary stats unavailable".to_string()));
            }
        }

        match startup_client.pipeline_graph().await {
            Ok(steps) => {
                if let Some(path) = &pipeline_svg {
                    let mut surface = SvgSurface::new();
                    graph::layout_and_draw(&steps, &mut surface);
                    match std::fs::write(path, surface.finish()) {
                        Ok(()) => tracing::info!(path = %path, "pipeline graph exported"),
                        Err(e) => {
                            tracing::warn!(path = %path, error = %e, "pipeline svg export failed")
                        }
                    }
                }
                startup_state.send_modify(|s| {
                    s.push_log("INFO", format!("pipeline graph loaded ({} steps)", steps.len()));
                    s.steps = steps;
                });
            }
            Err(e) => {
                tracing::error!("failed to load pipeline graph: {:#}", e);
                startup_state
                    .send_modify(|s| s.push_log("ERROR", "pipeline graph unavailable".to_string()));
            }
        }
    });

    // --- Command loop: the view's mutations of selection and view state ---
    let cmd_state = state_tx.clone();
    let cmd_selection = selection_tx.clone();
    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                TuiCommand::Quit => break,
                TuiCommand::SelectYear(year) => {
                    let _ = cmd_selection.send(year.clone());
                    cmd_state.send_modify(|s| {
                        s.scroll_offset = 0;
                        s.selected_year = year;
                    });
                }
                TuiCommand::SwitchTab(tab) => {
                    cmd_state.send_modify(|s| {
                        s.active_tab = tab;
                        s.scroll_offset = 0;
                    });
                }
                TuiCommand::ScrollUp => {
                    cmd_state.send_modify(|s| s.scroll_offset = s.scroll_offset.saturating_sub(1));
                }
                TuiCommand::ScrollDown => {
                    cmd_state.send_modify(|s| {
                        s.scroll_offset = (s.scroll_offset + 1).min(s.max_scroll());
                    });
                }
            }
        }
    });

    tui::run_tui(state_rx, cmd_tx).await
}
