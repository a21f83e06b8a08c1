use std::collections::VecDeque;
use std::time::Instant;

use crate::artifacts::types::{PipelineStep, YearStat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Summary,
    Dictionary,
    Duplicates,
    Pipeline,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Summary, Tab::Dictionary, Tab::Duplicates, Tab::Pipeline];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Summary => "Summary",
            Tab::Dictionary => "Dictionary",
            Tab::Duplicates => "Duplicates",
            Tab::Pipeline => "Pipeline",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub active_tab: Tab,
    /// Years with published artifacts, oldest first.
    pub years: Vec<String>,
    pub selected_year: String,
    pub summary: Vec<YearStat>,
    /// Plain-text rendering of the dictionary artifact. `None` until the
    /// first fetch resolves, which is distinct from an empty document.
    pub dictionary: Option<String>,
    pub duplicates: Option<String>,
    pub steps: Vec<PipelineStep>,
    pub logs: VecDeque<LogEntry>,
    pub start_time: Instant,
    pub scroll_offset: usize,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub message: String,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            active_tab: Tab::Summary,
            years: Vec::new(),
            selected_year: String::new(),
            summary: Vec::new(),
            dictionary: None,
            duplicates: None,
            steps: Vec::new(),
            logs: VecDeque::with_capacity(200),
            start_time: Instant::now(),
            scroll_offset: 0,
        }
    }

    pub fn push_log(&mut self, level: &str, message: String) {
        let time = chrono::Local::now().format("%H:%M:%S%.3f").to_string();
        if self.logs.len() >= 200 {
            self.logs.pop_front();
        }
        self.logs.push_back(LogEntry {
            time,
            level: level.to_string(),
            message,
        });
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{}h {:02}m", h, m)
    }

    /// Year adjacent to the selected one, wrapping around. `None` while
    /// discovery has not produced a year list yet.
    pub fn cycle_year(&self, forward: bool) -> Option<String> {
        if self.years.is_empty() {
            return None;
        }
        let idx = match (
            self.years.iter().position(|y| *y == self.selected_year),
            forward,
        ) {
            (Some(i), true) => (i + 1) % self.years.len(),
            (Some(i), false) => (i + self.years.len() - 1) % self.years.len(),
            (None, _) => self.years.len() - 1,
        };
        Some(self.years[idx].clone())
    }

    /// Upper bound for the scroll offset on the active tab.
    pub fn max_scroll(&self) -> usize {
        fn text_lines(text: &Option<String>) -> usize {
            text.as_deref()
                .map_or(0, |t| t.lines().count().saturating_sub(1))
        }
        match self.active_tab {
            Tab::Summary => self.summary.len().saturating_sub(1),
            Tab::Dictionary => text_lines(&self.dictionary),
            Tab::Duplicates => text_lines(&self.duplicates),
            Tab::Pipeline => 0,
        }
    }
}
