use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::browser::PageSession;
use crate::config::AppConfig;
use crate::extract::counter::{CounterExtractor, COUNTER_WAIT_SELECTORS};
use crate::extract::listings::{extract_listings, Listing, CONTAINER_SELECTORS};
use crate::notify::{self, Notifier};
use crate::state::MonitorState;
use crate::Result;

const COUNTER_WAIT: Duration = Duration::from_secs(20);
const LISTING_WAIT: Duration = Duration::from_secs(10);
const STATUS_EVERY_CHECKS: usize = 50;

/// What a run should do, decided from the stored state and the observed
/// total. Pure so the transition table is testable without a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAction {
    CounterUnavailable,
    FirstRun { total: u64 },
    NoChange { send_status: bool },
    Changed { total: u64, diff: i64 },
}

pub fn evaluate(state: &MonitorState, current: Option<u64>) -> RunAction {
    let Some(current) = current else {
        return RunAction::CounterUnavailable;
    };

    // last_total == 0 doubles as the never-initialized sentinel; a real
    // zero-result page re-initializes, same as the original behavior.
    if state.is_first_run() {
        return RunAction::FirstRun { total: current };
    }

    let diff = current as i64 - state.last_total as i64;
    if diff == 0 {
        let checks = state.check_count();
        RunAction::NoChange {
            send_status: checks > 0 && checks % STATUS_EVERY_CHECKS == 0,
        }
    } else {
        RunAction::Changed { total: current, diff }
    }
}

pub struct Monitor {
    config: AppConfig,
    notifier: Notifier,
    extractor: CounterExtractor,
}

impl Monitor {
    pub fn new(config: AppConfig) -> Self {
        let notifier = Notifier::new(&config.telegram_bot_token, &config.telegram_chat_id);
        Monitor {
            config,
            notifier,
            extractor: CounterExtractor::new(),
        }
    }

    /// One complete monitoring run. Anything that goes wrong inside is
    /// reported as a best-effort notification and never escapes; each
    /// scheduled invocation is its own retry.
    pub async fn run(&self) {
        info!("=== Yad2 monitor started ===");
        info!("URL: {}", self.config.car_listing_url);

        if let Err(e) = self.check().await {
            error!("Error in monitoring run: {}", e);
            self.notifier
                .send(&notify::error_message(&e.to_string()))
                .await;
        }

        info!("=== Monitor completed ===");
    }

    async fn check(&self) -> Result<()> {
        let state_path = Path::new(&self.config.storage_file);
        let mut state = MonitorState::load(state_path);
        info!("Last total: {}", state.last_total);

        // The session is released on drop, whichever way this function exits
        let session = PageSession::launch(self.config.chrome_path.as_deref())?;
        session.open(&self.config.car_listing_url)?;
        session.wait_for_any(&COUNTER_WAIT_SELECTORS, COUNTER_WAIT);

        let html = session.content()?;
        let current = self.extractor.extract(&html);
        if let Some(current) = current {
            info!("Current total: {}", current);
        }

        match evaluate(&state, current) {
            RunAction::CounterUnavailable => {
                warn!("Could not find total results counter");
                self.notifier
                    .send(&notify::counter_warning_message(&self.config.car_listing_url))
                    .await;
            }
            RunAction::FirstRun { total } => {
                info!("First run - initializing");
                state.initialize(total);
                state.save(state_path);
                self.notifier
                    .send(&notify::welcome_message(&self.config.car_listing_url, total))
                    .await;
            }
            RunAction::NoChange { send_status } => {
                info!("No change in total listings");
                if send_status {
                    self.notifier
                        .send(&notify::status_message(state.last_total, state.check_count()))
                        .await;
                }
            }
            RunAction::Changed { total, diff } => {
                info!("Change detected: {:+}", diff);
                let listings = if diff > 0 {
                    self.fetch_listings(&session)
                } else {
                    Vec::new()
                };

                // Send first; a failed send must not block persistence
                self.notifier
                    .send(&notify::change_message(
                        &self.config.car_listing_url,
                        total,
                        diff,
                        &listings,
                    ))
                    .await;

                state.record_change(total, diff);
                state.save(state_path);
            }
        }

        Ok(())
    }

    fn fetch_listings(&self, session: &PageSession) -> Vec<Listing> {
        session.wait_for_any(&CONTAINER_SELECTORS, LISTING_WAIT);
        match session.content() {
            Ok(html) => extract_listings(&html),
            Err(e) => {
                warn!("Error getting new listings: {}", e);
                Vec::new()
            }
        }
    }
}
