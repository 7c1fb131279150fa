use crate::clicker::store::{
    buy_button_id, catalog_from_entries, choose_purchase, item_name, parse_money, StoreItem,
};
use crate::config::Settings;
use crate::error::Result;
use crate::ui::GracefulShutdown;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use thirtyfour::prelude::*;

const COOKIE_ID: &str = "cookie";
const MONEY_ID: &str = "money";
const COOKIES_PER_SECOND_ID: &str = "cps";
const STORE_ENTRIES: &str = "#store b";
const GREYED_ENTRIES: &str = "#store .grayed b";

#[derive(Debug, Clone)]
pub struct BotSummary {
    pub clicks: u64,
    pub purchases: Vec<String>,
    pub elapsed: Duration,
}

pub struct CookieBot {
    webdriver_url: String,
    game_url: String,
    purchase_interval: Duration,
    run_for: Option<Duration>,
    shutdown: GracefulShutdown,
}

impl CookieBot {
    pub fn from_settings(settings: &Settings, shutdown: GracefulShutdown) -> Self {
        Self {
            webdriver_url: settings.clicker.webdriver_url.clone(),
            game_url: settings.clicker.game_url.clone(),
            purchase_interval: settings.purchase_interval(),
            run_for: settings.run_for(),
            shutdown,
        }
    }

    /// Open a browser session, play until stopped, and always close the
    /// session again.
    pub async fn run(&self) -> Result<BotSummary> {
        tracing::info!("Connecting to WebDriver at {}", self.webdriver_url);
        let driver = WebDriver::new(self.webdriver_url.as_str(), DesiredCapabilities::chrome()).await?;

        let outcome = self.play(&driver).await;

        if let Err(e) = driver.quit().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }

        outcome
    }

    async fn play(&self, driver: &WebDriver) -> Result<BotSummary> {
        driver.goto(self.game_url.as_str()).await?;

        let cookie = driver.find(By::Id(COOKIE_ID)).await?;
        let catalog = read_catalog(driver).await?;
        tracing::info!("Store offers {} items", catalog.len());

        let started = Instant::now();
        let mut next_check = started + self.purchase_interval;
        let mut summary = BotSummary {
            clicks: 0,
            purchases: Vec::new(),
            elapsed: Duration::ZERO,
        };

        while self.shutdown.is_running() {
            if self.run_for.is_some_and(|limit| started.elapsed() >= limit) {
                tracing::info!("Play time limit reached");
                break;
            }

            cookie.click().await?;
            summary.clicks += 1;

            if Instant::now() >= next_check {
                if let Some(name) = purchase_round(driver, &catalog).await? {
                    summary.purchases.push(name);
                }
                next_check = Instant::now() + self.purchase_interval;
            }
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            "Stopped after {} clicks and {} purchases",
            summary.clicks,
            summary.purchases.len()
        );
        Ok(summary)
    }
}

async fn read_catalog(driver: &WebDriver) -> Result<Vec<StoreItem>> {
    let entries = driver.find_all(By::Css(STORE_ENTRIES)).await?;

    let mut texts = Vec::with_capacity(entries.len());
    for entry in entries {
        texts.push(entry.text().await?);
    }
    Ok(catalog_from_entries(texts))
}

async fn purchase_round(driver: &WebDriver, catalog: &[StoreItem]) -> Result<Option<String>> {
    let money_text = driver.find(By::Id(MONEY_ID)).await?.text().await?;
    let Some(money) = parse_money(&money_text) else {
        tracing::warn!("Could not read money counter {:?}", money_text);
        return Ok(None);
    };
    tracing::info!("Money available for spending is {}", money);

    let mut unavailable = HashSet::new();
    for entry in driver.find_all(By::Css(GREYED_ENTRIES)).await? {
        if let Some(name) = item_name(&entry.text().await?) {
            unavailable.insert(name);
        }
    }

    let choice = choose_purchase(catalog, &unavailable, money).map(|item| item.name.clone());
    if let Some(ref name) = choice {
        driver.find(By::Id(buy_button_id(name))).await?.click().await?;
        tracing::info!("Bought {}", name);
    }

    let cookies_per_second = driver.find(By::Id(COOKIES_PER_SECOND_ID)).await?.text().await?;
    tracing::info!("Cookies per second : {}", cookies_per_second);

    Ok(choice)
}
