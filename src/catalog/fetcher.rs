use std::time::Duration;

use chrono::NaiveDate;

use super::error::CatalogError;
use super::groups::Group;
use super::tle::{parse_tle_text, RawTle};
use super::types::Satellite;

/// Bodies at or below this length are treated as empty responses; the
/// catalog source answers some unknown groups with a short notice page.
const MIN_BODY_LEN: usize = 50;

#[derive(Clone)]
pub struct GroupFetcher {
    client: reqwest::Client,
    sources: Vec<String>,
    timeout: Duration,
}

impl GroupFetcher {
    pub fn new(sources: Vec<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().build()?;
        Ok(GroupFetcher {
            client,
            sources,
            timeout,
        })
    }

    /// Ordered attempt list for a group: query form then static form, per
    /// source base, in configuration order.
    fn group_urls(&self, key: &str) -> Vec<String> {
        let mut urls = Vec::with_capacity(self.sources.len() * 2);
        for base in &self.sources {
            let base = base.trim_end_matches('/');
            urls.push(format!(
                "{base}/NORAD/elements/gp.php?GROUP={key}&FORMAT=TLE"
            ));
            urls.push(format!("{base}/NORAD/elements/{key}.txt"));
        }
        urls
    }

    /// Fetch one group, trying each source URL in order. The first successful
    /// non-empty body is parsed; blocks failing validation are dropped, so a
    /// partially valid body still yields whatever survives.
    pub async fn fetch_group(&self, group: Group) -> Result<Vec<Satellite>, CatalogError> {
        for url in self.group_urls(group.key()) {
            match self.fetch_text(&url).await {
                Ok(body) => {
                    let satellites: Vec<Satellite> = parse_tle_text(&body)
                        .into_iter()
                        .filter_map(|raw| Satellite::from_raw(raw, group.category()))
                        .collect();
                    log::info!(
                        "group {}: {} records from {}",
                        group.key(),
                        satellites.len(),
                        url
                    );
                    return Ok(satellites);
                }
                Err(e) => {
                    log::warn!("group {}: {} failed: {}", group.key(), url, e);
                }
            }
        }
        Err(CatalogError::AllSourcesFailed(group.key().to_string()))
    }

    /// Historical element sets for a single object over a date window.
    pub async fn fetch_object_history(
        &self,
        catnr: &str,
        start: NaiveDate,
        stop: NaiveDate,
    ) -> Result<Vec<RawTle>, CatalogError> {
        for base in &self.sources {
            let base = base.trim_end_matches('/');
            let url = format!(
                "{base}/NORAD/elements/gp.php?CATNR={catnr}&START={start}&STOP={stop}&FORMAT=TLE",
                start = start.format("%Y-%m-%d"),
                stop = stop.format("%Y-%m-%d"),
            );
            match self.fetch_text(&url).await {
                Ok(body) => return Ok(parse_tle_text(&body)),
                Err(e) => log::warn!("history for {catnr}: {url} failed: {e}"),
            }
        }
        Err(CatalogError::AllSourcesFailed(catnr.to_string()))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, CatalogError> {
        let response = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::BadStatus(status.as_u16()));
        }

        let body = tokio::time::timeout(self.timeout, response.text())
            .await
            .map_err(|_| CatalogError::Timeout(self.timeout))??;

        if body.trim().len() <= MIN_BODY_LEN {
            return Err(CatalogError::EmptyBody);
        }
        Ok(body)
    }
}
