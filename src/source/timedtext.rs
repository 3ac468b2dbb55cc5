use anyhow::{Context, Result};
use log::{debug, trace};

use crate::common::VideoID;
use crate::config::Config;
use crate::source::base::{CaptionSource, Captions};

/// Fetches caption tracks from Youtube's unauthenticated timedtext endpoint
#[derive(Debug)]
pub struct TimedTextQuery<'a> {
    cfg: &'a Config,
}

impl<'a> TimedTextQuery<'a> {
    pub fn new(cfg: &Config) -> TimedTextQuery {
        TimedTextQuery { cfg }
    }

    /// `None` when the endpoint answered but had nothing for this video
    fn fetch(&self, id: &VideoID) -> Result<Option<String>> {
        let url = format!("{prefix}/api/timedtext", prefix = self.cfg.caption_prefix);
        debug!("Retrieving captions for {} from {}", id, &url);

        let resp = attohttpc::get(&url)
            .param("lang", &self.cfg.caption_lang)
            .param("v", id.id_str())
            .send()
            .with_context(|| format!("Request to {} failed", &url))?;
        if !resp.is_success() {
            anyhow::bail!("Error from {} - status {}", &url, resp.status());
        }

        let text = resp.text()?;
        trace!("Raw captions: {}", &text);
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text))
        }
    }
}

impl<'a> CaptionSource for TimedTextQuery<'a> {
    fn captions(&self, id: &VideoID) -> Captions {
        match self.fetch(id) {
            Ok(Some(text)) => Captions::Available(text),
            Ok(None) => {
                debug!("No captions for {}", id);
                Captions::Unavailable
            }
            Err(e) => {
                debug!("Treating caption lookup failure for {} as no captions: {:?}", id, e);
                Captions::Unavailable
            }
        }
    }
}
