//! HTTP client for the jukebox playback service.
//!
//! `PlayerApi` is the seam the worker talks to; `HttpPlayerApi` is the
//! blocking `ureq` implementation used at runtime.

use anyhow::{Context, Result};
use jukebox_types::{
    ActionResponse, DirectoryChangeRequest, DirectoryChangeResponse, DirectoryResponse,
    MuteResponse, PlayRequest, StatusResponse, TracksResponse, VolumeRequest, VolumeResponse,
};
use serde::{Serialize, de::DeserializeOwned};

/// Operations exposed by the playback service.
pub(crate) trait PlayerApi {
    fn status(&self) -> Result<StatusResponse>;
    fn tracks(&self) -> Result<TracksResponse>;
    fn directory(&self) -> Result<DirectoryResponse>;
    fn set_directory(&self, directory: &str) -> Result<DirectoryChangeResponse>;
    fn toggle(&self) -> Result<ActionResponse>;
    fn next(&self) -> Result<ActionResponse>;
    fn previous(&self) -> Result<ActionResponse>;
    fn play(&self, index: usize) -> Result<ActionResponse>;
    fn shuffle(&self) -> Result<ActionResponse>;
    fn mute(&self) -> Result<MuteResponse>;
    fn set_volume(&self, volume: f64) -> Result<VolumeResponse>;
}

pub(crate) struct HttpPlayerApi {
    server: String,
    agent: ureq::Agent,
}

impl HttpPlayerApi {
    pub(crate) fn new(server: &str) -> Self {
        let config = ureq::Agent::config_builder()
            .user_agent(concat!("jukebox-remote/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            server: server.trim_end_matches('/').to_string(),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/{endpoint}", self.server)
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        let resp = self
            .agent
            .get(&url)
            .call()
            .with_context(|| format!("request GET /api/{endpoint}"))?;
        read_json(resp, endpoint)
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> Result<T> {
        let url = self.url(endpoint);
        let resp = self
            .agent
            .post(&url)
            .send_json(body)
            .with_context(|| format!("request POST /api/{endpoint}"))?;
        read_json(resp, endpoint)
    }

    fn post_empty<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.post_json(endpoint, &serde_json::json!({}))
    }
}

impl PlayerApi for HttpPlayerApi {
    fn status(&self) -> Result<StatusResponse> {
        self.get_json("status")
    }

    fn tracks(&self) -> Result<TracksResponse> {
        self.get_json("tracks")
    }

    fn directory(&self) -> Result<DirectoryResponse> {
        self.get_json("directory")
    }

    fn set_directory(&self, directory: &str) -> Result<DirectoryChangeResponse> {
        self.post_json(
            "directory",
            &DirectoryChangeRequest {
                directory: directory.to_string(),
            },
        )
    }

    fn toggle(&self) -> Result<ActionResponse> {
        self.post_empty("toggle")
    }

    fn next(&self) -> Result<ActionResponse> {
        self.post_empty("next")
    }

    fn previous(&self) -> Result<ActionResponse> {
        self.post_empty("previous")
    }

    fn play(&self, index: usize) -> Result<ActionResponse> {
        self.post_json("play", &PlayRequest { index })
    }

    fn shuffle(&self) -> Result<ActionResponse> {
        self.post_empty("shuffle")
    }

    fn mute(&self) -> Result<MuteResponse> {
        self.post_empty("mute")
    }

    fn set_volume(&self, volume: f64) -> Result<VolumeResponse> {
        self.post_json("volume", &VolumeRequest { volume })
    }
}

fn read_json<T: DeserializeOwned>(
    mut resp: ureq::http::Response<ureq::Body>,
    label: &str,
) -> Result<T> {
    let body = resp
        .body_mut()
        .read_to_string()
        .with_context(|| format!("read /api/{label} response body"))?;
    serde_json::from_str(&body).with_context(|| format!("decode /api/{label} response"))
}
