//! Static endpoint configuration for the conversion backends.
//!
//! The upstream services publish no API contract; the endpoints, header
//! values and API keys below mirror what each service's own web frontend
//! sends. They are constants of the engine, not user configuration.

pub mod cnv {
    pub const KEY_URL: &str = "https://cnv.cx/v2/sanity/key";
    pub const CONVERT_URL: &str = "https://cnv.cx/v2/converter";
    pub const ORIGIN: &str = "https://iframe.y2meta-uk.com";
    pub const REFERER: &str = "https://iframe.y2meta-uk.com/";
}

pub mod ytmp3_as {
    pub const BOOTSTRAP_URL: &str = "https://app.ytmp3.as/";
    pub const INIT_URL: &str = "https://gamma.gammacloud.net/api/v1/init";
    pub const ORIGIN: &str = "https://app.ytmp3.as";
    pub const REFERER: &str = "https://app.ytmp3.as/";
}

pub mod ytmp3_gg {
    pub const CONVERT_URL: &str = "https://ytmp3.gg/api/converter";
    pub const REFERER: &str = "https://ytmp3.gg/";
}

pub mod y2down {
    pub const API_KEY: &str = "dfcb6d76f2f6a9894gjkege8a4ab232222";
    /// Equivalent mirrors of the same backend, tried in order.
    pub const HOSTS: &[&str] = &["p.lbserver.xyz", "p.savenow.to"];
    pub const REFERER: &str = "https://y2mate.yt/";
    pub const SUBMIT_PATH: &str = "/ajax/download.php";
    pub const PROGRESS_PATH: &str = "/api/progress";
}
