use thiserror::Error;

/// Presentation mode requested by the embedding page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbedMode {
    #[default]
    Default,
    Full,
    ReplayOnly,
    ReplayWithInfo,
}

impl EmbedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedMode::Default => "default",
            EmbedMode::Full => "full",
            EmbedMode::ReplayOnly => "replayonly",
            EmbedMode::ReplayWithInfo => "replay-with-info",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "default" => Some(EmbedMode::Default),
            "full" => Some(EmbedMode::Full),
            "replayonly" => Some(EmbedMode::ReplayOnly),
            "replay-with-info" => Some(EmbedMode::ReplayWithInfo),
            _ => None,
        }
    }
}

/// Startup configuration, read once from the embed page's query string.
#[derive(Debug, Clone)]
pub struct EmbedParams {
    pub source: String,
    pub url: Option<String>,
    pub ts: Option<String>,
    pub embed: EmbedMode,
    pub deep_link: bool,
    pub no_sandbox: bool,
}

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("missing required 'source' parameter")]
    MissingSource,
    #[error("malformed query string: {0}")]
    Decode(#[from] serde_urlencoded::de::Error),
}

impl EmbedParams {
    pub fn from_query(query: &str) -> Result<Self, ParamsError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        let value = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, v)| v.clone())
        };
        let present = |name: &str| pairs.iter().any(|(key, _)| key == name);

        let source = value("source")
            .filter(|s| !s.is_empty())
            .ok_or(ParamsError::MissingSource)?;

        let embed = match value("embed") {
            Some(raw) => EmbedMode::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(target = "params", embed = %raw, "unknown embed mode, using default");
                EmbedMode::Default
            }),
            None => EmbedMode::Default,
        };

        Ok(Self {
            source,
            url: value("url"),
            ts: value("ts"),
            embed,
            deep_link: present("deepLink"),
            no_sandbox: present("noSandbox"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_query() {
        let params = EmbedParams::from_query(
            "source=archive.wacz&url=https%3A%2F%2Fexample.com%2F&ts=20240101000000&embed=replayonly&deepLink",
        )
        .expect("params");
        assert_eq!(params.source, "archive.wacz");
        assert_eq!(params.url.as_deref(), Some("https://example.com/"));
        assert_eq!(params.ts.as_deref(), Some("20240101000000"));
        assert_eq!(params.embed, EmbedMode::ReplayOnly);
        assert!(params.deep_link);
        assert!(!params.no_sandbox);
    }

    #[test]
    fn missing_source_is_fatal() {
        let err = EmbedParams::from_query("url=https%3A%2F%2Fexample.com%2F").unwrap_err();
        assert!(matches!(err, ParamsError::MissingSource));
    }

    #[test]
    fn empty_source_is_fatal() {
        let err = EmbedParams::from_query("source=").unwrap_err();
        assert!(matches!(err, ParamsError::MissingSource));
    }

    #[test]
    fn presence_flags_accept_bare_keys() {
        let params = EmbedParams::from_query("source=a.wacz&noSandbox=").expect("params");
        assert!(params.no_sandbox);
        assert!(!params.deep_link);
    }

    #[test]
    fn unknown_embed_mode_falls_back() {
        let params = EmbedParams::from_query("source=a.wacz&embed=sideways").expect("params");
        assert_eq!(params.embed, EmbedMode::Default);
    }
}
