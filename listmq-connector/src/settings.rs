use crate::ConnectorError;
use url::Url;

/// Connection parameters pulled out of a connector URI.
///
/// Credentials are kept exactly as they appear in the URI (percent-encoded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    scheme: String,
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
}

impl ConnectionSettings {
    /// Validate `uri` against the schemes a connector handles and fill in
    /// `default_port` when the URI omits one.
    pub fn from_uri(
        uri: &Url,
        schemes: &'static [&'static str],
        default_port: u16,
    ) -> Result<Self, ConnectorError> {
        if !schemes.contains(&uri.scheme()) {
            return Err(ConnectorError::UnsupportedScheme {
                scheme: uri.scheme().to_string(),
                expected: schemes,
            });
        }

        let host = match uri.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(ConnectorError::MissingHost(uri.to_string())),
        };

        Ok(Self {
            scheme: uri.scheme().to_string(),
            host,
            port: uri.port().unwrap_or(default_port),
            username: non_empty(uri.username()),
            password: uri.password().and_then(non_empty),
        })
    }

    pub fn parse(
        uri: &str,
        schemes: &'static [&'static str],
        default_port: u16,
    ) -> Result<Self, ConnectorError> {
        let parsed = Url::parse(uri).map_err(|source| ConnectorError::InvalidUri {
            uri: uri.to_string(),
            source,
        })?;
        Self::from_uri(&parsed, schemes, default_port)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Credentials to authenticate with, if any.
    ///
    /// A password alone is enough. The username is only returned alongside a
    /// password and is ignored otherwise.
    pub fn credentials(&self) -> Option<(Option<&str>, &str)> {
        let password = self.password.as_deref()?;
        Some((self.username.as_deref(), password))
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
