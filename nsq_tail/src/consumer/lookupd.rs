use super::ConnectError;

/// Accepts `host:port` or an `http(s)://` URL, returning a URL the client can query.
pub fn lookupd_url(address: &str) -> Result<String, ConnectError> {
    let invalid = || ConnectError::InvalidLookupd(address.to_string());

    if let Some((scheme, rest)) = address.split_once("://") {
        if !matches!(scheme, "http" | "https") {
            return Err(invalid());
        }
        let authority = rest.split('/').next().unwrap_or_default();
        if authority.is_empty() {
            return Err(invalid());
        }
        return Ok(address.trim_end_matches('/').to_string());
    }

    if address.contains('/') {
        return Err(invalid());
    }

    let Some((host, port)) = address.rsplit_once(':') else {
        return Err(invalid());
    };
    if host.is_empty() || port.parse::<u16>().is_err() {
        return Err(invalid());
    }

    Ok(format!("http://{address}"))
}
